//! Code editor session.
//!
//! One session edits one draft. Installing libraries and compiling are
//! independent flows; only compile/run (and clear) decide whether the draft
//! may be submitted:
//!
//! ```text
//! idle -> installing -> installed | install-failed
//! idle -> running    -> run-succeeded | run-failed
//! run-succeeded -> submitted
//! ```

use std::cell::{Cell, RefCell};

use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, Transport};
use crate::config::{ClientConfig, Routes};
use crate::generation::Generation;
use crate::model::{Language, StudentTask, SubmitRequest, TaskStatus};
use crate::session::Session;
use crate::ui::{BusyControl, Notice, Ui};

pub mod ids {
    pub const TASK_TITLE: &str = "editor-task-title";
    pub const TASK_LANGUAGE: &str = "editor-task-language";
    pub const TASK_STATUS: &str = "editor-task-status";
    pub const LANGUAGE_SELECT: &str = "language";
    pub const FILE_NAME: &str = "filename";
    pub const LINE_COUNT: &str = "lineCount";
    pub const OUTPUT: &str = "output";
    pub const STATUS_INDICATOR: &str = "statusIndicator";
    pub const LIBRARIES: &str = "libraries";
    pub const SUBMIT: &str = "submitBtn";
}

pub const OUTPUT_PLACEHOLDER: &str = "Output will appear here...";
pub const NO_LIBRARIES: &str = "No libraries specified.";
pub const LOADING_PLACEHOLDER: &str = "// Loading...";

/// The text-editing widget the session drives.
pub trait CodeSurface {
    fn code(&self) -> String;
    fn set_code(&self, code: &str);
    fn set_syntax(&self, mode: &str);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditorMode {
    /// Bound to an assigned task; can submit.
    Task,
    /// Practice editor with no task; switching language resets the code.
    Standalone,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Installing,
    Installed,
    InstallFailed,
    Running,
    RunSucceeded,
    RunFailed,
    Submitted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indicator {
    Off,
    Running,
    Success,
    Error,
}

impl Indicator {
    pub fn class(&self) -> &'static str {
        match self {
            Indicator::Off => "",
            Indicator::Running => "status-indicator status-running",
            Indicator::Success => "status-indicator status-success",
            Indicator::Error => "status-indicator status-error",
        }
    }
}

/// Colour of the transcript text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Muted,
    Working,
    Success,
    Error,
}

impl Tone {
    pub fn class(&self) -> &'static str {
        match self {
            Tone::Muted => "output output-muted",
            Tone::Working => "output output-working",
            Tone::Success => "output output-success",
            Tone::Error => "output output-error",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EditorState {
    pub language: Language,
    pub phase: Phase,
    pub transcript: String,
    pub tone: Tone,
    pub indicator: Indicator,
    pub submit_enabled: bool,
    pub task: Option<StudentTask>,
}

impl EditorState {
    fn new(language: Language) -> Self {
        Self {
            language,
            phase: Phase::Idle,
            transcript: OUTPUT_PLACEHOLDER.to_string(),
            tone: Tone::Muted,
            indicator: Indicator::Off,
            submit_enabled: false,
            task: None,
        }
    }

    fn show(&mut self, transcript: String, tone: Tone, indicator: Indicator) {
        self.transcript = transcript;
        self.tone = tone;
        self.indicator = indicator;
    }
}

/// Splits a comma-separated library list, trimming names and dropping
/// empty entries.
pub fn parse_libraries(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lines in `code` as the editing surface counts them.
pub fn line_count(code: &str) -> usize {
    code.split('\n').count()
}

pub struct EditorSession<T, U, C> {
    api: ApiClient<T>,
    ui: U,
    surface: C,
    mode: EditorMode,
    routes: Routes,
    state: RefCell<EditorState>,
    submitting: Cell<bool>,
    runs: Generation,
    installs: Generation,
}

impl<T: Transport, U: Ui, C: CodeSurface> EditorSession<T, U, C> {
    pub fn new(
        config: &ClientConfig,
        session: &Session,
        mode: EditorMode,
        transport: T,
        ui: U,
        surface: C,
    ) -> Self {
        let editor = Self {
            api: ApiClient::new(transport, session, config),
            ui,
            surface,
            mode,
            routes: config.routes.clone(),
            state: RefCell::new(EditorState::new(Language::default())),
            submitting: Cell::new(false),
            runs: Generation::new(),
            installs: Generation::new(),
        };
        match editor.mode {
            EditorMode::Task => editor.surface.set_code(LOADING_PLACEHOLDER),
            EditorMode::Standalone => editor.surface.set_code(Language::default().practice_boilerplate()),
        }
        editor.apply_language(Language::default());
        editor.paint();
        editor
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn surface(&self) -> &C {
        &self.surface
    }

    pub fn snapshot(&self) -> EditorState {
        self.state.borrow().clone()
    }

    pub fn submit_enabled(&self) -> bool {
        self.state.borrow().submit_enabled
    }

    fn paint(&self) {
        let state = self.state.borrow();
        self.ui.set_text(ids::OUTPUT, &state.transcript);
        self.ui.set_class(ids::OUTPUT, state.tone.class());
        self.ui.set_class(ids::STATUS_INDICATOR, state.indicator.class());
        self.ui.set_control(ids::SUBMIT, state.submit_enabled, None);
        drop(state);
        self.refresh_line_count();
    }

    pub fn refresh_line_count(&self) {
        let lines = line_count(&self.surface.code());
        self.ui.set_text(ids::LINE_COUNT, &lines.to_string());
    }

    fn apply_language(&self, language: Language) {
        self.surface.set_syntax(language.syntax_mode());
        self.ui.set_text(ids::FILE_NAME, language.file_name());
        self.ui.set_attribute(ids::LIBRARIES, "placeholder", language.library_hint());
        self.ui.set_attribute(ids::LANGUAGE_SELECT, "value", language.as_str());
    }

    fn leave(&self) {
        self.ui.navigate(&self.routes.student_dashboard);
    }

    /// Binds the session to the task named in the page's `task` query
    /// parameter. Returns false when the user was sent back to the dashboard.
    pub async fn load_task(&self, task_id: Option<&str>) -> bool {
        let Some(task_id) = task_id.filter(|id| !id.is_empty()) else {
            warn!("editor opened without a task id");
            self.leave();
            return false;
        };

        let tasks = match self.api.student_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!("failed to load task details: {:?}", e);
                self.ui.notify(Notice::error("Failed to load task details"));
                self.leave();
                return false;
            }
        };
        let Some(task) = tasks.into_iter().find(|t| t.id == task_id) else {
            self.ui.notify(Notice::error("Task not found"));
            self.leave();
            return false;
        };

        info!("editing task {} ({})", task.id, task.language);
        self.ui.set_text(ids::TASK_TITLE, &task.title);
        self.ui.set_text(ids::TASK_LANGUAGE, task.language.as_str());
        self.ui.set_text(ids::TASK_STATUS, task.status.as_str());
        {
            let mut state = self.state.borrow_mut();
            state.language = task.language;
            state.task = Some(task.clone());
        }
        self.apply_language(task.language);

        if task.status == TaskStatus::Completed && self.restore_submission(&task.id).await {
            return true;
        }
        self.surface.set_code(task.language.boilerplate());
        self.paint();
        true
    }

    /// Puts a previous submission back into the editor, ready to resubmit.
    async fn restore_submission(&self, task_id: &str) -> bool {
        let submission = match self.api.prior_submission(task_id).await {
            Ok(submission) if submission.success => submission,
            Ok(submission) => {
                warn!("previous submission unavailable: {:?}", submission.message);
                return false;
            }
            Err(e) => {
                error!("failed to load previous submission: {:?}", e);
                return false;
            }
        };
        self.surface.set_code(&submission.code);
        {
            let mut state = self.state.borrow_mut();
            state.show(submission.output, Tone::Success, Indicator::Success);
            state.phase = Phase::RunSucceeded;
            state.submit_enabled = true;
        }
        self.paint();
        true
    }

    /// Changes syntax mode, file name and library hint. Submit eligibility is
    /// left alone; only the practice editor replaces the code.
    pub fn switch_language(&self, language: Language) {
        debug!("language -> {}", language);
        self.state.borrow_mut().language = language;
        self.apply_language(language);
        if self.mode == EditorMode::Standalone {
            self.surface.set_code(language.practice_boilerplate());
        }
        self.refresh_line_count();
    }

    pub async fn install_libraries(&self, raw: &str) {
        let libraries = parse_libraries(raw);
        if libraries.is_empty() {
            self.state
                .borrow_mut()
                .show(NO_LIBRARIES.to_string(), Tone::Muted, Indicator::Off);
            self.paint();
            return;
        }

        let language = self.state.borrow().language;
        let ticket = self.installs.begin();
        {
            let mut state = self.state.borrow_mut();
            state.phase = Phase::Installing;
            state.show(
                format!("Installing {} libraries...", language.display_name()),
                Tone::Working,
                Indicator::Running,
            );
        }
        self.paint();
        info!("installing {:?} for {}", libraries, language);

        let result = self.api.install_libraries(language, libraries).await;
        if !ticket.is_current() {
            debug!("dropping stale install response #{}", ticket.issued());
            return;
        }

        {
            let mut state = self.state.borrow_mut();
            match result {
                Ok(run) if run.succeeded() => {
                    state.phase = Phase::Installed;
                    state.show(
                        format!(
                            "✓ {} libraries installed successfully\n\n{}",
                            language.display_name(),
                            run.output
                        ),
                        Tone::Success,
                        Indicator::Success,
                    );
                }
                Ok(run) => {
                    state.phase = Phase::InstallFailed;
                    state.show(
                        format!("✗ Installation Error\n\n{}", run.output),
                        Tone::Error,
                        Indicator::Error,
                    );
                }
                Err(e) => {
                    state.phase = Phase::InstallFailed;
                    state.show(failure_transcript(&e, "✗ Installation Error"), Tone::Error, Indicator::Error);
                }
            }
        }
        self.paint();
    }

    /// Sends the current code to the compile service. The outcome decides
    /// whether the draft may be submitted.
    pub async fn compile_run(&self) {
        let code = self.surface.code();
        let language = self.state.borrow().language;
        let ticket = self.runs.begin();
        {
            let mut state = self.state.borrow_mut();
            state.phase = Phase::Running;
            state.show(
                format!("Compiling and running {} code...", language.display_name()),
                Tone::Working,
                Indicator::Running,
            );
        }
        self.paint();

        let result = self.api.compile(language, &code).await;
        if !ticket.is_current() {
            debug!("dropping stale run response #{}", ticket.issued());
            return;
        }

        {
            let mut state = self.state.borrow_mut();
            match result {
                Ok(run) if run.succeeded() => {
                    info!("run succeeded");
                    state.phase = Phase::RunSucceeded;
                    state.submit_enabled = true;
                    state.show(format!("✓ Success\n\n{}", run.output), Tone::Success, Indicator::Success);
                }
                Ok(run) => {
                    info!("run failed");
                    state.phase = Phase::RunFailed;
                    state.submit_enabled = false;
                    state.show(format!("✗ Error\n\n{}", run.output), Tone::Error, Indicator::Error);
                }
                Err(e) => {
                    warn!("run request failed: {}", e);
                    state.phase = Phase::RunFailed;
                    state.submit_enabled = false;
                    state.show(failure_transcript(&e, "✗ Error"), Tone::Error, Indicator::Error);
                }
            }
        }
        self.paint();
    }

    /// Submits code and transcript. Does nothing unless the last run
    /// succeeded, or while an earlier submit is still in flight.
    pub async fn submit(&self) {
        let (task_id, output) = {
            let state = self.state.borrow();
            if !state.submit_enabled {
                debug!("submit ignored, no successful run");
                return;
            }
            match &state.task {
                Some(task) => (task.id.clone(), state.transcript.clone()),
                None => {
                    warn!("submit ignored, editor has no task");
                    return;
                }
            }
        };

        if self.submitting.replace(true) {
            debug!("submit ignored, one is already in flight");
            return;
        }

        let request = SubmitRequest {
            task_id,
            code: self.surface.code(),
            output,
        };
        let outcome = {
            let _busy = BusyControl::new(&self.ui, ids::SUBMIT, "Submitting...");
            self.api.submit(&request).await
        };
        self.submitting.set(false);

        match outcome {
            Ok(_) => {
                info!("task {} submitted", request.task_id);
                {
                    let mut state = self.state.borrow_mut();
                    state.phase = Phase::Submitted;
                    state.submit_enabled = false;
                }
                self.paint();
                self.ui.notify(Notice::success("Task submitted successfully!"));
                self.leave();
            }
            Err(e) => {
                error!("submit failed: {:?}", e);
                // the busy guard re-enabled the button; eligibility may have
                // been revoked by a clear in the meantime
                self.paint();
                self.ui.notify(Notice::error(format!("Error: {}", e)));
            }
        }
    }

    /// Resets the transcript and revokes submit eligibility. Responses still
    /// in flight are discarded.
    pub fn clear(&self) {
        self.runs.invalidate();
        self.installs.invalidate();
        {
            let mut state = self.state.borrow_mut();
            state.phase = Phase::Idle;
            state.submit_enabled = false;
            state.show(OUTPUT_PLACEHOLDER.to_string(), Tone::Muted, Indicator::Off);
        }
        self.paint();
    }

    pub fn back_to_tasks(&self) {
        self.leave();
    }
}

/// Transcript for a request that produced no usable run result. Only a
/// request that never reached the server is a network error.
fn failure_transcript(e: &ApiError, heading: &str) -> String {
    match e {
        ApiError::Transport(_) => format!("✗ Network Error\n\n{}", e),
        _ => format!("{}\n\n{}", heading, e),
    }
}
