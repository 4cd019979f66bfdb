//! Student dashboard: stats, task list with status filter, task detail.

use std::cell::{Cell, RefCell};
use std::str::FromStr;

use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, Transport};
use crate::config::{ClientConfig, Routes};
use crate::generation::Generation;
use crate::model::{StudentTask, TaskStatus};
use crate::router::{Page, PageRouter};
use crate::session::{Session, SessionGuard};
use crate::ui::{Notice, Ui};
use crate::view::student::{task_cards, TaskCounts, RECENT_TASKS};
use crate::view::{ActionKind, RowAction};

pub mod ids {
    pub const USER_NAME: &str = "user-name";
    pub const USER_ROLE: &str = "user-role";
    pub const PROFILE_NAME: &str = "student-name";
    pub const PROFILE_ID: &str = "student-id";
    pub const PROFILE_CAMPUS: &str = "student-campus";
    pub const PROFILE_GRADE: &str = "student-grade";
    pub const PROFILE_SECTION: &str = "student-section";
    pub const TOTAL_TASKS: &str = "total-tasks-count";
    pub const COMPLETED_TASKS: &str = "completed-tasks-count";
    pub const PENDING_TASKS: &str = "pending-tasks-count";
    pub const RECENT_TASKS_GRID: &str = "recent-tasks-grid";
    pub const TASKS_LIST: &str = "tasks-list";
    pub const DETAIL_MODAL: &str = "task-detail-modal";
    pub const DETAIL_TITLE: &str = "modal-task-title";
    pub const DETAIL_LANGUAGE: &str = "modal-task-language";
    pub const DETAIL_STATUS: &str = "modal-task-status";
    pub const DETAIL_DESCRIPTION: &str = "modal-task-description";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StudentPage {
    Dashboard,
    Tasks,
}

impl Page for StudentPage {
    const DEFAULT: Self = StudentPage::Dashboard;

    fn name(&self) -> &'static str {
        match self {
            StudentPage::Dashboard => "dashboard",
            StudentPage::Tasks => "tasks",
        }
    }

    fn all() -> &'static [Self] {
        &[StudentPage::Dashboard, StudentPage::Tasks]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TaskFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl TaskFilter {
    pub fn matches(&self, task: &StudentTask) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Only(status) => task.status == *status,
        }
    }
}

impl FromStr for TaskFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(TaskFilter::All);
        }
        Ok(TaskFilter::Only(s.parse()?))
    }
}

pub struct StudentDashboard<T, U> {
    api: ApiClient<T>,
    ui: U,
    guard: SessionGuard,
    routes: Routes,
    router: PageRouter<StudentPage>,
    tasks: RefCell<Vec<StudentTask>>,
    filter: Cell<TaskFilter>,
    selected: RefCell<Option<String>>,
    dashboard_loads: Generation,
    task_loads: Generation,
}

impl<T: Transport, U: Ui> StudentDashboard<T, U> {
    pub fn new(config: &ClientConfig, session: Session, guard: SessionGuard, transport: T, ui: U) -> Self {
        Self {
            api: ApiClient::new(transport, &session, config),
            ui,
            guard,
            routes: config.routes.clone(),
            router: PageRouter::new(),
            tasks: RefCell::new(Vec::new()),
            filter: Cell::new(TaskFilter::All),
            selected: RefCell::new(None),
            dashboard_loads: Generation::new(),
            task_loads: Generation::new(),
        }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn active_page(&self) -> StudentPage {
        self.router.active()
    }

    pub async fn start(&self) {
        if self.load_profile().await {
            self.load_page(StudentPage::DEFAULT).await;
        }
    }

    pub async fn load_profile(&self) -> bool {
        match self.api.student_profile().await {
            Ok(profile) => {
                self.ui.set_text(ids::USER_NAME, &profile.name);
                self.ui.set_text(ids::USER_ROLE, "student");
                self.ui.set_text(ids::PROFILE_NAME, &profile.name);
                self.ui.set_text(ids::PROFILE_ID, &profile.student_id);
                self.ui.set_text(ids::PROFILE_CAMPUS, &profile.campus);
                self.ui.set_text(ids::PROFILE_GRADE, &profile.grade);
                let section = profile.section.as_deref().filter(|s| !s.is_empty()).unwrap_or("-");
                self.ui.set_text(ids::PROFILE_SECTION, section);
                self.guard.cache_profile(&profile);
                true
            }
            Err(e) => {
                error!("profile load error: {:?}", e);
                self.ui.notify(Notice::error(format!("Error: {}", e)));
                self.guard.logout(&self.ui);
                false
            }
        }
    }

    /// Used by both the side menu and the "view all" links.
    pub async fn select_page(&self, name: &str) {
        if let Some(page) = self.router.select(&self.ui, name) {
            self.load_page(page).await;
        }
    }

    pub async fn load_page(&self, page: StudentPage) {
        info!("loading page data for {:?}", page);
        match page {
            StudentPage::Dashboard => self.load_dashboard().await,
            StudentPage::Tasks => self.load_tasks().await,
        }
    }

    fn report_error(&self, e: &ApiError) {
        self.ui.notify(Notice::error(format!("Error: {}", e)));
    }

    pub async fn load_dashboard(&self) {
        let ticket = self.dashboard_loads.begin();
        let result = self.api.student_tasks().await;
        if !ticket.is_current() {
            debug!("dropping stale dashboard response #{}", ticket.issued());
            return;
        }
        match result {
            Ok(tasks) => {
                let counts = TaskCounts::from_tasks(&tasks);
                debug!("tasks loaded: {:?}", counts);
                self.ui.set_text(ids::TOTAL_TASKS, &counts.total.to_string());
                self.ui.set_text(ids::COMPLETED_TASKS, &counts.completed.to_string());
                self.ui.set_text(ids::PENDING_TASKS, &counts.pending.to_string());
                let recent = &tasks[..tasks.len().min(RECENT_TASKS)];
                self.ui.mount(ids::RECENT_TASKS_GRID, task_cards(recent));
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub async fn load_tasks(&self) {
        let ticket = self.task_loads.begin();
        let result = self.api.student_tasks().await;
        if !ticket.is_current() {
            debug!("dropping stale tasks response #{}", ticket.issued());
            return;
        }
        match result {
            Ok(tasks) => {
                debug!("tasks loaded: {}", tasks.len());
                *self.tasks.borrow_mut() = tasks;
                self.render_tasks();
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn render_tasks(&self) {
        let filter = self.filter.get();
        let visible: Vec<StudentTask> = self
            .tasks
            .borrow()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        self.ui.mount(ids::TASKS_LIST, task_cards(&visible));
    }

    /// Re-renders the cached task list with `filter` (`all`, `pending`,
    /// `completed`); no request is made.
    pub fn filter_tasks(&self, filter: &str) {
        match filter.parse::<TaskFilter>() {
            Ok(filter) => {
                self.filter.set(filter);
                self.render_tasks();
            }
            Err(e) => warn!("ignoring task filter: {}", e),
        }
    }

    pub async fn task_action(&self, action: RowAction) {
        match action.kind {
            ActionKind::View => self.show_task_detail(&action.id).await,
            _ => warn!("no {} action on task cards", action.kind.as_str()),
        }
    }

    /// Opens the detail modal with a fresh copy of the task.
    pub async fn show_task_detail(&self, task_id: &str) {
        let tasks = match self.api.student_tasks().await {
            Ok(tasks) => tasks,
            Err(e) => {
                error!("failed to load task details: {:?}", e);
                self.report_error(&e);
                return;
            }
        };
        let Some(task) = tasks.into_iter().find(|t| t.id == task_id) else {
            warn!("task {} is not assigned to this student", task_id);
            return;
        };
        self.ui.set_text(ids::DETAIL_TITLE, &task.title);
        self.ui.set_text(ids::DETAIL_LANGUAGE, task.language.as_str());
        self.ui.set_text(ids::DETAIL_STATUS, task.status.as_str());
        self.ui.set_text(ids::DETAIL_DESCRIPTION, &task.description);
        *self.selected.borrow_mut() = Some(task.id);
        self.ui.set_modal(ids::DETAIL_MODAL, true);
    }

    /// Opens the editor for the task shown in the detail modal.
    pub fn start_selected_task(&self) {
        match self.selected.borrow().as_deref() {
            Some(task_id) => self.ui.navigate(&self.routes.editor_for(task_id)),
            None => warn!("start pressed without a selected task"),
        }
    }

    pub fn logout(&self) {
        self.guard.logout(&self.ui);
    }
}
