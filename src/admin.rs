//! Admin console: dashboard, students, tasks and reports tabs.

use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError, Transport};
use crate::config::ClientConfig;
use crate::generation::Generation;
use crate::model::{Language, NewStudent, NewTask, ReportFilter};
use crate::router::{Page, PageRouter};
use crate::session::{Session, SessionGuard};
use crate::ui::{BusyControl, Notice, Ui};
use crate::view::admin::{
    campus_cards, group_by_campus, report_totals, reports_table, students_table, tasks_table,
};
use crate::view::{ActionKind, RowAction};

pub mod ids {
    pub const USER_NAME: &str = "user-name";
    pub const USER_ROLE: &str = "user-role";
    pub const TOTAL_STUDENTS: &str = "total-students";
    pub const TOTAL_TASKS: &str = "total-tasks";
    pub const COMPLETED_TASKS: &str = "completed-tasks";
    pub const PENDING_TASKS: &str = "pending-tasks";
    pub const CAMPUS_GRID: &str = "campus-grid";
    pub const STUDENTS_TABLE: &str = "students-table-body";
    pub const TASKS_TABLE: &str = "tasks-table-body";
    pub const REPORTS_TABLE: &str = "reports-table-body";
    pub const ADD_STUDENT_MODAL: &str = "add-student-modal";
    pub const ADD_STUDENT_FORM: &str = "add-student-form";
    pub const ADD_STUDENT_SUBMIT: &str = "add-student-submit";
    pub const UPLOAD_MODAL: &str = "upload-students-modal";
    pub const UPLOAD_FORM: &str = "upload-students-form";
    pub const UPLOAD_SUBMIT: &str = "upload-students-submit";
    pub const ADD_TASK_MODAL: &str = "add-task-modal";
    pub const ADD_TASK_FORM: &str = "add-task-form";
    pub const ADD_TASK_SUBMIT: &str = "add-task-submit";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminPage {
    Dashboard,
    Students,
    Tasks,
    Reports,
}

impl Page for AdminPage {
    const DEFAULT: Self = AdminPage::Dashboard;

    fn name(&self) -> &'static str {
        match self {
            AdminPage::Dashboard => "dashboard",
            AdminPage::Students => "students",
            AdminPage::Tasks => "tasks",
            AdminPage::Reports => "reports",
        }
    }

    fn all() -> &'static [Self] {
        &[
            AdminPage::Dashboard,
            AdminPage::Students,
            AdminPage::Tasks,
            AdminPage::Reports,
        ]
    }
}

/// Raw values of the add-student form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StudentForm {
    pub name: String,
    pub campus: String,
    pub grade: String,
    pub section: String,
    pub password: String,
}

impl StudentForm {
    /// Trims every field and checks the required ones are present.
    pub fn validate(&self) -> Result<NewStudent, &'static str> {
        let student = NewStudent {
            name: self.name.trim().to_string(),
            campus: self.campus.trim().to_string(),
            grade: self.grade.trim().to_string(),
            section: self.section.trim().to_string(),
            password: self.password.trim().to_string(),
        };
        if student.name.is_empty() {
            return Err("Please enter a student name");
        }
        if student.campus.is_empty() {
            return Err("Please select a campus");
        }
        if student.grade.is_empty() {
            return Err("Please select a grade");
        }
        Ok(student)
    }
}

/// Raw values of the add-task form; targets come from checked boxes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub language: Language,
    pub campuses: Vec<String>,
    pub grades: Vec<String>,
}

impl TaskForm {
    pub fn validate(&self) -> Result<NewTask, &'static str> {
        if self.campuses.is_empty() {
            return Err("Please select at least one target campus");
        }
        if self.grades.is_empty() {
            return Err("Please select at least one target grade");
        }
        Ok(NewTask {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            language: self.language,
            campus_target: self.campuses.clone(),
            grade_target: self.grades.clone(),
        })
    }
}

/// A roster spreadsheet picked in the upload form.
#[derive(Clone, Debug, PartialEq)]
pub struct RosterFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub struct AdminConsole<T, U> {
    api: ApiClient<T>,
    ui: U,
    guard: SessionGuard,
    router: PageRouter<AdminPage>,
    dashboard: Generation,
    students: Generation,
    tasks: Generation,
    reports: Generation,
}

impl<T: Transport, U: Ui> AdminConsole<T, U> {
    pub fn new(config: &ClientConfig, session: Session, guard: SessionGuard, transport: T, ui: U) -> Self {
        Self {
            api: ApiClient::new(transport, &session, config),
            ui,
            guard,
            router: PageRouter::new(),
            dashboard: Generation::new(),
            students: Generation::new(),
            tasks: Generation::new(),
            reports: Generation::new(),
        }
    }

    pub fn ui(&self) -> &U {
        &self.ui
    }

    pub fn active_page(&self) -> AdminPage {
        self.router.active()
    }

    /// Fills the header and loads the default page.
    pub async fn start(&self) {
        if self.load_profile().await {
            self.load_page(AdminPage::DEFAULT).await;
        }
    }

    /// Returns false when the profile could not be fetched; the session is
    /// dropped in that case.
    pub async fn load_profile(&self) -> bool {
        match self.api.admin_profile().await {
            Ok(profile) => {
                self.ui.set_text(ids::USER_NAME, &profile.username);
                self.ui.set_text(ids::USER_ROLE, "admin");
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

    pub async fn select_page(&self, name: &str) {
        if let Some(page) = self.router.select(&self.ui, name) {
            self.load_page(page).await;
        }
    }

    pub async fn load_page(&self, page: AdminPage) {
        info!("loading page data for {:?}", page);
        match page {
            AdminPage::Dashboard => self.load_dashboard().await,
            AdminPage::Students => self.load_students().await,
            AdminPage::Tasks => self.load_tasks().await,
            AdminPage::Reports => self.load_reports().await,
        }
    }

    fn report_error(&self, e: &ApiError) {
        self.ui.notify(Notice::error(format!("Error: {}", e)));
    }

    /// Totals for students, tasks and submissions, plus one card per campus.
    /// The three requests fail independently; a newer load makes the rest of
    /// an older one a no-op.
    pub async fn load_dashboard(&self) {
        let ticket = self.dashboard.begin();

        let students = self.api.students().await;
        if !ticket.is_current() {
            debug!("dropping stale dashboard response #{}", ticket.issued());
            return;
        }
        match students {
            Ok(students) => {
                debug!("students loaded: {}", students.len());
                self.ui.set_text(ids::TOTAL_STUDENTS, &students.len().to_string());
                self.ui.mount(ids::CAMPUS_GRID, campus_cards(&group_by_campus(&students)));
            }
            Err(e) => self.report_error(&e),
        }

        let tasks = self.api.tasks().await;
        if !ticket.is_current() {
            debug!("dropping stale dashboard response #{}", ticket.issued());
            return;
        }
        match tasks {
            Ok(tasks) => self.ui.set_text(ids::TOTAL_TASKS, &tasks.len().to_string()),
            Err(e) => self.report_error(&e),
        }

        let reports = self.api.reports(None).await;
        if !ticket.is_current() {
            debug!("dropping stale dashboard response #{}", ticket.issued());
            return;
        }
        match reports {
            Ok(rows) => {
                let (completed, pending) = report_totals(&rows);
                self.ui.set_text(ids::COMPLETED_TASKS, &completed.to_string());
                self.ui.set_text(ids::PENDING_TASKS, &pending.to_string());
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub async fn load_students(&self) {
        let ticket = self.students.begin();
        let result = self.api.students().await;
        if !ticket.is_current() {
            debug!("dropping stale students response #{}", ticket.issued());
            return;
        }
        match result {
            Ok(students) => {
                debug!("students loaded: {}", students.len());
                self.ui.mount(ids::STUDENTS_TABLE, students_table(&students));
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub async fn add_student(&self, form: StudentForm) {
        let student = match form.validate() {
            Ok(student) => student,
            Err(message) => {
                self.ui.notify(Notice::warning(message));
                return;
            }
        };

        let outcome = {
            let _busy = BusyControl::new(&self.ui, ids::ADD_STUDENT_SUBMIT, "Adding...");
            self.api.create_student(&student).await
        };
        match outcome {
            Ok(_) => {
                info!("student {} added", student.name);
                self.ui.notify(Notice::success("Student added successfully!"));
                self.ui.set_modal(ids::ADD_STUDENT_MODAL, false);
                self.ui.reset_form(ids::ADD_STUDENT_FORM);
                self.load_students().await;
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub async fn upload_students(&self, file: Option<RosterFile>) {
        let Some(file) = file else {
            self.ui.notify(Notice::warning("Please select a file to upload"));
            return;
        };

        let outcome = {
            let _busy = BusyControl::new(&self.ui, ids::UPLOAD_SUBMIT, "Uploading...");
            self.api.upload_students(&file.name, file.bytes).await
        };
        match outcome {
            Ok(response) => {
                let count = response
                    .extra
                    .get("students")
                    .and_then(|s| s.as_array())
                    .map_or(0, Vec::len);
                info!("{} students uploaded from {}", count, file.name);
                self.ui.notify(Notice::success(format!("{} students uploaded successfully!", count)));
                self.ui.set_modal(ids::UPLOAD_MODAL, false);
                self.ui.reset_form(ids::UPLOAD_FORM);
                self.load_students().await;
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub fn export_students(&self) {
        self.ui.navigate(&self.api.export_students_url());
    }

    pub async fn student_action(&self, action: RowAction) {
        match action.kind {
            ActionKind::Delete => self.delete_student(&action.id).await,
            ActionKind::Edit => self.ui.notify(Notice::info("Edit functionality not implemented yet")),
            ActionKind::View => warn!("no view action on students: {}", action),
        }
    }

    /// Asks first; declining sends nothing. On success the list is fetched
    /// again rather than patched locally.
    pub async fn delete_student(&self, id: &str) {
        if !self.ui.confirm("Are you sure you want to delete this student?").await {
            debug!("delete of student {} declined", id);
            return;
        }
        match self.api.delete_student(id).await {
            Ok(_) => {
                info!("student {} deleted", id);
                self.ui.notify(Notice::success("Student deleted successfully"));
                self.load_students().await;
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub async fn load_tasks(&self) {
        let ticket = self.tasks.begin();
        let result = self.api.tasks().await;
        if !ticket.is_current() {
            debug!("dropping stale tasks response #{}", ticket.issued());
            return;
        }
        match result {
            Ok(tasks) => {
                debug!("tasks loaded: {}", tasks.len());
                self.ui.mount(ids::TASKS_TABLE, tasks_table(&tasks));
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub async fn add_task(&self, form: TaskForm) {
        let task = match form.validate() {
            Ok(task) => task,
            Err(message) => {
                self.ui.notify(Notice::warning(message));
                return;
            }
        };

        let outcome = {
            let _busy = BusyControl::new(&self.ui, ids::ADD_TASK_SUBMIT, "Adding...");
            self.api.create_task(&task).await
        };
        match outcome {
            Ok(_) => {
                info!("task {} added", task.title);
                self.ui.notify(Notice::success("Task added successfully!"));
                self.ui.set_modal(ids::ADD_TASK_MODAL, false);
                self.ui.reset_form(ids::ADD_TASK_FORM);
                self.load_tasks().await;
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub async fn task_action(&self, action: RowAction) {
        match action.kind {
            ActionKind::Delete => self.delete_task(&action.id).await,
            ActionKind::Edit => self.ui.notify(Notice::info("Edit functionality not implemented yet")),
            ActionKind::View => warn!("no view action on tasks: {}", action),
        }
    }

    pub async fn delete_task(&self, id: &str) {
        if !self.ui.confirm("Are you sure you want to delete this task?").await {
            debug!("delete of task {} declined", id);
            return;
        }
        match self.api.delete_task(id).await {
            Ok(_) => {
                info!("task {} deleted", id);
                self.ui.notify(Notice::success("Task deleted successfully"));
                self.load_tasks().await;
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub async fn load_reports(&self) {
        self.fetch_reports(None).await;
    }

    pub async fn generate_report(&self, filter: ReportFilter) {
        self.fetch_reports(Some(filter)).await;
    }

    async fn fetch_reports(&self, filter: Option<ReportFilter>) {
        let ticket = self.reports.begin();
        let result = self.api.reports(filter.as_ref()).await;
        if !ticket.is_current() {
            debug!("dropping stale reports response #{}", ticket.issued());
            return;
        }
        match result {
            Ok(rows) => {
                debug!("reports loaded: {}", rows.len());
                self.ui.mount(ids::REPORTS_TABLE, reports_table(&rows));
            }
            Err(e) => self.report_error(&e),
        }
    }

    pub fn export_report(&self, filter: &ReportFilter) {
        self.ui.navigate(&self.api.export_submissions_url(filter));
    }

    pub fn logout(&self) {
        self.guard.logout(&self.ui);
    }
}
