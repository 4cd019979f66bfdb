use std::future::Future;
use std::rc::Rc;

use anyhow::{anyhow, Result};
use tracing::{error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::code_mirror::CodeMirrorSurface;
use super::{bind_modal_close, delegate_row_actions, on_click, on_each_click, on_event, on_submit, BrowserStore, DomUi};
use crate::admin::{ids as admin_ids, AdminConsole, StudentForm, TaskForm};
use crate::api::remote::HttpTransport;
use crate::config::ClientConfig;
use crate::editor::{EditorMode, EditorSession};
use crate::model::{Language, ReportFilter, Role};
use crate::session::{Redirect, Session, SessionGuard, SessionStore};
use crate::student::StudentDashboard;
use crate::ui::Ui;

type Admin = AdminConsole<HttpTransport, DomUi>;
type Student = StudentDashboard<HttpTransport, DomUi>;
type Editor = EditorSession<HttpTransport, DomUi, CodeMirrorSurface>;

struct PageContext {
    config: ClientConfig,
    session: Session,
    guard: SessionGuard,
    transport: HttpTransport,
    ui: DomUi,
}

/// Reads the config and checks the session. `None` means the visitor has
/// been redirected and nothing should be bound.
fn open(role: Role) -> Result<Option<PageContext>> {
    let ui = DomUi::new()?;
    let config = ClientConfig::from_json(&ui.config_attribute())?;
    let store: Rc<dyn SessionStore> = Rc::new(BrowserStore::new(ui.window()));
    let guard = SessionGuard::new(store, config.routes.login.clone());
    let session = match guard.require(role) {
        Ok(session) => session,
        Err(Redirect(route)) => {
            ui.navigate(&route);
            return Ok(None);
        }
    };
    let base = if config.api_base.is_empty() {
        ui.origin()?
    } else {
        config.api_base.clone()
    };
    let transport = HttpTransport::new(&base)?;
    info!("{} page opened against {}", role, base);
    Ok(Some(PageContext {
        config,
        session,
        guard,
        transport,
        ui,
    }))
}

fn to_js(e: anyhow::Error) -> JsValue {
    error!("page start failed: {:?}", e);
    JsValue::from_str(&e.to_string())
}

/// Spawns `action` on a shared controller.
fn spawn<C, F, Fut>(controller: &Rc<C>, action: F)
where
    C: 'static,
    F: FnOnce(Rc<C>) -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    spawn_local(action(controller.clone()));
}

fn bind_menu<C: 'static>(ui: &DomUi, selector: &str, controller: &Rc<C>, select: fn(Rc<C>, String)) {
    let controller = controller.clone();
    on_each_click(ui, selector, move |element, event| {
        event.prevent_default();
        match element.get_attribute("data-page") {
            Some(page) => select(controller.clone(), page),
            None => warn!("menu item without data-page"),
        }
    });
}

#[wasm_bindgen]
pub fn start_admin_console() -> Result<(), JsValue> {
    let Some(cx) = open(Role::Admin).map_err(to_js)? else {
        return Ok(());
    };
    let console: Rc<Admin> = Rc::new(AdminConsole::new(&cx.config, cx.session, cx.guard, cx.transport, cx.ui));
    bind_admin(&console);
    spawn(&console, |c| async move { c.start().await });
    Ok(())
}

fn bind_admin(console: &Rc<Admin>) {
    let ui = console.ui();
    bind_modal_close(ui);
    bind_menu(ui, ".menu-item", console, |c, page| {
        spawn_local(async move { c.select_page(&page).await })
    });

    let c = console.clone();
    on_click(ui, "add-student-btn", move || c.ui().set_modal(admin_ids::ADD_STUDENT_MODAL, true));
    let c = console.clone();
    on_submit(ui, admin_ids::ADD_STUDENT_FORM, move || {
        let ui = c.ui();
        let form = StudentForm {
            name: ui.input_value("student-name"),
            campus: ui.input_value("student-campus"),
            grade: ui.input_value("student-grade"),
            section: ui.input_value("student-section"),
            password: ui.input_value("student-password"),
        };
        spawn(&c, |c| async move { c.add_student(form).await });
    });

    let c = console.clone();
    on_click(ui, "upload-students-btn", move || c.ui().set_modal(admin_ids::UPLOAD_MODAL, true));
    let c = console.clone();
    on_submit(ui, admin_ids::UPLOAD_FORM, move || {
        spawn(&c, |c| async move {
            let file = c.ui().picked_file("students-file").await;
            c.upload_students(file).await
        });
    });
    let c = console.clone();
    on_click(ui, "export-students-btn", move || c.export_students());
    let c = console.clone();
    delegate_row_actions(ui, admin_ids::STUDENTS_TABLE, move |action| {
        spawn(&c, |c| async move { c.student_action(action).await });
    });

    let c = console.clone();
    on_click(ui, "add-task-btn", move || c.ui().set_modal(admin_ids::ADD_TASK_MODAL, true));
    let c = console.clone();
    on_submit(ui, admin_ids::ADD_TASK_FORM, move || {
        let ui = c.ui();
        let form = TaskForm {
            title: ui.input_value("task-title"),
            description: ui.input_value("task-description"),
            language: ui.input_value("task-language").parse().unwrap_or_default(),
            campuses: ui.checked_values("campus-target"),
            grades: ui.checked_values("grade-target"),
        };
        spawn(&c, |c| async move { c.add_task(form).await });
    });
    let c = console.clone();
    delegate_row_actions(ui, admin_ids::TASKS_TABLE, move |action| {
        spawn(&c, |c| async move { c.task_action(action).await });
    });

    let c = console.clone();
    on_click(ui, "generate-report-btn", move || {
        let filter = report_filter(c.ui());
        spawn(&c, |c| async move { c.generate_report(filter).await });
    });
    let c = console.clone();
    on_click(ui, "export-report-btn", move || c.export_report(&report_filter(c.ui())));

    let c = console.clone();
    on_each_click(ui, ".btn-logout", move |_, _| c.logout());
}

fn report_filter(ui: &DomUi) -> ReportFilter {
    ReportFilter {
        campus: ui.input_value("campus-filter"),
        grade: ui.input_value("grade-filter"),
    }
}

#[wasm_bindgen]
pub fn start_student_dashboard() -> Result<(), JsValue> {
    let Some(cx) = open(Role::Student).map_err(to_js)? else {
        return Ok(());
    };
    let dashboard: Rc<Student> = Rc::new(StudentDashboard::new(
        &cx.config,
        cx.session,
        cx.guard,
        cx.transport,
        cx.ui,
    ));
    bind_student(&dashboard);
    spawn(&dashboard, |d| async move { d.start().await });
    Ok(())
}

fn bind_student(dashboard: &Rc<Student>) {
    let ui = dashboard.ui();
    bind_modal_close(ui);
    let select: fn(Rc<Student>, String) = |d, page| spawn_local(async move { d.select_page(&page).await });
    bind_menu(ui, ".menu-item", dashboard, select);
    bind_menu(ui, ".view-all-btn", dashboard, select);

    let d = dashboard.clone();
    on_event(ui, "task-filter", "change", move |_| {
        let filter = d.ui().input_value("task-filter");
        d.filter_tasks(&filter);
    });
    for container in ["recent-tasks-grid", "tasks-list"] {
        let d = dashboard.clone();
        delegate_row_actions(ui, container, move |action| {
            spawn(&d, |d| async move { d.task_action(action).await });
        });
    }
    let d = dashboard.clone();
    on_click(ui, "start-task-btn", move || d.start_selected_task());

    let d = dashboard.clone();
    on_each_click(ui, ".btn-logout", move |_, _| d.logout());
}

fn open_editor(mode: EditorMode) -> Result<Option<Rc<Editor>>> {
    let Some(cx) = open(Role::Student)? else {
        return Ok(None);
    };
    let host = cx
        .ui
        .document()
        .get_element_by_id("editor")
        .ok_or_else(|| anyhow!("page has no #editor host"))?;
    let surface = CodeMirrorSurface::mount(&host, Language::default().syntax_mode());
    let editor = Rc::new(EditorSession::new(
        &cx.config,
        &cx.session,
        mode,
        cx.transport,
        cx.ui,
        surface,
    ));
    bind_editor(&editor);
    Ok(Some(editor))
}

fn bind_editor(editor: &Rc<Editor>) {
    let weak = Rc::downgrade(editor);
    editor.surface().on_change(move || {
        if let Some(editor) = weak.upgrade() {
            editor.refresh_line_count();
        }
    });

    let ui = editor.ui();
    let e = editor.clone();
    on_event(ui, "language", "change", move |_| {
        match e.ui().input_value("language").parse::<Language>() {
            Ok(language) => e.switch_language(language),
            Err(err) => warn!("language not switched: {}", err),
        }
    });
    let e = editor.clone();
    on_click(ui, "installBtn", move || {
        let raw = e.ui().input_value("libraries");
        spawn(&e, |e| async move { e.install_libraries(&raw).await });
    });
    let e = editor.clone();
    on_click(ui, "compileBtn", move || spawn(&e, |e| async move { e.compile_run().await }));
    let e = editor.clone();
    on_click(ui, "clearBtn", move || e.clear());
}

#[wasm_bindgen]
pub fn start_editor() -> Result<(), JsValue> {
    let Some(editor) = open_editor(EditorMode::Task).map_err(to_js)? else {
        return Ok(());
    };
    let ui = editor.ui();
    let e = editor.clone();
    on_click(ui, "submitBtn", move || spawn(&e, |e| async move { e.submit().await }));
    let e = editor.clone();
    on_click(ui, "back-to-tasks-btn", move || e.back_to_tasks());

    let task_id = ui.query_param("task");
    spawn(&editor, |e| async move {
        e.load_task(task_id.as_deref()).await;
    });
    Ok(())
}

#[wasm_bindgen]
pub fn start_practice_editor() -> Result<(), JsValue> {
    open_editor(EditorMode::Standalone).map_err(to_js)?;
    Ok(())
}
