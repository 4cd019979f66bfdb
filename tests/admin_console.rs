//! Admin console flows driven through a scripted server.

mod common;

use classroom_console::admin::{ids, AdminConsole, AdminPage, RosterFile, StudentForm, TaskForm};
use classroom_console::api::Body;
use classroom_console::model::{ReportFilter, Role};
use classroom_console::ui::{Notice, NoticeLevel};
use classroom_console::view::{ActionKind, RowAction};
use common::{RecordingUi, ScriptedTransport};
use http::Method;
use serde_json::json;

type Console = AdminConsole<ScriptedTransport, RecordingUi>;

fn console(server: &ScriptedTransport) -> Console {
    let (guard, _store) = common::guard(Role::Admin);
    AdminConsole::new(
        &common::config(),
        common::session(Role::Admin),
        guard,
        server.clone(),
        RecordingUi::new(),
    )
}

fn student(id: &str, name: &str, campus: &str) -> serde_json::Value {
    json!({"_id": id, "studentID": format!("S-{id}"), "name": name, "campus": campus, "grade": "Grade 7"})
}

fn filled_student_form() -> StudentForm {
    StudentForm {
        name: "Ana".into(),
        campus: "Main".into(),
        grade: "Grade 7".into(),
        section: "B".into(),
        password: "pw".into(),
    }
}

/// Profile fills the header, then the dashboard totals load
#[tokio::test]
async fn test_start_loads_profile_and_dashboard() {
    let server = ScriptedTransport::new();
    server
        .json(Method::GET, "/admin/profile", json!({"username": "root"}))
        .json(
            Method::GET,
            "/admin/students",
            json!([student("1", "Ana", "Main"), student("2", "Ben", "North"), student("3", "Cy", "Main")]),
        )
        .json(
            Method::GET,
            "/admin/tasks",
            json!([{"_id": "t1", "title": "Blink", "language": "arduino"}]),
        )
        .json(
            Method::GET,
            "/admin/reports",
            json!([
                {"task": "Blink", "campus": "Main", "grade": "Grade 7", "totalStudents": 4, "completed": 3, "pending": 1},
                {"task": "Loop", "campus": "North", "grade": "Grade 7", "totalStudents": 2, "completed": 0, "pending": 2}
            ]),
        );
    let console = console(&server);

    console.start().await;

    let ui = console.ui();
    assert_eq!(ui.text(ids::USER_NAME), "root");
    assert_eq!(ui.text(ids::USER_ROLE), "admin");
    assert_eq!(ui.text(ids::TOTAL_STUDENTS), "3");
    assert_eq!(ui.text(ids::TOTAL_TASKS), "1");
    assert_eq!(ui.text(ids::COMPLETED_TASKS), "3");
    assert_eq!(ui.text(ids::PENDING_TASKS), "3");
    let grid = ui.mounted(ids::CAMPUS_GRID);
    assert!(grid.find("Main").unwrap() < grid.find("North").unwrap());
    assert!(ui.notices().is_empty());
}

/// One failing dashboard request does not stop the others
#[tokio::test]
async fn test_dashboard_requests_fail_independently() {
    let server = ScriptedTransport::new();
    server
        .reply(Method::GET, "/admin/students", 500, r#"{"message":"db down"}"#)
        .json(Method::GET, "/admin/tasks", json!([]))
        .json(Method::GET, "/admin/reports", json!([]));
    let console = console(&server);

    console.load_dashboard().await;

    let ui = console.ui();
    assert_eq!(ui.last_notice(), Some(Notice::error("Error: db down")));
    assert_eq!(ui.text(ids::TOTAL_TASKS), "0");
    assert_eq!(ui.text(ids::COMPLETED_TASKS), "0");
}

/// A slow dashboard load that a newer one overtook paints nothing
#[tokio::test]
async fn test_stale_dashboard_load_is_discarded() {
    let server = ScriptedTransport::new();
    server
        .slow_json(
            Method::GET,
            "/admin/students",
            3,
            json!([student("1", "Ana", "Main"), student("2", "Ben", "North"), student("3", "Cy", "Main")]),
        )
        .json(Method::GET, "/admin/students", json!([student("4", "Di", "Main")]))
        .json(Method::GET, "/admin/tasks", json!([]))
        .json(Method::GET, "/admin/reports", json!([]));
    let console = console(&server);

    tokio::join!(console.load_dashboard(), console.load_dashboard());

    let ui = console.ui();
    assert_eq!(ui.text(ids::TOTAL_STUDENTS), "1");
    assert!(!ui.mounted(ids::CAMPUS_GRID).contains("North"));
    assert_eq!(ui.mount_count(ids::CAMPUS_GRID), 1);
    assert_eq!(server.count(&Method::GET, "/admin/tasks"), 1);
}

#[tokio::test]
async fn test_profile_failure_logs_out() {
    let server = ScriptedTransport::new();
    server.reply(Method::GET, "/admin/profile", 401, r#"{"message":"Invalid token"}"#);
    let console = console(&server);

    console.start().await;

    let ui = console.ui();
    assert!(ui.has_notice(NoticeLevel::Error, "Error: Invalid token"));
    assert_eq!(ui.navigations(), vec!["/".to_string()]);
    assert_eq!(server.count(&Method::GET, "/admin/students"), 0);
}

/// Switching students then reports runs exactly one reports load
#[tokio::test]
async fn test_page_switch_loads_each_page_once() {
    let server = ScriptedTransport::new();
    server
        .json(Method::GET, "/admin/students", json!([]))
        .json(Method::GET, "/admin/reports", json!([]));
    let console = console(&server);

    console.select_page("students").await;
    console.select_page("reports").await;

    assert_eq!(console.active_page(), AdminPage::Reports);
    assert_eq!(console.ui().active_page().as_deref(), Some("reports"));
    assert_eq!(server.count(&Method::GET, "/admin/students"), 1);
    assert_eq!(server.count(&Method::GET, "/admin/reports"), 1);
    assert!(console.ui().mounted(ids::REPORTS_TABLE).contains("No reports found"));

    console.select_page("settings").await;
    assert_eq!(console.active_page(), AdminPage::Reports);
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn test_students_render_with_row_actions() {
    let server = ScriptedTransport::new();
    server.json(
        Method::GET,
        "/admin/students",
        json!([student("42", "<Ana>", "Main")]),
    );
    let console = console(&server);

    console.load_students().await;

    let table = console.ui().mounted(ids::STUDENTS_TABLE);
    assert!(table.contains("&lt;Ana&gt;"));
    assert!(table.contains(r#"data-action="delete" data-id="42""#));
    assert!(table.contains("<td>-</td>"));
}

/// Declining the confirmation sends nothing
#[tokio::test]
async fn test_declined_delete_sends_nothing() {
    let server = ScriptedTransport::new();
    let console = console(&server);
    console.ui().answer_confirm(false);

    console
        .student_action(RowAction::parse("delete", "42").unwrap())
        .await;

    assert_eq!(
        console.ui().confirm_prompts(),
        vec!["Are you sure you want to delete this student?".to_string()]
    );
    assert!(server.requests().is_empty());
}

/// Accepting deletes once and re-renders from a fresh fetch
#[tokio::test]
async fn test_accepted_delete_refetches_list() {
    let server = ScriptedTransport::new();
    server
        .json(Method::DELETE, "/admin/students/2", json!({"success": true}))
        .json(
            Method::GET,
            "/admin/students",
            json!([student("1", "Ana", "Main"), student("2", "Ben", "Main")]),
        )
        .json(Method::GET, "/admin/students", json!([student("1", "Ana", "Main")]));
    let console = console(&server);
    console.load_students().await;
    assert_eq!(console.ui().mounted(ids::STUDENTS_TABLE).matches("<tr").count(), 2);

    console.ui().answer_confirm(true);
    console.delete_student("2").await;

    assert_eq!(server.count(&Method::DELETE, "/admin/students/2"), 1);
    assert_eq!(server.count(&Method::GET, "/admin/students"), 2);
    assert_eq!(console.ui().mounted(ids::STUDENTS_TABLE).matches("<tr").count(), 1);
    assert!(console
        .ui()
        .has_notice(NoticeLevel::Success, "Student deleted successfully"));
}

#[tokio::test]
async fn test_rejected_delete_surfaces_server_message() {
    let server = ScriptedTransport::new();
    server.json(
        Method::DELETE,
        "/admin/tasks/t1",
        json!({"success": false, "message": "Task has submissions"}),
    );
    let console = console(&server);
    console.ui().answer_confirm(true);

    console.task_action(RowAction::parse("delete", "t1").unwrap()).await;

    assert_eq!(
        console.ui().last_notice(),
        Some(Notice::error("Error: Task has submissions"))
    );
    assert_eq!(server.count(&Method::GET, "/admin/tasks"), 0);
}

#[tokio::test]
async fn test_edit_is_not_available() {
    let server = ScriptedTransport::new();
    let console = console(&server);

    console
        .student_action(RowAction {
            kind: ActionKind::Edit,
            id: "1".into(),
        })
        .await;

    assert!(console
        .ui()
        .has_notice(NoticeLevel::Info, "Edit functionality not implemented yet"));
    assert!(server.requests().is_empty());
}

/// Client-side validation stops the request before it is sent
#[tokio::test]
async fn test_invalid_forms_send_nothing() {
    let server = ScriptedTransport::new();
    let console = console(&server);

    console
        .add_student(StudentForm {
            name: "Ana".into(),
            ..Default::default()
        })
        .await;
    console
        .add_task(TaskForm {
            title: "Blink".into(),
            grades: vec!["Grade 7".into()],
            ..Default::default()
        })
        .await;

    let ui = console.ui();
    assert!(ui.has_notice(NoticeLevel::Warning, "Please select a campus"));
    assert!(ui.has_notice(NoticeLevel::Warning, "Please select at least one target campus"));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_add_student_restores_button_and_reloads() {
    let server = ScriptedTransport::new();
    server
        .json(Method::POST, "/admin/students", json!({"success": true}))
        .json(Method::GET, "/admin/students", json!([student("1", "Ana", "Main")]));
    let console = console(&server);
    let ui = console.ui();
    ui.set_control_label(ids::ADD_STUDENT_SUBMIT, "Add Student");

    console.add_student(filled_student_form()).await;

    assert_eq!(
        ui.control_history(ids::ADD_STUDENT_SUBMIT),
        vec![
            (false, Some("Adding...".to_string())),
            (true, Some("Add Student".to_string()))
        ]
    );
    let sent = server.last(&Method::POST, "/admin/students").unwrap();
    assert_eq!(
        sent.body,
        Body::Json(json!({"name": "Ana", "campus": "Main", "grade": "Grade 7", "section": "B", "password": "pw"}))
    );
    assert_eq!(sent.token.as_deref(), Some("tok-123"));
    assert!(!ui.modal_open(ids::ADD_STUDENT_MODAL));
    assert_eq!(ui.reset_forms(), vec![ids::ADD_STUDENT_FORM.to_string()]);
    assert!(ui.has_notice(NoticeLevel::Success, "Student added successfully!"));
    assert_eq!(server.count(&Method::GET, "/admin/students"), 1);
}

/// The button comes back even when the request fails
#[tokio::test]
async fn test_failed_add_still_restores_button() {
    let server = ScriptedTransport::new();
    server.fail(Method::POST, "/admin/students", "connection reset");
    let console = console(&server);
    let ui = console.ui();
    ui.set_control_label(ids::ADD_STUDENT_SUBMIT, "Add Student");

    console.add_student(filled_student_form()).await;

    assert_eq!(
        ui.control(ids::ADD_STUDENT_SUBMIT),
        Some((true, "Add Student".to_string()))
    );
    assert_eq!(ui.last_notice(), Some(Notice::error("Error: connection reset")));
    assert_eq!(server.count(&Method::GET, "/admin/students"), 0);
}

#[tokio::test]
async fn test_add_task_sends_targets() {
    let server = ScriptedTransport::new();
    server
        .json(Method::POST, "/admin/tasks", json!({"status": "success"}))
        .json(Method::GET, "/admin/tasks", json!([]));
    let console = console(&server);

    console
        .add_task(TaskForm {
            title: " Blink ".into(),
            description: "Blink an LED".into(),
            language: "python".parse().unwrap(),
            campuses: vec!["Main".into(), "North".into()],
            grades: vec!["Grade 7".into()],
        })
        .await;

    let sent = server.last(&Method::POST, "/admin/tasks").unwrap();
    assert_eq!(
        sent.body,
        Body::Json(json!({
            "title": "Blink",
            "description": "Blink an LED",
            "language": "python",
            "campusTarget": ["Main", "North"],
            "gradeTarget": ["Grade 7"]
        }))
    );
    assert!(console.ui().has_notice(NoticeLevel::Success, "Task added successfully!"));
    assert!(console.ui().mounted(ids::TASKS_TABLE).contains("No tasks found"));
}

#[tokio::test]
async fn test_upload_requires_a_file() {
    let server = ScriptedTransport::new();
    let console = console(&server);

    console.upload_students(None).await;

    assert!(console
        .ui()
        .has_notice(NoticeLevel::Warning, "Please select a file to upload"));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_upload_reports_count() {
    let server = ScriptedTransport::new();
    server
        .json(
            Method::POST,
            "/admin/students/upload",
            json!({"success": true, "students": [{"name": "a"}, {"name": "b"}]}),
        )
        .json(Method::GET, "/admin/students", json!([]));
    let console = console(&server);

    console
        .upload_students(Some(RosterFile {
            name: "roster.xlsx".into(),
            bytes: vec![1, 2, 3],
        }))
        .await;

    let sent = server.last(&Method::POST, "/admin/students/upload").unwrap();
    match sent.body {
        Body::Multipart(part) => {
            assert_eq!(part.field, "file");
            assert_eq!(part.file_name, "roster.xlsx");
            assert_eq!(part.bytes, vec![1, 2, 3]);
        }
        other => panic!("expected multipart body, got {other:?}"),
    }
    assert!(console
        .ui()
        .has_notice(NoticeLevel::Success, "2 students uploaded successfully!"));
    assert!(!console.ui().modal_open(ids::UPLOAD_MODAL));
}

#[tokio::test]
async fn test_report_filter_goes_in_query() {
    let server = ScriptedTransport::new();
    server.json(
        Method::GET,
        "/admin/reports",
        json!([{"task": "Blink", "campus": "Main", "grade": "Grade 7", "totalStudents": 4, "completed": 3, "pending": 1}]),
    );
    let console = console(&server);

    console
        .generate_report(ReportFilter {
            campus: "Main".into(),
            grade: String::new(),
        })
        .await;

    let sent = server.last(&Method::GET, "/admin/reports").unwrap();
    assert_eq!(
        sent.query,
        vec![
            ("campus".to_string(), "Main".to_string()),
            ("grade".to_string(), String::new())
        ]
    );
    assert!(console.ui().mounted(ids::REPORTS_TABLE).contains("75%"));
}

#[tokio::test]
async fn test_exports_navigate_with_token() {
    let server = ScriptedTransport::new();
    let console = console(&server);

    console.export_students();
    console.export_report(&ReportFilter {
        campus: "North Hill".into(),
        grade: "Grade 7".into(),
    });

    assert_eq!(
        console.ui().navigations(),
        vec![
            "/admin/export/students?token=tok-123".to_string(),
            "/admin/export/submissions?campus=North%20Hill&grade=Grade%207&token=tok-123".to_string(),
        ]
    );
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_logout_returns_to_login() {
    let server = ScriptedTransport::new();
    let console = console(&server);

    console.logout();

    assert_eq!(console.ui().navigations(), vec!["/".to_string()]);
}
