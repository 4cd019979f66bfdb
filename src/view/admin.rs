use maud::{html, Markup};

use super::{completion_rate, ActionKind};
use crate::model::{ReportRow, Student, Task};

/// Students of one campus, in first-seen order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CampusSummary {
    pub campus: String,
    pub students: usize,
}

pub fn group_by_campus(students: &[Student]) -> Vec<CampusSummary> {
    let mut groups: Vec<CampusSummary> = Vec::new();
    for student in students {
        match groups.iter_mut().find(|g| g.campus == student.campus) {
            Some(group) => group.students += 1,
            None => groups.push(CampusSummary {
                campus: student.campus.clone(),
                students: 1,
            }),
        }
    }
    groups
}

/// Completed and pending totals across report rows.
pub fn report_totals(rows: &[ReportRow]) -> (u32, u32) {
    rows.iter()
        .fold((0, 0), |(done, open), row| (done + row.completed, open + row.pending))
}

fn row_buttons(id: &str) -> Markup {
    html! {
        button.action-btn.btn-edit data-action=(ActionKind::Edit.as_str()) data-id=(id) {
            i.fas.fa-edit {} " Edit"
        }
        " "
        button.action-btn.btn-delete data-action=(ActionKind::Delete.as_str()) data-id=(id) {
            i.fas.fa-trash {} " Delete"
        }
    }
}

pub fn students_table(students: &[Student]) -> Markup {
    html! {
        @if students.is_empty() {
            tr { td colspan="6" class="text-center" { "No students found" } }
        } @else {
            @for student in students {
                tr data-id=(student.id) {
                    td { (student.student_id) }
                    td { (student.name) }
                    td { (student.campus) }
                    td { (student.grade) }
                    td { (student.section.as_deref().filter(|s| !s.is_empty()).unwrap_or("-")) }
                    td { (row_buttons(&student.id)) }
                }
            }
        }
    }
}

pub fn tasks_table(tasks: &[Task]) -> Markup {
    html! {
        @if tasks.is_empty() {
            tr { td colspan="6" class="text-center" { "No tasks found" } }
        } @else {
            @for task in tasks {
                tr data-id=(task.id) {
                    td { (task.title) }
                    td { (task.description) }
                    td { (task.language.as_str()) }
                    td { (task.campus_target.join(", ")) }
                    td { (task.grade_target.join(", ")) }
                    td { (row_buttons(&task.id)) }
                }
            }
        }
    }
}

pub fn reports_table(rows: &[ReportRow]) -> Markup {
    html! {
        @if rows.is_empty() {
            tr { td colspan="7" class="text-center" { "No reports found" } }
        } @else {
            @for row in rows {
                tr {
                    td { (row.task) }
                    td { (row.campus) }
                    td { (row.grade) }
                    td { (row.total_students) }
                    td { (row.completed) }
                    td { (row.pending) }
                    td { (completion_rate(row.total_students, row.completed)) "%" }
                }
            }
        }
    }
}

// Task counts and completion per campus are not reported by the server yet,
// so those two stats stay at zero.
pub fn campus_cards(groups: &[CampusSummary]) -> Markup {
    html! {
        @if groups.is_empty() {
            p.empty-state { "No campuses yet." }
        } @else {
            @for group in groups {
                div.campus-card {
                    h3 { (group.campus) }
                    div.campus-stats {
                        div.campus-stat {
                            div.campus-stat-value { (group.students) }
                            div.campus-stat-label { "Students" }
                        }
                        div.campus-stat {
                            div.campus-stat-value { "0" }
                            div.campus-stat-label { "Tasks" }
                        }
                        div.campus-stat {
                            div.campus-stat-value { "0%" }
                            div.campus-stat-label { "Completion" }
                        }
                    }
                    div.campus-progress {
                        div.campus-progress-bar style="width: 0%" {}
                    }
                }
            }
        }
    }
}
