use maud::{html, Markup};

use super::ActionKind;
use crate::model::{StudentTask, TaskStatus};

/// Cards shown on the dashboard.
pub const RECENT_TASKS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct TaskCounts {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskCounts {
    pub fn from_tasks(tasks: &[StudentTask]) -> Self {
        let total = tasks.len();
        let completed = tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}

fn action_label(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Completed => "View",
        TaskStatus::Pending => "Start",
    }
}

pub fn task_cards(tasks: &[StudentTask]) -> Markup {
    if tasks.is_empty() {
        return html! { p.empty-state { "No tasks assigned yet." } };
    }
    html! {
        @for task in tasks {
            div.task-card data-status=(task.status.as_str()) {
                h3 { (task.title) }
                p.task-description { (task.description) }
                div.task-meta {
                    span class=(format!("task-language {}", task.language.as_str())) { (task.language.as_str()) }
                    " "
                    span class=(format!("task-status {}", task.status.as_str())) { (task.status.as_str()) }
                }
                div.task-actions {
                    button.btn-view data-action=(ActionKind::View.as_str()) data-id=(task.id) {
                        (action_label(task.status))
                    }
                }
            }
        }
    }
}
