//! Scripted transport and recording UI shared by the controller tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use classroom_console::api::{ApiRequest, RawResponse, Transport, TransportError};
use classroom_console::config::ClientConfig;
use classroom_console::editor::CodeSurface;
use classroom_console::model::Role;
use classroom_console::session::{MemoryStore, Session, SessionGuard, SessionStore};
use classroom_console::ui::{Notice, NoticeLevel, Ui};
use http::{Method, StatusCode};
use maud::Markup;
use serde_json::Value;

#[derive(Clone, Debug)]
enum Reply {
    Respond {
        status: u16,
        body: String,
        yields: usize,
    },
    Fail(String),
}

#[derive(Default)]
struct Script {
    routes: HashMap<(Method, String), VecDeque<Reply>>,
    requests: Vec<ApiRequest>,
}

/// Answers requests from per-route queues. The last reply of a route is
/// repeated once the queue runs down to it; unscripted routes get a 404.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: Method, path: &str, reply: Reply) -> &Self {
        self.script
            .borrow_mut()
            .routes
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn reply(&self, method: Method, path: &str, status: u16, body: &str) -> &Self {
        self.push(
            method,
            path,
            Reply::Respond {
                status,
                body: body.to_string(),
                yields: 0,
            },
        )
    }

    pub fn json(&self, method: Method, path: &str, body: Value) -> &Self {
        self.reply(method, path, 200, &body.to_string())
    }

    /// Like `json`, but the response only arrives after the executor has
    /// been yielded to `yields` times.
    pub fn slow_json(&self, method: Method, path: &str, yields: usize, body: Value) -> &Self {
        self.push(
            method,
            path,
            Reply::Respond {
                status: 200,
                body: body.to_string(),
                yields,
            },
        )
    }

    pub fn fail(&self, method: Method, path: &str, reason: &str) -> &Self {
        self.push(method, path, Reply::Fail(reason.to_string()))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.script.borrow().requests.clone()
    }

    pub fn count(&self, method: &Method, path: &str) -> usize {
        self.script
            .borrow()
            .requests
            .iter()
            .filter(|r| r.method == *method && r.path == path)
            .count()
    }

    pub fn last(&self, method: &Method, path: &str) -> Option<ApiRequest> {
        self.script
            .borrow()
            .requests
            .iter()
            .rev()
            .find(|r| r.method == *method && r.path == path)
            .cloned()
    }

    fn next_reply(&self, request: &ApiRequest) -> Option<Reply> {
        let mut script = self.script.borrow_mut();
        script.requests.push(request.clone());
        let queue = script
            .routes
            .get_mut(&(request.method.clone(), request.path.clone()))?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let reply = self.next_reply(&request);
        match reply {
            Some(Reply::Respond { status, body, yields }) => {
                for _ in 0..yields {
                    tokio::task::yield_now().await;
                }
                let status = StatusCode::from_u16(status).map_err(|e| TransportError(e.to_string()))?;
                Ok(RawResponse {
                    status,
                    status_text: status.canonical_reason().unwrap_or_default().to_string(),
                    body,
                })
            }
            Some(Reply::Fail(reason)) => Err(TransportError(reason)),
            None => Ok(RawResponse {
                status: StatusCode::NOT_FOUND,
                status_text: "Not Found".to_string(),
                body: String::new(),
            }),
        }
    }
}

#[derive(Default)]
pub struct UiLog {
    pub mounts: HashMap<String, String>,
    pub mount_counts: HashMap<String, usize>,
    pub texts: HashMap<String, String>,
    pub classes: HashMap<String, String>,
    pub attributes: HashMap<(String, String), String>,
    pub active_page: Option<String>,
    pub modals: HashMap<String, bool>,
    pub reset_forms: Vec<String>,
    pub controls: HashMap<String, (bool, String)>,
    pub control_history: Vec<(String, bool, Option<String>)>,
    pub notices: Vec<Notice>,
    pub confirm_prompts: Vec<String>,
    pub confirm_answers: VecDeque<bool>,
    pub navigations: Vec<String>,
}

/// Remembers everything painted into it.
#[derive(Clone, Default)]
pub struct RecordingUi {
    log: Rc<RefCell<UiLog>>,
}

impl RecordingUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.log.borrow_mut().confirm_answers.push_back(answer);
    }

    /// Gives a control its initial label, as the page markup would.
    pub fn set_control_label(&self, control: &str, label: &str) {
        self.log
            .borrow_mut()
            .controls
            .insert(control.to_string(), (true, label.to_string()));
    }

    pub fn mounted(&self, container: &str) -> String {
        self.log.borrow().mounts.get(container).cloned().unwrap_or_default()
    }

    pub fn mount_count(&self, container: &str) -> usize {
        self.log.borrow().mount_counts.get(container).copied().unwrap_or(0)
    }

    pub fn text(&self, element: &str) -> String {
        self.log.borrow().texts.get(element).cloned().unwrap_or_default()
    }

    pub fn class(&self, element: &str) -> String {
        self.log.borrow().classes.get(element).cloned().unwrap_or_default()
    }

    pub fn attribute(&self, element: &str, name: &str) -> Option<String> {
        self.log
            .borrow()
            .attributes
            .get(&(element.to_string(), name.to_string()))
            .cloned()
    }

    pub fn active_page(&self) -> Option<String> {
        self.log.borrow().active_page.clone()
    }

    pub fn modal_open(&self, modal: &str) -> bool {
        self.log.borrow().modals.get(modal).copied().unwrap_or(false)
    }

    pub fn reset_forms(&self) -> Vec<String> {
        self.log.borrow().reset_forms.clone()
    }

    pub fn control(&self, control: &str) -> Option<(bool, String)> {
        self.log.borrow().controls.get(control).cloned()
    }

    pub fn control_history(&self, control: &str) -> Vec<(bool, Option<String>)> {
        self.log
            .borrow()
            .control_history
            .iter()
            .filter(|(id, _, _)| id == control)
            .map(|(_, enabled, label)| (*enabled, label.clone()))
            .collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.log.borrow().notices.clone()
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.log.borrow().notices.last().cloned()
    }

    pub fn has_notice(&self, level: NoticeLevel, text: &str) -> bool {
        self.log
            .borrow()
            .notices
            .iter()
            .any(|n| n.level == level && n.text == text)
    }

    pub fn confirm_prompts(&self) -> Vec<String> {
        self.log.borrow().confirm_prompts.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.log.borrow().navigations.clone()
    }
}

impl Ui for RecordingUi {
    fn mount(&self, container: &str, markup: Markup) {
        let mut log = self.log.borrow_mut();
        log.mounts.insert(container.to_string(), markup.into_string());
        *log.mount_counts.entry(container.to_string()).or_default() += 1;
    }

    fn set_text(&self, element: &str, text: &str) {
        self.log.borrow_mut().texts.insert(element.to_string(), text.to_string());
    }

    fn set_class(&self, element: &str, class: &str) {
        self.log.borrow_mut().classes.insert(element.to_string(), class.to_string());
    }

    fn set_attribute(&self, element: &str, name: &str, value: &str) {
        self.log
            .borrow_mut()
            .attributes
            .insert((element.to_string(), name.to_string()), value.to_string());
    }

    fn show_page(&self, page: &str) {
        self.log.borrow_mut().active_page = Some(page.to_string());
    }

    fn set_modal(&self, modal: &str, open: bool) {
        self.log.borrow_mut().modals.insert(modal.to_string(), open);
    }

    fn reset_form(&self, form: &str) {
        self.log.borrow_mut().reset_forms.push(form.to_string());
    }

    fn set_control(&self, control: &str, enabled: bool, label: Option<&str>) {
        let mut log = self.log.borrow_mut();
        log.control_history
            .push((control.to_string(), enabled, label.map(str::to_string)));
        let entry = log.controls.entry(control.to_string()).or_default();
        entry.0 = enabled;
        if let Some(label) = label {
            entry.1 = label.to_string();
        }
    }

    fn control_label(&self, control: &str) -> String {
        self.log
            .borrow()
            .controls
            .get(control)
            .map(|(_, label)| label.clone())
            .unwrap_or_default()
    }

    fn notify(&self, notice: Notice) {
        self.log.borrow_mut().notices.push(notice);
    }

    async fn confirm(&self, message: &str) -> bool {
        let mut log = self.log.borrow_mut();
        log.confirm_prompts.push(message.to_string());
        log.confirm_answers.pop_front().unwrap_or(false)
    }

    fn navigate(&self, route: &str) {
        self.log.borrow_mut().navigations.push(route.to_string());
    }
}

#[derive(Default)]
pub struct FakeSurface {
    code: RefCell<String>,
    syntax: RefCell<String>,
}

impl FakeSurface {
    pub fn syntax(&self) -> String {
        self.syntax.borrow().clone()
    }
}

impl CodeSurface for FakeSurface {
    fn code(&self) -> String {
        self.code.borrow().clone()
    }

    fn set_code(&self, code: &str) {
        *self.code.borrow_mut() = code.to_string();
    }

    fn set_syntax(&self, mode: &str) {
        *self.syntax.borrow_mut() = mode.to_string();
    }
}

pub fn session(role: Role) -> Session {
    Session {
        token: "tok-123".to_string(),
        role,
    }
}

/// A guard over an in-memory store already holding a `role` session.
pub fn guard(role: Role) -> (SessionGuard, Rc<MemoryStore>) {
    let store = Rc::new(MemoryStore::with_session("tok-123", role));
    let shared: Rc<dyn SessionStore> = store.clone();
    (SessionGuard::new(shared, "/"), store)
}

pub fn config() -> ClientConfig {
    ClientConfig::default()
}
