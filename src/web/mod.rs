//! Browser bindings: DOM-backed `Ui`, `sessionStorage` session store and
//! the page entry points exported to JavaScript.

pub mod code_mirror;
pub mod pages;

use std::rc::Rc;

use anyhow::{anyhow, Result};
use js_sys::{Function, Promise, Uint8Array};
use maud::Markup;
use tracing::{debug, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Element, Event, HtmlButtonElement, HtmlElement, HtmlFormElement, HtmlInputElement,
    HtmlSelectElement, HtmlTextAreaElement, Storage, UrlSearchParams, Window,
};

use crate::admin::RosterFile;
use crate::session::SessionStore;
use crate::ui::{Notice, Ui};
use crate::view::RowAction;

const TOAST_CONTAINER: &str = "toast-container";
const TOAST_MILLIS: i32 = 4000;
const CONFIRM_MODAL: &str = "confirm-modal";
const CONFIRM_MESSAGE: &str = "confirm-message";
const CONFIRM_OK: &str = "confirm-ok";
const CONFIRM_CANCEL: &str = "confirm-cancel";

/// `sessionStorage` of the current tab.
pub struct BrowserStore {
    storage: Option<Storage>,
}

impl BrowserStore {
    pub fn new(window: &Window) -> Self {
        let storage = window.session_storage().ok().flatten();
        if storage.is_none() {
            warn!("sessionStorage unavailable, session will not persist");
        }
        Self { storage }
    }
}

impl SessionStore for BrowserStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.set_item(key, value);
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}

pub struct DomUi {
    window: Window,
    document: Document,
}

impl DomUi {
    pub fn new() -> Result<Self> {
        let window = web_sys::window().ok_or_else(|| anyhow!("no global `window` exists"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow!("window has no document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    fn element(&self, id: &str) -> Option<Element> {
        let element = self.document.get_element_by_id(id);
        if element.is_none() {
            debug!("no element #{}", id);
        }
        element
    }

    /// JSON client config from `<html data-config="...">`, empty if absent.
    pub fn config_attribute(&self) -> String {
        self.document
            .document_element()
            .and_then(|root| root.get_attribute("data-config"))
            .unwrap_or_default()
    }

    pub fn origin(&self) -> Result<String> {
        self.window
            .location()
            .origin()
            .map_err(|e| anyhow!("no page origin: {:?}", e))
    }

    pub fn query_param(&self, name: &str) -> Option<String> {
        let search = self.window.location().search().ok()?;
        UrlSearchParams::new_with_str(&search).ok()?.get(name)
    }

    /// Value of an input, select or textarea.
    pub fn input_value(&self, id: &str) -> String {
        let Some(element) = self.element(id) else {
            return String::new();
        };
        if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
            input.value()
        } else if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
            select.value()
        } else if let Some(area) = element.dyn_ref::<HtmlTextAreaElement>() {
            area.value()
        } else {
            String::new()
        }
    }

    /// Values of the checked boxes named `name`.
    pub fn checked_values(&self, name: &str) -> Vec<String> {
        self.select_all(&format!("input[name=\"{}\"]:checked", name))
            .into_iter()
            .filter_map(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .collect()
    }

    pub async fn picked_file(&self, id: &str) -> Option<RosterFile> {
        let input = self.element(id)?.dyn_into::<HtmlInputElement>().ok()?;
        let file = input.files()?.get(0)?;
        let buffer = JsFuture::from(file.array_buffer()).await.ok()?;
        Some(RosterFile {
            name: file.name(),
            bytes: Uint8Array::new(&buffer).to_vec(),
        })
    }

    pub fn select_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn set_active(&self, element: &Element, active: bool) {
        let classes = element.class_list();
        let _ = if active {
            classes.add_1("active")
        } else {
            classes.remove_1("active")
        };
    }

    fn toast_container(&self) -> Option<Element> {
        if let Some(container) = self.document.get_element_by_id(TOAST_CONTAINER) {
            return Some(container);
        }
        let container = self.document.create_element("div").ok()?;
        container.set_id(TOAST_CONTAINER);
        self.document.body()?.append_child(&container).ok()?;
        Some(container)
    }

    async fn confirm_in_modal(&self, message: &str) -> Option<bool> {
        let modal = self.element(CONFIRM_MODAL)?;
        let ok = self.element(CONFIRM_OK)?.dyn_into::<HtmlElement>().ok()?;
        let cancel = self.element(CONFIRM_CANCEL)?.dyn_into::<HtmlElement>().ok()?;
        self.set_text(CONFIRM_MESSAGE, message);
        self.set_active(&modal, true);

        let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
            let accept = resolve.clone();
            let on_ok = Closure::once_into_js(move || {
                let _ = accept.call1(&JsValue::NULL, &JsValue::TRUE);
            });
            let on_cancel = Closure::once_into_js(move || {
                let _ = resolve.call1(&JsValue::NULL, &JsValue::FALSE);
            });
            ok.set_onclick(Some(on_ok.unchecked_ref()));
            cancel.set_onclick(Some(on_cancel.unchecked_ref()));
        });
        let answer = JsFuture::from(promise).await.ok()?.as_bool();

        ok.set_onclick(None);
        cancel.set_onclick(None);
        self.set_active(&modal, false);
        answer
    }
}

impl Ui for DomUi {
    fn mount(&self, container: &str, markup: Markup) {
        if let Some(element) = self.element(container) {
            element.set_inner_html(&markup.into_string());
        }
    }

    fn set_text(&self, element: &str, text: &str) {
        if let Some(element) = self.element(element) {
            element.set_text_content(Some(text));
        }
    }

    fn set_class(&self, element: &str, class: &str) {
        if let Some(element) = self.element(element) {
            element.set_class_name(class);
        }
    }

    fn set_attribute(&self, element: &str, name: &str, value: &str) {
        let Some(element) = self.element(element) else {
            return;
        };
        // `value` is a property on form controls, not just an attribute
        if name == "value" {
            if let Some(select) = element.dyn_ref::<HtmlSelectElement>() {
                select.set_value(value);
                return;
            }
            if let Some(input) = element.dyn_ref::<HtmlInputElement>() {
                input.set_value(value);
                return;
            }
        }
        let _ = element.set_attribute(name, value);
    }

    fn show_page(&self, page: &str) {
        for item in self.select_all(".menu-item") {
            let selected = item.get_attribute("data-page").as_deref() == Some(page);
            self.set_active(&item, selected);
        }
        let target = format!("{}-page", page);
        for panel in self.select_all(".page") {
            self.set_active(&panel, panel.id() == target);
        }
    }

    fn set_modal(&self, modal: &str, open: bool) {
        if let Some(modal) = self.element(modal) {
            self.set_active(&modal, open);
        }
    }

    fn reset_form(&self, form: &str) {
        if let Some(form) = self.element(form) {
            if let Some(form) = form.dyn_ref::<HtmlFormElement>() {
                form.reset();
            }
        }
    }

    fn set_control(&self, control: &str, enabled: bool, label: Option<&str>) {
        let Some(element) = self.element(control) else {
            return;
        };
        if let Some(button) = element.dyn_ref::<HtmlButtonElement>() {
            button.set_disabled(!enabled);
        }
        if let Some(label) = label {
            element.set_text_content(Some(label));
        }
    }

    fn control_label(&self, control: &str) -> String {
        self.element(control)
            .and_then(|el| el.text_content())
            .unwrap_or_default()
    }

    fn notify(&self, notice: Notice) {
        debug!("notice [{}] {}", notice.level.as_str(), notice.text);
        let Some(container) = self.toast_container() else {
            warn!("no toast container for: {}", notice.text);
            return;
        };
        let Ok(toast) = self.document.create_element("div") else {
            return;
        };
        toast.set_class_name(&format!("toast toast-{}", notice.level.as_str()));
        toast.set_text_content(Some(&notice.text));
        if container.append_child(&toast).is_err() {
            return;
        }
        let dismiss = Closure::once_into_js(move || toast.remove());
        let _ = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(dismiss.unchecked_ref(), TOAST_MILLIS);
    }

    async fn confirm(&self, message: &str) -> bool {
        match self.confirm_in_modal(message).await {
            Some(answer) => answer,
            // pages without the confirm modal fall back to the native dialog
            None => self.window.confirm_with_message(message).unwrap_or(false),
        }
    }

    fn navigate(&self, route: &str) {
        if let Err(e) = self.window.location().set_href(route) {
            warn!("navigation to {} failed: {:?}", route, e);
        }
    }
}

/// Runs `handler` for every `event` on the element with `id`.
pub fn on_event<F>(ui: &DomUi, id: &str, event: &str, handler: F)
where
    F: FnMut(Event) + 'static,
{
    let Some(element) = ui.element(id) else {
        return;
    };
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if element
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .is_err()
    {
        warn!("cannot listen for {} on #{}", event, id);
    }
    closure.forget();
}

pub fn on_click<F>(ui: &DomUi, id: &str, mut handler: F)
where
    F: FnMut() + 'static,
{
    on_event(ui, id, "click", move |_| handler());
}

/// Form submit without the page reload.
pub fn on_submit<F>(ui: &DomUi, id: &str, mut handler: F)
where
    F: FnMut() + 'static,
{
    on_event(ui, id, "submit", move |event: Event| {
        event.prevent_default();
        handler();
    });
}

/// Runs `handler` with the clicked element for every element matching
/// `selector`.
pub fn on_each_click<F>(ui: &DomUi, selector: &str, handler: F)
where
    F: Fn(&Element, &Event) + 'static,
{
    let handler = Rc::new(handler);
    for element in ui.select_all(selector) {
        let handler = handler.clone();
        let target = element.clone();
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| handler(&target, &event));
        let _ = element.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

/// One listener on `container` resolving clicks on rendered row controls,
/// so re-rendering never duplicates handlers.
pub fn delegate_row_actions<F>(ui: &DomUi, container: &str, handler: F)
where
    F: Fn(RowAction) + 'static,
{
    on_event(ui, container, "click", move |event: Event| {
        let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(control)) = target.closest("[data-action]") else {
            return;
        };
        let action = control.get_attribute("data-action").unwrap_or_default();
        let id = control.get_attribute("data-id").unwrap_or_default();
        match RowAction::parse(&action, &id) {
            Some(action) => handler(action),
            None => warn!("unknown row action {:?} on {:?}", action, id),
        }
    });
}

/// Closes the enclosing `.modal` of every `.close-modal` control.
pub fn bind_modal_close(ui: &DomUi) {
    on_each_click(ui, ".close-modal", |element, _| {
        if let Ok(Some(modal)) = element.closest(".modal") {
            let _ = modal.class_list().remove_1("active");
        }
    });
}
