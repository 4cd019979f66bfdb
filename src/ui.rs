use maud::Markup;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        }
    }
}

/// A non-blocking notification shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, text: text.into() }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, text: text.into() }
    }
}

/// The presentation surface controllers paint into.
///
/// Elements are addressed by id. Implementations decide how a page, modal or
/// control is shown; controllers only state what should be visible.
pub trait Ui {
    /// Replaces the children of `container` with `markup`.
    fn mount(&self, container: &str, markup: Markup);
    fn set_text(&self, element: &str, text: &str);
    fn set_class(&self, element: &str, class: &str);
    fn set_attribute(&self, element: &str, name: &str, value: &str);
    /// Marks `page` and its navigation item active and every other one inactive.
    fn show_page(&self, page: &str);
    fn set_modal(&self, modal: &str, open: bool);
    fn reset_form(&self, form: &str);
    fn set_control(&self, control: &str, enabled: bool, label: Option<&str>);
    fn control_label(&self, control: &str) -> String;
    fn notify(&self, notice: Notice);
    #[allow(async_fn_in_trait)]
    async fn confirm(&self, message: &str) -> bool;
    fn navigate(&self, route: &str);
}

/// Disables a button for the lifetime of the guard and restores its label
/// and enabled state on drop, whatever the outcome of the request.
pub struct BusyControl<'a, U: Ui> {
    ui: &'a U,
    control: &'a str,
    label: String,
}

impl<'a, U: Ui> BusyControl<'a, U> {
    pub fn new(ui: &'a U, control: &'a str, busy_label: &str) -> Self {
        let label = ui.control_label(control);
        ui.set_control(control, false, Some(busy_label));
        debug!("{} busy", control);
        Self { ui, control, label }
    }
}

impl<U: Ui> Drop for BusyControl<'_, U> {
    fn drop(&mut self) {
        self.ui.set_control(self.control, true, Some(&self.label));
    }
}
