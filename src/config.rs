use anyhow::{Context, Result};
use serde::Deserialize;

/// Client settings, usually read from the `data-config` attribute of the
/// document root. Every field has a default so an absent attribute is fine.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Base URL of the server API. Empty means the page origin.
    pub api_base: String,
    pub routes: Routes,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Routes {
    pub login: String,
    pub student_dashboard: String,
    pub editor: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            login: "/".to_string(),
            student_dashboard: "/student/dashboard".to_string(),
            editor: "/editor".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw).context("invalid client config")
    }

    /// Absolute or origin-relative URL for a server path, used for downloads
    /// that go through browser navigation instead of the API client.
    pub fn link(&self, path_and_query: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path_and_query)
    }
}

impl Routes {
    pub fn editor_for(&self, task_id: &str) -> String {
        format!("{}?task={}", self.editor, urlencoding::encode(task_id))
    }
}
