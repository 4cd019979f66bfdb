use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "student" => Ok(Role::Student),
            other => Err(anyhow::anyhow!("unknown role: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Languages the compile service accepts.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Arduino,
    Python,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Arduino => "arduino",
            Language::Python => "python",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Arduino => "Arduino",
            Language::Python => "Python",
        }
    }

    /// CodeMirror mode for the editing surface.
    pub fn syntax_mode(&self) -> &'static str {
        match self {
            Language::Arduino => "text/x-c++src",
            Language::Python => "python",
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Language::Arduino => "sketch.ino",
            Language::Python => "script.py",
        }
    }

    pub fn library_hint(&self) -> &'static str {
        match self {
            Language::Arduino => "Libraries (e.g., Servo, Wire)",
            Language::Python => "Packages (e.g., numpy, pandas)",
        }
    }

    /// Starting source for a task that has no prior submission.
    pub fn boilerplate(&self) -> &'static str {
        match self {
            Language::Arduino => {
                "void setup() {\n  // put your setup code here, to run once:\n  \n}\n\nvoid loop() {\n  // put your main code here, to run repeatedly:\n  \n}"
            }
            Language::Python => "# Write your Python code here\nprint(\"Hello, World!\")",
        }
    }

    /// Starting source for the practice editor.
    pub fn practice_boilerplate(&self) -> &'static str {
        match self {
            Language::Arduino => {
                "void setup() {\n  // put your setup code here\n}\n\nvoid loop() {\n  // put your main code here\n}"
            }
            Language::Python => "print(\"Hello World\")",
        }
    }

    pub fn install_endpoint(&self) -> &'static str {
        match self {
            Language::Arduino => "/editor/install_libraries",
            Language::Python => "/editor/install_python_libs",
        }
    }

    pub fn compile_endpoint(&self) -> &'static str {
        match self {
            Language::Arduino => "/editor/compile/arduino",
            Language::Python => "/editor/compile/python",
        }
    }
}

impl FromStr for Language {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arduino" => Ok(Language::Arduino),
            "python" => Ok(Language::Python),
            other => Err(anyhow::anyhow!("unsupported language: {other}")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(anyhow::anyhow!("unknown task status: {other}")),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "studentID", default)]
    pub student_id: String,
    pub name: String,
    pub campus: String,
    pub grade: String,
    #[serde(default)]
    pub section: Option<String>,
}

/// Body of a student creation request. The password is write-only.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub campus: String,
    pub grade: String,
    pub section: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub language: Language,
    #[serde(default)]
    pub campus_target: Vec<String>,
    #[serde(default)]
    pub grade_target: Vec<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub language: Language,
    pub campus_target: Vec<String>,
    pub grade_target: Vec<String>,
}

/// A task as the student endpoints return it, with the caller's progress.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StudentTask {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub language: Language,
    #[serde(default)]
    pub status: TaskStatus,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub task: String,
    pub campus: String,
    pub grade: String,
    pub total_students: u32,
    pub completed: u32,
    pub pending: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ReportFilter {
    pub campus: String,
    pub grade: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AdminProfile {
    pub username: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StudentProfile {
    pub name: String,
    #[serde(rename = "studentID", default)]
    pub student_id: String,
    #[serde(default)]
    pub campus: String,
    #[serde(default)]
    pub grade: String,
    #[serde(default)]
    pub section: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub task_id: String,
    pub code: String,
    pub output: String,
}

#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PriorSubmission {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct InstallRequest {
    pub libraries: Vec<String>,
    pub language: Language,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct CompileRequest {
    pub code: String,
    pub language: Language,
}

/// Envelope of mutation endpoints.
///
/// Some routes report the outcome as `success: bool`, others as
/// `status: "success" | "error"`; both are accepted.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MutationResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MutationResponse {
    pub fn is_success(&self) -> bool {
        match self.success {
            Some(success) => success,
            None => self.status.as_deref() == Some("success"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Success,
    #[serde(other)]
    Error,
}

/// Envelope of compile and install endpoints.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RunResponse {
    pub status: RunStatus,
    #[serde(default)]
    pub output: String,
}

impl RunResponse {
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Success
    }
}
