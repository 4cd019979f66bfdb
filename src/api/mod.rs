pub mod error;
pub mod remote;

pub use error::{derive_message, ApiError, TransportError};

use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::ClientConfig;
use crate::model::{
    AdminProfile, CompileRequest, InstallRequest, Language, MutationResponse, NewStudent,
    NewTask, PriorSubmission, ReportFilter, ReportRow, RunResponse, Student, StudentProfile,
    StudentTask, SubmitRequest, Task,
};
use crate::session::Session;

/// A file attached to a multipart request.
#[derive(Clone, Debug, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    Multipart(FilePart),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub token: Option<String>,
    pub body: Body,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub status_text: String,
    pub body: String,
}

/// Moves one request to the server and brings back whatever came back,
/// success or not. Only failures to get any response are errors here.
pub trait Transport {
    #[allow(async_fn_in_trait)]
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError>;
}

/// Authenticated client for the classroom server.
pub struct ApiClient<T> {
    transport: T,
    token: String,
    config: ClientConfig,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, session: &Session, config: &ClientConfig) -> Self {
        Self {
            transport,
            token: session.token.clone(),
            config: config.clone(),
        }
    }

    fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest {
            method,
            path: path.to_string(),
            query: Vec::new(),
            token: Some(self.token.clone()),
            body: Body::Empty,
        }
    }

    async fn execute(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();
        debug!("{} {}", method, path);
        let response = self.transport.send(request).await.map_err(|e| {
            error!("{} {} failed: {}", method, path, e);
            ApiError::from(e)
        })?;
        info!("{} {} -> {}", method, path, response.status);
        Ok(response)
    }

    /// Sends `request` and decodes a 2xx body as `R`.
    async fn call<R: DeserializeOwned>(&self, request: ApiRequest, fallback: &str) -> Result<R, ApiError> {
        let response = self.execute(request).await?;
        if !response.status.is_success() {
            let message = derive_message(&response, fallback);
            error!("request rejected with {}: {}", response.status, message);
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }
        serde_json::from_str(&response.body).map_err(|e| {
            error!("unexpected response body: {:?}", e);
            ApiError::Decode {
                context: fallback.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Like `call`, for `{success, message}` envelopes; `success: false`
    /// becomes `ApiError::Rejected`.
    async fn mutate(&self, request: ApiRequest, fallback: &str) -> Result<MutationResponse, ApiError> {
        let response: MutationResponse = self.call(request, fallback).await?;
        if response.is_success() {
            Ok(response)
        } else {
            let message = response
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| fallback.to_string());
            Err(ApiError::Rejected(message))
        }
    }

    /// Compile and install endpoints answer `{status, output}` even on
    /// non-2xx statuses, so the body is decoded first.
    async fn run(&self, request: ApiRequest, fallback: &str) -> Result<RunResponse, ApiError> {
        let response = self.execute(request).await?;
        match serde_json::from_str::<RunResponse>(&response.body) {
            Ok(run) => Ok(run),
            Err(_) if !response.status.is_success() => Err(ApiError::Status {
                status: response.status,
                message: derive_message(&response, fallback),
            }),
            Err(e) => Err(ApiError::Decode {
                context: fallback.to_string(),
                detail: e.to_string(),
            }),
        }
    }

    fn json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<ApiRequest, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Decode {
            context: "Failed to encode request".to_string(),
            detail: e.to_string(),
        })?;
        let mut request = self.request(method, path);
        request.body = Body::Json(value);
        Ok(request)
    }

    pub async fn admin_profile(&self) -> Result<AdminProfile, ApiError> {
        self.call(self.request(Method::GET, "/admin/profile"), "Failed to load profile. Please try again.")
            .await
    }

    pub async fn student_profile(&self) -> Result<StudentProfile, ApiError> {
        self.call(self.request(Method::GET, "/student/profile"), "Failed to load profile. Please try again.")
            .await
    }

    pub async fn students(&self) -> Result<Vec<Student>, ApiError> {
        self.call(self.request(Method::GET, "/admin/students"), "Failed to load students data")
            .await
    }

    pub async fn create_student(&self, student: &NewStudent) -> Result<MutationResponse, ApiError> {
        let request = self.json(Method::POST, "/admin/students", student)?;
        self.mutate(request, "Failed to add student").await
    }

    pub async fn delete_student(&self, id: &str) -> Result<MutationResponse, ApiError> {
        let path = format!("/admin/students/{}", urlencoding::encode(id));
        self.mutate(self.request(Method::DELETE, &path), "Failed to delete student")
            .await
    }

    pub async fn upload_students(&self, file_name: &str, bytes: Vec<u8>) -> Result<MutationResponse, ApiError> {
        let mut request = self.request(Method::POST, "/admin/students/upload");
        request.body = Body::Multipart(FilePart {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            bytes,
        });
        self.mutate(request, "Failed to upload students").await
    }

    pub async fn tasks(&self) -> Result<Vec<Task>, ApiError> {
        self.call(self.request(Method::GET, "/admin/tasks"), "Failed to load tasks data")
            .await
    }

    pub async fn create_task(&self, task: &NewTask) -> Result<MutationResponse, ApiError> {
        let request = self.json(Method::POST, "/admin/tasks", task)?;
        self.mutate(request, "Failed to add task").await
    }

    pub async fn delete_task(&self, id: &str) -> Result<MutationResponse, ApiError> {
        let path = format!("/admin/tasks/{}", urlencoding::encode(id));
        self.mutate(self.request(Method::DELETE, &path), "Failed to delete task")
            .await
    }

    /// Completion report; `None` asks for every campus and grade.
    pub async fn reports(&self, filter: Option<&ReportFilter>) -> Result<Vec<ReportRow>, ApiError> {
        let mut request = self.request(Method::GET, "/admin/reports");
        let fallback = match filter {
            Some(filter) => {
                request.query = vec![
                    ("campus".to_string(), filter.campus.clone()),
                    ("grade".to_string(), filter.grade.clone()),
                ];
                "Failed to generate report"
            }
            None => "Failed to load reports data",
        };
        self.call(request, fallback).await
    }

    pub async fn student_tasks(&self) -> Result<Vec<StudentTask>, ApiError> {
        self.call(self.request(Method::GET, "/student/tasks"), "Failed to load tasks data")
            .await
    }

    pub async fn prior_submission(&self, task_id: &str) -> Result<PriorSubmission, ApiError> {
        let path = format!("/student/submission/{}", urlencoding::encode(task_id));
        self.call(self.request(Method::GET, &path), "Failed to load previous submission")
            .await
    }

    pub async fn submit(&self, submission: &SubmitRequest) -> Result<MutationResponse, ApiError> {
        let request = self.json(Method::POST, "/student/submit", submission)?;
        self.mutate(request, "Failed to submit task").await
    }

    pub async fn install_libraries(&self, language: Language, libraries: Vec<String>) -> Result<RunResponse, ApiError> {
        let body = InstallRequest { libraries, language };
        let request = self.json(Method::POST, language.install_endpoint(), &body)?;
        self.run(request, "Installation failed").await
    }

    pub async fn compile(&self, language: Language, code: &str) -> Result<RunResponse, ApiError> {
        let body = CompileRequest {
            code: code.to_string(),
            language,
        };
        let request = self.json(Method::POST, language.compile_endpoint(), &body)?;
        self.run(request, "Compilation failed").await
    }

    /// Download link for the roster; the token travels in the query string
    /// because the browser navigates to it directly.
    pub fn export_students_url(&self) -> String {
        self.config.link(&format!(
            "/admin/export/students?token={}",
            urlencoding::encode(&self.token)
        ))
    }

    pub fn export_submissions_url(&self, filter: &ReportFilter) -> String {
        self.config.link(&format!(
            "/admin/export/submissions?campus={}&grade={}&token={}",
            urlencoding::encode(&filter.campus),
            urlencoding::encode(&filter.grade),
            urlencoding::encode(&self.token)
        ))
    }
}
