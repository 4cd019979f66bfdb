use anyhow::{Context, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use tracing::debug;

use super::{ApiRequest, Body, RawResponse, Transport, TransportError};

/// `Transport` over reqwest; in the browser this goes through `fetch`.
pub struct HttpTransport {
    base: Url,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base: &str) -> Result<Self> {
        let mut base = base.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            base: Url::parse(&base).with_context(|| format!("invalid api base {base}"))?,
            client: reqwest::Client::new(),
        })
    }

    fn url(&self, path: &str) -> Result<Url, TransportError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError(e.to_string()))
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let url = self.url(&request.path)?;
        let mut builder = self.client.request(request.method, url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        builder = match request.body {
            Body::Empty => builder,
            // sets Content-Type: application/json
            Body::Json(value) => builder.json(&value),
            Body::Multipart(file) => {
                let part = Part::bytes(file.bytes).file_name(file.file_name);
                builder.multipart(Form::new().part(file.field, part))
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        debug!("response body: {} bytes", body.len());

        Ok(RawResponse {
            status,
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}
