//! Renderer for the `http-response` snippet.
//!
//! # Design
//! A `CapturedResponse` keeps the status, headers and body text a test
//! harness saw. Unlike requests there is nothing to reconstruct: headers are
//! copied in capture order and the body is shown verbatim after a blank
//! line. The reason phrase is the captured one when present, otherwise the
//! canonical phrase for the status code.

use ::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RenderError;
use crate::http::Headers;
use crate::types::{RenderedHeader, ResponseModel};

/// An HTTP response as recorded by the capturing layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedResponse {
    pub status: u16,
    /// Reason phrase sent by the server, if the capturing layer kept it.
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub body: String,
}

impl CapturedResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            reason: None,
            headers: Headers::new(),
            body: String::new(),
        }
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }
}

/// Builds `ResponseModel`s from captured responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseRenderer;

impl ResponseRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render `response`. Fails only when the status code is not a valid
    /// HTTP status. A valid code without a known phrase renders with an
    /// empty reason.
    pub fn render(&self, response: &CapturedResponse) -> Result<ResponseModel, RenderError> {
        let status = StatusCode::from_u16(response.status).map_err(|_| {
            RenderError::InvalidStatus {
                status: response.status,
            }
        })?;
        let status_reason = match response.reason.as_deref() {
            Some(reason) if !reason.trim().is_empty() => reason.to_string(),
            _ => status.canonical_reason().unwrap_or_default().to_string(),
        };

        let headers: Vec<RenderedHeader> = response
            .headers
            .iter()
            .flat_map(|(name, values)| {
                values
                    .iter()
                    .map(move |value| RenderedHeader::new(name, value.as_str()))
            })
            .collect();

        let response_body = if response.body.is_empty() {
            String::new()
        } else {
            format!("\n{}", response.body)
        };

        debug!(status = status.as_u16(), headers = headers.len(), "rendered response");
        Ok(ResponseModel {
            status_code: status.as_u16(),
            status_reason,
            headers,
            response_body,
        })
    }
}
