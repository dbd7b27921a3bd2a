//! Stateless renderer for the `http-request` snippet.
//!
//! # Design
//! `RequestRenderer` carries no state. `render` turns one `CapturedRequest`
//! into one `RenderingModel` and keeps nothing between calls. The body is
//! rebuilt from whatever the capturing layer kept:
//!
//! - a literal body when a positive content length was captured,
//! - a synthesized `multipart/form-data` body for multipart POST/PUT,
//! - URL-encoded form parameters for other POST/PUT requests,
//! - nothing otherwise.
//!
//! Exactly one of these applies to a request (`BodyStrategy::for_request`).
//! Multipart bodies always use `MULTIPART_BOUNDARY`, and the same constant
//! is appended to the rendered `Content-Type` header so both always agree.

use tracing::{debug, trace};

use crate::error::RenderError;
use crate::http::{CapturedRequest, APPLICATION_FORM_URLENCODED, CONTENT_TYPE, HOST};
use crate::types::{RenderedHeader, RenderingModel};

/// Boundary used for every synthesized multipart body.
pub const MULTIPART_BOUNDARY: &str = "6o2knFse3p53ty9dmcQvWAIx1zInP11uCfbm";

/// How the request body is reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStrategy {
    /// The captured body text, verbatim.
    Literal,
    /// A `multipart/form-data` body built from parameters and file parts.
    Multipart,
    /// Form parameters encoded as `application/x-www-form-urlencoded`.
    FormUrlEncoded,
    Empty,
}

impl BodyStrategy {
    pub fn for_request(request: &CapturedRequest) -> Self {
        if request.has_literal_body() {
            BodyStrategy::Literal
        } else if request.method.carries_form_body() {
            if request.multipart {
                BodyStrategy::Multipart
            } else if request.parameters.to_query_string().is_empty() {
                BodyStrategy::Empty
            } else {
                BodyStrategy::FormUrlEncoded
            }
        } else {
            BodyStrategy::Empty
        }
    }
}

/// Builds `RenderingModel`s from captured requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestRenderer;

impl RequestRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render `request`. Fails only when a disk-backed file part cannot be
    /// read, in which case no model is produced.
    pub fn render(&self, request: &CapturedRequest) -> Result<RenderingModel, RenderError> {
        let request_body = self.request_body(request)?;
        Ok(RenderingModel {
            method: request.method,
            path_with_query: request.uri_with_query(),
            headers: self.headers(request),
            request_body,
        })
    }

    pub fn headers(&self, request: &CapturedRequest) -> Vec<RenderedHeader> {
        let mut headers = Vec::new();
        if requires_host_header(request) {
            let authority = request.authority();
            debug!(%authority, "adding synthesized Host header");
            headers.push(RenderedHeader::new(HOST, authority));
        }

        for (name, values) in request.headers.iter() {
            for value in values {
                if request.multipart && name == CONTENT_TYPE {
                    headers.push(RenderedHeader::new(
                        name,
                        format!("{value}; boundary={MULTIPART_BOUNDARY}"),
                    ));
                } else {
                    headers.push(RenderedHeader::new(name, value.as_str()));
                }
            }
        }

        if requires_form_content_type(request) {
            debug!("adding synthesized form Content-Type header");
            headers.push(RenderedHeader::new(CONTENT_TYPE, APPLICATION_FORM_URLENCODED));
        }
        headers
    }

    pub fn request_body(&self, request: &CapturedRequest) -> Result<String, RenderError> {
        let strategy = BodyStrategy::for_request(request);
        debug!(?strategy, method = %request.method, "rendering request body");
        match strategy {
            BodyStrategy::Literal => Ok(format!("\n{}", request.body)),
            BodyStrategy::Multipart => multipart_body(request),
            BodyStrategy::FormUrlEncoded => {
                Ok(format!("\n{}", request.parameters.to_query_string()))
            }
            BodyStrategy::Empty => Ok(String::new()),
        }
    }
}

fn requires_host_header(request: &CapturedRequest) -> bool {
    !request.headers.contains_ignore_case(HOST)
}

fn requires_form_content_type(request: &CapturedRequest) -> bool {
    !request.headers.contains_ignore_case(CONTENT_TYPE)
        && request.method.carries_form_body()
        && !request.parameters.to_query_string().is_empty()
}

fn multipart_body(request: &CapturedRequest) -> Result<String, RenderError> {
    let mut body = String::from("\n");
    for (name, values) in request.parameters.iter() {
        for value in values {
            write_part_boundary(&mut body);
            write_part(&mut body, name, value, None);
            body.push('\n');
        }
    }
    for part in &request.parts {
        let bytes = part.bytes()?;
        trace!(field = %part.field_name, len = bytes.len(), "writing file part");
        write_part_boundary(&mut body);
        write_part(
            &mut body,
            &part.field_name,
            &String::from_utf8_lossy(&bytes),
            part.content_type.as_deref(),
        );
        body.push('\n');
    }
    write_multipart_end(&mut body);
    Ok(body)
}

fn write_part_boundary(body: &mut String) {
    body.push_str("--");
    body.push_str(MULTIPART_BOUNDARY);
    body.push('\n');
}

// Field names are written unquoted.
fn write_part(body: &mut String, name: &str, value: &str, content_type: Option<&str>) {
    body.push_str("Content-Disposition: form-data; name=");
    body.push_str(name);
    body.push('\n');
    if let Some(content_type) = content_type.filter(|ct| !ct.trim().is_empty()) {
        body.push_str("Content-Type: ");
        body.push_str(content_type);
        body.push('\n');
    }
    body.push('\n');
    body.push_str(value);
}

fn write_multipart_end(body: &mut String) {
    body.push_str("--");
    body.push_str(MULTIPART_BOUNDARY);
    body.push_str("--");
}
