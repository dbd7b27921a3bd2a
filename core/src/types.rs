//! Rendering model handed to the template engine.
//!
//! # Design
//! Field names on the wire are the ones the snippet templates use
//! (`method`, `path`, `headers`, `requestBody` for requests; `statusCode`,
//! `statusReason`, `headers`, `responseBody` for responses), so a template
//! renderer can consume the serialized model without any mapping of its own.

use serde::{Deserialize, Serialize};

use crate::http::HttpMethod;

/// A single rendered header line. Several may share a name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedHeader {
    pub name: String,
    pub value: String,
}

impl RenderedHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Everything an `http-request` snippet template needs.
///
/// `request_body` is always present. An empty string means the request is
/// rendered without a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingModel {
    pub method: HttpMethod,
    #[serde(rename = "path")]
    pub path_with_query: String,
    pub headers: Vec<RenderedHeader>,
    pub request_body: String,
}

impl RenderingModel {
    /// Values of every header called `name`, compared case-insensitively.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Everything an `http-response` snippet template needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseModel {
    pub status_code: u16,
    pub status_reason: String,
    pub headers: Vec<RenderedHeader>,
    /// Empty, or the body text after a leading newline.
    pub response_body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_serializes_with_template_field_names() {
        let model = RenderingModel {
            method: HttpMethod::Post,
            path_with_query: "/foo?a=b".to_string(),
            headers: vec![RenderedHeader::new("Host", "localhost")],
            request_body: "\nbody".to_string(),
        };
        let json = serde_json::to_value(&model).unwrap();
        assert_eq!(json["method"], "POST");
        assert_eq!(json["path"], "/foo?a=b");
        assert_eq!(json["headers"][0]["name"], "Host");
        assert_eq!(json["headers"][0]["value"], "localhost");
        assert_eq!(json["requestBody"], "\nbody");
    }

    #[test]
    fn header_values_ignores_case() {
        let model = RenderingModel {
            method: HttpMethod::Get,
            path_with_query: "/".to_string(),
            headers: vec![
                RenderedHeader::new("Accept", "text/plain"),
                RenderedHeader::new("accept", "application/json"),
                RenderedHeader::new("Host", "localhost"),
            ],
            request_body: String::new(),
        };
        let accept: Vec<_> = model.header_values("ACCEPT").collect();
        assert_eq!(accept, vec!["text/plain", "application/json"]);
    }
}
