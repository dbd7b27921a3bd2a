//! Captured HTTP requests described as plain data.
//!
//! # Design
//! A `CapturedRequest` is what a test harness recorded about a request after
//! the framework had already taken it apart: the method, URI, headers, form
//! parameters and uploaded file parts are kept separately and the raw bytes
//! are gone. The renderer rebuilds a wire-like view from these pieces.
//!
//! Headers and parameters are `MultiMap`s rather than `HashMap`s. Duplicate
//! names and insertion order both show up in the rendered output, so they
//! have to survive the round-trip through this type.
//!
//! Captured values cross the JSON boundaries with camelCase keys
//! (`queryString`, `contentLength`, `fieldName`, `contentType`), the same
//! convention the rendering models use.

use std::borrow::Cow;
use std::fmt;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

pub const HOST: &str = "Host";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// HTTP method of a captured request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
    Options,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Whether form parameters of a request with this method travel in the body.
    pub fn carries_form_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Insertion-ordered multimap from a name to its ordered values.
///
/// Serializes as `[[name, [value, ...]], ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MultiMap(Vec<(String, Vec<String>)>);

/// Captured request headers. Names keep the case they were captured with.
pub type Headers = MultiMap;

/// Captured form parameters.
pub type Parameters = MultiMap;

impl MultiMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append `value` under `name`. A name seen before (exact match) keeps its
    /// first position and gains another value.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, values)) => values.push(value),
            None => self.0.push((name, vec![value])),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, values)| values.as_slice())
    }

    pub fn contains_ignore_case(&self, name: &str) -> bool {
        self.0
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encode every name/value pair as `application/x-www-form-urlencoded`
    /// text: `a=1&a=2&b=3`, in insertion order.
    pub fn to_query_string(&self) -> String {
        let mut encoded = String::new();
        for (name, values) in self.iter() {
            for value in values {
                if !encoded.is_empty() {
                    encoded.push('&');
                }
                encoded.push_str(&urlencoding::encode(name));
                encoded.push('=');
                encoded.push_str(&urlencoding::encode(value));
            }
        }
        encoded
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for MultiMap {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut map = MultiMap::new();
        for (name, value) in iter {
            map.add(name, value);
        }
        map
    }
}

/// Where the bytes of an uploaded file part live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartContent {
    /// Already read into memory by the capturing layer.
    Bytes(Vec<u8>),
    /// Spooled to disk; read when the request is rendered.
    File(PathBuf),
}

/// A file uploaded as part of a multipart request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    pub field_name: String,
    #[serde(default)]
    pub content_type: Option<String>,
    pub content: PartContent,
}

impl FilePart {
    pub fn from_bytes(
        field_name: impl Into<String>,
        content_type: Option<&str>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            content_type: content_type.map(str::to_string),
            content: PartContent::Bytes(bytes.into()),
        }
    }

    pub fn from_path(
        field_name: impl Into<String>,
        content_type: Option<&str>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            content_type: content_type.map(str::to_string),
            content: PartContent::File(path.into()),
        }
    }

    /// The part's bytes, reading them from disk for `PartContent::File`.
    pub fn bytes(&self) -> Result<Cow<'_, [u8]>, RenderError> {
        match &self.content {
            PartContent::Bytes(bytes) => Ok(Cow::Borrowed(bytes)),
            PartContent::File(path) => {
                fs::read(path)
                    .map(Cow::Owned)
                    .map_err(|source| RenderError::PartRead {
                        field: self.field_name.clone(),
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}

/// An HTTP request as recorded by the capturing layer.
///
/// A `content_length` that is absent, zero or negative (`-1` is the usual
/// "unknown" marker) means no literal body was captured; `body` is only
/// consulted when the length is positive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedRequest {
    pub method: HttpMethod,
    pub uri: String,
    #[serde(default)]
    pub query_string: Option<String>,
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub headers: Headers,
    #[serde(default)]
    pub content_length: Option<i64>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub multipart: bool,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub parts: Vec<FilePart>,
}

impl CapturedRequest {
    pub fn new(method: HttpMethod, uri: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            query_string: None,
            host: host.into(),
            port: None,
            headers: Headers::new(),
            content_length: None,
            body: String::new(),
            multipart: false,
            parameters: Parameters::new(),
            parts: Vec::new(),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn query_string(mut self, query: impl Into<String>) -> Self {
        self.query_string = Some(query.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.add(name, value);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.add(name, value);
        self
    }

    /// Set a literal body; `content_length` follows its UTF-8 length.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.content_length = Some(self.body.len() as i64);
        self
    }

    pub fn part(mut self, part: FilePart) -> Self {
        self.multipart = true;
        self.parts.push(part);
        self
    }

    pub fn multipart(mut self) -> Self {
        self.multipart = true;
        self
    }

    /// `host`, or `host:port` when a non-default port was captured.
    pub fn authority(&self) -> String {
        match self.port {
            Some(port) if port != 80 => format!("{}:{port}", self.host),
            _ => self.host.clone(),
        }
    }

    pub fn has_literal_body(&self) -> bool {
        self.content_length.is_some_and(|len| len > 0)
    }

    /// The query string to show after the path. A GET request with no
    /// captured query string shows its form parameters instead.
    pub fn query(&self) -> Option<String> {
        match self.query_string.as_deref() {
            Some(query) if !query.is_empty() => Some(query.to_string()),
            _ if self.method == HttpMethod::Get => {
                Some(self.parameters.to_query_string()).filter(|q| !q.is_empty())
            }
            _ => None,
        }
    }

    pub fn uri_with_query(&self) -> String {
        match self.query() {
            Some(query) => format!("{}?{query}", self.uri),
            None => self.uri.clone(),
        }
    }
}
