//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each output type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use restdocs_core::{HttpMethod, RenderError, RenderedHeader, RenderingModel, ResponseModel};

// ---------------------------------------------------------------------------
// Rendering model
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug)]
pub enum FfiHttpMethod {
    Get = 0,
    Head = 1,
    Post = 2,
    Put = 3,
    Patch = 4,
    Delete = 5,
    Options = 6,
    Trace = 7,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Head => FfiHttpMethod::Head,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Options => FfiHttpMethod::Options,
            HttpMethod::Trace => FfiHttpMethod::Trace,
        }
    }
}

/// A single rendered header as a pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub name: *mut c_char,
    pub value: *mut c_char,
}

/// The `http-request` rendering model as C-compatible plain data.
///
/// `headers` holds `headers_len` entries in render order and is null when
/// there are none. `request_body` is never null; an empty string means no
/// body.
#[repr(C)]
pub struct FfiRenderingModel {
    pub method: FfiHttpMethod,
    pub method_name: *mut c_char,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub request_body: *mut c_char,
}

/// Move rendered headers into a C array. Returns null for an empty list.
fn headers_to_c(headers: Vec<RenderedHeader>) -> (*mut FfiHeader, u32) {
    let len = headers.len() as u32;
    if headers.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let ffi_headers: Box<[FfiHeader]> = headers
        .into_iter()
        .map(|h| FfiHeader {
            name: c_string(h.name),
            value: c_string(h.value),
        })
        .collect();
    (Box::into_raw(ffi_headers) as *mut FfiHeader, len)
}

fn free_headers(headers: *mut FfiHeader, len: u32) {
    if headers.is_null() || len == 0 {
        return;
    }
    let headers =
        unsafe { Box::from_raw(std::ptr::slice_from_raw_parts_mut(headers, len as usize)) };
    for h in headers.iter() {
        free_c_string(h.name);
        free_c_string(h.value);
    }
}

impl FfiRenderingModel {
    fn from_core(model: RenderingModel) -> Box<Self> {
        let (headers, headers_len) = headers_to_c(model.headers);
        Box::new(FfiRenderingModel {
            method: model.method.into(),
            method_name: c_string(model.method.as_str().to_string()),
            path: c_string(model.path_with_query),
            headers,
            headers_len,
            request_body: c_string(model.request_body),
        })
    }

    /// Free every C string and the header array, but not the struct itself.
    pub(crate) fn free_fields(&self) {
        free_c_string(self.path);
        free_c_string(self.method_name);
        free_c_string(self.request_body);
        free_headers(self.headers, self.headers_len);
    }
}

/// The `http-response` rendering model as C-compatible plain data.
///
/// `status_reason` is empty for a status without a known phrase.
/// `response_body` is empty when the response had no content.
#[repr(C)]
pub struct FfiResponseModel {
    pub status_code: u16,
    pub status_reason: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub response_body: *mut c_char,
}

impl FfiResponseModel {
    fn from_core(model: ResponseModel) -> Box<Self> {
        let (headers, headers_len) = headers_to_c(model.headers);
        Box::new(FfiResponseModel {
            status_code: model.status_code,
            status_reason: c_string(model.status_reason),
            headers,
            headers_len,
            response_body: c_string(model.response_body),
        })
    }

    pub(crate) fn free_fields(&self) {
        free_c_string(self.status_reason);
        free_c_string(self.response_body);
        free_headers(self.headers, self.headers_len);
    }
}

/// An ordered list of C strings, used for constraint descriptions.
#[repr(C)]
pub struct FfiStringList {
    pub items: *mut *mut c_char,
    pub len: u32,
}

impl FfiStringList {
    fn from_core(strings: Vec<String>) -> Box<Self> {
        let len = strings.len() as u32;
        let items = if strings.is_empty() {
            std::ptr::null_mut()
        } else {
            let ptrs: Box<[*mut c_char]> = strings.into_iter().map(c_string).collect();
            Box::into_raw(ptrs) as *mut *mut c_char
        };
        Box::new(FfiStringList { items, len })
    }

    pub(crate) fn free_fields(&self) {
        if !self.items.is_null() && self.len > 0 {
            let items = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(self.items, self.len as usize))
            };
            for item in items.iter() {
                free_c_string(*item);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiSnippetResult`.
#[repr(C)]
#[derive(Debug)]
pub enum FfiErrorCode {
    Ok = 0,
    NullArg = 1,
    InvalidUtf8 = 2,
    InvalidJson = 3,
    Io = 4,
    Panic = 5,
    /// An output field holds a NUL byte and has no C string form.
    InvalidOutput = 6,
    /// A captured response status is not a valid HTTP status code.
    InvalidStatus = 7,
}

/// Tag that tells `restdocs_free_result` what `FfiSnippetResult::data` points to.
#[repr(C)]
#[derive(Debug)]
pub enum FfiDataTag {
    None = 0,
    RenderingModel = 1,
    Descriptions = 2,
    ResponseModel = 3,
}

/// Result envelope for every entry point.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload named by `data_tag`.
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, and `data` is null.
#[repr(C)]
pub struct FfiSnippetResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiSnippetResult {
    pub(crate) fn ok_model(model: RenderingModel) -> *mut Self {
        let nul = nul_field("path", &model.path_with_query)
            .or_else(|| nul_header(&model.headers))
            .or_else(|| nul_field("requestBody", &model.request_body));
        if let Some(field) = nul {
            return Self::invalid_output(&field);
        }
        let data = Box::into_raw(FfiRenderingModel::from_core(model));
        Self::ok(FfiDataTag::RenderingModel, data as *mut std::ffi::c_void)
    }

    pub(crate) fn ok_response(model: ResponseModel) -> *mut Self {
        let nul = nul_field("statusReason", &model.status_reason)
            .or_else(|| nul_header(&model.headers))
            .or_else(|| nul_field("responseBody", &model.response_body));
        if let Some(field) = nul {
            return Self::invalid_output(&field);
        }
        let data = Box::into_raw(FfiResponseModel::from_core(model));
        Self::ok(FfiDataTag::ResponseModel, data as *mut std::ffi::c_void)
    }

    pub(crate) fn ok_descriptions(descriptions: Vec<String>) -> *mut Self {
        let nul = descriptions
            .iter()
            .enumerate()
            .find_map(|(i, d)| nul_field(&format!("descriptions[{i}]"), d));
        if let Some(field) = nul {
            return Self::invalid_output(&field);
        }
        let data = Box::into_raw(FfiStringList::from_core(descriptions));
        Self::ok(FfiDataTag::Descriptions, data as *mut std::ffi::c_void)
    }

    fn ok(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiSnippetResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            data_tag,
            data,
        }))
    }

    pub(crate) fn error(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiSnippetResult {
            error_code,
            error_message: c_string(msg),
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn from_render_error(err: RenderError) -> *mut Self {
        let code = match &err {
            RenderError::PartRead { .. } => FfiErrorCode::Io,
            RenderError::InvalidStatus { .. } => FfiErrorCode::InvalidStatus,
        };
        Self::error(code, err.to_string())
    }

    pub(crate) fn invalid_json(err: serde_json::Error) -> *mut Self {
        Self::error(FfiErrorCode::InvalidJson, format!("invalid JSON input: {err}"))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn invalid_utf8(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::InvalidUtf8, format!("argument is not valid UTF-8: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, msg.to_string())
    }

    fn invalid_output(field: &str) -> *mut Self {
        Self::error(
            FfiErrorCode::InvalidOutput,
            format!("output field contains a NUL byte: {field}"),
        )
    }
}

fn nul_field(field: &str, value: &str) -> Option<String> {
    value.contains('\0').then(|| field.to_string())
}

fn nul_header(headers: &[RenderedHeader]) -> Option<String> {
    headers.iter().enumerate().find_map(|(i, h)| {
        nul_field(&format!("headers[{i}].name"), &h.name)
            .or_else(|| nul_field(&format!("headers[{i}].value"), &h.value))
    })
}

/// Move `s` into a heap C string.
///
/// Payload fields are checked for NUL bytes before they get here, so only an
/// error message can still hold one; it is replaced with U+FFFD.
pub(crate) fn c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') {
        s.replace('\0', "\u{FFFD}")
    } else {
        s
    };
    CString::new(s).unwrap_or_default().into_raw()
}

pub(crate) fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}
