//! C-ABI wrapper around `restdocs-core`.
//!
//! # Overview
//! Lets a documentation pipeline written in any language with a C FFI render
//! `http-request` and `http-response` snippet models and select constraint
//! descriptions without linking serde or the core's Rust types directly.
//!
//! # Design
//! - Inputs cross the boundary as JSON C strings, because a captured request
//!   (nested multimaps, file parts) has no convenient C layout. Outputs come
//!   back as `#[repr(C)]` structs the caller can read field by field.
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - A single `FfiSnippetResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - Output text that cannot become a C string (an interior NUL byte) fails
//!   with `InvalidOutput` instead of being altered.
//! - The C caller owns all returned pointers and must call
//!   `restdocs_free_result` to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;
use std::sync::LazyLock;

use restdocs_core::{
    CapturedRequest, CapturedResponse, DescriptionQuery, RequestRenderer, ResponseRenderer,
};
use tracing::debug;

use types::*;

static MULTIPART_BOUNDARY: LazyLock<CString> =
    LazyLock::new(|| CString::new(restdocs_core::MULTIPART_BOUNDARY).unwrap_or_default());

/// Borrow a caller-owned C string argument as UTF-8, or build the error
/// result to hand back.
fn str_arg<'a>(ptr: *const c_char, name: &str) -> Result<&'a str, *mut FfiSnippetResult> {
    if ptr.is_null() {
        return Err(FfiSnippetResult::null_arg(name));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map_err(|_| FfiSnippetResult::invalid_utf8(name))
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Render the `http-request` snippet model for a captured request.
///
/// `captured_json` is a JSON-encoded `CapturedRequest`. Returns a result with
/// `data_tag = RenderingModel` on success, or `error_code = Io` when a
/// disk-backed file part cannot be read.
#[unsafe(no_mangle)]
pub extern "C" fn restdocs_render_http_request(
    captured_json: *const c_char,
) -> *mut FfiSnippetResult {
    catch_unwind(|| {
        let json = match str_arg(captured_json, "captured_json") {
            Ok(json) => json,
            Err(result) => return result,
        };
        let request: CapturedRequest = match serde_json::from_str(json) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "rejecting captured request JSON");
                return FfiSnippetResult::invalid_json(e);
            }
        };
        match RequestRenderer::new().render(&request) {
            Ok(model) => FfiSnippetResult::ok_model(model),
            Err(e) => FfiSnippetResult::from_render_error(e),
        }
    })
    .unwrap_or_else(|_| FfiSnippetResult::panic("panic in restdocs_render_http_request"))
}

/// Render the `http-response` snippet model for a captured response.
///
/// `captured_json` is a JSON-encoded `CapturedResponse`. Returns a result with
/// `data_tag = ResponseModel` on success, or `error_code = InvalidStatus` when
/// the status is outside `100..=999`.
#[unsafe(no_mangle)]
pub extern "C" fn restdocs_render_http_response(
    captured_json: *const c_char,
) -> *mut FfiSnippetResult {
    catch_unwind(|| {
        let json = match str_arg(captured_json, "captured_json") {
            Ok(json) => json,
            Err(result) => return result,
        };
        let response: CapturedResponse = match serde_json::from_str(json) {
            Ok(response) => response,
            Err(e) => {
                debug!(error = %e, "rejecting captured response JSON");
                return FfiSnippetResult::invalid_json(e);
            }
        };
        match ResponseRenderer::new().render(&response) {
            Ok(model) => FfiSnippetResult::ok_response(model),
            Err(e) => FfiSnippetResult::from_render_error(e),
        }
    })
    .unwrap_or_else(|_| FfiSnippetResult::panic("panic in restdocs_render_http_response"))
}

/// Select the constraint descriptions that apply to a group query.
///
/// `query_json` is `{"constraints": [{"constraint": ..., "description": ...}],
/// "groups": [...]}`. Returns a result with `data_tag = Descriptions`.
#[unsafe(no_mangle)]
pub extern "C" fn restdocs_select_descriptions(query_json: *const c_char) -> *mut FfiSnippetResult {
    catch_unwind(|| {
        let json = match str_arg(query_json, "query_json") {
            Ok(json) => json,
            Err(result) => return result,
        };
        match serde_json::from_str::<DescriptionQuery>(json) {
            Ok(query) => FfiSnippetResult::ok_descriptions(query.select()),
            Err(e) => {
                debug!(error = %e, "rejecting description query JSON");
                FfiSnippetResult::invalid_json(e)
            }
        }
    })
    .unwrap_or_else(|_| FfiSnippetResult::panic("panic in restdocs_select_descriptions"))
}

/// The boundary every synthesized multipart body uses. The returned string
/// is static and must not be freed.
#[unsafe(no_mangle)]
pub extern "C" fn restdocs_multipart_boundary() -> *const c_char {
    MULTIPART_BOUNDARY.as_ptr()
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiSnippetResult` returned by any `restdocs_*` entry point.
/// Safe to call with null. Uses `data_tag` to determine what `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn restdocs_free_result(result: *mut FfiSnippetResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.data.is_null() {
            match result.data_tag {
                FfiDataTag::RenderingModel => {
                    let model = unsafe { Box::from_raw(result.data as *mut FfiRenderingModel) };
                    model.free_fields();
                }
                FfiDataTag::Descriptions => {
                    let list = unsafe { Box::from_raw(result.data as *mut FfiStringList) };
                    list.free_fields();
                }
                FfiDataTag::ResponseModel => {
                    let model = unsafe { Box::from_raw(result.data as *mut FfiResponseModel) };
                    model.free_fields();
                }
                FfiDataTag::None => {}
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn c_str<'a>(ptr: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn render(json: &str) -> *mut FfiSnippetResult {
        let json = CString::new(json).unwrap();
        restdocs_render_http_request(json.as_ptr())
    }

    fn render_response(json: &str) -> *mut FfiSnippetResult {
        let json = CString::new(json).unwrap();
        restdocs_render_http_response(json.as_ptr())
    }

    fn headers<'a>(ptr: *const FfiHeader, len: u32) -> &'a [FfiHeader] {
        unsafe { std::slice::from_raw_parts(ptr, len as usize) }
    }

    #[test]
    fn render_get_request() {
        let result =
            render(r#"{"method":"GET","uri":"/foo","queryString":"a=b","host":"example.com"}"#);
        assert!(!result.is_null());

        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        assert!(r.error_message.is_null());
        assert!(matches!(r.data_tag, FfiDataTag::RenderingModel));

        let model = unsafe { &*(r.data as *const FfiRenderingModel) };
        assert!(matches!(model.method, FfiHttpMethod::Get));
        assert_eq!(c_str(model.method_name), "GET");
        assert_eq!(c_str(model.path), "/foo?a=b");
        assert_eq!(model.headers_len, 1);
        let headers = headers(model.headers, model.headers_len);
        assert_eq!(c_str(headers[0].name), "Host");
        assert_eq!(c_str(headers[0].value), "example.com");
        assert_eq!(c_str(model.request_body), "");

        restdocs_free_result(result);
    }

    #[test]
    fn render_multipart_request() {
        let result = render(
            r#"{
                "method": "POST",
                "uri": "/upload",
                "host": "localhost",
                "headers": [["Content-Type", ["multipart/form-data"]]],
                "multipart": true,
                "parts": [{
                    "fieldName": "file",
                    "contentType": "text/plain",
                    "content": {"bytes": [104, 105]}
                }]
            }"#,
        );
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));

        let model = unsafe { &*(r.data as *const FfiRenderingModel) };
        let headers = headers(model.headers, model.headers_len);
        let boundary = c_str(restdocs_multipart_boundary());
        assert_eq!(
            c_str(headers[1].value),
            format!("multipart/form-data; boundary={boundary}")
        );
        let body = c_str(model.request_body);
        assert!(body.starts_with(&format!("\n--{boundary}\n")));
        assert!(body.ends_with(&format!("\nhi\n--{boundary}--")));

        restdocs_free_result(result);
    }

    #[test]
    fn render_negative_content_length_as_no_body() {
        let result = render(
            r#"{"method":"GET","uri":"/","host":"h","contentLength":-1,"body":"unused"}"#,
        );
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        let model = unsafe { &*(r.data as *const FfiRenderingModel) };
        assert_eq!(c_str(model.request_body), "");
        restdocs_free_result(result);
    }

    #[test]
    fn render_body_with_nul_byte_is_invalid_output() {
        let result = render(
            r#"{"method":"POST","uri":"/","host":"h","contentLength":3,"body":"a\u0000b"}"#,
        );
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::InvalidOutput));
        assert!(matches!(r.data_tag, FfiDataTag::None));
        assert!(r.data.is_null());
        assert_eq!(
            c_str(r.error_message),
            "output field contains a NUL byte: requestBody"
        );
        restdocs_free_result(result);
    }

    #[test]
    fn render_header_with_nul_byte_names_the_header() {
        let result = render(concat!(
            r#"{"method":"GET","uri":"/","host":"h","#,
            r#""headers":[["X-A",["ok"]],["X-B",["a\u0000"]]]}"#
        ));
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::InvalidOutput));
        assert!(c_str(r.error_message).ends_with("headers[2].value"));
        restdocs_free_result(result);
    }

    #[test]
    fn render_null_argument() {
        let result = restdocs_render_http_request(std::ptr::null());
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::NullArg));
        assert_eq!(c_str(r.error_message), "null argument: captured_json");
        assert!(r.data.is_null());
        restdocs_free_result(result);
    }

    #[test]
    fn render_invalid_json() {
        let result = render(r#"{"method":"FETCH","uri":"/"}"#);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::InvalidJson));
        assert!(c_str(r.error_message).starts_with("invalid JSON input"));
        restdocs_free_result(result);
    }

    #[test]
    fn render_invalid_utf8() {
        let bytes = CString::new(vec![0xffu8, 0xfe]).unwrap();
        let result = restdocs_render_http_request(bytes.as_ptr());
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::InvalidUtf8));
        restdocs_free_result(result);
    }

    #[test]
    fn render_unreadable_file_part_is_io_error() {
        let result = render(
            r#"{
                "method": "POST",
                "uri": "/upload",
                "host": "localhost",
                "multipart": true,
                "parts": [{"fieldName": "doc", "content": {"file": "/no/such/file"}}]
            }"#,
        );
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Io));
        assert!(matches!(r.data_tag, FfiDataTag::None));
        assert!(r.data.is_null());
        assert!(c_str(r.error_message).contains("`doc`"));
        restdocs_free_result(result);
    }

    #[test]
    fn render_response_with_headers_and_content() {
        let result = render_response(
            r#"{"status":200,"headers":[["Content-Type",["application/json"]]],"body":"{}"}"#,
        );
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        assert!(matches!(r.data_tag, FfiDataTag::ResponseModel));

        let model = unsafe { &*(r.data as *const FfiResponseModel) };
        assert_eq!(model.status_code, 200);
        assert_eq!(c_str(model.status_reason), "OK");
        let headers = headers(model.headers, model.headers_len);
        assert_eq!(headers.len(), 1);
        assert_eq!(c_str(headers[0].name), "Content-Type");
        assert_eq!(c_str(headers[0].value), "application/json");
        assert_eq!(c_str(model.response_body), "\n{}");

        restdocs_free_result(result);
    }

    #[test]
    fn render_response_without_headers() {
        let result = render_response(r#"{"status":400}"#);
        let r = unsafe { &*result };
        let model = unsafe { &*(r.data as *const FfiResponseModel) };
        assert_eq!(model.status_code, 400);
        assert_eq!(c_str(model.status_reason), "Bad Request");
        assert!(model.headers.is_null());
        assert_eq!(model.headers_len, 0);
        assert_eq!(c_str(model.response_body), "");
        restdocs_free_result(result);
    }

    #[test]
    fn render_response_invalid_status() {
        let result = render_response(r#"{"status":42}"#);
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::InvalidStatus));
        assert_eq!(c_str(r.error_message), "invalid HTTP status code 42");
        restdocs_free_result(result);
    }

    #[test]
    fn select_descriptions_by_group() {
        let json = CString::new(
            r#"{
                "constraints": [
                    {"constraint": {"name": "c1", "groups": ["Cloneable"]}, "description": "Bravo"},
                    {"constraint": {"name": "c2"}, "description": "Alpha"},
                    {
                        "constraint": {"name": "c3", "groups": ["Cloneable", "Serializable"]},
                        "description": "Delta"
                    }
                ],
                "groups": ["Serializable", "Cloneable"]
            }"#,
        )
        .unwrap();
        let result = restdocs_select_descriptions(json.as_ptr());
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        assert!(matches!(r.data_tag, FfiDataTag::Descriptions));

        let list = unsafe { &*(r.data as *const FfiStringList) };
        assert_eq!(list.len, 2);
        let items = unsafe { std::slice::from_raw_parts(list.items, list.len as usize) };
        assert_eq!(c_str(items[0]), "Bravo");
        assert_eq!(c_str(items[1]), "Delta");

        restdocs_free_result(result);
    }

    #[test]
    fn select_descriptions_empty_query() {
        let json = CString::new("{}").unwrap();
        let result = restdocs_select_descriptions(json.as_ptr());
        let r = unsafe { &*result };
        assert!(matches!(r.error_code, FfiErrorCode::Ok));
        let list = unsafe { &*(r.data as *const FfiStringList) };
        assert_eq!(list.len, 0);
        assert!(list.items.is_null());
        restdocs_free_result(result);
    }

    #[test]
    fn free_result_null_is_safe() {
        restdocs_free_result(std::ptr::null_mut());
    }

    #[test]
    fn boundary_matches_core_constant() {
        assert_eq!(
            c_str(restdocs_multipart_boundary()),
            restdocs_core::MULTIPART_BOUNDARY
        );
    }
}
