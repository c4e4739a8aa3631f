//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. Parsed response bodies cross as JSON
//! text so the C side can use whatever JSON library it already has.
//! Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use crm_core::{AuthStrategy, Credentials, HttpMethod, HttpRequest, Outcome};

/// Opaque handle to a `RequestContext` over an in-memory cookie jar and
/// storage. C callers receive a pointer to this and pass it back into every
/// FFI function.
pub struct FfiCrmClient {
    pub(crate) inner: crm_core::RequestContext,
}

/// Allocate a C string, dropping interior NULs rather than failing.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let mut s: String = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

/// Auth strategy accepted by `crm_client_new`.
#[repr(C)]
pub enum FfiAuthStrategy {
    Session = 0,
    Bearer = 1,
}

impl FfiAuthStrategy {
    /// Map the raw integer a C caller passes; anything else is rejected.
    pub(crate) fn from_raw(raw: i32) -> Option<AuthStrategy> {
        match raw {
            r if r == FfiAuthStrategy::Session as i32 => Some(AuthStrategy::Session),
            r if r == FfiAuthStrategy::Bearer as i32 => Some(AuthStrategy::Bearer),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Patch => FfiHttpMethod::Patch,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `crm_build_request`. The C caller executes the request, sending
/// cookies when `include_credentials` is set, and passes the response back
/// through `crm_parse_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub include_credentials: bool,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = c_string(req.url);
        let body = match req.body {
            Some(b) => c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            // A boxed slice has no spare capacity, so (ptr, len) is enough to
            // free it.
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let ffi_req = Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
            include_credentials: req.credentials == Credentials::Include,
        });
        Box::into_raw(ffi_req)
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP request,
/// then passes a pointer to `crm_parse_response`. The FFI layer reads but
/// does not free these fields. A null `body` is treated as empty, and a null
/// `headers` as no headers.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiHeader,
    pub headers_len: u32,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCrmResult`.
#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    Panic = 1,
    NullArg = 2,
}

/// What the response meant.
#[repr(C)]
pub enum FfiOutcome {
    /// `http_status`, `error` and `data` are set.
    Completed = 0,
    /// The server rejected the credentials with `http_status`. Navigate to
    /// `redirect`.
    AuthRequired = 1,
}

/// Result envelope for `crm_parse_response`.
///
/// When `error_code` is `Ok`, `outcome` says which of `data` (JSON text,
/// `{}` for empty or non-JSON bodies) or `redirect` is set. Otherwise
/// `error_message` describes the failure and both are null.
#[repr(C)]
pub struct FfiCrmResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub outcome: FfiOutcome,
    pub http_status: u16,
    /// Status outside 200..=299.
    pub error: bool,
    pub data: *mut c_char,
    pub redirect: *mut c_char,
}

impl FfiCrmResult {
    /// `status` is the response status, reported for `AuthRequired` too.
    pub(crate) fn from_outcome(outcome: Outcome, status: u16) -> *mut Self {
        let result = match outcome {
            Outcome::Completed(envelope) => FfiCrmResult {
                error_code: FfiErrorCode::Ok,
                error_message: std::ptr::null_mut(),
                outcome: FfiOutcome::Completed,
                http_status: envelope.response.status,
                error: envelope.error,
                data: c_string(envelope.data.to_string()),
                redirect: std::ptr::null_mut(),
            },
            Outcome::AuthRequired(nav) => FfiCrmResult {
                error_code: FfiErrorCode::Ok,
                error_message: std::ptr::null_mut(),
                outcome: FfiOutcome::AuthRequired,
                http_status: status,
                error: true,
                data: std::ptr::null_mut(),
                redirect: c_string(nav.url),
            },
        };
        Box::into_raw(Box::new(result))
    }

    fn failure(error_code: FfiErrorCode, msg: impl Into<String>) -> *mut Self {
        let result = Box::new(FfiCrmResult {
            error_code,
            error_message: c_string(msg),
            outcome: FfiOutcome::Completed,
            http_status: 0,
            error: true,
            data: std::ptr::null_mut(),
            redirect: std::ptr::null_mut(),
        });
        Box::into_raw(result)
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg)
    }
}
