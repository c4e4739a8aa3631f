//! C-ABI wrapper around `crm-core`.
//!
//! # Overview
//! Exposes the CRM request primitive through `extern "C"` functions so a host
//! with its own HTTP stack can build requests and interpret responses without
//! linking to serde or the rest of the Rust client.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `crm_build_request` / `crm_parse_response` are the two halves of
//!   `RequestContext`; the host runs the HTTP exchange in between.
//! - The handle owns an in-memory cookie jar and token storage. The host
//!   mirrors its cookies in with `crm_set_cookie`.
//! - The C caller owns all returned pointers and must call the matching
//!   `crm_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crm_core::{ClientConfig, Document, HttpMethod, HttpResponse, RequestContext, RequestOptions};

use types::*;

/// Borrow a C string as `&str`. `None` for null or non-UTF-8 input.
///
/// The pointer must be null or point to a NUL-terminated string that outlives
/// the returned borrow.
unsafe fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for `base_url` using `strategy` (0 = session, 1 = bearer).
///
/// A null `base_url` means no prefix. Returns null on an unknown strategy,
/// an invalid base URL, or an internal panic. The caller must free the
/// returned pointer with `crm_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn crm_client_new(base_url: *const c_char, strategy: i32) -> *mut FfiCrmClient {
    catch_unwind(|| {
        let Some(strategy) = FfiAuthStrategy::from_raw(strategy) else {
            return std::ptr::null_mut();
        };
        let url = if base_url.is_null() {
            ""
        } else {
            match unsafe { c_str(base_url) } {
                Some(url) => url,
                None => return std::ptr::null_mut(),
            }
        };
        let config = ClientConfig::default()
            .with_base_url(url)
            .with_auth_strategy(strategy);
        match RequestContext::in_memory(config) {
            Ok(inner) => Box::into_raw(Box::new(FfiCrmClient { inner })),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `crm_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn crm_client_free(client: *mut FfiCrmClient) {
    if !client.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(client) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Cookies and tokens
// ---------------------------------------------------------------------------

/// Store one cookie, `Set-Cookie` style (`name=value; path=/; ...`).
/// A non-positive `max-age`, or with no `max-age` an `expires` in the past,
/// deletes the cookie. Ignores null arguments.
#[unsafe(no_mangle)]
pub extern "C" fn crm_set_cookie(client: *const FfiCrmClient, cookie: *const c_char) {
    if client.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &*client };
        if let Some(cookie) = unsafe { c_str(cookie) } {
            client.inner.document().set_cookie(cookie);
        }
    }));
}

/// Every stored cookie as `a=1; b=2`, for the host's `Cookie` header.
///
/// Returns null if `client` is null. Free with `crm_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn crm_cookie_string(client: *const FfiCrmClient) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        c_string(client.inner.document().cookie())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// The current bearer token, or null when none is stored.
/// Free with `crm_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn crm_get_token(client: *const FfiCrmClient) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.tokens().get_token() {
            Some(token) => c_string(token),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

#[unsafe(no_mangle)]
pub extern "C" fn crm_set_token(client: *const FfiCrmClient, token: *const c_char) {
    if client.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &*client };
        if let Some(token) = unsafe { c_str(token) } {
            client.inner.tokens().set_token(token);
        }
    }));
}

/// Forget the bearer token in storage and expire the token cookies.
#[unsafe(no_mangle)]
pub extern "C" fn crm_clear_token(client: *const FfiCrmClient) {
    if client.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let client = unsafe { &*client };
        client.inner.tokens().clear_token();
    }));
}

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// Build the HTTP request for `endpoint`.
///
/// `method` is a verb such as `"POST"` (case-insensitive); null means GET.
/// `body` is sent as-is and may be null. Returns null if `client` or
/// `endpoint` is null, or if any string is not valid UTF-8 or the method is
/// unknown. The caller must free the returned pointer with
/// `crm_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn crm_build_request(
    client: *const FfiCrmClient,
    method: *const c_char,
    endpoint: *const c_char,
    body: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let Some(endpoint) = (unsafe { c_str(endpoint) }) else {
            return std::ptr::null_mut();
        };

        let mut options = RequestOptions::default();
        if !method.is_null() {
            let parsed = unsafe { c_str(method) }.and_then(|m| m.parse::<HttpMethod>().ok());
            match parsed {
                Some(m) => options.method = Some(m),
                None => return std::ptr::null_mut(),
            }
        }
        if !body.is_null() {
            match unsafe { c_str(body) } {
                Some(b) => options.body = Some(b.to_string()),
                None => return std::ptr::null_mut(),
            }
        }

        FfiHttpRequest::from_core(client.inner.build(endpoint, options))
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Interpret the response to a request built by `crm_build_request`.
///
/// Every `Set-Cookie` response header is stored in the handle's cookie jar
/// before the status is looked at. Under the bearer strategy a 401 also
/// clears the stored token. Never returns null; free with `crm_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn crm_parse_response(
    client: *const FfiCrmClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCrmResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiCrmResult::null_arg("client");
        }
        if response.is_null() {
            return FfiCrmResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        let body = if resp.body.is_null() {
            String::new()
        } else {
            unsafe { CStr::from_ptr(resp.body) }
                .to_string_lossy()
                .into_owned()
        };
        let headers = unsafe { response_headers(resp) };
        for (_, cookie) in headers.iter().filter(|(k, _)| k.eq_ignore_ascii_case("set-cookie")) {
            client.inner.document().set_cookie(cookie);
        }
        let core_resp = HttpResponse {
            status: resp.status,
            headers,
            body,
        };
        FfiCrmResult::from_outcome(client.inner.interpret(core_resp), resp.status)
    }))
    .unwrap_or_else(|_| FfiCrmResult::panic("panic in crm_parse_response"))
}

/// Copy the caller's headers. Entries with a null or non-UTF-8 key or value
/// are skipped.
///
/// `resp.headers` must be null or point to `resp.headers_len` valid entries.
unsafe fn response_headers(resp: &FfiHttpResponse) -> Vec<(String, String)> {
    if resp.headers.is_null() || resp.headers_len == 0 {
        return Vec::new();
    }
    let raw = unsafe { std::slice::from_raw_parts(resp.headers, resp.headers_len as usize) };
    raw.iter()
        .filter_map(|h| {
            let key = unsafe { c_str(h.key) }?;
            let value = unsafe { c_str(h.value) }?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `crm_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn crm_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }));
}

/// Free an `FfiCrmResult` returned by `crm_parse_response`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn crm_free_result(result: *mut FfiCrmResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.data);
        free_c_string(result.redirect);
    }));
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn crm_free_string(s: *mut c_char) {
    let _ = catch_unwind(AssertUnwindSafe(|| free_c_string(s)));
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
