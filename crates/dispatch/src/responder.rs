//! Response handling module that converts action results into HTTP responses.
//!
//! This module provides the [`Responder`] trait which defines how different types
//! can be converted into HTTP responses. It includes implementations for common types
//! like Result, Option, String, etc., and the canned responses produced by the
//! resolver itself.

use crate::body::ResponseBody;
use http::header::{ALLOW, CONTENT_TYPE, LOCATION};
use http::{HeaderName, HeaderValue, Method, Response, StatusCode};
use std::convert::Infallible;

/// Header telling upstream handlers that this one declined the request.
pub const X_CASCADE: HeaderName = HeaderName::from_static("x-cascade");

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// A trait for types that can be converted into HTTP responses.
///
/// Types implementing this trait can be returned directly from actions
/// and will be automatically converted into HTTP responses.
pub trait Responder {
    fn into_response(self) -> Response<ResponseBody>;
}

/// The Ok and Err variants must both implement Responder.
impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn into_response(self) -> Response<ResponseBody> {
        match self {
            Ok(t) => t.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// None case returns an empty response.
impl<T: Responder> Responder for Option<T> {
    fn into_response(self) -> Response<ResponseBody> {
        match self {
            Some(t) => t.into_response(),
            None => Response::new(ResponseBody::empty()),
        }
    }
}

impl<B> Responder for Response<B>
where
    B: Into<ResponseBody>,
{
    fn into_response(self) -> Response<ResponseBody> {
        self.map(Into::into)
    }
}

impl<T: Responder> Responder for (StatusCode, T) {
    fn into_response(self) -> Response<ResponseBody> {
        let (status, responder) = self;
        let mut response = responder.into_response();
        *response.status_mut() = status;
        response
    }
}

impl<T: Responder> Responder for (T, StatusCode) {
    fn into_response(self) -> Response<ResponseBody> {
        let (responder, status) = self;
        (status, responder).into_response()
    }
}

impl<T: Responder> Responder for Box<T> {
    fn into_response(self) -> Response<ResponseBody> {
        (*self).into_response()
    }
}

impl Responder for () {
    fn into_response(self) -> Response<ResponseBody> {
        Response::new(ResponseBody::empty())
    }
}

impl Responder for &'static str {
    fn into_response(self) -> Response<ResponseBody> {
        text(StatusCode::OK, self)
    }
}

impl Responder for String {
    fn into_response(self) -> Response<ResponseBody> {
        text(StatusCode::OK, self)
    }
}

impl Responder for Infallible {
    fn into_response(self) -> Response<ResponseBody> {
        match self {}
    }
}

/// Builds a `text/plain` response.
pub fn text(status: StatusCode, body: impl Into<ResponseBody>) -> Response<ResponseBody> {
    let mut response = Response::new(body.into());
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN));
    response
}

/// 404 with the cascade marker, so an outer handler may still serve the request.
pub fn not_found(path: &str) -> Response<ResponseBody> {
    let mut response = text(StatusCode::NOT_FOUND, format!("Not Found: {path}"));
    response.headers_mut().insert(X_CASCADE, HeaderValue::from_static("pass"));
    response
}

/// 501 naming the verbs the matched resource does answer to.
pub fn not_implemented(allowed: &[Method]) -> Response<ResponseBody> {
    let verbs = allowed.iter().map(Method::as_str).collect::<Vec<_>>().join(", ");
    let mut response =
        text(StatusCode::NOT_IMPLEMENTED, format!("Resource found but it can be accessed only through {verbs}"));
    if let Ok(value) = HeaderValue::from_str(&verbs) {
        response.headers_mut().insert(ALLOW, value);
    }
    response
}

pub fn internal_error() -> Response<ResponseBody> {
    text(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

/// 302 to `location`, meant for rewriters.
pub fn redirect(location: &str) -> Response<ResponseBody> {
    location_response(StatusCode::FOUND, location)
}

/// 301 to `location`, meant for rewriters.
pub fn permanent_redirect(location: &str) -> Response<ResponseBody> {
    location_response(StatusCode::MOVED_PERMANENTLY, location)
}

fn location_response(status: StatusCode, location: &str) -> Response<ResponseBody> {
    let mut response = Response::new(ResponseBody::empty());
    *response.status_mut() = status;
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(LOCATION, value);
            response
        }
        Err(_) => internal_error(),
    }
}
