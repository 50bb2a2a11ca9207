//! The request environment handed to actions, middleware and the resolver.
//!
//! A [`RequestContext`] owns the request head and body. The resolver reads the
//! method and path from it and, once a route is chosen, writes back the derived
//! routing fields:
//! - `script_name`: the part of the path consumed by the route
//! - `path_info`: the rest of the path, without a format suffix
//! - `raw_path_info`: the rest of the path before the format suffix was split off
//! - `format`: the format suffix, e.g. `.json`

use crate::body::{OptionReqBody, ReqBody};
use http::request::Parts;
use http::{HeaderMap, Method, Request, Uri, Version};

#[derive(Debug)]
pub struct RequestContext {
    parts: Parts,
    body: OptionReqBody,
    script_name: String,
    path_info: String,
    raw_path_info: String,
    format: Option<String>,
}

/// Routing fields computed for a matched route.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RouteParts {
    /// path prefix consumed by the matched pattern
    pub consumed: String,
    pub raw_path_info: String,
    pub path_info: String,
    pub format: Option<String>,
}

impl RequestContext {
    /// Creates a context whose path info is the full request path.
    pub fn new(parts: Parts, body: OptionReqBody) -> Self {
        let path_info = parts.uri.path().to_owned();
        Self { parts, body, script_name: String::new(), raw_path_info: path_info.clone(), path_info, format: None }
    }

    pub fn from_request(request: Request<ReqBody>) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts, OptionReqBody::from(body))
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Returns the URI of the request
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Returns the HTTP version of the request
    pub fn version(&self) -> Version {
        self.parts.version
    }

    /// Returns the HTTP headers of the request
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    pub fn extensions(&self) -> &http::Extensions {
        &self.parts.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut http::Extensions {
        &mut self.parts.extensions
    }

    pub fn body(&self) -> &OptionReqBody {
        &self.body
    }

    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    /// Path info as captured by the route, before any format suffix was removed.
    pub fn raw_path_info(&self) -> &str {
        &self.raw_path_info
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// The non-empty `/` separated segments of [`path_info`](Self::path_info).
    pub fn path_params(&self) -> Vec<&str> {
        self.path_info.split('/').filter(|segment| !segment.is_empty()).collect()
    }

    /// Applies the routing fields of a matched route, mounting the consumed
    /// prefix onto the current script name.
    pub fn route(mut self, route: RouteParts) -> Self {
        self.script_name.push_str(&route.consumed);
        self.raw_path_info = route.raw_path_info;
        self.path_info = route.path_info;
        self.format = route.format;
        self
    }
}
