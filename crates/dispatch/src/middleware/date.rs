//! The `Date` response header (RFC 9110 section 6.6.1).
//!
//! Formatting a date on every response is wasted work under load, so a shared
//! [`DateService`] keeps the current value and a background task refreshes it.

use crate::handler::{HandlerResult, RequestHandler};
use crate::middleware::Middleware;
use crate::request::RequestContext;
use arc_swap::ArcSwap;
use async_trait::async_trait;
use bytes::Bytes;
use http::HeaderValue;
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

static DATE_SERVICE: Lazy<DateService> = Lazy::new(|| DateService::with_update_interval(Duration::from_millis(800)));

pub struct DateService {
    current: Arc<ArcSwap<Bytes>>,
    handle: Option<JoinHandle<()>>,
}

impl DateService {
    pub fn global() -> &'static DateService {
        &DATE_SERVICE
    }

    /// Starts refreshing every `update_interval`.
    ///
    /// Outside a tokio runtime nothing refreshes the cached value, so every read
    /// formats a fresh date instead.
    pub fn with_update_interval(update_interval: Duration) -> Self {
        let current = Arc::new(ArcSwap::from_pointee(now()));

        let handle = tokio::runtime::Handle::try_current().ok().map(|runtime| {
            let current = Arc::clone(&current);
            runtime.spawn(async move {
                loop {
                    tokio::time::sleep(update_interval).await;
                    current.store(Arc::new(now()));
                }
            })
        });

        DateService { current, handle }
    }

    pub fn header_value(&self) -> Option<HeaderValue> {
        let date = if self.handle.is_some() { self.current.load().as_ref().clone() } else { now() };
        HeaderValue::from_maybe_shared(date).ok()
    }
}

impl std::fmt::Debug for DateService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DateService").field("current", &**self.current.load()).finish_non_exhaustive()
    }
}

impl Drop for DateService {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}

fn now() -> Bytes {
    let mut buf = faf_http_date::get_date_buff_no_key();
    faf_http_date::get_date_no_key(&mut buf);
    Bytes::from_owner(buf)
}

/// Adds a `Date` header to responses that do not carry one yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateHeader;

impl Middleware for DateHeader {
    fn wrap(&self, next: Box<dyn RequestHandler>) -> Box<dyn RequestHandler> {
        Box::new(DateHandler { next, date_service: DateService::global() })
    }
}

struct DateHandler {
    next: Box<dyn RequestHandler>,
    date_service: &'static DateService,
}

#[async_trait]
impl RequestHandler for DateHandler {
    async fn invoke(&self, req: RequestContext) -> HandlerResult {
        let mut resp = self.next.invoke(req).await?;
        if !resp.headers().contains_key(http::header::DATE)
            && let Some(date) = self.date_service.header_value()
        {
            resp.headers_mut().insert(http::header::DATE, date);
        }
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::{DateHeader, DateService};
    use crate::handler::{RequestHandler, handler_fn};
    use crate::middleware::Middleware;
    use crate::request::RequestContext;
    use crate::test_support::context;
    use http::{Method, header};
    use std::time::Duration;

    #[test]
    fn date_without_runtime() {
        let service = DateService::with_update_interval(Duration::from_secs(1));
        let date = service.header_value().unwrap();
        assert_eq!(date.len(), 29);
        assert!(date.to_str().unwrap().ends_with("GMT"));
    }

    #[tokio::test]
    async fn date_header_is_added() {
        let handler = DateHeader.wrap(Box::new(handler_fn(|_req: RequestContext| async { "ok" })));
        let resp = handler.invoke(context(Method::GET, "/")).await.unwrap();
        assert!(resp.headers().contains_key(header::DATE));
    }

    #[tokio::test]
    async fn existing_date_is_kept() {
        let handler = DateHeader.wrap(Box::new(handler_fn(|_req: RequestContext| async {
            let mut resp = http::Response::new(crate::body::ResponseBody::empty());
            resp.headers_mut().insert(header::DATE, http::HeaderValue::from_static("yesterday"));
            resp
        })));
        let resp = handler.invoke(context(Method::GET, "/")).await.unwrap();
        assert_eq!(resp.headers().get(header::DATE).unwrap(), "yesterday");
    }
}
