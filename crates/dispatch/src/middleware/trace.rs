use crate::handler::{HandlerResult, RequestHandler};
use crate::middleware::Middleware;
use crate::request::RequestContext;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{Instrument, info, info_span};

/// Logs one line per request with its status and elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTrace;

impl Middleware for RequestTrace {
    fn wrap(&self, next: Box<dyn RequestHandler>) -> Box<dyn RequestHandler> {
        Box::new(TraceHandler { next })
    }
}

struct TraceHandler {
    next: Box<dyn RequestHandler>,
}

#[async_trait]
impl RequestHandler for TraceHandler {
    async fn invoke(&self, req: RequestContext) -> HandlerResult {
        let span = info_span!("request", method = %req.method(), path = req.uri().path());
        let start = Instant::now();

        let result = self.next.invoke(req).instrument(span.clone()).await;
        span.in_scope(|| match &result {
            Ok(resp) => info!(status = resp.status().as_u16(), elapsed = ?start.elapsed(), "request served"),
            Err(e) => info!(error = %e, elapsed = ?start.elapsed(), "request failed"),
        });
        result
    }
}
