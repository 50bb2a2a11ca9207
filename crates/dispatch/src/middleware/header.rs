use crate::handler::{HandlerResult, RequestHandler};
use crate::middleware::Middleware;
use crate::request::RequestContext;
use async_trait::async_trait;
use http::{HeaderName, HeaderValue};

/// Sets a fixed header on every response, replacing any value the handler set.
#[derive(Debug, Clone)]
pub struct SetHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl SetHeader {
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Middleware for SetHeader {
    fn wrap(&self, next: Box<dyn RequestHandler>) -> Box<dyn RequestHandler> {
        Box::new(SetHeaderHandler { header: self.clone(), next })
    }
}

struct SetHeaderHandler {
    header: SetHeader,
    next: Box<dyn RequestHandler>,
}

#[async_trait]
impl RequestHandler for SetHeaderHandler {
    async fn invoke(&self, req: RequestContext) -> HandlerResult {
        let mut resp = self.next.invoke(req).await?;
        resp.headers_mut().insert(self.header.name.clone(), self.header.value.clone());
        Ok(resp)
    }
}
