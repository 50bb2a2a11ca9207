use crate::body::ResponseBody;
use crate::error::BoxError;
use crate::request::RequestContext;
use crate::responder::Responder;
use async_trait::async_trait;
use http::Response;
use std::fmt;

pub type HandlerResult = Result<Response<ResponseBody>, BoxError>;

/// Anything that can answer a routed request: actions, and actions wrapped in middleware.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, req: RequestContext) -> HandlerResult;
}

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for Box<H> {
    async fn invoke(&self, req: RequestContext) -> HandlerResult {
        (**self).invoke(req).await
    }
}

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for std::sync::Arc<H> {
    async fn invoke(&self, req: RequestContext) -> HandlerResult {
        (**self).invoke(req).await
    }
}

/// a holder which turns any async Fn taking the request context into a handler
#[derive(Clone, Copy)]
pub struct FnHandler<F> {
    f: F,
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnHandler")
    }
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    async fn invoke(&self, req: RequestContext) -> HandlerResult {
        let responder = (self.f)(req).await;
        Ok(responder.into_response())
    }
}

#[cfg(test)]
mod test {
    use crate::handler::{FnHandler, RequestHandler, handler_fn};
    use crate::request::RequestContext;
    use crate::test_support::context;
    use http::{Method, StatusCode};

    fn assert_is_handler<T: RequestHandler>(_handler: &T) {
        // no op
    }

    #[test]
    fn assert_fn_is_handler() {
        async fn get(_req: RequestContext) {}

        let handler: FnHandler<_> = handler_fn(get);
        assert_is_handler(&handler);
    }

    #[tokio::test]
    async fn fn_handler_converts_output() {
        let handler = handler_fn(|req: RequestContext| async move { format!("{} {}", req.method(), req.path_info()) });

        let response = handler.invoke(context(Method::PUT, "/items/3")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(crate::test_support::body_string(response).await, "PUT /items/3");
    }

    #[tokio::test]
    async fn boxed_handler_delegates() {
        let handler: Box<dyn RequestHandler> = Box::new(handler_fn(|_req: RequestContext| async { "boxed" }));

        let response = handler.invoke(context(Method::GET, "/")).await.unwrap();
        assert_eq!(crate::test_support::body_string(response).await, "boxed");
    }
}
