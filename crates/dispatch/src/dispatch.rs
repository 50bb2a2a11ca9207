//! Per-request handler chain around one bound action.

use crate::body::ResponseBody;
use crate::controller::Controller;
use crate::handler::{HandlerResult, RequestHandler};
use crate::middleware::{Middleware, chain};
use crate::request::RequestContext;
use crate::responder::{internal_error, not_found};
use crate::route::binding::ActionRef;
use async_trait::async_trait;
use http::Response;
use std::sync::Arc;
use tracing::{debug, error};

/// A controller instance bound to a single action; the innermost handler of a chain.
#[derive(Debug)]
pub struct BoundAction {
    controller: Arc<Controller>,
    action: String,
}

impl BoundAction {
    pub fn new(controller: Arc<Controller>, action: impl Into<String>) -> Self {
        Self { controller, action: action.into() }
    }
}

#[async_trait]
impl RequestHandler for BoundAction {
    async fn invoke(&self, req: RequestContext) -> HandlerResult {
        let Some(action) = self.controller.action(&self.action) else {
            return Ok(not_found(req.uri().path()));
        };

        let params = req.path_params().len();
        if !action.arity().accepts(params) {
            debug!(controller = %self.controller.id(), action = %self.action, params, "parameter count does not fit the action");
            return Ok(not_found(req.uri().path()));
        }

        action.handler().invoke(req).await
    }
}

/// Builds the chain for `action`: its controller's middleware around the bound action.
pub fn build_chain(action: &ActionRef) -> Box<dyn RequestHandler> {
    let controller = action.controller();
    let bound = BoundAction::new(Arc::clone(controller), action.action());
    chain(controller.middleware().iter().map(|m| m.as_ref() as &dyn Middleware), Box::new(bound))
}

/// Runs the chain for `action`; handler errors become a 500.
pub async fn dispatch(action: &ActionRef, req: RequestContext) -> Response<ResponseBody> {
    let path = req.uri().path().to_owned();
    match build_chain(action).invoke(req).await {
        Ok(resp) => resp,
        Err(e) => {
            error!(action = %action, path = %path, error = %e, "action failed");
            internal_error()
        }
    }
}
