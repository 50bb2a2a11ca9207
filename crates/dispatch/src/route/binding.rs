use crate::body::ResponseBody;
use crate::controller::{Controller, ControllerId};
use crate::route::pattern::FormatSplitter;
use http::{Method, Response};
use std::fmt;
use std::sync::Arc;

/// A path-level handler that bypasses action dispatch; it only sees the captured segments.
pub trait Rewriter: Send + Sync {
    fn rewrite(&self, captures: &[&str]) -> Response<ResponseBody>;
}

impl<F> Rewriter for F
where
    F: Fn(&[&str]) -> Response<ResponseBody> + Send + Sync,
{
    fn rewrite(&self, captures: &[&str]) -> Response<ResponseBody> {
        (self)(captures)
    }
}

/// Points at one action of a mounted controller.
#[derive(Clone)]
pub struct ActionRef {
    controller: Arc<Controller>,
    action: String,
    format: Option<FormatSplitter>,
}

impl ActionRef {
    pub fn new(controller: Arc<Controller>, action: impl Into<String>, format: Option<FormatSplitter>) -> Self {
        Self { controller, action: action.into(), format }
    }

    pub fn controller(&self) -> &Arc<Controller> {
        &self.controller
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn format_splitter(&self) -> Option<&FormatSplitter> {
        self.format.as_ref()
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.controller.id(), self.action)
    }
}

impl fmt::Debug for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRef")
            .field("controller", self.controller.id())
            .field("action", &self.action)
            .field("format", &self.format)
            .finish()
    }
}

#[derive(Clone)]
pub struct RewriteRef {
    owner: ControllerId,
    rewriter: Arc<dyn Rewriter>,
}

impl RewriteRef {
    pub fn new(owner: ControllerId, rewriter: Arc<dyn Rewriter>) -> Self {
        Self { owner, rewriter }
    }

    pub fn rewriter(&self) -> &dyn Rewriter {
        self.rewriter.as_ref()
    }
}

impl fmt::Debug for RewriteRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RewriteRef").field("owner", &self.owner).finish_non_exhaustive()
    }
}

/// What a (pattern, verb) pair is bound to.
#[derive(Debug, Clone)]
pub enum Target {
    Action(ActionRef),
    Rewrite(RewriteRef),
}

impl Target {
    pub fn owner(&self) -> &ControllerId {
        match self {
            Target::Action(action) => action.controller.id(),
            Target::Rewrite(rewrite) => &rewrite.owner,
        }
    }

    /// `Controller#action`, or `Controller#rewrite` for rewriters.
    pub fn describe(&self) -> String {
        match self {
            Target::Action(action) => action.to_string(),
            Target::Rewrite(rewrite) => format!("{}#rewrite", rewrite.owner),
        }
    }
}

/// Verbs bound on one pattern, in binding order.
#[derive(Debug, Clone, Default)]
pub struct VerbBinding {
    entries: Vec<(Method, Target)>,
}

impl VerbBinding {
    pub fn get(&self, method: &Method) -> Option<&Target> {
        self.entries.iter().find(|(bound, _)| bound == method).map(|(_, target)| target)
    }

    /// Binds `method`, returning the target it replaced.
    pub fn insert(&mut self, method: Method, target: Target) -> Option<Target> {
        match self.entries.iter_mut().find(|(bound, _)| *bound == method) {
            Some((_, existing)) => Some(std::mem::replace(existing, target)),
            None => {
                self.entries.push((method, target));
                None
            }
        }
    }

    pub fn methods(&self) -> Vec<Method> {
        self.entries.iter().map(|(method, _)| method.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Method, &Target)> {
        self.entries.iter().map(|(method, target)| (method, target))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
