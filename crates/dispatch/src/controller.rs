//! Controller definitions.
//!
//! A [`Controller`] is a declarative description: a name, a base URL, named actions,
//! middleware, format suffixes, aliases and rewriters. It stays mutable until it is
//! mounted, so mount-time setup steps can adjust it; mounting freezes it behind an
//! `Arc` and compiles its routes.
//!
//! ```
//! use micro_dispatch::{Arity, Controller, handler_fn, RequestContext};
//!
//! let users = Controller::builder("Users")
//!     .action("index", handler_fn(|_req: RequestContext| async { "all users" }))
//!     .action_with_arity("post_edit", Arity::exact(1), handler_fn(|req: RequestContext| async move {
//!         format!("edit {}", req.path_params()[0])
//!     }))
//!     .formats([".json"])
//!     .build();
//!
//! assert_eq!(users.base_url(), "/users");
//! ```

use crate::handler::RequestHandler;
use crate::middleware::Middleware;
use crate::route::binding::Rewriter;
use crate::route::pattern::{join_paths, normalize_path};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a controller; mounting is idempotent per identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControllerId(Arc<str>);

impl ControllerId {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How many path parameters an action takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    required: usize,
    optional: usize,
    variadic: bool,
}

impl Arity {
    /// Accepts any number of parameters.
    pub const ANY: Arity = Arity { required: 0, optional: 0, variadic: true };
    pub const NONE: Arity = Arity { required: 0, optional: 0, variadic: false };

    pub const fn new(required: usize, optional: usize) -> Self {
        Self { required, optional, variadic: false }
    }

    pub const fn exact(required: usize) -> Self {
        Self::new(required, 0)
    }

    /// At least `required` parameters, any number after that.
    pub const fn at_least(required: usize) -> Self {
        Self { required, optional: 0, variadic: true }
    }

    pub fn accepts(&self, count: usize) -> bool {
        count >= self.required && (self.variadic || count <= self.required + self.optional)
    }
}

impl Default for Arity {
    fn default() -> Self {
        Self::ANY
    }
}

#[derive(Clone)]
pub struct Action {
    name: String,
    arity: Arity,
    handler: Arc<dyn RequestHandler>,
}

impl Action {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub fn handler(&self) -> &dyn RequestHandler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("name", &self.name).field("arity", &self.arity).finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Controller {
    id: ControllerId,
    base_url: String,
    canonicals: Vec<String>,
    actions: Vec<Action>,
    aliases: Vec<(String, String)>,
    rewrites: Vec<(String, Arc<dyn Rewriter>)>,
    formats: Vec<String>,
    action_formats: HashMap<String, Vec<String>>,
    middleware: Vec<Arc<dyn Middleware>>,
    children: Vec<Controller>,
}

impl Controller {
    /// Starts a controller named `name`, based at the snake-cased name (`UserProfiles`
    /// becomes `/user_profiles`, `Admin::Users` becomes `/admin/users`).
    pub fn builder(name: impl AsRef<str>) -> ControllerBuilder {
        ControllerBuilder::new(name.as_ref())
    }

    fn new(name: &str) -> Self {
        Self {
            id: ControllerId::new(name),
            base_url: default_base_url(name),
            canonicals: Vec::new(),
            actions: Vec::new(),
            aliases: Vec::new(),
            rewrites: Vec::new(),
            formats: Vec::new(),
            action_formats: HashMap::new(),
            middleware: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &ControllerId {
        &self.id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Additional base URLs serving the same actions.
    pub fn canonicals(&self) -> &[String] {
        &self.canonicals
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.name == name)
    }

    /// Extra paths of `action`, relative to the base URL.
    pub fn aliases_of<'a>(&'a self, action: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.aliases.iter().filter(move |(name, _)| name == action).map(|(_, path)| path.as_str())
    }

    pub fn rewrites(&self) -> &[(String, Arc<dyn Rewriter>)] {
        &self.rewrites
    }

    /// Format suffixes declared for `action`, falling back to the controller-wide ones.
    pub fn formats_for(&self, action: &str) -> &[String] {
        self.action_formats.get(action).map_or(self.formats.as_slice(), Vec::as_slice)
    }

    /// Middleware in declaration order; the first one runs outermost.
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    pub fn children(&self) -> &[Controller] {
        &self.children
    }

    /// This controller followed by all of its sub-controllers, depth first.
    pub fn flatten(mut self) -> Vec<Controller> {
        let children = std::mem::take(&mut self.children);
        let mut all = vec![self];
        all.extend(children.into_iter().flat_map(Controller::flatten));
        all
    }

    pub fn set_base_url(&mut self, base_url: &str) -> &mut Self {
        self.base_url = normalize_path(base_url);
        self
    }

    pub fn add_canonical(&mut self, base_url: &str) -> &mut Self {
        self.canonicals.push(normalize_path(base_url));
        self
    }

    pub fn add_action(&mut self, name: impl Into<String>, arity: Arity, handler: impl RequestHandler + 'static) -> &mut Self {
        let name = name.into();
        let action = Action { name, arity, handler: Arc::new(handler) };
        match self.actions.iter_mut().find(|existing| existing.name == action.name) {
            Some(existing) => *existing = action,
            None => self.actions.push(action),
        }
        self
    }

    pub fn add_alias(&mut self, action: impl Into<String>, path: impl Into<String>) -> &mut Self {
        self.aliases.push((action.into(), path.into()));
        self
    }

    pub fn add_rewrite(&mut self, template: impl Into<String>, rewriter: impl Rewriter + 'static) -> &mut Self {
        self.rewrites.push((template.into(), Arc::new(rewriter)));
        self
    }

    pub fn set_formats<I, S>(&mut self, formats: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_action_formats<I, S>(&mut self, action: impl Into<String>, formats: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.action_formats.insert(action.into(), formats.into_iter().map(Into::into).collect());
        self
    }

    pub fn add_middleware(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn add_child(&mut self, controller: Controller) -> &mut Self {
        self.children.push(controller);
        self
    }

    /// Rebases the controller under `base` and the first of `roots`; any further
    /// roots become canonical base URLs.
    pub fn remap(&mut self, base: &str, roots: &[&str]) -> &mut Self {
        let own = self.base_url.clone();
        let first = roots.first().copied().unwrap_or("");

        self.base_url = join_paths([base, first, own.as_str()]);
        let mut canonicals = self
            .canonicals
            .iter()
            .map(|canonical| join_paths([base, first, canonical.as_str()]))
            .collect::<Vec<_>>();
        canonicals.extend(roots.iter().skip(1).map(|&root| join_paths([base, root, own.as_str()])));
        self.canonicals = canonicals;
        self
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("id", &self.id)
            .field("base_url", &self.base_url)
            .field("canonicals", &self.canonicals)
            .field("actions", &self.actions)
            .field("formats", &self.formats)
            .field("middleware", &self.middleware.len())
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct ControllerBuilder {
    controller: Controller,
}

impl ControllerBuilder {
    fn new(name: &str) -> Self {
        Self { controller: Controller::new(name) }
    }

    pub fn base_url(mut self, base_url: &str) -> Self {
        self.controller.set_base_url(base_url);
        self
    }

    pub fn canonical(mut self, base_url: &str) -> Self {
        self.controller.add_canonical(base_url);
        self
    }

    /// Adds an action accepting any number of path parameters.
    pub fn action(mut self, name: impl Into<String>, handler: impl RequestHandler + 'static) -> Self {
        self.controller.add_action(name, Arity::ANY, handler);
        self
    }

    pub fn action_with_arity(
        mut self,
        name: impl Into<String>,
        arity: Arity,
        handler: impl RequestHandler + 'static,
    ) -> Self {
        self.controller.add_action(name, arity, handler);
        self
    }

    pub fn alias(mut self, action: impl Into<String>, path: impl Into<String>) -> Self {
        self.controller.add_alias(action, path);
        self
    }

    pub fn rewrite(mut self, template: impl Into<String>, rewriter: impl Rewriter + 'static) -> Self {
        self.controller.add_rewrite(template, rewriter);
        self
    }

    pub fn formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.controller.set_formats(formats);
        self
    }

    pub fn action_formats<I, S>(mut self, action: impl Into<String>, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.controller.set_action_formats(action, formats);
        self
    }

    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.controller.add_middleware(middleware);
        self
    }

    pub fn sub_controller(mut self, controller: Controller) -> Self {
        self.controller.add_child(controller);
        self
    }

    pub fn build(self) -> Controller {
        self.controller
    }
}

/// A named set of controllers mounted together.
#[derive(Debug, Clone, Default)]
pub struct ControllerGroup {
    controllers: Vec<Controller>,
}

impl ControllerGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, controller: Controller) -> Self {
        self.controllers.push(controller);
        self
    }

    pub fn into_controllers(self) -> Vec<Controller> {
        self.controllers.into_iter().flat_map(Controller::flatten).collect()
    }
}

fn default_base_url(name: &str) -> String {
    join_paths(name.split("::").map(snake_case).collect::<Vec<_>>().iter().map(String::as_str))
}

fn snake_case(name: &str) -> String {
    let mut snake = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 {
                snake.push('_');
            }
            snake.push(ch.to_ascii_lowercase());
        } else {
            snake.push(ch);
        }
    }
    snake
}
