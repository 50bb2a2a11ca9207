//! The mount manager and request entry point.
//!
//! An [`App`] collects controllers into one [`RouteTable`] before serving. Mounting
//! takes `&mut App`; once the app is shared with the server it is only read.

use crate::body::ResponseBody;
use crate::controller::{Controller, ControllerGroup, ControllerId};
use crate::dispatch::dispatch;
use crate::error::{MountError, ServerError};
use crate::handler::{HandlerResult, RequestHandler};
use crate::registry::{ControllerRegistry, Selector};
use crate::request::RequestContext;
use crate::responder::{not_found, not_implemented};
use crate::route::compiler::compile;
use crate::route::pattern::normalize_path;
use crate::route::resolver::Resolution;
use crate::route::table::RouteTable;
use crate::server::{Server, ServerConfig, init_logging};
use crate::url_map::UrlMap;
use async_trait::async_trait;
use http::Response;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

type Setup = Arc<dyn Fn(&mut Controller) + Send + Sync>;

/// What a mount call operates on.
#[derive(Debug)]
pub enum MountTarget {
    Controller(Controller),
    Group(ControllerGroup),
    Select(Selector),
}

impl From<Controller> for MountTarget {
    fn from(controller: Controller) -> Self {
        MountTarget::Controller(controller)
    }
}

impl From<ControllerGroup> for MountTarget {
    fn from(group: ControllerGroup) -> Self {
        MountTarget::Group(group)
    }
}

impl From<Selector> for MountTarget {
    fn from(selector: Selector) -> Self {
        MountTarget::Select(selector)
    }
}

pub struct App {
    base_url: String,
    routes: RouteTable,
    mounted: HashSet<ControllerId>,
    controllers: Vec<Arc<Controller>>,
    global_setups: Vec<Setup>,
    registry: ControllerRegistry,
}

impl App {
    pub fn new() -> Self {
        Self::with_base_url("/")
    }

    /// An app whose controllers are all mounted below `base_url`.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: normalize_path(base_url),
            routes: RouteTable::new(),
            mounted: HashSet::new(),
            controllers: Vec::new(),
            global_setups: Vec::new(),
            registry: ControllerRegistry::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Registers a controller for [`mount_registered`](Self::mount_registered) and
    /// for mounting through a [`Selector`].
    pub fn register(&mut self, controller: Controller) -> &mut Self {
        self.registry.register(controller);
        self
    }

    pub fn registry(&self) -> &ControllerRegistry {
        &self.registry
    }

    /// Adds a setup step run on every controller mounted from now on.
    ///
    /// Controllers that are already mounted are not touched, so register global
    /// setup before mounting.
    pub fn global_setup<F>(&mut self, setup: F) -> &mut Self
    where
        F: Fn(&mut Controller) + Send + Sync + 'static,
    {
        self.global_setups.push(Arc::new(setup));
        self
    }

    pub fn mount(&mut self, target: impl Into<MountTarget>) -> Result<&mut Self, MountError> {
        self.mount_with(target, &[], |_: &mut Controller| {})
    }

    /// Mounts under `roots`: the first root prefixes the base URL, the others become
    /// canonical base URLs.
    pub fn mount_at(&mut self, target: impl Into<MountTarget>, roots: &[&str]) -> Result<&mut Self, MountError> {
        self.mount_with(target, roots, |_: &mut Controller| {})
    }

    /// Mounts with a setup step run before the global ones.
    ///
    /// Controllers are mounted one by one; on error the ones before the failing
    /// controller stay mounted.
    pub fn mount_with<F>(
        &mut self,
        target: impl Into<MountTarget>,
        roots: &[&str],
        setup: F,
    ) -> Result<&mut Self, MountError>
    where
        F: Fn(&mut Controller),
    {
        let controllers = match target.into() {
            MountTarget::Controller(controller) => controller.flatten(),
            MountTarget::Group(group) => group.into_controllers(),
            MountTarget::Select(selector) => self.registry.select(&selector),
        };

        for mut controller in controllers {
            if self.mounted.contains(controller.id()) {
                debug!(controller = %controller.id(), "already mounted, skipping");
                continue;
            }

            if !roots.is_empty() || self.base_url != "/" {
                controller.remap(&self.base_url, roots);
            }
            setup(&mut controller);
            for global in &self.global_setups {
                global(&mut controller);
            }

            let controller = Arc::new(controller);
            let table = compile(&controller)?;
            self.routes.merge(table)?;

            debug!(controller = %controller.id(), base_url = controller.base_url(), "mounted");
            self.mounted.insert(controller.id().clone());
            self.controllers.push(controller);
        }
        Ok(self)
    }

    /// Mounts every registered controller that is not mounted yet.
    pub fn mount_registered(&mut self) -> Result<&mut Self, MountError> {
        self.mount(Selector::All)
    }

    pub fn is_mounted(&self, id: &ControllerId) -> bool {
        self.mounted.contains(id)
    }

    pub fn controllers(&self) -> &[Arc<Controller>] {
        &self.controllers
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn url_map(&self) -> UrlMap {
        UrlMap::from_table(&self.routes)
    }

    /// Resolves and answers one request.
    pub async fn call(&self, req: RequestContext) -> Response<ResponseBody> {
        let method = req.method().clone();
        let path = req.path_info().to_owned();

        match self.routes.resolve(&method, &path) {
            Resolution::NotFound => not_found(req.uri().path()),
            Resolution::NotImplemented { allowed } => not_implemented(&allowed),
            Resolution::Rewrite { rewrite, captures } => {
                let captures = captures.iter().map(String::as_str).collect::<Vec<_>>();
                rewrite.rewriter().rewrite(&captures)
            }
            Resolution::Dispatch { action, route } => dispatch(action, req.route(route)).await,
        }
    }

    /// Serves the app until the listener fails.
    ///
    /// When nothing was mounted explicitly, every registered controller is mounted first.
    pub async fn run(mut self, config: ServerConfig) -> Result<(), ServerError> {
        init_logging(config.log_level);
        if self.mounted.is_empty() {
            self.mount_registered()?;
        }
        info!(routes = self.routes.len(), controllers = self.controllers.len(), "app ready");
        Server::new(self, &config)?.start().await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("base_url", &self.base_url)
            .field("mounted", &self.mounted)
            .field("routes", &self.routes.len())
            .field("global_setups", &self.global_setups.len())
            .finish_non_exhaustive()
    }
}

/// An app can be served inside another handler chain.
#[async_trait]
impl RequestHandler for App {
    async fn invoke(&self, req: RequestContext) -> HandlerResult {
        Ok(self.call(req).await)
    }
}
