//! Compiles a controller declaration into its own [`RouteTable`].
//!
//! Action names carry their routing: `post_edit` binds `POST <base>/edit`, `index`
//! binds the base URL itself, and an unprefixed name binds every supported verb.
//! Within the path fragment `____` becomes `.`, `___` becomes `-` and `__` becomes `/`.

use crate::controller::Controller;
use crate::error::PatternError;
use crate::route::binding::{ActionRef, RewriteRef, Target};
use crate::route::pattern::{FormatSplitter, RoutePattern, join_paths};
use crate::route::table::RouteTable;
use crate::route::verb::{SUPPORTED_METHODS, embedded_verb_tokens, split_verb_prefix};
use http::Method;
use std::sync::Arc;
use tracing::{debug, warn};

pub fn compile(controller: &Arc<Controller>) -> Result<RouteTable, PatternError> {
    let mut table = RouteTable::new();

    for action in controller.actions() {
        let name = action.name();
        let (verb, rest) = split_verb_prefix(name);
        if verb.is_some() {
            let embedded = embedded_verb_tokens(rest);
            if !embedded.is_empty() {
                warn!(
                    controller = %controller.id(),
                    action = name,
                    ?embedded,
                    "only the first verb of an action name is a verb, the rest stays in the path"
                );
            }
        }

        let methods = verb.map_or_else(|| SUPPORTED_METHODS.to_vec(), |verb| vec![verb]);
        let formats = controller.formats_for(name);
        let splitter = (!formats.is_empty()).then(|| FormatSplitter::new(formats.to_vec()));

        let fragment = path_fragment(rest);
        let fragments = std::iter::once(fragment.as_str()).chain(controller.aliases_of(name)).collect::<Vec<_>>();
        let bases = std::iter::once(controller.base_url()).chain(controller.canonicals().iter().map(String::as_str));

        for base in bases {
            for &fragment in &fragments {
                let pattern = RoutePattern::action(&join_paths([base, fragment]), formats);
                debug!(controller = %controller.id(), action = name, template = pattern.source(), "compiled route");
                let target = Target::Action(ActionRef::new(Arc::clone(controller), name, splitter.clone()));
                bind_all(&mut table, &pattern, &methods, &target);
            }
        }
    }

    for (template, rewriter) in controller.rewrites() {
        let pattern = RoutePattern::parse(template)?;
        let target = Target::Rewrite(RewriteRef::new(controller.id().clone(), Arc::clone(rewriter)));
        bind_all(&mut table, &pattern, &SUPPORTED_METHODS, &target);
    }

    Ok(table)
}

fn bind_all(table: &mut RouteTable, pattern: &RoutePattern, methods: &[Method], target: &Target) {
    for method in methods {
        if let Some(replaced) = table.bind(pattern.clone(), method.clone(), target.clone()) {
            warn!(
                template = pattern.source(),
                %method,
                replaced = replaced.describe(),
                incoming = target.describe(),
                "route declared twice, the later declaration wins"
            );
        }
    }
}

/// Turns the verb-less part of an action name into a path fragment.
pub fn path_fragment(rest: &str) -> String {
    if rest == "index" {
        return String::new();
    }
    rest.replace("____", ".").replace("___", "-").replace("__", "/")
}
