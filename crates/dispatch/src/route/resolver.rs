//! Request-time route resolution.
//!
//! Resolution walks the table longest template first and stops at the first pattern
//! matching the path. From there:
//!
//! - the verb is not bound: [`Resolution::NotImplemented`]
//! - a rewriter is bound: [`Resolution::Rewrite`] with the captured segments
//! - an action is bound: [`Resolution::Dispatch`] with the routing fields
//!
//! A match is skipped when it consumed a format the bound action did not declare, or
//! when an action pattern captured nothing. A path no pattern matches is
//! [`Resolution::NotFound`].

use crate::request::RouteParts;
use crate::route::binding::{ActionRef, RewriteRef, Target};
use crate::route::table::RouteTable;
use http::Method;

#[derive(Debug)]
pub enum Resolution<'t> {
    NotFound,
    NotImplemented { allowed: Vec<Method> },
    Rewrite { rewrite: &'t RewriteRef, captures: Vec<String> },
    Dispatch { action: &'t ActionRef, route: RouteParts },
}

impl RouteTable {
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        for entry in self.sorted() {
            let Some(matched) = entry.pattern().matches(path) else {
                continue;
            };

            let Some(target) = entry.binding().get(method) else {
                return Resolution::NotImplemented { allowed: entry.binding().methods() };
            };

            let action = match target {
                Target::Rewrite(rewrite) => {
                    let captures = matched.captures().into_iter().map(str::to_owned).collect();
                    return Resolution::Rewrite { rewrite, captures };
                }
                Target::Action(action) => action,
            };

            if let Some(format) = matched.format()
                && !action.format_splitter().is_some_and(|splitter| splitter.accepts(format))
            {
                continue;
            }

            // a literal-only pattern bound by hand has no path info to hand over
            let Some(capture) = matched.first_capture() else {
                continue;
            };

            let raw_path_info = normalize_capture(capture);
            let (path_info, format) = match (matched.format(), action.format_splitter()) {
                (Some(format), _) => (raw_path_info.clone(), Some(format.to_owned())),
                (None, Some(splitter)) => {
                    let (clean, format) = splitter.split(&raw_path_info);
                    (clean.to_owned(), format.map(str::to_owned))
                }
                (None, None) => (raw_path_info.clone(), None),
            };

            let route = RouteParts { consumed: matched.consumed().to_owned(), raw_path_info, path_info, format };
            return Resolution::Dispatch { action, route };
        }
        Resolution::NotFound
    }
}

/// Empty stays empty, anything else gets a leading `/`.
fn normalize_capture(capture: &str) -> String {
    if capture.is_empty() || capture.starts_with('/') {
        capture.to_owned()
    } else {
        format!("/{capture}")
    }
}
