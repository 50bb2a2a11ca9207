//! A printable, serializable listing of every mounted route.

use crate::route::table::RouteTable;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlMap {
    routes: Vec<UrlMapRoute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlMapRoute {
    pub template: String,
    pub verbs: Vec<UrlMapBinding>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlMapBinding {
    pub verb: String,
    /// `Controller#action`, or `Controller#rewrite`
    pub target: String,
}

impl UrlMap {
    /// Routes in resolution order; the bare root pattern `/` is left out.
    pub fn from_table(table: &RouteTable) -> Self {
        let routes = table
            .sorted()
            .filter(|entry| entry.pattern().source() != "/")
            .map(|entry| UrlMapRoute {
                template: entry.pattern().source().to_owned(),
                verbs: entry
                    .binding()
                    .iter()
                    .map(|(method, target)| UrlMapBinding { verb: method.to_string(), target: target.describe() })
                    .collect(),
            })
            .collect();
        Self { routes }
    }

    pub fn routes(&self) -> &[UrlMapRoute] {
        &self.routes
    }

    /// Verbs under which `target` (`Controller#action`) is reachable on `template`.
    pub fn verbs_for(&self, template: &str, target: &str) -> Vec<&str> {
        self.routes
            .iter()
            .filter(|route| route.template == template)
            .flat_map(|route| route.verbs.iter())
            .filter(|binding| binding.target == target)
            .map(|binding| binding.verb.as_str())
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for UrlMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for route in &self.routes {
            writeln!(f, "{}", route.template)?;
            for binding in &route.verbs {
                writeln!(f, "  {:<8}{}", binding.verb, binding.target)?;
            }
        }
        Ok(())
    }
}
