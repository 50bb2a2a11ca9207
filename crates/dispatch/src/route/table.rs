use crate::error::MountError;
use crate::route::binding::{Target, VerbBinding};
use crate::route::pattern::RoutePattern;
use http::Method;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Maps compiled patterns to the verbs bound on them.
///
/// Entries keep registration order; [`sorted`](RouteTable::sorted) yields them by
/// descending template length, which is the order requests are resolved in. The
/// sorted view is computed on first use and reset whenever the table changes.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    index: HashMap<String, usize>,
    sorted: OnceCell<Vec<usize>>,
}

#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: Arc<RoutePattern>,
    binding: VerbBinding,
}

impl RouteEntry {
    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn binding(&self) -> &VerbBinding {
        &self.binding
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, template: &str) -> Option<&RouteEntry> {
        self.index.get(template).map(|&i| &self.entries[i])
    }

    /// Entries in registration order.
    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Binds `method` on `pattern`, returning whatever was bound there before.
    ///
    /// A pattern whose template is already known shares that entry; its format
    /// boundary grows to accept the formats of both.
    pub fn bind(&mut self, pattern: RoutePattern, method: Method, target: Target) -> Option<Target> {
        self.sorted.take();
        let i = self.entry_index(pattern);
        self.entries[i].binding.insert(method, target)
    }

    /// Merges a controller's table into this one.
    ///
    /// Nothing is merged when any (pattern, verb) pair is already bound by another
    /// controller. Pairs rebound by the same controller take the incoming binding.
    pub fn merge(&mut self, other: RouteTable) -> Result<(), MountError> {
        for entry in &other.entries {
            let Some(existing) = self.get(entry.pattern.source()) else {
                continue;
            };
            for (method, incoming) in entry.binding.iter() {
                if let Some(bound) = existing.binding.get(method)
                    && bound.owner() != incoming.owner()
                {
                    return Err(MountError::RouteCollision {
                        template: entry.pattern.source().to_owned(),
                        method: method.clone(),
                        existing: bound.describe(),
                        incoming: incoming.describe(),
                    });
                }
            }
        }

        self.sorted.take();
        for entry in other.entries {
            let i = self.entry_index_shared(entry.pattern);
            for (method, target) in entry.binding.iter() {
                if let Some(replaced) = self.entries[i].binding.insert(method.clone(), target.clone()) {
                    warn!(
                        template = self.entries[i].pattern.source(),
                        %method,
                        replaced = replaced.describe(),
                        "route rebound by the controller that owns it"
                    );
                }
            }
        }
        Ok(())
    }

    /// Entries ordered by descending template length; ties keep registration order.
    pub fn sorted(&self) -> impl Iterator<Item = &RouteEntry> {
        let order = self.sorted.get_or_init(|| {
            let mut order = (0..self.entries.len()).collect::<Vec<_>>();
            order.sort_by_key(|&i| std::cmp::Reverse(self.entries[i].pattern.source().len()));
            order
        });
        order.iter().map(|&i| &self.entries[i])
    }

    fn entry_index(&mut self, pattern: RoutePattern) -> usize {
        match self.index.get(pattern.source()) {
            Some(&i) => {
                self.widen_formats(i, pattern.formats());
                i
            }
            None => self.push_entry(Arc::new(pattern)),
        }
    }

    fn entry_index_shared(&mut self, pattern: Arc<RoutePattern>) -> usize {
        match self.index.get(pattern.source()) {
            Some(&i) => {
                self.widen_formats(i, pattern.formats());
                i
            }
            None => self.push_entry(pattern),
        }
    }

    fn widen_formats(&mut self, i: usize, formats: &[String]) {
        if let Some(widened) = self.entries[i].pattern.with_formats(formats) {
            self.entries[i].pattern = Arc::new(widened);
        }
    }

    fn push_entry(&mut self, pattern: Arc<RoutePattern>) -> usize {
        let i = self.entries.len();
        self.index.insert(pattern.source().to_owned(), i);
        self.entries.push(RouteEntry { pattern, binding: VerbBinding::default() });
        i
    }
}

#[cfg(test)]
mod tests {
    use super::RouteTable;
    use crate::controller::{Controller, ControllerId};
    use crate::error::MountError;
    use crate::route::binding::{ActionRef, RewriteRef, Target};
    use crate::route::pattern::RoutePattern;
    use crate::responder::redirect;
    use http::Method;
    use std::sync::Arc;

    fn action(controller: &str, name: &str) -> Target {
        let controller = Arc::new(Controller::builder(controller).build());
        Target::Action(ActionRef::new(controller, name, None))
    }

    fn rewrite(owner: &str) -> Target {
        Target::Rewrite(RewriteRef::new(ControllerId::new(owner), Arc::new(|_: &[&str]| redirect("/"))))
    }

    fn sources(table: &RouteTable) -> Vec<&str> {
        table.sorted().map(|entry| entry.pattern().source()).collect()
    }

    #[test]
    fn sorted_by_descending_template_length() {
        let mut table = RouteTable::new();
        table.bind(RoutePattern::action("/a", &[]), Method::GET, action("A", "index"));
        table.bind(RoutePattern::action("/a/b", &[]), Method::GET, action("A", "b"));
        table.bind(RoutePattern::action("/c", &[]), Method::GET, action("C", "index"));

        assert_eq!(sources(&table), vec!["/a/b", "/a", "/c"]);
    }

    #[test]
    fn sorted_view_is_reset_on_change() {
        let mut table = RouteTable::new();
        table.bind(RoutePattern::action("/a", &[]), Method::GET, action("A", "index"));
        assert_eq!(sources(&table), vec!["/a"]);

        table.bind(RoutePattern::action("/a/long", &[]), Method::GET, action("A", "long"));
        assert_eq!(sources(&table), vec!["/a/long", "/a"]);
    }

    #[test]
    fn same_template_shares_one_entry() {
        let mut table = RouteTable::new();
        table.bind(RoutePattern::action("/a", &[]), Method::GET, action("A", "index"));
        table.bind(RoutePattern::action("/a", &[]), Method::POST, action("A", "post_index"));

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("/a").unwrap().binding().methods(), vec![Method::GET, Method::POST]);
    }

    #[test]
    fn shared_template_takes_the_union_of_formats() {
        let json = vec![".json".to_owned()];

        let mut plain_first = RouteTable::new();
        plain_first.bind(RoutePattern::action("/users/edit", &[]), Method::POST, action("Users", "post_edit"));
        plain_first.bind(RoutePattern::action("/users/edit", &json), Method::GET, action("Users", "get_edit"));

        let mut formats_first = RouteTable::new();
        formats_first.bind(RoutePattern::action("/users/edit", &json), Method::GET, action("Users", "get_edit"));
        formats_first.bind(RoutePattern::action("/users/edit", &[]), Method::POST, action("Users", "post_edit"));

        for table in [&plain_first, &formats_first] {
            assert_eq!(table.len(), 1);
            assert_eq!(table.get("/users/edit").unwrap().pattern().formats(), [".json"]);
        }
    }

    #[test]
    fn merge_widens_formats_of_existing_entry() {
        let mut table = RouteTable::new();
        table.bind(RoutePattern::action("/a", &[]), Method::GET, action("A", "index"));

        let mut other = RouteTable::new();
        other.bind(RoutePattern::action("/a", &[".xml".to_owned()]), Method::POST, action("B", "post_a"));

        table.merge(other).unwrap();
        assert_eq!(table.get("/a").unwrap().pattern().formats(), [".xml"]);
    }

    #[test]
    fn merge_rejects_collision_between_controllers() {
        let mut table = RouteTable::new();
        table.bind(RoutePattern::action("/a", &[]), Method::GET, action("A", "index"));

        let mut other = RouteTable::new();
        other.bind(RoutePattern::action("/b", &[]), Method::GET, action("B", "index"));
        other.bind(RoutePattern::action("/a", &[]), Method::GET, action("B", "a"));

        let err = table.merge(other).unwrap_err();
        assert!(matches!(err, MountError::RouteCollision { ref template, ref method, .. }
            if template == "/a" && *method == Method::GET));
        assert!(table.get("/b").is_none());
    }

    #[test]
    fn merge_keeps_other_verbs_of_shared_pattern() {
        let mut table = RouteTable::new();
        table.bind(RoutePattern::action("/a", &[]), Method::GET, action("A", "index"));

        let mut other = RouteTable::new();
        other.bind(RoutePattern::action("/a", &[]), Method::POST, action("B", "post_a"));

        table.merge(other).unwrap();
        let binding = table.get("/a").unwrap().binding();
        assert_eq!(binding.get(&Method::GET).unwrap().describe(), "A#index");
        assert_eq!(binding.get(&Method::POST).unwrap().describe(), "B#post_a");
    }

    #[test]
    fn merge_same_owner_takes_incoming() {
        let mut table = RouteTable::new();
        table.bind(RoutePattern::parse("/old").unwrap(), Method::GET, rewrite("A"));

        let mut other = RouteTable::new();
        other.bind(RoutePattern::parse("/old").unwrap(), Method::GET, action("A", "old"));

        table.merge(other).unwrap();
        assert_eq!(table.get("/old").unwrap().binding().get(&Method::GET).unwrap().describe(), "A#old");
    }
}
