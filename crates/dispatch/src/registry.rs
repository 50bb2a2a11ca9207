//! Controllers registered by the application, for mounting by name or pattern.

use crate::controller::Controller;
use regex::Regex;

#[derive(Debug, Clone)]
pub enum Selector {
    All,
    Name(String),
    Matching(Regex),
}

impl Selector {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Name(expected) => expected == name,
            Selector::Matching(regex) => regex.is_match(name),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ControllerRegistry {
    controllers: Vec<Controller>,
}

impl ControllerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `controller` and its sub-controllers; a later registration with the
    /// same name replaces the earlier one.
    pub fn register(&mut self, controller: Controller) -> &mut Self {
        for controller in controller.flatten() {
            match self.controllers.iter_mut().find(|existing| existing.id() == controller.id()) {
                Some(existing) => *existing = controller,
                None => self.controllers.push(controller),
            }
        }
        self
    }

    /// Registered controllers the selector picks, in registration order.
    pub fn select(&self, selector: &Selector) -> Vec<Controller> {
        self.controllers.iter().filter(|controller| selector.matches(controller.id().as_str())).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ControllerRegistry, Selector};
    use crate::controller::Controller;
    use regex::Regex;

    fn registry() -> ControllerRegistry {
        let mut registry = ControllerRegistry::new();
        registry
            .register(Controller::builder("Users").build())
            .register(Controller::builder("Admin").sub_controller(Controller::builder("Admin::Users").build()).build());
        registry
    }

    fn names(controllers: &[Controller]) -> Vec<&str> {
        controllers.iter().map(|controller| controller.id().as_str()).collect()
    }

    #[test]
    fn select_all_in_registration_order() {
        assert_eq!(names(&registry().select(&Selector::All)), vec!["Users", "Admin", "Admin::Users"]);
    }

    #[test]
    fn select_by_name_and_pattern() {
        let registry = registry();
        assert_eq!(names(&registry.select(&Selector::Name("Users".into()))), vec!["Users"]);
        assert_eq!(
            names(&registry.select(&Selector::Matching(Regex::new("^Admin").unwrap()))),
            vec!["Admin", "Admin::Users"]
        );
        assert!(registry.select(&Selector::Name("Nope".into())).is_empty());
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = registry();
        registry.register(Controller::builder("Users").base_url("/people").build());

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.select(&Selector::Name("Users".into()))[0].base_url(), "/people");
    }
}
