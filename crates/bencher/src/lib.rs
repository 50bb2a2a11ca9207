use http::Method;

/// One request to resolve against a benchmark route table.
#[derive(Debug, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
    method: Method,
    path: &'static str,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup, method: Method, path: &'static str) -> Self {
        Self { name, group, method, path }
    }

    pub fn small(name: &'static str, method: Method, path: &'static str) -> Self {
        Self::new(name, TestGroup::Small, method, path)
    }

    pub fn large(name: &'static str, method: Method, path: &'static str) -> Self {
        Self::new(name, TestGroup::Large, method, path)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &'static str {
        self.path
    }
}

/// Size of the route table a case runs against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestGroup {
    /// a handful of controllers
    Small,
    /// a few hundred routes
    Large,
}

impl TestGroup {
    pub fn controllers(self) -> usize {
        match self {
            TestGroup::Small => 4,
            TestGroup::Large => 64,
        }
    }
}
