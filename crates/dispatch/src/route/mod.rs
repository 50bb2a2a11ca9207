//! Routing: compiled patterns, verb bindings, the route table and its resolver.

pub mod binding;
pub mod compiler;
pub mod pattern;
pub mod resolver;
pub mod table;
pub mod verb;

pub use binding::{ActionRef, RewriteRef, Rewriter, Target, VerbBinding};
pub use compiler::compile;
pub use pattern::{FormatSplitter, RouteMatch, RoutePattern, Segment};
pub use resolver::Resolution;
pub use table::{RouteEntry, RouteTable};
pub use verb::SUPPORTED_METHODS;
