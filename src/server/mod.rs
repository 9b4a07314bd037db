//! Server module: route table and the builder that serves it

pub mod builder;
pub mod router;

pub use builder::PluginBuilder;
pub use router::build_routes;
