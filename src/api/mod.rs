//! HTTP API for the hypergraph analytics service

pub mod handlers;
pub mod query;
pub mod routes;

pub use query::*;
pub use routes::create_router;
