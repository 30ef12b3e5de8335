pub mod app;
pub mod error;
pub mod http_routes;
pub mod query_builder;
pub mod response;
pub mod state;
