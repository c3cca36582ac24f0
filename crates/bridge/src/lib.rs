pub mod breaker;
pub mod config;
pub mod dispatch;
pub mod mcp;
pub mod routes;
pub mod store;
pub mod tools;
