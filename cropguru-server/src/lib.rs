pub mod body;
pub mod error;
pub mod http;
pub mod routes;
