pub mod client;

pub use client::{ApiClient, ClientError, DEFAULT_API_BASE};
