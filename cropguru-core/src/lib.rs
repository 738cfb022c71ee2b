pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod random;
pub mod store;

pub use config::CropguruConfig;
pub use error::{CropguruError, Result};
pub use random::{OsRandom, RandomSource, SequenceRandom};
pub use store::{DocumentStore, MemoryStore, PgStore};
