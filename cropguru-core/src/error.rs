use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropguruError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CropguruError>;
