use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Batch size cannot be zero.
    #[error("`pipeline.batch.max_size` cannot be zero")]
    BatchMaxSizeZero,
    /// Worker count cannot be zero.
    #[error("`pipeline.worker_count` cannot be zero")]
    WorkerCountZero,
    /// A required string field was empty.
    #[error("`{0}` cannot be empty")]
    EmptyField(&'static str),
    /// Static credentials must be provided as a pair.
    #[error("`store.access_key_id` and `store.secret_access_key` must be set together")]
    PartialStaticCredentials,
}
