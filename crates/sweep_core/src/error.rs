use thiserror::Error;

/// Errors raised while planning or running a sweep.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("override '{argument}' is missing '=' between key and values")]
    MissingSeparator { argument: String },

    #[error("override '{argument}' has an empty key")]
    EmptyKey { argument: String },

    #[error("override '{argument}' has an empty value list")]
    EmptyValueList { argument: String },

    #[error(
        "cartesian product of overrides exceeds {} points",
        crate::overrides::MAX_TOTAL_POINTS
    )]
    ProductTooLarge,

    #[error("max_batch_size must be a positive integer or null, got {0}")]
    InvalidBatchSize(i64),

    #[error("sweep() called before setup()")]
    NotSetUp,

    #[error("sweep strategy used before initialize_arguments()")]
    NotInitialized,

    #[error("no remaining batches: the sweep strategy is already done")]
    NoRemainingBatches,

    #[error("plugin registry has not been installed")]
    PluginsNotInitialized,

    #[error("no {kind} plugin registered under '{name}'")]
    UnknownPlugin { kind: &'static str, name: String },

    #[error("invalid params for {kind} plugin '{name}': {message}")]
    InvalidPluginParams {
        kind: &'static str,
        name: String,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("job #{job_index} failed: {message}")]
    JobFailed { job_index: usize, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
