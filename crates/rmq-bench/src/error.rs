use std::{path::PathBuf, time::Duration};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Engine(#[from] rmq::Error),

    #[error("Run exceeded its deadline of {limit:?}")]
    Timeout { limit: Duration },

    #[error("Worker thread panicked")]
    WorkerPanicked,

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("Malformed dataset {}: {reason}", path.display())]
    Dataset { path: PathBuf, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
