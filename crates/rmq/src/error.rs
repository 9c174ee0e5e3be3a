#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid range [{left}, {right}] for {len} elements")]
    Range {
        left: usize,
        right: usize,
        len: usize,
    },

    #[error("Index {index} out of bounds for {len} elements")]
    Index { index: usize, len: usize },

    #[error("{engine} does not support updates")]
    Unsupported { engine: &'static str },

    #[error("Can not build from an empty input")]
    EmptyInput,
}

pub type Result<T> = std::result::Result<T, Error>;
