use thiserror::Error;

/// The crate's error taxonomy, matching the three fatal categories the core
/// can report: bad configuration, a build-time structural problem, and I/O
/// failure on image write. Runtime numerical edge cases (degenerate scatter
/// directions, zero-denominator plane hits) are handled locally and never
/// surface as a `PhotonError`.
#[derive(Debug, Error)]
pub enum PhotonError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("build error: {0}")]
    Build(String),

    #[error("failed to write image: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PhotonError>;
