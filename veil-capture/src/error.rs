use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("no headless-capable browser found on PATH")]
    NoBrowser,

    #[error("failed to launch browser: {0}")]
    Spawn(String),

    #[error("screenshot timed out after {0} seconds")]
    Timeout(u64),

    #[error("browser produced no screenshot output")]
    NoOutput,

    #[error("screenshot too large: {0} bytes")]
    TooLarge(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CaptureError>;
