#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Thread parse failed: {0}")]
    Parse(#[from] threadview_core::ParseError),
}
