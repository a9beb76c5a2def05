use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadError {
    Fetch { source: String, message: String },
    Parse(String),
    Empty,
    MissingBlob(String),
    Unsupported(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Fetch { source, message } => write!(f, "fetch of {source} failed: {message}"),
            LoadError::Parse(message) => write!(f, "glTF load failed: {message}"),
            LoadError::Empty => write!(f, "glTF has no triangle geometry"),
            LoadError::MissingBlob(key) => write!(f, "no asset stored under {key}"),
            LoadError::Unsupported(message) => write!(f, "unsupported source: {message}"),
        }
    }
}

impl std::error::Error for LoadError {}
