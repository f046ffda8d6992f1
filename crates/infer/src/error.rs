use std::fmt;

#[derive(Debug)]
pub enum InferError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (zero sample cap, confidence out of range).
    ConfigValidation(String),
}

impl fmt::Display for InferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for InferError {}
