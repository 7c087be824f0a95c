use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("No wallet selected")]
    NotSelected,
    #[error("Unknown wallet adapter: {0}")]
    UnknownAdapter(String),
    #[error("Wallet not connected")]
    NotConnected,
    #[error("{0}")]
    Rejected(String),
    /// Message reported by the wallet extension itself.
    #[error("{0}")]
    Wallet(String),
    #[error("Malformed wallet response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for AdapterError {
    fn from(e: serde_json::Error) -> Self {
        AdapterError::Malformed(e.to_string())
    }
}
