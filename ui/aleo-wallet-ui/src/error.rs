use aleo_adapter::AdapterError;
use thiserror::Error;

/// Failures of coordinator operations. They never leave the coordinator:
/// the message ends up in the shared state and the activity log.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unknown wallet: {0}")]
    UnknownWallet(String),
    #[error("Wallet not connected")]
    NotConnected,
    #[error("Wallet returned no address")]
    MissingAddress,
    #[error("Invalid fee: {0}")]
    InvalidFee(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Missing {0}")]
    MissingInput(&'static str),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}
