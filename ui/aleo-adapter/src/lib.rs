//! Adapter surface for the Aleo browser wallets.
//!
//! Everything the front-end consumes from the outside world goes through the
//! three traits defined here:
//!
//! - [`WalletAdapter`]: the uniform session / signing / records interface
//!   that sits in front of one selected wallet extension.
//! - [`EnvironmentProbe`]: answers "is this global injected?" and hands out
//!   the injected object itself for the wallets that get a direct path.
//! - [`InjectedWallet`]: the handful of calls made straight on an injected
//!   object, bypassing the adapter.
//!
//! Two backends implement them: [`sim::Simulator`] (native builds and tests)
//! and `window` (wasm32, talks to `window.<global>`).

use std::rc::Rc;

use async_trait::async_trait;

mod error;
pub mod sim;
mod timer;
mod transaction;
mod types;

#[cfg(target_arch = "wasm32")]
pub mod window;

pub use error::AdapterError;
pub use timer::sleep;
pub use transaction::{AleoTransaction, Transition};
pub use types::{Account, DecryptPermission, EventType, HistoryEntry, Network, Record, RecordStatus};

/// Session, signing and query interface over the currently selected wallet.
///
/// Futures are not `Send`: everything runs on the UI event loop.
#[async_trait(?Send)]
pub trait WalletAdapter {
    /// Select the adapter that subsequent calls are routed to.
    fn select(&self, adapter: &str) -> Result<(), AdapterError>;

    /// Open a session with the selected adapter. `adapter` must match the
    /// selection.
    async fn connect(&self, adapter: &str) -> Result<(), AdapterError>;

    async fn disconnect(&self) -> Result<(), AdapterError>;

    /// Re-attach a session the extension kept across a page reload, without
    /// prompting. Returns the adapter whose session was adopted.
    async fn restore(&self) -> Result<Option<String>, AdapterError>;

    /// Current account as reported by the wallet.
    fn account(&self) -> Account;

    /// True while a `connect` call is outstanding.
    fn connecting(&self) -> bool;

    /// Submit a transaction, returning its identifier.
    async fn execute_transaction(&self, transaction: &AleoTransaction) -> Result<String, AdapterError>;

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, AdapterError>;

    async fn decrypt(&self, ciphertext: &str) -> Result<String, AdapterError>;

    async fn records(&self, program: &str) -> Result<Vec<Record>, AdapterError>;

    async fn transaction_history(&self, program: &str) -> Result<Vec<HistoryEntry>, AdapterError>;
}

/// Probe for globals injected by wallet extensions.
pub trait EnvironmentProbe {
    /// The object injected under `global`, if any.
    fn injected(&self, global: &str) -> Option<Rc<dyn InjectedWallet>>;

    fn is_present(&self, global: &str) -> bool {
        self.injected(global).is_some()
    }
}

/// Calls made directly on an injected wallet object.
#[async_trait(?Send)]
pub trait InjectedWallet {
    async fn request_accounts(&self) -> Result<Vec<String>, AdapterError>;

    async fn request_transaction(&self, transaction: &AleoTransaction) -> Result<String, AdapterError>;
}
