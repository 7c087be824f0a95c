//! Shared state for the wallet UI.
//!
//! One `WalletState` value backs every widget. In the app it lives in a
//! Dioxus `Signal` provided through context; tests hold it in a
//! [`SharedState`]. The coordinator only sees the [`Store`] trait.

use std::cell::RefCell;
use std::rc::Rc;

use aleo_adapter::{HistoryEntry, Record};
use dioxus::prelude::*;

use crate::activity_log::ActivityLog;
use crate::registry::{WalletDescriptor, WalletRegistry};

/// Wallet session as tracked by the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    /// A connect sequence for this wallet id is in flight.
    Connecting(String),
    /// `address` is never empty.
    Connected {
        address: String,
        wallet_name: Option<String>,
    },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected { .. })
    }

    pub fn connecting_id(&self) -> Option<&str> {
        match self {
            Self::Connecting(id) => Some(id),
            _ => None,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Connected { address, .. } => Some(address),
            _ => None,
        }
    }

    pub fn wallet_name(&self) -> Option<&str> {
        match self {
            Self::Connected { wallet_name, .. } => wallet_name.as_deref(),
            _ => None,
        }
    }
}

/// Modal / dropdown visibility. Display-only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModalState {
    pub open: bool,
    pub dropdown_open: bool,
    pub scroll_locked: bool,
}

/// The user actions dispatched to the wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Transaction,
    Signature,
    Decrypt,
    Records,
    RecordPlaintexts,
    History,
}

impl Action {
    /// Subject of the failure message, as in "<label> failed: ...".
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transaction => "Transaction",
            Self::Signature => "Signature",
            Self::Decrypt => "Decryption",
            Self::Records => "Records request",
            Self::RecordPlaintexts => "Record plaintexts request",
            Self::History => "Transaction history request",
        }
    }
}

/// Pending flag and outcome of one action.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionSlot {
    pub pending: bool,
    pub result: Option<String>,
    pub failed: bool,
}

impl ActionSlot {
    pub fn begin(&mut self) {
        self.pending = true;
        self.result = None;
        self.failed = false;
    }

    pub fn succeed(&mut self, result: String) {
        self.result = Some(result);
        self.failed = false;
    }

    pub fn fail(&mut self, result: String) {
        self.result = Some(result);
        self.failed = true;
    }
}

/// Detects the "was connecting, now connected" edge of the adapter flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConnectionEdge {
    was_connecting: bool,
    was_connected: bool,
}

impl ConnectionEdge {
    /// Feed the current flags; true exactly when a connection just completed.
    pub fn observe(&mut self, connecting: bool, connected: bool) -> bool {
        let fired = self.was_connecting && !connecting && !self.was_connected && connected;
        self.was_connecting = connecting;
        self.was_connected = connected;
        fired
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WalletState {
    pub connection: ConnectionState,
    pub wallets: Vec<WalletDescriptor>,
    /// Id of the wallet behind the current session, when known.
    pub active_wallet: Option<String>,
    pub modal: ModalState,
    pub last_error: Option<String>,
    pub log: ActivityLog,

    pub transaction: ActionSlot,
    pub signature: ActionSlot,
    pub decrypt: ActionSlot,
    pub records: ActionSlot,
    pub record_plaintexts: ActionSlot,
    pub history: ActionSlot,

    pub last_records: Vec<Record>,
    pub last_record_plaintexts: Vec<Record>,
    pub last_history: Vec<HistoryEntry>,
}

impl Default for WalletState {
    fn default() -> Self {
        Self::new(&WalletRegistry::aleo(), crate::activity_log::DEFAULT_CAPACITY)
    }
}

impl WalletState {
    pub fn new(registry: &WalletRegistry, log_capacity: usize) -> Self {
        Self {
            connection: ConnectionState::Disconnected,
            wallets: registry.descriptors(),
            active_wallet: None,
            modal: ModalState::default(),
            last_error: None,
            log: ActivityLog::with_capacity(log_capacity),
            transaction: ActionSlot::default(),
            signature: ActionSlot::default(),
            decrypt: ActionSlot::default(),
            records: ActionSlot::default(),
            record_plaintexts: ActionSlot::default(),
            history: ActionSlot::default(),
            last_records: Vec::new(),
            last_record_plaintexts: Vec::new(),
            last_history: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn slot(&self, action: Action) -> &ActionSlot {
        match action {
            Action::Transaction => &self.transaction,
            Action::Signature => &self.signature,
            Action::Decrypt => &self.decrypt,
            Action::Records => &self.records,
            Action::RecordPlaintexts => &self.record_plaintexts,
            Action::History => &self.history,
        }
    }

    pub fn slot_mut(&mut self, action: Action) -> &mut ActionSlot {
        match action {
            Action::Transaction => &mut self.transaction,
            Action::Signature => &mut self.signature,
            Action::Decrypt => &mut self.decrypt,
            Action::Records => &mut self.records,
            Action::RecordPlaintexts => &mut self.record_plaintexts,
            Action::History => &mut self.history,
        }
    }

    pub fn wallet(&self, id: &str) -> Option<&WalletDescriptor> {
        self.wallets.iter().find(|w| w.id == id)
    }

    /// One-line connection summary for the status panel.
    pub fn status_line(&self) -> String {
        match (&self.connection, &self.last_error) {
            (ConnectionState::Connected { .. }, _) => "Connected".to_string(),
            (ConnectionState::Connecting(_), _) => "Connecting...".to_string(),
            (ConnectionState::Disconnected, Some(e)) => format!("Disconnected (last error: {e})"),
            (ConnectionState::Disconnected, None) => "Disconnected".to_string(),
        }
    }
}

/// Access to the shared `WalletState`.
pub trait Store: Clone + 'static {
    fn mutate<R>(&self, f: impl FnOnce(&mut WalletState) -> R) -> R;

    fn snapshot<R>(&self, f: impl FnOnce(&WalletState) -> R) -> R;
}

impl Store for Signal<WalletState> {
    fn mutate<R>(&self, f: impl FnOnce(&mut WalletState) -> R) -> R {
        let mut signal = *self;
        let mut state = signal.write();
        f(&mut *state)
    }

    fn snapshot<R>(&self, f: impl FnOnce(&WalletState) -> R) -> R {
        f(&*self.peek())
    }
}

/// Plain shared cell, for running the coordinator outside Dioxus.
#[derive(Clone, Debug, Default)]
pub struct SharedState(Rc<RefCell<WalletState>>);

impl SharedState {
    pub fn new(state: WalletState) -> Self {
        Self(Rc::new(RefCell::new(state)))
    }
}

impl Store for SharedState {
    fn mutate<R>(&self, f: impl FnOnce(&mut WalletState) -> R) -> R {
        f(&mut *self.0.borrow_mut())
    }

    fn snapshot<R>(&self, f: impl FnOnce(&WalletState) -> R) -> R {
        f(&*self.0.borrow())
    }
}
