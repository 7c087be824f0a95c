//! In-memory wallet extensions.
//!
//! Backs the native build and the test-suite: extensions can be installed
//! with or without their globals injected, reject connections, fail a given
//! operation once, and restore a persisted session as if the page had been
//! reloaded. Every call is journaled.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::{
    sleep, Account, AdapterError, AleoTransaction, EnvironmentProbe, EventType, HistoryEntry,
    InjectedWallet, Record, RecordStatus, WalletAdapter,
};

const DEFAULT_LATENCY: Duration = Duration::from_millis(300);

/// One simulated wallet extension.
#[derive(Clone, Debug)]
pub struct SimulatedExtension {
    pub adapter: String,
    pub globals: Vec<String>,
    pub address: String,
    pub approve: bool,
    /// Whether the injected object answers `requestAccounts`.
    pub direct_accounts: bool,
    pub records: Vec<Record>,
    pub history: Vec<HistoryEntry>,
    pub ciphertexts: HashMap<String, String>,
}

impl SimulatedExtension {
    pub fn new(adapter: &str, address: &str) -> Self {
        Self {
            adapter: adapter.to_string(),
            globals: Vec::new(),
            address: address.to_string(),
            approve: true,
            direct_accounts: false,
            records: Vec::new(),
            history: Vec::new(),
            ciphertexts: HashMap::new(),
        }
    }

    pub fn with_global(mut self, global: &str) -> Self {
        self.globals.push(global.to_string());
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.approve = false;
        self
    }

    pub fn with_direct_accounts(mut self) -> Self {
        self.direct_accounts = true;
        self
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    pub fn with_history(mut self, entry: HistoryEntry) -> Self {
        self.history.push(entry);
        self
    }

    pub fn with_ciphertext(mut self, ciphertext: &str, plaintext: &str) -> Self {
        self.ciphertexts
            .insert(ciphertext.to_string(), plaintext.to_string());
        self
    }
}

/// Journal entry for a call made against the simulator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Select(String),
    Connect(String),
    Disconnect,
    Restore,
    ExecuteTransaction(String),
    SignMessage,
    Decrypt,
    Records(String),
    TransactionHistory(String),
    RequestAccounts(String),
    RequestTransaction(String),
}

/// Operations that can be made to fail once with [`Simulator::fail_next`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    Select,
    Connect,
    Disconnect,
    Restore,
    ExecuteTransaction,
    SignMessage,
    Decrypt,
    Records,
    TransactionHistory,
    RequestAccounts,
    RequestTransaction,
}

#[derive(Debug)]
struct SimState {
    extensions: Vec<SimulatedExtension>,
    injected: BTreeSet<String>,
    selected: Option<String>,
    session: Option<String>,
    /// Approval the extension remembers but the page has not re-attached.
    persisted: Option<String>,
    connecting: bool,
    latency: Duration,
    failures: HashMap<Operation, String>,
    calls: Vec<Call>,
    next_tx: u64,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            injected: BTreeSet::new(),
            selected: None,
            session: None,
            persisted: None,
            connecting: false,
            latency: DEFAULT_LATENCY,
            failures: HashMap::new(),
            calls: Vec::new(),
            next_tx: 1,
        }
    }
}

impl SimState {
    fn extension(&self, adapter: &str) -> Option<&SimulatedExtension> {
        self.extensions.iter().find(|e| e.adapter == adapter)
    }

    fn extension_by_global(&self, global: &str) -> Option<&SimulatedExtension> {
        self.extensions
            .iter()
            .find(|e| e.globals.iter().any(|g| g == global))
    }

    fn session_extension(&self) -> Result<&SimulatedExtension, AdapterError> {
        self.session
            .as_deref()
            .and_then(|name| self.extension(name))
            .ok_or(AdapterError::NotConnected)
    }

    fn take_failure(&mut self, op: Operation) -> Result<(), AdapterError> {
        match self.failures.remove(&op) {
            Some(message) => {
                debug!(?op, %message, "injected failure");
                Err(AdapterError::Wallet(message))
            }
            None => Ok(()),
        }
    }

    fn next_transaction_id(&mut self) -> String {
        let id = format!("at1sim{:06}", self.next_tx);
        self.next_tx += 1;
        id
    }
}

/// Shared handle to the simulated environment. Clones observe the same
/// extensions.
#[derive(Clone, Debug, Default)]
pub struct Simulator {
    state: Rc<RefCell<SimState>>,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four demo extensions, Soter left uninstalled.
    pub fn demo() -> Self {
        let sim = Self::new();
        sim.install(
            SimulatedExtension::new(
                "Puzzle Wallet",
                "aleo1puzz1e0demo0address0000000000000000000000000000000000qv5m7t",
            )
            .with_global("puzzle")
            .with_record(demo_record("credits.aleo", "r-puzzle-1", RecordStatus::Unspent))
            .with_record(demo_record("credits.aleo", "r-puzzle-2", RecordStatus::Spent)),
        );
        sim.install(
            SimulatedExtension::new(
                "Leo Wallet",
                "aleo1le0wa11et0demo0address00000000000000000000000000000000p4lk2d",
            )
            .with_global("leoWallet")
            .with_direct_accounts()
            .with_ciphertext("ciphertext1demo", "{ owner: aleo1le0.private, microcredits: 5000u64.private }")
            .with_record(demo_record("credits.aleo", "r-leo-1", RecordStatus::Spent))
            .with_history(HistoryEntry {
                id: "1".into(),
                event_type: EventType::Execute,
                program_id: "credits.aleo".into(),
                function_id: Some("transfer_public".into()),
                status: "confirmed".into(),
                timestamp: None,
            })
            .with_history(HistoryEntry {
                id: "2".into(),
                event_type: EventType::Deploy,
                program_id: "credits.aleo".into(),
                function_id: None,
                status: "confirmed".into(),
                timestamp: None,
            }),
        );
        sim.install(
            SimulatedExtension::new(
                "Fox Wallet",
                "aleo1f0xwa11et0demo0address000000000000000000000000000000008hd3wq",
            )
            .with_global("foxwallet"),
        );
        sim
    }

    pub fn with_latency(self, latency: Duration) -> Self {
        self.state.borrow_mut().latency = latency;
        self
    }

    /// Install an extension with its globals injected.
    pub fn install(&self, extension: SimulatedExtension) {
        let mut state = self.state.borrow_mut();
        state.injected.extend(extension.globals.iter().cloned());
        state.extensions.push(extension);
    }

    /// Install an extension whose globals are injected later with
    /// [`Simulator::inject`].
    pub fn install_uninjected(&self, extension: SimulatedExtension) {
        self.state.borrow_mut().extensions.push(extension);
    }

    pub fn inject(&self, global: &str) {
        self.state.borrow_mut().injected.insert(global.to_string());
    }

    /// Act as if a session with `adapter` survived a page reload.
    pub fn restore_session(&self, adapter: &str) {
        let mut state = self.state.borrow_mut();
        state.selected = Some(adapter.to_string());
        state.session = Some(adapter.to_string());
    }

    /// Act as if the page was reloaded while `adapter` had an approved
    /// session: nothing is attached until [`WalletAdapter::restore`].
    pub fn persist_session(&self, adapter: &str) {
        let mut state = self.state.borrow_mut();
        state.session = None;
        state.persisted = Some(adapter.to_string());
    }

    /// Drop the session from the extension side.
    pub fn revoke_session(&self) {
        self.state.borrow_mut().session = None;
    }

    /// Make the next `op` fail with `message`.
    pub fn fail_next(&self, op: Operation, message: &str) {
        self.state
            .borrow_mut()
            .failures
            .insert(op, message.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    fn record(&self, call: Call) {
        self.state.borrow_mut().calls.push(call);
    }

    fn latency(&self) -> Duration {
        self.state.borrow().latency
    }
}

fn demo_record(program: &str, id: &str, status: RecordStatus) -> Record {
    Record {
        id: Some(id.to_string()),
        program_id: Some(program.to_string()),
        spent: Some(status == RecordStatus::Spent),
        status: Some(status),
        plaintext: Some(format!("{{ id: {id}, microcredits: 1000000u64.private }}")),
        data: serde_json::json!({ "microcredits": "1000000u64.private" }),
        ..Record::default()
    }
}

fn signature(address: &str, message: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(address.as_bytes());
    hasher.update(message);
    format!("sign1{}", hex::encode(hasher.finalize())).into_bytes()
}

#[async_trait(?Send)]
impl WalletAdapter for Simulator {
    fn select(&self, adapter: &str) -> Result<(), AdapterError> {
        self.record(Call::Select(adapter.to_string()));
        let mut state = self.state.borrow_mut();
        state.take_failure(Operation::Select)?;
        if state.extension(adapter).is_none() {
            return Err(AdapterError::UnknownAdapter(adapter.to_string()));
        }
        state.selected = Some(adapter.to_string());
        Ok(())
    }

    async fn connect(&self, adapter: &str) -> Result<(), AdapterError> {
        self.record(Call::Connect(adapter.to_string()));
        {
            let mut state = self.state.borrow_mut();
            if state.selected.as_deref() != Some(adapter) {
                return Err(AdapterError::NotSelected);
            }
            let extension = state
                .extension(adapter)
                .ok_or_else(|| AdapterError::UnknownAdapter(adapter.to_string()))?;
            if !extension.globals.iter().any(|g| state.injected.contains(g)) {
                return Err(AdapterError::Wallet(format!("{adapter} is not installed")));
            }
            state.connecting = true;
        }

        debug!(adapter, "simulated connect pending");
        sleep(self.latency()).await;

        let mut state = self.state.borrow_mut();
        state.connecting = false;
        state.take_failure(Operation::Connect)?;
        let approve = state.extension(adapter).map(|e| e.approve).unwrap_or(false);
        if !approve {
            return Err(AdapterError::Rejected("User rejected the request".into()));
        }
        state.session = Some(adapter.to_string());
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AdapterError> {
        self.record(Call::Disconnect);
        let mut state = self.state.borrow_mut();
        state.take_failure(Operation::Disconnect)?;
        state.session = None;
        state.persisted = None;
        Ok(())
    }

    async fn restore(&self) -> Result<Option<String>, AdapterError> {
        self.record(Call::Restore);
        let mut state = self.state.borrow_mut();
        state.take_failure(Operation::Restore)?;
        if let Some(adapter) = state.session.clone() {
            return Ok(Some(adapter));
        }
        let Some(adapter) = state.persisted.clone() else {
            return Ok(None);
        };
        let injected = state
            .extension(&adapter)
            .is_some_and(|e| e.globals.iter().any(|g| state.injected.contains(g)));
        if !injected {
            debug!(%adapter, "persisted session but extension not injected yet");
            return Ok(None);
        }
        state.persisted = None;
        state.selected = Some(adapter.clone());
        state.session = Some(adapter.clone());
        Ok(Some(adapter))
    }

    fn account(&self) -> Account {
        let state = self.state.borrow();
        let account = match state.session_extension() {
            Ok(extension) => Account::connected(extension.address.clone()),
            Err(_) => Account::disconnected(),
        };
        account
    }

    fn connecting(&self) -> bool {
        self.state.borrow().connecting
    }

    async fn execute_transaction(&self, transaction: &AleoTransaction) -> Result<String, AdapterError> {
        self.record(Call::ExecuteTransaction(transaction.target()));
        self.state.borrow().session_extension()?;
        sleep(self.latency()).await;
        let mut state = self.state.borrow_mut();
        state.take_failure(Operation::ExecuteTransaction)?;
        Ok(state.next_transaction_id())
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, AdapterError> {
        self.record(Call::SignMessage);
        let mut state = self.state.borrow_mut();
        let address = state.session_extension()?.address.clone();
        state.take_failure(Operation::SignMessage)?;
        Ok(signature(&address, message))
    }

    async fn decrypt(&self, ciphertext: &str) -> Result<String, AdapterError> {
        self.record(Call::Decrypt);
        let mut state = self.state.borrow_mut();
        let plaintext = state.session_extension()?.ciphertexts.get(ciphertext).cloned();
        state.take_failure(Operation::Decrypt)?;
        plaintext.ok_or_else(|| AdapterError::Wallet("Invalid ciphertext".into()))
    }

    async fn records(&self, program: &str) -> Result<Vec<Record>, AdapterError> {
        self.record(Call::Records(program.to_string()));
        let mut state = self.state.borrow_mut();
        let records = state
            .session_extension()?
            .records
            .iter()
            .filter(|r| r.program_id.as_deref() == Some(program))
            .cloned()
            .collect();
        state.take_failure(Operation::Records)?;
        Ok(records)
    }

    async fn transaction_history(&self, program: &str) -> Result<Vec<HistoryEntry>, AdapterError> {
        self.record(Call::TransactionHistory(program.to_string()));
        let mut state = self.state.borrow_mut();
        let history = state
            .session_extension()?
            .history
            .iter()
            .filter(|h| h.program_id == program)
            .cloned()
            .collect();
        state.take_failure(Operation::TransactionHistory)?;
        Ok(history)
    }
}

impl EnvironmentProbe for Simulator {
    fn injected(&self, global: &str) -> Option<Rc<dyn InjectedWallet>> {
        let state = self.state.borrow();
        if !state.injected.contains(global) {
            return None;
        }
        state.extension_by_global(global)?;
        Some(Rc::new(SimulatedInjection {
            state: self.state.clone(),
            global: global.to_string(),
        }))
    }
}

/// An injected object of one simulated extension.
struct SimulatedInjection {
    state: Rc<RefCell<SimState>>,
    global: String,
}

#[async_trait(?Send)]
impl InjectedWallet for SimulatedInjection {
    async fn request_accounts(&self) -> Result<Vec<String>, AdapterError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::RequestAccounts(self.global.clone()));
        state.take_failure(Operation::RequestAccounts)?;
        let extension = state
            .extension_by_global(&self.global)
            .ok_or_else(|| AdapterError::UnknownAdapter(self.global.clone()))?;
        if !extension.direct_accounts {
            return Err(AdapterError::Wallet("requestAccounts is not supported".into()));
        }
        if !extension.approve {
            return Err(AdapterError::Rejected("User rejected the request".into()));
        }
        Ok(vec![extension.address.clone()])
    }

    async fn request_transaction(&self, transaction: &AleoTransaction) -> Result<String, AdapterError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::RequestTransaction(transaction.target()));
        state.take_failure(Operation::RequestTransaction)?;
        let adapter = state
            .extension_by_global(&self.global)
            .map(|e| e.adapter.clone())
            .ok_or_else(|| AdapterError::UnknownAdapter(self.global.clone()))?;
        if state.session.as_deref() != Some(adapter.as_str()) {
            return Err(AdapterError::NotConnected);
        }
        Ok(state.next_transaction_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn leo() -> SimulatedExtension {
        SimulatedExtension::new("Leo Wallet", "aleo1leo").with_global("leoWallet")
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_requires_selection() {
        let sim = Simulator::new();
        sim.install(leo());
        assert_eq!(sim.connect("Leo Wallet").await, Err(AdapterError::NotSelected));
        sim.select("Leo Wallet").unwrap();
        sim.connect("Leo Wallet").await.unwrap();
        assert_eq!(sim.account(), Account::connected("aleo1leo"));
        assert_eq!(
            sim.calls(),
            vec![
                Call::Connect("Leo Wallet".into()),
                Call::Select("Leo Wallet".into()),
                Call::Connect("Leo Wallet".into()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_connecting_flag_spans_latency() {
        let sim = Simulator::new().with_latency(Duration::from_millis(200));
        sim.install(leo());
        sim.select("Leo Wallet").unwrap();
        let probe = async {
            sleep(Duration::from_millis(50)).await;
            sim.connecting()
        };
        let (result, mid) = tokio::join!(sim.connect("Leo Wallet"), probe);
        result.unwrap();
        assert!(mid);
        assert!(!sim.connecting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_uninjected_extension_cannot_connect() {
        let sim = Simulator::new();
        sim.install_uninjected(leo());
        assert!(!sim.is_present("leoWallet"));
        sim.select("Leo Wallet").unwrap();
        assert!(matches!(sim.connect("Leo Wallet").await, Err(AdapterError::Wallet(_))));

        sim.inject("leoWallet");
        assert!(sim.is_present("leoWallet"));
        sim.connect("Leo Wallet").await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_and_one_shot_failures() {
        let sim = Simulator::new();
        sim.install(leo().rejecting());
        sim.select("Leo Wallet").unwrap();
        assert!(matches!(sim.connect("Leo Wallet").await, Err(AdapterError::Rejected(_))));
        assert!(!sim.account().connected);

        let sim = Simulator::new();
        sim.install(leo());
        sim.restore_session("Leo Wallet");
        sim.fail_next(Operation::SignMessage, "boom");
        assert_eq!(
            sim.sign_message(b"hi").await,
            Err(AdapterError::Wallet("boom".into()))
        );
        let sig = sim.sign_message(b"hi").await.unwrap();
        assert!(String::from_utf8(sig).unwrap().starts_with("sign1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_injected_object_direct_calls() {
        let sim = Simulator::new();
        sim.install(leo().with_direct_accounts());
        let injected = sim.injected("leoWallet").unwrap();
        assert_eq!(injected.request_accounts().await.unwrap(), vec!["aleo1leo".to_string()]);

        let tx = AleoTransaction::create("aleo1leo", "testnetbeta", "credits.aleo", "transfer_public", vec![], 1, false);
        assert_eq!(injected.request_transaction(&tx).await, Err(AdapterError::NotConnected));
        sim.restore_session("Leo Wallet");
        assert_eq!(injected.request_transaction(&tx).await.unwrap(), "at1sim000001");
        assert!(sim.injected("puzzle").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_attaches_persisted_session() {
        let sim = Simulator::new();
        sim.install_uninjected(leo());
        assert_eq!(sim.restore().await, Ok(None));

        sim.persist_session("Leo Wallet");
        assert!(!sim.account().connected);
        assert_eq!(sim.restore().await, Ok(None));

        sim.inject("leoWallet");
        assert_eq!(sim.restore().await, Ok(Some("Leo Wallet".to_string())));
        assert_eq!(sim.account(), Account::connected("aleo1leo"));

        sim.disconnect().await.unwrap();
        assert_eq!(sim.restore().await, Ok(None));
    }

    #[tokio::test(start_paused = true)]
    async fn test_queries_filter_by_program() {
        let sim = Simulator::demo();
        sim.restore_session("Leo Wallet");
        assert_eq!(sim.records("credits.aleo").await.unwrap().len(), 1);
        assert!(sim.records("token.aleo").await.unwrap().is_empty());
        assert_eq!(sim.transaction_history("credits.aleo").await.unwrap().len(), 2);
        assert_eq!(
            sim.decrypt("ciphertext1demo").await.unwrap(),
            "{ owner: aleo1le0.private, microcredits: 5000u64.private }"
        );
        assert!(sim.decrypt("garbage").await.is_err());
    }
}
