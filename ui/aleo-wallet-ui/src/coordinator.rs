//! Wallet connection coordinator.
//!
//! Mediates between the connect modal / action pages and the wallet
//! adapter. All state goes through a [`Store`]; no method returns an error:
//! failures end up in `last_error`, the action result and the activity log.

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use aleo_adapter::{
    sleep, AleoTransaction, EnvironmentProbe, EventType, HistoryEntry, Record, RecordStatus,
    WalletAdapter,
};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::Error;
use crate::registry::{
    AccessPath, Capability, WalletRegistry, DEFAULT_CHAIN_ID, PLACEHOLDER_WALLET_NAME,
};
use crate::state::{Action, ConnectionEdge, ConnectionState, Store, WalletState};

/// Result shown by the query actions when no wallet is connected.
pub const CONNECT_WALLET_FIRST: &str = "connect wallet first";

/// What [`Coordinator::observe`] noticed on the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// A connect sequence just completed.
    JustConnected,
    /// A session that already existed was adopted (page reload, autoconnect).
    Restored,
    /// The wallet ended the session.
    Dropped,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordQuery {
    pub program: String,
    pub status: Option<RecordStatus>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryQuery {
    pub program: String,
    pub event_type: Option<EventType>,
    pub function_id: Option<String>,
}

/// Form input of a transfer-style transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    pub program: String,
    pub function: String,
    pub receiver: String,
    pub amount: String,
    pub fee: String,
    pub fee_private: bool,
}

#[derive(Clone)]
pub struct Coordinator<S: Store> {
    store: S,
    adapter: Rc<dyn WalletAdapter>,
    probe: Rc<dyn EnvironmentProbe>,
    registry: Rc<WalletRegistry>,
    config: Rc<Config>,
    edge: Rc<Cell<ConnectionEdge>>,
}

impl<S: Store> Coordinator<S> {
    pub fn new(
        store: S,
        adapter: Rc<dyn WalletAdapter>,
        probe: Rc<dyn EnvironmentProbe>,
        registry: WalletRegistry,
        config: Config,
    ) -> Self {
        Self {
            store,
            adapter,
            probe,
            registry: Rc::new(registry),
            config: Rc::new(config),
            edge: Rc::new(Cell::new(ConnectionEdge::default())),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn log(&self, event: String, payload: Option<serde_json::Value>) {
        info!("{event}");
        self.store.mutate(|s| s.log.push(event, payload));
    }

    // ------------------------------------------------------------------
    // Detection
    // ------------------------------------------------------------------

    /// Probe the wallet globals once and mark the installed wallets.
    pub fn detect(&self) -> Vec<&'static str> {
        let found = self.registry.detect(self.probe.as_ref());
        debug!(?found, "wallet detection probe");
        self.store.mutate(|s| {
            for wallet in s.wallets.iter_mut() {
                if found.contains(&wallet.id.as_str()) {
                    wallet.detected = true;
                }
            }
        });
        found
    }

    /// Probe now and once more after the retry delay, for extensions that
    /// inject late.
    pub async fn run_detection(&self) {
        self.detect();
        sleep(self.config.timings.detection_retry()).await;
        self.detect();
    }

    // ------------------------------------------------------------------
    // Modal
    // ------------------------------------------------------------------

    /// Open the wallet modal, or toggle the account dropdown when connected.
    pub fn open_modal(&self) {
        self.store.mutate(|s| {
            if s.connection.is_connected() {
                s.modal.dropdown_open = !s.modal.dropdown_open;
            } else {
                s.modal.open = true;
                s.modal.scroll_locked = true;
            }
        });
    }

    /// Close the modal unless a connection attempt is in flight. Returns
    /// whether the modal was closed.
    pub fn close_modal(&self) -> bool {
        let adapter_connecting = self.adapter.connecting();
        self.store.mutate(|s| {
            let connecting = adapter_connecting || s.connection.connecting_id().is_some();
            if connecting && !s.connection.is_connected() {
                return false;
            }
            s.modal.open = false;
            s.modal.scroll_locked = false;
            true
        })
    }

    /// Close the modal unconditionally and clear any pending connecting
    /// marker. The in-flight connect itself is not aborted.
    pub fn force_close_modal(&self) {
        self.store.mutate(|s| {
            s.modal.open = false;
            s.modal.scroll_locked = false;
            if s.connection.connecting_id().is_some() {
                s.connection = ConnectionState::Disconnected;
            }
        });
    }

    /// Force-close after the confirmation delay.
    pub async fn close_after_delay(&self) {
        sleep(self.config.timings.modal_close()).await;
        self.force_close_modal();
    }

    pub fn close_dropdown(&self) {
        self.store.mutate(|s| s.modal.dropdown_open = false);
    }

    /// End the current session and reopen the wallet list.
    pub async fn change_wallet(&self) {
        self.close_dropdown();
        self.disconnect().await;
        self.store.mutate(|s| {
            if !s.connection.is_connected() {
                s.modal.open = true;
                s.modal.scroll_locked = true;
            }
        });
    }

    // ------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------

    /// Select-then-connect the wallet `wallet_id`.
    pub async fn connect(&self, wallet_id: &str) {
        enum Start {
            Toggled,
            Busy(String),
            Proceed,
        }

        let start = self.store.mutate(|s| {
            if s.connection.is_connected() {
                s.modal.dropdown_open = !s.modal.dropdown_open;
                return Start::Toggled;
            }
            if let Some(other) = s.connection.connecting_id() {
                return Start::Busy(other.to_string());
            }
            s.connection = ConnectionState::Connecting(wallet_id.to_string());
            Start::Proceed
        });
        match start {
            Start::Toggled => return,
            Start::Busy(other) => {
                warn!(requested = wallet_id, in_flight = %other, "connection already in progress");
                self.log(format!("Connection to {other} already in progress"), None);
                return;
            }
            Start::Proceed => {}
        }

        let row = match self.registry.get(wallet_id) {
            Some(row) => row.clone(),
            None => {
                let e = Error::UnknownWallet(wallet_id.to_string());
                error!("{e}");
                self.store.mutate(|s| {
                    s.connection = ConnectionState::Disconnected;
                    s.last_error = Some(e.to_string());
                    s.log.push(e.to_string(), None);
                });
                return;
            }
        };

        self.log(format!("Connecting to {}...", row.name), None);
        match self.try_connect(&row).await {
            Ok(address) => {
                self.store.mutate(|s| {
                    s.connection = ConnectionState::Connected {
                        address: address.clone(),
                        wallet_name: Some(row.name.to_string()),
                    };
                    s.active_wallet = Some(row.id.to_string());
                    s.last_error = None;
                    s.log.push(
                        format!("Connected successfully to {}", row.adapter),
                        Some(json!({ "address": address })),
                    );
                });
                info!(wallet = row.id, "connected");
                self.close_after_delay().await;
            }
            Err(e) => {
                let message = e.to_string();
                error!(wallet = row.id, %message, "connection failed");
                self.store.mutate(|s| {
                    if !s.connection.is_connected() {
                        s.connection = ConnectionState::Disconnected;
                    }
                    s.last_error = Some(message.clone());
                    s.log.push(format!("Error connecting to {}: {message}", row.name), None);
                });
            }
        }
    }

    async fn try_connect(&self, row: &Capability) -> Result<String, Error> {
        if row.connect == AccessPath::DirectFirst {
            if let Some(injected) = row.injected(self.probe.as_ref()) {
                match injected.request_accounts().await {
                    Ok(accounts) if !accounts.is_empty() => {
                        debug!(wallet = row.id, "direct account access granted");
                        self.adapter.select(row.adapter)?;
                        self.adapter.connect(row.adapter).await?;
                        return self.session_address();
                    }
                    Ok(_) => warn!(wallet = row.id, "direct access returned no accounts, using adapter"),
                    Err(e) => warn!(wallet = row.id, error = %e, "direct access failed, using adapter"),
                }
            }
        }

        self.adapter.select(row.adapter)?;
        sleep(self.config.timings.connect_settle()).await;
        self.adapter.connect(row.adapter).await?;
        self.session_address()
    }

    fn session_address(&self) -> Result<String, Error> {
        self.adapter
            .account()
            .address()
            .map(str::to_string)
            .ok_or(Error::MissingAddress)
    }

    /// Adopt a session the extension kept across a page reload. Run once on
    /// mount; the adopted session is then named like any restored one.
    pub async fn restore_session(&self) -> Option<Transition> {
        match self.adapter.restore().await {
            Ok(Some(adapter)) => debug!(%adapter, "persisted session found"),
            Ok(None) => debug!("no persisted session"),
            Err(e) => warn!(error = %e, "could not restore wallet session"),
        }
        self.observe()
    }

    /// Sample the adapter flags. Call on every render / poll tick.
    pub fn observe(&self) -> Option<Transition> {
        let connecting = self.adapter.connecting();
        let account = self.adapter.account();
        let address = account.address().map(str::to_string);

        let mut edge = self.edge.get();
        let just_connected = edge.observe(connecting, address.is_some());
        self.edge.set(edge);

        let (connected, disconnected) = self.store.snapshot(|s| {
            (
                s.connection.is_connected(),
                s.connection == ConnectionState::Disconnected,
            )
        });
        let change = match address {
            None if connected && !connecting => {
                self.store.mutate(|s| {
                    s.connection = ConnectionState::Disconnected;
                    s.active_wallet = None;
                    s.modal.dropdown_open = false;
                    s.log.push("Wallet session ended", None);
                });
                info!("wallet session ended");
                Some(Transition::Dropped)
            }
            Some(address) if disconnected => {
                self.store.mutate(|s| {
                    s.connection = ConnectionState::Connected {
                        address,
                        wallet_name: None,
                    }
                });
                Some(Transition::Restored)
            }
            _ => None,
        };

        self.identify_session();

        if just_connected {
            Some(Transition::JustConnected)
        } else {
            change
        }
    }

    /// Name the wallet behind a session that has no cached name, by probing
    /// the globals in priority order. Returns the assigned name.
    pub fn identify_session(&self) -> Option<String> {
        let unnamed = self.store.snapshot(|s| {
            s.connection.is_connected() && s.connection.wallet_name().is_none()
        });
        if !unnamed {
            return None;
        }

        let (id, name, event) = match self.registry.identify(self.probe.as_ref()) {
            Some(row) => (
                Some(row.id.to_string()),
                row.name.to_string(),
                format!("Detected connected {} after refresh", row.name),
            ),
            None => (
                None,
                PLACEHOLDER_WALLET_NAME.to_string(),
                "Connected to wallet but could not identify type".to_string(),
            ),
        };
        info!("{event}");
        self.store.mutate(|s| {
            if let ConnectionState::Connected { wallet_name, .. } = &mut s.connection {
                *wallet_name = Some(name.clone());
            }
            if id.is_some() {
                s.active_wallet = id;
            }
            s.log.push(event, None);
        });
        Some(name)
    }

    /// End the session. The cached wallet name and dropdown are cleared
    /// whatever the adapter answers.
    pub async fn disconnect(&self) {
        self.log("Disconnecting wallet...".to_string(), None);
        let result = self.adapter.disconnect().await;
        if let Err(e) = &result {
            error!(error = %e, "disconnect failed");
        }
        self.store.mutate(|s| {
            s.modal.dropdown_open = false;
            if let ConnectionState::Connected { wallet_name, .. } = &mut s.connection {
                *wallet_name = None;
            }
            match &result {
                Ok(()) => {
                    s.connection = ConnectionState::Disconnected;
                    s.active_wallet = None;
                    s.log.push("Disconnected successfully", None);
                }
                Err(e) => {
                    s.last_error = Some(e.to_string());
                    s.log.push(format!("Disconnection error: {e}"), None);
                }
            }
        });
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    /// Address of the current session, or record the not-connected failure.
    fn guard(&self, action: Action) -> Option<String> {
        let address = self
            .store
            .snapshot(|s| s.connection.address().map(str::to_string));
        if address.is_none() {
            warn!(action = action.label(), "wallet not connected");
            self.store.mutate(|s| {
                s.last_error = Some(Error::NotConnected.to_string());
                s.slot_mut(action).fail(CONNECT_WALLET_FIRST.to_string());
                s.log.push(format!("{} skipped: wallet not connected", action.label()), None);
            });
        }
        address
    }

    /// Mark `action` pending, await `call` and record its outcome. `apply`
    /// stores the value and returns the result line.
    async fn run<T, Fut, F>(&self, action: Action, request: String, call: Fut, apply: F)
    where
        Fut: Future<Output = Result<T, Error>>,
        F: FnOnce(&mut WalletState, T) -> String,
    {
        info!("{request}");
        self.store.mutate(|s| {
            s.slot_mut(action).begin();
            s.log.push(request, None);
        });

        let outcome = call.await;

        self.store.mutate(|s| {
            match outcome {
                Ok(value) => {
                    let result = apply(s, value);
                    s.slot_mut(action).succeed(result);
                }
                Err(e) => {
                    let message = e.to_string();
                    error!(action = action.label(), %message, "wallet request failed");
                    s.last_error = Some(message.clone());
                    s.slot_mut(action)
                        .fail(format!("{} failed: {message}", action.label()));
                    s.log.push(format!("{} error: {message}", action.label()), None);
                }
            }
            s.slot_mut(action).pending = false;
        });
    }

    pub async fn sign_message(&self, message: &str) {
        if self.guard(Action::Signature).is_none() {
            return;
        }
        let bytes = message.as_bytes().to_vec();
        self.run(
            Action::Signature,
            format!("Signing message: \"{message}\""),
            async { self.adapter.sign_message(&bytes).await.map_err(Error::from) },
            |_, signature: Vec<u8>| format!("Signature: {}", String::from_utf8_lossy(&signature)),
        )
        .await;
    }

    pub async fn decrypt(&self, ciphertext: &str) {
        if self.guard(Action::Decrypt).is_none() {
            return;
        }
        let ciphertext = ciphertext.trim();
        self.run(
            Action::Decrypt,
            "Decrypting ciphertext".to_string(),
            async {
                if ciphertext.is_empty() {
                    return Err(Error::MissingInput("ciphertext"));
                }
                self.adapter.decrypt(ciphertext).await.map_err(Error::from)
            },
            |_, text: String| format!("Decryption successful: {text}"),
        )
        .await;
    }

    pub async fn request_records(&self, query: RecordQuery) {
        self.fetch_records(Action::Records, query).await;
    }

    pub async fn request_record_plaintexts(&self, query: RecordQuery) {
        self.fetch_records(Action::RecordPlaintexts, query).await;
    }

    async fn fetch_records(&self, action: Action, query: RecordQuery) {
        if self.guard(action).is_none() {
            return;
        }
        let noun = match action {
            Action::RecordPlaintexts => "record plaintexts",
            _ => "records",
        };
        let program = query.program.trim().to_string();
        let status = query.status;
        let status_label = status.map_or("all".to_string(), |st| st.to_string());

        self.run(
            action,
            format!("Requesting {noun} for {program} with status {status_label}"),
            async { self.adapter.records(&program).await.map_err(Error::from) },
            |s, records: Vec<Record>| {
                let filtered: Vec<Record> = records
                    .into_iter()
                    .filter(|r| status.map_or(true, |st| r.effective_status() == Some(st)))
                    .collect();
                let count = filtered.len();
                if action == Action::RecordPlaintexts {
                    s.last_record_plaintexts = filtered;
                } else {
                    s.last_records = filtered;
                }
                if count == 0 {
                    s.log.push(format!("No {noun} found for {program}"), None);
                    format!("No {noun} found")
                } else {
                    s.log.push(
                        format!("Found {count} {noun} for {program}"),
                        Some(json!({ "count": count })),
                    );
                    format!("Found {count} {noun}")
                }
            },
        )
        .await;
    }

    pub async fn request_transaction_history(&self, query: HistoryQuery) {
        if self.guard(Action::History).is_none() {
            return;
        }
        let program = query.program.trim().to_string();
        let event_type = query.event_type;
        let function_id = query.function_id.filter(|f| !f.trim().is_empty());
        let event_label = event_type.map_or("all".to_string(), |e| e.to_string());

        self.run(
            Action::History,
            format!("Requesting transaction history for {program} with event type {event_label}"),
            async {
                self.adapter
                    .transaction_history(&program)
                    .await
                    .map_err(Error::from)
            },
            |s, history: Vec<HistoryEntry>| {
                let filtered: Vec<HistoryEntry> = history
                    .into_iter()
                    .filter(|h| event_type.map_or(true, |e| h.event_type == e))
                    .filter(|h| {
                        function_id
                            .as_deref()
                            .map_or(true, |f| h.function_id.as_deref() == Some(f))
                    })
                    .collect();
                let count = filtered.len();
                s.last_history = filtered;
                s.log.push(format!("Found {count} transactions for {program}"), None);
                format!("Found {count} transactions")
            },
        )
        .await;
    }

    pub async fn submit_transaction(&self, request: TransactionRequest) {
        let Some(address) = self.guard(Action::Transaction) else {
            return;
        };
        self.run(
            Action::Transaction,
            format!(
                "Creating transaction for {}.{} with fee {}",
                request.program, request.function, request.fee
            ),
            self.send_transaction(&address, &request),
            |s, id: String| {
                s.log.push(
                    format!("Transaction submitted: {id}"),
                    Some(json!({ "transactionId": id })),
                );
                format!("Transaction ID: {id}")
            },
        )
        .await;
    }

    /// The wallet behind the current session, if identified.
    fn active_row(&self) -> Option<&Capability> {
        let id = self.store.snapshot(|s| s.active_wallet.clone())?;
        self.registry.get(&id)
    }

    /// The transaction object for `request`, on the active wallet's chain.
    fn transaction_for(&self, address: &str, request: &TransactionRequest) -> Result<AleoTransaction, Error> {
        let chain_id = self.active_row().map_or(DEFAULT_CHAIN_ID, |r| r.chain_id);
        build_transaction(address, chain_id, request)
    }

    async fn send_transaction(&self, address: &str, request: &TransactionRequest) -> Result<String, Error> {
        let transaction = self.transaction_for(address, request)?;

        if let Some(row) = self.active_row().filter(|r| r.submit == AccessPath::DirectFirst) {
            if let Some(injected) = row.injected(self.probe.as_ref()) {
                match injected.request_transaction(&transaction).await {
                    Ok(id) => return Ok(id),
                    Err(e) => warn!(wallet = row.id, error = %e, "direct submission failed, using adapter"),
                }
            }
        }
        Ok(self.adapter.execute_transaction(&transaction).await?)
    }
}

fn build_transaction(address: &str, chain_id: &str, request: &TransactionRequest) -> Result<AleoTransaction, Error> {
    let fee: u64 = request
        .fee
        .trim()
        .parse()
        .map_err(|_| Error::InvalidFee(request.fee.clone()))?;
    let amount: u64 = request
        .amount
        .trim()
        .parse()
        .map_err(|_| Error::InvalidAmount(request.amount.clone()))?;
    Ok(AleoTransaction::create(
        address,
        chain_id,
        request.program.trim(),
        request.function.trim(),
        vec![request.receiver.trim().to_string(), format!("{amount}u64")],
        fee,
        request.fee_private,
    ))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use aleo_adapter::sim::{Call, Operation, SimulatedExtension, Simulator};
    use pretty_assertions::assert_eq;
    use tokio::time::Instant;

    use super::*;
    use crate::state::SharedState;

    const PUZZLE: &str = "aleo1puzzle";
    const LEO: &str = "aleo1leo";

    fn simulator() -> Simulator {
        let sim = Simulator::new().with_latency(Duration::from_millis(300));
        sim.install(
            SimulatedExtension::new("Puzzle Wallet", PUZZLE)
                .with_global("puzzle")
                .with_record(record("credits.aleo", RecordStatus::Spent))
                .with_record(record("credits.aleo", RecordStatus::Unspent))
                .with_record(record("token.aleo", RecordStatus::Spent)),
        );
        sim.install(
            SimulatedExtension::new("Leo Wallet", LEO)
                .with_global("leoWallet")
                .with_direct_accounts()
                .with_ciphertext("ciphertext1abc", "hello")
                .with_history(history("1", EventType::Execute, Some("transfer_public")))
                .with_history(history("2", EventType::Deploy, None))
                .with_history(history("3", EventType::Execute, Some("join"))),
        );
        sim.install(
            SimulatedExtension::new("Fox Wallet", "aleo1fox")
                .with_global("foxwallet")
                .rejecting(),
        );
        sim
    }

    fn record(program: &str, status: RecordStatus) -> Record {
        Record {
            program_id: Some(program.to_string()),
            status: Some(status),
            ..Record::default()
        }
    }

    fn history(id: &str, event_type: EventType, function: Option<&str>) -> HistoryEntry {
        HistoryEntry {
            id: id.to_string(),
            event_type,
            program_id: "credits.aleo".to_string(),
            function_id: function.map(str::to_string),
            status: "confirmed".to_string(),
            timestamp: None,
        }
    }

    fn coordinator(sim: &Simulator) -> Coordinator<SharedState> {
        let config = Config::default();
        let registry = WalletRegistry::aleo();
        let store = SharedState::new(WalletState::new(&registry, config.log_capacity));
        Coordinator::new(store, Rc::new(sim.clone()), Rc::new(sim.clone()), registry, config)
    }

    fn state<S: Store>(c: &Coordinator<S>) -> WalletState {
        c.store().snapshot(|s| s.clone())
    }

    fn transfer(fee: &str) -> TransactionRequest {
        TransactionRequest {
            program: "credits.aleo".into(),
            function: "transfer_public".into(),
            receiver: "aleo1receiver".into(),
            amount: "100000".into(),
            fee: fee.into(),
            fee_private: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_wallet_leaves_state_unchanged() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("metamask").await;

        let s = state(&c);
        assert_eq!(s.connection, ConnectionState::Disconnected);
        assert_eq!(s.connection.connecting_id(), None);
        assert_eq!(s.last_error.as_deref(), Some("Unknown wallet: metamask"));
        assert!(sim.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_scenario_closes_modal_after_confirmation() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.open_modal();
        assert!(state(&c).modal.open);
        assert!(state(&c).modal.scroll_locked);

        let start = Instant::now();
        let watcher = async {
            sleep(Duration::from_millis(10)).await;
            let early = state(&c).connection;
            // select + settle (100ms) + connect latency (300ms) = connected at 400ms
            sleep(Duration::from_millis(840)).await;
            (early, state(&c))
        };
        let ((), (early, before_close)) = tokio::join!(c.connect("puzzle"), watcher);

        assert_eq!(early, ConnectionState::Connecting("puzzle".into()));
        assert!(before_close.connection.is_connected());
        assert!(before_close.modal.open);

        let s = state(&c);
        assert_eq!(
            s.connection,
            ConnectionState::Connected {
                address: PUZZLE.into(),
                wallet_name: Some("Puzzle Wallet".into()),
            }
        );
        assert!(!s.modal.open);
        assert!(!s.modal.scroll_locked);
        assert_eq!(s.active_wallet.as_deref(), Some("puzzle"));
        assert_eq!(start.elapsed(), Duration::from_millis(900));
        assert_eq!(
            sim.calls(),
            vec![Call::Select("Puzzle Wallet".into()), Call::Connect("Puzzle Wallet".into())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_connect_is_refused_while_connecting() {
        let sim = simulator();
        let c = coordinator(&sim);
        let second = async {
            sleep(Duration::from_millis(50)).await;
            c.connect("fox").await;
            state(&c).connection
        };
        let ((), during) = tokio::join!(c.connect("puzzle"), second);

        assert_eq!(during, ConnectionState::Connecting("puzzle".into()));
        assert!(!sim.calls().contains(&Call::Select("Fox Wallet".into())));
        assert_eq!(state(&c).connection.address(), Some(PUZZLE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_connect_returns_to_disconnected_without_retry() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.open_modal();
        c.connect("fox").await;

        let s = state(&c);
        assert_eq!(s.connection, ConnectionState::Disconnected);
        assert_eq!(s.last_error.as_deref(), Some("User rejected the request"));
        assert!(s.modal.open);
        assert_eq!(
            s.log.latest().unwrap().event,
            "Error connecting to Fox Wallet: User rejected the request"
        );
        let connects = sim
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Connect(_)))
            .count();
        assert_eq!(connects, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_path_skips_settle_delay() {
        let sim = simulator();
        let c = coordinator(&sim);
        let start = Instant::now();
        c.connect("leo").await;

        assert_eq!(start.elapsed(), Duration::from_millis(800));
        assert_eq!(
            sim.calls(),
            vec![
                Call::RequestAccounts("leoWallet".into()),
                Call::Select("Leo Wallet".into()),
                Call::Connect("Leo Wallet".into()),
            ]
        );
        assert_eq!(state(&c).connection.wallet_name(), Some("Leo Wallet"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_direct_path_falls_back_to_adapter() {
        let sim = simulator();
        sim.fail_next(Operation::RequestAccounts, "locked");
        let c = coordinator(&sim);
        c.connect("leo").await;

        assert_eq!(state(&c).connection.address(), Some(LEO));
        assert_eq!(
            sim.calls(),
            vec![
                Call::RequestAccounts("leoWallet".into()),
                Call::Select("Leo Wallet".into()),
                Call::Connect("Leo Wallet".into()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_just_connected_fires_once() {
        let sim = simulator();
        let c = coordinator(&sim);
        assert_eq!(c.observe(), None);

        let poller = async {
            let mut fired = 0;
            for _ in 0..40 {
                sleep(Duration::from_millis(50)).await;
                if c.observe() == Some(Transition::JustConnected) {
                    fired += 1;
                }
            }
            fired
        };
        let ((), fired) = tokio::join!(c.connect("puzzle"), poller);

        assert_eq!(fired, 1);
        for _ in 0..5 {
            assert_eq!(c.observe(), None);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_refused_while_connecting() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.open_modal();
        let closer = async {
            sleep(Duration::from_millis(200)).await;
            let refused = !c.close_modal();
            let open = state(&c).modal.open;
            c.force_close_modal();
            (refused, open, state(&c).connection)
        };
        let ((), (refused, open, after_force)) = tokio::join!(c.connect("puzzle"), closer);

        assert!(refused);
        assert!(open);
        assert_eq!(after_force, ConnectionState::Disconnected);
        // closing hides the UI, the connect still completes
        assert!(state(&c).connection.is_connected());
        assert!(!state(&c).modal.open);
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_and_connect_toggle_dropdown_when_connected() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("puzzle").await;
        sim.clear_calls();

        c.open_modal();
        assert!(state(&c).modal.dropdown_open);
        assert!(!state(&c).modal.open);
        c.connect("fox").await;
        assert!(!state(&c).modal.dropdown_open);
        assert!(sim.calls().is_empty());
        assert_eq!(state(&c).connection.address(), Some(PUZZLE));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restored_session_is_identified() {
        let sim = simulator();
        sim.restore_session("Leo Wallet");
        let c = coordinator(&sim);

        // puzzle is also injected and ranks first
        assert_eq!(c.observe(), Some(Transition::Restored));
        let s = state(&c);
        assert_eq!(s.connection.address(), Some(LEO));
        assert_eq!(s.connection.wallet_name(), Some("Puzzle Wallet"));
        assert_eq!(c.observe(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unidentified_session_gets_placeholder() {
        let sim = mystery_session();
        let c = coordinator(&sim);

        c.observe();
        assert_eq!(state(&c).connection.wallet_name(), Some(PLACEHOLDER_WALLET_NAME));
        assert_eq!(state(&c).active_wallet, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wallet_side_disconnect_is_noticed() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("puzzle").await;
        sim.revoke_session();
        assert_eq!(c.observe(), Some(Transition::Dropped));
        assert_eq!(state(&c).connection, ConnectionState::Disconnected);
    }

    /// A simulator with only an unknown extension holding a session.
    fn mystery_session() -> Simulator {
        let sim = Simulator::new();
        sim.install(SimulatedExtension::new("Mystery Wallet", "aleo1mystery").with_global("mystery"));
        sim.restore_session("Mystery Wallet");
        sim
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_always_clears_wallet_name() {
        for wallet in ["puzzle", "leo", "placeholder"] {
            let sim = if wallet == "placeholder" { mystery_session() } else { simulator() };
            let c = coordinator(&sim);
            if wallet == "placeholder" {
                c.observe();
            } else {
                c.connect(wallet).await;
            }
            assert!(state(&c).connection.wallet_name().is_some(), "{wallet}");
            c.open_modal();
            assert!(state(&c).modal.dropdown_open, "{wallet}");

            sim.fail_next(Operation::Disconnect, "wallet locked");
            c.disconnect().await;
            let s = state(&c);
            assert_eq!(s.connection.wallet_name(), None, "{wallet}");
            assert!(!s.modal.dropdown_open, "{wallet}");
            assert_eq!(s.last_error.as_deref(), Some("wallet locked"), "{wallet}");

            c.disconnect().await;
            let s = state(&c);
            assert_eq!(s.connection, ConnectionState::Disconnected, "{wallet}");
            assert_eq!(s.active_wallet, None, "{wallet}");
            assert_eq!(s.log.latest().unwrap().event, "Disconnected successfully", "{wallet}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_restores_and_names_session() {
        let sim = Simulator::new();
        sim.install(SimulatedExtension::new("Leo Wallet", LEO).with_global("leoWallet"));
        sim.persist_session("Leo Wallet");
        let c = coordinator(&sim);
        assert_eq!(c.observe(), None);

        assert_eq!(c.restore_session().await, Some(Transition::Restored));
        let s = state(&c);
        assert_eq!(
            s.connection,
            ConnectionState::Connected {
                address: LEO.into(),
                wallet_name: Some("Leo Wallet".into()),
            }
        );
        assert_eq!(s.active_wallet.as_deref(), Some("leo"));
        assert_eq!(s.log.latest().unwrap().event, "Detected connected Leo Wallet after refresh");
        assert_eq!(c.observe(), None);

        sim.revoke_session();
        assert_eq!(c.observe(), Some(Transition::Dropped));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_without_persisted_session_changes_nothing() {
        let sim = simulator();
        let c = coordinator(&sim);
        assert_eq!(c.restore_session().await, None);
        assert_eq!(state(&c).connection, ConnectionState::Disconnected);

        sim.persist_session("Leo Wallet");
        sim.fail_next(Operation::Restore, "extension busy");
        assert_eq!(c.restore_session().await, None);
        assert_eq!(state(&c).connection, ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unidentified_session_submits_on_testnet() {
        let sim = mystery_session();
        let c = coordinator(&sim);
        c.observe();
        assert_eq!(state(&c).connection.wallet_name(), Some(PLACEHOLDER_WALLET_NAME));
        let tx = c.transaction_for("aleo1mystery", &transfer("1")).unwrap();
        assert_eq!(tx.chain_id, "testnet");

        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("leo").await;
        let tx = c.transaction_for(LEO, &transfer("1")).unwrap();
        assert_eq!(tx.chain_id, "testnetbeta");
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_wallet_disconnects_then_opens_modal() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("puzzle").await;
        c.change_wallet().await;

        let s = state(&c);
        assert_eq!(s.connection, ConnectionState::Disconnected);
        assert!(s.modal.open);
        c.connect("leo").await;
        assert_eq!(state(&c).connection.address(), Some(LEO));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_injection_seen_by_second_probe() {
        let sim = simulator();
        sim.install_uninjected(SimulatedExtension::new("Soter Wallet", "aleo1soter").with_global("soter"));
        let c = coordinator(&sim);

        let injector = async {
            sleep(Duration::from_millis(200)).await;
            let before = state(&c).wallet("soter").unwrap().detected;
            sim.inject("soter");
            before
        };
        let ((), detected_before) = tokio::join!(c.run_detection(), injector);

        assert!(!detected_before);
        let s = state(&c);
        assert!(s.wallet("soter").unwrap().detected);
        assert!(s.wallet("puzzle").unwrap().detected);
        assert!(s.wallet("leo").unwrap().detected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_while_disconnected() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.request_records(RecordQuery {
            program: "credits.aleo".into(),
            status: Some(RecordStatus::Spent),
        })
        .await;

        let s = state(&c);
        assert_eq!(s.records.result.as_deref(), Some(CONNECT_WALLET_FIRST));
        assert!(!s.records.pending);
        assert_eq!(s.last_error.as_deref(), Some("Wallet not connected"));
        assert!(sim.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_records_filtered_by_status() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("puzzle").await;

        c.request_records(RecordQuery {
            program: "credits.aleo".into(),
            status: Some(RecordStatus::Spent),
        })
        .await;
        let s = state(&c);
        assert_eq!(s.records.result.as_deref(), Some("Found 1 records"));
        assert_eq!(s.last_records.len(), 1);

        c.request_record_plaintexts(RecordQuery {
            program: "credits.aleo".into(),
            status: None,
        })
        .await;
        let s = state(&c);
        assert_eq!(s.record_plaintexts.result.as_deref(), Some("Found 2 record plaintexts"));
        assert_eq!(s.last_records.len(), 1);

        c.request_records(RecordQuery {
            program: "nothing.aleo".into(),
            status: None,
        })
        .await;
        assert_eq!(state(&c).records.result.as_deref(), Some("No records found"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transaction_failure_is_captured() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("puzzle").await;
        sim.fail_next(Operation::ExecuteTransaction, "insufficient fee");

        c.submit_transaction(transfer("100000")).await;

        let s = state(&c);
        let result = s.transaction.result.clone().unwrap();
        assert!(result.contains("insufficient fee"));
        assert_eq!(result, "Transaction failed: insufficient fee");
        assert!(s.transaction.failed);
        assert!(!s.transaction.pending);
        assert_eq!(s.last_error.as_deref(), Some("insufficient fee"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_flag_spans_the_call() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("puzzle").await;

        let watcher = async {
            sleep(Duration::from_millis(100)).await;
            state(&c).transaction.pending
        };
        let ((), pending) = tokio::join!(c.submit_transaction(transfer("5000")), watcher);
        assert!(pending);
        let s = state(&c);
        assert!(!s.transaction.pending);
        assert_eq!(s.transaction.result.as_deref(), Some("Transaction ID: at1sim000001"));
        assert!(!s.transaction.failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_fee_never_reaches_wallet() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("puzzle").await;
        sim.clear_calls();

        c.submit_transaction(transfer("lots")).await;
        let s = state(&c);
        assert_eq!(s.transaction.result.as_deref(), Some("Transaction failed: Invalid fee: lots"));
        assert!(sim.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_leo_submits_directly_then_falls_back() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("leo").await;
        sim.clear_calls();

        c.submit_transaction(transfer("100000")).await;
        assert_eq!(
            sim.calls(),
            vec![Call::RequestTransaction("credits.aleo.transfer_public".into())]
        );

        sim.clear_calls();
        sim.fail_next(Operation::RequestTransaction, "popup closed");
        c.submit_transaction(transfer("100000")).await;
        assert_eq!(
            sim.calls(),
            vec![
                Call::RequestTransaction("credits.aleo.transfer_public".into()),
                Call::ExecuteTransaction("credits.aleo.transfer_public".into()),
            ]
        );
        assert_eq!(state(&c).transaction.result.as_deref(), Some("Transaction ID: at1sim000002"));
    }

    #[test]
    fn test_transaction_object_uses_wallet_chain() {
        let tx = build_transaction("aleo1me", "testnetbeta", &transfer("42")).unwrap();
        assert_eq!(tx.chain_id, "testnetbeta");
        assert_eq!(tx.fee, 42);
        assert_eq!(tx.transitions[0].inputs, vec!["aleo1receiver".to_string(), "100000u64".to_string()]);
        assert!(matches!(
            build_transaction("aleo1me", "testnet", &TransactionRequest { amount: "-1".into(), ..transfer("1") }),
            Err(Error::InvalidAmount(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sign_and_decrypt() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("leo").await;

        c.sign_message("Hello Aleo!").await;
        assert!(state(&c).signature.result.unwrap().starts_with("Signature: sign1"));

        c.decrypt("ciphertext1abc").await;
        assert_eq!(state(&c).decrypt.result.as_deref(), Some("Decryption successful: hello"));

        c.decrypt("   ").await;
        assert_eq!(
            state(&c).decrypt.result.as_deref(),
            Some("Decryption failed: Missing ciphertext")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_history_filters() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("leo").await;

        let query = |event_type, function_id: Option<&str>| HistoryQuery {
            program: "credits.aleo".into(),
            event_type,
            function_id: function_id.map(str::to_string),
        };
        c.request_transaction_history(query(Some(EventType::Execute), None)).await;
        assert_eq!(state(&c).history.result.as_deref(), Some("Found 2 transactions"));

        c.request_transaction_history(query(Some(EventType::Execute), Some("join"))).await;
        assert_eq!(state(&c).last_history.len(), 1);
        assert_eq!(state(&c).last_history[0].id, "3");

        c.request_transaction_history(query(None, Some(""))).await;
        assert_eq!(state(&c).history.result.as_deref(), Some("Found 3 transactions"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_log_is_capped_and_newest_first() {
        let sim = simulator();
        let c = coordinator(&sim);
        c.connect("puzzle").await;
        for i in 0..8 {
            c.sign_message(&format!("message {i}")).await;
        }
        let s = state(&c);
        assert_eq!(s.log.len(), 10);
        assert_eq!(s.log.latest().unwrap().event, "Signing message: \"message 7\"");
    }
}
