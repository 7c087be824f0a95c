//! Capability table: one row per supported wallet.
//!
//! Adding a wallet means adding a row here; the coordinator never branches
//! on wallet identity.

use std::rc::Rc;

use aleo_adapter::{EnvironmentProbe, InjectedWallet};

/// Name shown when a session exists but no known global is present.
pub const PLACEHOLDER_WALLET_NAME: &str = "Connected Wallet";

/// Chain id for transactions from a session no row was matched to.
pub const DEFAULT_CHAIN_ID: &str = "testnet";

/// How an operation reaches the wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessPath {
    /// Through the adapter only.
    Adapter,
    /// Straight on the injected object first, adapter on failure.
    DirectFirst,
}

/// Display data for one wallet, as held in the shared state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalletDescriptor {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub chain_id: String,
    pub detected: bool,
}

#[derive(Clone, Debug)]
pub struct Capability {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    /// Adapter identifier understood by [`aleo_adapter::WalletAdapter::select`].
    pub adapter: &'static str,
    pub chain_id: &'static str,
    /// Globals whose presence means the extension is installed, checked in
    /// order.
    pub globals: &'static [&'static str],
    pub connect: AccessPath,
    pub submit: AccessPath,
}

impl Capability {
    pub fn descriptor(&self) -> WalletDescriptor {
        WalletDescriptor {
            id: self.id.to_string(),
            name: self.name.to_string(),
            icon: self.icon.to_string(),
            chain_id: self.chain_id.to_string(),
            detected: false,
        }
    }

    pub fn is_installed(&self, probe: &dyn EnvironmentProbe) -> bool {
        self.globals.iter().any(|g| probe.is_present(g))
    }

    /// First injected object among this wallet's globals.
    pub fn injected(&self, probe: &dyn EnvironmentProbe) -> Option<Rc<dyn InjectedWallet>> {
        self.globals.iter().find_map(|g| probe.injected(g))
    }
}

#[derive(Clone, Debug)]
pub struct WalletRegistry {
    rows: Vec<Capability>,
}

impl Default for WalletRegistry {
    fn default() -> Self {
        Self::aleo()
    }
}

impl WalletRegistry {
    pub fn new(rows: Vec<Capability>) -> Self {
        Self { rows }
    }

    /// Puzzle, Leo, Fox and Soter. Row order is the identification priority.
    pub fn aleo() -> Self {
        Self::new(vec![
            Capability {
                id: "puzzle",
                name: "Puzzle Wallet",
                icon: "🧩",
                adapter: "Puzzle Wallet",
                chain_id: "testnet",
                globals: &["puzzle", "puzzleWalletClient"],
                connect: AccessPath::Adapter,
                submit: AccessPath::Adapter,
            },
            Capability {
                id: "leo",
                name: "Leo Wallet",
                icon: "🦁",
                adapter: "Leo Wallet",
                chain_id: "testnetbeta",
                globals: &["leoWallet"],
                connect: AccessPath::DirectFirst,
                submit: AccessPath::DirectFirst,
            },
            Capability {
                id: "fox",
                name: "Fox Wallet",
                icon: "🦊",
                adapter: "Fox Wallet",
                chain_id: "testnet",
                globals: &["foxwallet", "foxwallet_aleo"],
                connect: AccessPath::Adapter,
                submit: AccessPath::Adapter,
            },
            Capability {
                id: "soter",
                name: "Soter Wallet",
                icon: "🛡️",
                adapter: "Soter Wallet",
                chain_id: "testnet",
                globals: &["soter", "soterWallet"],
                connect: AccessPath::Adapter,
                submit: AccessPath::Adapter,
            },
        ])
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Capability] {
        &self.rows
    }

    pub fn get(&self, id: &str) -> Option<&Capability> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn descriptors(&self) -> Vec<WalletDescriptor> {
        self.rows.iter().map(Capability::descriptor).collect()
    }

    /// Ids of the wallets whose extension is currently injected.
    pub fn detect(&self, probe: &dyn EnvironmentProbe) -> Vec<&'static str> {
        self.rows
            .iter()
            .filter(|row| row.is_installed(probe))
            .map(|row| row.id)
            .collect()
    }

    /// The highest-priority installed wallet.
    pub fn identify(&self, probe: &dyn EnvironmentProbe) -> Option<&Capability> {
        self.rows.iter().find(|row| row.is_installed(probe))
    }

    /// (adapter, globals) pairs for backends that route by adapter name.
    pub fn adapter_globals(&self) -> Vec<(String, Vec<String>)> {
        self.rows
            .iter()
            .map(|row| {
                (
                    row.adapter.to_string(),
                    row.globals.iter().map(|g| g.to_string()).collect(),
                )
            })
            .collect()
    }
}
