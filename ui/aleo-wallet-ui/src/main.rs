#![allow(non_snake_case)]

mod activity_log;
mod components;
mod config;
mod coordinator;
mod error;
mod logger;
mod registry;
mod state;

use std::rc::Rc;

use aleo_adapter::{EnvironmentProbe, WalletAdapter};
use dioxus::prelude::*;
use tracing::{error, info};

use config::Config;
use coordinator::{Coordinator, Transition};
use registry::WalletRegistry;
use state::WalletState;

/// The coordinator as provided through context.
pub type AppCoordinator = Coordinator<Signal<WalletState>>;

const STYLE: &str = include_str!("../assets/style.css");

#[derive(Routable, Clone, PartialEq)]
enum Route {
    #[layout(Layout)]
    #[route("/")]
    Home {},
    #[route("/transaction")]
    Transaction {},
    #[route("/sign")]
    Sign {},
    #[route("/decrypt")]
    Decrypt {},
    #[route("/records")]
    Records {},
    #[route("/plaintexts")]
    Plaintexts {},
    #[route("/history")]
    History {},
}

fn main() {
    logger::init();
    dioxus::launch(App);
}

fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("{e}, using defaults");
            Config::default()
        }
    }
}

/// The in-memory demo wallets.
#[cfg(not(target_arch = "wasm32"))]
fn backends(_config: &Config, _registry: &WalletRegistry) -> (Rc<dyn WalletAdapter>, Rc<dyn EnvironmentProbe>) {
    let sim = aleo_adapter::sim::Simulator::demo();
    (Rc::new(sim.clone()), Rc::new(sim))
}

/// The extensions injected into `window`.
#[cfg(target_arch = "wasm32")]
fn backends(config: &Config, registry: &WalletRegistry) -> (Rc<dyn WalletAdapter>, Rc<dyn EnvironmentProbe>) {
    use aleo_adapter::window::{BrowserAdapter, BrowserEnvironment};

    let adapter = BrowserAdapter::new(
        registry.adapter_globals(),
        config.network,
        config.decrypt_permission,
        config.programs.clone(),
    );
    (Rc::new(adapter), Rc::new(BrowserEnvironment))
}

#[component]
fn App() -> Element {
    let config = use_hook(load_config);

    let state = use_context_provider(|| {
        Signal::new(WalletState::new(&WalletRegistry::aleo(), config.log_capacity))
    });
    let coordinator = use_context_provider(|| {
        let registry = WalletRegistry::aleo();
        let (adapter, probe) = backends(&config, &registry);
        info!(app = %config.app_name, network = config.network.as_str(), "wallet coordinator ready");
        Coordinator::new(state, adapter, probe, registry, config.clone())
    });

    let detector = coordinator.clone();
    use_future(move || {
        let detector = detector.clone();
        async move { detector.run_detection().await }
    });

    let restorer = coordinator.clone();
    use_future(move || {
        let restorer = restorer.clone();
        async move {
            restorer.restore_session().await;
        }
    });

    let watcher = coordinator.clone();
    use_future(move || {
        let watcher = watcher.clone();
        async move {
            loop {
                if watcher.observe() == Some(Transition::JustConnected) {
                    let closer = watcher.clone();
                    spawn(async move { closer.close_after_delay().await });
                }
                aleo_adapter::sleep(watcher.config().timings.observe_interval()).await;
            }
        }
    });

    rsx! {
        document::Style { {STYLE} }
        Router::<Route> {}
    }
}

// ---------------------------------------------------------------------------
// Layout: sidebar + content, wallet modal on top
// ---------------------------------------------------------------------------

#[component]
fn Layout() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let locked = wallet.read().modal.scroll_locked;

    rsx! {
        div { class: if locked { "app-container scroll-locked" } else { "app-container" },
            components::layout::Sidebar {}
            div { class: "main-panel",
                components::layout::TopBar {}
                div { class: "main-content",
                    Outlet::<Route> {}
                }
            }
            components::connect_wallet::WalletModal {}
        }
    }
}

// ---------------------------------------------------------------------------
// Route components
// ---------------------------------------------------------------------------

#[component]
fn Home() -> Element {
    rsx! { components::overview::OverviewPage {} }
}

#[component]
fn Transaction() -> Element {
    rsx! { components::send_transaction::SendTransactionPage {} }
}

#[component]
fn Sign() -> Element {
    rsx! { components::sign_message::SignMessagePage {} }
}

#[component]
fn Decrypt() -> Element {
    rsx! { components::decrypt::DecryptPage {} }
}

#[component]
fn Records() -> Element {
    rsx! { components::records::RecordsPage { plaintexts: false } }
}

#[component]
fn Plaintexts() -> Element {
    rsx! { components::records::RecordsPage { plaintexts: true } }
}

#[component]
fn History() -> Element {
    rsx! { components::history::HistoryPage {} }
}
