use dioxus::prelude::*;

use super::connect_wallet::ConnectButton;
use crate::state::{ConnectionState, WalletState};
use crate::{AppCoordinator, Route};

#[component]
pub fn Sidebar() -> Element {
    let coordinator = use_context::<AppCoordinator>();
    let app_name = coordinator.config().app_name.clone();
    let network = coordinator.config().network.as_str();

    rsx! {
        nav { class: "sidebar",
            div { class: "sidebar-brand",
                span { class: "brand-icon", "◈" }
                span { class: "brand-text", "{app_name}" }
            }
            div { class: "sidebar-nav",
                NavSection { label: "Wallet" }
                NavLink { to: Route::Home {}, label: "Overview", icon: "⌂" }
                NavSection { label: "Actions" }
                NavLink { to: Route::Transaction {}, label: "Send Transaction", icon: "→" }
                NavLink { to: Route::Sign {}, label: "Sign Message", icon: "✎" }
                NavLink { to: Route::Decrypt {}, label: "Decrypt", icon: "⚿" }
                NavSection { label: "Queries" }
                NavLink { to: Route::Records {}, label: "Records", icon: "▤" }
                NavLink { to: Route::Plaintexts {}, label: "Record Plaintexts", icon: "▥" }
                NavLink { to: Route::History {}, label: "Transaction History", icon: "↺" }
            }
            div { class: "sidebar-footer",
                span { class: "sidebar-footer-text", "{network}" }
            }
        }
    }
}

#[component]
pub fn TopBar() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let status = wallet.read().status_line();
    let dot_class = match wallet.read().connection {
        ConnectionState::Disconnected => "dot disconnected",
        ConnectionState::Connecting(_) => "dot connecting",
        ConnectionState::Connected { .. } => "dot connected",
    };

    rsx! {
        header { class: "topbar",
            div { class: "topbar-left",
                div { class: "conn-indicator",
                    span { class: dot_class }
                    span { class: "conn-label", "{status}" }
                }
            }
            div { class: "topbar-right",
                ConnectButton {}
            }
        }
    }
}

#[component]
fn NavSection(label: &'static str) -> Element {
    rsx! {
        div { class: "nav-section-label", "{label}" }
    }
}

#[component]
fn NavLink(to: Route, label: &'static str, icon: &'static str) -> Element {
    rsx! {
        Link { class: "nav-link", to: to,
            span { class: "nav-icon", "{icon}" }
            span { "{label}" }
        }
    }
}

/// `aleo1abcd...wxyz` form of an address.
pub fn truncate_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() > 14 {
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        address.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_address() {
        assert_eq!(
            truncate_address("aleo1le0wa11et0demo0address00000000000000000000000000000000p4lk2d"),
            "aleo1le0...lk2d"
        );
        assert_eq!(truncate_address("aleo1short"), "aleo1short");
        assert_eq!(truncate_address(""), "");
    }
}
