use std::time::Duration;

use dioxus::prelude::*;
use tracing::warn;

use super::layout::truncate_address;
use crate::registry::{WalletDescriptor, PLACEHOLDER_WALLET_NAME};
use crate::state::{ConnectionState, WalletState};
use crate::AppCoordinator;

/// How long "Copied!" stays on the copy item.
const COPIED_FEEDBACK: Duration = Duration::from_secs(2);

/// Top bar button: opens the wallet modal, or the account dropdown once
/// connected.
#[component]
pub fn ConnectButton() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let coordinator = use_context::<AppCoordinator>();

    let (label, class) = match &wallet.read().connection {
        ConnectionState::Disconnected => ("Connect Wallet".to_string(), "conn-btn conn-btn-connect"),
        ConnectionState::Connecting(_) => ("Connecting...".to_string(), "conn-btn conn-btn-connecting"),
        ConnectionState::Connected { address, wallet_name } => (
            format!(
                "{} · {}",
                wallet_name.as_deref().unwrap_or(PLACEHOLDER_WALLET_NAME),
                truncate_address(address)
            ),
            "conn-btn conn-btn-connected",
        ),
    };
    let dropdown_open = wallet.read().modal.dropdown_open;

    rsx! {
        div { class: "kp-dropdown",
            button {
                class: class,
                onclick: move |_| coordinator.open_modal(),
                span { "{label}" }
                if wallet.read().connection.is_connected() {
                    span { class: "kp-chevron", "▾" }
                }
            }
            if dropdown_open {
                AccountMenu {}
            }
        }
    }
}

#[component]
fn AccountMenu() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let coordinator = use_context::<AppCoordinator>();

    let address = wallet.read().connection.address().unwrap_or_default().to_string();
    let name = wallet
        .read()
        .connection
        .wallet_name()
        .unwrap_or(PLACEHOLDER_WALLET_NAME)
        .to_string();

    let mut copied = use_signal(|| false);
    let change = coordinator.clone();
    let disconnect = coordinator.clone();
    let close = coordinator.clone();

    let on_copy = {
        let address = address.clone();
        move |_| {
            let script = clipboard_script(&address);
            spawn(async move {
                if let Err(e) = document::eval(&script).await {
                    warn!("clipboard write failed: {e:?}");
                    return;
                }
                copied.set(true);
                aleo_adapter::sleep(COPIED_FEEDBACK).await;
                copied.set(false);
            });
        }
    };

    rsx! {
        div { class: "kp-menu",
            div { class: "kp-menu-header",
                span { class: "kp-slot-name", "{name}" }
                span { class: "kp-slot-pubkey mono", "{address}" }
            }
            button {
                class: "kp-menu-item",
                onclick: on_copy,
                if copied() { "Copied!" } else { "Copy address" }
            }
            button {
                class: "kp-menu-item",
                onclick: move |_| {
                    let coordinator = change.clone();
                    spawn(async move { coordinator.change_wallet().await });
                },
                "Change wallet"
            }
            button {
                class: "kp-menu-item kp-menu-item-danger",
                onclick: move |_| {
                    let coordinator = disconnect.clone();
                    spawn(async move { coordinator.disconnect().await });
                },
                "Disconnect"
            }
        }
        // Invisible backdrop to close dropdown
        div {
            class: "kp-backdrop",
            onclick: move |_| close.close_dropdown(),
        }
    }
}

/// Wallet picker. Clicks outside the dialog are ignored while a connection
/// attempt is in flight.
#[component]
pub fn WalletModal() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let coordinator = use_context::<AppCoordinator>();

    let open = wallet.read().modal.open;
    let wallets = wallet.read().wallets.clone();
    let connecting_id = wallet.read().connection.connecting_id().map(str::to_string);
    let connected = wallet.read().connection.is_connected();
    let last_error = wallet.read().last_error.clone();

    let backdrop = coordinator.clone();
    let close_button = coordinator.clone();

    rsx! {
        if open {
            div {
                class: "modal-backdrop",
                onclick: move |_| {
                    backdrop.close_modal();
                },
                div {
                    class: "modal",
                    onclick: move |e| e.stop_propagation(),
                    div { class: "modal-header",
                        h2 { "Connect a wallet" }
                        button {
                            class: "modal-close",
                            disabled: connecting_id.is_some(),
                            onclick: move |_| {
                                close_button.close_modal();
                            },
                            "×"
                        }
                    }
                    div { class: "wallet-list",
                        for descriptor in wallets {
                            WalletOption {
                                key: "{descriptor.id}",
                                connecting: connecting_id.as_deref() == Some(descriptor.id.as_str()),
                                busy: connecting_id.is_some(),
                                wallet: descriptor,
                            }
                        }
                    }
                    if connected {
                        p { class: "success-text", "Connected" }
                    } else if let Some(err) = last_error {
                        p { class: "error-text", "{err}" }
                    }
                }
            }
        }
    }
}

#[component]
fn WalletOption(wallet: WalletDescriptor, connecting: bool, busy: bool) -> Element {
    let coordinator = use_context::<AppCoordinator>();
    let id = wallet.id.clone();

    let on_click = move |_| {
        let coordinator = coordinator.clone();
        let id = id.clone();
        spawn(async move { coordinator.connect(&id).await });
    };

    rsx! {
        button {
            class: if wallet.detected { "wallet-option" } else { "wallet-option wallet-option-missing" },
            disabled: busy,
            onclick: on_click,
            span { class: "wallet-icon", "{wallet.icon}" }
            span { class: "wallet-name", "{wallet.name}" }
            if connecting {
                span { class: "spinner" }
            } else if wallet.detected {
                span { class: "badge badge-detected", "Detected" }
            } else {
                span { class: "badge", "Not detected" }
            }
        }
    }
}

/// Script writing `address` to the clipboard. The address is embedded as a
/// JSON string literal.
fn clipboard_script(address: &str) -> String {
    format!(
        "await navigator.clipboard.writeText({});",
        serde_json::Value::from(address)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clipboard_script_quotes_address() {
        assert_eq!(
            clipboard_script("aleo1abc"),
            "await navigator.clipboard.writeText(\"aleo1abc\");"
        );
        assert_eq!(
            clipboard_script("a\"b"),
            "await navigator.clipboard.writeText(\"a\\\"b\");"
        );
    }
}
