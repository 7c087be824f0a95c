use dioxus::prelude::*;

use super::{ActionResult, ConnectHint};
use crate::state::WalletState;
use crate::AppCoordinator;

#[component]
pub fn SignMessagePage() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let coordinator = use_context::<AppCoordinator>();
    let default_message = coordinator.config().defaults.message.clone();

    let mut message = use_signal(|| default_message);

    let connected = wallet.read().connection.is_connected();
    let slot = wallet.read().signature.clone();
    let pending = slot.pending;

    let on_sign = move |_| {
        let coordinator = coordinator.clone();
        let message = message.read().clone();
        spawn(async move { coordinator.sign_message(&message).await });
    };

    rsx! {
        div { class: "page",
            h1 { "Sign Message" }
            p { class: "subtitle", "Ask the wallet to sign an arbitrary message." }
            ConnectHint { connected }

            div { class: "form-group",
                label { "Message" }
                textarea {
                    class: "input input-wide",
                    rows: "3",
                    value: "{message}",
                    oninput: move |e| message.set(e.value()),
                }
            }

            button {
                class: "btn btn-primary",
                disabled: pending || message.read().is_empty(),
                onclick: on_sign,
                if pending { "Signing..." } else { "Sign Message" }
            }

            ActionResult { slot: slot.clone() }
        }
    }
}
