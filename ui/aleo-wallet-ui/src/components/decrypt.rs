use dioxus::prelude::*;

use super::{ActionResult, ConnectHint};
use crate::state::WalletState;
use crate::AppCoordinator;

#[component]
pub fn DecryptPage() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let coordinator = use_context::<AppCoordinator>();

    let mut ciphertext = use_signal(String::new);

    let connected = wallet.read().connection.is_connected();
    let slot = wallet.read().decrypt.clone();
    let pending = slot.pending;

    let on_decrypt = move |_| {
        let coordinator = coordinator.clone();
        let ciphertext = ciphertext.read().clone();
        spawn(async move { coordinator.decrypt(&ciphertext).await });
    };

    rsx! {
        div { class: "page",
            h1 { "Decrypt" }
            p { class: "subtitle", "Decrypt a record ciphertext owned by the connected account." }
            ConnectHint { connected }

            div { class: "form-group",
                label { "Ciphertext" }
                textarea {
                    class: "input input-wide mono",
                    rows: "4",
                    placeholder: "ciphertext1...",
                    value: "{ciphertext}",
                    oninput: move |e| ciphertext.set(e.value()),
                }
            }

            button {
                class: "btn btn-primary",
                disabled: pending,
                onclick: on_decrypt,
                if pending { "Decrypting..." } else { "Decrypt" }
            }

            ActionResult { slot: slot.clone() }
        }
    }
}
