pub mod connect_wallet;
pub mod decrypt;
pub mod history;
pub mod layout;
pub mod overview;
pub mod records;
pub mod send_transaction;
pub mod sign_message;

use dioxus::prelude::*;

use crate::state::ActionSlot;

/// Result line of an action.
#[component]
pub fn ActionResult(slot: ActionSlot) -> Element {
    rsx! {
        if let Some(result) = slot.result.as_ref() {
            p { class: if slot.failed { "error-text" } else { "success-text" }, "{result}" }
        }
    }
}

#[component]
pub fn ConnectHint(connected: bool) -> Element {
    rsx! {
        if !connected {
            p { class: "hint", "Connect a wallet first." }
        }
    }
}
