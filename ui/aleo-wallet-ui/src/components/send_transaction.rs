use dioxus::prelude::*;

use super::{ActionResult, ConnectHint};
use crate::coordinator::TransactionRequest;
use crate::state::WalletState;
use crate::AppCoordinator;

#[component]
pub fn SendTransactionPage() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let coordinator = use_context::<AppCoordinator>();
    let defaults = coordinator.config().defaults.clone();

    let mut program = use_signal(|| defaults.program_id.clone());
    let mut function = use_signal(|| defaults.function_id.clone());
    let mut receiver = use_signal(|| defaults.receiver.clone());
    let mut amount = use_signal(|| defaults.amount.clone());
    let mut fee = use_signal(|| defaults.fee.clone());
    let mut fee_private = use_signal(|| false);

    let connected = wallet.read().connection.is_connected();
    let slot = wallet.read().transaction.clone();
    let pending = slot.pending;

    let on_submit = move |_| {
        let coordinator = coordinator.clone();
        let request = TransactionRequest {
            program: program.read().clone(),
            function: function.read().clone(),
            receiver: receiver.read().clone(),
            amount: amount.read().clone(),
            fee: fee.read().clone(),
            fee_private: *fee_private.read(),
        };
        spawn(async move { coordinator.submit_transaction(request).await });
    };

    rsx! {
        div { class: "page",
            h1 { "Send Transaction" }
            p { class: "subtitle", "Execute a program function through the connected wallet." }
            ConnectHint { connected }

            div { class: "form-group",
                label { "Program" }
                input {
                    class: "input",
                    r#type: "text",
                    value: "{program}",
                    oninput: move |e| program.set(e.value()),
                }
            }

            div { class: "form-group",
                label { "Function" }
                input {
                    class: "input",
                    r#type: "text",
                    value: "{function}",
                    oninput: move |e| function.set(e.value()),
                }
            }

            div { class: "form-group",
                label { "Receiver" }
                input {
                    class: "input input-wide",
                    r#type: "text",
                    placeholder: "aleo1...",
                    value: "{receiver}",
                    oninput: move |e| receiver.set(e.value()),
                }
            }

            div { class: "form-group",
                label { "Amount (microcredits)" }
                input {
                    class: "input",
                    r#type: "text",
                    value: "{amount}",
                    oninput: move |e| amount.set(e.value()),
                }
            }

            div { class: "form-group",
                label { "Fee (microcredits)" }
                input {
                    class: "input",
                    r#type: "text",
                    value: "{fee}",
                    oninput: move |e| fee.set(e.value()),
                }
            }

            div { class: "form-group form-check",
                input {
                    r#type: "checkbox",
                    checked: *fee_private.read(),
                    onchange: move |e| fee_private.set(e.checked()),
                }
                label { "Pay fee from a private record" }
            }

            button {
                class: "btn btn-primary",
                disabled: pending,
                onclick: on_submit,
                if pending { "Submitting..." } else { "Submit Transaction" }
            }

            ActionResult { slot: slot.clone() }
        }
    }
}
