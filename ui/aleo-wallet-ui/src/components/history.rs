use aleo_adapter::{EventType, HistoryEntry};
use dioxus::prelude::*;

use super::{ActionResult, ConnectHint};
use crate::coordinator::HistoryQuery;
use crate::state::WalletState;
use crate::AppCoordinator;

#[component]
pub fn HistoryPage() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let coordinator = use_context::<AppCoordinator>();
    let defaults = coordinator.config().defaults.clone();

    let mut program = use_signal(|| defaults.program_id.clone());
    let mut event_type = use_signal(|| defaults.history_event_type.clone());
    let mut function_id = use_signal(String::new);

    let connected = wallet.read().connection.is_connected();
    let slot = wallet.read().history.clone();
    let pending = slot.pending;
    let entries = wallet.read().last_history.clone();

    let on_request = move |_| {
        let coordinator = coordinator.clone();
        let query = HistoryQuery {
            program: program.read().clone(),
            event_type: event_type.read().parse::<EventType>().ok(),
            function_id: Some(function_id.read().clone()),
        };
        spawn(async move { coordinator.request_transaction_history(query).await });
    };

    rsx! {
        div { class: "page",
            h1 { "Transaction History" }
            p { class: "subtitle", "List the account's past transactions in a program." }
            ConnectHint { connected }

            div { class: "form-row",
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
                    label { "Event type" }
                    select {
                        class: "input",
                        value: "{event_type}",
                        onchange: move |e| event_type.set(e.value()),
                        option { value: "all", "All" }
                        for kind in EventType::ALL {
                            option { key: "{kind}", value: "{kind}", "{kind}" }
                        }
                    }
                }
                div { class: "form-group",
                    label { "Function (optional)" }
                    input {
                        class: "input",
                        r#type: "text",
                        placeholder: "transfer_public",
                        value: "{function_id}",
                        oninput: move |e| function_id.set(e.value()),
                    }
                }
            }

            button {
                class: "btn btn-primary",
                disabled: pending,
                onclick: on_request,
                if pending { "Requesting..." } else { "Request History" }
            }

            ActionResult { slot: slot.clone() }

            if !entries.is_empty() {
                table { class: "history-table",
                    thead {
                        tr {
                            th { "ID" }
                            th { "Type" }
                            th { "Function" }
                            th { "Status" }
                        }
                    }
                    tbody {
                        for entry in entries.iter() {
                            {
                                let location = target(entry);
                                rsx! {
                                    tr { key: "{entry.id}",
                                        td { class: "mono", "{entry.id}" }
                                        td { "{entry.event_type}" }
                                        td { class: "mono", "{location}" }
                                        td { "{entry.status}" }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// `program/function`, or just the program for deployments.
fn target(entry: &HistoryEntry) -> String {
    match &entry.function_id {
        Some(function) => format!("{}/{function}", entry.program_id),
        None => entry.program_id.clone(),
    }
}
