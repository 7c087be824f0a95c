use aleo_adapter::{Record, RecordStatus};
use dioxus::prelude::*;

use super::{ActionResult, ConnectHint};
use crate::coordinator::RecordQuery;
use crate::state::WalletState;
use crate::AppCoordinator;

/// Records of a program, or their plaintexts when `plaintexts` is set.
#[component]
pub fn RecordsPage(plaintexts: bool) -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let coordinator = use_context::<AppCoordinator>();
    let defaults = coordinator.config().defaults.clone();

    let mut program = use_signal(|| defaults.program_id.clone());
    let mut status = use_signal(|| defaults.record_status.clone());

    let connected = wallet.read().connection.is_connected();
    let (slot, records) = {
        let state = wallet.read();
        if plaintexts {
            (state.record_plaintexts.clone(), state.last_record_plaintexts.clone())
        } else {
            (state.records.clone(), state.last_records.clone())
        }
    };
    let pending = slot.pending;
    let rows: Vec<RecordRow> = records.iter().map(|r| RecordRow::new(r, plaintexts)).collect();

    let on_request = move |_| {
        let coordinator = coordinator.clone();
        let query = RecordQuery {
            program: program.read().clone(),
            status: parse_status(&status.read()),
        };
        spawn(async move {
            if plaintexts {
                coordinator.request_record_plaintexts(query).await;
            } else {
                coordinator.request_records(query).await;
            }
        });
    };

    let title = if plaintexts { "Record Plaintexts" } else { "Records" };

    rsx! {
        div { class: "page",
            h1 { "{title}" }
            p { class: "subtitle", "Fetch the records the connected account owns in a program." }
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
                    label { "Status" }
                    select {
                        class: "input",
                        value: "{status}",
                        onchange: move |e| status.set(e.value()),
                        option { value: "all", "All" }
                        option { value: "unspent", "Unspent" }
                        option { value: "spent", "Spent" }
                    }
                }
            }

            button {
                class: "btn btn-primary",
                disabled: pending,
                onclick: on_request,
                if pending { "Requesting..." } else { "Request {title}" }
            }

            ActionResult { slot: slot.clone() }

            if !rows.is_empty() {
                ul { class: "record-list",
                    for (i, row) in rows.iter().enumerate() {
                        li { key: "{i}", class: "record-item",
                            div { class: "record-meta",
                                span { class: "mono", "{row.id}" }
                                span { class: "badge", "{row.status}" }
                            }
                            pre { class: "record-body", "{row.body}" }
                        }
                    }
                }
            }
        }
    }
}

/// "all" and anything unrecognised mean no status filter.
fn parse_status(value: &str) -> Option<RecordStatus> {
    value.parse().ok()
}

#[derive(Clone, Debug, PartialEq)]
struct RecordRow {
    id: String,
    status: String,
    body: String,
}

impl RecordRow {
    fn new(record: &Record, plaintext: bool) -> Self {
        let body = match (&record.plaintext, plaintext) {
            (Some(text), true) => text.clone(),
            _ => serde_json::to_string_pretty(&record.data).unwrap_or_else(|_| record.data.to_string()),
        };
        Self {
            id: record.id.clone().unwrap_or_else(|| "(no id)".to_string()),
            status: record
                .effective_status()
                .map_or("unknown".to_string(), |s| s.to_string()),
            body,
        }
    }
}
