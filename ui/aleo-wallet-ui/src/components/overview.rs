use dioxus::prelude::*;

use crate::activity_log::LogEntry;
use crate::state::WalletState;
use crate::AppCoordinator;

#[component]
pub fn OverviewPage() -> Element {
    let wallet = use_context::<Signal<WalletState>>();
    let coordinator = use_context::<AppCoordinator>();

    let app_name = coordinator.config().app_name.clone();
    let status = wallet.read().status_line();
    let address = wallet.read().connection.address().map(str::to_string);
    let wallet_name = wallet.read().connection.wallet_name().map(str::to_string);
    let connected = wallet.read().connection.is_connected();
    let wallets = wallet.read().wallets.clone();

    let connect = coordinator.clone();
    let disconnect = coordinator.clone();
    let rescan = coordinator.clone();

    rsx! {
        div { class: "page",
            h1 { "{app_name}" }
            p { class: "subtitle", "Connect an Aleo browser wallet and exercise its API." }

            div { class: "card",
                h2 { "Connection" }
                p { class: "label", "Status: " span { "{status}" } }
                if let Some(name) = wallet_name {
                    p { class: "label", "Wallet: " span { "{name}" } }
                }
                if let Some(address) = address {
                    p { class: "label", "Address: " span { class: "mono", "{address}" } }
                }
                if connected {
                    button {
                        class: "btn btn-secondary",
                        onclick: move |_| {
                            let coordinator = disconnect.clone();
                            spawn(async move { coordinator.disconnect().await });
                        },
                        "Disconnect"
                    }
                } else {
                    button {
                        class: "btn btn-primary",
                        onclick: move |_| connect.open_modal(),
                        "Connect Wallet"
                    }
                }
            }

            div { class: "card",
                h2 { "Installed wallets" }
                ul { class: "wallet-status-list",
                    for descriptor in wallets {
                        li { key: "{descriptor.id}", class: "wallet-status",
                            span { class: "wallet-icon", "{descriptor.icon}" }
                            span { class: "wallet-name", "{descriptor.name}" }
                            span { class: "mono wallet-chain", "{descriptor.chain_id}" }
                            if descriptor.detected {
                                span { class: "badge badge-detected", "Detected" }
                            } else {
                                span { class: "badge", "Not detected" }
                            }
                        }
                    }
                }
                button {
                    class: "btn btn-secondary",
                    onclick: move |_| {
                        rescan.detect();
                    },
                    "Scan again"
                }
            }

            ActivityLogPanel {}
        }
    }
}

#[component]
fn ActivityLogPanel() -> Element {
    let mut wallet = use_context::<Signal<WalletState>>();
    let entries: Vec<LogLine> = wallet.read().log.entries().map(LogLine::from).collect();

    rsx! {
        div { class: "card",
            div { class: "card-header",
                h2 { "Activity" }
                button {
                    class: "btn btn-small",
                    disabled: entries.is_empty(),
                    onclick: move |_| wallet.write().log.clear(),
                    "Clear"
                }
            }
            if entries.is_empty() {
                p { class: "empty-desc", "No activity yet." }
            }
            ul { class: "activity-log",
                for (i, entry) in entries.iter().enumerate() {
                    li { key: "{i}", class: "activity-entry",
                        span { class: "activity-time mono", "{entry.time}" }
                        span { class: "activity-event", "{entry.event}" }
                        if let Some(payload) = entry.payload.as_ref() {
                            pre { class: "activity-payload", "{payload}" }
                        }
                    }
                }
            }
        }
    }
}

/// Display form of a log entry.
#[derive(Clone, Debug, PartialEq)]
struct LogLine {
    time: String,
    event: String,
    payload: Option<String>,
}

impl From<&LogEntry> for LogLine {
    fn from(entry: &LogEntry) -> Self {
        Self {
            time: entry.timestamp.format("%H:%M:%S").to_string(),
            event: entry.event.clone(),
            payload: entry
                .payload
                .as_ref()
                .map(|p| serde_json::to_string_pretty(p).unwrap_or_else(|_| p.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity_log::ActivityLog;

    #[test]
    fn test_log_line_formats_payload() {
        let mut log = ActivityLog::default();
        log.push("Connected successfully to Leo Wallet", Some(serde_json::json!({ "address": "aleo1x" })));
        log.push("Disconnected successfully", None);

        let lines: Vec<LogLine> = log.entries().map(LogLine::from).collect();
        assert_eq!(lines[0].event, "Disconnected successfully");
        assert_eq!(lines[0].payload, None);
        assert_eq!(lines[1].payload.as_deref(), Some("{\n  \"address\": \"aleo1x\"\n}"));
        assert_eq!(lines[1].time.len(), 8);
    }
}
