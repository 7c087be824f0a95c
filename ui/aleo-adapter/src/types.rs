use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Account as reported by the selected wallet.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    pub public_key: Option<String>,
    pub connected: bool,
}

impl Account {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn connected(public_key: impl Into<String>) -> Self {
        Self {
            public_key: Some(public_key.into()),
            connected: true,
        }
    }

    /// The address, if connected and non-empty.
    pub fn address(&self) -> Option<&str> {
        match &self.public_key {
            Some(key) if self.connected && !key.is_empty() => Some(key),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    #[default]
    TestnetBeta,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
            Self::TestnetBeta => "testnetbeta",
        }
    }
}

/// Authorization level requested at connect time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecryptPermission {
    NoDecrypt,
    UponRequest,
    AutoDecrypt,
    #[default]
    OnChainHistory,
}

impl DecryptPermission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoDecrypt => "NO_DECRYPT",
            Self::UponRequest => "DECRYPT_UPON_REQUEST",
            Self::AutoDecrypt => "AUTO_DECRYPT",
            Self::OnChainHistory => "ON_CHAIN_HISTORY",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Spent,
    Unspent,
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spent => write!(f, "spent"),
            Self::Unspent => write!(f, "unspent"),
        }
    }
}

impl FromStr for RecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spent" => Ok(Self::Spent),
            "unspent" => Ok(Self::Unspent),
            other => Err(format!("unknown record status: {other}")),
        }
    }
}

/// A unit of private on-chain state. Wallets disagree on which fields they
/// fill in, so everything but `data` is optional.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Record {
    pub id: Option<String>,
    pub owner: Option<String>,
    pub program_id: Option<String>,
    pub spent: Option<bool>,
    pub status: Option<RecordStatus>,
    pub plaintext: Option<String>,
    pub transaction_id: Option<String>,
    pub data: serde_json::Value,
}

impl Record {
    /// Status, falling back to the `spent` flag for wallets that only report
    /// the latter.
    pub fn effective_status(&self) -> Option<RecordStatus> {
        self.status.or(match self.spent {
            Some(true) => Some(RecordStatus::Spent),
            Some(false) => Some(RecordStatus::Unspent),
            None => None,
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Deploy,
    Execute,
    Send,
    Receive,
    Join,
    Split,
    Shield,
    Unshield,
}

impl EventType {
    pub const ALL: [EventType; 8] = [
        Self::Deploy,
        Self::Execute,
        Self::Send,
        Self::Receive,
        Self::Join,
        Self::Split,
        Self::Shield,
        Self::Unshield,
    ];
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Deploy => "deploy",
            Self::Execute => "execute",
            Self::Send => "send",
            Self::Receive => "receive",
            Self::Join => "join",
            Self::Split => "split",
            Self::Shield => "shield",
            Self::Unshield => "unshield",
        };
        write!(f, "{s}")
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "deploy" => Ok(Self::Deploy),
            "execute" => Ok(Self::Execute),
            "send" => Ok(Self::Send),
            "receive" => Ok(Self::Receive),
            "join" => Ok(Self::Join),
            "split" => Ok(Self::Split),
            "shield" => Ok(Self::Shield),
            "unshield" => Ok(Self::Unshield),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}

/// One entry of a wallet's transaction history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub program_id: String,
    #[serde(default)]
    pub function_id: Option<String>,
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_address_requires_connection() {
        assert_eq!(Account::connected("aleo1abc").address(), Some("aleo1abc"));
        assert_eq!(Account::connected("").address(), None);
        let stale = Account {
            public_key: Some("aleo1abc".into()),
            connected: false,
        };
        assert_eq!(stale.address(), None);
    }

    #[test]
    fn test_record_from_wallet_json() {
        let json = r#"{
            "id": "r1",
            "owner": "aleo1owner",
            "programId": "credits.aleo",
            "spent": true,
            "transactionId": "at1xyz",
            "data": {"microcredits": "100u64.private"}
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record.program_id.as_deref(), Some("credits.aleo"));
        assert_eq!(record.status, None);
        assert_eq!(record.effective_status(), Some(RecordStatus::Spent));
        assert_eq!(record.data["microcredits"], "100u64.private");
    }

    #[test]
    fn test_history_entry_type_field() {
        let json = r#"{"id":"1","type":"execute","programId":"credits.aleo","functionId":"transfer_public","status":"confirmed"}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.event_type, EventType::Execute);
        assert_eq!(entry.function_id.as_deref(), Some("transfer_public"));
        assert_eq!(entry.timestamp, None);
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("Spent".parse::<RecordStatus>(), Ok(RecordStatus::Spent));
        assert!("burnt".parse::<RecordStatus>().is_err());
        assert_eq!(" deploy ".parse::<EventType>(), Ok(EventType::Deploy));
    }
}
