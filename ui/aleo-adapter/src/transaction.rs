//! Aleo transaction objects as the wallet extensions expect them.

use serde::{Deserialize, Serialize};

/// One program call inside a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    pub program: String,
    pub function_name: String,
    pub inputs: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AleoTransaction {
    pub address: String,
    pub chain_id: String,
    pub transitions: Vec<Transition>,
    pub fee: u64,
    pub fee_private: bool,
}

impl AleoTransaction {
    /// Build a single-transition transaction.
    pub fn create(
        address: &str,
        chain_id: &str,
        program: &str,
        function: &str,
        inputs: Vec<String>,
        fee: u64,
        fee_private: bool,
    ) -> Self {
        Self {
            address: address.to_string(),
            chain_id: chain_id.to_string(),
            transitions: vec![Transition {
                program: program.to_string(),
                function_name: function.to_string(),
                inputs,
            }],
            fee,
            fee_private,
        }
    }

    /// `program.function` of the first transition.
    pub fn target(&self) -> String {
        match self.transitions.first() {
            Some(t) => format!("{}.{}", t.program, t.function_name),
            None => String::new(),
        }
    }
}
