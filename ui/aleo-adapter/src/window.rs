//! Browser backend: wallet objects injected into `window` by the extensions.
//!
//! All extensions expose the same promise-based call surface on their global
//! (`connect`, `disconnect`, `requestAccounts`, `signMessage`, `decrypt`,
//! `requestRecords`, `requestTransaction`, `requestTransactionHistory`).
//! Values cross the boundary as JSON.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;
use js_sys::{Array, Function, Promise, Reflect, Uint8Array, JSON};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::{
    Account, AdapterError, AleoTransaction, DecryptPermission, EnvironmentProbe, HistoryEntry,
    InjectedWallet, Network, Record, WalletAdapter,
};

/// Extract a readable message from whatever a wallet rejected with.
pub fn js_error_message(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Unknown error".to_string())
}

fn wallet_error(value: JsValue) -> AdapterError {
    AdapterError::Wallet(js_error_message(&value))
}

fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T, AdapterError> {
    let json = JSON::stringify(value).map_err(wallet_error)?;
    Ok(serde_json::from_str(&String::from(json))?)
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, AdapterError> {
    let json = serde_json::to_string(value)?;
    JSON::parse(&json).map_err(wallet_error)
}

/// `value[key]`, or `value` itself when the wallet answers with a bare value.
fn field_or_self(value: JsValue, key: &str) -> JsValue {
    match Reflect::get(&value, &JsValue::from_str(key)) {
        Ok(field) if !field.is_undefined() && !field.is_null() => field,
        _ => value,
    }
}

/// A wallet object found under `window.<global>`.
#[derive(Clone)]
pub struct InjectedObject {
    global: String,
    object: JsValue,
}

impl InjectedObject {
    async fn call(&self, method: &str, args: &[JsValue]) -> Result<JsValue, AdapterError> {
        debug!(global = %self.global, method, "calling injected wallet");
        let function = Reflect::get(&self.object, &JsValue::from_str(method))
            .map_err(wallet_error)?
            .dyn_into::<Function>()
            .map_err(|_| AdapterError::Wallet(format!("{}.{method} is not a function", self.global)))?;
        let args: Array = args.iter().collect();
        let returned = function.apply(&self.object, &args).map_err(wallet_error)?;
        JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(|e| {
                let error = wallet_error(e);
                warn!(global = %self.global, method, %error, "wallet call rejected");
                error
            })
    }

    fn public_key(&self) -> Option<String> {
        Reflect::get(&self.object, &JsValue::from_str("publicKey"))
            .ok()
            .and_then(|k| k.as_string())
            .filter(|k| !k.is_empty())
    }
}

#[async_trait(?Send)]
impl InjectedWallet for InjectedObject {
    async fn request_accounts(&self) -> Result<Vec<String>, AdapterError> {
        let accounts = self.call("requestAccounts", &[]).await?;
        from_js(&accounts)
    }

    async fn request_transaction(&self, transaction: &AleoTransaction) -> Result<String, AdapterError> {
        let response = self.call("requestTransaction", &[to_js(transaction)?]).await?;
        field_or_self(response, "transactionId")
            .as_string()
            .ok_or_else(|| AdapterError::Malformed("missing transaction id".into()))
    }
}

/// Probe over the real `window` object.
#[derive(Clone, Default)]
pub struct BrowserEnvironment;

impl BrowserEnvironment {
    fn object(&self, global: &str) -> Option<InjectedObject> {
        let window = web_sys::window()?;
        let object = Reflect::get(&window, &JsValue::from_str(global)).ok()?;
        if object.is_undefined() || object.is_null() {
            return None;
        }
        Some(InjectedObject {
            global: global.to_string(),
            object,
        })
    }
}

impl EnvironmentProbe for BrowserEnvironment {
    fn injected(&self, global: &str) -> Option<Rc<dyn InjectedWallet>> {
        self.object(global)
            .map(|object| Rc::new(object) as Rc<dyn InjectedWallet>)
    }
}

/// Adapter that routes to the injected object of the selected wallet.
pub struct BrowserAdapter {
    environment: BrowserEnvironment,
    /// Adapter name and the globals its extension may inject.
    wallets: Vec<(String, Vec<String>)>,
    network: Network,
    permission: DecryptPermission,
    programs: Vec<String>,
    selected: RefCell<Option<String>>,
    session: RefCell<Option<(InjectedObject, String)>>,
    connecting: Cell<bool>,
}

impl BrowserAdapter {
    pub fn new(
        wallets: Vec<(String, Vec<String>)>,
        network: Network,
        permission: DecryptPermission,
        programs: Vec<String>,
    ) -> Self {
        Self {
            environment: BrowserEnvironment,
            wallets,
            network,
            permission,
            programs,
            selected: RefCell::new(None),
            session: RefCell::new(None),
            connecting: Cell::new(false),
        }
    }

    fn session_object(&self) -> Result<InjectedObject, AdapterError> {
        self.session
            .borrow()
            .as_ref()
            .map(|(object, _)| object.clone())
            .ok_or(AdapterError::NotConnected)
    }

    /// First adapter whose injected object still carries an approved key.
    fn persisted_session(&self) -> Option<(String, InjectedObject, String)> {
        self.wallets.iter().find_map(|(adapter, globals)| {
            let object = globals.iter().find_map(|g| self.environment.object(g))?;
            let public_key = object.public_key()?;
            Some((adapter.clone(), object, public_key))
        })
    }

    async fn open_session(&self, adapter: &str) -> Result<(InjectedObject, String), AdapterError> {
        let globals = self
            .wallets
            .iter()
            .find(|(name, _)| name == adapter)
            .map(|(_, globals)| globals.clone())
            .ok_or_else(|| AdapterError::UnknownAdapter(adapter.to_string()))?;
        let object = globals
            .iter()
            .find_map(|g| self.environment.object(g))
            .ok_or_else(|| AdapterError::Wallet(format!("{adapter} is not installed")))?;

        let programs: Array = self.programs.iter().map(|p| JsValue::from_str(p)).collect();
        object
            .call(
                "connect",
                &[
                    JsValue::from_str(self.permission.as_str()),
                    JsValue::from_str(self.network.as_str()),
                    programs.into(),
                ],
            )
            .await?;
        let public_key = object
            .public_key()
            .ok_or_else(|| AdapterError::Malformed("wallet returned no public key".into()))?;
        Ok((object, public_key))
    }
}

#[async_trait(?Send)]
impl WalletAdapter for BrowserAdapter {
    fn select(&self, adapter: &str) -> Result<(), AdapterError> {
        if !self.wallets.iter().any(|(name, _)| name == adapter) {
            return Err(AdapterError::UnknownAdapter(adapter.to_string()));
        }
        *self.selected.borrow_mut() = Some(adapter.to_string());
        Ok(())
    }

    async fn connect(&self, adapter: &str) -> Result<(), AdapterError> {
        if self.selected.borrow().as_deref() != Some(adapter) {
            return Err(AdapterError::NotSelected);
        }
        self.connecting.set(true);
        let opened = self.open_session(adapter).await;
        self.connecting.set(false);
        *self.session.borrow_mut() = Some(opened?);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), AdapterError> {
        let object = match self.session_object() {
            Ok(object) => object,
            Err(_) => return Ok(()),
        };
        object.call("disconnect", &[]).await?;
        *self.session.borrow_mut() = None;
        Ok(())
    }

    async fn restore(&self) -> Result<Option<String>, AdapterError> {
        if self.session.borrow().is_some() {
            return Ok(self.selected.borrow().clone());
        }
        let Some((adapter, object, public_key)) = self.persisted_session() else {
            return Ok(None);
        };
        debug!(%adapter, "re-attaching persisted session");
        *self.selected.borrow_mut() = Some(adapter.clone());
        *self.session.borrow_mut() = Some((object, public_key));
        Ok(Some(adapter))
    }

    fn account(&self) -> Account {
        // the extension clears publicKey when it ends the session itself
        let current = self
            .session
            .borrow()
            .as_ref()
            .map(|(object, _)| object.public_key());
        match current {
            Some(Some(public_key)) => Account::connected(public_key),
            Some(None) => {
                debug!("extension dropped its session");
                *self.session.borrow_mut() = None;
                Account::disconnected()
            }
            None => Account::disconnected(),
        }
    }

    fn connecting(&self) -> bool {
        self.connecting.get()
    }

    async fn execute_transaction(&self, transaction: &AleoTransaction) -> Result<String, AdapterError> {
        self.session_object()?.request_transaction(transaction).await
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, AdapterError> {
        let response = self
            .session_object()?
            .call("signMessage", &[Uint8Array::from(message).into()])
            .await?;
        let signature = field_or_self(response, "signature");
        if let Some(text) = signature.as_string() {
            return Ok(text.into_bytes());
        }
        Ok(Uint8Array::new(&signature).to_vec())
    }

    async fn decrypt(&self, ciphertext: &str) -> Result<String, AdapterError> {
        let response = self
            .session_object()?
            .call("decrypt", &[JsValue::from_str(ciphertext)])
            .await?;
        field_or_self(response, "text")
            .as_string()
            .ok_or_else(|| AdapterError::Malformed("missing decrypted text".into()))
    }

    async fn records(&self, program: &str) -> Result<Vec<Record>, AdapterError> {
        let response = self
            .session_object()?
            .call("requestRecords", &[JsValue::from_str(program)])
            .await?;
        from_js(&field_or_self(response, "records"))
    }

    async fn transaction_history(&self, program: &str) -> Result<Vec<HistoryEntry>, AdapterError> {
        let response = self
            .session_object()?
            .call("requestTransactionHistory", &[JsValue::from_str(program)])
            .await?;
        from_js(&field_or_self(response, "transactions"))
    }
}
