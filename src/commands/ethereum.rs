//! Injected Wallet Provider
//!
//! `window.ethereum` (EIP-1193) behind the core `Eip1193` trait.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use task_dapp_core::provider::{Eip1193, EventHandler, ListenerId};
use task_dapp_core::RpcError;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

#[wasm_bindgen]
extern "C" {
    #[derive(Clone)]
    pub type Ethereum;

    #[wasm_bindgen(method, catch)]
    async fn request(this: &Ethereum, args: JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method)]
    fn on(this: &Ethereum, event: &str, handler: &Closure<dyn FnMut(JsValue)>);

    #[wasm_bindgen(method, js_name = removeListener)]
    fn remove_listener(this: &Ethereum, event: &str, handler: &Closure<dyn FnMut(JsValue)>);
}

#[derive(Serialize)]
struct RequestArguments<'a> {
    method: &'a str,
    params: &'a Value,
}

type Listener = (String, Closure<dyn FnMut(JsValue)>);

pub struct InjectedProvider {
    ethereum: Ethereum,
    /// Closures must outlive their JS registration
    listeners: RefCell<HashMap<ListenerId, Listener>>,
    next_listener: Cell<ListenerId>,
}

impl InjectedProvider {
    /// `window.ethereum`, if a wallet extension injected one
    pub fn detect() -> Option<Self> {
        let window = web_sys::window()?;
        let value = js_sys::Reflect::get(&window, &JsValue::from_str("ethereum")).ok()?;
        if value.is_undefined() || value.is_null() {
            return None;
        }
        Some(Self {
            ethereum: value.unchecked_into(),
            listeners: RefCell::new(HashMap::new()),
            next_listener: Cell::new(0),
        })
    }
}

#[async_trait(?Send)]
impl Eip1193 for InjectedProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let args = RequestArguments { method, params: &params }
            .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
            .map_err(|e| RpcError::transport(format!("Failed to serialize args: {}", e)))?;

        let result = self.ethereum.request(args).await.map_err(rpc_error)?;

        serde_wasm_bindgen::from_value::<Value>(result)
            .map_err(|e| RpcError::transport(format!("Failed to parse result: {}", e)))
    }

    fn on(&self, event: &str, handler: EventHandler) -> ListenerId {
        let name = event.to_string();
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
            match serde_wasm_bindgen::from_value::<Value>(payload) {
                Ok(value) => handler(value),
                Err(e) => warn!(event = %name, error = %e, "unreadable provider event"),
            }
        });
        self.ethereum.on(event, &closure);

        let id = self.next_listener.get() + 1;
        self.next_listener.set(id);
        self.listeners.borrow_mut().insert(id, (event.to_string(), closure));
        id
    }

    fn remove_listener(&self, event: &str, id: ListenerId) {
        let removed = self.listeners.borrow_mut().remove(&id);
        if let Some((registered, closure)) = removed {
            debug_assert_eq!(registered, event);
            self.ethereum.remove_listener(&registered, &closure);
        }
    }
}

/// Wallet errors are plain objects (or `Error`s) carrying `code`/`message`
fn rpc_error(err: JsValue) -> RpcError {
    let field = |name: &str| js_sys::Reflect::get(&err, &JsValue::from_str(name)).ok();
    let code = field("code")
        .and_then(|v| v.as_f64())
        .map(|c| c as i64)
        .unwrap_or(RpcError::INTERNAL);
    let message = field("message")
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("{:?}", err));
    RpcError::new(code, message)
}
