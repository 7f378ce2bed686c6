//! Read-only JSON-RPC Transport
//!
//! Plain HTTP POSTs to a public endpoint. There is no wallet behind it and
//! no push channel, so it never emits events; `eth_subscribe` fails and the
//! reconciler polls `eth_getLogs` instead.

use std::cell::Cell;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use task_dapp_core::provider::{Eip1193, EventHandler, ListenerId};
use task_dapp_core::RpcError;
use tracing::debug;

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Value,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
    next_id: Cell<u64>,
}

impl HttpTransport {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            next_id: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl Eip1193 for HttpTransport {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        let body = JsonRpcRequest { jsonrpc: "2.0", id, method, params };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| RpcError::transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| RpcError::transport(e.to_string()))?
            .json::<JsonRpcResponse>()
            .await
            .map_err(|e| RpcError::transport(format!("Failed to parse result: {}", e)))?;

        match response.error {
            Some(error) => Err(RpcError::new(error.code, error.message)),
            None => Ok(response.result),
        }
    }

    fn on(&self, event: &str, _handler: EventHandler) -> ListenerId {
        debug!(event, "read-only endpoint has no events");
        0
    }

    fn remove_listener(&self, _event: &str, _id: ListenerId) {}
}
