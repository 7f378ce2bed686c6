//! Contract Gateway
//!
//! Typed reads and writes against the task contract, and decoding of raw
//! logs into `DomainEvent`s. The contract address is passed per call.

use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{SolCall, SolEvent};
use tracing::{debug, info, warn};

use crate::abi;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::models::{DecodedLog, DomainEvent, Signer, Task};
use crate::provider::{ChainProvider, RawLog, Sleep, TransactionReceipt};

#[derive(Clone)]
pub struct ContractGateway {
    provider: ChainProvider,
    sleep: Sleep,
    poll_interval: Duration,
}

impl ContractGateway {
    pub fn new(provider: ChainProvider, sleep: Sleep, config: &AppConfig) -> Self {
        Self {
            provider,
            sleep,
            poll_interval: config.receipt_poll_interval,
        }
    }

    pub fn provider(&self) -> &ChainProvider {
        &self.provider
    }

    pub fn sleep(&self) -> &Sleep {
        &self.sleep
    }

    /// Full task list, in contract order
    pub async fn read_tasks(&self, address: Address) -> Result<Vec<Task>> {
        let data = abi::getTasksCall {}.abi_encode();
        let raw = self
            .provider
            .call(address, data.into())
            .await
            .map_err(Error::read)?;
        let decoded = abi::getTasksCall::abi_decode_returns(&raw, true).map_err(Error::read)?;
        debug!(count = decoded._0.len(), "tasks read");
        Ok(decoded._0.into_iter().map(Task::from).collect())
    }

    pub async fn create_task(
        &self,
        signer: &Signer,
        address: Address,
        description: &str,
    ) -> Result<TransactionReceipt> {
        let description = non_empty(description)?;
        let call = abi::createTaskCall { description: description.to_string() };
        self.submit(signer, address, call.abi_encode()).await
    }

    /// `id` is not checked locally; the contract decides whether it exists
    pub async fn update_task(
        &self,
        signer: &Signer,
        address: Address,
        id: U256,
        description: &str,
    ) -> Result<TransactionReceipt> {
        let description = non_empty(description)?;
        let call = abi::updateTaskCall { id, description: description.to_string() };
        self.submit(signer, address, call.abi_encode()).await
    }

    pub async fn complete_task(
        &self,
        signer: &Signer,
        address: Address,
        id: U256,
    ) -> Result<TransactionReceipt> {
        let call = abi::completeTaskCall { id };
        self.submit(signer, address, call.abi_encode()).await
    }

    async fn submit(&self, signer: &Signer, to: Address, data: Vec<u8>) -> Result<TransactionReceipt> {
        let hash = self
            .provider
            .send_transaction(signer, to, data.into())
            .await
            .map_err(Error::write)?;
        info!(%hash, "transaction submitted");

        let receipt = self
            .provider
            .wait_for_receipt(hash, &self.sleep, self.poll_interval)
            .await
            .map_err(Error::write)?;
        if !receipt.succeeded() {
            return Err(Error::Write(format!("transaction {} reverted", hash)));
        }
        info!(%hash, block = ?receipt.block_number, "transaction confirmed");
        Ok(receipt)
    }

    /// Decode `log`, or log the mismatch and return `None`
    pub fn decode_log(&self, log: &RawLog) -> Option<DecodedLog> {
        match decode_event(log) {
            Ok(event) => Some(DecodedLog {
                event,
                transaction_hash: log.transaction_hash,
            }),
            Err(err) => {
                warn!(tx = ?log.transaction_hash, error = %err, "skipping undecodable log");
                None
            }
        }
    }
}

fn non_empty(description: &str) -> Result<&str> {
    if description.trim().is_empty() {
        Err(Error::EmptyDescription)
    } else {
        Ok(description)
    }
}

pub fn decode_event(log: &RawLog) -> Result<DomainEvent> {
    let topic0 = log
        .topics
        .first()
        .copied()
        .ok_or_else(|| Error::LogDecode("log has no topics".to_string()))?;
    let topics = log.topics.iter().copied();

    let event = if topic0 == abi::TaskCreated::SIGNATURE_HASH {
        let ev = abi::TaskCreated::decode_raw_log(topics, &log.data, true).map_err(log_decode)?;
        DomainEvent::TaskCreated { id: ev.id, description: ev.description }
    } else if topic0 == abi::TaskUpdated::SIGNATURE_HASH {
        let ev = abi::TaskUpdated::decode_raw_log(topics, &log.data, true).map_err(log_decode)?;
        DomainEvent::TaskUpdated { id: ev.id, description: ev.description }
    } else if topic0 == abi::TaskCompleted::SIGNATURE_HASH {
        let ev = abi::TaskCompleted::decode_raw_log(topics, &log.data, true).map_err(log_decode)?;
        DomainEvent::TaskCompleted { id: ev.id }
    } else {
        return Err(Error::LogDecode(format!("unknown event topic {}", topic0)));
    };
    Ok(event)
}

fn log_decode(err: alloy_sol_types::Error) -> Error {
    Error::LogDecode(err.to_string())
}

/// Raw log for `event` as the contract would emit it
#[cfg(test)]
pub(crate) fn encode_event(address: Address, event: &DomainEvent, transaction_hash: Option<B256>) -> RawLog {
    let (topics, data) = match event {
        DomainEvent::TaskCreated { id, description } => {
            let ev = abi::TaskCreated { id: *id, description: description.clone() };
            (ev.encode_topics_array::<2>(), ev.encode_data())
        }
        DomainEvent::TaskUpdated { id, description } => {
            let ev = abi::TaskUpdated { id: *id, description: description.clone() };
            (ev.encode_topics_array::<2>(), ev.encode_data())
        }
        DomainEvent::TaskCompleted { id } => {
            let ev = abi::TaskCompleted { id: *id };
            (ev.encode_topics_array::<2>(), ev.encode_data())
        }
    };
    RawLog {
        address,
        topics: topics.into_iter().map(|t| t.0).collect(),
        data: data.into(),
        transaction_hash,
        block_number: None,
        log_index: None,
        removed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{instant_sleep, FakeTransport};
    use alloy_primitives::{address, hex, Bytes};
    use alloy_sol_types::SolValue;
    use serde_json::json;
    use std::rc::Rc;

    const CONTRACT: Address = address!("5f4e91138f7557227fD80c7417c3ecED2A4f9E4b");

    fn gateway(fake: &Rc<FakeTransport>) -> ContractGateway {
        let provider = ChainProvider::wallet(fake.clone());
        ContractGateway::new(provider, instant_sleep(), &AppConfig::default())
    }

    fn signer() -> Signer {
        Signer::new(address!("00000000000000000000000000000000000000aa"))
    }

    fn mined(status: &str) -> serde_json::Value {
        json!({
            "transactionHash": format!("0x{}", "11".repeat(32)),
            "blockNumber": "0x5",
            "status": status
        })
    }

    #[tokio::test]
    async fn test_read_tasks_preserves_types() {
        let fake = Rc::new(FakeTransport::new());
        let tasks = vec![abi::Task { id: U256::from(1), description: "buy milk".into(), completed: false }];
        let returned = Bytes::from(tasks.abi_encode());
        fake.respond("eth_call", json!(returned));

        let read = gateway(&fake).read_tasks(CONTRACT).await.unwrap();
        assert_eq!(
            read,
            vec![Task { id: U256::from(1), description: "buy milk".into(), completed: false }]
        );

        let params = fake.params_of("eth_call").unwrap();
        assert_eq!(params[0]["data"], format!("0x{}", hex::encode(abi::getTasksCall::SELECTOR)));
        assert_eq!(params[1], "latest");
    }

    #[tokio::test]
    async fn test_read_failure_is_read_error() {
        let fake = Rc::new(FakeTransport::new());
        fake.fail("eth_call", crate::error::RpcError::new(-32000, "execution reverted"));
        let result = gateway(&fake).read_tasks(CONTRACT).await;
        assert!(matches!(result, Err(Error::Read(msg)) if msg.contains("execution reverted")));
    }

    #[tokio::test]
    async fn test_garbage_return_is_read_error() {
        let fake = Rc::new(FakeTransport::new());
        fake.respond("eth_call", json!("0x1234"));
        assert!(matches!(gateway(&fake).read_tasks(CONTRACT).await, Err(Error::Read(_))));
    }

    #[tokio::test]
    async fn test_empty_description_never_submitted() {
        let fake = Rc::new(FakeTransport::new());
        let gw = gateway(&fake);
        for text in ["", "   ", "\n\t"] {
            let result = gw.create_task(&signer(), CONTRACT, text).await;
            assert!(matches!(result, Err(Error::EmptyDescription)));
            let result = gw.update_task(&signer(), CONTRACT, U256::from(1), text).await;
            assert!(matches!(result, Err(Error::EmptyDescription)));
        }
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_task_submits_and_waits() {
        let fake = Rc::new(FakeTransport::new());
        fake.respond("eth_sendTransaction", json!(format!("0x{}", "11".repeat(32))));
        fake.respond("eth_getTransactionReceipt", mined("0x1"));

        let receipt = gateway(&fake).create_task(&signer(), CONTRACT, "buy milk").await.unwrap();
        assert!(receipt.succeeded());

        let params = fake.params_of("eth_sendTransaction").unwrap();
        let data: Bytes = serde_json::from_value(params[0]["data"].clone()).unwrap();
        let call = abi::createTaskCall::abi_decode(&data, true).unwrap();
        assert_eq!(call.description, "buy milk");
        assert_eq!(params[0]["to"].as_str().map(str::to_lowercase), Some(CONTRACT.to_string().to_lowercase()));
    }

    #[tokio::test]
    async fn test_reverted_write() {
        let fake = Rc::new(FakeTransport::new());
        fake.respond("eth_sendTransaction", json!(format!("0x{}", "11".repeat(32))));
        fake.respond("eth_getTransactionReceipt", mined("0x0"));

        let result = gateway(&fake).complete_task(&signer(), CONTRACT, U256::from(9)).await;
        assert!(matches!(result, Err(Error::Write(msg)) if msg.contains("reverted")));
    }

    #[tokio::test]
    async fn test_rejected_write() {
        let fake = Rc::new(FakeTransport::new());
        fake.fail("eth_sendTransaction", crate::error::RpcError::new(4001, "User rejected the request."));
        let result = gateway(&fake).complete_task(&signer(), CONTRACT, U256::from(9)).await;
        assert!(matches!(result, Err(Error::Write(_))));
        assert_eq!(fake.count("eth_getTransactionReceipt"), 0);
    }

    #[test]
    fn test_decode_known_events() {
        let events = [
            DomainEvent::TaskCreated { id: U256::from(1), description: "buy milk".into() },
            DomainEvent::TaskUpdated { id: U256::from(1), description: "buy oat milk".into() },
            DomainEvent::TaskCompleted { id: U256::from(3) },
        ];
        for event in events {
            let log = encode_event(CONTRACT, &event, Some(B256::with_last_byte(7)));
            assert_eq!(decode_event(&log).unwrap(), event);
        }
    }

    #[test]
    fn test_decode_unknown_returns_none() {
        let fake = Rc::new(FakeTransport::new());
        let mut log = encode_event(CONTRACT, &DomainEvent::TaskCompleted { id: U256::from(3) }, None);
        log.topics[0] = B256::repeat_byte(0xab);
        assert!(gateway(&fake).decode_log(&log).is_none());

        log.topics.clear();
        assert!(matches!(decode_event(&log), Err(Error::LogDecode(_))));
    }

    #[test]
    fn test_decode_truncated_data_fails() {
        let mut log = encode_event(
            CONTRACT,
            &DomainEvent::TaskCreated { id: U256::from(1), description: "buy milk".into() },
            None,
        );
        log.data = Bytes::from_static(&[0u8; 3]);
        assert!(matches!(decode_event(&log), Err(Error::LogDecode(_))));
    }
}
