//! Task Contract Interface
//!
//! Fixed at build time; changing the contract interface means shipping a new
//! build.

use alloy_primitives::B256;
use alloy_sol_types::{sol, SolEvent};

sol! {
    #[derive(Debug, PartialEq, Eq)]
    struct Task {
        uint256 id;
        string description;
        bool completed;
    }

    function getTasks() external view returns (Task[] memory);
    function createTask(string description) external;
    function updateTask(uint256 id, string description) external;
    function completeTask(uint256 id) external;

    #[derive(Debug, PartialEq, Eq)]
    event TaskCreated(uint256 indexed id, string description);

    #[derive(Debug, PartialEq, Eq)]
    event TaskUpdated(uint256 indexed id, string description);

    #[derive(Debug, PartialEq, Eq)]
    event TaskCompleted(uint256 indexed id);
}

/// topic0 of every event the contract emits
pub fn event_signatures() -> Vec<B256> {
    vec![
        TaskCreated::SIGNATURE_HASH,
        TaskUpdated::SIGNATURE_HASH,
        TaskCompleted::SIGNATURE_HASH,
    ]
}
