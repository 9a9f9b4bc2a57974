//! Wire contract between the coordinator and external worker transports.
//!
//! The transport itself (web worker, process, socket) lives outside this
//! crate; only the message shapes and their handling are defined here.

use serde::{Deserialize, Serialize};

use crate::crypto::Keypair;
use crate::error::Result;
use crate::matcher::{Pattern, VanityPosition};

use super::batch::BatchSearcher;

/// Keypair payload as it crosses the transport boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeypairPayload {
    pub address: String,
    pub mnemonic: String,
}

impl From<Keypair> for KeypairPayload {
    fn from(keypair: Keypair) -> Self {
        Self {
            address: keypair.address().to_string(),
            mnemonic: keypair.mnemonic().to_string(),
        }
    }
}

/// Requests a worker can receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerRequest {
    /// One bounded unit of brute-force work.
    #[serde(rename = "GENERATE_VANITY_BATCH")]
    GenerateVanityBatch {
        id: u64,
        target: String,
        position: VanityPosition,
        batch_size: usize,
    },
    /// Health check; carries no search semantics.
    #[serde(rename = "PING")]
    Ping { id: u64 },
}

/// Responses a worker sends back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerResponse {
    #[serde(rename = "VANITY_FOUND")]
    VanityFound {
        id: u64,
        keypair: KeypairPayload,
        attempts: u64,
    },
    #[serde(rename = "VANITY_BATCH_COMPLETE")]
    VanityBatchComplete { id: u64, attempts: u64 },
    #[serde(rename = "PONG")]
    Pong { id: u64 },
}

/// Services one request against a searcher.
///
/// Both batch responses report `attempts` as the full batch size, even
/// when the match landed partway through: the counter is a progress
/// upper bound, not an exact tally.
pub fn handle_request(searcher: &BatchSearcher, request: WorkerRequest) -> Result<WorkerResponse> {
    match request {
        WorkerRequest::Ping { id } => Ok(WorkerResponse::Pong { id }),
        WorkerRequest::GenerateVanityBatch {
            id,
            target,
            position,
            batch_size,
        } => {
            let pattern = Pattern::new(target, position)?;
            let outcome = searcher.search_batch(&pattern, batch_size)?;
            Ok(match outcome.keypair {
                Some(keypair) => WorkerResponse::VanityFound {
                    id,
                    keypair: keypair.into(),
                    attempts: batch_size as u64,
                },
                None => WorkerResponse::VanityBatchComplete {
                    id,
                    attempts: batch_size as u64,
                },
            })
        }
    }
}
