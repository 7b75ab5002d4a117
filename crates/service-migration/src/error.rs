// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use alloy::{
    contract,
    primitives::{TxHash, B256},
    providers::PendingTransactionError,
    transports::TransportError,
};
use registry_contracts::AbiError;
use thiserror::Error;

/// Every way a migration run can fail. None of them is recovered from.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// [registry_contracts] ABI loading or compatibility error.
    #[error("ABI error: {0}")]
    Abi(#[from] AbiError),

    /// A checkpoint row could not be read back.
    #[error("Malformed checkpoint row at line {line}: {reason}")]
    CheckpointRowMalformed {
        /// 1-based line in the checkpoint file.
        line: u64,
        /// What was wrong with the row.
        reason: String,
    },

    /// [alloy::contract] call error.
    #[error("Contract call error: {0}")]
    Contract(#[from] contract::Error),

    /// [csv] library error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// [dotenvy] error while loading a `.env` file.
    #[error("Environment file error: {0}")]
    EnvFile(#[from] dotenvy::Error),

    /// A `ServiceRegistered` log did not decode against the legacy ABI.
    #[error("Failed to decode ServiceRegistered log: {0}")]
    EventDecode(#[from] alloy::dyn_abi::Error),

    /// The decoded event has no `bytes32` service name.
    #[error("ServiceRegistered event carries no bytes32 service name")]
    EventServiceNameMissing,

    /// A configuration variable holds a value that cannot be used.
    #[error("Invalid value {value:?} for {variable}: {reason}")]
    InvalidConfig {
        /// Environment variable name.
        variable: &'static str,
        /// Raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// [std::io] library error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A log was returned without the block it was mined in.
    #[error("Log for service {service_name} has no block number")]
    LogBlockNumberMissing {
        /// Service name carried by the log.
        service_name: B256,
    },

    /// Waiting for a submitted transaction failed.
    #[error("Pending transaction error: {0}")]
    PendingTransaction(#[from] PendingTransactionError),

    /// [alloy::transports] RPC error.
    #[error("RPC error: {0}")]
    Rpc(#[from] TransportError),

    /// A `registerServices` transaction was mined but reverted.
    #[error("registerServices transaction {tx_hash} reverted")]
    TransactionReverted {
        /// Hash of the reverted transaction.
        tx_hash: TxHash,
    },

    /// The new registry does not hold every migrated service.
    #[error("Not all services were registered correctly")]
    VerificationFailed,
}
