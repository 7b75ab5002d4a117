// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! The two registries seen by the migration.
//!
//! The pipeline only talks to the traits in this module. [`LegacyRegistry`] and
//! [`CurrentRegistry`] implement them over an `alloy` provider; tests implement
//! them in memory.

use std::{future::Future, num::NonZeroU64};

use alloy::{
    json_abi::Event,
    network::ReceiptResponse,
    primitives::{Address, B256},
    providers::Provider,
};
use registry_contracts::{ILegacyServiceRegistry, ITixToken};
use tracing::{debug, info};

use crate::{
    batch::Batch,
    checkpoint::CheckpointEntry,
    error::MigrationError,
    scanner::{block_ranges, decode_service_registered, service_registered_filter},
};

/// What the `repository` mapping holds for one service name.
///
/// An unregistered name reads back as the zero value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registration {
    /// Contract the service name resolves to.
    pub destination: Address,
    /// Account allowed to update the registration.
    pub owner: Address,
    /// Free-form service specification.
    pub spec: String,
}

impl Registration {
    /// Whether the two registrations resolve or are owned differently. `spec` is not compared.
    pub fn differs_from(&self, other: &Registration) -> bool {
        self.destination != other.destination || self.owner != other.owner
    }

    /// The entry written to the new registry for this registration.
    pub fn migrated(&self) -> Registration {
        Registration {
            destination: self.destination,
            owner: self.owner,
            spec: String::new(),
        }
    }
}

impl From<Registration> for ITixToken::Service {
    fn from(registration: Registration) -> Self {
        ITixToken::Service {
            destination: registration.destination,
            owner: registration.owner,
            spec: registration.spec,
        }
    }
}

impl From<ITixToken::repositoryReturn> for Registration {
    fn from(record: ITixToken::repositoryReturn) -> Self {
        Registration {
            destination: record.destination,
            owner: record.owner,
            spec: record.spec,
        }
    }
}

impl From<ILegacyServiceRegistry::repositoryReturn> for Registration {
    fn from(record: ILegacyServiceRegistry::repositoryReturn) -> Self {
        Registration {
            destination: record.destination,
            owner: record.owner,
            spec: String::new(),
        }
    }
}

/// Source of `ServiceRegistered` observations.
pub trait RegistrationLogSource {
    /// Feeds every registration logged from `from_block` up to the current head to
    /// `on_entry`, in chain order, as soon as it is decoded. Stops at the first error
    /// from either side.
    fn service_registrations<F>(
        &self,
        from_block: u64,
        on_entry: F,
    ) -> impl Future<Output = Result<(), MigrationError>>
    where
        F: FnMut(CheckpointEntry) -> Result<(), MigrationError>;
}

/// Read access to a registry's `repository` mapping.
pub trait RegistrationReader {
    /// Current registration stored under `name`.
    fn registration(
        &self,
        name: B256,
    ) -> impl Future<Output = Result<Registration, MigrationError>>;
}

/// The registry being migrated to.
pub trait MigrationTarget: RegistrationReader {
    /// Stores every entry of `batch` in one write, returning once it is final.
    fn register_services(&self, batch: &Batch) -> impl Future<Output = Result<(), MigrationError>>;

    /// Whether every name resolves to the destination at the same position.
    fn are_services_registered(
        &self,
        names: &[B256],
        destinations: &[Address],
    ) -> impl Future<Output = Result<bool, MigrationError>>;
}

/// The registry being migrated from.
#[derive(Clone, Debug)]
pub struct LegacyRegistry<P> {
    address: Address,
    provider: P,
    service_registered: Event,
    log_chunk_size: Option<NonZeroU64>,
}

impl<P: Provider + Clone> LegacyRegistry<P> {
    /// `service_registered` is the event definition from the legacy ABI document.
    pub fn new(address: Address, provider: P, service_registered: Event) -> Self {
        Self {
            address,
            provider,
            service_registered,
            log_chunk_size: None,
        }
    }

    /// Caps the number of blocks covered by one `eth_getLogs` query.
    pub fn with_log_chunk_size(mut self, log_chunk_size: Option<NonZeroU64>) -> Self {
        self.log_chunk_size = log_chunk_size;
        self
    }
}

impl<P: Provider + Clone> RegistrationLogSource for LegacyRegistry<P> {
    async fn service_registrations<F>(
        &self,
        from_block: u64,
        mut on_entry: F,
    ) -> Result<(), MigrationError>
    where
        F: FnMut(CheckpointEntry) -> Result<(), MigrationError>,
    {
        let head = self.provider.get_block_number().await?;

        if from_block > head {
            info!(from_block, head, "Checkpoint is ahead of chain head, nothing to scan");
            return Ok(());
        }

        info!(
            registry = %self.address,
            from_block,
            to_block = head,
            "Scanning ServiceRegistered logs"
        );

        for (start, end) in block_ranges(from_block, head, self.log_chunk_size) {
            let filter = service_registered_filter(self.address, &self.service_registered, start, end);
            let logs = self.provider.get_logs(&filter).await?;

            debug!(start, end, logs = logs.len(), "Fetched log range");

            for log in &logs {
                on_entry(decode_service_registered(&self.service_registered, log)?)?;
            }
        }

        Ok(())
    }
}

impl<P: Provider + Clone> RegistrationReader for LegacyRegistry<P> {
    async fn registration(&self, name: B256) -> Result<Registration, MigrationError> {
        let registry = ILegacyServiceRegistry::new(self.address, self.provider.clone());
        let record = registry.repository(name).call().await?;
        Ok(record.into())
    }
}

/// The registry being migrated to.
#[derive(Clone, Debug)]
pub struct CurrentRegistry<P> {
    address: Address,
    provider: P,
}

impl<P: Provider + Clone> CurrentRegistry<P> {
    /// Writes go out through `provider`, which must carry the signing wallet.
    pub fn new(address: Address, provider: P) -> Self {
        Self { address, provider }
    }

    fn contract(&self) -> ITixToken::ITixTokenInstance<P> {
        ITixToken::new(self.address, self.provider.clone())
    }
}

impl<P: Provider + Clone> RegistrationReader for CurrentRegistry<P> {
    async fn registration(&self, name: B256) -> Result<Registration, MigrationError> {
        let record = self.contract().repository(name).call().await?;
        Ok(record.into())
    }
}

impl<P: Provider + Clone> MigrationTarget for CurrentRegistry<P> {
    async fn register_services(&self, batch: &Batch) -> Result<(), MigrationError> {
        let services: Vec<ITixToken::Service> =
            batch.services.iter().cloned().map(Into::into).collect();

        let pending = self
            .contract()
            .registerServices(batch.names.clone(), services)
            .send()
            .await?;
        let tx_hash = *pending.tx_hash();

        debug!(%tx_hash, entries = batch.len(), "Sent registerServices");

        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(MigrationError::TransactionReverted { tx_hash });
        }

        info!(
            %tx_hash,
            block_number = ?receipt.block_number(),
            entries = batch.len(),
            "registerServices mined"
        );

        Ok(())
    }

    async fn are_services_registered(
        &self,
        names: &[B256],
        destinations: &[Address],
    ) -> Result<bool, MigrationError> {
        let registered = self
            .contract()
            .areServicesRegistered(names.to_vec(), destinations.to_vec())
            .call()
            .await?;
        Ok(registered)
    }
}
