// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Service Migration
//!
//! Copies service registrations from a legacy TixToken registry to its
//! replacement.
//!
//! A run scans the legacy registry's `ServiceRegistered` logs from where the
//! previous run stopped, compares each service's registration in both
//! registries, writes the differing ones to the new registry with batched
//! `registerServices` calls, and finally checks that every service resolves to
//! its legacy destination.
//!
//! ## checkpoint
//!
//! Progress lives in a headerless CSV of `block_number,service_name` rows
//! (`cache.csv` by default). The highest block recorded decides where the next
//! scan starts, and every name recorded is compared again on each run, so a run
//! that failed halfway is completed by the next one.
//!
//! ## quick start
//!
//! ```rust,ignore
//! use service_migration::{migrate, CurrentRegistry, LegacyRegistry};
//!
//! let legacy = LegacyRegistry::new(old_address, provider.clone(), service_registered);
//! let target = CurrentRegistry::new(new_address, provider);
//!
//! let report = migrate(&legacy, &target, Path::new("cache.csv"), batch_size).await?;
//! assert!(report.verified);
//! ```

pub mod batch;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod migrate;
pub mod registry;
pub mod scanner;

pub use batch::{Batch, BatchBuilder};
pub use checkpoint::{Checkpoint, CheckpointEntry, CheckpointWriter, ServiceNames};
pub use config::{Cli, MigrationConfig, DEFAULT_BATCH_SIZE};
pub use error::MigrationError;
pub use migrate::{migrate, MigrationReport};
pub use registry::{
    CurrentRegistry, LegacyRegistry, MigrationTarget, Registration, RegistrationLogSource,
    RegistrationReader,
};
