// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Registry Contracts
//!
//! Typed bindings for the TixToken service registry and its companion
//! contracts, plus checks that an ABI document on disk declares the calls and
//! events those bindings rely on.
//!
//! ## loading and checking ABIs
//!
//! ```rust,ignore
//! use registry_contracts::RegistryAbi;
//!
//! let legacy = RegistryAbi::from_path("./TixToken.old.abi")?;
//! let service_registered = legacy.legacy_registry_event()?;
//!
//! let current = RegistryAbi::from_path("./bin/TixToken.abi")?;
//! current.ensure_current_registry()?;
//! ```
//!
//! ## calling the registry
//!
//! ```rust,ignore
//! use registry_contracts::ITixToken;
//!
//! let registry = ITixToken::new(address, provider);
//! let record = registry.repository(name).call().await?;
//! ```

pub mod abi;
pub mod bindings;
pub mod error;

pub use abi::{RegistryAbi, SERVICE_NAME_PARAM, SERVICE_REGISTERED_SIGNATURE};
pub use bindings::{ILegacyServiceRegistry, IServiceDeployer, ITixToken, IWorkflowBaseMock};
pub use error::AbiError;
