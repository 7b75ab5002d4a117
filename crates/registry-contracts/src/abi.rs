// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{fs, path::Path};

use alloy::{
    json_abi::{Event, Function, JsonAbi},
    primitives::Selector,
    sol_types::SolCall,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    bindings::{ILegacyServiceRegistry, ITixToken},
    error::AbiError,
};

/// Canonical signature of the event emitted by the legacy registry on every registration.
pub const SERVICE_REGISTERED_SIGNATURE: &str = "ServiceRegistered(bytes32,address)";

/// Name of the `ServiceRegistered` input carrying the service name.
pub const SERVICE_NAME_PARAM: &str = "_name";

const SERVICE_REGISTERED: &str = "ServiceRegistered";

/// Compiler output comes either as the bare ABI array (`solc --abi`) or as an
/// artifact object carrying it under `abi` (hardhat, foundry).
#[derive(Deserialize)]
#[serde(untagged)]
enum AbiDocument {
    Bare(JsonAbi),
    Artifact { abi: JsonAbi },
}

impl From<AbiDocument> for JsonAbi {
    fn from(document: AbiDocument) -> Self {
        match document {
            AbiDocument::Bare(abi) => abi,
            AbiDocument::Artifact { abi } => abi,
        }
    }
}

/// A registry contract's JSON ABI, checked against the compiled bindings before use.
#[derive(Debug, Clone)]
pub struct RegistryAbi {
    abi: JsonAbi,
}

impl RegistryAbi {
    /// Reads and parses an ABI document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AbiError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| AbiError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let registry_abi = Self::from_json(&json).map_err(|source| AbiError::Json {
            path: path.display().to_string(),
            source,
        })?;

        debug!(
            path = %path.display(),
            functions = registry_abi.abi.functions.len(),
            events = registry_abi.abi.events.len(),
            "Loaded ABI"
        );

        Ok(registry_abi)
    }

    /// Parses an ABI document held in memory.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let document: AbiDocument = serde_json::from_str(json)?;
        Ok(Self {
            abi: document.into(),
        })
    }

    /// Checks that this ABI can serve as the legacy registry and returns its
    /// `ServiceRegistered` event definition.
    pub fn ensure_legacy_registry(&self) -> Result<&Event, AbiError> {
        self.ensure_call::<ILegacyServiceRegistry::repositoryCall>()?;
        self.service_registered_event()
    }

    /// Checks that this ABI declares every call the migration makes on the new registry.
    pub fn ensure_current_registry(&self) -> Result<(), AbiError> {
        self.ensure_call::<ITixToken::repositoryCall>()?;
        self.ensure_call::<ITixToken::registerServicesCall>()?;
        self.ensure_call::<ITixToken::areServicesRegisteredCall>()?;
        Ok(())
    }

    /// Finds the `ServiceRegistered(bytes32,address)` event.
    pub fn service_registered_event(&self) -> Result<&Event, AbiError> {
        let overloads = self
            .abi
            .event(SERVICE_REGISTERED)
            .ok_or_else(|| AbiError::MissingEvent(SERVICE_REGISTERED.to_string()))?;

        overloads
            .iter()
            .find(|event| event.signature() == SERVICE_REGISTERED_SIGNATURE)
            .ok_or_else(|| AbiError::EventSignatureMismatch {
                name: SERVICE_REGISTERED.to_string(),
                expected: SERVICE_REGISTERED_SIGNATURE.to_string(),
                found: overloads.iter().map(Event::signature).collect(),
            })
    }

    /// Finds the ABI function the binding `C` was generated from, matched by selector.
    pub fn ensure_call<C: SolCall>(&self) -> Result<&Function, AbiError> {
        let name = function_name(C::SIGNATURE);
        let overloads = self
            .abi
            .function(name)
            .ok_or_else(|| AbiError::MissingFunction(name.to_string()))?;

        overloads
            .iter()
            .find(|function| function.selector() == Selector::from(C::SELECTOR))
            .ok_or_else(|| AbiError::FunctionSignatureMismatch {
                name: name.to_string(),
                expected: C::SIGNATURE.to_string(),
                found: overloads.iter().map(Function::signature).collect(),
            })
    }
}

fn function_name(signature: &str) -> &str {
    signature
        .split_once('(')
        .map_or(signature, |(name, _)| name)
}
