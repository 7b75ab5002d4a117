// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{
    num::{NonZeroU64, NonZeroUsize},
    path::PathBuf,
    str::FromStr,
};

use alloy::{primitives::Address, signers::local::PrivateKeySigner, transports::http::reqwest::Url};
use clap::Parser;

use crate::error::MigrationError;

/// Entries sent per `registerServices` transaction unless overridden.
pub const DEFAULT_BATCH_SIZE: NonZeroUsize = NonZeroUsize::new(20).unwrap();

const NEW_ABI_PATH: &str = "MIGRATION_NEW_ABI_PATH";
const OLD_ABI_PATH: &str = "MIGRATION_OLD_ABI_PATH";
const CHECKPOINT_PATH: &str = "MIGRATION_CHECKPOINT_PATH";
const BATCH_SIZE: &str = "MIGRATION_BATCH_SIZE";
const LOG_CHUNK_SIZE: &str = "MIGRATION_LOG_CHUNK_SIZE";

/// Moves service registrations from a legacy TixToken registry to its replacement
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Address of the registry being migrated from
    #[clap(value_name = "OLD_CONTRACT_ADDRESS")]
    pub old_contract: Address,

    /// Address of the registry being migrated to
    #[clap(value_name = "NEW_CONTRACT_ADDRESS")]
    pub new_contract: Address,

    /// JSON-RPC endpoint of the chain both registries live on
    #[clap(value_name = "RPC_URL")]
    pub rpc_url: Url,

    /// Hex private key that signs the registerServices transactions
    #[clap(value_name = "PRIVATE_KEY")]
    pub private_key: PrivateKeySigner,
}

/// File locations and tuning knobs, read from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MigrationConfig {
    /// ABI document of the new registry.
    pub new_abi_path: PathBuf,
    /// ABI document of the legacy registry.
    pub old_abi_path: PathBuf,
    /// Checkpoint CSV.
    pub checkpoint_path: PathBuf,
    /// Entries per `registerServices` call.
    pub batch_size: NonZeroUsize,
    /// Blocks per `eth_getLogs` query; `None` queries the whole range at once.
    pub log_chunk_size: Option<NonZeroU64>,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            new_abi_path: PathBuf::from("./bin/TixToken.abi"),
            old_abi_path: PathBuf::from("./TixToken.old.abi"),
            checkpoint_path: PathBuf::from("cache.csv"),
            batch_size: DEFAULT_BATCH_SIZE,
            log_chunk_size: None,
        }
    }
}

impl MigrationConfig {
    /// Loads `.env` if there is one, then reads `MIGRATION_*` variables.
    pub fn from_env() -> Result<Self, MigrationError> {
        match dotenvy::dotenv() {
            Ok(_) => {}
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }

        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Builds the configuration from a variable lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MigrationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            new_abi_path: lookup(NEW_ABI_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.new_abi_path),
            old_abi_path: lookup(OLD_ABI_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.old_abi_path),
            checkpoint_path: lookup(CHECKPOINT_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.checkpoint_path),
            batch_size: parse_var(BATCH_SIZE, lookup(BATCH_SIZE))?
                .unwrap_or(defaults.batch_size),
            log_chunk_size: parse_var(LOG_CHUNK_SIZE, lookup(LOG_CHUNK_SIZE))?,
        })
    }
}

fn parse_var<T>(variable: &'static str, value: Option<String>) -> Result<Option<T>, MigrationError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let Some(value) = value else {
        return Ok(None);
    };

    let parsed = value.trim().parse::<T>();
    match parsed {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => Err(MigrationError::InvalidConfig {
            variable,
            reason: e.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_match_deployment_layout() {
        let config = MigrationConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.batch_size.get(), 20);
        assert_eq!(config.checkpoint_path, PathBuf::from("cache.csv"));
        assert_eq!(config.log_chunk_size, None);
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = MigrationConfig::from_lookup(lookup_from(&[
            ("MIGRATION_NEW_ABI_PATH", "abi/new.json"),
            ("MIGRATION_OLD_ABI_PATH", "abi/old.json"),
            ("MIGRATION_CHECKPOINT_PATH", "state/progress.csv"),
            ("MIGRATION_BATCH_SIZE", " 5 "),
            ("MIGRATION_LOG_CHUNK_SIZE", "10000"),
        ]))
        .unwrap();

        assert_eq!(config.new_abi_path, PathBuf::from("abi/new.json"));
        assert_eq!(config.old_abi_path, PathBuf::from("abi/old.json"));
        assert_eq!(config.checkpoint_path, PathBuf::from("state/progress.csv"));
        assert_eq!(config.batch_size.get(), 5);
        assert_eq!(config.log_chunk_size.map(NonZeroU64::get), Some(10_000));
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let result = MigrationConfig::from_lookup(lookup_from(&[("MIGRATION_BATCH_SIZE", "0")]));

        assert!(matches!(
            result,
            Err(MigrationError::InvalidConfig {
                variable: "MIGRATION_BATCH_SIZE",
                ..
            })
        ));
    }

    #[test]
    fn test_non_numeric_chunk_size_is_rejected() {
        let result =
            MigrationConfig::from_lookup(lookup_from(&[("MIGRATION_LOG_CHUNK_SIZE", "lots")]));

        match result {
            Err(MigrationError::InvalidConfig { variable, value, .. }) => {
                assert_eq!(variable, "MIGRATION_LOG_CHUNK_SIZE");
                assert_eq!(value, "lots");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_cli_takes_four_positional_arguments() {
        let cli = Cli::try_parse_from([
            "migrate",
            "0x1111111111111111111111111111111111111111",
            "0x2222222222222222222222222222222222222222",
            "http://localhost:8545",
            // first well-known development key
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        ])
        .unwrap();

        assert_eq!(
            cli.old_contract,
            "0x1111111111111111111111111111111111111111"
                .parse::<Address>()
                .unwrap()
        );
        assert_eq!(cli.rpc_url.as_str(), "http://localhost:8545/");
        assert_eq!(
            cli.private_key.address(),
            "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_cli_rejects_missing_arguments() {
        let result = Cli::try_parse_from([
            "migrate",
            "0x1111111111111111111111111111111111111111",
            "0x2222222222222222222222222222222222222222",
            "http://localhost:8545",
        ]);

        assert!(result.is_err());
    }
}
