// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

use alloy::{network::EthereumWallet, providers::ProviderBuilder};
use clap::Parser;
use registry_contracts::RegistryAbi;
use service_migration::{
    migrate, Cli, CurrentRegistry, LegacyRegistry, MigrationConfig, MigrationError,
};
use tracing::{error, info, level_filters::LevelFilter, subscriber::set_global_default};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        // already reported by `migrate`
        Err(MigrationError::VerificationFailed) => ExitCode::from(1),
        Err(e) => {
            error!("Migration error: {e}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let subscriber_builder: tracing_subscriber::fmt::SubscriberBuilder<
        tracing_subscriber::fmt::format::DefaultFields,
        tracing_subscriber::fmt::format::Format,
        EnvFilter,
    > = FmtSubscriber::builder().with_env_filter(filter);
    set_global_default(subscriber_builder.with_ansi(true).pretty().finish()).expect(
        "Failed to set up the global default subscriber for logging. Please check if the RUST_LOG environment variable is set correctly.",
    );
}

async fn run(cli: Cli) -> Result<(), MigrationError> {
    let config = MigrationConfig::from_env()?;

    let old_abi = RegistryAbi::from_path(&config.old_abi_path)?;
    let new_abi = RegistryAbi::from_path(&config.new_abi_path)?;
    let service_registered = old_abi.ensure_legacy_registry()?.clone();
    new_abi.ensure_current_registry()?;

    info!(
        old_contract = %cli.old_contract,
        new_contract = %cli.new_contract,
        signer = %cli.private_key.address(),
        "Starting migration"
    );

    let provider = ProviderBuilder::new()
        .wallet(EthereumWallet::from(cli.private_key))
        .connect_http(cli.rpc_url);

    let legacy = LegacyRegistry::new(cli.old_contract, provider.clone(), service_registered)
        .with_log_chunk_size(config.log_chunk_size);
    let target = CurrentRegistry::new(cli.new_contract, provider);

    let report = migrate(&legacy, &target, &config.checkpoint_path, config.batch_size)
        .await?
        .ensure_verified()?;

    info!(
        logs = report.logs_scanned,
        services = report.services_checked,
        migrated = report.services_migrated,
        batches = report.batches_submitted,
        "Done"
    );

    Ok(())
}
