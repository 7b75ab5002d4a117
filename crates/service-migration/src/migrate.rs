// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{fs::File, num::NonZeroUsize, path::Path};

use tracing::{debug, error, info};

use crate::{
    batch::{Batch, BatchBuilder},
    checkpoint::{Checkpoint, CheckpointWriter},
    error::MigrationError,
    registry::{MigrationTarget, RegistrationLogSource, RegistrationReader},
};

/// What a migration run did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// First block scanned this run.
    pub resume_block: u64,
    /// `ServiceRegistered` logs found this run.
    pub logs_scanned: usize,
    /// Distinct names compared between the registries.
    pub services_checked: usize,
    /// Names whose registration differed and was written.
    pub services_migrated: usize,
    /// `registerServices` transactions sent.
    pub batches_submitted: usize,
    /// Whether the new registry held every name with its expected destination.
    pub verified: bool,
}

impl MigrationReport {
    /// Turns a failed verification into an error.
    pub fn ensure_verified(self) -> Result<Self, MigrationError> {
        if self.verified {
            Ok(self)
        } else {
            Err(MigrationError::VerificationFailed)
        }
    }
}

/// Runs one migration pass.
///
/// 1. Reads the checkpoint at `checkpoint_path` for the resume block and known names.
/// 2. Scans `legacy` for `ServiceRegistered` logs from the resume block, appending
///    each one to the checkpoint as soon as it is decoded.
/// 3. Compares every known name between `legacy` and `target`, sending differing
///    entries in batches of `batch_size` as soon as a batch fills.
/// 4. Asks `target` whether every name now resolves to its legacy destination.
///
/// Any error aborts the pass. Rows already appended to the checkpoint stay there,
/// and the names they carry are compared again on the next pass.
pub async fn migrate<S, T>(
    legacy: &S,
    target: &T,
    checkpoint_path: &Path,
    batch_size: NonZeroUsize,
) -> Result<MigrationReport, MigrationError>
where
    S: RegistrationLogSource + RegistrationReader,
    T: MigrationTarget,
{
    let checkpoint = Checkpoint::load(checkpoint_path)?;
    let resume_block = checkpoint.resume_block();
    let mut names = checkpoint.into_service_names();

    // opened on the first log so a run with nothing new leaves no file behind
    let mut writer: Option<CheckpointWriter<File>> = None;
    let mut logs_scanned = 0;

    legacy
        .service_registrations(resume_block, |entry| {
            if writer.is_none() {
                writer = Some(CheckpointWriter::append(checkpoint_path)?);
            }
            if let Some(writer) = writer.as_mut() {
                writer.record(&entry)?;
            }
            names.insert(entry.service_name);
            logs_scanned += 1;
            Ok(())
        })
        .await?;

    info!(
        resume_block,
        logs = logs_scanned,
        services = names.len(),
        "Collected service names"
    );

    let mut report = MigrationReport {
        resume_block,
        logs_scanned,
        services_checked: names.len(),
        ..Default::default()
    };

    let mut batches = BatchBuilder::new(batch_size);
    let mut destinations = Vec::with_capacity(names.len());

    for name in names.iter() {
        let old = legacy.registration(*name).await?;
        let new = target.registration(*name).await?;

        if old.differs_from(&new) {
            debug!(
                service_name = %name,
                destination = %old.destination,
                owner = %old.owner,
                "Registration differs"
            );
            report.services_migrated += 1;

            if let Some(batch) = batches.push(*name, old.migrated()) {
                submit(target, &batch).await?;
                report.batches_submitted += 1;
            }
        }

        destinations.push(old.destination);
    }

    if let Some(batch) = batches.finish() {
        submit(target, &batch).await?;
        report.batches_submitted += 1;
    }

    report.verified = target
        .are_services_registered(names.as_slice(), &destinations)
        .await?;

    if report.verified {
        info!("Migration completed successfully!");
    } else {
        error!("Not all services were registered correctly.");
    }

    Ok(report)
}

async fn submit<T: MigrationTarget>(target: &T, batch: &Batch) -> Result<(), MigrationError> {
    info!(
        names = ?batch.names,
        destinations = ?batch.destinations(),
        "Pushing batch"
    );
    target.register_services(batch).await
}
