// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Append-only CSV log of the `ServiceRegistered` events already seen.
//!
//! Each row is `block_number,service_name`, headerless, with the name as
//! `0x`-prefixed hex. The highest block number decides where the next scan
//! starts and the names seed the set of services to re-check.

use std::{
    collections::HashSet,
    fs::{File, OpenOptions},
    io::{self, Read},
    path::Path,
    str::FromStr,
};

use alloy::primitives::{hex, B256};
use csv::{ReaderBuilder, StringRecord, Writer, WriterBuilder};
use tracing::{debug, info};

use crate::error::MigrationError;

/// A service name observed in a `ServiceRegistered` log and the block it was emitted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CheckpointEntry {
    /// Block the registration log was mined in.
    pub block_number: u64,
    /// `bytes32` service name.
    pub service_name: B256,
}

/// Progress recovered from a checkpoint file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    last_block: Option<u64>,
    service_names: ServiceNames,
}

impl Checkpoint {
    /// Reads the checkpoint at `path`. A missing file is an empty checkpoint.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MigrationError> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No checkpoint at {}, scanning from genesis", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let checkpoint = Self::from_reader(file)?;

        info!(
            path = %path.display(),
            last_block = ?checkpoint.last_block,
            services = checkpoint.service_names.len(),
            "Loaded checkpoint"
        );

        Ok(checkpoint)
    }

    /// Reads checkpoint rows from any reader.
    ///
    /// Rows with fewer than two fields, or with either field empty, are skipped.
    /// A row whose fields do not parse fails the whole read.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, MigrationError> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut checkpoint = Self::default();

        for record in csv_reader.records() {
            let record = record?;
            if let Some(entry) = parse_record(&record)? {
                checkpoint.observe(entry);
            }
        }

        Ok(checkpoint)
    }

    /// Folds an entry into the resume point and the known names.
    pub fn observe(&mut self, entry: CheckpointEntry) {
        self.last_block = Some(
            self.last_block
                .map_or(entry.block_number, |last| last.max(entry.block_number)),
        );
        self.service_names.insert(entry.service_name);
    }

    /// First block that has not been scanned yet.
    pub fn resume_block(&self) -> u64 {
        self.last_block.map_or(0, |last| last.saturating_add(1))
    }

    /// Consumes the checkpoint, keeping only its names.
    pub fn into_service_names(self) -> ServiceNames {
        self.service_names
    }
}

fn parse_record(record: &StringRecord) -> Result<Option<CheckpointEntry>, MigrationError> {
    let (Some(block_number), Some(service_name)) = (record.get(0), record.get(1)) else {
        return Ok(None);
    };
    if block_number.is_empty() || service_name.is_empty() {
        return Ok(None);
    }

    let line = record.position().map_or(0, |position| position.line());

    let block_number =
        block_number
            .parse::<u64>()
            .map_err(|e| MigrationError::CheckpointRowMalformed {
                line,
                reason: format!("block number {block_number:?}: {e}"),
            })?;

    let service_name =
        B256::from_str(service_name).map_err(|e| MigrationError::CheckpointRowMalformed {
            line,
            reason: format!("service name {service_name:?}: {e}"),
        })?;

    Ok(Some(CheckpointEntry {
        block_number,
        service_name,
    }))
}

/// Appends entries to a checkpoint file, flushing after each one.
pub struct CheckpointWriter<W: io::Write> {
    writer: Writer<W>,
}

impl CheckpointWriter<File> {
    /// Opens `path` for appending, creating it if needed.
    pub fn append(path: impl AsRef<Path>) -> Result<Self, MigrationError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;
        Ok(Self::from_writer(file))
    }
}

impl<W: io::Write> CheckpointWriter<W> {
    fn from_writer(writer: W) -> Self {
        Self {
            writer: WriterBuilder::new().has_headers(false).from_writer(writer),
        }
    }

    /// Writes one row and flushes it to the underlying writer.
    pub fn record(&mut self, entry: &CheckpointEntry) -> Result<(), MigrationError> {
        self.writer.write_record([
            entry.block_number.to_string(),
            hex::encode_prefixed(entry.service_name),
        ])?;
        self.writer.flush()?;

        debug!(
            block_number = entry.block_number,
            service_name = %entry.service_name,
            "Recorded checkpoint entry"
        );

        Ok(())
    }
}

/// Service names in first-seen order, without duplicates.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ServiceNames {
    ordered: Vec<B256>,
    seen: HashSet<B256>,
}

impl ServiceNames {
    /// Adds `name` unless already present. Returns whether it was new.
    pub fn insert(&mut self, name: B256) -> bool {
        let inserted = self.seen.insert(name);
        if inserted {
            self.ordered.push(name);
        }
        inserted
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Whether no name has been seen.
    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Iterates in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &B256> {
        self.ordered.iter()
    }

    /// Names in first-seen order.
    pub fn as_slice(&self) -> &[B256] {
        &self.ordered
    }
}
