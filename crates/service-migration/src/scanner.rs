// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::num::NonZeroU64;

use alloy::{
    dyn_abi::{DecodedEvent, DynSolValue, EventExt},
    json_abi::Event,
    primitives::{Address, B256},
    rpc::types::{Filter, Log},
};
use registry_contracts::SERVICE_NAME_PARAM;

use crate::{checkpoint::CheckpointEntry, error::MigrationError};

/// Splits `[from, to]` into consecutive inclusive ranges of at most `chunk` blocks.
///
/// Without a chunk size the whole range is one query. An empty range yields nothing.
pub fn block_ranges(from: u64, to: u64, chunk: Option<NonZeroU64>) -> Vec<(u64, u64)> {
    if from > to {
        return Vec::new();
    }

    let Some(chunk) = chunk else {
        return vec![(from, to)];
    };

    let mut ranges = Vec::new();
    let mut start = from;
    loop {
        let end = start.saturating_add(chunk.get() - 1).min(to);
        ranges.push((start, end));
        if end == to {
            break;
        }
        start = end + 1;
    }
    ranges
}

/// `eth_getLogs` filter for `event` emitted by `address` within `[from, to]`.
pub fn service_registered_filter(address: Address, event: &Event, from: u64, to: u64) -> Filter {
    Filter::new()
        .address(address)
        .event_signature(event.selector())
        .from_block(from)
        .to_block(to)
}

/// Decodes a `ServiceRegistered` log through the legacy ABI's event definition.
pub fn decode_service_registered(
    event: &Event,
    log: &Log,
) -> Result<CheckpointEntry, MigrationError> {
    let decoded = event.decode_log(log.data())?;
    let service_name = service_name(event, decoded).ok_or(MigrationError::EventServiceNameMissing)?;

    let block_number = log
        .block_number
        .ok_or(MigrationError::LogBlockNumberMissing { service_name })?;

    Ok(CheckpointEntry {
        block_number,
        service_name,
    })
}

/// Picks the `_name` input, or the first `bytes32` input if the ABI names it differently.
fn service_name(event: &Event, decoded: DecodedEvent) -> Option<B256> {
    let mut indexed = decoded.indexed.into_iter();
    let mut body = decoded.body.into_iter();

    // inputs are split between topics and data, in declaration order within each
    let values: Vec<(&str, DynSolValue)> = event
        .inputs
        .iter()
        .filter_map(|input| {
            let value = if input.indexed {
                indexed.next()
            } else {
                body.next()
            }?;
            Some((input.name.as_str(), value))
        })
        .collect();

    let as_word = |value: &DynSolValue| match value {
        DynSolValue::FixedBytes(word, 32) => Some(*word),
        _ => None,
    };

    values
        .iter()
        .find(|(name, _)| *name == SERVICE_NAME_PARAM)
        .and_then(|(_, value)| as_word(value))
        .or_else(|| values.iter().find_map(|(_, value)| as_word(value)))
}
