// Copyright 2025 Semiotic AI, Inc.
// SPDX-License-Identifier: Apache-2.0

use std::{mem, num::NonZeroUsize};

use alloy::primitives::{Address, B256};

use crate::registry::Registration;

/// Names and registrations sent together in one `registerServices` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Batch {
    /// Service names, parallel to `services`.
    pub names: Vec<B256>,
    /// Registrations to store under `names`.
    pub services: Vec<Registration>,
}

impl Batch {
    /// Number of entries.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the batch holds no entries.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Destinations in entry order.
    pub fn destinations(&self) -> Vec<Address> {
        self.services
            .iter()
            .map(|service| service.destination)
            .collect()
    }

    fn push(&mut self, name: B256, registration: Registration) {
        self.names.push(name);
        self.services.push(registration);
    }
}

/// Accumulates entries and hands back a [`Batch`] each time `capacity` is reached.
#[derive(Debug)]
pub struct BatchBuilder {
    capacity: NonZeroUsize,
    pending: Batch,
}

impl BatchBuilder {
    /// Creates an empty builder.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            pending: Batch::default(),
        }
    }

    /// Adds an entry. Returns the full batch once it holds `capacity` entries.
    pub fn push(&mut self, name: B256, registration: Registration) -> Option<Batch> {
        self.pending.push(name, registration);
        (self.pending.len() >= self.capacity.get()).then(|| mem::take(&mut self.pending))
    }

    /// Returns whatever is left, if anything.
    pub fn finish(self) -> Option<Batch> {
        (!self.pending.is_empty()).then_some(self.pending)
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::keccak256;

    use super::*;

    fn registration(byte: u8) -> Registration {
        Registration {
            destination: Address::repeat_byte(byte),
            owner: Address::repeat_byte(byte.wrapping_add(1)),
            spec: String::new(),
        }
    }

    fn capacity(size: usize) -> NonZeroUsize {
        NonZeroUsize::new(size).unwrap()
    }

    #[test]
    fn test_batch_is_returned_when_full() {
        let mut builder = BatchBuilder::new(capacity(2));

        assert_eq!(builder.push(keccak256("a"), registration(1)), None);

        let batch = builder.push(keccak256("b"), registration(2)).unwrap();

        assert_eq!(batch.names, vec![keccak256("a"), keccak256("b")]);
        assert_eq!(
            batch.destinations(),
            vec![Address::repeat_byte(1), Address::repeat_byte(2)]
        );
    }

    #[test]
    fn test_builder_starts_over_after_full_batch() {
        let mut builder = BatchBuilder::new(capacity(2));
        builder.push(keccak256("a"), registration(1));
        builder.push(keccak256("b"), registration(2));

        assert_eq!(builder.push(keccak256("c"), registration(3)), None);

        let rest = builder.finish().unwrap();
        assert_eq!(rest.names, vec![keccak256("c")]);
    }

    #[test]
    fn test_finish_is_empty_on_exact_multiple() {
        let mut builder = BatchBuilder::new(capacity(2));
        builder.push(keccak256("a"), registration(1));
        builder.push(keccak256("b"), registration(2));

        assert_eq!(builder.finish(), None);
    }

    #[test]
    fn test_capacity_of_one_flushes_every_entry() {
        let mut builder = BatchBuilder::new(capacity(1));

        for label in ["a", "b", "c"] {
            let batch = builder.push(keccak256(label), registration(0)).unwrap();
            assert_eq!(batch.len(), 1);
        }
        assert_eq!(builder.finish(), None);
    }
}
