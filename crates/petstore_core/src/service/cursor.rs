//! Forward-only result cursor returned by provider reads.

use crate::model::pet::PetRecord;
use crate::notify::ChangeWatch;
use crate::router::ContentAddress;
use std::vec::IntoIter;

/// Single-consumer sequence of matching pet records.
///
/// Rows are fetched when the read executes and handed out in order; a cursor
/// cannot be rewound or cloned. When the provider's notifier supports watches,
/// the cursor stays registered on its originating address so the consumer can
/// tell when a re-query is due.
#[derive(Debug)]
pub struct Cursor {
    address: ContentAddress,
    rows: IntoIter<PetRecord>,
    watch: Option<ChangeWatch>,
}

impl Cursor {
    pub(crate) fn new(
        address: ContentAddress,
        rows: Vec<PetRecord>,
        watch: Option<ChangeWatch>,
    ) -> Self {
        Self {
            address,
            rows: rows.into_iter(),
            watch,
        }
    }

    /// Address the read was issued against.
    pub fn notification_address(&self) -> &ContentAddress {
        &self.address
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Returns whether a change touching this cursor's address arrived since
    /// the last call. Always `false` without a watch.
    pub fn has_pending_change(&self) -> bool {
        self.watch.as_ref().is_some_and(ChangeWatch::take_pending)
    }
}

impl Iterator for Cursor {
    type Item = PetRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Cursor {}
