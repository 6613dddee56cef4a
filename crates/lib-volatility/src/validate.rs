//! Provenance assertions over active records.
//!
//! Each record yields a conjunction of equality bits. The evaluation fails as a
//! whole if any active record's conjunction is zero; inactive records are never
//! asserted on.

use tracing::warn;

use crate::config::{ReceiptProvenance, StorageProvenance};
use crate::data::{LogField, StorageSlot, Transaction};
use crate::decode::FieldDecoder;
use crate::error::{CircuitError, CircuitResult, Mismatch};
use crate::stream::MaskedSeq;
use crate::uint::{Bit, Uint248};

/// Named equality bits whose conjunction must hold for a record.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Conjunction {
    terms: Vec<(Mismatch, Bit)>,
}

impl Conjunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn and(mut self, term: Mismatch, holds: Bit) -> Self {
        self.terms.push((term, holds));
        self
    }

    /// Appends every term of `other`.
    pub fn join(mut self, other: Conjunction) -> Self {
        self.terms.extend(other.terms);
        self
    }

    pub fn holds(&self) -> Bit {
        self.terms.iter().fold(Bit::ONE, |acc, (_, bit)| acc.and(*bit))
    }

    /// The first term that is zero.
    pub fn first_mismatch(&self) -> Option<Mismatch> {
        self.terms.iter().find(|(_, bit)| !bit.as_bool()).map(|(term, _)| *term)
    }
}

/// Something that can attest a record of type `R`.
pub trait Attest<R> {
    fn attest(&self, record: &R) -> Conjunction;
}

impl Attest<LogField> for ReceiptProvenance {
    fn attest(&self, field: &LogField) -> Conjunction {
        Conjunction::new()
            .and(Mismatch::Contract, Bit::from(field.contract == self.contract))
            .and(Mismatch::EventId, Bit::from(field.event_id == self.event_id))
            .and(Mismatch::TopicField, Bit::from(field.is_topic).not())
            .and(
                Mismatch::FieldIndex,
                Uint248::from(u64::from(field.field_index))
                    .is_equal(Uint248::from(u64::from(self.field_index))),
            )
    }
}

impl Attest<StorageSlot> for StorageProvenance {
    fn attest(&self, slot: &StorageSlot) -> Conjunction {
        Conjunction::new()
            .and(Mismatch::Contract, Bit::from(slot.address == self.contract))
            .and(Mismatch::StorageSlot, Bit::from(slot.slot == self.slot))
    }
}

/// The sender's first transaction: its nonce is zero.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstTransaction;

impl Attest<Transaction> for FirstTransaction {
    fn attest(&self, tx: &Transaction) -> Conjunction {
        Conjunction::new().and(Mismatch::Nonce, Uint248::from(tx.nonce).is_zero())
    }
}

/// Adds the decoder's range conjunct to an attestation when it is strict.
#[derive(Clone, Copy, Debug)]
pub struct WithRange<'a, A> {
    pub inner: &'a A,
    pub decoder: &'a FieldDecoder,
}

impl Attest<LogField> for WithRange<'_, ReceiptProvenance> {
    fn attest(&self, field: &LogField) -> Conjunction {
        let conj = self.inner.attest(field);
        if self.decoder.is_strict() {
            conj.and(Mismatch::FieldRange, self.decoder.in_range(&field.value))
        } else {
            conj
        }
    }
}

impl Attest<StorageSlot> for WithRange<'_, StorageProvenance> {
    fn attest(&self, slot: &StorageSlot) -> Conjunction {
        let conj = self.inner.attest(slot);
        if self.decoder.is_strict() {
            conj.and(Mismatch::FieldRange, self.decoder.in_range(&slot.value))
        } else {
            conj
        }
    }
}

/// Asserts `attestor` over every active record of `records`.
pub fn assert_each<R, A: Attest<R>>(records: &MaskedSeq<R>, attestor: &A) -> CircuitResult<()> {
    let Some(slot) = records.first_violation(|record| attestor.attest(record).holds()) else {
        return Ok(());
    };
    // A violating slot always has at least one zero term.
    match attestor.attest(records.get_underlying(slot)).first_mismatch() {
        Some(mismatch) => {
            warn!(slot, %mismatch, "provenance assertion failed");
            Err(CircuitError::ValidationFailed { slot, mismatch })
        }
        None => Ok(()),
    }
}

/// Asserts `attestor` on one fixed slot whether or not it is active, and
/// requires that slot to be active.
pub fn assert_slot<R, A: Attest<R>>(
    records: &MaskedSeq<R>,
    slot: usize,
    attestor: &A,
) -> CircuitResult<()> {
    let conj = Conjunction::new()
        .and(Mismatch::InactiveSlot, records.toggles()[slot])
        .join(attestor.attest(records.get_underlying(slot)));
    if conj.holds().as_bool() {
        return Ok(());
    }
    match conj.first_mismatch() {
        Some(mismatch) => {
            warn!(slot, %mismatch, "slot assertion failed");
            Err(CircuitError::ValidationFailed { slot, mismatch })
        }
        None => Ok(()),
    }
}
