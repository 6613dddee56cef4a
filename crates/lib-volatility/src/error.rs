use std::fmt;

use thiserror::Error;

use crate::data::InputKind;

/// Result type returned by circuit definitions.
pub type CircuitResult<T> = Result<T, CircuitError>;

/// Failures raised while a circuit is being evaluated.
///
/// Both are fatal: no partial output is produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitError {
    /// An active record does not satisfy its provenance assertion.
    #[error("assertion failed for active slot {slot}: {mismatch}")]
    ValidationFailed { slot: usize, mismatch: Mismatch },
    /// A reduction or ratio divided by zero.
    #[error("division undefined: {what}")]
    DivisionUndefined { what: &'static str },
}

/// The conjunct of a provenance assertion that did not hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mismatch {
    Contract,
    EventId,
    TopicField,
    FieldIndex,
    StorageSlot,
    FieldRange,
    Nonce,
    InactiveSlot,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Mismatch::Contract => "unexpected contract address",
            Mismatch::EventId => "unexpected event id",
            Mismatch::TopicField => "price field is an indexed topic",
            Mismatch::FieldIndex => "unexpected field index",
            Mismatch::StorageSlot => "unexpected storage slot",
            Mismatch::FieldRange => "decoded field exceeds its declared width",
            Mismatch::Nonce => "transaction nonce is not zero",
            Mismatch::InactiveSlot => "required slot is not active",
        };
        f.write_str(msg)
    }
}

/// Host-side errors found while wiring inputs to a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("{kind} index {index} exceeds capacity {capacity}")]
    CapacityExceeded { kind: InputKind, index: usize, capacity: usize },
    #[error("{kind} index {index} assigned twice")]
    DuplicateIndex { kind: InputKind, index: usize },
    #[error("{kind} toggles are not a contiguous prefix (gap before index {index})")]
    NonContiguous { kind: InputKind, index: usize },
    #[error("{kind}: {values} values but {toggles} toggles")]
    ToggleLengthMismatch { kind: InputKind, values: usize, toggles: usize },
    #[error("{kind}: circuit allocates {expected} slots, input has {actual}")]
    ShapeMismatch { kind: InputKind, expected: usize, actual: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Circuit(#[from] CircuitError),
    #[error(transparent)]
    Input(#[from] InputError),
}
