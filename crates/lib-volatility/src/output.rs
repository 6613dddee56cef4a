//! Fixed-width public outputs.
//!
//! Values are read back positionally by the consuming contract, so the order
//! of `output_*` calls is the layout.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::uint::{Uint248, UINT248_BITS};

/// Width of an emitted block number.
pub const BLOCK_NUMBER_BITS: usize = 64;

/// Width of an emitted address.
pub const ADDRESS_BITS: usize = 160;

/// Checks that `bits` is a whole number of bytes in `8..=248`.
pub fn check_width(bits: usize) -> Result<(), String> {
    if bits % 8 != 0 || !(8..=UINT248_BITS).contains(&bits) {
        return Err(format!("unsupported output width {bits}"));
    }
    Ok(())
}

/// A single emitted value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputValue {
    Uint { bits: usize, value: Uint248 },
    Address(Address),
}

impl OutputValue {
    pub fn bits(&self) -> usize {
        match self {
            OutputValue::Uint { bits, .. } => *bits,
            OutputValue::Address(_) => ADDRESS_BITS,
        }
    }
}

/// Ordered outputs of one evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitOutput {
    values: Vec<OutputValue>,
}

impl CircuitOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` as a `bits`-wide unsigned integer.
    ///
    /// # Panics
    /// Panics if `bits` is not a whole number of bytes in `8..=248`, or if
    /// `value` does not fit.
    pub fn output_uint(&mut self, bits: usize, value: Uint248) {
        if let Err(e) = check_width(bits) {
            panic!("{e}");
        }
        assert!(value.bits() <= bits, "{value} does not fit in uint{bits}");
        self.values.push(OutputValue::Uint { bits, value });
    }

    pub fn output_address(&mut self, address: Address) {
        self.values.push(OutputValue::Address(address));
    }

    pub fn values(&self) -> &[OutputValue] {
        &self.values
    }

    /// `abi.encodePacked` layout: each value big-endian in `bits / 8` bytes.
    pub fn encode_packed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.values.iter().map(|v| v.bits() / 8).sum());
        for value in &self.values {
            match value {
                OutputValue::Uint { bits, value } => {
                    let word = value.to_be_bytes();
                    out.extend_from_slice(&word[32 - bits / 8..]);
                }
                OutputValue::Address(address) => out.extend_from_slice(address.as_slice()),
            }
        }
        out
    }
}
