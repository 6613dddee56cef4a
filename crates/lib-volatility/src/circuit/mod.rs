//! Circuits: a fixed allocation plus a definition evaluated over one input.

mod account_age;
mod volatility;

pub use account_age::AccountAgeCircuit;
pub use volatility::{Evaluation, VolatilityCircuit};

use crate::config::Capacities;
use crate::data::DataInput;
use crate::error::{CircuitResult, Error};
use crate::output::CircuitOutput;

/// An application circuit.
pub trait AppCircuit {
    /// Slots per input kind. The circuit is laid out for exactly these
    /// capacities and cannot accept more.
    fn allocate(&self) -> Capacities;

    /// Evaluates the circuit over an input that matches `allocate`.
    fn define(&self, input: &DataInput) -> CircuitResult<CircuitOutput>;
}

/// Checks `input` against the circuit's allocation, then defines it.
pub fn evaluate<C: AppCircuit + ?Sized>(
    circuit: &C,
    input: &DataInput,
) -> Result<CircuitOutput, Error> {
    input.check_shape(&circuit.allocate())?;
    Ok(circuit.define(input)?)
}
