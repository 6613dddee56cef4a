//! Price volatility over attested on-chain records, computed the way an
//! arithmetic circuit would: fixed capacities, toggle masks instead of
//! variable-length loops, and selection instead of branching.
//!
//! The result is published as fixed-width public values of a zkVM proof.

use alloy_primitives::{Bytes, U256};
use alloy_sol_types::sol;

pub mod circuit;
pub mod config;
pub mod data;
pub mod decode;
pub mod error;
pub mod output;
pub mod stats;
pub mod stream;
pub mod uint;
pub mod validate;

pub use circuit::{evaluate, AccountAgeCircuit, AppCircuit, Evaluation, VolatilityCircuit};
pub use config::{Capacities, VolatilityConfig};
pub use data::{DataInput, LogField, Receipt, StorageSlot, Toggled, Transaction};
pub use error::{CircuitError, Error, InputError, Mismatch};
pub use output::CircuitOutput;
pub use stats::StatResult;
pub use uint::{Bit, Uint248};

sol! {
    /// Public values committed by the volatility program.
    struct PublicValuesStruct {
        uint32 sampleCount;
        uint248 mean;
        uint248 variance;
        uint248 volatility;
        bytes circuitOutput;
    }
}

impl From<&Evaluation> for PublicValuesStruct {
    fn from(evaluation: &Evaluation) -> Self {
        PublicValuesStruct {
            sampleCount: evaluation.stats.samples,
            mean: to_sol_uint(evaluation.stats.mean),
            variance: to_sol_uint(evaluation.stats.variance),
            volatility: to_sol_uint(evaluation.stats.volatility),
            circuitOutput: Bytes::from(evaluation.output.encode_packed()),
        }
    }
}

/// Converts a circuit value to the word `sol!` uses for `uint248`.
pub fn to_sol_uint(value: Uint248) -> U256 {
    U256::from_be_bytes(value.to_be_bytes())
}
