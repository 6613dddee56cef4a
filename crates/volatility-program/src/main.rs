//! An SP1 program proving price volatility over attested Uniswap V3 records.
//!
//! The circuit configuration (pool, event, capacities, scales) is compiled in.
//! The prover supplies only a toggled, fixed-capacity input. The program
//! asserts provenance of every active record, computes the statistics, and
//! commits them as ABI-encoded public values that a Solidity contract can
//! decode.

// These two lines are necessary for the program to properly compile.
//
// Under the hood, we wrap your main function with some extra code so that it behaves properly
// inside the zkVM.
#![no_main]
sp1_zkvm::entrypoint!(main);

use alloy_sol_types::SolValue;
use lib_volatility::{DataInput, PublicValuesStruct, VolatilityCircuit};

/// The main entry point for the SP1 program.
///
/// This function performs the following steps:
/// 1. Reads the toggled records from the prover.
/// 2. Checks the input against the circuit's allocation.
/// 3. Asserts provenance and computes mean, variance and volatility.
/// 4. Encodes the public values for verification in a smart contract.
/// 5. Commits the encoded data as public output of the ZK proof.
pub fn main() {
    let input = sp1_zkvm::io::read::<DataInput>();

    // Compiled in; the prover never chooses provenance.
    let circuit = VolatilityCircuit::default();

    // A failed assertion aborts execution, so no proof exists for bad input.
    let evaluation = match circuit.evaluate(&input) {
        Ok(evaluation) => evaluation,
        Err(e) => panic!("volatility circuit failed: {e}"),
    };

    let public_values = PublicValuesStruct::from(&evaluation);

    // Encode the public values using ABI encoding
    let bytes = public_values.abi_encode();

    // Commit the encoded public values as output of the ZK proof
    sp1_zkvm::io::commit_slice(&bytes);
}
