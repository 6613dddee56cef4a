//! An SP1 program proving the block at which an account sent its first
//! transaction.

#![no_main]
sp1_zkvm::entrypoint!(main);

use lib_volatility::{evaluate, AccountAgeCircuit, DataInput};

pub fn main() {
    let input = sp1_zkvm::io::read::<DataInput>();

    let output = match evaluate(&AccountAgeCircuit, &input) {
        Ok(output) => output,
        Err(e) => panic!("account age circuit failed: {e}"),
    };

    // Packed (address, uint64), read positionally by the consuming contract.
    sp1_zkvm::io::commit_slice(&output.encode_packed());
}
