use crate::circuit::AppCircuit;
use crate::config::Capacities;
use crate::data::DataInput;
use crate::error::CircuitResult;
use crate::output::{CircuitOutput, BLOCK_NUMBER_BITS};
use crate::uint::Uint248;
use crate::validate::{assert_slot, FirstTransaction};

/// Proves that an account sent its first transaction at a given block.
///
/// One transaction slot, which must be active. The output is
/// `abi.encodePacked(address, uint64)`: the sender followed by the block
/// number.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccountAgeCircuit;

impl AppCircuit for AccountAgeCircuit {
    fn allocate(&self) -> Capacities {
        Capacities { receipts: 0, storage: 0, transactions: 1 }
    }

    fn define(&self, input: &DataInput) -> CircuitResult<CircuitOutput> {
        let txs = input.transactions.to_stream();
        // The emitted record must be present and must be a first transaction.
        assert_slot(&txs, 0, &FirstTransaction)?;

        let tx = txs.get_underlying(0);
        let mut output = CircuitOutput::new();
        output.output_address(tx.from);
        output.output_uint(BLOCK_NUMBER_BITS, Uint248::from(tx.block_num));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;

    use super::*;
    use crate::circuit::evaluate;
    use crate::data::Transaction;
    use crate::error::{CircuitError, Error, Mismatch};

    fn tx(nonce: u64) -> Transaction {
        Transaction {
            chain_id: 1,
            block_num: 19_073_244,
            nonce,
            gas_limit: 21_000,
            from: address!("6c2843ba78feb261798be1aac579d1a4ae2c64b4"),
            to: address!("2f19e5c3c66c44e6405d4c200fe064ece9bc253a"),
            ..Default::default()
        }
    }

    #[test]
    fn test_first_transaction_output() {
        let input = DataInput::builder(AccountAgeCircuit.allocate())
            .add_transaction(tx(0), 0)
            .build()
            .unwrap();
        let bytes = evaluate(&AccountAgeCircuit, &input).unwrap().encode_packed();
        assert_eq!(bytes.len(), 20 + 8);
        assert_eq!(&bytes[..20], tx(0).from.as_slice());
        assert_eq!(&bytes[20..], &19_073_244u64.to_be_bytes());
    }

    #[test]
    fn test_later_transaction_fails() {
        let input = DataInput::builder(AccountAgeCircuit.allocate())
            .add_transaction(tx(7), 0)
            .build()
            .unwrap();
        assert_eq!(
            evaluate(&AccountAgeCircuit, &input),
            Err(Error::Circuit(CircuitError::ValidationFailed {
                slot: 0,
                mismatch: Mismatch::Nonce,
            }))
        );
    }

    #[test]
    fn test_inactive_later_transaction_fails() {
        let mut input = DataInput::builder(AccountAgeCircuit.allocate()).build().unwrap();
        input.transactions.values[0] = tx(7);
        assert_eq!(
            evaluate(&AccountAgeCircuit, &input),
            Err(Error::Circuit(CircuitError::ValidationFailed {
                slot: 0,
                mismatch: Mismatch::InactiveSlot,
            }))
        );
    }

    #[test]
    fn test_missing_transaction_fails() {
        let input = DataInput::builder(AccountAgeCircuit.allocate()).build().unwrap();
        assert!(matches!(
            evaluate(&AccountAgeCircuit, &input),
            Err(Error::Circuit(CircuitError::ValidationFailed {
                mismatch: Mismatch::InactiveSlot,
                ..
            }))
        ));
    }
}
