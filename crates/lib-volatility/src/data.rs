//! Raw chain records as handed over by the retrieval layer, and the toggled
//! fixed-capacity containers a circuit consumes.

use std::fmt;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::config::Capacities;
use crate::error::InputError;
use crate::stream::MaskedSeq;
use crate::uint::Bit;

/// Log fields carried per receipt.
pub const LOG_FIELDS_PER_RECEIPT: usize = 3;

/// One field extracted from an event log.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogField {
    pub contract: Address,
    pub log_index: u64,
    pub event_id: B256,
    /// Whether the field is an indexed topic rather than part of the data.
    pub is_topic: bool,
    pub field_index: u8,
    pub value: U256,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub block_num: u64,
    pub tx_hash: B256,
    pub fields: [LogField; LOG_FIELDS_PER_RECEIPT],
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSlot {
    pub block_num: u64,
    pub address: Address,
    pub slot: B256,
    pub value: U256,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub chain_id: u64,
    pub block_num: u64,
    pub nonce: u64,
    pub gas_tip_cap_or_gas_price: U256,
    pub gas_fee_cap: U256,
    pub gas_limit: u64,
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// The three kinds of input a circuit can allocate slots for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    Receipt,
    Storage,
    Transaction,
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InputKind::Receipt => "receipt",
            InputKind::Storage => "storage",
            InputKind::Transaction => "transaction",
        })
    }
}

/// Values with one activity toggle each.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggled<T> {
    pub values: Vec<T>,
    pub toggles: Vec<bool>,
}

impl<T: Clone> Toggled<T> {
    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    pub fn to_stream(&self) -> MaskedSeq<T> {
        MaskedSeq::new(self.values.clone(), self.toggles.iter().copied().map(Bit::from).collect())
    }

    fn check_shape(&self, kind: InputKind, expected: usize) -> Result<(), InputError> {
        if self.values.len() != self.toggles.len() {
            return Err(InputError::ToggleLengthMismatch {
                kind,
                values: self.values.len(),
                toggles: self.toggles.len(),
            });
        }
        if self.values.len() != expected {
            return Err(InputError::ShapeMismatch { kind, expected, actual: self.values.len() });
        }
        Ok(())
    }
}

/// Everything a circuit reads during one evaluation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataInput {
    pub receipts: Toggled<Receipt>,
    pub storage: Toggled<StorageSlot>,
    pub transactions: Toggled<Transaction>,
}

impl DataInput {
    pub fn builder(capacities: Capacities) -> DataInputBuilder {
        DataInputBuilder {
            capacities,
            receipts: Vec::new(),
            storage: Vec::new(),
            transactions: Vec::new(),
        }
    }

    /// Checks that every container matches the circuit's allocation.
    pub fn check_shape(&self, capacities: &Capacities) -> Result<(), InputError> {
        self.receipts.check_shape(InputKind::Receipt, capacities.receipts)?;
        self.storage.check_shape(InputKind::Storage, capacities.storage)?;
        self.transactions.check_shape(InputKind::Transaction, capacities.transactions)
    }
}

/// Places records at explicit slot indices and pads the rest.
#[derive(Clone, Debug)]
pub struct DataInputBuilder {
    capacities: Capacities,
    receipts: Vec<(usize, Receipt)>,
    storage: Vec<(usize, StorageSlot)>,
    transactions: Vec<(usize, Transaction)>,
}

impl DataInputBuilder {
    pub fn add_receipt(mut self, receipt: Receipt, index: usize) -> Self {
        self.receipts.push((index, receipt));
        self
    }

    pub fn add_storage(mut self, slot: StorageSlot, index: usize) -> Self {
        self.storage.push((index, slot));
        self
    }

    pub fn add_transaction(mut self, tx: Transaction, index: usize) -> Self {
        self.transactions.push((index, tx));
        self
    }

    pub fn build(self) -> Result<DataInput, InputError> {
        Ok(DataInput {
            receipts: place(InputKind::Receipt, self.capacities.receipts, self.receipts)?,
            storage: place(InputKind::Storage, self.capacities.storage, self.storage)?,
            transactions: place(
                InputKind::Transaction,
                self.capacities.transactions,
                self.transactions,
            )?,
        })
    }
}

fn place<T: Clone + Default>(
    kind: InputKind,
    capacity: usize,
    records: Vec<(usize, T)>,
) -> Result<Toggled<T>, InputError> {
    let mut values = vec![T::default(); capacity];
    let mut toggles = vec![false; capacity];
    for (index, record) in records {
        if index >= capacity {
            return Err(InputError::CapacityExceeded { kind, index, capacity });
        }
        if toggles[index] {
            return Err(InputError::DuplicateIndex { kind, index });
        }
        values[index] = record;
        toggles[index] = true;
    }
    // Reductions assume the active slots form a prefix.
    if let Some(gap) = toggles.iter().position(|t| !t) {
        if let Some(offset) = toggles[gap..].iter().position(|t| *t) {
            return Err(InputError::NonContiguous { kind, index: gap + offset });
        }
    }
    Ok(Toggled { values, toggles })
}
