use tracing::info;

use crate::circuit::AppCircuit;
use crate::config::{Capacities, PriceSource, PrimaryOutput, VolatilityConfig};
use crate::data::DataInput;
use crate::error::{CircuitResult, Error};
use crate::output::{CircuitOutput, BLOCK_NUMBER_BITS};
use crate::stats::{self, StatResult};
use crate::stream::MaskedSeq;
use crate::uint::Uint248;
use crate::validate::{assert_each, WithRange};

/// Index of the price-bearing field within a receipt's log fields.
pub const PRICE_FIELD_SLOT: usize = 0;

/// Statistics plus the emitted output of one evaluation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub stats: StatResult,
    pub output: CircuitOutput,
}

/// Proves mean, variance and volatility of a pool's price over attested
/// swap events or `slot0` storage words.
#[derive(Clone, Debug, Default)]
pub struct VolatilityCircuit {
    config: VolatilityConfig,
}

impl VolatilityCircuit {
    pub fn new(config: VolatilityConfig) -> Self {
        VolatilityCircuit { config }
    }

    pub fn config(&self) -> &VolatilityConfig {
        &self.config
    }

    /// Shape check followed by a full run.
    pub fn evaluate(&self, input: &DataInput) -> Result<Evaluation, Error> {
        input.check_shape(&self.allocate())?;
        Ok(self.run(input)?)
    }

    pub fn run(&self, input: &DataInput) -> CircuitResult<Evaluation> {
        let (prices, blocks) = self.attested_prices(input)?;
        let stats = stats::compute(&prices, &self.config.stats)?;

        let layout = &self.config.output;
        let mut output = CircuitOutput::new();
        let primary = match layout.primary {
            PrimaryOutput::Volatility => stats.volatility,
            PrimaryOutput::Mean => stats.mean,
        };
        output.output_uint(layout.bits, primary);
        if layout.include_block_number {
            output.output_uint(BLOCK_NUMBER_BITS, blocks.last_active());
        }
        if layout.include_contract {
            output.output_address(self.config.attested_contract());
        }
        Ok(Evaluation { stats, output })
    }

    /// Asserts provenance over the configured source and decodes its prices.
    /// Returns the prices and the block number of each record.
    fn attested_prices(
        &self,
        input: &DataInput,
    ) -> CircuitResult<(MaskedSeq<Uint248>, MaskedSeq<Uint248>)> {
        let decoder = &self.config.decoder;
        let (words, blocks) = match self.config.source {
            PriceSource::Receipts => {
                let receipts = input.receipts.to_stream();
                let fields = receipts.map(|r| r.fields[PRICE_FIELD_SLOT].clone());
                let provenance = &self.config.receipt_provenance;
                assert_each(&fields, &WithRange { inner: provenance, decoder })?;
                (
                    fields.map(|f| decoder.decode(&f.value)),
                    receipts.map(|r| Uint248::from(r.block_num)),
                )
            }
            PriceSource::Storage => {
                let slots = input.storage.to_stream();
                let provenance = &self.config.storage_provenance;
                assert_each(&slots, &WithRange { inner: provenance, decoder })?;
                (
                    slots.map(|s| decoder.decode(&s.value)),
                    slots.map(|s| Uint248::from(s.block_num)),
                )
            }
        };
        info!(
            source = ?self.config.source,
            active = words.count(),
            capacity = words.capacity(),
            "attested price records"
        );
        let transform = self.config.transform;
        let prices = words.fill_inactive(Uint248::ZERO).map(|w| transform.apply(*w));
        Ok((prices, blocks))
    }
}

impl AppCircuit for VolatilityCircuit {
    fn allocate(&self) -> Capacities {
        self.config.capacities
    }

    fn define(&self, input: &DataInput) -> CircuitResult<CircuitOutput> {
        self.run(input).map(|evaluation| evaluation.output)
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{Address, B256, U256};

    use super::*;
    use crate::config::{
        PriceTransform, ReturnKind, StatsConfig, SLOT0, SWAP_EVENT_ID, USDC_WETH_POOL,
    };
    use crate::data::{LogField, Receipt, StorageSlot};
    use crate::error::{CircuitError, Mismatch};

    fn receipt(block_num: u64, value: u64) -> Receipt {
        let mut r = Receipt { block_num, ..Default::default() };
        r.fields[PRICE_FIELD_SLOT] = LogField {
            contract: USDC_WETH_POOL,
            log_index: 3,
            event_id: SWAP_EVENT_ID,
            is_topic: false,
            field_index: 2,
            value: U256::from(value),
        };
        r
    }

    fn raw_config(capacity: usize) -> VolatilityConfig {
        VolatilityConfig { transform: PriceTransform::Raw, ..Default::default() }
            .with_receipt_capacity(capacity)
    }

    #[test]
    fn test_receipt_pipeline() {
        let circuit = VolatilityCircuit::new(raw_config(5));
        let input = DataInput::builder(circuit.allocate())
            .add_receipt(receipt(10, 100), 0)
            .add_receipt(receipt(11, 120), 1)
            .add_receipt(receipt(12, 100), 2)
            .add_receipt(receipt(13, 130), 3)
            .build()
            .unwrap();
        let evaluation = circuit.evaluate(&input).unwrap();
        assert_eq!(evaluation.stats.mean, Uint248::from(23));
        assert_eq!(evaluation.stats.variance, Uint248::from(22));
        assert_eq!(evaluation.stats.volatility, Uint248::from(4));
        assert_eq!(evaluation.output.encode_packed().len(), 31);
    }

    #[test]
    fn test_output_extras() {
        let mut config = raw_config(3);
        config.output.primary = PrimaryOutput::Mean;
        config.output.include_block_number = true;
        config.output.include_contract = true;
        let circuit = VolatilityCircuit::new(config);
        let input = DataInput::builder(circuit.allocate())
            .add_receipt(receipt(18_064_070, 100), 0)
            .add_receipt(receipt(18_064_075, 110), 1)
            .build()
            .unwrap();
        let bytes = circuit.define(&input).unwrap().encode_packed();
        assert_eq!(bytes.len(), 31 + 8 + 20);
        assert_eq!(bytes[30], 10);
        assert_eq!(&bytes[31..39], &18_064_075u64.to_be_bytes());
        assert_eq!(&bytes[39..], USDC_WETH_POOL.as_slice());
    }

    #[test]
    fn test_foreign_receipt_fails() {
        let circuit = VolatilityCircuit::new(raw_config(3));
        let mut foreign = receipt(12, 99);
        foreign.fields[PRICE_FIELD_SLOT].contract = Address::repeat_byte(0x11);
        let input = DataInput::builder(circuit.allocate())
            .add_receipt(receipt(10, 100), 0)
            .add_receipt(foreign, 1)
            .build()
            .unwrap();
        assert_eq!(
            circuit.run(&input),
            Err(CircuitError::ValidationFailed { slot: 1, mismatch: Mismatch::Contract })
        );
    }

    #[test]
    fn test_storage_pipeline_with_ratio_returns() {
        let mut config = VolatilityConfig::from_storage(4);
        config.transform = PriceTransform::Raw;
        config.stats = StatsConfig {
            returns: ReturnKind::SquaredRatio { scale: Uint248::from(10_000) },
            ..Default::default()
        };
        let circuit = VolatilityCircuit::new(config);

        let slot = |block_num: u64, price: u64| StorageSlot {
            block_num,
            address: USDC_WETH_POOL,
            slot: SLOT0,
            // tick and observation fields sit above the price
            value: U256::from(price) | (U256::from(0xbeefu64) << 160),
        };
        let input = DataInput::builder(circuit.allocate())
            .add_storage(slot(1, 100), 0)
            .add_storage(slot(2, 110), 1)
            .add_storage(slot(3, 99), 2)
            .build()
            .unwrap();
        let evaluation = circuit.evaluate(&input).unwrap();
        assert_eq!(evaluation.stats.mean, Uint248::from(10_100));
        assert_eq!(evaluation.stats.volatility, Uint248::from(2_000));

        let mut wrong_slot = input.clone();
        wrong_slot.storage.values[0].slot = B256::repeat_byte(1);
        assert!(matches!(
            circuit.run(&wrong_slot),
            Err(CircuitError::ValidationFailed { slot: 0, mismatch: Mismatch::StorageSlot })
        ));
    }

    #[test]
    fn test_shape_mismatch_is_an_input_error() {
        let circuit = VolatilityCircuit::new(raw_config(3));
        let input = DataInput::builder(raw_config(4).capacities).build().unwrap();
        assert!(matches!(circuit.evaluate(&input), Err(Error::Input(_))));
    }
}
