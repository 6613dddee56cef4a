use alloy_primitives::{Address, U256};
use lib_volatility::config::{PriceTransform, StatsBasis, SWAP_EVENT_ID, USDC_WETH_POOL};
use lib_volatility::{
    evaluate, CircuitError, DataInput, Error, LogField, Mismatch, Receipt, Uint248,
    VolatilityCircuit, VolatilityConfig,
};

fn swap(block_num: u64, price: U256) -> Receipt {
    let mut receipt = Receipt { block_num, ..Default::default() };
    receipt.fields[0] = LogField {
        contract: USDC_WETH_POOL,
        log_index: 3,
        event_id: SWAP_EVENT_ID,
        is_topic: false,
        field_index: 2,
        value: price,
    };
    receipt
}

fn circuit(capacity: usize, basis: StatsBasis) -> VolatilityCircuit {
    let mut config = VolatilityConfig::default().with_receipt_capacity(capacity);
    config.transform = PriceTransform::Raw;
    config.stats.basis = basis;
    VolatilityCircuit::new(config)
}

fn input(circuit: &VolatilityCircuit, receipts: Vec<Receipt>) -> DataInput {
    use lib_volatility::AppCircuit;
    receipts
        .into_iter()
        .enumerate()
        .fold(DataInput::builder(circuit.allocate()), |b, (i, r)| b.add_receipt(r, i))
        .build()
        .unwrap()
}

#[test]
fn padding_never_changes_the_result() {
    let prices = [100u64, 110, 99];
    let tight = circuit(3, StatsBasis::Returns);
    let roomy = circuit(5, StatsBasis::Returns);

    let records: Vec<_> = prices
        .iter()
        .enumerate()
        .map(|(i, p)| swap(i as u64, U256::from(*p)))
        .collect();
    let mut padded = input(&roomy, records.clone());
    // Well-formed garbage in the inactive slots.
    padded.receipts.values[3] = swap(77, U256::from(1u64) << 150);
    padded.receipts.values[4].fields[0].contract = Address::repeat_byte(0xaa);

    let a = tight.evaluate(&input(&tight, records)).unwrap();
    let b = roomy.evaluate(&padded).unwrap();
    assert_eq!(a.stats, b.stats);
    assert_eq!(a.output, b.output);
}

#[test]
fn regression_fixture() {
    let c = circuit(3, StatsBasis::Returns);
    let records = [100u64, 110, 99].iter().map(|p| swap(1, U256::from(*p))).collect();
    let evaluation = c.evaluate(&input(&c, records)).unwrap();
    // Returns [10, 11]: floor mean 10, population variance floor(1 / 2) = 0.
    assert_eq!(evaluation.stats.mean, Uint248::from(10));
    assert_eq!(evaluation.stats.variance, Uint248::ZERO);
    assert_eq!(evaluation.stats.volatility, Uint248::ZERO);
    assert_eq!(evaluation.stats.samples, 2);
}

#[test]
fn single_record() {
    let prices = circuit(4, StatsBasis::Prices);
    let evaluation = prices.evaluate(&input(&prices, vec![swap(1, U256::from(500u64))])).unwrap();
    assert_eq!(evaluation.stats.mean, Uint248::from(500));
    assert_eq!(evaluation.stats.variance, Uint248::ZERO);

    let returns = circuit(1, StatsBasis::Returns);
    let err = evaluate(&returns, &input(&returns, vec![swap(1, U256::from(500u64))])).unwrap_err();
    assert!(matches!(err, Error::Circuit(CircuitError::DivisionUndefined { .. })));
}

#[test]
fn no_active_records() {
    let c = circuit(3, StatsBasis::Prices);
    assert!(matches!(
        c.evaluate(&input(&c, Vec::new())),
        Err(Error::Circuit(CircuitError::DivisionUndefined { .. }))
    ));
}

#[test]
fn foreign_contract_rejected_only_when_active() {
    let c = circuit(3, StatsBasis::Prices);
    let mut foreign = swap(3, U256::from(99u64));
    foreign.fields[0].contract = Address::repeat_byte(0x42);

    let active = input(
        &c,
        vec![swap(1, U256::from(100u64)), swap(2, U256::from(110u64)), foreign.clone()],
    );
    assert_eq!(
        c.evaluate(&active).unwrap_err(),
        Error::Circuit(CircuitError::ValidationFailed { slot: 2, mismatch: Mismatch::Contract })
    );

    let mut inactive = input(&c, vec![swap(1, U256::from(100u64)), swap(2, U256::from(110u64))]);
    inactive.receipts.values[2] = foreign;
    assert!(c.evaluate(&inactive).is_ok());
}

#[test]
fn default_circuit_pins_pool_provenance() {
    // Swaps from another pool with a matching event and layout.
    let other_pool = Address::repeat_byte(0x66);
    let mut records = vec![swap(1, U256::from(100u64)), swap(2, U256::from(110u64))];
    for r in &mut records {
        r.fields[0].contract = other_pool;
    }

    let pinned = VolatilityCircuit::default();
    assert_eq!(pinned.config().receipt_provenance.contract, USDC_WETH_POOL);
    assert_eq!(
        pinned.evaluate(&input(&pinned, records.clone())),
        Err(Error::Circuit(CircuitError::ValidationFailed {
            slot: 0,
            mismatch: Mismatch::Contract,
        }))
    );

    // Only an explicitly different configuration accepts them.
    let mut config = VolatilityConfig::default();
    config.receipt_provenance.contract = other_pool;
    let retargeted = VolatilityCircuit::new(config);
    assert!(retargeted.evaluate(&input(&retargeted, records)).is_ok());
}

#[test]
fn sqrt_price_x96_swaps() {
    // sqrtPriceX96 values around 18_000 * 2^96, as seen on the USDC/WETH pool.
    let q96 = U256::from(1u64) << 96;
    let mut config = VolatilityConfig::default();
    config.stats.volatility_scale = Uint248::from(100);
    let c = VolatilityCircuit::new(config);
    let records = [18_000u64, 18_010, 17_990]
        .iter()
        .enumerate()
        .map(|(i, root)| swap(i as u64, U256::from(*root) * q96))
        .collect();
    let evaluation = c.evaluate(&input(&c, records)).unwrap();
    // Prices 324_000_000, 324_360_100, 323_640_100 → returns 360_100, 720_000.
    assert_eq!(evaluation.stats.mean, Uint248::from(540_050));
    assert_eq!(evaluation.stats.variance, Uint248::from(32_382_002_500));
    assert_eq!(evaluation.stats.volatility, Uint248::from(1_799_500));
}

#[test]
fn config_and_input_from_json() {
    let config: VolatilityConfig = serde_json::from_str(
        r#"{
            "capacities": { "receipts": 2, "storage": 0, "transactions": 0 },
            "transform": "raw"
        }"#,
    )
    .unwrap();
    let c = VolatilityCircuit::new(config);
    let data = input(&c, vec![swap(1, U256::from(3u64)), swap(2, U256::from(9u64))]);
    let json = serde_json::to_string(&data).unwrap();
    let back: DataInput = serde_json::from_str(&json).unwrap();
    assert_eq!(back, data);
    assert_eq!(c.evaluate(&back).unwrap().stats.mean, Uint248::from(6));
}
