//! Compiled-in circuit parameters.
//!
//! A configuration is fixed before the circuit is laid out and never changes
//! during an evaluation. The defaults describe the USDC/WETH 0.05% Uniswap V3
//! pool on Ethereum mainnet.

use alloy_primitives::{address, b256, Address, B256};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::decode::FieldDecoder;
use crate::output::check_width;
use crate::uint::{Uint248, UINT248_BITS};

/// USDC/WETH 0.05% pool.
pub const USDC_WETH_POOL: Address = address!("88e6a0c2ddd26feeb64f039a2c41296fcb3f5640");

/// Solidity signature of the Uniswap V3 `Swap` event.
pub const SWAP_EVENT_SIGNATURE: &str = "Swap(address,address,int256,int256,uint160,uint128,int24)";

/// `keccak256(SWAP_EVENT_SIGNATURE)`.
pub const SWAP_EVENT_ID: B256 =
    b256!("c42079f94a6350d7e6235f29174924f928cc2ac818eb64fed8004e115fbcca67");

/// `sqrtPriceX96` is the third non-indexed field of `Swap`.
pub const SQRT_PRICE_FIELD_INDEX: u8 = 2;

/// `slot0` holds `sqrtPriceX96` in its low 160 bits.
pub const SLOT0: B256 = B256::ZERO;

/// Fixed-point shift of `sqrtPriceX96`.
pub const X96_SHIFT: usize = 96;

/// Derives an event id (topic 0) from its Solidity signature.
pub fn event_id(signature: &str) -> B256 {
    B256::from_slice(&Keccak256::digest(signature.as_bytes()))
}

/// Maximum number of slots per input kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capacities {
    pub receipts: usize,
    pub storage: usize,
    pub transactions: usize,
}

/// Expected origin of a price-bearing log field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptProvenance {
    pub contract: Address,
    pub event_id: B256,
    pub field_index: u8,
}

impl Default for ReceiptProvenance {
    fn default() -> Self {
        ReceiptProvenance {
            contract: USDC_WETH_POOL,
            event_id: SWAP_EVENT_ID,
            field_index: SQRT_PRICE_FIELD_INDEX,
        }
    }
}

/// Expected origin of a price-bearing storage word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProvenance {
    pub contract: Address,
    pub slot: B256,
}

impl Default for StorageProvenance {
    fn default() -> Self {
        StorageProvenance { contract: USDC_WETH_POOL, slot: SLOT0 }
    }
}

/// Where prices are read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    #[default]
    Receipts,
    Storage,
}

/// How a decoded field becomes a price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTransform {
    /// The decoded field is the price.
    Raw,
    /// `price = ((sqrtPriceX96 * precision) >> 96)^2`. A precision of one
    /// gives the plain integer `(sqrtPriceX96 / 2^96)^2`.
    SqrtPriceX96 { precision: Uint248 },
}

impl Default for PriceTransform {
    fn default() -> Self {
        PriceTransform::SqrtPriceX96 { precision: Uint248::ONE }
    }
}

/// Which series the statistics are taken over.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatsBasis {
    #[default]
    Returns,
    Prices,
}

/// Definition of the return between two consecutive prices. The two variants
/// give different numbers and are not interchangeable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    /// `|next - prev|`.
    #[default]
    AbsoluteDifference,
    /// Squared gross return in `scale` fixed point:
    /// `q = next * scale / prev`, `r = q * q / scale`.
    SquaredRatio { scale: Uint248 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsConfig {
    pub basis: StatsBasis,
    pub returns: ReturnKind,
    /// Multiplied into the variance before the square root.
    pub volatility_scale: Uint248,
}

impl Default for StatsConfig {
    fn default() -> Self {
        StatsConfig {
            basis: StatsBasis::Returns,
            returns: ReturnKind::AbsoluteDifference,
            volatility_scale: Uint248::ONE,
        }
    }
}

/// The scalar published first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryOutput {
    #[default]
    Volatility,
    Mean,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOutputLayout")]
pub struct OutputLayout {
    pub primary: PrimaryOutput,
    pub bits: usize,
    /// Append the block number of the last active record (64 bits).
    pub include_block_number: bool,
    /// Append the attested contract address (160 bits).
    pub include_contract: bool,
}

#[derive(Deserialize)]
struct RawOutputLayout {
    primary: PrimaryOutput,
    bits: usize,
    include_block_number: bool,
    include_contract: bool,
}

impl TryFrom<RawOutputLayout> for OutputLayout {
    type Error = String;

    fn try_from(raw: RawOutputLayout) -> Result<Self, Self::Error> {
        check_width(raw.bits)?;
        Ok(OutputLayout {
            primary: raw.primary,
            bits: raw.bits,
            include_block_number: raw.include_block_number,
            include_contract: raw.include_contract,
        })
    }
}

impl Default for OutputLayout {
    fn default() -> Self {
        OutputLayout {
            primary: PrimaryOutput::Volatility,
            bits: UINT248_BITS,
            include_block_number: false,
            include_contract: false,
        }
    }
}

/// Full configuration of the volatility circuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolatilityConfig {
    pub capacities: Capacities,
    pub source: PriceSource,
    pub receipt_provenance: ReceiptProvenance,
    pub storage_provenance: StorageProvenance,
    pub decoder: FieldDecoder,
    pub transform: PriceTransform,
    pub stats: StatsConfig,
    pub output: OutputLayout,
}

impl Default for VolatilityConfig {
    fn default() -> Self {
        VolatilityConfig {
            capacities: Capacities { receipts: 3, storage: 0, transactions: 0 },
            source: PriceSource::Receipts,
            receipt_provenance: ReceiptProvenance::default(),
            storage_provenance: StorageProvenance::default(),
            decoder: FieldDecoder::default(),
            transform: PriceTransform::default(),
            stats: StatsConfig::default(),
            output: OutputLayout::default(),
        }
    }
}

impl VolatilityConfig {
    /// Reads storage slot 0 instead of swap events, with `capacity` slots.
    pub fn from_storage(capacity: usize) -> Self {
        VolatilityConfig {
            capacities: Capacities { receipts: 0, storage: capacity, transactions: 0 },
            source: PriceSource::Storage,
            ..Default::default()
        }
    }

    pub fn with_receipt_capacity(mut self, capacity: usize) -> Self {
        self.capacities = Capacities { receipts: capacity, storage: 0, transactions: 0 };
        self.source = PriceSource::Receipts;
        self
    }

    /// The address emitted when `include_contract` is set.
    pub fn attested_contract(&self) -> Address {
        match self.source {
            PriceSource::Receipts => self.receipt_provenance.contract,
            PriceSource::Storage => self.storage_provenance.contract,
        }
    }
}
