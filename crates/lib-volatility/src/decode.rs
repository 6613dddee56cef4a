//! Extraction of a packed numeric field from a 256-bit word.
//!
//! Uniswap V3 packs `sqrtPriceX96` into the low 160 bits of both the `Swap`
//! event data word and storage slot 0, so that is the default layout.

use alloy_primitives::U256 as Word;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::uint::{Bit, Uint248, UINT248_BITS};

/// Width of `sqrtPriceX96`.
pub const PRICE_FIELD_BITS: usize = 160;

/// What happens to bits above the declared width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodePolicy {
    /// High bits are dropped silently.
    #[default]
    Truncate,
    /// High bits must be zero; the check joins the record's provenance
    /// assertion as a `FieldRange` conjunct.
    Strict,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldDecoder")]
pub struct FieldDecoder {
    pub bits: usize,
    pub policy: DecodePolicy,
}

#[derive(Deserialize)]
struct RawFieldDecoder {
    bits: usize,
    #[serde(default)]
    policy: DecodePolicy,
}

impl TryFrom<RawFieldDecoder> for FieldDecoder {
    type Error = String;

    fn try_from(raw: RawFieldDecoder) -> Result<Self, Self::Error> {
        FieldDecoder::try_new(raw.bits, raw.policy)
    }
}

impl Default for FieldDecoder {
    fn default() -> Self {
        FieldDecoder { bits: PRICE_FIELD_BITS, policy: DecodePolicy::Truncate }
    }
}

impl FieldDecoder {
    /// # Panics
    /// Panics if `bits` is zero or exceeds the 248-bit domain.
    pub fn new(bits: usize, policy: DecodePolicy) -> Self {
        match Self::try_new(bits, policy) {
            Ok(decoder) => decoder,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(bits: usize, policy: DecodePolicy) -> Result<Self, String> {
        if bits == 0 || bits > UINT248_BITS {
            return Err(format!("field width {bits} outside 1..=248"));
        }
        Ok(FieldDecoder { bits, policy })
    }

    /// The low `bits` bits of `word`.
    pub fn decode(&self, word: &Word) -> Uint248 {
        Uint248::truncate(to_u256(word)).low_bits(self.bits)
    }

    /// 1 when `word` has no bits set above the declared width.
    pub fn in_range(&self, word: &Word) -> Bit {
        Bit::from((to_u256(word) >> self.bits).is_zero())
    }

    /// Whether this decoder contributes a range conjunct.
    pub fn is_strict(&self) -> bool {
        self.policy == DecodePolicy::Strict
    }
}

pub(crate) fn to_u256(word: &Word) -> U256 {
    U256::from_big_endian(&word.to_be_bytes::<32>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ignores_high_bits() {
        let decoder = FieldDecoder::default();
        let price = Word::from(1_987_654_321_u64);
        let packed = price | (Word::from(0x7fu64) << 160) | (Word::from(1u64) << 255);
        assert_eq!(decoder.decode(&packed), Uint248::from(1_987_654_321));
        assert_eq!(decoder.decode(&price), decoder.decode(&packed));
    }

    #[test]
    fn test_decode_full_width_price() {
        let decoder = FieldDecoder::default();
        let max_price = (Word::from(1u64) << 160) - Word::from(1u64);
        assert_eq!(decoder.decode(&max_price).bits(), 160);
    }

    #[test]
    fn test_range_check() {
        let decoder = FieldDecoder::new(160, DecodePolicy::Strict);
        assert!(decoder.is_strict());
        assert!(decoder.in_range(&Word::from(42u64)).as_bool());
        assert!(!decoder.in_range(&(Word::from(1u64) << 160)).as_bool());
    }

    #[test]
    fn test_deserialize_checks_width() {
        let decoder: FieldDecoder = serde_json::from_str(r#"{ "bits": 96 }"#).unwrap();
        assert_eq!(decoder, FieldDecoder::new(96, DecodePolicy::Truncate));
        assert!(serde_json::from_str::<FieldDecoder>(r#"{ "bits": 0 }"#).is_err());
        let wide = r#"{ "bits": 256, "policy": "strict" }"#;
        assert!(serde_json::from_str::<FieldDecoder>(wide).is_err());
    }

    #[test]
    #[should_panic]
    fn test_rejects_oversized_width() {
        FieldDecoder::new(256, DecodePolicy::Truncate);
    }
}
