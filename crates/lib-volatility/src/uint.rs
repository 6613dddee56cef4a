//! The 248-bit unsigned domain every circuit value lives in.
//!
//! Arithmetic mirrors what a constraint system over a ~254-bit prime field can
//! represent without wrapping: values stay below `2^248`, and leaving that range
//! is a bug in the circuit rather than a runtime condition. The operator impls
//! therefore panic, the same way native Rust integers do in debug builds.

use std::fmt;
use std::ops::{Add, Mul, Sub};

use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Width of the usable domain in bits.
pub const UINT248_BITS: usize = 248;

/// Number of iterations of the fixed bitwise square-root search.
const SQRT_STEPS: usize = UINT248_BITS / 2;

/// An unsigned integer strictly below `2^248`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "U256", into = "U256")]
pub struct Uint248(U256);

impl Uint248 {
    pub const ZERO: Self = Self(U256([0, 0, 0, 0]));
    pub const ONE: Self = Self(U256([1, 0, 0, 0]));
    pub const MAX: Self = Self(U256([u64::MAX, u64::MAX, u64::MAX, (1u64 << 56) - 1]));

    /// Wraps a `U256`, returning `None` if it does not fit in 248 bits.
    pub fn new(value: U256) -> Option<Self> {
        (value.bits() <= UINT248_BITS).then_some(Self(value))
    }

    /// Keeps only the low 248 bits of `value`.
    pub fn truncate(value: U256) -> Self {
        Self(value & Self::MAX.0)
    }

    pub const fn from_u64(value: u64) -> Self {
        Self(U256([value, 0, 0, 0]))
    }

    /// `2^exp`, for `exp < 248`.
    pub fn pow2(exp: usize) -> Self {
        assert!(exp < UINT248_BITS, "2^{exp} does not fit in Uint248");
        Self(U256::one() << exp)
    }

    pub fn bits(&self) -> usize {
        self.0.bits()
    }

    /// Big-endian bytes of the full 256-bit word (top byte is always zero).
    pub fn to_be_bytes(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        self.0.to_big_endian(&mut out);
        out
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).and_then(Self::new)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    pub fn checked_mul(self, rhs: Self) -> Option<Self> {
        self.0.checked_mul(rhs.0).and_then(Self::new)
    }

    /// Floor division; the remainder is discarded. `None` on a zero divisor.
    pub fn checked_div(self, rhs: Self) -> Option<Self> {
        self.div_rem(rhs).map(|(quotient, _)| quotient)
    }

    /// Quotient and remainder, `None` on a zero divisor.
    pub fn div_rem(self, rhs: Self) -> Option<(Self, Self)> {
        if rhs.0.is_zero() {
            return None;
        }
        let (quotient, remainder) = self.0.div_mod(rhs.0);
        Some((Self(quotient), Self(remainder)))
    }

    pub fn shr(self, bits: usize) -> Self {
        Self(self.0 >> bits)
    }

    /// The low `bits` bits of the value, little-endian bit order.
    pub fn low_bits(self, bits: usize) -> Self {
        if bits >= UINT248_BITS {
            return self;
        }
        Self(self.0 & ((U256::one() << bits) - U256::one()))
    }

    pub fn is_equal(self, rhs: Self) -> Bit {
        Bit(self == rhs)
    }

    pub fn is_less_than(self, rhs: Self) -> Bit {
        Bit(self < rhs)
    }

    pub fn is_zero(self) -> Bit {
        Bit(self.0.is_zero())
    }

    /// `|self - rhs|` without a data-dependent branch: the larger operand is
    /// picked by `select` and the smaller one subtracted from it.
    pub fn abs_diff(self, rhs: Self) -> Self {
        let lt = self.is_less_than(rhs);
        select(lt, rhs, self) - select(lt, self, rhs)
    }

    /// Floor square root: the unique `r` with `r*r <= self < (r+1)*(r+1)`.
    ///
    /// Runs a fixed number of steps regardless of the input, setting one
    /// result bit per step from the most significant down.
    pub fn sqrt(self) -> Self {
        let mut root = Self::ZERO;
        for bit in (0..SQRT_STEPS).rev() {
            let candidate = root + Self::pow2(bit);
            let fits = self.is_less_than(candidate * candidate).not();
            root = select(fits, candidate, root);
        }
        root
    }
}

impl TryFrom<U256> for Uint248 {
    type Error = String;

    fn try_from(value: U256) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("{value} exceeds 248 bits"))
    }
}

impl From<Uint248> for U256 {
    fn from(value: Uint248) -> Self {
        value.0
    }
}

impl From<u64> for Uint248 {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl fmt::Display for Uint248 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Uint248 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        match self.checked_add(rhs) {
            Some(sum) => sum,
            None => panic!("Uint248 overflow: {self} + {rhs}"),
        }
    }
}

impl Sub for Uint248 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        match self.checked_sub(rhs) {
            Some(difference) => difference,
            None => panic!("Uint248 underflow: {self} - {rhs}"),
        }
    }
}

impl Mul for Uint248 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        match self.checked_mul(rhs) {
            Some(product) => product,
            None => panic!("Uint248 overflow: {self} * {rhs}"),
        }
    }
}

/// A boolean circuit value, always 0 or 1.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bit(bool);

impl Bit {
    pub const ZERO: Self = Self(false);
    pub const ONE: Self = Self(true);

    pub fn as_bool(self) -> bool {
        self.0
    }

    pub fn as_uint(self) -> Uint248 {
        if self.0 {
            Uint248::ONE
        } else {
            Uint248::ZERO
        }
    }

    pub fn and(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }

    pub fn or(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }

    pub fn not(self) -> Self {
        Self(!self.0)
    }
}

impl From<bool> for Bit {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

/// Oblivious selection: `cond * a + (1 - cond) * b`.
pub fn select(cond: Bit, a: Uint248, b: Uint248) -> Uint248 {
    let c = cond.as_uint();
    c * a + (Uint248::ONE - c) * b
}
