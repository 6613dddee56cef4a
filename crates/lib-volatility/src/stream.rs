//! Fixed-capacity sequences paired with a toggle mask.
//!
//! Every operation costs the same for a given capacity no matter how many
//! slots are active. Inactive slots still flow through `map` and `zip2`; only
//! the reductions consult the mask, and they do it by multiplying rather than
//! by skipping.

use crate::error::{CircuitError, CircuitResult};
use crate::uint::{select, Bit, Uint248};

/// A sequence of `T` with one toggle per slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskedSeq<T> {
    values: Vec<T>,
    toggles: Vec<Bit>,
}

impl<T> MaskedSeq<T> {
    /// # Panics
    /// Panics if `values` and `toggles` differ in length. Capacities are fixed
    /// when the circuit is laid out, so a mismatch is a wiring bug.
    pub fn new(values: Vec<T>, toggles: Vec<Bit>) -> Self {
        assert_eq!(
            values.len(),
            toggles.len(),
            "values and toggles must have the same capacity"
        );
        MaskedSeq { values, toggles }
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn toggles(&self) -> &[Bit] {
        &self.toggles
    }

    /// The value in slot `index`, active or not.
    pub fn get_underlying(&self, index: usize) -> &T {
        &self.values[index]
    }

    /// Number of active slots.
    pub fn count(&self) -> usize {
        self.toggles.iter().filter(|t| t.as_bool()).count()
    }

    /// Applies `f` to every slot; the mask is carried over unchanged.
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> MaskedSeq<U> {
        MaskedSeq {
            values: self.values.iter().map(f).collect(),
            toggles: self.toggles.clone(),
        }
    }

    /// The window of slots `[lo, hi)` with their toggles.
    ///
    /// With toggles forming an active prefix, `range(0, n - 1)` and
    /// `range(1, n)` line up each element with its successor.
    pub fn range(&self, lo: usize, hi: usize) -> MaskedSeq<T>
    where
        T: Clone,
    {
        assert!(
            lo <= hi && hi <= self.capacity(),
            "range [{lo}, {hi}) out of capacity {}",
            self.capacity()
        );
        MaskedSeq {
            values: self.values[lo..hi].to_vec(),
            toggles: self.toggles[lo..hi].to_vec(),
        }
    }

    /// Evaluates `predicate` on every slot and returns the first active slot
    /// where it does not hold. Inactive slots are exempt.
    pub fn first_violation(&self, predicate: impl Fn(&T) -> Bit) -> Option<usize> {
        let violations = self.map(|value| predicate(value).not());
        let any = violations
            .values
            .iter()
            .zip(&violations.toggles)
            .fold(Bit::ZERO, |acc, (v, t)| acc.or(v.and(*t)));
        if !any.as_bool() {
            return None;
        }
        violations
            .values
            .iter()
            .zip(&violations.toggles)
            .position(|(v, t)| v.and(*t).as_bool())
    }
}

/// Combines two equal-capacity sequences slot by slot. A slot is active only
/// if it is active in both inputs.
pub fn zip2<A, B, U>(a: &MaskedSeq<A>, b: &MaskedSeq<B>, f: impl Fn(&A, &B) -> U) -> MaskedSeq<U> {
    assert_eq!(a.capacity(), b.capacity(), "zip2 requires equal capacities");
    MaskedSeq {
        values: a.values.iter().zip(&b.values).map(|(x, y)| f(x, y)).collect(),
        toggles: a.toggles.iter().zip(&b.toggles).map(|(x, y)| x.and(*y)).collect(),
    }
}

impl MaskedSeq<Uint248> {
    /// Replaces every inactive value with `filler` so later non-linear maps
    /// never see padding.
    pub fn fill_inactive(&self, filler: Uint248) -> MaskedSeq<Uint248> {
        MaskedSeq {
            values: self
                .values
                .iter()
                .zip(&self.toggles)
                .map(|(v, t)| select(*t, *v, filler))
                .collect(),
            toggles: self.toggles.clone(),
        }
    }

    /// `sum(value[i] * toggle[i])`.
    pub fn sum(&self) -> Uint248 {
        self.values
            .iter()
            .zip(&self.toggles)
            .fold(Uint248::ZERO, |acc, (v, t)| acc + *v * t.as_uint())
    }

    /// Floor of `sum / count`.
    pub fn mean(&self) -> CircuitResult<Uint248> {
        let count = Uint248::from(self.count() as u64);
        self.sum()
            .checked_div(count)
            .ok_or(CircuitError::DivisionUndefined {
                what: "mean of a sequence with no active slots",
            })
    }

    /// Smallest active value, or `Uint248::MAX` when nothing is active.
    pub fn min(&self) -> Uint248 {
        self.values
            .iter()
            .zip(&self.toggles)
            .fold(Uint248::MAX, |acc, (v, t)| {
                let take = t.and(v.is_less_than(acc));
                select(take, *v, acc)
            })
    }

    /// Value of the last active slot, zero when nothing is active.
    pub fn last_active(&self) -> Uint248 {
        self.values
            .iter()
            .zip(&self.toggles)
            .fold(Uint248::ZERO, |acc, (v, t)| select(*t, *v, acc))
    }
}
