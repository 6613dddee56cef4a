//! Mean, variance and volatility over a masked price sequence.
//!
//! All divisions floor. Variance divides by the active count (population
//! variance), so a single observation has variance zero.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{PriceTransform, ReturnKind, StatsBasis, StatsConfig, X96_SHIFT};
use crate::error::{CircuitError, CircuitResult};
use crate::stream::{zip2, MaskedSeq};
use crate::uint::Uint248;

/// Summary statistics of one evaluation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatResult {
    pub mean: Uint248,
    pub variance: Uint248,
    pub volatility: Uint248,
    /// Active elements of the series the statistics were taken over.
    pub samples: u32,
}

impl PriceTransform {
    /// Turns a decoded field into a price.
    pub fn apply(&self, field: Uint248) -> Uint248 {
        match *self {
            PriceTransform::Raw => field,
            PriceTransform::SqrtPriceX96 { precision } => {
                let root = (field * precision).shr(X96_SHIFT);
                root * root
            }
        }
    }
}

/// Consecutive-price returns of `prices`: slot `i` pairs price `i` with price
/// `i + 1`, so `n` active prices give `n - 1` active returns.
pub fn returns(prices: &MaskedSeq<Uint248>, kind: ReturnKind) -> CircuitResult<MaskedSeq<Uint248>> {
    let n = prices.capacity();
    if n == 0 {
        return Ok(MaskedSeq::new(Vec::new(), Vec::new()));
    }
    let prices = prices.fill_inactive(Uint248::ZERO);
    let prev = prices.range(0, n - 1);
    let next = prices.range(1, n);

    match kind {
        ReturnKind::AbsoluteDifference => Ok(zip2(&prev, &next, |a, b| a.abs_diff(*b))),
        ReturnKind::SquaredRatio { scale } => {
            let pairs = zip2(&prev, &next, |a, b| (*a, *b));
            if pairs.first_violation(|(a, _)| a.is_zero().not()).is_some() {
                return Err(CircuitError::DivisionUndefined { what: "return against a zero price" });
            }
            // Inactive pairs divide by one instead of their padding.
            let denominators = pairs.map(|(a, _)| *a).fill_inactive(Uint248::ONE);
            let numerators = pairs.map(|(_, b)| *b);
            let ratios = zip2(&numerators, &denominators, |b, a| squared_ratio(*b, *a, scale));
            ratios
                .values()
                .iter()
                .copied()
                .collect::<Option<Vec<_>>>()
                .map(|values| MaskedSeq::new(values, ratios.toggles().to_vec()))
                .ok_or(CircuitError::DivisionUndefined {
                    what: "squared-ratio return with a zero scale",
                })
        }
    }
}

fn squared_ratio(next: Uint248, prev: Uint248, scale: Uint248) -> Option<Uint248> {
    let q = (next * scale).checked_div(prev)?;
    (q * q).checked_div(scale)
}

/// Mean, variance and floor-sqrt volatility of `series`.
pub fn summarize(
    series: &MaskedSeq<Uint248>,
    volatility_scale: Uint248,
) -> CircuitResult<StatResult> {
    let mean = series.mean()?;
    // Padding is moved onto the mean so its deviation is zero.
    let deviations = series.fill_inactive(mean).map(|x| {
        let d = x.abs_diff(mean);
        d * d
    });
    let variance = deviations.mean()?;
    let volatility = (variance * volatility_scale).sqrt();
    Ok(StatResult { mean, variance, volatility, samples: series.count() as u32 })
}

/// Runs the configured statistics over a price sequence.
pub fn compute(prices: &MaskedSeq<Uint248>, config: &StatsConfig) -> CircuitResult<StatResult> {
    let series = match config.basis {
        StatsBasis::Prices => prices.fill_inactive(Uint248::ZERO),
        StatsBasis::Returns => returns(prices, config.returns)?,
    };
    debug!(
        capacity = series.capacity(),
        active = series.count(),
        basis = ?config.basis,
        "summarizing series"
    );
    let result = summarize(&series, config.volatility_scale)?;
    debug!(
        mean = %result.mean,
        variance = %result.variance,
        volatility = %result.volatility,
        "statistics"
    );
    Ok(result)
}
