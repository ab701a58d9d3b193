//! Fee-rate lookup and absolute fee estimation.

use bitcoin::Amount;

use crate::error::TransferError;
use crate::esplora::{FeeRecommendation, FeeSource};

/// Virtual bytes per legacy-style input
pub const INPUT_VBYTES: u64 = 148;
/// Virtual bytes per output
pub const OUTPUT_VBYTES: u64 = 34;
/// Version, locktime and count fields
pub const OVERHEAD_VBYTES: u64 = 10;

/// Urgency tier, numbered 1 (fastest) to 5 (minimum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeePriority {
    Fastest = 1,
    #[default]
    HalfHour = 2,
    Hour = 3,
    Economy = 4,
    Minimum = 5,
}

impl FeePriority {
    /// Name of the tier in the fee recommendation table.
    pub fn tier_name(self) -> &'static str {
        match self {
            FeePriority::Fastest => "fastestFee",
            FeePriority::HalfHour => "halfHourFee",
            FeePriority::Hour => "hourFee",
            FeePriority::Economy => "economyFee",
            FeePriority::Minimum => "minimumFee",
        }
    }

    pub fn rate_from(self, fees: &FeeRecommendation) -> u64 {
        match self {
            FeePriority::Fastest => fees.fastest_fee,
            FeePriority::HalfHour => fees.half_hour_fee,
            FeePriority::Hour => fees.hour_fee,
            FeePriority::Economy => fees.economy_fee,
            FeePriority::Minimum => fees.minimum_fee,
        }
    }
}

impl TryFrom<u8> for FeePriority {
    type Error = TransferError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(FeePriority::Fastest),
            2 => Ok(FeePriority::HalfHour),
            3 => Ok(FeePriority::Hour),
            4 => Ok(FeePriority::Economy),
            5 => Ok(FeePriority::Minimum),
            other => Err(TransferError::InvalidFeePriority(other)),
        }
    }
}

/// Estimate transaction size in virtual bytes from input and output counts.
///
/// Fixed per-item weights for legacy inputs; not exact for other script types.
/// Saturates instead of overflowing.
pub fn estimate_vsize(num_inputs: usize, num_outputs: usize) -> u64 {
    (num_inputs as u64)
        .saturating_mul(INPUT_VBYTES)
        .saturating_add((num_outputs as u64).saturating_mul(OUTPUT_VBYTES))
        .saturating_add(OVERHEAD_VBYTES)
}

pub struct FeeEstimator<'a, F: FeeSource + ?Sized> {
    source: &'a F,
    default_rate: u64,
}

impl<'a, F: FeeSource + ?Sized> FeeEstimator<'a, F> {
    pub fn new(source: &'a F, default_rate: u64) -> Self {
        Self {
            source,
            default_rate,
        }
    }

    /// Fee rate in sat/vB for the tier; any lookup failure yields the default rate.
    pub fn fee_rate(&self, priority: FeePriority) -> u64 {
        match self.source.recommended_fees() {
            Ok(fees) => {
                let rate = priority.rate_from(&fees);
                log::debug!("Fee rate for {}: {} sat/vB", priority.tier_name(), rate);
                rate
            }
            Err(e) => {
                log::warn!(
                    "Fee recommendation unavailable ({}), using default {} sat/vB",
                    e,
                    self.default_rate
                );
                self.default_rate
            }
        }
    }

    /// Absolute fee for a transaction with the given shape.
    ///
    /// A reported rate too large to price the transaction is treated like an
    /// unavailable one.
    pub fn estimate(&self, num_inputs: usize, num_outputs: usize, priority: FeePriority) -> Amount {
        let vsize = estimate_vsize(num_inputs, num_outputs);
        let rate = self.fee_rate(priority);
        let fee = rate.checked_mul(vsize).unwrap_or_else(|| {
            log::warn!(
                "Fee rate {} sat/vB overflows for {} vB, using default {} sat/vB",
                rate,
                vsize,
                self.default_rate
            );
            self.default_rate.saturating_mul(vsize)
        });
        Amount::from_sat(fee)
    }
}
