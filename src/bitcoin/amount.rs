//! Exact conversion between satoshis and decimal BTC strings.
//!
//! Works on the digit strings with checked integer arithmetic; binary floating
//! point never touches an amount.

use bitcoin::Amount;

use crate::error::TransferError;

pub const DECIMALS: u32 = 8;
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Parse a decimal BTC amount into satoshis.
///
/// Digits past the eighth fractional place are truncated, not rounded.
pub fn to_base_units(decimal: &str) -> Result<Amount, TransferError> {
    let trimmed = decimal.trim();
    let invalid = |reason: &str| TransferError::InvalidAmount(format!("'{}': {}", decimal, reason));

    if trimmed.starts_with('-') {
        return Err(invalid("amount must not be negative"));
    }
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (digits, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid("empty amount"));
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid("not a decimal number"));
    }

    let whole_sats = if whole.is_empty() {
        0
    } else {
        whole
            .parse::<u64>()
            .ok()
            .and_then(|btc| btc.checked_mul(SATS_PER_BTC))
            .ok_or_else(|| invalid("amount out of range"))?
    };

    let kept: String = fraction.chars().take(DECIMALS as usize).collect();
    let fraction_sats = if kept.is_empty() {
        0
    } else {
        // "5" -> 50_000_000
        let scale = 10u64.pow(DECIMALS - kept.len() as u32);
        kept.parse::<u64>().map_err(|_| invalid("not a decimal number"))? * scale
    };

    whole_sats
        .checked_add(fraction_sats)
        .map(Amount::from_sat)
        .ok_or_else(|| invalid("amount out of range"))
}

/// Render satoshis as a decimal BTC string with trailing zeros stripped.
///
/// `0` renders as `"0"` and whole coins carry no decimal point.
pub fn from_base_units(amount: Amount) -> String {
    let sats = amount.to_sat();
    let whole = sats / SATS_PER_BTC;
    let fraction = sats % SATS_PER_BTC;
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:08}", fraction);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
