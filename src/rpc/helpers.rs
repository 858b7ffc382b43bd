//! Helpers for the `0x`-prefixed hex quantities Ethereum nodes use for block
//! numbers and other counters.

use anyhow::{bail, Context, Result};

/// Parses a hex quantity string (e.g. `"0x4b7"`) into a `u64`.
pub fn parse_quantity(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"));
    let Some(digits) = digits else {
        bail!("quantity {trimmed:?} is missing the 0x prefix");
    };
    if digits.is_empty() {
        bail!("quantity {trimmed:?} has no digits");
    }
    u64::from_str_radix(digits, 16).with_context(|| format!("invalid hex quantity {trimmed:?}"))
}

/// Formats a `u64` as a minimal `0x`-prefixed hex quantity.
pub fn format_quantity(value: u64) -> String {
    format!("{value:#x}")
}
