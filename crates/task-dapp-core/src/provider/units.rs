//! Display helpers for native-currency amounts.

use alloy_primitives::U256;

pub const ETHER_DECIMALS: u8 = 18;

/// Render `value` (in the smallest unit) as a decimal string with trailing
/// zeros trimmed, keeping at least one fractional digit.
pub fn format_units(value: U256, decimals: u8) -> String {
    if decimals == 0 {
        return value.to_string();
    }
    let base = U256::from(10u64).pow(U256::from(decimals));
    let whole = value / base;
    let fraction = format!("{:0>width$}", (value % base).to_string(), width = decimals as usize);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}.0", whole)
    } else {
        format!("{}.{}", whole, fraction)
    }
}

pub fn format_ether(wei: U256) -> String {
    format_units(wei, ETHER_DECIMALS)
}
