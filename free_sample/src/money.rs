//! Formatting of minor-unit currency amounts.

/// Formats an amount in minor units with two decimal places, e.g. `1000` as
/// `"10.00"`.
pub fn format_minor_units(amount: u64) -> String {
    format!("{}.{:02}", amount / 100, amount % 100)
}

/// Formats an amount in minor units as a dollar string, e.g. `"$10.00"`.
pub fn format_currency(amount: u64) -> String {
    format!("${}", format_minor_units(amount))
}
