//! Size — human-readable size strings to byte counts.
//!
//! Node logs report memory as `10 MB`, `512MiB`, `1.5 GB` or a bare byte
//! count. Decimal units (kB, MB, GB, ...) are powers of 1000; binary units
//! (KiB, MiB, GiB, ...) are powers of 1024.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum SizeError {
    #[error("empty size string")]
    Empty,

    #[error("invalid number in size '{0}'")]
    InvalidNumber(String),

    #[error("unknown size unit '{0}'")]
    UnknownUnit(String),
}

/// Parse a human-readable size string into a byte count.
///
/// Fractional values are rounded to the nearest byte.
pub fn parse(text: &str) -> Result<u64, SizeError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(SizeError::Empty);
    }

    let split = text
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(text.len());
    let (num_str, unit) = text.split_at(split);
    let unit = unit.trim();

    if num_str.is_empty() {
        return Err(SizeError::InvalidNumber(text.to_string()));
    }
    let value: f64 = num_str
        .parse()
        .map_err(|_| SizeError::InvalidNumber(text.to_string()))?;

    let multiplier: u64 = match unit.to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" => 1000,
        "m" | "mb" => 1000_u64.pow(2),
        "g" | "gb" => 1000_u64.pow(3),
        "t" | "tb" => 1000_u64.pow(4),
        "p" | "pb" => 1000_u64.pow(5),
        "kib" => 1 << 10,
        "mib" => 1 << 20,
        "gib" => 1 << 30,
        "tib" => 1 << 40,
        "pib" => 1 << 50,
        _ => return Err(SizeError::UnknownUnit(unit.to_string())),
    };

    Ok((value * multiplier as f64).round() as u64)
}
