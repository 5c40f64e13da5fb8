//! Human-readable byte sizes for volume capacity arguments
//!
//! Binary suffixes (`Ki`, `KiB`, `Mi`, ...) are powers of 1024, SI
//! suffixes (`K`, `KB`, `M`, ...) are powers of 1000. Suffixes are case
//! insensitive and may be separated from the number by spaces.

use crate::error::{Error, Result};

const KIB: u64 = 1 << 10;

/// Parse a size such as `42GiB`, `42gib`, `10G`, `1.5TiB` or `1024`
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::CapacityParse("empty size string".into()));
    }

    let num_end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit() && *c != '.')
        .map(|(i, _)| i)
        .unwrap_or(s.len());

    let num_str = &s[..num_end];
    let unit_str = s[num_end..].trim();

    let num: f64 = num_str
        .parse()
        .map_err(|_| Error::CapacityParse(format!("invalid number: {:?}", num_str)))?;

    let multiplier: u64 = match unit_str.to_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" => 1_000,
        "KI" | "KIB" => KIB,
        "M" | "MB" => 1_000_000,
        "MI" | "MIB" => KIB.pow(2),
        "G" | "GB" => 1_000_000_000,
        "GI" | "GIB" => KIB.pow(3),
        "T" | "TB" => 1_000_000_000_000,
        "TI" | "TIB" => KIB.pow(4),
        "P" | "PB" => 1_000_000_000_000_000,
        "PI" | "PIB" => KIB.pow(5),
        _ => return Err(Error::CapacityParse(format!("unknown unit: {}", unit_str))),
    };

    let bytes = num * multiplier as f64;
    if !bytes.is_finite() || bytes > u64::MAX as f64 {
        return Err(Error::CapacityParse(format!("size out of range: {}", s)));
    }

    Ok(bytes as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_binary_units() {
        assert_eq!(parse_size("42GiB").unwrap(), 42 * (1 << 30));
        assert_eq!(parse_size("42gib").unwrap(), 42 * (1 << 30));
        assert_eq!(parse_size("5Gi").unwrap(), 5 * (1 << 30));
        assert_eq!(parse_size("1.5TiB").unwrap(), 3 * (1u64 << 39));
        assert_eq!(parse_size("512 MiB").unwrap(), 512 * (1 << 20));
    }

    #[test]
    fn test_si_units() {
        assert_eq!(parse_size("10G").unwrap(), 10_000_000_000);
        assert_eq!(parse_size("10gb").unwrap(), 10_000_000_000);
        assert_eq!(parse_size("2k").unwrap(), 2_000);
    }

    #[test]
    fn test_plain_bytes() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1024B").unwrap(), 1024);
    }

    #[test]
    fn test_invalid() {
        assert_matches!(parse_size(""), Err(Error::CapacityParse(_)));
        assert_matches!(parse_size("GiB"), Err(Error::CapacityParse(_)));
        assert_matches!(parse_size("10XB"), Err(Error::CapacityParse(_)));
        assert_matches!(parse_size("-5GiB"), Err(Error::CapacityParse(_)));
    }
}
