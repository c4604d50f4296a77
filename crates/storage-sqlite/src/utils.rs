//! Utility functions for SQLite storage operations.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Maximum number of parameters for SQLite IN (...) queries.
///
/// SQLite caps the number of parameters per statement (typically 999); 500
/// leaves room for the query's other bind parameters.
pub const SQLITE_MAX_PARAMS_CHUNK: usize = 500;

/// Chunk a slice into smaller slices for batch SQLite queries.
///
/// Any query that uses `IN (...)` with a potentially large list of IDs
/// should go through this to stay under the parameter limit.
pub fn chunk_for_sqlite<T>(items: &[T]) -> impl Iterator<Item = &[T]> {
    items.chunks(SQLITE_MAX_PARAMS_CHUNK)
}

/// Parses a TEXT money column into a Decimal, falling back to zero on
/// malformed data rather than failing the whole row.
pub fn parse_decimal_column(value_str: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value_str) {
        Ok(d) => d,
        Err(e) => {
            log::error!(
                "Failed to parse {} '{}' as Decimal (err: {}). Falling back to ZERO.",
                field_name,
                value_str,
                e
            );
            Decimal::ZERO
        }
    }
}

/// Same as `parse_decimal_column` for nullable columns.
pub fn parse_optional_decimal_column(
    value: Option<&str>,
    field_name: &str,
) -> Option<Decimal> {
    value.map(|v| parse_decimal_column(v, field_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_chunk_for_sqlite_over_limit() {
        let items: Vec<i32> = (0..1200).collect();
        let chunks: Vec<_> = chunk_for_sqlite(&items).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), SQLITE_MAX_PARAMS_CHUNK);
        assert_eq!(chunks[2].len(), 200);
    }

    #[test]
    fn test_parse_decimal_column() {
        assert_eq!(parse_decimal_column("25.50", "amount"), dec!(25.50));
        assert_eq!(parse_decimal_column("garbage", "amount"), Decimal::ZERO);
        assert_eq!(
            parse_optional_decimal_column(Some("10"), "amount"),
            Some(dec!(10))
        );
        assert_eq!(parse_optional_decimal_column(None, "amount"), None);
    }
}
