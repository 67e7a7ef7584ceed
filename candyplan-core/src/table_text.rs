//! Parser for the whitespace-separated level tables.
//!
//! Both resources share one layout: a level in the first column and a value
//! in the second. Extra columns are ignored. Lines that are blank or start
//! with `#` or `[` are comments, as is any row whose first field is not a
//! number (column headers).

use std::collections::BTreeMap;

use crate::constants::{LV_MAX, LV_MIN, MAX_TABLE_VALUE};
use crate::error::TableParseError;

/// Level-indexed values read from a text table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelColumn {
    pub(crate) values: BTreeMap<u32, u64>,
}

impl LevelColumn {
    /// Parse the first two columns of `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if a value field is not a number or exceeds
    /// [`MAX_TABLE_VALUE`], if a level repeats, or if a level falls outside
    /// the level bounds.
    pub fn parse(table: &'static str, text: &str) -> Result<Self, TableParseError> {
        let mut values = BTreeMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let mut fields = line.split_whitespace().map(|f| f.trim_end_matches(','));
            let (Some(level_field), Some(value_field)) = (fields.next(), fields.next()) else {
                continue;
            };
            let Some(level) = parse_grouped(level_field) else {
                log::debug!("{table} table: skipping header line {}", idx + 1);
                continue;
            };
            let value = parse_grouped(value_field).ok_or_else(|| TableParseError::BadNumber {
                table,
                line: idx + 1,
                text: value_field.to_string(),
            })?;
            let level = u32::try_from(level)
                .ok()
                .filter(|lv| (LV_MIN..=LV_MAX).contains(lv))
                .ok_or(TableParseError::LevelOutOfRange {
                    table,
                    level: u32::try_from(level).unwrap_or(u32::MAX),
                })?;
            if value > MAX_TABLE_VALUE {
                return Err(TableParseError::ValueOutOfRange {
                    table,
                    level,
                    value,
                });
            }
            if values.insert(level, value).is_some() {
                return Err(TableParseError::DuplicateLevel { table, level });
            }
        }
        Ok(Self { values })
    }

    #[must_use]
    pub fn get(&self, level: u32) -> Option<u64> {
        self.values.get(&level).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse an unsigned integer that may carry thousands separators (`1,032`).
///
/// Separators must split the digits into groups of three; `10,32` is rejected.
#[must_use]
pub fn parse_grouped(text: &str) -> Option<u64> {
    let mut groups = text.split(',');
    let head = groups.next()?;
    if head.is_empty() || !head.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut digits = head.to_string();
    let mut grouped = false;
    for group in groups {
        if head.len() > 3 || group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        grouped = true;
        digits.push_str(group);
    }
    if grouped && head.starts_with('0') {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_numbers_accept_thousands_separators() {
        assert_eq!(parse_grouped("54"), Some(54));
        assert_eq!(parse_grouped("1,032"), Some(1_032));
        assert_eq!(parse_grouped("12,345,678"), Some(12_345_678));
        assert_eq!(parse_grouped("10,32"), None);
        assert_eq!(parse_grouped("1032,000"), None);
        assert_eq!(parse_grouped("0,123"), None);
        assert_eq!(parse_grouped("abc"), None);
        assert_eq!(parse_grouped(""), None);
    }

    #[test]
    fn comments_headers_and_extra_columns_are_skipped() {
        let text = "# comment\n[exp]\nlevel normal 600\n\n2 54 81\n3\t71\t107\n4, 1,032\n";
        let column = LevelColumn::parse("exp", text).unwrap();
        assert_eq!(column.len(), 3);
        assert_eq!(column.get(2), Some(54));
        assert_eq!(column.get(3), Some(71));
        assert_eq!(column.get(4), Some(1_032));
        assert_eq!(column.get(5), None);
    }

    #[test]
    fn bad_value_reports_line() {
        let err = LevelColumn::parse("shard", "2 14\n3 x9\n").unwrap_err();
        assert_eq!(
            err,
            TableParseError::BadNumber {
                table: "shard",
                line: 2,
                text: "x9".to_string(),
            }
        );
    }

    #[test]
    fn oversized_values_are_rejected() {
        let text = "2 54\n3 18,000,000,000,000,000,000\n";
        assert_eq!(
            LevelColumn::parse("exp", text).unwrap_err(),
            TableParseError::ValueOutOfRange {
                table: "exp",
                level: 3,
                value: 18_000_000_000_000_000_000,
            }
        );
        let at_cap = format!("2 {MAX_TABLE_VALUE}\n");
        assert_eq!(
            LevelColumn::parse("shard", &at_cap).unwrap().get(2),
            Some(MAX_TABLE_VALUE)
        );
    }

    #[test]
    fn duplicate_and_out_of_range_levels_fail() {
        assert_eq!(
            LevelColumn::parse("exp", "2 54\n2 55\n").unwrap_err(),
            TableParseError::DuplicateLevel {
                table: "exp",
                level: 2
            }
        );
        assert_eq!(
            LevelColumn::parse("exp", "66 54\n").unwrap_err(),
            TableParseError::LevelOutOfRange {
                table: "exp",
                level: 66
            }
        );
    }
}
