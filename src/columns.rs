use crate::error::{Result, SalesError};

/// Convert a column label ('A', 'AF', 'CK') to an index.
///
/// `start` is the index given to column 'A', so `start = 0` yields zero-based
/// positions and `start = 1` yields the one-based numbers spreadsheets display.
pub fn col_to_ind(column: &str, start: usize) -> Result<usize> {
    let label = column.trim();
    if label.is_empty() || !label.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SalesError::InvalidColumn(column.to_string()));
    }
    // 'ABC' -> 1*26^2 + 2*26^1 + 3*26^0 = 731
    let number = label
        .chars()
        .map(|c| (c.to_ascii_uppercase() as u8 - b'A') as usize + 1)
        .try_fold(0usize, |acc, digit| acc.checked_mul(26)?.checked_add(digit))
        .ok_or_else(|| SalesError::InvalidColumn(column.to_string()))?;
    Ok(number - 1 + start)
}

/// Inverse of `col_to_ind(_, 0)`: zero-based index to column label.
pub fn ind_to_col(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// The three columns a sales export is read from, resolved to zero-based indexes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesColumns {
    pub date: Column,
    pub country: Column,
    pub total: Column,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub label: String,
    pub index: usize,
}

impl Column {
    pub fn parse(label: &str) -> Result<Self> {
        Ok(Self {
            label: label.trim().to_ascii_uppercase(),
            index: col_to_ind(label, 0)?,
        })
    }
}

impl SalesColumns {
    pub fn parse(date: &str, country: &str, total: &str) -> Result<Self> {
        Ok(Self {
            date: Column::parse(date)?,
            country: Column::parse(country)?,
            total: Column::parse(total)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_ind_zero_based() {
        assert_eq!(col_to_ind("A", 0).unwrap(), 0);
        assert_eq!(col_to_ind("Z", 0).unwrap(), 25);
        assert_eq!(col_to_ind("AA", 0).unwrap(), 26);
        assert_eq!(col_to_ind("AF", 0).unwrap(), 31);
        assert_eq!(col_to_ind("ABC", 0).unwrap(), 730);
    }

    #[test]
    fn test_col_to_ind_with_offset() {
        assert_eq!(col_to_ind("A", 1).unwrap(), 1);
        assert_eq!(col_to_ind("X", 1).unwrap(), 24);
        assert_eq!(col_to_ind("AA", 1).unwrap(), 27);
    }

    #[test]
    fn test_col_to_ind_accepts_lowercase() {
        assert_eq!(col_to_ind("af", 0).unwrap(), 31);
        assert_eq!(col_to_ind(" O ", 0).unwrap(), 14);
    }

    #[test]
    fn test_col_to_ind_rejects_garbage() {
        assert!(matches!(col_to_ind("", 0), Err(SalesError::InvalidColumn(_))));
        assert!(matches!(col_to_ind("A1", 0), Err(SalesError::InvalidColumn(_))));
        assert!(matches!(col_to_ind("Ž", 0), Err(SalesError::InvalidColumn(_))));
    }

    #[test]
    fn test_ind_to_col_inverts() {
        assert_eq!(ind_to_col(0), "A");
        assert_eq!(ind_to_col(25), "Z");
        assert_eq!(ind_to_col(26), "AA");
        assert_eq!(ind_to_col(31), "AF");
        for i in [0, 1, 25, 26, 51, 52, 701, 702, 730] {
            assert_eq!(col_to_ind(&ind_to_col(i), 0).unwrap(), i);
        }
    }

    #[test]
    fn test_sales_columns_parse() {
        let cols = SalesColumns::parse("a", "O", "X").unwrap();
        assert_eq!(cols.date, Column { label: "A".into(), index: 0 });
        assert_eq!(cols.country.index, 14);
        assert_eq!(cols.total.index, 23);
        assert!(SalesColumns::parse("A", "O?", "X").is_err());
    }
}
