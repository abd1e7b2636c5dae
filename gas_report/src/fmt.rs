use serde_json::Value;

pub struct CellFmt;

impl CellFmt {
    /// Spreadsheet column name of a zero-based column index: `0` is `A`,
    /// `25` is `Z`, `26` is `AA`.
    pub fn column_name(col: u16) -> String {
        let mut letters = Vec::new();
        let mut n = col as u32 + 1;
        while n > 0 {
            n -= 1;
            letters.push((b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        letters.into_iter().rev().collect()
    }

    /// A1-style reference of a zero-based cell.
    pub fn cell(row: u32, col: u16) -> String {
        format!("{}{}", Self::column_name(col), row + 1)
    }

    pub fn range(row: u32, first: u16, last: u16) -> String {
        if first == last {
            Self::cell(row, first)
        } else {
            format!("{}:{}", Self::cell(row, first), Self::cell(row, last))
        }
    }

    /// Collapses the columns of a row into the shortest list of references,
    /// merging runs of adjacent columns into ranges.
    pub fn ranges(row: u32, cols: &[u16]) -> Vec<String> {
        let mut cols = cols.to_vec();
        cols.sort_unstable();
        cols.dedup();

        let mut ranges = Vec::new();
        let mut cols = cols.into_iter();
        let mut current = match cols.next() {
            Some(col) => (col, col),
            None => return ranges,
        };
        for col in cols {
            if col == current.1 + 1 {
                current.1 = col;
            } else {
                ranges.push(Self::range(row, current.0, current.1));
                current = (col, col);
            }
        }
        ranges.push(Self::range(row, current.0, current.1));
        ranges
    }

    /// Number of characters the spreadsheet shows for a JSON value.
    pub fn display_len(value: &Value) -> usize {
        match value {
            Value::Null => 0,
            Value::Bool(true) => "TRUE".len(),
            Value::Bool(false) => "FALSE".len(),
            Value::Number(number) => number.to_string().chars().count(),
            Value::String(string) => string.chars().count(),
            other => other.to_string().chars().count(),
        }
    }
}
