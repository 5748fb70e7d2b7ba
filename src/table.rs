//! Text-tabular decoding: CSV text returned by the model → [`Table`].
//!
//! The decoder exists for preview only. The raw text stays the source of
//! truth (it is what gets copied or saved), so the decoder never rejects
//! input: anything the model sends back yields *some* table, possibly empty.
//!
//! ## Grammar
//!
//! - `,` separates fields; `\n`, `\r\n` and a lone `\r` each end one record.
//! - A `"` toggles quoting. Inside quotes, commas and line breaks are text
//!   and `""` is a literal quote. There is no other escape.
//! - Unquoted text is taken verbatim, whitespace included.
//! - An unterminated quote is closed implicitly at end of input.
//! - A record made of a single empty field (blank line, trailing newline) is
//!   not a row. It does act as the boundary between tables for
//!   [`decode_tables`].

use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::str::Chars;

/// Rows of text cells, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell count of the widest row. Rows are not padded; model output is
    /// often ragged.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// First row, which the extraction prompt asks to be the header.
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }
}

/// Decode CSV text into a single table.
///
/// Blank records are dropped; everything else is kept in order.
pub fn decode(raw: &str) -> Table {
    Table::new(Records::new(raw).filter(|r| !is_blank(r)).collect())
}

/// Decode CSV text into one table per blank-line-separated block.
///
/// Runs of blank lines count as one separator, and no empty tables are
/// returned. The rows of all tables, concatenated, equal [`decode`]'s rows.
pub fn decode_tables(raw: &str) -> Vec<Table> {
    let mut tables = Vec::new();
    let mut current: Vec<Vec<String>> = Vec::new();

    for record in Records::new(raw) {
        if is_blank(&record) {
            if !current.is_empty() {
                tables.push(Table::new(std::mem::take(&mut current)));
            }
        } else {
            current.push(record);
        }
    }
    if !current.is_empty() {
        tables.push(Table::new(current));
    }
    tables
}

fn is_blank(record: &[String]) -> bool {
    record.len() == 1 && record[0].is_empty()
}

/// Iterator over raw records, blank ones included.
struct Records<'a> {
    chars: Peekable<Chars<'a>>,
    done: bool,
}

impl<'a> Records<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            chars: raw.chars().peekable(),
            done: false,
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Vec<String>> {
        if self.done {
            return None;
        }

        let mut record = Vec::new();
        let mut field = String::new();
        let mut in_quotes = false;

        while let Some(c) = self.chars.next() {
            match c {
                '"' if in_quotes && self.chars.peek() == Some(&'"') => {
                    self.chars.next();
                    field.push('"');
                }
                '"' => in_quotes = !in_quotes,
                ',' if !in_quotes => record.push(std::mem::take(&mut field)),
                '\r' | '\n' if !in_quotes => {
                    if c == '\r' && self.chars.peek() == Some(&'\n') {
                        self.chars.next();
                    }
                    record.push(field);
                    return Some(record);
                }
                _ => field.push(c),
            }
        }

        // End of input. A final line terminator leaves nothing pending and
        // must not produce a trailing record.
        self.done = true;
        if field.is_empty() && record.is_empty() {
            None
        } else {
            record.push(field);
            Some(record)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &str) -> Vec<Vec<String>> {
        decode(raw).into_rows()
    }

    fn owned(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn empty_input_has_no_rows() {
        assert!(decode("").is_empty());
    }

    #[test]
    fn simple_grid() {
        assert_eq!(rows("a,b\nc,d"), owned(&[&["a", "b"], &["c", "d"]]));
    }

    #[test]
    fn quoted_comma_is_literal() {
        assert_eq!(rows("a,\"b,c\",d"), owned(&[&["a", "b,c", "d"]]));
    }

    #[test]
    fn doubled_quote_escapes() {
        assert_eq!(
            rows("a,\"\"\"quoted\"\"\",c"),
            owned(&[&["a", "\"quoted\"", "c"]])
        );
    }

    #[test]
    fn trailing_crlf_adds_no_row() {
        assert_eq!(rows("a,b\r\nc,d\r\n"), owned(&[&["a", "b"], &["c", "d"]]));
    }

    #[test]
    fn lone_cr_terminates_record() {
        assert_eq!(rows("a\rb\r\nc"), owned(&[&["a"], &["b"], &["c"]]));
    }

    #[test]
    fn empty_trailing_field_keeps_row() {
        assert_eq!(rows("a,b,\n"), owned(&[&["a", "b", ""]]));
        assert_eq!(rows(",\n"), owned(&[&["", ""]]));
    }

    #[test]
    fn lone_empty_record_dropped() {
        assert!(decode("\n").is_empty());
        assert!(decode("\r\n\r\n").is_empty());
        assert_eq!(rows("a\n\n\nb"), owned(&[&["a"], &["b"]]));
    }

    #[test]
    fn line_break_inside_quotes() {
        assert_eq!(
            rows("name,note\nx,\"line1\r\nline2\"\n"),
            owned(&[&["name", "note"], &["x", "line1\r\nline2"]])
        );
    }

    #[test]
    fn whitespace_preserved() {
        assert_eq!(rows("  a , b  "), owned(&[&["  a ", " b  "]]));
    }

    #[test]
    fn unterminated_quote_closes_at_end() {
        assert_eq!(rows("a,\"open, still\nopen"), owned(&[&["a", "open, still\nopen"]]));
    }

    #[test]
    fn quote_mid_field_toggles() {
        assert_eq!(rows("ab\"c,d\"e,f"), owned(&[&["abc,de", "f"]]));
    }

    #[test]
    fn non_ascii_cells() {
        assert_eq!(rows("₹,€ 5\n日本,ü"), owned(&[&["₹", "€ 5"], &["日本", "ü"]]));
    }

    #[test]
    fn decode_is_idempotent() {
        let raw = "h1,\"h,2\"\r\n1,2\n\n3,\"\"\"4\"\"\"";
        assert_eq!(decode(raw), decode(raw));
    }

    #[test]
    fn width_and_header() {
        let t = decode("a,b\nc,d,e\n");
        assert_eq!(t.len(), 2);
        assert_eq!(t.width(), 3);
        assert_eq!(t.header(), Some(&["a".to_string(), "b".to_string()][..]));
        assert_eq!(Table::default().width(), 0);
    }

    #[test]
    fn tables_split_on_blank_lines() {
        let tables = decode_tables("a,b\n1,2\n\n\nc,d\n3,4\n");
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows(), owned(&[&["a", "b"], &["1", "2"]]).as_slice());
        assert_eq!(tables[1].rows(), owned(&[&["c", "d"], &["3", "4"]]).as_slice());
    }

    #[test]
    fn tables_concatenate_to_decode() {
        let raw = "\n\nx,y\n\nz\r\n\r\n";
        let joined: Vec<Vec<String>> = decode_tables(raw)
            .into_iter()
            .flat_map(Table::into_rows)
            .collect();
        assert_eq!(joined, rows(raw));
        assert!(decode_tables("").is_empty());
        assert!(decode_tables("\n\n").is_empty());
    }
}
