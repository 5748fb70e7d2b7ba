//! Choosing and rendering the preview of extracted text.
//!
//! The raw text is always available; the preview is a convenience. When
//! non-empty text decodes to zero rows the preview falls back to the raw text
//! instead of showing an empty table.

use crate::table::{decode_tables, Table};

/// What to show for a piece of extracted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview<'a> {
    /// The model returned nothing.
    Empty,
    /// One or more decoded tables, in input order.
    Tables(Vec<Table>),
    /// Text was returned but no rows decoded from it.
    RawFallback(&'a str),
}

/// Decide how to present `raw`.
pub fn preview(raw: &str) -> Preview<'_> {
    if raw.is_empty() {
        return Preview::Empty;
    }
    let tables = decode_tables(raw);
    if tables.is_empty() {
        Preview::RawFallback(raw)
    } else {
        Preview::Tables(tables)
    }
}

/// Widest cell rendered before truncation.
pub const MAX_CELL_WIDTH: usize = 40;

/// Render a table as a boxed text grid. The first row is treated as the
/// header and underlined. Ragged rows are padded with blank cells for
/// display only.
///
/// Cells are shown on one line: line breaks inside a cell become `↵` and long
/// cells are cut at [`MAX_CELL_WIDTH`] characters with `…`.
pub fn render_grid(table: &Table) -> String {
    let width = table.width();
    if width == 0 {
        return String::new();
    }

    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| {
            (0..width)
                .map(|i| row.get(i).map(|c| display_cell(c)).unwrap_or_default())
                .collect()
        })
        .collect();

    let col_widths: Vec<usize> = (0..width)
        .map(|i| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .max()
                .unwrap_or(0)
                .max(1)
        })
        .collect();

    let border = |left: char, mid: char, right: char| {
        let mut s = String::new();
        s.push(left);
        for (i, w) in col_widths.iter().enumerate() {
            if i > 0 {
                s.push(mid);
            }
            s.extend(std::iter::repeat_n('─', w + 2));
        }
        s.push(right);
        s.push('\n');
        s
    };

    let mut out = border('┌', '┬', '┐');
    for (r, row) in cells.iter().enumerate() {
        out.push('│');
        for (i, cell) in row.iter().enumerate() {
            let pad = col_widths[i] - cell.chars().count();
            out.push(' ');
            out.push_str(cell);
            out.extend(std::iter::repeat_n(' ', pad + 1));
            out.push('│');
        }
        out.push('\n');
        if r == 0 && cells.len() > 1 {
            out.push_str(&border('├', '┼', '┤'));
        }
    }
    out.push_str(&border('└', '┴', '┘'));
    out
}

fn display_cell(cell: &str) -> String {
    let flat: String = cell
        .replace("\r\n", "\n")
        .chars()
        .map(|c| match c {
            '\n' | '\r' => '↵',
            '\t' => ' ',
            c => c,
        })
        .collect();
    if flat.chars().count() > MAX_CELL_WIDTH {
        let mut cut: String = flat.chars().take(MAX_CELL_WIDTH - 1).collect();
        cut.push('…');
        cut
    } else {
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::decode;

    #[test]
    fn empty_text_is_empty_preview() {
        assert_eq!(preview(""), Preview::Empty);
    }

    #[test]
    fn blank_lines_only_fall_back_to_raw() {
        assert_eq!(preview("\n\r\n"), Preview::RawFallback("\n\r\n"));
    }

    #[test]
    fn text_with_rows_is_tables() {
        match preview("a,b\n1,2\n\nc\n3") {
            Preview::Tables(t) => {
                assert_eq!(t.len(), 2);
                assert_eq!(t[0].len(), 2);
            }
            other => panic!("unexpected preview: {other:?}"),
        }
    }

    #[test]
    fn grid_layout() {
        let grid = render_grid(&decode("name,qty\napple,3\nkiwi"));
        let expected = "\
┌───────┬─────┐
│ name  │ qty │
├───────┼─────┤
│ apple │ 3   │
│ kiwi  │     │
└───────┴─────┘
";
        assert_eq!(grid, expected);
    }

    #[test]
    fn grid_flattens_and_truncates() {
        let long = "x".repeat(MAX_CELL_WIDTH + 10);
        let grid = render_grid(&decode(&format!("\"a\nb\",{long}")));
        assert!(grid.contains("a↵b"));
        assert!(grid.contains('…'));
        assert!(!grid.contains(&long));
    }

    #[test]
    fn grid_of_empty_table_is_empty() {
        assert_eq!(render_grid(&Table::default()), "");
    }
}
