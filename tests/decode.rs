//! Decoder behaviour on the shapes of text the extraction model returns.

use tablesnap::preview::{preview, Preview};
use tablesnap::{decode, decode_tables, Table};

fn grid(rows: &[&[&str]]) -> Table {
    Table::new(
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    )
}

#[test]
fn reference_cases() {
    assert!(decode("").is_empty());
    assert_eq!(decode("a,b\nc,d"), grid(&[&["a", "b"], &["c", "d"]]));
    assert_eq!(decode("a,\"b,c\",d"), grid(&[&["a", "b,c", "d"]]));
    assert_eq!(
        decode("a,\"\"\"quoted\"\"\",c"),
        grid(&[&["a", "\"quoted\"", "c"]])
    );
    assert_eq!(decode("a,b\r\nc,d\r\n").len(), 2);
    assert_eq!(decode("a,b,\n"), grid(&[&["a", "b", ""]]));
    assert!(decode("\n").is_empty());
}

#[test]
fn typical_model_output() {
    let raw = "Item,Qty,Price\nRice (5kg),2,\"₹1,200\"\nOil,,\"₹ 250\"\n";
    let table = decode(raw);
    assert_eq!(table.len(), 3);
    assert_eq!(table.width(), 3);
    assert_eq!(table.rows()[1][2], "₹1,200");
    assert_eq!(table.rows()[2][1], "");
    assert_eq!(table.rows()[2][2], "₹ 250");
}

#[test]
fn two_tables_in_one_answer() {
    let raw = "Q1,Sales\nJan,10\n\nQ2,Sales\nApr,12\n";
    let tables = decode_tables(raw);
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[1].header(), Some(&["Q2".to_string(), "Sales".to_string()][..]));
    assert_eq!(decode(raw).len(), 4);
}

#[test]
fn hostile_inputs_never_panic() {
    let inputs = [
        "\"",
        "\"\"\"",
        ",,,,",
        "\r",
        "\r\r\n\n",
        "\"a\"b\"c",
        "a,\"b\nc",
        "\u{feff}a,b",
        "\0,\0",
    ];
    for raw in inputs {
        let first = decode(raw);
        assert_eq!(first, decode(raw), "not idempotent for {raw:?}");
    }
    assert_eq!(decode(",,,,"), grid(&[&["", "", "", "", ""]]));
}

#[test]
fn prose_without_rows_falls_back_to_raw() {
    // Blank-only answers decode to nothing; the preview must not be an empty table.
    let raw = "\n\n";
    assert!(decode(raw).is_empty());
    assert_eq!(preview(raw), Preview::RawFallback(raw));
}
