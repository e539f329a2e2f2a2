//! CSV encoding for record tables, on top of the `csv` crate.

use std::io::{Read, Write};

use super::LocalResult;

fn writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out)
}

/// Write a grid as CSV, one line per row.
pub fn write_grid<W: Write>(out: W, grid: &[Vec<String>]) -> LocalResult<()> {
    let mut wtr = writer(out);
    for row in grid {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Encode a grid as CSV text.
pub fn encode(grid: &[Vec<String>]) -> LocalResult<String> {
    let mut buf = Vec::new();
    write_grid(&mut buf, grid)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Read every row of a CSV source. Rows may have differing lengths.
pub fn read_grid<R: Read>(input: R) -> LocalResult<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);

    let mut grid = Vec::new();
    for result in rdr.records() {
        let record = result?;
        grid.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    // Spreadsheet exports often carry a byte order mark.
    if let Some(first) = grid.first_mut().and_then(|row| row.first_mut()) {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }
    Ok(grid)
}

/// Decode CSV text into a grid.
pub fn decode(text: &str) -> LocalResult<Vec<Vec<String>>> {
    read_grid(text.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::LocalError;

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_encode_quotes_only_when_needed() {
        let text = encode(&grid(&[&["simple", "with,comma", "with\"quote"]])).unwrap();
        assert_eq!(text, "simple,\"with,comma\",\"with\"\"quote\"\n");
    }

    #[test]
    fn test_decode_quoted_cells() {
        let text = "Full Name,Medication\n\"Ali, Sara\",\"RA (x) ; LA (\"\"y\"\")\"\n";
        assert_eq!(
            decode(text).unwrap(),
            grid(&[
                &["Full Name", "Medication"],
                &["Ali, Sara", "RA (x) ; LA (\"y\")"],
            ])
        );
    }

    #[test]
    fn test_decode_embedded_newline_and_crlf() {
        let text = "A,B\r\n\"line one\nline two\",2\r\n";
        assert_eq!(
            decode(text).unwrap(),
            grid(&[&["A", "B"], &["line one\nline two", "2"]])
        );
    }

    #[test]
    fn test_decode_ragged_rows() {
        assert_eq!(
            decode("A,B,C\nx,,\ny\n").unwrap(),
            grid(&[&["A", "B", "C"], &["x", "", ""], &["y"]])
        );
    }

    #[test]
    fn test_decode_without_trailing_newline_and_bom() {
        assert_eq!(decode("\u{feff}A\nx").unwrap(), grid(&[&["A"], &["x"]]));
    }

    #[test]
    fn test_invalid_utf8_is_a_csv_error() {
        let bytes: &[u8] = b"A\n\xff\xfe\n";
        assert!(matches!(read_grid(bytes), Err(LocalError::Csv(_))));
    }

    #[test]
    fn test_encode_then_decode_preserves_separators() {
        let original = grid(&[&["Remarks"], &["said \"hi\", left\nearly"]]);
        assert_eq!(decode(&encode(&original).unwrap()).unwrap(), original);
    }
}
