use crate::error::{BugetError, Result};

/// One CSV record. An empty vec stands for a blank line.
pub type Row = Vec<String>;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Split raw export bytes into rows, one per physical line.
///
/// Blank lines are kept as empty rows so that row indices match line
/// numbers in the file. A quoted cell that spans several lines produces a
/// single row.
pub fn tokenize(bytes: &[u8]) -> Result<Vec<Row>> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| BugetError::UnreadableInput(format!("file is not valid UTF-8: {e}")))?;

    // csv::Reader drops blank lines, so lines are fed to it one record at a
    // time instead of as a whole file.
    let mut rows: Vec<Row> = Vec::new();
    let mut pending = String::new();
    for line in text.lines() {
        if pending.is_empty() && line.is_empty() {
            rows.push(Vec::new());
            continue;
        }
        if !pending.is_empty() {
            pending.push('\n');
        }
        pending.push_str(line);
        if ends_inside_quotes(&pending) {
            continue;
        }
        parse_records(&pending, &mut rows)?;
        pending.clear();
    }
    if !pending.is_empty() {
        parse_records(&pending, &mut rows)?;
    }
    Ok(rows)
}

/// True when `text` stops inside a quoted cell. A quote only opens a cell
/// at the start of a field; anywhere else it is a literal character.
fn ends_inside_quotes(text: &str) -> bool {
    let mut in_quotes = false;
    let mut field_start = true;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            continue;
        }
        match c {
            '"' if field_start => {
                in_quotes = true;
                field_start = false;
            }
            ',' | '\n' => field_start = true,
            _ => field_start = false,
        }
    }
    in_quotes
}

fn parse_records(text: &str, rows: &mut Vec<Row>) -> Result<()> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    for record in rdr.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_bom() {
        let rows = tokenize(b"\xEF\xBB\xBFa,b\n").unwrap();
        assert_eq!(rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_blank_lines_keep_indices() {
        let rows = tokenize(b"a,b\n\n\nc,d\n").unwrap();
        assert_eq!(rows.len(), 4);
        assert!(rows[1].is_empty());
        assert!(rows[2].is_empty());
        assert_eq!(rows[3], vec!["c", "d"]);
    }

    #[test]
    fn test_quoted_cells() {
        let rows = tokenize(b"\"1.234,56\",\"x, y\",z\n").unwrap();
        assert_eq!(rows[0], vec!["1.234,56", "x, y", "z"]);
    }

    #[test]
    fn test_multiline_cell_is_one_row() {
        let rows = tokenize(b"a,\"line one\nline two\"\nb\n\nc\n").unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][1], "line one\nline two");
        assert_eq!(rows[1], vec!["b"]);
        assert!(rows[2].is_empty());
        assert_eq!(rows[3], vec!["c"]);
    }

    #[test]
    fn test_quote_inside_unquoted_cell_is_literal() {
        let rows = tokenize(b"a,Magazin 5\" ecran,x\nb,c\nd\n").unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], vec!["a", "Magazin 5\" ecran", "x"]);
        assert_eq!(rows[1], vec!["b", "c"]);
        assert_eq!(rows[2], vec!["d"]);
    }

    #[test]
    fn test_escaped_quotes_in_quoted_cell() {
        let rows = tokenize(b"\"spune \"\"da\"\"\",x\ny\n").unwrap();
        assert_eq!(rows[0], vec!["spune \"da\"", "x"]);
        assert_eq!(rows[1], vec!["y"]);
    }

    #[test]
    fn test_ragged_rows() {
        let rows = tokenize(b"a\nb,c,d\n").unwrap();
        assert_eq!(rows[0].len(), 1);
        assert_eq!(rows[1].len(), 3);
    }

    #[test]
    fn test_invalid_utf8_is_unreadable() {
        let err = tokenize(b"a,\xFF\xFE\n").unwrap_err();
        assert!(matches!(err, BugetError::UnreadableInput(_)));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize(b"").unwrap().is_empty());
    }
}
