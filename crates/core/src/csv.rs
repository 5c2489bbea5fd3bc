//! Minimal CSV codec for bid import and export.
//!
//! Fields are separated by `,` and records by `\n`, `\r\n` or `\r`. A field
//! wrapped in double quotes may contain separators and newlines; a doubled
//! quote inside a quoted field is a literal `"`.

/// A parsed CSV document. The first record is always the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// Position of `header` in the header row.
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }
}

/// Parse CSV text.
///
/// Header cells are trimmed. Data records whose cells are all blank are
/// dropped. A final record without a terminating newline is kept.
///
/// `parse_csv(serialize_csv(h, r))` gives back `h` and `r` except in those
/// two cases: header cells with surrounding whitespace come back trimmed,
/// and all-blank rows disappear. Bid exports never produce either, since
/// their headers are fixed and every row carries an id and a label.
pub fn parse_csv(text: &str) -> CsvTable {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut value = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                value.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => record.push(std::mem::take(&mut value)),
            '\r' | '\n' if !in_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut value));
                records.push(std::mem::take(&mut record));
            }
            _ => value.push(c),
        }
    }

    if !value.is_empty() || !record.is_empty() {
        record.push(value);
        records.push(record);
    }

    let mut records = records.into_iter();
    let headers = records
        .next()
        .map(|header| header.iter().map(|h| h.trim().to_string()).collect())
        .unwrap_or_default();
    let rows = records
        .filter(|record| record.iter().any(|cell| !cell.trim().is_empty()))
        .collect();

    CsvTable { headers, rows }
}

/// Quote `value` if it contains a quote, comma or line break.
pub fn escape_field(value: &str) -> String {
    if value.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Serialize a header row followed by `rows`. Records are joined with `\n`
/// and there is no trailing newline.
pub fn serialize_csv<H, R, C>(headers: &[H], rows: R) -> String
where
    H: AsRef<str>,
    R: IntoIterator,
    R::Item: IntoIterator<Item = C>,
    C: AsRef<str>,
{
    let mut lines = vec![join_record(headers.iter())];
    lines.extend(rows.into_iter().map(|row| join_record(row.into_iter())));
    lines.join("\n")
}

fn join_record<I, C>(cells: I) -> String
where
    I: Iterator<Item = C>,
    C: AsRef<str>,
{
    cells
        .map(|cell| escape_field(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn round_trip_preserves_header_with_comma() {
        let text = serialize_csv(&["a,b", "c"], vec![vec!["1", "2"]]);
        assert_eq!(text, "\"a,b\",c\n1,2");

        let table = parse_csv(&text);
        assert_eq!(table.headers, strings(&["a,b", "c"]));
        assert_eq!(table.rows, vec![strings(&["1", "2"])]);
    }

    #[test]
    fn round_trip_with_quotes_and_newlines() {
        let rows = vec![strings(&["say \"hi\"", "line one\nline two", "plain"])];
        let text = serialize_csv(&["x", "y", "z"], rows.clone());

        let table = parse_csv(&text);
        assert_eq!(table.headers, strings(&["x", "y", "z"]));
        assert_eq!(table.rows, rows);
    }

    #[test]
    fn round_trip_trims_headers_and_drops_blank_rows() {
        let rows = vec![strings(&["1", "2"]), strings(&["", " "]), strings(&["3", "4"])];
        let text = serialize_csv(&[" a", "b "], rows);

        let table = parse_csv(&text);
        assert_eq!(table.headers, strings(&["a", "b"]));
        assert_eq!(table.rows, vec![strings(&["1", "2"]), strings(&["3", "4"])]);
    }

    #[test]
    fn handles_crlf_and_missing_final_newline() {
        let table = parse_csv("h1,h2\r\na,b\r\nc,d");
        assert_eq!(table.rows, vec![strings(&["a", "b"]), strings(&["c", "d"])]);
    }

    #[test]
    fn handles_bare_carriage_return() {
        let table = parse_csv("h1,h2\ra,b\r");
        assert_eq!(table.rows, vec![strings(&["a", "b"])]);
    }

    #[test]
    fn drops_blank_rows() {
        let table = parse_csv("h1,h2\n\na,b\n , \n\n");
        assert_eq!(table.rows, vec![strings(&["a", "b"])]);
    }

    #[test]
    fn trims_headers_only() {
        let table = parse_csv(" h1 , h2\n a , b ");
        assert_eq!(table.headers, strings(&["h1", "h2"]));
        assert_eq!(table.rows, vec![strings(&[" a ", " b "])]);
        assert_eq!(table.column("h2"), Some(1));
        assert_eq!(table.column("h3"), None);
    }

    #[test]
    fn keeps_trailing_empty_cell() {
        let table = parse_csv("h1,h2\na,");
        assert_eq!(table.rows, vec![strings(&["a", ""])]);
    }

    #[test]
    fn empty_input_has_no_headers() {
        let table = parse_csv("");
        assert!(table.headers.is_empty());
        assert!(table.rows.is_empty());
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("a\rb"), "\"a\rb\"");
        assert_eq!(escape_field(""), "");
    }
}
