//! Minimal RFC 4180 CSV reading and writing
//!
//! Quoted fields may contain commas, doubled quotes and line breaks. A leading
//! UTF-8 byte order mark is skipped when reading and can be emitted when writing
//! so spreadsheet tools pick up the encoding.

use crate::RainAlertError;

/// UTF-8 byte order mark
pub const BOM: char = '\u{feff}';

/// Parse CSV text into records of fields. Blank lines are skipped.
pub fn parse(text: &str) -> Result<Vec<Vec<String>>, RainAlertError> {
    let text = text.strip_prefix(BOM).unwrap_or(text);

    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1usize;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            '"' => {
                return Err(RainAlertError::parse(format!(
                    "Unexpected quote inside unquoted field on line {line}"
                )));
            }
            ',' => record.push(std::mem::take(&mut field)),
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(RainAlertError::parse(format!(
            "Unterminated quoted field starting before line {line}"
        )));
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }

    Ok(records)
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}

/// Quote a field when it contains a delimiter, quote or line break
#[must_use]
pub fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Builds CSV text row by row with `\n` line endings
#[derive(Debug, Default)]
pub struct CsvWriter {
    output: String,
}

impl CsvWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the document with a byte order mark
    #[must_use]
    pub fn with_bom() -> Self {
        Self {
            output: BOM.to_string(),
        }
    }

    pub fn write_row<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let row: Vec<String> = fields.into_iter().map(|f| escape(f.as_ref())).collect();
        self.output.push_str(&row.join(","));
        self.output.push('\n');
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let records = parse("a,b,c\n1,2,3\n").unwrap();
        assert_eq!(records, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_parse_quoted_fields() {
        let records = parse("name,address\r\n\"ICOOL A\",\"12 Lê Lợi, Quận 1\"\r\n\"Say \"\"hi\"\"\",\"two\nlines\"").unwrap();
        assert_eq!(records[1], vec!["ICOOL A", "12 Lê Lợi, Quận 1"]);
        assert_eq!(records[2], vec!["Say \"hi\"", "two\nlines"]);
    }

    #[test]
    fn test_parse_skips_bom_and_blank_lines() {
        let records = parse("\u{feff}branch,lat\n\nX,1.0\n").unwrap();
        assert_eq!(records, vec![vec!["branch", "lat"], vec!["X", "1.0"]]);
    }

    #[test]
    fn test_parse_keeps_empty_fields() {
        let records = parse("a,,c\n").unwrap();
        assert_eq!(records, vec![vec!["a", "", "c"]]);
    }

    #[test]
    fn test_parse_rejects_unterminated_quote() {
        assert!(parse("a,\"open\n").is_err());
    }

    #[test]
    fn test_writer_escapes_and_bom() {
        let mut writer = CsvWriter::with_bom();
        writer.write_row(["branch", "summary_text"]);
        writer.write_row(["ICOOL A", "Mưa vào các giờ: 14h, 15h."]);
        let text = writer.finish();
        assert!(text.starts_with(BOM));
        assert!(text.ends_with("ICOOL A,\"Mưa vào các giờ: 14h, 15h.\"\n"));

        let parsed = parse(&text).unwrap();
        assert_eq!(parsed[1][1], "Mưa vào các giờ: 14h, 15h.");
    }
}
