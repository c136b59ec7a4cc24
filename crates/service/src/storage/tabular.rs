//! Delimited-text codec for record collections.
//!
//! Layout is header-first: the first line names the fields in order, every
//! following line maps positionally onto that header. Quoting follows the
//! usual CSV rules: a field containing the delimiter, a quote, or a line
//! break is wrapped in double quotes with embedded quotes doubled.
//!
//! Encoding an empty sequence yields the empty string, and decoding accepts
//! both the empty string and a header-only document as the empty collection.

use models::record::Record;

use crate::errors::ServiceError;

const DELIMITER: char = ',';
const QUOTE: char = '"';

/// Encode records as delimited text, header first.
///
/// The header comes from the first record's field set; keeping the field
/// set consistent across all records is the caller's responsibility.
pub fn encode(records: &[Record]) -> String {
    let mut out = String::new();
    let Some(first) = records.first() else {
        return out;
    };
    push_row(&mut out, first.field_names());
    for rec in records {
        push_row(&mut out, rec.values());
    }
    out
}

/// Decode delimited text into records. Empty input decodes to no records.
pub fn decode(text: &str) -> Result<Vec<Record>, ServiceError> {
    let mut rows = parse_rows(text)?.into_iter();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let mut records = Vec::new();
    for (i, row) in rows.enumerate() {
        if row.len() != header.len() {
            return Err(ServiceError::Store(format!(
                "malformed row {}: {} fields, header has {}",
                i + 2,
                row.len(),
                header.len()
            )));
        }
        records.push(Record::from_row(&header, row));
    }
    Ok(records)
}

fn push_row<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        push_field(out, field);
    }
    out.push('\n');
}

fn push_field(out: &mut String, value: &str) {
    if value.contains([DELIMITER, QUOTE, '\n', '\r']) {
        out.push(QUOTE);
        for ch in value.chars() {
            if ch == QUOTE {
                out.push(QUOTE);
            }
            out.push(ch);
        }
        out.push(QUOTE);
    } else {
        out.push_str(value);
    }
}

/// Split raw text into rows of fields, honoring quoting. Blank lines are
/// skipped; a quoted field may span lines.
fn parse_rows(text: &str) -> Result<Vec<Vec<String>>, ServiceError> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    // Distinguishes a genuinely blank line from a row whose only field is
    // the quoted empty string.
    let mut row_started = false;

    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == QUOTE {
                if chars.peek() == Some(&QUOTE) {
                    chars.next();
                    field.push(QUOTE);
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(ch);
            }
            continue;
        }
        match ch {
            QUOTE if field.is_empty() => {
                in_quotes = true;
                row_started = true;
            }
            DELIMITER => {
                row.push(std::mem::take(&mut field));
                row_started = true;
            }
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if row_started || !field.is_empty() || !row.is_empty() {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                row_started = false;
            }
            _ => {
                field.push(ch);
                row_started = true;
            }
        }
    }
    if in_quotes {
        return Err(ServiceError::Store("unterminated quoted field".into()));
    }
    if row_started || !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    Ok(rows)
}
