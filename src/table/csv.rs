//! Minimal RFC 4180 reader/writer for the row-oriented tables.
//!
//! Fields containing a comma, quote, CR or LF are wrapped in double quotes with
//! inner quotes doubled. Records end with `\n`; `\r\n` is accepted on read.

use std::borrow::Cow;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CsvError {
    #[error("unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },
    #[error("unexpected character after closing quote on line {line}")]
    TrailingAfterQuote { line: usize },
}

impl CsvError {
    pub fn line(&self) -> usize {
        match self {
            CsvError::UnterminatedQuote { line } | CsvError::TrailingAfterQuote { line } => *line,
        }
    }
}

/// A parsed record together with the 1-based line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

pub fn escape_field(raw: &str) -> Cow<'_, str> {
    if raw.contains(['"', ',', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", raw.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(raw)
    }
}

pub fn write_record<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str(&escape_field(field.as_ref()));
    }
    out.push('\n');
}

/// Split `text` into records. Blank lines are skipped.
pub fn parse(text: &str) -> Result<Vec<Record>, CsvError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1usize;

    while chars.peek().is_some() {
        let start_line = line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut blank = true;

        loop {
            let Some(c) = chars.next() else {
                fields.push(std::mem::take(&mut field));
                break;
            };
            match c {
                '"' if field.is_empty() => {
                    blank = false;
                    loop {
                        match chars.next() {
                            None => return Err(CsvError::UnterminatedQuote { line: start_line }),
                            Some('"') if chars.peek() == Some(&'"') => {
                                chars.next();
                                field.push('"');
                            }
                            Some('"') => break,
                            Some(inner) => {
                                if inner == '\n' {
                                    line += 1;
                                }
                                field.push(inner);
                            }
                        }
                    }
                    match chars.peek() {
                        None | Some(',') | Some('\n') | Some('\r') => {}
                        Some(_) => return Err(CsvError::TrailingAfterQuote { line }),
                    }
                }
                ',' => {
                    blank = false;
                    fields.push(std::mem::take(&mut field));
                }
                '\r' if chars.peek() == Some(&'\n') => {}
                '\n' => {
                    line += 1;
                    fields.push(std::mem::take(&mut field));
                    break;
                }
                other => {
                    blank = false;
                    field.push(other);
                }
            }
        }

        if !blank {
            records.push(Record {
                line: start_line,
                fields,
            });
        }
    }

    Ok(records)
}
