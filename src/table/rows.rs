use chrono::{NaiveDate, NaiveDateTime};

use super::csv::{self, Record};
use super::TableKind;
use crate::model::{ClothingFields, WardrobeItem, WearLogEntry};
use crate::{AppError, AppResult};

pub const WARDROBE_COLUMNS: [&str; 5] = ["category", "color", "style", "size", "imagePath"];
pub const WEAR_LOG_COLUMNS: [&str; 5] = ["date", "category", "color", "style", "size"];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Accepted header spellings per column, including the ones written by the
/// first version of the app.
fn aliases(column: &str) -> &'static [&'static str] {
    match column {
        "category" => &["category", "카테고리"],
        "color" => &["color", "색상"],
        "style" => &["style", "스타일"],
        "size" => &["size", "사이즈"],
        "imagePath" => &["imagePath", "image_path", "이미지"],
        "date" => &["date", "날짜"],
        _ => &[],
    }
}

struct Header {
    width: usize,
    positions: Vec<Option<usize>>,
}

impl Header {
    fn resolve(
        table: TableKind,
        record: &Record,
        columns: &[&str],
        required: &[&str],
    ) -> AppResult<Self> {
        let positions: Vec<Option<usize>> = columns
            .iter()
            .map(|column| {
                let names = aliases(column);
                record
                    .fields
                    .iter()
                    .position(|h| names.contains(&h.trim()))
            })
            .collect();

        for (column, position) in columns.iter().zip(&positions) {
            if position.is_none() && required.contains(column) {
                return Err(AppError::storage_corrupt(
                    table.as_str(),
                    format!("missing column `{column}`"),
                )
                .with_context("line", record.line.to_string()));
            }
        }

        Ok(Self {
            width: record.fields.len(),
            positions,
        })
    }

    fn cells(&self, table: TableKind, record: &Record) -> AppResult<Vec<String>> {
        if record.fields.len() > self.width {
            return Err(AppError::storage_corrupt(
                table.as_str(),
                format!(
                    "expected {} fields, found {}",
                    self.width,
                    record.fields.len()
                ),
            )
            .with_context("line", record.line.to_string()));
        }
        Ok(self
            .positions
            .iter()
            .map(|pos| {
                pos.and_then(|idx| record.fields.get(idx))
                    .cloned()
                    .unwrap_or_default()
            })
            .collect())
    }
}

fn parse_records(table: TableKind, text: &str) -> AppResult<Vec<Record>> {
    let records = csv::parse(text).map_err(|err| {
        AppError::storage_corrupt(table.as_str(), err.to_string())
            .with_context("line", err.line().to_string())
    })?;
    if records.is_empty() {
        return Err(AppError::storage_corrupt(
            table.as_str(),
            "file has no header row",
        ));
    }
    Ok(records)
}

fn parse_date(raw: &str, line: usize) -> AppResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|err| {
            AppError::storage_corrupt(
                TableKind::WearLog.as_str(),
                format!("invalid date `{raw}`: {err}"),
            )
            .with_context("line", line.to_string())
        })
}

pub fn decode_wardrobe(text: &str) -> AppResult<Vec<WardrobeItem>> {
    let table = TableKind::Wardrobe;
    let records = parse_records(table, text)?;
    let header = Header::resolve(
        table,
        &records[0],
        &WARDROBE_COLUMNS,
        &WARDROBE_COLUMNS[..4],
    )?;

    records[1..]
        .iter()
        .map(|record| {
            let mut cells = header.cells(table, record)?.into_iter();
            let mut next = || cells.next().unwrap_or_default();
            let fields = ClothingFields::new(next(), next(), next(), next());
            Ok(WardrobeItem::from_fields(fields, next()))
        })
        .collect()
}

pub fn encode_wardrobe(items: &[WardrobeItem]) -> String {
    let mut out = String::new();
    csv::write_record(&mut out, &WARDROBE_COLUMNS);
    for item in items {
        csv::write_record(
            &mut out,
            &[
                item.category.as_str(),
                item.color.as_str(),
                item.style.as_str(),
                item.size.as_str(),
                item.image_path.as_str(),
            ],
        );
    }
    out
}

pub fn decode_wear_log(text: &str) -> AppResult<Vec<WearLogEntry>> {
    let table = TableKind::WearLog;
    let records = parse_records(table, text)?;
    let header = Header::resolve(table, &records[0], &WEAR_LOG_COLUMNS, &WEAR_LOG_COLUMNS)?;

    records[1..]
        .iter()
        .map(|record| {
            let mut cells = header.cells(table, record)?.into_iter();
            let mut next = || cells.next().unwrap_or_default();
            let date = parse_date(&next(), record.line)?;
            Ok(WearLogEntry::new(
                date,
                ClothingFields::new(next(), next(), next(), next()),
            ))
        })
        .collect()
}

pub fn encode_wear_log(entries: &[WearLogEntry]) -> String {
    let mut out = String::new();
    csv::write_record(&mut out, &WEAR_LOG_COLUMNS);
    for entry in entries {
        let date = entry.date.format(DATE_FORMAT).to_string();
        csv::write_record(
            &mut out,
            &[
                date.as_str(),
                entry.category.as_str(),
                entry.color.as_str(),
                entry.style.as_str(),
                entry.size.as_str(),
            ],
        );
    }
    out
}
