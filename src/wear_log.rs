use chrono::NaiveDate;
use serde::Serialize;

use crate::error::WEAR_LOG_ITEM_NOT_FOUND;
use crate::model::{ClothingFields, WearLogEntry};
use crate::store::TableStore;
use crate::{AppError, AppResult};

/// Where the fields of a wear log entry come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WearSource {
    /// Copy the fields of the wardrobe row at this position.
    Wardrobe(usize),
    /// Freely typed fields.
    Manual(ClothingFields),
}

/// All-day calendar event projected from a wear log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub title: String,
    pub start: NaiveDate,
    pub all_day: bool,
}

impl TableStore {
    /// Append a wear log entry. Entries are not de-duplicated and the date is
    /// not checked against today.
    pub fn log_wear(&mut self, date: NaiveDate, source: WearSource) -> AppResult<WearLogEntry> {
        let fields = match source {
            WearSource::Wardrobe(index) => self
                .wardrobe
                .get(index)
                .map(|item| item.fields())
                .ok_or_else(|| {
                    AppError::new(WEAR_LOG_ITEM_NOT_FOUND, "No wardrobe item at that position")
                        .with_context("index", index.to_string())
                        .with_context("wardrobe_len", self.wardrobe.len().to_string())
                })?,
            WearSource::Manual(fields) => fields,
        };

        let entry = WearLogEntry::new(date, fields);
        self.wear_log.push(entry.clone());
        Ok(entry)
    }

    /// Wear log in insertion order as calendar events titled
    /// `<category> - <style>`.
    pub fn calendar_events(&self) -> Vec<CalendarEvent> {
        self.wear_log
            .iter()
            .map(|entry| CalendarEvent {
                title: format!("{} - {}", entry.category, entry.style),
                start: entry.date,
                all_day: true,
            })
            .collect()
    }
}
