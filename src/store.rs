use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::layout::DataLayout;
use crate::model::{CommunityPost, Profile, WardrobeItem, WearLogEntry};
use crate::table::{rows, TableKind};
use crate::{AppError, AppResult};

/// In-memory copy of the four tables.
///
/// Mutations only touch memory; nothing reaches disk until [`TableStore::save`]
/// is called. Edits made after the last save are lost when the process exits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStore {
    pub(crate) wardrobe: Vec<WardrobeItem>,
    pub(crate) wear_log: Vec<WearLogEntry>,
    pub(crate) profile: Option<Profile>,
    pub(crate) posts: Vec<CommunityPost>,
}

/// Result of [`TableStore::load`]: the loaded tables plus any per-table
/// failures. A failed table is left at its empty default.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub store: TableStore,
    pub failures: BTreeMap<TableKind, AppError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl TableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wardrobe(&self) -> &[WardrobeItem] {
        &self.wardrobe
    }

    pub fn wear_log(&self) -> &[WearLogEntry] {
        &self.wear_log
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Replace the profile wholesale.
    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    /// Posts in insertion order (oldest first).
    pub fn posts(&self) -> &[CommunityPost] {
        &self.posts
    }

    pub fn load(layout: &DataLayout) -> LoadReport {
        let mut report = LoadReport::default();

        for table in TableKind::iter() {
            let path = layout.table_path(table);
            let text = match read_optional(&path) {
                Ok(Some(text)) => text,
                Ok(None) => continue,
                Err(err) => {
                    record_failure(&mut report, table, &path, err);
                    continue;
                }
            };

            let loaded = match table {
                TableKind::Wardrobe => rows::decode_wardrobe(&text)
                    .map(|items| report.store.wardrobe = items),
                TableKind::WearLog => rows::decode_wear_log(&text)
                    .map(|entries| report.store.wear_log = entries),
                TableKind::Profile => {
                    decode_profile(&text).map(|profile| report.store.profile = profile)
                }
                TableKind::Posts => decode_posts(&text).map(|posts| report.store.posts = posts),
            };
            if let Err(err) = loaded {
                record_failure(&mut report, table, &path, err);
            }
        }

        info!(
            target: "closet",
            event = "tables_loaded",
            root = %layout.root().display(),
            wardrobe = report.store.wardrobe.len(),
            calendar = report.store.wear_log.len(),
            posts = report.store.posts.len(),
            failures = report.failures.len(),
        );
        report
    }

    /// Rewrite all four backing files.
    pub fn save(&self, layout: &DataLayout) -> AppResult<()> {
        fs::create_dir_all(layout.root()).map_err(|err| {
            AppError::from(err)
                .with_context("operation", "create_data_dir")
                .with_context("path", layout.root().display().to_string())
        })?;

        for table in TableKind::iter() {
            let path = layout.table_path(table);
            let body = self.encode(table)?;
            write_atomic(&path, body.as_bytes()).map_err(|err| {
                AppError::from(err)
                    .with_context("operation", "save_table")
                    .with_context("table", table.as_str())
                    .with_context("path", path.display().to_string())
            })?;
        }

        info!(
            target: "closet",
            event = "tables_saved",
            root = %layout.root().display(),
            wardrobe = self.wardrobe.len(),
            calendar = self.wear_log.len(),
            posts = self.posts.len(),
        );
        Ok(())
    }

    fn encode(&self, table: TableKind) -> AppResult<String> {
        Ok(match table {
            TableKind::Wardrobe => rows::encode_wardrobe(&self.wardrobe),
            TableKind::WearLog => rows::encode_wear_log(&self.wear_log),
            TableKind::Profile => match &self.profile {
                Some(profile) => serde_json::to_string(profile)?,
                None => "{}".to_string(),
            },
            TableKind::Posts => serde_json::to_string(&self.posts)?,
        })
    }
}

/// Infix of the name an unreadable table file is renamed to.
pub const SET_ASIDE_INFIX: &str = ".corrupt-";

/// Rename the backing file of `table` to `<file>.corrupt-<timestamp>` so a
/// later save does not overwrite rows that failed to load.
///
/// Returns the new path, or `None` when there is no file to move.
pub fn set_aside(
    layout: &DataLayout,
    table: TableKind,
    at: NaiveDateTime,
) -> AppResult<Option<PathBuf>> {
    let path = layout.table_path(table);
    if !path.exists() {
        return Ok(None);
    }

    let base = format!(
        "{}{SET_ASIDE_INFIX}{}",
        table.file_name(),
        at.format("%Y%m%d-%H%M%S")
    );
    let target = (0..100)
        .map(|suffix| {
            if suffix == 0 {
                layout.root().join(&base)
            } else {
                layout.root().join(format!("{base}-{suffix:02}"))
            }
        })
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| {
            AppError::new("STORAGE/NAME_COLLISION", "Unable to pick a name for the unreadable file")
                .with_context("table", table.as_str())
        })?;

    fs::rename(&path, &target).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "set_aside_table")
            .with_context("table", table.as_str())
            .with_context("path", path.display().to_string())
    })?;

    warn!(
        target: "closet",
        event = "table_set_aside",
        table = table.as_str(),
        file = %target.display(),
    );
    Ok(Some(target))
}

fn record_failure(report: &mut LoadReport, table: TableKind, path: &Path, err: AppError) {
    let err = err
        .with_context("table", table.as_str())
        .with_context("path", path.display().to_string());
    warn!(
        target: "closet",
        event = "table_load_failed",
        table = table.as_str(),
        code = err.code(),
        error = %err,
    );
    report.failures.insert(table, err);
}

fn read_optional(path: &Path) -> AppResult<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) if err.kind() == io::ErrorKind::InvalidData => Err(AppError::storage_corrupt(
            "",
            "file is not valid UTF-8",
        )),
        Err(err) => Err(err.into()),
    }
}

fn corrupt_json(table: TableKind, err: serde_json::Error) -> AppError {
    let line = err.line();
    AppError::storage_corrupt(table.as_str(), err.to_string())
        .with_context("line", line.to_string())
        .with_cause(err)
}

fn decode_profile(text: &str) -> AppResult<Option<Profile>> {
    let table = TableKind::Profile;
    let value: Value = serde_json::from_str(text).map_err(|err| corrupt_json(table, err))?;
    let Some(map) = value.as_object() else {
        return Err(AppError::storage_corrupt(
            table.as_str(),
            "expected a JSON object",
        ));
    };
    if map.is_empty() {
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|err| corrupt_json(table, err))
}

fn decode_posts(text: &str) -> AppResult<Vec<CommunityPost>> {
    serde_json::from_str(text).map_err(|err| corrupt_json(TableKind::Posts, err))
}

/// Write to a temporary sibling, flush it to disk and rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
