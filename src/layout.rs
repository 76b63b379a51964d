use std::path::{Path, PathBuf};

use crate::table::TableKind;

pub const IMAGES_DIR: &str = "images";
pub const LOGS_DIR: &str = "logs";

/// Every backing path derived from one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table: TableKind) -> PathBuf {
        self.root.join(table.file_name())
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }
}
