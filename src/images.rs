use std::fs;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDateTime;

use crate::layout::{DataLayout, IMAGES_DIR};
use crate::model::ImageUpload;
use crate::{AppError, AppResult};

const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";
const FALLBACK_NAME: &str = "upload";

/// Keep only the last path component of an uploaded name.
pub fn sanitize_file_name(raw: &str) -> String {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    match last {
        "" | "." | ".." => FALLBACK_NAME.to_string(),
        name => name.to_string(),
    }
}

/// `<timestamp>_<originalFilename>`.
pub fn stored_file_name(upload_name: &str, at: NaiveDateTime) -> String {
    format!(
        "{}_{}",
        at.format(TIMESTAMP_FORMAT),
        sanitize_file_name(upload_name)
    )
}

/// Write an uploaded image under `images/` and return the path to record in
/// the wardrobe row, relative to the data directory.
///
/// Two uploads with the same name in the same second share a file; the later
/// one wins.
pub fn store_upload(
    layout: &DataLayout,
    upload: &ImageUpload,
    at: NaiveDateTime,
) -> AppResult<String> {
    let dir = layout.images_dir();
    fs::create_dir_all(&dir).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "create_images_dir")
            .with_context("path", dir.display().to_string())
    })?;

    let file_name = stored_file_name(&upload.file_name, at);
    let target = dir.join(&file_name);
    fs::write(&target, &upload.bytes).map_err(|err| {
        AppError::from(err)
            .with_context("operation", "write_image")
            .with_context("path", target.display().to_string())
    })?;

    tracing::info!(
        target: "closet",
        event = "image_stored",
        file_name = file_name.as_str(),
        bytes = upload.bytes.len(),
    );

    Ok(format!("{IMAGES_DIR}/{file_name}"))
}

/// Resolve a recorded image path to an existing file under `images/`.
///
/// Empty paths and files that no longer exist both yield `None`; a missing
/// image is never an error. Paths recorded relative to the working directory
/// by older versions (`data/images/...`) fall back to a lookup by file name.
/// Nothing outside the image directory is ever returned.
pub fn resolve(layout: &DataLayout, image_path: &str) -> Option<PathBuf> {
    if image_path.trim().is_empty() {
        return None;
    }

    let recorded = Path::new(image_path);
    if let Some(direct) = within_images_dir(layout, recorded) {
        if direct.is_file() {
            return Some(direct);
        }
    }

    let by_name = layout.images_dir().join(recorded.file_name()?);
    by_name.is_file().then_some(by_name)
}

/// `recorded` mapped into the image directory, if it names a path inside it.
fn within_images_dir(layout: &DataLayout, recorded: &Path) -> Option<PathBuf> {
    let images_dir = layout.images_dir();
    let rest = if recorded.is_absolute() {
        recorded.strip_prefix(&images_dir).ok()?
    } else {
        recorded.strip_prefix(IMAGES_DIR).ok()?
    };
    let mut components = rest.components().peekable();
    components.peek()?;
    if !components.all(|c| matches!(c, Component::Normal(_))) {
        return None;
    }
    Some(images_dir.join(rest))
}
