use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The four descriptive columns shared by wardrobe rows and wear log entries.
///
/// No field is required; empty strings are stored as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClothingFields {
    pub category: String,
    pub color: String,
    pub style: String,
    pub size: String,
}

impl ClothingFields {
    pub fn new(
        category: impl Into<String>,
        color: impl Into<String>,
        style: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            color: color.into(),
            style: style.into(),
            size: size.into(),
        }
    }
}

/// A row of the wardrobe table. Identity is the row position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItem {
    pub category: String,
    pub color: String,
    pub style: String,
    pub size: String,
    /// Path of the stored photo relative to the data directory, or empty.
    #[serde(default)]
    pub image_path: String,
}

impl WardrobeItem {
    pub fn from_fields(fields: ClothingFields, image_path: impl Into<String>) -> Self {
        let ClothingFields {
            category,
            color,
            style,
            size,
        } = fields;
        Self {
            category,
            color,
            style,
            size,
            image_path: image_path.into(),
        }
    }

    pub fn fields(&self) -> ClothingFields {
        ClothingFields::new(&self.category, &self.color, &self.style, &self.size)
    }

    pub fn has_image(&self) -> bool {
        !self.image_path.is_empty()
    }

    /// One-line label used by list views and the wear log picker.
    pub fn label(&self) -> String {
        format!(
            "{} - {} - {} - {}",
            self.category, self.style, self.color, self.size
        )
    }
}

/// A dated snapshot of what was worn. Copied by value, never linked back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WearLogEntry {
    pub date: NaiveDate,
    pub category: String,
    pub color: String,
    pub style: String,
    pub size: String,
}

impl WearLogEntry {
    pub fn new(date: NaiveDate, fields: ClothingFields) -> Self {
        let ClothingFields {
            category,
            color,
            style,
            size,
        } = fields;
        Self {
            date,
            category,
            color,
            style,
            size,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub gender: String,
    pub height: String,
    pub weight: String,
    #[serde(alias = "body_type")]
    pub body_type: String,
    #[serde(alias = "favorite_brand")]
    pub favorite_brand: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityPost {
    #[serde(alias = "제목")]
    pub title: String,
    #[serde(alias = "내용")]
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Character card shown in the page header. Lives only in session memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Avatar {
    pub nickname: String,
    pub style: String,
    pub color: String,
    pub image: Option<ImageUpload>,
}

impl Avatar {
    /// Inline `data:` URI for the avatar image, if one was uploaded.
    pub fn image_data_uri(&self) -> Option<String> {
        let image = self.image.as_ref()?;
        let mime = mime_guess::from_path(&image.file_name).first_or(mime_guess::mime::IMAGE_PNG);
        Some(format!(
            "data:{};base64,{}",
            mime.essence_str(),
            STANDARD.encode(&image.bytes)
        ))
    }
}
