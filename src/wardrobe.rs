use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};

use crate::images;
use crate::layout::DataLayout;
use crate::model::{ClothingFields, ImageUpload, WardrobeItem};
use crate::store::TableStore;
use crate::AppResult;

impl TableStore {
    /// Append a clothing item, writing its photo to the image directory first.
    ///
    /// Field contents are not validated; empty strings are accepted.
    pub fn add_wardrobe_item(
        &mut self,
        layout: &DataLayout,
        fields: ClothingFields,
        image: Option<&ImageUpload>,
    ) -> AppResult<WardrobeItem> {
        self.add_wardrobe_item_at(layout, fields, image, Local::now().naive_local())
    }

    pub fn add_wardrobe_item_at(
        &mut self,
        layout: &DataLayout,
        fields: ClothingFields,
        image: Option<&ImageUpload>,
        at: NaiveDateTime,
    ) -> AppResult<WardrobeItem> {
        let image_path = match image {
            Some(upload) => images::store_upload(layout, upload, at)?,
            None => String::new(),
        };

        let item = WardrobeItem::from_fields(fields, image_path);
        self.wardrobe.push(item.clone());
        tracing::debug!(
            target: "closet",
            event = "wardrobe_item_added",
            row = self.wardrobe.len() - 1,
            has_image = item.has_image(),
        );
        Ok(item)
    }

    /// Photo of the row at `index`, if one was recorded and still exists.
    pub fn wardrobe_image(&self, layout: &DataLayout, index: usize) -> Option<PathBuf> {
        let item = self.wardrobe.get(index)?;
        if !item.has_image() {
            return None;
        }
        images::resolve(layout, &item.image_path)
    }
}
