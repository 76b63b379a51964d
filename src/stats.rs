use serde::Serialize;

use crate::model::WardrobeItem;

/// How many wardrobe rows share one column value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    pub value: String,
    pub count: usize,
}

/// Count rows per value, most frequent first. Ties keep the order in which
/// each value first appears in the wardrobe.
pub fn distribution<'a, F>(wardrobe: &'a [WardrobeItem], key: F) -> Vec<Bucket>
where
    F: Fn(&'a WardrobeItem) -> &'a str,
{
    let mut buckets: Vec<Bucket> = Vec::new();
    for item in wardrobe {
        let value = key(item);
        match buckets.iter_mut().find(|b| b.value == value) {
            Some(bucket) => bucket.count += 1,
            None => buckets.push(Bucket {
                value: value.to_string(),
                count: 1,
            }),
        }
    }
    // stable sort keeps first-appearance order within equal counts
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

pub fn color_distribution(wardrobe: &[WardrobeItem]) -> Vec<Bucket> {
    distribution(wardrobe, |item| item.color.as_str())
}

pub fn style_distribution(wardrobe: &[WardrobeItem]) -> Vec<Bucket> {
    distribution(wardrobe, |item| item.style.as_str())
}
