use std::fs;

use anyhow::Result;
use chrono::NaiveDate;
use closet_lib::community::PostDraft;
use closet_lib::model::{ClothingFields, ImageUpload, Profile};
use closet_lib::table::TableKind;
use closet_lib::wear_log::WearSource;
use closet_lib::{DataLayout, TableStore};
use tempfile::{tempdir, TempDir};

fn layout(dir: &TempDir) -> DataLayout {
    DataLayout::new(dir.path().join("data"))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn populated(layout: &DataLayout) -> Result<TableStore> {
    let mut store = TableStore::new();
    store.add_wardrobe_item(
        layout,
        ClothingFields::new("Outer", "Navy", "Formal, slim", "L"),
        None,
    )?;
    store.add_wardrobe_item(
        layout,
        ClothingFields::new("상의", "검정", "캐주얼", "M"),
        Some(&ImageUpload {
            file_name: "shirt.png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }),
    )?;
    store.add_wardrobe_item(layout, ClothingFields::new("", "", "", ""), None)?;
    store.log_wear(date(2024, 3, 1), WearSource::Wardrobe(0))?;
    store.log_wear(
        date(2024, 3, 2),
        WearSource::Manual(ClothingFields::new("Top", "\"Off\" white", "Line\nbreak", "S")),
    )?;
    store.set_profile(Profile {
        gender: "여".into(),
        height: "165".into(),
        weight: "52".into(),
        body_type: "slim".into(),
        favorite_brand: "무신사".into(),
    });
    store.add_post(PostDraft::new("첫 글", "안녕하세요"))?;
    store.add_post(PostDraft::new("Second", "multi\nline"))?;
    Ok(store)
}

#[test]
fn empty_directory_loads_four_empty_tables() -> Result<()> {
    let dir = tempdir()?;
    let report = TableStore::load(&layout(&dir));
    assert!(report.is_clean());
    assert_eq!(report.store, TableStore::new());
    assert!(report.store.profile().is_none());
    Ok(())
}

#[test]
fn save_then_load_round_trips_every_table() -> Result<()> {
    let dir = tempdir()?;
    let layout = layout(&dir);
    let store = populated(&layout)?;
    store.save(&layout)?;

    let report = TableStore::load(&layout);
    assert!(report.is_clean(), "failures: {:?}", report.failures);
    assert_eq!(report.store, store);
    Ok(())
}

#[test]
fn saving_twice_writes_identical_bytes() -> Result<()> {
    let dir = tempdir()?;
    let layout = layout(&dir);
    let store = populated(&layout)?;

    store.save(&layout)?;
    let first: Vec<Vec<u8>> = TableKind::iter()
        .map(|t| fs::read(layout.table_path(t)))
        .collect::<Result<_, _>>()?;

    TableStore::load(&layout).store.save(&layout)?;
    let second: Vec<Vec<u8>> = TableKind::iter()
        .map(|t| fs::read(layout.table_path(t)))
        .collect::<Result<_, _>>()?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn files_use_the_documented_headers_and_keys() -> Result<()> {
    let dir = tempdir()?;
    let layout = layout(&dir);
    populated(&layout)?.save(&layout)?;

    let wardrobe = fs::read_to_string(layout.table_path(TableKind::Wardrobe))?;
    assert!(wardrobe.starts_with("category,color,style,size,imagePath"));
    assert!(wardrobe.contains("\"Formal, slim\""));

    let calendar = fs::read_to_string(layout.table_path(TableKind::WearLog))?;
    assert!(calendar.starts_with("date,category,color,style,size"));
    assert!(calendar.contains("2024-03-01,Outer,Navy"));

    let profile: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(layout.table_path(TableKind::Profile))?)?;
    assert_eq!(profile["bodyType"], "slim");
    assert_eq!(profile["favoriteBrand"], "무신사");

    let posts: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(layout.table_path(TableKind::Posts))?)?;
    assert_eq!(posts[0]["title"], "첫 글");
    assert_eq!(posts[1]["content"], "multi\nline");
    Ok(())
}

#[test]
fn legacy_korean_files_are_understood() -> Result<()> {
    let dir = tempdir()?;
    let layout = layout(&dir);
    fs::create_dir_all(layout.images_dir())?;
    fs::write(layout.images_dir().join("old.jpg"), b"jpg")?;
    fs::write(
        layout.table_path(TableKind::Wardrobe),
        "카테고리,색상,스타일,사이즈,이미지\n상의,흰색,캐주얼,M,data/images/old.jpg\n",
    )?;
    fs::write(
        layout.table_path(TableKind::WearLog),
        "날짜,카테고리,색상,스타일,사이즈\n2023-12-24,아우터,검정,포멀,L\n",
    )?;
    fs::write(
        layout.table_path(TableKind::Posts),
        r#"[{"제목": "옛날 글", "내용": "본문"}]"#,
    )?;
    fs::write(
        layout.table_path(TableKind::Profile),
        r#"{"gender": "남", "body_type": "보통", "favorite_brand": "나이키"}"#,
    )?;

    let report = TableStore::load(&layout);
    assert!(report.is_clean(), "failures: {:?}", report.failures);
    let store = report.store;
    assert_eq!(store.wardrobe()[0].color, "흰색");
    assert_eq!(
        store.wardrobe_image(&layout, 0),
        Some(layout.images_dir().join("old.jpg"))
    );
    assert_eq!(store.wear_log()[0].date, date(2023, 12, 24));
    assert_eq!(store.posts()[0].title, "옛날 글");
    let profile = store.profile().expect("profile loaded");
    assert_eq!(profile.body_type, "보통");
    assert_eq!(profile.favorite_brand, "나이키");
    Ok(())
}

#[test]
fn one_corrupt_table_does_not_block_the_others() -> Result<()> {
    let dir = tempdir()?;
    let layout = layout(&dir);
    populated(&layout)?.save(&layout)?;
    fs::write(
        layout.table_path(TableKind::Wardrobe),
        "category,color,style,size,imagePath\nTop,Red,Casual,M,,surplus\n",
    )?;
    fs::write(layout.table_path(TableKind::Profile), "[1, 2]")?;

    let report = TableStore::load(&layout);
    let failed: Vec<_> = report.failures.keys().copied().collect();
    assert_eq!(failed, vec![TableKind::Wardrobe, TableKind::Profile]);
    assert!(report.failures.values().all(|err| err.is_storage_corrupt()));
    let wardrobe_err = &report.failures[&TableKind::Wardrobe];
    assert_eq!(wardrobe_err.context().get("line").map(String::as_str), Some("2"));
    assert!(report.store.wardrobe().is_empty());
    assert!(report.store.profile().is_none());
    assert_eq!(report.store.wear_log().len(), 2);
    assert_eq!(report.store.posts().len(), 2);
    Ok(())
}

#[test]
fn missing_image_file_is_silently_ignored() -> Result<()> {
    let dir = tempdir()?;
    let layout = layout(&dir);
    let store = populated(&layout)?;
    let image = store.wardrobe_image(&layout, 1).expect("image stored");
    fs::remove_file(image)?;

    assert!(store.wardrobe()[1].has_image());
    assert_eq!(store.wardrobe_image(&layout, 1), None);
    assert_eq!(store.wardrobe_image(&layout, 0), None);
    Ok(())
}

#[test]
fn save_into_unwritable_location_reports_error() -> Result<()> {
    let dir = tempdir()?;
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, b"file, not a directory")?;
    let layout = DataLayout::new(blocker.join("data"));

    let err = TableStore::new()
        .save(&layout)
        .expect_err("save under a regular file must fail");
    assert_eq!(
        err.context().get("operation").map(String::as_str),
        Some("create_data_dir")
    );
    Ok(())
}

#[test]
fn failed_table_write_names_the_table() -> Result<()> {
    let dir = tempdir()?;
    let layout = layout(&dir);
    fs::create_dir_all(layout.table_path(TableKind::Profile))?;

    let err = populated(&layout)?
        .save(&layout)
        .expect_err("a directory in place of user_info.json must fail the save");
    assert!(err.code().starts_with("IO/"), "code: {}", err.code());
    let context = err.context();
    assert_eq!(context.get("operation").map(String::as_str), Some("save_table"));
    assert_eq!(context.get("table").map(String::as_str), Some("profile"));
    assert!(context
        .get("path")
        .is_some_and(|path| path.ends_with("user_info.json")));
    Ok(())
}

#[test]
fn image_paths_outside_the_images_dir_are_not_shown() -> Result<()> {
    let dir = tempdir()?;
    let layout = layout(&dir);
    fs::create_dir_all(layout.images_dir())?;
    let secret = dir.path().join("secret.txt");
    fs::write(&secret, b"private")?;

    let mut csv = String::from("category,color,style,size,imagePath\n");
    csv.push_str("Top,Red,Casual,M,../secret.txt\n");
    csv.push_str(&format!("Top,Red,Casual,M,{}\n", secret.display()));
    fs::write(layout.table_path(TableKind::Wardrobe), csv)?;

    let store = TableStore::load(&layout).store;
    assert_eq!(store.wardrobe().len(), 2);
    assert_eq!(store.wardrobe_image(&layout, 0), None);
    assert_eq!(store.wardrobe_image(&layout, 1), None);
    Ok(())
}
