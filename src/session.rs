use std::collections::{BTreeMap, BTreeSet};

use chrono::Local;
use tracing::info;

use crate::error::{AUTH_INVALID_CREDENTIALS, SESSION_LOGGED_OUT};
use crate::layout::DataLayout;
use crate::model::{Avatar, Profile};
use crate::store::{self, LoadReport, TableStore};
use crate::table::TableKind;
use crate::{AppError, AppResult};

pub const USERNAME: &str = "closet";
pub const PASSWORD: &str = "1234";

/// One user's working session: the table store, the in-memory avatar and the
/// login flag.
///
/// Tables are read from disk only by [`Session::login`] and written only by
/// [`Session::save`] and [`Session::logout`].
#[derive(Debug)]
pub struct Session {
    layout: DataLayout,
    store: TableStore,
    avatar: Option<Avatar>,
    /// Tables whose files failed to load; set aside before the next save.
    unreadable: BTreeSet<TableKind>,
    logged_in: bool,
}

impl Session {
    pub fn new(layout: DataLayout) -> Self {
        Self {
            layout,
            store: TableStore::new(),
            avatar: None,
            unreadable: BTreeSet::new(),
            logged_in: false,
        }
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    /// Check the shared credential and load every table from disk.
    ///
    /// Tables that failed to load are returned; they start out empty. Their
    /// files are renamed aside by the next save instead of being overwritten.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> AppResult<BTreeMap<TableKind, AppError>> {
        if username != USERNAME || password != PASSWORD {
            info!(target: "closet", event = "login", outcome = "denied");
            return Err(AppError::new(
                AUTH_INVALID_CREDENTIALS,
                "Wrong username or password",
            ));
        }

        let LoadReport { store, failures } = TableStore::load(&self.layout);
        self.store = store;
        self.unreadable = failures.keys().copied().collect();
        self.logged_in = true;
        info!(
            target: "closet",
            event = "login",
            outcome = "allow",
            failed_tables = failures.len(),
        );
        Ok(failures)
    }

    /// Write all four tables. Files that failed to load at login are renamed
    /// aside first so their rows survive.
    pub fn save(&mut self) -> AppResult<()> {
        self.ensure_logged_in()?;
        let at = Local::now().naive_local();
        for table in self.unreadable.clone() {
            store::set_aside(&self.layout, table, at)?;
            self.unreadable.remove(&table);
        }
        self.store.save(&self.layout)
    }

    /// Save, then drop the session state. A failed save keeps the session
    /// logged in so nothing is lost.
    pub fn logout(&mut self) -> AppResult<()> {
        self.save()?;
        self.store = TableStore::new();
        self.avatar = None;
        self.logged_in = false;
        info!(target: "closet", event = "logout", outcome = "ok");
        Ok(())
    }

    pub fn store(&self) -> AppResult<&TableStore> {
        self.ensure_logged_in()?;
        Ok(&self.store)
    }

    pub fn store_mut(&mut self) -> AppResult<&mut TableStore> {
        self.ensure_logged_in()?;
        Ok(&mut self.store)
    }

    pub fn avatar(&self) -> Option<&Avatar> {
        self.avatar.as_ref()
    }

    /// The avatar is never written to disk.
    pub fn set_avatar(&mut self, avatar: Avatar) -> AppResult<()> {
        self.ensure_logged_in()?;
        self.avatar = Some(avatar);
        Ok(())
    }

    pub fn profile(&self) -> AppResult<Option<&Profile>> {
        Ok(self.store()?.profile())
    }

    pub fn set_profile(&mut self, profile: Profile) -> AppResult<()> {
        self.store_mut()?.set_profile(profile);
        Ok(())
    }

    fn ensure_logged_in(&self) -> AppResult<()> {
        if self.logged_in {
            Ok(())
        } else {
            Err(AppError::new(SESSION_LOGGED_OUT, "Log in first"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::community::PostDraft;
    use crate::model::ClothingFields;

    fn session(dir: &tempfile::TempDir) -> Session {
        Session::new(DataLayout::new(dir.path().join("data")))
    }

    #[test]
    fn wrong_password_stays_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        let err = s.login(USERNAME, "nope").unwrap_err();
        assert_eq!(err.code(), AUTH_INVALID_CREDENTIALS);
        assert!(!s.is_logged_in());
        assert_eq!(s.store().unwrap_err().code(), SESSION_LOGGED_OUT);
    }

    #[test]
    fn edits_are_lost_without_save() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        s.login(USERNAME, PASSWORD).unwrap();
        s.store_mut()
            .unwrap()
            .add_post(PostDraft::new("t", "c"))
            .unwrap();

        let mut again = session(&dir);
        again.login(USERNAME, PASSWORD).unwrap();
        assert!(again.store().unwrap().posts().is_empty());
        assert!(!s.layout().root().exists());
    }

    #[test]
    fn logout_persists_and_login_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        s.login(USERNAME, PASSWORD).unwrap();
        let layout = s.layout().clone();
        s.store_mut()
            .unwrap()
            .add_wardrobe_item(&layout, ClothingFields::new("상의", "검정", "캐주얼", "M"), None)
            .unwrap();
        s.set_profile(Profile {
            gender: "남".into(),
            ..Profile::default()
        })
        .unwrap();
        s.logout().unwrap();
        assert!(!s.is_logged_in());

        let failures = s.login(USERNAME, PASSWORD).unwrap();
        assert!(failures.is_empty());
        assert_eq!(s.store().unwrap().wardrobe().len(), 1);
        assert_eq!(s.profile().unwrap().map(|p| p.gender.as_str()), Some("남"));
    }

    #[test]
    fn avatar_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        s.login(USERNAME, PASSWORD).unwrap();
        s.set_avatar(Avatar {
            nickname: "옷장주인".into(),
            ..Avatar::default()
        })
        .unwrap();
        s.save().unwrap();
        assert_eq!(s.avatar().map(|a| a.nickname.as_str()), Some("옷장주인"));

        s.logout().unwrap();
        assert!(s.avatar().is_none());
        s.login(USERNAME, PASSWORD).unwrap();
        assert!(s.avatar().is_none());
    }

    #[test]
    fn save_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        assert_eq!(s.save().unwrap_err().code(), SESSION_LOGGED_OUT);
    }

    #[test]
    fn save_sets_unreadable_tables_aside() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = session(&dir);
        let root = s.layout().root().to_path_buf();
        std::fs::create_dir_all(&root).unwrap();
        let broken = "category,color,style,size,imagePath\nTop,Red,Casual,M,,surplus\n";
        std::fs::write(root.join("wardrobe.csv"), broken).unwrap();

        let failures = s.login(USERNAME, PASSWORD).unwrap();
        assert!(failures.contains_key(&TableKind::Wardrobe));
        s.store_mut()
            .unwrap()
            .add_post(PostDraft::new("t", "c"))
            .unwrap();
        s.logout().unwrap();

        let kept: Vec<_> = std::fs::read_dir(&root)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("wardrobe.csv.corrupt-"))
            })
            .collect();
        assert_eq!(kept.len(), 1);
        assert_eq!(std::fs::read_to_string(&kept[0]).unwrap(), broken);

        // The fresh file loads cleanly and is not moved again.
        assert!(s.login(USERNAME, PASSWORD).unwrap().is_empty());
        s.save().unwrap();
        assert_eq!(s.store().unwrap().posts().len(), 1);
    }
}
