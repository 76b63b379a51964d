use std::fmt;

pub mod csv;
pub mod rows;

/// The four persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKind {
    Wardrobe,
    WearLog,
    Profile,
    Posts,
}

impl TableKind {
    pub const ALL: [TableKind; 4] = [
        TableKind::Wardrobe,
        TableKind::WearLog,
        TableKind::Profile,
        TableKind::Posts,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            TableKind::Wardrobe => "wardrobe",
            TableKind::WearLog => "calendar",
            TableKind::Profile => "profile",
            TableKind::Posts => "posts",
        }
    }

    pub const fn file_name(self) -> &'static str {
        match self {
            TableKind::Wardrobe => "wardrobe.csv",
            TableKind::WearLog => "calendar.csv",
            TableKind::Profile => "user_info.json",
            TableKind::Posts => "community.json",
        }
    }

    pub fn iter() -> impl Iterator<Item = TableKind> {
        Self::ALL.into_iter()
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
