use crate::models::Favorite;
use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Destructive,
    Failure,
}

/// A short message shown to the user after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub kind: NoticeKind,
}

impl Notice {
    fn new(title: &str, description: String, kind: NoticeKind) -> Self {
        Self {
            title: title.to_string(),
            description,
            kind,
        }
    }

    pub fn favorite_added(favorite: &Favorite) -> Self {
        Self::new(
            "Favorite added",
            format!("{} was added to your favorites.", favorite.name),
            NoticeKind::Info,
        )
    }

    pub fn favorite_removed() -> Self {
        Self::new(
            "Favorite removed",
            "The location was removed from your favorites.".to_string(),
            NoticeKind::Destructive,
        )
    }

    pub fn favorite_renamed() -> Self {
        Self::new(
            "Favorite updated",
            "The favorite's name was updated.".to_string(),
            NoticeKind::Info,
        )
    }

    pub fn favorites_saved() -> Self {
        Self::new(
            "Favorites saved",
            "Pending changes were written to storage.".to_string(),
            NoticeKind::Info,
        )
    }

    pub fn place_not_found(query: &str) -> Self {
        Self::new(
            "No results",
            format!("No place matches \"{}\".", query),
            NoticeKind::Failure,
        )
    }

    pub fn failure(action: &str, error: &Error) -> Self {
        let hint = if error.is_recoverable() {
            " Changes are kept for this session."
        } else {
            ""
        };
        Self::new(
            &format!("Could not {}", action),
            format!("{}.{}", error, hint),
            NoticeKind::Failure,
        )
    }
}
