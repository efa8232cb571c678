use crate::models::{now_millis, Favorite, GeoPoint};
use crate::storage::LocalStorage;
use crate::{Error, Result};
use std::collections::HashSet;

/// Storage key holding the JSON array of favorites
pub const FAVORITES_KEY: &str = "favoritos";

/// Hands out strictly increasing, millisecond-shaped ids.
#[derive(Debug, Clone, Copy)]
struct IdSequence {
    last: i64,
}

impl IdSequence {
    /// `None` once `last` is `i64::MAX`; the sequence is left untouched.
    fn next(&mut self, now_millis: i64) -> Option<i64> {
        let id = now_millis.max(self.last.checked_add(1)?);
        self.last = id;
        Some(id)
    }
}

/// The authoritative list of favorites, mirrored to local storage.
///
/// Every mutation rewrites the whole collection under [`FAVORITES_KEY`].
/// When that write fails the in-memory change is kept, the store is marked
/// dirty and the error is returned; [`FavoriteStore::flush`] retries.
pub struct FavoriteStore<S: LocalStorage> {
    storage: S,
    favorites: Vec<Favorite>,
    ids: IdSequence,
    dirty: bool,
}

impl<S: LocalStorage> FavoriteStore<S> {
    /// Load the persisted collection.
    ///
    /// Missing data gives an empty store. Malformed data is logged and also
    /// gives an empty store. Entries with a duplicate id, a blank name or
    /// out-of-range coordinates are dropped. Only a failing storage read is
    /// an error.
    pub fn load(storage: S) -> Result<Self> {
        let favorites = match storage.get_item(FAVORITES_KEY)? {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Favorite>>(&raw) {
                Ok(list) => sanitize(list),
                Err(e) => {
                    tracing::warn!(key = FAVORITES_KEY, error = %e, "ignoring malformed favorites data");
                    Vec::new()
                }
            },
        };

        let last = favorites.iter().map(|f| f.id).max().unwrap_or(0);
        tracing::debug!(count = favorites.len(), "loaded favorites");

        Ok(Self {
            storage,
            favorites,
            ids: IdSequence { last },
            dirty: false,
        })
    }

    /// All favorites in insertion order
    pub fn list(&self) -> &[Favorite] {
        &self.favorites
    }

    pub fn get(&self, id: i64) -> Option<&Favorite> {
        self.favorites.iter().find(|f| f.id == id)
    }

    /// The entry the dashboard selects by default
    pub fn first(&self) -> Option<&Favorite> {
        self.favorites.first()
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }

    /// True when the last write to storage failed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Append a new favorite and persist.
    ///
    /// Blank names and out-of-range coordinates are rejected before anything
    /// changes. On a persistence error the favorite is still in the list.
    pub fn add(&mut self, name: &str, lat: f64, lng: f64) -> Result<Favorite> {
        let name = validate_name(name)?;
        let point = GeoPoint::new(lat, lng)?;

        let id = self
            .ids
            .next(now_millis())
            .ok_or_else(|| Error::InvalidInput("No favorite ids left".to_string()))?;
        let favorite = Favorite::new(id, name, point);
        self.favorites.push(favorite.clone());
        tracing::info!(id = favorite.id, name = %favorite.name, "favorite added");

        self.persist()?;
        Ok(favorite)
    }

    /// Remove the favorite with `id`. Returns whether one was removed.
    ///
    /// A missing id is a no-op, but the collection is still persisted.
    pub fn remove(&mut self, id: i64) -> Result<bool> {
        let before = self.favorites.len();
        self.favorites.retain(|f| f.id != id);
        let removed = self.favorites.len() != before;
        if removed {
            tracing::info!(id, "favorite removed");
        } else {
            tracing::debug!(id, "remove: no favorite with this id");
        }

        self.persist()?;
        Ok(removed)
    }

    /// Replace the name of the favorite with `id`. Returns whether one matched.
    ///
    /// The id is looked up first: a missing id is a no-op whatever the name,
    /// a blank name for an existing id is rejected.
    pub fn rename(&mut self, id: i64, new_name: &str) -> Result<bool> {
        let renamed = match self.favorites.iter_mut().find(|f| f.id == id) {
            Some(favorite) => {
                favorite.name = validate_name(new_name)?;
                tracing::info!(id, name = %favorite.name, "favorite renamed");
                true
            }
            None => {
                tracing::debug!(id, "rename: no favorite with this id");
                false
            }
        };

        self.persist()?;
        Ok(renamed)
    }

    /// Retry persisting after a failed write. No-op when already in sync.
    pub fn flush(&mut self) -> Result<()> {
        if self.dirty {
            self.persist()?;
        }
        Ok(())
    }

    fn persist(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.favorites)?;
        match self.storage.set_item(FAVORITES_KEY, &json) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(e) => {
                self.dirty = true;
                tracing::warn!(error = %e, "failed to persist favorites; keeping in-memory state");
                Err(e)
            }
        }
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput("Favorite name cannot be empty".to_string()));
    }
    Ok(trimmed.to_string())
}

/// Keep the first entry per id, dropping any that break the data model
fn sanitize(list: Vec<Favorite>) -> Vec<Favorite> {
    let mut seen = HashSet::new();
    let total = list.len();
    let valid: Vec<Favorite> = list
        .into_iter()
        .filter(|f| {
            let usable = !f.name.trim().is_empty() && f.point().is_some();
            if !usable {
                tracing::warn!(id = f.id, "dropped stored favorite with blank name or invalid coordinates");
            }
            usable
        })
        .collect();
    let checked = valid.len();
    let unique: Vec<Favorite> = valid.into_iter().filter(|f| seen.insert(f.id)).collect();
    if unique.len() != checked {
        tracing::warn!(dropped = checked - unique.len(), "dropped favorites with duplicate ids");
    }
    if unique.len() != total {
        tracing::debug!(kept = unique.len(), total, "sanitized stored favorites");
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn stored(store: &FavoriteStore<MemoryStorage>) -> Vec<Favorite> {
        let raw = store.storage().get_item(FAVORITES_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    fn seeded(json: &str) -> FavoriteStore<MemoryStorage> {
        FavoriteStore::load(MemoryStorage::new().with_item(FAVORITES_KEY, json)).unwrap()
    }

    #[test]
    fn test_load_empty_storage() {
        let store = FavoriteStore::load(MemoryStorage::new()).unwrap();
        assert!(store.is_empty());
        assert!(store.first().is_none());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_load_malformed_data_is_empty() {
        let store = seeded("{not json");
        assert!(store.is_empty());

        // Valid JSON of the wrong shape is malformed too
        let store = seeded(r#"{"id":1}"#);
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let store = seeded(
            r#"[{"id":1,"nombre":"A","lat":0,"lng":0},
                {"id":1,"nombre":"B","lat":1,"lng":1},
                {"id":2,"nombre":"C","lat":2,"lng":2}]"#,
        );
        let names: Vec<_> = store.list().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_load_drops_invalid_entries() {
        let store = seeded(
            r#"[{"id":1,"nombre":"","lat":0,"lng":0},
                {"id":2,"nombre":"Lejos","lat":500,"lng":-999},
                {"id":3,"nombre":"   ","lat":1,"lng":1},
                {"id":4,"nombre":"Valparaíso","lat":-33.05,"lng":-71.62}]"#,
        );
        let ids: Vec<i64> = store.list().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![4]);
        assert_eq!(store.first().unwrap().name, "Valparaíso");
    }

    #[test]
    fn test_invalid_entry_does_not_shadow_valid_duplicate() {
        let store = seeded(
            r#"[{"id":1,"nombre":"","lat":0,"lng":0},
                {"id":1,"nombre":"B","lat":1,"lng":1}]"#,
        );
        assert_eq!(store.get(1).unwrap().name, "B");
    }

    #[test]
    fn test_add_fails_when_ids_are_exhausted() {
        let mut store = seeded(r#"[{"id":9223372036854775807,"nombre":"Último","lat":0,"lng":0}]"#);
        let before = store.list().to_vec();

        let result = store.add("Next", 1.0, 1.0);
        assert!(matches!(result, Err(Error::InvalidInput(_))));
        assert_eq!(store.list(), before.as_slice());
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_add_persists_single_entry() {
        let mut store = FavoriteStore::load(MemoryStorage::new()).unwrap();
        let fav = store.add("Santiago, RM, Chile", -33.4569, -70.6483).unwrap();

        assert_eq!(store.list(), &[fav.clone()]);
        assert_eq!(fav.name, "Santiago, RM, Chile");
        assert_eq!(fav.lat, -33.4569);
        assert_eq!(fav.lng, -70.6483);
        assert_eq!(stored(&store), vec![fav]);
    }

    #[test]
    fn test_add_assigns_strictly_increasing_ids() {
        let mut store = FavoriteStore::load(MemoryStorage::new()).unwrap();
        let ids: Vec<i64> = (0..50)
            .map(|i| store.add(&format!("Place {}", i), 0.0, 0.0).unwrap().id)
            .collect();

        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        let listed: Vec<i64> = store.list().iter().map(|f| f.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn test_ids_not_reused_after_removing_newest() {
        let mut store = FavoriteStore::load(MemoryStorage::new()).unwrap();
        store.add("A", 0.0, 0.0).unwrap();
        let b = store.add("B", 0.0, 0.0).unwrap();
        store.remove(b.id).unwrap();

        let c = store.add("C", 0.0, 0.0).unwrap();
        assert!(c.id > b.id);
    }

    #[test]
    fn test_ids_continue_after_seeded_ids() {
        let far_future = now_millis() + 1_000_000;
        let mut store = seeded(&format!(
            r#"[{{"id":{},"nombre":"Later","lat":0,"lng":0}}]"#,
            far_future
        ));
        let fav = store.add("Next", 1.0, 1.0).unwrap();
        assert_eq!(fav.id, far_future + 1);
    }

    #[test]
    fn test_add_rejects_invalid_input_without_changes() {
        let mut store = FavoriteStore::load(MemoryStorage::new()).unwrap();

        assert!(matches!(store.add("   ", 0.0, 0.0), Err(Error::InvalidInput(_))));
        assert!(matches!(store.add("North", 91.0, 0.0), Err(Error::InvalidInput(_))));
        assert!(matches!(store.add("East", 0.0, 181.0), Err(Error::InvalidInput(_))));

        assert!(store.is_empty());
        assert_eq!(store.storage().get_item(FAVORITES_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_trims_name() {
        let mut store = FavoriteStore::load(MemoryStorage::new()).unwrap();
        let fav = store.add("  Talca  ", -35.4, -71.6).unwrap();
        assert_eq!(fav.name, "Talca");
    }

    #[test]
    fn test_remove_existing() {
        let mut store = seeded(
            r#"[{"id":1,"nombre":"Uno","lat":1,"lng":1},{"id":2,"nombre":"Dos","lat":2,"lng":2}]"#,
        );
        assert!(store.remove(1).unwrap());

        let ids: Vec<i64> = store.list().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(stored(&store), store.list().to_vec());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = seeded(r#"[{"id":1,"nombre":"Uno","lat":1,"lng":1}]"#);
        let before = store.list().to_vec();

        assert!(!store.remove(42).unwrap());
        assert!(!store.remove(42).unwrap());
        assert_eq!(store.list(), before.as_slice());
        assert_eq!(stored(&store), before);
    }

    #[test]
    fn test_remove_keeps_order_of_the_rest() {
        let mut store = FavoriteStore::load(MemoryStorage::new()).unwrap();
        let a = store.add("A", 0.0, 0.0).unwrap();
        let b = store.add("B", 0.0, 0.0).unwrap();
        let c = store.add("C", 0.0, 0.0).unwrap();

        store.remove(b.id).unwrap();
        assert_eq!(store.list(), &[a, c]);
    }

    #[test]
    fn test_rename_changes_only_name() {
        let mut store = seeded(r#"[{"id":5,"nombre":"Old","lat":-20.5,"lng":-70.1}]"#);
        assert!(store.rename(5, "New").unwrap());

        let fav = store.get(5).unwrap();
        assert_eq!(fav.id, 5);
        assert_eq!(fav.name, "New");
        assert_eq!(fav.lat, -20.5);
        assert_eq!(fav.lng, -70.1);
        assert_eq!(stored(&store), store.list().to_vec());
    }

    #[test]
    fn test_rename_missing_is_noop() {
        let mut store = seeded(r#"[{"id":5,"nombre":"Old","lat":0,"lng":0}]"#);
        assert!(!store.rename(6, "New").unwrap());
        assert_eq!(store.get(5).unwrap().name, "Old");
    }

    #[test]
    fn test_rename_missing_id_ignores_blank_name() {
        let mut store = seeded(r#"[{"id":5,"nombre":"Old","lat":1,"lng":1}]"#);
        assert!(!store.rename(42, "  ").unwrap());
        assert_eq!(store.get(5).unwrap().name, "Old");
    }

    #[test]
    fn test_rename_rejects_blank_name() {
        let mut store = seeded(r#"[{"id":5,"nombre":"Old","lat":0,"lng":0}]"#);
        assert!(matches!(store.rename(5, "  "), Err(Error::InvalidInput(_))));
        assert_eq!(store.get(5).unwrap().name, "Old");
    }

    #[test]
    fn test_rename_keeps_position() {
        let mut store = FavoriteStore::load(MemoryStorage::new()).unwrap();
        store.add("A", 0.0, 0.0).unwrap();
        let b = store.add("B", 0.0, 0.0).unwrap();
        store.add("C", 0.0, 0.0).unwrap();

        store.rename(b.id, "Bee").unwrap();
        let names: Vec<_> = store.list().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "Bee", "C"]);
    }

    #[test]
    fn test_write_failure_keeps_memory_and_flush_recovers() {
        let mut store = FavoriteStore::load(MemoryStorage::with_quota(16)).unwrap();

        let err = store.add("A name that does not fit", 10.0, 20.0).unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { .. }));
        assert!(err.is_recoverable());
        assert_eq!(store.len(), 1);
        assert!(store.is_dirty());
        assert_eq!(store.storage().get_item(FAVORITES_KEY).unwrap(), None);

        store.storage.set_quota(None);
        store.flush().unwrap();
        assert!(!store.is_dirty());
        assert_eq!(stored(&store), store.list().to_vec());
    }

    #[test]
    fn test_round_trip_through_storage() {
        let mut store = FavoriteStore::load(MemoryStorage::new()).unwrap();
        store.add("Arica, Arica y Parinacota, Chile", -18.478_253, -70.321_044).unwrap();
        store.add("Punta Arenas, Magallanes, Chile", -53.163_833, -70.917_068).unwrap();
        store.add("0.1 + 0.2", 0.1 + 0.2, 1.0 / 3.0).unwrap();

        let original = store.list().to_vec();
        let reloaded = FavoriteStore::load(store.storage().clone()).unwrap();
        assert_eq!(reloaded.list(), original.as_slice());
    }
}
