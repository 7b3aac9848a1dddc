//! Per-user favorites with offline-first reads and optimistic, reversible
//! writes.

use std::cell::RefCell;

use cleat::auth::Session;
use im::OrdSet;

use crate::offline::{self, ImageCacheBackend};

#[derive(Debug, thiserror::Error)]
pub enum FavoriteError {
    #[error("you must be signed in to favorite spots")]
    Unauthorized,

    #[error("error updating favorites: {0}")]
    Remote(#[source] cleat::Error),
}

/// Remote `favorites` rows, scoped to the signed-in user by row-level
/// security.
pub(crate) trait FavoriteStore {
    async fn fetch_ids(&self) -> Result<Vec<String>, cleat::Error>;
    async fn insert(&self, user_id: &str, spot_id: &str) -> Result<(), cleat::Error>;
    async fn remove(&self, user_id: &str, spot_id: &str) -> Result<(), cleat::Error>;
}

/// The persisted last-known favorite ids, read synchronously at startup so
/// the UI has something to show before (or without) a network round-trip.
pub(crate) trait FavoritesSnapshot {
    fn load(&self) -> Option<Vec<String>>;
    fn store(&self, ids: &[String]);
}

pub(crate) struct FavoritesTracker<S, P> {
    store: S,
    snapshot: P,
    favorites: RefCell<OrdSet<String>>,
}

impl<S: FavoriteStore, P: FavoritesSnapshot> FavoritesTracker<S, P> {
    /// Hydrates from the local snapshot immediately; the authoritative remote
    /// set arrives later via [`refresh`](Self::refresh).
    pub fn new(store: S, snapshot: P) -> Self {
        let favorites = snapshot.load().unwrap_or_default().into_iter().collect();
        Self {
            store,
            snapshot,
            favorites: RefCell::new(favorites),
        }
    }

    pub fn ids(&self) -> Vec<String> {
        self.favorites.borrow().iter().cloned().collect()
    }

    pub fn is_favorite(&self, spot_id: &str) -> bool {
        self.favorites.borrow().contains(spot_id)
    }

    /// Replace the in-memory set with the authoritative remote one. Without a
    /// session the visible set becomes empty; the persisted snapshot is left
    /// alone so a later offline relaunch still shows the last-known state.
    pub async fn refresh(&self, session: Option<&Session>) {
        if session.is_none() {
            self.favorites.replace(OrdSet::new());
            return;
        }

        match self.store.fetch_ids().await {
            Ok(ids) => {
                let authoritative: OrdSet<String> = ids.into_iter().collect();
                self.favorites.replace(authoritative.clone());
                self.mirror(&authoritative);
            }
            Err(e) => {
                // keep whatever the snapshot gave us
                log::error!("Error fetching favorites: {e}");
            }
        }
    }

    /// Flip membership of `spot_id` optimistically, then confirm remotely. On
    /// failure the pre-toggle set is restored verbatim. Returns the new
    /// membership. On a confirmed add, the spot's photos are mirrored into
    /// the offline cache (best effort).
    ///
    /// `on_change` fires after every in-memory change (the flip and a
    /// possible revert) so the UI paints before the network settles.
    pub async fn toggle(
        &self,
        spot_id: &str,
        image_urls: Option<&[String]>,
        session: Option<&Session>,
        images: &impl ImageCacheBackend,
        on_change: &impl Fn(),
    ) -> Result<bool, FavoriteError> {
        let Some(session) = session else {
            return Err(FavoriteError::Unauthorized);
        };

        let before = self.favorites.borrow().clone();
        let was_favorite = before.contains(spot_id);

        {
            let mut favorites = self.favorites.borrow_mut();
            if was_favorite {
                favorites.remove(spot_id);
            } else {
                favorites.insert(spot_id.to_string());
            }
        }
        let applied = self.favorites.borrow().clone();
        self.mirror(&applied);
        on_change();

        let result = if was_favorite {
            self.store.remove(&session.user.id, spot_id).await
        } else {
            self.store.insert(&session.user.id, spot_id).await
        };

        match result {
            Ok(()) => {
                if !was_favorite && let Some(image_urls) = image_urls {
                    offline::cache_images(images, image_urls).await;
                }
                Ok(!was_favorite)
            }
            Err(e) => {
                self.favorites.replace(before.clone());
                self.mirror(&before);
                on_change();
                Err(FavoriteError::Remote(e))
            }
        }
    }

    /// Non-empty sets only: a transient empty state (offline fetch, logout)
    /// must not wipe the last-known snapshot. This asymmetry is deliberate.
    fn mirror(&self, favorites: &OrdSet<String>) {
        if favorites.is_empty() {
            return;
        }
        let ids: Vec<String> = favorites.iter().cloned().collect();
        self.snapshot.store(&ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::tests::FakeCache;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::collections::BTreeSet;

    #[derive(Default)]
    struct FakeFavoriteStore {
        remote: RefCell<BTreeSet<String>>,
        fail_writes: Cell<bool>,
    }

    impl FavoriteStore for FakeFavoriteStore {
        async fn fetch_ids(&self) -> Result<Vec<String>, cleat::Error> {
            Ok(self.remote.borrow().iter().cloned().collect())
        }

        async fn insert(&self, _user_id: &str, spot_id: &str) -> Result<(), cleat::Error> {
            if self.fail_writes.get() {
                return Err(cleat::Error::Status {
                    context: "insert",
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            self.remote.borrow_mut().insert(spot_id.to_string());
            Ok(())
        }

        async fn remove(&self, _user_id: &str, spot_id: &str) -> Result<(), cleat::Error> {
            if self.fail_writes.get() {
                return Err(cleat::Error::Status {
                    context: "delete",
                    status: 500,
                    body: "boom".to_string(),
                });
            }
            self.remote.borrow_mut().remove(spot_id);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeSnapshot {
        saved: RefCell<Option<Vec<String>>>,
    }

    impl FavoritesSnapshot for &FakeSnapshot {
        fn load(&self) -> Option<Vec<String>> {
            self.saved.borrow().clone()
        }

        fn store(&self, ids: &[String]) {
            self.saved.replace(Some(ids.to_vec()));
        }
    }

    fn session(user_id: &str) -> Session {
        serde_json::from_value(serde_json::json!({
            "access_token": "jwt",
            "user": { "id": user_id, "email": "rider@example.com" }
        }))
        .unwrap()
    }

    fn tracker<'a>(
        store: FakeFavoriteStore,
        snapshot: &'a FakeSnapshot,
    ) -> FavoritesTracker<FakeFavoriteStore, &'a FakeSnapshot> {
        FavoritesTracker::new(store, snapshot)
    }

    #[test]
    fn hydrates_from_snapshot_before_any_network() {
        let snapshot = FakeSnapshot::default();
        snapshot.saved.replace(Some(vec!["s1".to_string(), "s2".to_string()]));

        let tracker = tracker(FakeFavoriteStore::default(), &snapshot);
        assert!(tracker.is_favorite("s1"));
        assert!(tracker.is_favorite("s2"));
        assert!(!tracker.is_favorite("s3"));
    }

    #[test]
    fn refresh_overwrites_memory_and_snapshot_with_remote_set() {
        let snapshot = FakeSnapshot::default();
        snapshot.saved.replace(Some(vec!["stale".to_string()]));
        let store = FakeFavoriteStore::default();
        store.remote.borrow_mut().insert("s9".to_string());

        let tracker = tracker(store, &snapshot);
        block_on(tracker.refresh(Some(&session("u1"))));

        assert!(!tracker.is_favorite("stale"));
        assert!(tracker.is_favorite("s9"));
        assert_eq!(snapshot.saved.borrow().as_deref(), Some(&["s9".to_string()][..]));
    }

    #[test]
    fn logged_out_refresh_clears_memory_but_not_snapshot() {
        let snapshot = FakeSnapshot::default();
        snapshot.saved.replace(Some(vec!["s1".to_string()]));

        let tracker = tracker(FakeFavoriteStore::default(), &snapshot);
        assert!(tracker.is_favorite("s1"));

        block_on(tracker.refresh(None));
        assert!(!tracker.is_favorite("s1"));
        assert_eq!(snapshot.saved.borrow().as_deref(), Some(&["s1".to_string()][..]));
    }

    #[test]
    fn toggle_without_session_changes_nothing() {
        let snapshot = FakeSnapshot::default();
        let tracker = tracker(FakeFavoriteStore::default(), &snapshot);
        let cache = FakeCache::default();

        let result = block_on(tracker.toggle("s1", None, None, &cache, &|| {}));
        assert!(matches!(result, Err(FavoriteError::Unauthorized)));
        assert!(!tracker.is_favorite("s1"));
    }

    #[test]
    fn failed_add_reverts_to_pre_toggle_state() {
        let snapshot = FakeSnapshot::default();
        let store = FakeFavoriteStore::default();
        store.fail_writes.set(true);
        let tracker = tracker(store, &snapshot);
        let cache = FakeCache::default();

        let result = block_on(tracker.toggle("s1", None, Some(&session("u1")), &cache, &|| {}));
        assert!(matches!(result, Err(FavoriteError::Remote(_))));
        assert!(!tracker.is_favorite("s1"));
    }

    #[test]
    fn failed_remove_reverts_to_pre_toggle_state() {
        let snapshot = FakeSnapshot::default();
        snapshot.saved.replace(Some(vec!["s1".to_string()]));
        let store = FakeFavoriteStore::default();
        store.remote.borrow_mut().insert("s1".to_string());
        store.fail_writes.set(true);
        let tracker = tracker(store, &snapshot);
        let cache = FakeCache::default();

        let result = block_on(tracker.toggle("s1", None, Some(&session("u1")), &cache, &|| {}));
        assert!(matches!(result, Err(FavoriteError::Remote(_))));
        assert!(tracker.is_favorite("s1"));
    }

    #[test]
    fn confirmed_add_caches_the_spot_photos() {
        let snapshot = FakeSnapshot::default();
        let tracker = tracker(FakeFavoriteStore::default(), &snapshot);
        let cache = FakeCache::default();
        let image_urls = vec!["https://img/1.jpg".to_string()];

        let added = block_on(tracker.toggle(
            "s1",
            Some(&image_urls),
            Some(&session("u1")),
            &cache,
            &|| {},
        ))
        .unwrap();
        assert!(added);
        assert!(tracker.is_favorite("s1"));
        assert!(cache.stored("https://img/1.jpg"));

        // removing does not touch the cache again
        let removed = block_on(tracker.toggle(
            "s1",
            Some(&image_urls),
            Some(&session("u1")),
            &cache,
            &|| {},
        ))
        .unwrap();
        assert!(!removed);
        assert_eq!(cache.fetch_log.borrow().len(), 1);
    }

    #[test]
    fn snapshot_mirrors_every_non_empty_set() {
        let snapshot = FakeSnapshot::default();
        let tracker = tracker(FakeFavoriteStore::default(), &snapshot);
        let cache = FakeCache::default();

        block_on(tracker.toggle("s1", None, Some(&session("u1")), &cache, &|| {})).unwrap();
        assert_eq!(snapshot.saved.borrow().as_deref(), Some(&["s1".to_string()][..]));

        // the empty set after removal is not mirrored; the last non-empty
        // snapshot survives for offline relaunch
        block_on(tracker.toggle("s1", None, Some(&session("u1")), &cache, &|| {})).unwrap();
        assert!(!tracker.is_favorite("s1"));
        assert_eq!(snapshot.saved.borrow().as_deref(), Some(&["s1".to_string()][..]));
    }
}
