//! The single in-memory source of truth for the unified spot list: bundled
//! catalog entries first, then user submissions from the backend.

use std::cell::RefCell;

use cleat::auth::Session;

use crate::catalog::{STATIC_SPOTS, is_static_id};
use crate::spot::{
    ImageFile, NewSpotRow, Spot, SpotChanges, SpotDraft, SpotRow, StartType, start_types_json,
};

/// Photos per submission; extra files are silently dropped.
pub const MAX_SPOT_PHOTOS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum SpotError {
    #[error("you must be logged in to submit a spot")]
    Unauthorized,

    #[error("failed to {op}: {source}")]
    Remote {
        op: &'static str,
        #[source]
        source: cleat::Error,
    },
}

/// Everything the synchronizer needs from the backend: the `spots` table,
/// the favorites rows that reference it, and the photo bucket.
pub(crate) trait SpotStore {
    /// All rows, newest first.
    async fn fetch_all(&self) -> Result<Vec<SpotRow>, cleat::Error>;
    async fn insert(&self, row: &NewSpotRow) -> Result<SpotRow, cleat::Error>;
    async fn set_approved(&self, id: &str) -> Result<(), cleat::Error>;
    async fn update(&self, id: &str, changes: &SpotChanges) -> Result<(), cleat::Error>;
    async fn delete(&self, id: &str) -> Result<(), cleat::Error>;
    async fn delete_favorites_of(&self, id: &str) -> Result<(), cleat::Error>;
    /// Upload one image under a collision-free path, returning its public URL.
    async fn upload_image(&self, image: &ImageFile) -> Result<String, cleat::Error>;
}

pub(crate) struct SpotSync<S> {
    store: S,
    spots: RefCell<Vec<Spot>>,
}

impl<S: SpotStore> SpotSync<S> {
    /// Starts with the catalog only; call [`load`](Self::load) to merge in
    /// the backend rows.
    pub fn new(store: S) -> Self {
        Self {
            store,
            spots: RefCell::new(STATIC_SPOTS.clone()),
        }
    }

    pub fn spots(&self) -> Vec<Spot> {
        self.spots.borrow().clone()
    }

    pub fn spot_by_id(&self, id: &str) -> Option<Spot> {
        self.spots.borrow().iter().find(|s| s.id == id).cloned()
    }

    /// Replace the list with catalog entries followed by the current backend
    /// rows. Re-running replaces wholesale, so repeated loads never duplicate
    /// an id. A fetch failure keeps whatever is already loaded.
    pub async fn load(&self) {
        match self.store.fetch_all().await {
            Ok(rows) => {
                let mut merged = STATIC_SPOTS.clone();
                merged.extend(rows.into_iter().map(SpotRow::into_spot));
                self.spots.replace(merged);
            }
            Err(e) => {
                log::error!("Error fetching spots: {e}");
            }
        }
    }

    /// Submit a new spot. Photos upload one at a time; a failed upload loses
    /// that photo but neither the remaining uploads nor the submission. The
    /// row is only added to the list once the backend has assigned its id,
    /// and it enters as pending (`is_approved` stays at the backend default).
    pub async fn add_spot(
        &self,
        draft: SpotDraft,
        image_files: Vec<ImageFile>,
        session: Option<&Session>,
    ) -> Result<Spot, SpotError> {
        let Some(session) = session else {
            return Err(SpotError::Unauthorized);
        };

        let mut image_urls = Vec::new();
        for image in image_files.iter().take(MAX_SPOT_PHOTOS) {
            match self.store.upload_image(image).await {
                Ok(url) => image_urls.push(url),
                Err(e) => {
                    log::error!("Upload error for {}: {e}", image.name);
                }
            }
        }

        let start_types = if draft.start_types.is_empty() {
            vec![StartType::Dockstart]
        } else {
            draft.start_types
        };

        let row = NewSpotRow {
            name: draft.name,
            description: draft.description,
            description_fr: draft.description_fr,
            start_types: start_types_json(&start_types),
            lat: draft.position[0],
            lng: draft.position[1],
            difficulty: draft.difficulty,
            height: draft.height,
            image_urls: if image_urls.is_empty() {
                None
            } else {
                Some(image_urls)
            },
            user_id: session.user.id.clone(),
        };

        let created = self
            .store
            .insert(&row)
            .await
            .map_err(|source| SpotError::Remote {
                op: "add spot",
                source,
            })?;

        let spot = created.into_spot();
        self.spots.borrow_mut().insert(0, spot.clone());
        Ok(spot)
    }

    /// The local flag only flips after the backend accepted the write, so
    /// there is nothing to roll back on failure.
    pub async fn approve_spot(&self, id: &str) -> Result<(), SpotError> {
        self.store
            .set_approved(id)
            .await
            .map_err(|source| SpotError::Remote {
                op: "approve spot",
                source,
            })?;

        if let Some(spot) = self.spots.borrow_mut().iter_mut().find(|s| s.id == id) {
            spot.is_approved = true;
        }
        Ok(())
    }

    /// Catalog entries only leave the local view (they come back on the next
    /// load). For backend rows, favorites referencing the spot go first; that
    /// cleanup failing is tolerated since it only risks an orphaned
    /// reference, not the delete itself.
    pub async fn delete_spot(&self, id: &str) -> Result<(), SpotError> {
        if is_static_id(id) {
            self.spots.borrow_mut().retain(|s| s.id != id);
            return Ok(());
        }

        if let Err(e) = self.store.delete_favorites_of(id).await {
            log::warn!("Could not delete favorites of {id}, proceeding anyway: {e}");
        }

        self.store
            .delete(id)
            .await
            .map_err(|source| SpotError::Remote {
                op: "delete spot",
                source,
            })?;

        self.spots.borrow_mut().retain(|s| s.id != id);
        Ok(())
    }

    /// Push the editable fields (name, description, tags, difficulty) and,
    /// once accepted, replace the in-memory entry with the full given value.
    pub async fn update_spot(&self, updated: Spot) -> Result<(), SpotError> {
        let changes = SpotChanges {
            name: updated.name.clone(),
            description: updated.description.clone(),
            start_types: start_types_json(&updated.start_types),
            difficulty: updated.difficulty,
        };

        self.store
            .update(&updated.id, &changes)
            .await
            .map_err(|source| SpotError::Remote {
                op: "update spot",
                source,
            })?;

        let mut spots = self.spots.borrow_mut();
        if let Some(slot) = spots.iter_mut().find(|s| s.id == updated.id) {
            *slot = updated;
        }
        Ok(())
    }

    /// Name, description and tag search, case-insensitive. An empty query
    /// matches nothing (the search sheet shows suggestions instead).
    pub fn search(&self, query: &str) -> Vec<Spot> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        self.spots
            .borrow()
            .iter()
            .filter(|spot| {
                spot.name.to_lowercase().contains(&query)
                    || spot.description.to_lowercase().contains(&query)
                    || spot
                        .start_types
                        .iter()
                        .any(|tag| format!("{tag:?}").to_lowercase().contains(&query))
            })
            .cloned()
            .collect()
    }

    /// The map filter: `None` shows everything.
    pub fn filter_by_type(&self, start_type: Option<StartType>) -> Vec<Spot> {
        let spots = self.spots.borrow();
        match start_type {
            None => spots.clone(),
            Some(start_type) => spots
                .iter()
                .filter(|spot| spot.start_types.contains(&start_type))
                .cloned()
                .collect(),
        }
    }
}
