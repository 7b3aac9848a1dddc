#![deny(clippy::string_slice)]

mod catalog;
mod favorites;
mod geo;
mod language;
pub mod moderation;
mod offline;
pub mod spot;
mod spots;
mod supabase;
mod utils;

pub use language::Language;
pub use moderation::{ModerationView, PhotoCarousel};
pub use spot::{Difficulty, ImageFile, Spot, SpotDraft, StartType};

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::LazyLock;

use cleat::auth::{Session, User, UserMetadata};
use slotmap::SlotMap;
use wasm_bindgen::prelude::*;

use crate::favorites::FavoritesTracker;
use crate::offline::WebImageCache;
use crate::spots::SpotSync;
use crate::supabase::{
    LocalFavoritesSnapshot, SessionHandle, SupabaseFavorites, SupabaseSpots, supabase_config,
};

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
#[allow(clippy::declare_interior_mutable_const)]
const LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();

    #[cfg(target_arch = "wasm32")]
    {
        wasm_logger::init(wasm_logger::Config::default());
        log::info!("Logging initialized");
    }
});

/// Handle returned by [`Updock::subscribe`]; pass it back to unsubscribe.
#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
#[derive(Clone, Copy)]
pub struct ListenerKey {
    key: slotmap::DefaultKey,
}

/// The application core. The shell constructs exactly one of these at
/// startup and goes through it for every state read and mutation; the spot
/// list, favorites set and session live here, never in the shell.
// Invariant for every method below: no RefCell borrow may be held across an
// .await. Session and spot values are cloned out before suspending.
#[wasm_bindgen]
pub struct Updock {
    config: cleat::Config,
    admin_role: String,
    session: SessionHandle,
    spots: SpotSync<SupabaseSpots>,
    favorites: FavoritesTracker<SupabaseFavorites, LocalFavoritesSnapshot>,
    language: Cell<Language>,
    viewer_position: Cell<Option<[f64; 2]>>,
    listeners: RefCell<SlotMap<slotmap::DefaultKey, js_sys::Function>>,
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl Updock {
    /// `admin_role` is the `app_metadata.role` claim that marks moderators;
    /// it defaults to "admin".
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(admin_role: Option<String>) -> Updock {
        // used to only initialize the logger once
        #[allow(clippy::borrow_interior_mutable_const)]
        *LOGGER;

        let config = supabase_config();
        let session: SessionHandle = Rc::new(RefCell::new(None));

        Updock {
            spots: SpotSync::new(SupabaseSpots::new(config.clone(), session.clone())),
            favorites: FavoritesTracker::new(
                SupabaseFavorites::new(config.clone(), session.clone()),
                LocalFavoritesSnapshot,
            ),
            config,
            admin_role: admin_role.unwrap_or_else(|| "admin".to_string()),
            session,
            language: Cell::new(language::load_language_preference()),
            viewer_position: Cell::new(None),
            listeners: RefCell::new(SlotMap::new()),
        }
    }

    // =======
    // session
    // =======

    pub async fn sign_in(&self, email: String, password: String) -> Result<(), JsValue> {
        let session = cleat::auth::sign_in_with_password(&self.config, &email, &password)
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.session.replace(Some(session));

        let session = self.session.borrow().clone();
        self.favorites.refresh(session.as_ref()).await;
        self.notify();
        Ok(())
    }

    pub async fn sign_up(
        &self,
        email: String,
        password: String,
        first_name: Option<String>,
        last_name: Option<String>,
        username: Option<String>,
    ) -> Result<(), JsValue> {
        let metadata = UserMetadata {
            first_name,
            last_name,
            username,
        };
        let session = cleat::auth::sign_up(&self.config, &email, &password, metadata)
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.session.replace(Some(session));

        let session = self.session.borrow().clone();
        self.favorites.refresh(session.as_ref()).await;
        self.notify();
        Ok(())
    }

    /// Drops the local session first; the remote revocation failing only
    /// costs a lingering refresh token.
    pub async fn sign_out(&self) {
        let token = self
            .session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone());
        self.session.replace(None);
        self.favorites.refresh(None).await;
        self.notify();

        if let Some(token) = token
            && let Err(e) = cleat::auth::sign_out(&self.config, &token).await
        {
            log::warn!("Remote sign-out failed: {e}");
        }
    }

    /// Adopt a session the shell persisted from a previous run.
    pub async fn restore_session(&self, session: Session) {
        self.session.replace(Some(session));
        let session = self.session.borrow().clone();
        self.favorites.refresh(session.as_ref()).await;
        self.notify();
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn user(&self) -> Option<User> {
        self.session.borrow().as_ref().map(|s| s.user.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.session
            .borrow()
            .as_ref()
            .is_some_and(|s| s.user.has_role(&self.admin_role))
    }

    // subscriptions don't exist yet; the paywall sheet reads this
    pub fn is_premium(&self) -> bool {
        false
    }

    // =======
    // spots
    // =======

    pub async fn load_spots(&self) {
        self.spots.load().await;
        self.notify();
    }

    pub fn get_spots(&self) -> Vec<Spot> {
        self.spots.spots()
    }

    pub fn get_spot(&self, id: String) -> Option<Spot> {
        self.spots.spot_by_id(&id)
    }

    /// Submit a spot for review. Resolves with the created (pending) spot;
    /// the shell tells the user it will appear once approved.
    pub async fn add_spot(
        &self,
        draft: SpotDraft,
        image_files: Vec<ImageFile>,
    ) -> Result<Spot, JsValue> {
        let session = self.session.borrow().clone();
        let spot = self
            .spots
            .add_spot(draft, image_files, session.as_ref())
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.notify();
        Ok(spot)
    }

    pub async fn approve_spot(&self, id: String) -> Result<(), JsValue> {
        self.spots
            .approve_spot(&id)
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.notify();
        Ok(())
    }

    pub async fn delete_spot(&self, id: String) -> Result<(), JsValue> {
        self.spots
            .delete_spot(&id)
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.notify();
        Ok(())
    }

    pub async fn update_spot(&self, spot: Spot) -> Result<(), JsValue> {
        self.spots
            .update_spot(spot)
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))?;
        self.notify();
        Ok(())
    }

    pub fn search_spots(&self, query: String) -> Vec<Spot> {
        self.spots.search(&query)
    }

    pub fn filter_spots(&self, start_type: Option<StartType>) -> Vec<Spot> {
        self.spots.filter_by_type(start_type)
    }

    // =======
    // favorites
    // =======

    /// Optimistic toggle; resolves with the new membership. On a confirmed
    /// add the spot's photos are mirrored into the offline cache.
    pub async fn toggle_favorite(&self, spot_id: String) -> Result<bool, JsValue> {
        let session = self.session.borrow().clone();
        let image_urls = self
            .spots
            .spot_by_id(&spot_id)
            .and_then(|spot| spot.image_urls);

        self.favorites
            .toggle(
                &spot_id,
                image_urls.as_deref(),
                session.as_ref(),
                &WebImageCache,
                &|| self.notify(),
            )
            .await
            .map_err(|e| JsValue::from_str(&format!("{e}")))
    }

    pub async fn refresh_favorites(&self) {
        let session = self.session.borrow().clone();
        self.favorites.refresh(session.as_ref()).await;
        self.notify();
    }

    pub fn favorite_ids(&self) -> Vec<String> {
        self.favorites.ids()
    }

    pub fn is_favorite(&self, spot_id: String) -> bool {
        self.favorites.is_favorite(&spot_id)
    }

    // =======
    // offline cache
    // =======

    pub async fn cache_spot_images(&self, image_urls: Vec<String>) {
        offline::cache_images(&WebImageCache, &image_urls).await;
    }

    /// Run once at startup to drop image buckets from older app versions.
    pub async fn purge_stale_caches(&self) {
        offline::purge_stale_buckets(&WebImageCache).await;
    }

    // =======
    // moderation
    // =======

    pub fn moderation_spots(&self, view: ModerationView) -> Vec<Spot> {
        moderation::visible_spots(view, &self.spots.spots())
    }

    pub fn pending_count(&self) -> usize {
        moderation::pending_spots(&self.spots.spots()).len()
    }

    // =======
    // language & location
    // =======

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(getter))]
    pub fn language(&self) -> Language {
        self.language.get()
    }

    pub fn set_language(&self, language: Language) {
        self.language.set(language);
        language::save_language_preference(language);
        self.notify();
    }

    pub fn spot_description(&self, spot: Spot) -> String {
        spot.description_for(self.language.get()).to_string()
    }

    /// The shell feeds in the one-shot geolocation result; when it never
    /// arrives (denied, unsupported), nearby lists stay in default order.
    pub fn set_viewer_position(&self, lat: f64, lng: f64) {
        self.viewer_position.set(Some([lat, lng]));
        self.notify();
    }

    pub fn nearby_spots(&self) -> Vec<Spot> {
        geo::nearby(&self.spots.spots(), self.viewer_position.get())
    }

    // =======
    // listeners
    // =======

    pub fn subscribe(&self, callback: js_sys::Function) -> ListenerKey {
        ListenerKey {
            key: self.listeners.borrow_mut().insert(callback),
        }
    }

    pub fn unsubscribe(&self, key: ListenerKey) {
        self.listeners.borrow_mut().remove(key.key);
    }

    /// Collect the callbacks before invoking any, so one that re-enters rust
    /// can take its own borrow of the listener map.
    fn notify(&self) {
        let callbacks: Vec<js_sys::Function> =
            self.listeners.borrow().values().cloned().collect();
        for callback in callbacks {
            #[cfg(target_arch = "wasm32")]
            {
                let _ = callback.call0(&JsValue::null());
            }
            #[cfg(not(target_arch = "wasm32"))]
            let _ = &callback;
        }
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn format_distance(km: f64) -> String {
    geo::format_distance(km)
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
pub fn get_app_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
