//! Best-effort offline mirror of spot photos, backed by the browser Cache
//! API. Entries are immutable once stored (keyed by URL, no revalidation), so
//! concurrent fills are safe and a replaced photo only bypasses the cache if
//! it gets a new URL.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast as _;

/// Bump the version suffix to invalidate everything on an app update;
/// [`purge_stale_buckets`] removes the old buckets at startup.
pub const IMAGE_CACHE_BUCKET: &str = "updock-images-v1";

#[derive(Debug, thiserror::Error)]
pub enum OfflineError {
    #[error("cache storage unavailable")]
    Unavailable,

    #[error("cache error: {0}")]
    Backend(String),
}

/// The bucket-addressed cache store underneath the image cache. The web
/// implementation is the Cache API; tests use an in-memory fake.
pub(crate) trait ImageCacheBackend {
    /// Whether `url` is already stored in the current bucket.
    async fn contains(&self, url: &str) -> Result<bool, OfflineError>;

    /// Fetch `url` cross-origin and store the response in the current bucket.
    async fn fetch_and_store(&self, url: &str) -> Result<(), OfflineError>;

    async fn bucket_names(&self) -> Result<Vec<String>, OfflineError>;

    async fn delete_bucket(&self, name: &str) -> Result<(), OfflineError>;
}

/// Mirror `image_urls` into the cache. A URL already present is never fetched
/// again; each failure is logged and the remaining URLs still get their
/// chance. Nothing here can fail the caller.
pub(crate) async fn cache_images(backend: &impl ImageCacheBackend, image_urls: &[String]) {
    for url in image_urls {
        match backend.contains(url).await {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = backend.fetch_and_store(url).await {
                    log::error!("Failed to fetch image for cache: {url}: {e}");
                }
            }
            Err(e) => {
                log::error!("Cache lookup failed for {url}: {e}");
            }
        }
    }
}

/// Delete every cache bucket except the current version.
pub(crate) async fn purge_stale_buckets(backend: &impl ImageCacheBackend) {
    let names = match backend.bucket_names().await {
        Ok(names) => names,
        Err(e) => {
            log::error!("Cache enumeration failed: {e}");
            return;
        }
    };

    for name in names {
        if name == IMAGE_CACHE_BUCKET {
            continue;
        }
        log::info!("Removing stale image cache: {name}");
        if let Err(e) = backend.delete_bucket(&name).await {
            log::warn!("Failed to remove stale image cache {name}: {e}");
        }
    }
}

/// Cache API implementation. Outside the browser every operation reports the
/// store as unavailable, which the callers above already tolerate.
pub(crate) struct WebImageCache;

#[cfg(target_arch = "wasm32")]
impl WebImageCache {
    fn cache_storage() -> Result<web_sys::CacheStorage, OfflineError> {
        web_sys::window()
            .ok_or(OfflineError::Unavailable)?
            .caches()
            .map_err(|_| OfflineError::Unavailable)
    }

    async fn open_bucket() -> Result<web_sys::Cache, OfflineError> {
        let promise = Self::cache_storage()?.open(IMAGE_CACHE_BUCKET);
        let cache = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))?;
        cache
            .dyn_into::<web_sys::Cache>()
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))
    }
}

#[cfg(target_arch = "wasm32")]
impl ImageCacheBackend for WebImageCache {
    async fn contains(&self, url: &str) -> Result<bool, OfflineError> {
        let cache = Self::open_bucket().await?;
        let hit = wasm_bindgen_futures::JsFuture::from(cache.match_with_str(url))
            .await
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))?;
        Ok(!hit.is_undefined())
    }

    async fn fetch_and_store(&self, url: &str) -> Result<(), OfflineError> {
        let window = web_sys::window().ok_or(OfflineError::Unavailable)?;

        let init = web_sys::RequestInit::new();
        init.set_mode(web_sys::RequestMode::Cors);
        let request = web_sys::Request::new_with_str_and_init(url, &init)
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))?;

        let response = wasm_bindgen_futures::JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))?
            .dyn_into::<web_sys::Response>()
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))?;

        if !response.ok() {
            return Err(OfflineError::Backend(format!(
                "fetch returned status {}",
                response.status()
            )));
        }

        let cache = Self::open_bucket().await?;
        wasm_bindgen_futures::JsFuture::from(cache.put_with_request(&request, &response))
            .await
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))?;
        Ok(())
    }

    async fn bucket_names(&self) -> Result<Vec<String>, OfflineError> {
        let keys = wasm_bindgen_futures::JsFuture::from(Self::cache_storage()?.keys())
            .await
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))?;
        let keys = keys
            .dyn_into::<js_sys::Array>()
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))?;
        Ok(keys.iter().filter_map(|name| name.as_string()).collect())
    }

    async fn delete_bucket(&self, name: &str) -> Result<(), OfflineError> {
        wasm_bindgen_futures::JsFuture::from(Self::cache_storage()?.delete(name))
            .await
            .map_err(|e| OfflineError::Backend(format!("{e:?}")))?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl ImageCacheBackend for WebImageCache {
    async fn contains(&self, _url: &str) -> Result<bool, OfflineError> {
        Err(OfflineError::Unavailable)
    }

    async fn fetch_and_store(&self, _url: &str) -> Result<(), OfflineError> {
        Err(OfflineError::Unavailable)
    }

    async fn bucket_names(&self) -> Result<Vec<String>, OfflineError> {
        Err(OfflineError::Unavailable)
    }

    async fn delete_bucket(&self, _name: &str) -> Result<(), OfflineError> {
        Err(OfflineError::Unavailable)
    }
}
