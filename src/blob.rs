//! Temporary handles for user-supplied binary data.
//!
//! An uploaded logo is never handed to the engine directly: it is stored in a [`BlobRegistry`]
//! and referenced through an [`ObjectUrl`]. The URL stays resolvable for as long as any clone of
//! the handle is alive and is revoked when the last one is dropped, so replacing a logo in the
//! configuration releases the previous upload without any explicit bookkeeping.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::engine::ResourceResolver;
use crate::options::CrossOrigin;

const URL_PREFIX: &str = "blob:qrforge/";

#[derive(Default)]
struct Store {
    next_id: Cell<u64>,
    blobs: RefCell<HashMap<String, Rc<[u8]>>>,
}

/// Registry of live blob URLs.
///
/// Cloning the registry is cheap; all clones share the same storage.
#[derive(Clone, Default)]
pub struct BlobRegistry {
    store: Rc<Store>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `bytes` and returns a handle whose URL resolves to them.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qrforge::blob::BlobRegistry;
    ///
    /// let registry = BlobRegistry::new();
    /// let url = registry.create_object_url(vec![1u8, 2, 3]);
    /// assert_eq!(registry.live_handles(), 1);
    /// drop(url);
    /// assert_eq!(registry.live_handles(), 0);
    /// ```
    pub fn create_object_url(&self, bytes: impl Into<Rc<[u8]>>) -> ObjectUrl {
        let id = self.store.next_id.get();
        self.store.next_id.set(id + 1);
        let url = format!("{URL_PREFIX}{id}");
        self.store.blobs.borrow_mut().insert(url.clone(), bytes.into());
        tracing::debug!("created object url {}", url);
        ObjectUrl {
            inner: Rc::new(Handle {
                url,
                store: Rc::clone(&self.store),
            }),
        }
    }

    /// Returns the bytes behind `url`, if it is still live.
    pub fn resolve(&self, url: &str) -> Option<Rc<[u8]>> {
        self.store.blobs.borrow().get(url).cloned()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.store.blobs.borrow().contains_key(url)
    }

    /// Number of URLs that have not been revoked yet.
    pub fn live_handles(&self) -> usize {
        self.store.blobs.borrow().len()
    }
}

impl fmt::Debug for BlobRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlobRegistry")
            .field("live_handles", &self.live_handles())
            .finish()
    }
}

impl ResourceResolver for BlobRegistry {
    // Blob URLs are same-origin by construction, so the cross-origin mode never blocks them.
    fn resolve(&self, reference: &str, _cross_origin: Option<CrossOrigin>) -> Option<Rc<[u8]>> {
        BlobRegistry::resolve(self, reference)
    }
}

struct Handle {
    url: String,
    store: Rc<Store>,
}

impl Drop for Handle {
    fn drop(&mut self) {
        if self.store.blobs.borrow_mut().remove(&self.url).is_some() {
            tracing::debug!("revoked object url {}", self.url);
        }
    }
}

/// A reference-counted handle to a blob URL. The URL is revoked when the last clone drops.
#[derive(Clone)]
pub struct ObjectUrl {
    inner: Rc<Handle>,
}

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        &self.inner.url
    }
}

impl PartialEq for ObjectUrl {
    fn eq(&self, other: &Self) -> bool {
        self.inner.url == other.inner.url
    }
}

impl Eq for ObjectUrl {}

impl fmt::Debug for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ObjectUrl").field(&self.inner.url).finish()
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_unique_and_resolvable() {
        let registry = BlobRegistry::new();
        let a = registry.create_object_url(vec![1u8]);
        let b = registry.create_object_url(vec![2u8]);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("blob:qrforge/"));
        assert_eq!(&*registry.resolve(a.as_str()).unwrap(), &[1u8]);
        assert_eq!(&*registry.resolve(b.as_str()).unwrap(), &[2u8]);
    }

    #[test]
    fn last_clone_revokes() {
        let registry = BlobRegistry::new();
        let url = registry.create_object_url(vec![7u8; 4]);
        let key = url.to_string();
        let copy = url.clone();
        drop(url);
        assert!(registry.contains(&key));
        drop(copy);
        assert!(!registry.contains(&key));
        assert!(registry.resolve(&key).is_none());
    }

    #[test]
    fn handle_outlives_registry_clone() {
        let url = {
            let registry = BlobRegistry::new();
            registry.create_object_url(vec![0u8])
        };
        // dropping the handle after the registry must not panic
        drop(url);
    }
}
