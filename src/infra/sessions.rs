//! Live map pages, one per open browser tab.
//!
//! A page is bootstrapped once when `/` is rendered and then kept here, so
//! later events replay against the same store and marker registry. Pages are
//! held in a bounded LRU; an evicted page simply reports as expired.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use lru::LruCache;
use metrics::counter;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::bootstrap::MapPage;
use crate::application::page::UiEvent;
use crate::presentation::document::{HtmlDocument, MountPatch};

use super::leaflet::LeafletScript;

const SOURCE: &str = "infra::sessions";

pub type LivePage = MapPage<HtmlDocument, LeafletScript>;

/// Everything one event changed: mount updates plus map statements to run.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct PagePatch {
    pub mounts: Vec<MountPatch>,
    pub script: String,
}

impl PagePatch {
    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty() && self.script.is_empty()
    }
}

pub struct PageSessions {
    pages: Mutex<LruCache<Uuid, LivePage>>,
}

impl PageSessions {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            pages: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Keep `page` live under `id`. Content recorded so far is treated as delivered.
    pub fn insert(&self, id: Uuid, mut page: LivePage) {
        page.surface_mut().take_changes();
        page.map_mut().take_script();

        let mut pages = lock(&self.pages, "insert");
        if let Some((evicted, _)) = pages.push(id, page)
            && evicted != id
        {
            counter!("polemap_page_sessions_evicted_total").increment(1);
            debug!(
                target = "polemap::sessions",
                page = %evicted,
                "least recently used map page evicted"
            );
        }
    }

    /// Deliver one event. `None` when the page expired or never existed.
    pub fn dispatch(&self, id: &Uuid, event: UiEvent) -> Option<PagePatch> {
        let mut pages = lock(&self.pages, "dispatch");
        let page = pages.get_mut(id)?;
        page.dispatch(event);

        Some(PagePatch {
            mounts: page.surface_mut().take_changes(),
            script: page.map_mut().take_script(),
        })
    }

    pub fn len(&self) -> usize {
        lock(&self.pages, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, op: &'static str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                target = "polemap::sessions",
                op,
                source = SOURCE,
                result = "poisoned_recovered",
                "recovered from poisoned page session lock"
            );
            poisoned.into_inner()
        }
    }
}
