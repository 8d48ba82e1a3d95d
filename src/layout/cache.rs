use std::any::{Any, TypeId};
use std::hash::BuildHasherDefault;
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use rustc_hash::FxHasher;

use super::{Record, RecordLayout};

type AnyLayout = Arc<dyn Any + Send + Sync>;

static GLOBAL: LazyLock<LayoutCache> = LazyLock::new(LayoutCache::new);

// ─── LayoutCache ────────────────────────────────────────────────────────────

/// Layouts keyed by record type, built on first use.
///
/// Two threads missing on the same type may both build its layout; the
/// first insert wins and both get the stored one. No shard lock is held
/// while a layout is being built.
#[derive(Default)]
pub struct LayoutCache {
    layouts: DashMap<TypeId, AnyLayout, BuildHasherDefault<FxHasher>>,
}

impl LayoutCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by the top-level functions and streams.
    pub fn global() -> &'static LayoutCache {
        &GLOBAL
    }

    pub fn layout_of<R: Record>(&self) -> Arc<RecordLayout<R>> {
        let id = TypeId::of::<R>();
        if let Some(entry) = self.layouts.get(&id) {
            if let Ok(layout) = Arc::clone(entry.value()).downcast::<RecordLayout<R>>() {
                return layout;
            }
        }

        let built = Arc::new(RecordLayout::<R>::build());
        let stored = Arc::clone(
            self.layouts
                .entry(id)
                .or_insert_with(|| Arc::clone(&built) as AnyLayout)
                .value(),
        );
        // Keyed by TypeId, so the stored layout always has this type.
        stored.downcast::<RecordLayout<R>>().unwrap_or(built)
    }

    pub fn contains<R: Record>(&self) -> bool {
        self.layouts.contains_key(&TypeId::of::<R>())
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

impl std::fmt::Debug for LayoutCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutCache")
            .field("layouts", &self.layouts.len())
            .finish()
    }
}
