use std::any::{Any, TypeId};
use std::sync::Arc;

use crate::layout::{LayoutCache, Record, RecordLayout};

mod decoder;
mod encoder;
mod line_reader;

pub use decoder::{Decoder, Records};
pub use encoder::Encoder;
pub use line_reader::LineReader;

// ─── LastLayout ─────────────────────────────────────────────────────────────

/// One-slot layout cache in front of [`LayoutCache::global`]. Streams tend
/// to see the same record type line after line.
#[derive(Default)]
struct LastLayout {
    slot: Option<(TypeId, Arc<dyn Any + Send + Sync>)>,
}

impl LastLayout {
    fn get<R: Record>(&mut self) -> Arc<RecordLayout<R>> {
        let id = TypeId::of::<R>();
        if let Some((last_id, layout)) = &self.slot {
            if *last_id == id {
                if let Ok(layout) = Arc::clone(layout).downcast::<RecordLayout<R>>() {
                    return layout;
                }
            }
        }

        let layout = LayoutCache::global().layout_of::<R>();
        self.slot = Some((id, Arc::clone(&layout) as Arc<dyn Any + Send + Sync>));
        layout
    }
}
