//! Configuration of the in-process heap.

use serde::{Deserialize, Serialize};

/// Allocations between automatic collections in the default configuration.
pub const DEFAULT_COLLECT_EVERY: usize = 128;

/// Element bytes allocated between automatic collections in the default
/// configuration.
pub const DEFAULT_COLLECT_AFTER_BYTES: usize = 8 << 20;

/// Tuning knobs for [`Heap`](super::Heap).
///
/// The default collects automatically under allocation pressure and sets no
/// allocation limit. Missing fields in a serialized config take their
/// defaults; an explicit `null` turns a trigger off.
///
/// ```rust,ignore
/// let config: HeapConfig = serde_json::from_str(r#"{ "collect_every": 1 }"#)?;
/// assert_eq!(config, HeapConfig::stress());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeapConfig {
    /// Run a collection once this many allocations happened since the last.
    pub collect_every: Option<usize>,

    /// Run a collection before an allocation that would bring the element
    /// bytes allocated since the last collection past this threshold.
    pub collect_after_bytes: Option<usize>,

    /// Refuse allocations that would push live element bytes past this limit.
    pub max_live_bytes: Option<usize>,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            collect_every: Some(DEFAULT_COLLECT_EVERY),
            collect_after_bytes: Some(DEFAULT_COLLECT_AFTER_BYTES),
            max_live_bytes: None,
        }
    }
}

impl HeapConfig {
    /// Collect before every allocation.
    pub fn stress() -> Self {
        Self {
            collect_every: Some(1),
            ..Self::default()
        }
    }

    /// Never collect automatically; only [`Heap::collect`](super::Heap::collect)
    /// reclaims objects.
    pub fn manual() -> Self {
        Self {
            collect_every: None,
            collect_after_bytes: None,
            max_live_bytes: None,
        }
    }

    /// Limit live element bytes.
    pub fn with_max_live_bytes(mut self, bytes: usize) -> Self {
        self.max_live_bytes = Some(bytes);
        self
    }

    /// Collect once `bytes` element bytes were allocated since the last
    /// collection.
    pub fn with_collect_after_bytes(mut self, bytes: usize) -> Self {
        self.collect_after_bytes = Some(bytes);
        self
    }
}
