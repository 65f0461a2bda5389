pub mod asset;
pub mod entry_point;
pub mod module_id;
pub mod output;
pub mod output_asset;
pub mod output_chunk;
pub mod pre_rendered_chunk;
pub mod raw_idx;
pub mod rendered_module;
pub mod str_or_bytes;

use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

/// Insertion-ordered collections with the fast hasher; bundle contents and
/// chunk naming both depend on deterministic iteration order.
pub type FxIndexSet<T> = indexmap::IndexSet<T, BuildHasherDefault<FxHasher>>;
pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;
