//! Hash collection aliases.
//!
//! All hot-path maps and sets use the Fx hasher; go through these
//! aliases rather than importing `rustc_hash` directly.

pub use rustc_hash::{FxHashMap, FxHashSet};
