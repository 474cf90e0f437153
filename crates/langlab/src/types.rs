//! Utility types.

type BuildHasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;

/// Insertion-ordered hash map used throughout the analyses, so that every
/// table and automaton comes out in a deterministic order.
pub type Map<K, V> = indexmap::IndexMap<K, V, BuildHasher>;

/// Insertion-ordered hash set, same rationale as [`Map`].
pub type Set<T> = indexmap::IndexSet<T, BuildHasher>;
