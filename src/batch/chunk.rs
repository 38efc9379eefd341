//! Request chunking

/// Split `items` into contiguous groups of at most `size`, in order.
///
/// The iterator is lazy and `Clone`, so it can be restarted. Empty input
/// yields no groups.
///
/// # Panics
///
/// Panics if `size` is 0.
pub fn chunks<T>(items: &[T], size: usize) -> std::slice::Chunks<'_, T> {
    assert!(size > 0, "chunk size must be non-zero");
    items.chunks(size)
}

/// Number of groups [`chunks`] yields for `len` items
pub fn chunk_count(len: usize, size: usize) -> usize {
    assert!(size > 0, "chunk size must be non-zero");
    len.div_ceil(size)
}
