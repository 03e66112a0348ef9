/// Read a positive integer override through `lookup`.
///
/// Unset, unparsable and zero values all yield `None` so callers fall back to their defaults.
pub(crate) fn positive_usize(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<usize> {
    lookup(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
}

/// Like [`positive_usize`], narrowed to `u32`.
pub(crate) fn positive_u32(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<u32> {
    positive_usize(lookup, name).and_then(|n| u32::try_from(n).ok())
}

/// The process environment as a lookup.
pub(crate) fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
