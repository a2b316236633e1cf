pub mod text;
pub mod time;

pub use time::*;

use rayon::prelude::*;

pub trait Identifiable {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn normalized_name(&self) -> &str;
    /// Every raw identifier the entity answers to, `id()` included.
    fn ids(&self) -> &[String];
}

/// Generic name search built for multithreaded searching.
/// Matches when the normalized name contains the normalized needle, or when any
/// raw id contains the trimmed needle ignoring case.
/// Results are ordered by normalized name, then by name and id.
pub fn search<'a, T>(needle: &str, haystack: &'a [T]) -> Vec<&'a T>
where
    T: Send + Sync + Identifiable,
{
    let needle = needle.trim();
    if needle.is_empty() {
        return Vec::new();
    }
    let normalized_needle = text::normalize(needle);
    let raw_needle = needle.to_lowercase();

    let mut results: Vec<&T> = haystack
        .par_iter()
        .filter(|hay| {
            (!normalized_needle.is_empty() && hay.normalized_name().contains(&normalized_needle))
                || hay
                    .ids()
                    .iter()
                    .any(|id| id.to_lowercase().contains(&raw_needle))
        })
        .collect();

    results.par_sort_by(|a, b| {
        a.normalized_name()
            .cmp(b.normalized_name())
            .then_with(|| a.name().cmp(b.name()))
            .then_with(|| a.id().cmp(b.id()))
    });
    results
}
