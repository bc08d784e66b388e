//! Picks an object key that is not present in the bucket.
//!
//! The check runs against a single listing snapshot. Nothing stops a second
//! request from observing the same snapshot and choosing the same key; the
//! store's last-writer-wins semantics decide that race at upload time.

use std::collections::HashSet;

use crate::upstream::{ObjectListing, StoreError};

/// Return `candidate`, or the first `<base>_<n><ext>` (n = 1, 2, ...) that
/// does not appear in the bucket listing for `<base>`.
pub async fn resolve_free_key(
    listing: &dyn ObjectListing,
    candidate: &str,
) -> Result<String, StoreError> {
    let (base, _) = split_suffixes(candidate);
    let keys = listing.list_keys(base).await?;
    let taken: HashSet<&str> = keys.iter().map(String::as_str).collect();

    let key = next_free_key(candidate, &taken);
    if key != candidate {
        tracing::info!(requested = %candidate, resolved = %key, "object key taken, renamed upload");
    }
    Ok(key)
}

/// Pure half of [`resolve_free_key`].
///
/// The numeric suffix is an independent counter, so the result does not
/// depend on listing order. Terminates because each probe is distinct and
/// `taken` is finite.
pub fn next_free_key(candidate: &str, taken: &HashSet<&str>) -> String {
    if !taken.contains(candidate) {
        return candidate.to_string();
    }

    let (base, ext) = split_suffixes(candidate);
    let mut n: u64 = 1;
    loop {
        let probe = format!("{}_{}{}", base, n, ext);
        if !taken.contains(probe.as_str()) {
            return probe;
        }
        n += 1;
    }
}

/// Split a key into the base used for the listing prefix and its extension.
///
/// The base has the extension and any trailing `_<digits>` removed:
/// `uploads/photo_3.jpg` -> (`uploads/photo`, `.jpg`).
pub fn split_suffixes(key: &str) -> (&str, &str) {
    let (stem, ext) = split_extension(key);
    (strip_counter(stem), ext)
}

/// Split off the extension of the last path segment, including the dot.
/// Dotfiles such as `.env` have no extension.
pub fn split_extension(key: &str) -> (&str, &str) {
    let segment_start = key.rfind('/').map(|i| i + 1).unwrap_or(0);
    match key[segment_start..].rfind('.') {
        Some(dot) if dot > 0 => key.split_at(segment_start + dot),
        _ => (key, ""),
    }
}

fn strip_counter(stem: &str) -> &str {
    let segment_start = stem.rfind('/').map(|i| i + 1).unwrap_or(0);
    match stem.rfind('_') {
        Some(underscore) if underscore > segment_start => {
            let digits = &stem[underscore + 1..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                &stem[..underscore]
            } else {
                stem
            }
        }
        _ => stem,
    }
}
