//! Catalog builder.
//!
//! # Responsibility
//! - Enumerate candidate images in one directory by extension.
//! - Fix a deterministic visiting order for a freshly created ledger.
//!
//! # Invariants
//! - The scan is non-recursive and the extension match is case-sensitive.
//! - A missing or unreadable directory yields an empty catalog, never an error.
//! - Once a ledger exists its stored order wins; this module is not consulted.

use crate::model::record::is_representable_identifier;
use log::{info, warn};
use std::path::Path;
use std::time::Instant;

/// Builds the ordered list of image identifiers found in `directory`.
///
/// Identifiers are file names relative to `directory`, sorted by byte order.
/// Names that cannot be stored on one ledger line are skipped.
pub fn build_catalog(directory: impl AsRef<Path>, extension: &str) -> Vec<String> {
    let started_at = Instant::now();
    let directory = directory.as_ref();
    let extension = extension.trim_start_matches('.');

    let entries = match std::fs::read_dir(directory) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(
                "event=catalog_build module=catalog status=empty dir={} error={}",
                directory.display(),
                err
            );
            return Vec::new();
        }
    };

    let mut identifiers = Vec::new();
    let mut skipped = 0usize;
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            skipped += 1;
            continue;
        };
        if !is_representable_identifier(name) {
            skipped += 1;
            continue;
        }
        identifiers.push(name.to_string());
    }
    identifiers.sort();

    if skipped > 0 {
        warn!(
            "event=catalog_build module=catalog status=skipped count={} reason=unrepresentable_name",
            skipped
        );
    }
    info!(
        "event=catalog_build module=catalog status=ok dir={} extension={} count={} duration_ms={}",
        directory.display(),
        extension,
        identifiers.len(),
        started_at.elapsed().as_millis()
    );

    identifiers
}
