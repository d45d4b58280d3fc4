//! Candidate discovery and file-name-based mod metadata
//!
//! The embedding mod loader normally supplies candidate discovery and
//! metadata extraction. Standalone, the CLI discovers `.jar` files one
//! level under each root and derives metadata from the
//! `<modid>-<version>.jar` naming convention.

use std::path::Path;

use color_eyre::Result;
use walkdir::WalkDir;

use modsync_core::{Candidate, ModMetadata, ModVersion};

/// Discover candidate jar files directly under `root`, sorted by file
/// name so repeated scans agree.
pub fn discover_mods(root: &Path) -> Result<Vec<Candidate>> {
    let mut candidates = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jar"))
        {
            candidates.push(Candidate::new(path));
        }
    }
    Ok(candidates)
}

/// Derives mod metadata from `<modid>-<version>.jar` file names.
///
/// `modA-1.2.3.jar` has mod id `modA` and version `1.2.3`. A file name
/// without a `-<digit...>` suffix is unversioned and keyed by its full
/// file name, so unrelated loose jars never collapse into each other.
pub struct FileNameMetadata;

fn split_versioned(file_name: &str) -> Option<(&str, &str)> {
    let stem = file_name.strip_suffix(".jar")?;
    let (mod_id, version) = stem.rsplit_once('-')?;
    if mod_id.is_empty() || !version.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some((mod_id, version))
}

impl ModMetadata for FileNameMetadata {
    fn mod_id(&self, candidate: &Candidate) -> String {
        match split_versioned(candidate.file_name()) {
            Some((mod_id, _)) => mod_id.to_string(),
            None => candidate.file_name().to_string(),
        }
    }

    fn version(&self, candidate: &Candidate) -> Option<ModVersion> {
        split_versioned(candidate.file_name()).map(|(_, version)| ModVersion::parse(version))
    }
}
