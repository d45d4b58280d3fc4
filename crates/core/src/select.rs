//! Mod-list selection: dedup by mod id, keep the newest version
//!
//! Turns a raw, possibly-duplicated candidate collection into the
//! canonical set a manifest is built from. Selection never touches file
//! contents; it only consults the embedder-supplied [`ModMetadata`]
//! capability.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::version::ModVersion;

/// An opaque handle to a discovered candidate file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    path: PathBuf,
    file_name: String,
}

impl Candidate {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, file_name }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

/// Metadata the embedding mod loader supplies for discovered candidates.
///
/// How the metadata is obtained (archive inspection, loader reflection,
/// file-name convention) is entirely the embedder's business.
pub trait ModMetadata {
    /// Logical id shared by all packagings of the same mod
    fn mod_id(&self, candidate: &Candidate) -> String;

    /// Orderable artifact version, when the candidate is a packaged,
    /// versioned mod; `None` for loose or unversioned entries
    fn version(&self, candidate: &Candidate) -> Option<ModVersion>;
}

/// Resolves a raw candidate collection into the canonical mod list
pub struct ModListSelector {
    excluded_mod_ids: HashSet<String>,
}

impl ModListSelector {
    #[must_use]
    pub fn new(excluded_mod_ids: HashSet<String>) -> Self {
        Self { excluded_mod_ids }
    }

    /// Select the canonical candidate list.
    ///
    /// Candidates are partitioned by mod id; excluded ids are dropped
    /// whole. A partition where every member is versioned collapses to
    /// its strictly-newest member (the first encountered wins a version
    /// tie). Partitions mixing versioned and unversioned members are
    /// kept intact rather than silently collapsed. Output order follows
    /// first encounter, so repeated runs on the same input agree.
    #[must_use]
    pub fn select(&self, candidates: Vec<Candidate>, metadata: &dyn ModMetadata) -> Vec<Candidate> {
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<Candidate>> = HashMap::new();

        for candidate in candidates {
            match groups.entry(metadata.mod_id(&candidate)) {
                Entry::Occupied(mut entry) => entry.get_mut().push(candidate),
                Entry::Vacant(entry) => {
                    order.push(entry.key().clone());
                    entry.insert(vec![candidate]);
                }
            }
        }

        let mut selected = Vec::new();
        for mod_id in &order {
            if self.excluded_mod_ids.contains(mod_id) {
                continue;
            }
            let Some(group) = groups.remove(mod_id) else {
                continue;
            };
            selected.extend(select_newest(mod_id, group, metadata));
        }
        selected
    }
}

fn select_newest(
    mod_id: &str,
    mut group: Vec<Candidate>,
    metadata: &dyn ModMetadata,
) -> Vec<Candidate> {
    if group.len() <= 1 {
        return group;
    }

    let versions: Vec<Option<ModVersion>> = group
        .iter()
        .map(|candidate| metadata.version(candidate))
        .collect();
    if versions.iter().any(Option::is_none) {
        // An ambiguous mix of versioned and loose entries; keep all of them.
        return group;
    }

    debug!("selecting newest by artifact version for mod id {mod_id}");
    let mut newest = 0;
    for (index, version) in versions.iter().enumerate().skip(1) {
        // Strict comparison: the first candidate encountered wins a tie.
        if version > &versions[newest] {
            newest = index;
        }
    }
    debug!(
        "newest file for mod id {} is {}",
        mod_id,
        group[newest].file_name()
    );
    vec![group.swap_remove(newest)]
}
