use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::LibrarySettings;
use crate::error::{Error, Result};
use crate::playlist;

pub(crate) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

pub fn is_stream(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

fn is_playlist_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("m3u"))
}

/// Every playable file below `dir`, in file-name order within each directory.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file() && is_audio_file(entry.path(), settings))
        .map(|entry| entry.into_path())
        .collect()
}

/// Playable candidates for a random sample. Always recursive regardless of settings.
pub fn sample_candidates(root: &Path, settings: &LibrarySettings) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(Error::NotFound(root.display().to_string()));
    }
    let recursive = LibrarySettings {
        recursive: true,
        ..settings.clone()
    };
    Ok(scan(root, &recursive))
}

/// Turn one user-supplied locator into the ordered list of playable locators it denotes.
///
/// Streams pass through untouched, directories expand to their playable files,
/// `.m3u` files expand to their entries. File locators come back absolute.
pub fn expand_locator(locator: &str, settings: &LibrarySettings) -> Result<Vec<String>> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(Error::Validation("empty locator".to_string()));
    }
    if is_stream(locator) {
        return Ok(vec![locator.to_string()]);
    }

    // Stored locators are absolute so saved playlists resolve them the same way.
    let path = std::path::absolute(locator)?;
    let path = path.as_path();
    if path.is_dir() {
        return Ok(scan(path, settings)
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect());
    }
    if path.is_file() {
        if is_audio_file(path, settings) {
            return Ok(vec![path.to_string_lossy().into_owned()]);
        }
        if is_playlist_file(path) {
            return Ok(playlist::parse_m3u(path)?
                .into_iter()
                .map(|entry| entry.locator)
                .collect());
        }
    }
    Err(Error::NotFound(locator.to_string()))
}

/// Expand several locators in order. Locators that cannot be expanded are
/// skipped and reported back alongside the result.
pub fn expand_all(locators: &[String], settings: &LibrarySettings) -> (Vec<String>, Vec<Error>) {
    let mut found = Vec::new();
    let mut failures = Vec::new();
    for locator in locators {
        match expand_locator(locator, settings) {
            Ok(mut list) => found.append(&mut list),
            Err(e) => failures.push(e),
        }
    }
    (found, failures)
}
