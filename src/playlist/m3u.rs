use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const HEADER: &str = "#EXTM3U";
const EXTINF: &str = "#EXTINF:";

/// One playlist line plus its optional `#EXTINF` info.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M3uEntry {
    pub locator: String,
    pub title: Option<String>,
    pub duration_secs: Option<i64>,
}

impl M3uEntry {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            title: None,
            duration_secs: None,
        }
    }
}

/// Render entries as extended M3U text.
pub fn render_m3u(entries: &[M3uEntry]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for entry in entries {
        if entry.title.is_some() || entry.duration_secs.is_some() {
            out.push_str(&format!(
                "{EXTINF}{},{}\n",
                entry.duration_secs.unwrap_or(-1),
                entry.title.as_deref().unwrap_or_default()
            ));
        }
        out.push_str(&entry.locator);
        out.push('\n');
    }
    out
}

/// Parse M3U text. Relative entries resolve against `base_dir`.
pub fn parse_m3u_str(text: &str, base_dir: Option<&Path>) -> Vec<M3uEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<(Option<i64>, String)> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim().trim_start_matches('\u{feff}');
        if line.is_empty() || line == HEADER {
            continue;
        }
        if let Some(info) = line.strip_prefix(EXTINF) {
            let (secs, title) = info.split_once(',').unwrap_or((info, ""));
            pending = Some((secs.trim().parse().ok(), title.trim().to_string()));
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let locator = match base_dir {
            Some(base) if !is_absolute_locator(line) => {
                base.join(line).to_string_lossy().into_owned()
            }
            _ => line.to_string(),
        };
        let (duration_secs, title) = match pending.take() {
            Some((secs, title)) => (secs, Some(title).filter(|t| !t.is_empty())),
            None => (None, None),
        };
        entries.push(M3uEntry {
            title,
            duration_secs,
            ..M3uEntry::new(locator)
        });
    }
    entries
}

fn is_absolute_locator(line: &str) -> bool {
    line.contains("://") || Path::new(line).is_absolute()
}

pub fn parse_m3u(path: &Path) -> Result<Vec<M3uEntry>> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
        _ => Error::Io(e),
    })?;
    Ok(parse_m3u_str(&text, path.parent()))
}

pub fn write_m3u(path: &Path, entries: &[M3uEntry]) -> Result<()> {
    fs::write(path, render_m3u(entries))?;
    Ok(())
}

/// Named playlists kept as `<name>.m3u` files in one directory.
#[derive(Debug, Clone)]
pub struct PlaylistStore {
    dir: PathBuf,
}

impl PlaylistStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the playlist called `name`. Rejects names that would escape the directory.
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let name = name.trim();
        let stem = name.strip_suffix(".m3u").unwrap_or(name);
        if stem.is_empty() || stem.contains('/') || stem.contains('\\') || stem.starts_with('.') {
            return Err(Error::Validation(format!("invalid playlist name '{name}'")));
        }
        Ok(self.dir.join(format!("{stem}.m3u")))
    }

    pub fn save(&self, name: &str, entries: &[M3uEntry]) -> Result<PathBuf> {
        if entries.is_empty() {
            return Err(Error::EmptyTracklist);
        }
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.dir)?;
        write_m3u(&path, entries)?;
        Ok(path)
    }

    pub fn rename(&self, old: &str, new: &str) -> Result<PathBuf> {
        let from = self.path_for(old)?;
        let to = self.path_for(new)?;
        if !from.is_file() {
            return Err(Error::NotFound(from.display().to_string()));
        }
        fs::rename(&from, &to)?;
        Ok(to)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(Error::NotFound(path.display().to_string()));
        }
        fs::remove_file(&path)?;
        Ok(())
    }
}
