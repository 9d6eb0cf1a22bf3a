//! Case discovery in dataset directories.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::dataset::{CaseData, IMAGE_EXTENSIONS, file_name};
use crate::error::{Error, Result};

/// Name fragments marking the reference image, in priority order.
const MAIN_MARKERS: &[&str] = &["main", "主"];

/// Discover every usable case under `root`.
///
/// Each non-hidden sub-directory is a case. Directories without a main image
/// or without any candidate are skipped with a warning.
pub fn discover_cases(root: impl AsRef<Path>) -> Result<Vec<CaseData>> {
    let root = root.as_ref();
    if !root.exists() {
        return Err(Error::Dataset(format!("Path does not exist: {}", root.display())));
    }

    if !root.is_dir() {
        return Err(Error::Dataset(format!("Path is not a directory: {}", root.display())));
    }

    let mut case_dirs = Vec::new();
    for path in read_dir(root)? {
        if path.is_dir() && !file_name(&path).starts_with('.') {
            case_dirs.push(path);
        }
    }
    case_dirs.sort();

    let mut cases = Vec::with_capacity(case_dirs.len());
    for dir in case_dirs {
        let case_name = file_name(&dir).to_string();
        let main = find_main_image(&dir)?;
        let subs = find_sub_images(&dir, main.as_deref())?;

        match main {
            Some(main_path) if !subs.is_empty() => {
                cases.push(CaseData::new(case_name, main_path, subs));
            }
            _ => warn!(case = %case_name, "skipping case: missing main or candidate images"),
        }
    }

    Ok(cases)
}

/// Find the reference image of a case directory.
///
/// Extensions are tried in [`IMAGE_EXTENSIONS`] order. For each extension a
/// name containing `main` wins over one containing `主`.
pub fn find_main_image(dir: &Path) -> Result<Option<PathBuf>> {
    let images = list_images(dir)?;

    for ext in IMAGE_EXTENSIONS {
        for marker in MAIN_MARKERS {
            let found = images
                .iter()
                .find(|p| has_extension(p, ext) && file_name(p).contains(marker));
            if let Some(path) = found {
                return Ok(Some(path.clone()));
            }
        }
    }

    Ok(None)
}

/// All images of a case directory except the main one, sorted by path.
pub fn find_sub_images(dir: &Path, main: Option<&Path>) -> Result<Vec<PathBuf>> {
    let main_name = main.map(file_name);
    Ok(list_images(dir)?
        .into_iter()
        .filter(|p| Some(file_name(p)) != main_name)
        .collect())
}

/// Image files directly inside `dir`, sorted by path.
fn list_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = read_dir(dir)?
        .into_iter()
        .filter(|p| p.is_file() && IMAGE_EXTENSIONS.iter().any(|ext| has_extension(p, ext)))
        .collect();
    images.sort();
    Ok(images)
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn read_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::Dataset(format!("Failed to read directory {}: {}", dir.display(), e))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| {
            Error::Dataset(format!("Failed to read entry in {}: {}", dir.display(), e))
        })?;
        paths.push(entry.path());
    }
    Ok(paths)
}
