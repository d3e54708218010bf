use crate::error::{IndexerError, Result};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// An image found under `<root>/<group>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    pub group: String,
    pub path: PathBuf,
}

/// Scanner for `<root>/<restaurant>/<image>` layouts.
///
/// Only the first directory level names groups; files directly under the root and
/// anything nested deeper are ignored.
pub struct ImageScanner {
    root: PathBuf,
}

impl ImageScanner {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Images sorted by (group, file name).
    pub fn scan(&self) -> Result<Vec<ImageEntry>> {
        if !self.root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "Not a directory: {}",
                self.root.display()
            )));
        }

        let mut images = Vec::new();
        let walker = WalkDir::new(&self.root)
            .max_depth(2)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_hidden(entry));

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Failed to read entry: {e}");
                    continue;
                }
            };
            if entry.depth() != 2
                || !entry.file_type().is_file()
                || !Self::is_image_file(entry.path())
            {
                continue;
            }

            let Some(group) = Self::group_of(entry.path()) else {
                log::warn!(
                    "Skipping {}: restaurant directory name is not valid UTF-8",
                    entry.path().display()
                );
                continue;
            };
            images.push(ImageEntry {
                group,
                path: entry.into_path(),
            });
        }

        images.sort_by(|a, b| {
            a.group
                .cmp(&b.group)
                .then_with(|| a.path.file_name().cmp(&b.path.file_name()))
        });

        log::info!(
            "Found {} images under {}",
            images.len(),
            self.root.display()
        );
        Ok(images)
    }

    fn group_of(path: &Path) -> Option<String> {
        path.parent()?
            .file_name()?
            .to_str()
            .map(ToString::to_string)
    }

    fn is_image_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                IMAGE_EXTENSIONS
                    .iter()
                    .any(|candidate| ext.eq_ignore_ascii_case(candidate))
            })
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif", "bmp", "tif", "tiff"];
