use std::path::{Path, PathBuf};

pub const DEFAULT_INDEX_FILE_NAME: &str = "restaurant_index.bin";
pub const DEFAULT_IMAGES_DIR_NAME: &str = "restaurant_images";

#[must_use]
pub fn default_index_path() -> PathBuf {
    PathBuf::from(DEFAULT_INDEX_FILE_NAME)
}

#[must_use]
pub fn default_images_dir() -> PathBuf {
    PathBuf::from(DEFAULT_IMAGES_DIR_NAME)
}

/// Advisory lock file guarding (re)generation of the artifact at `index_path`.
#[must_use]
pub fn lock_path_for_index(index_path: &Path) -> PathBuf {
    let mut name = index_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_path_sits_next_to_artifact() {
        assert_eq!(
            lock_path_for_index(Path::new("data/restaurant_index.bin")),
            PathBuf::from("data/restaurant_index.bin.lock")
        );
    }
}
