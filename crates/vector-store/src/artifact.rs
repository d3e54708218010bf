//! Binary index artifact.
//!
//! Layout: a fixed-size header followed by the record payload, both encoded with
//! bincode (fixed-width little-endian integers).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ magic "MOODIDX1" │ schema u32 │ dim u32 │ count u64 │ b3 │  header
//! ├──────────────────────────────────────────────────────────┤
//! │ [ { locator, embedding[dim], group } ; count ]           │  payload
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! `b3` is the BLAKE3 digest of the payload bytes.

use crate::error::{Result, VectorStoreError};
use crate::index::{IndexBuilder, VectorIndex};
use crate::types::VectorRecord;
use bincode::config::{Configuration, Fixint, LittleEndian};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const INDEX_MAGIC: [u8; 8] = *b"MOODIDX1";
pub const INDEX_SCHEMA_VERSION: u32 = 1;

const MAX_ARTIFACT_BYTES: usize = 1 << 31;

#[derive(Debug, Serialize, Deserialize)]
struct ArtifactHeader {
    magic: [u8; 8],
    schema_version: u32,
    dimension: u32,
    record_count: u64,
    checksum: [u8; 32],
}

fn artifact_config() -> Configuration<LittleEndian, Fixint> {
    bincode::config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}

fn corrupt(reason: impl Into<String>) -> VectorStoreError {
    VectorStoreError::CorruptIndex(reason.into())
}

fn encode_parts(dimension: usize, records: &[VectorRecord]) -> Result<Vec<u8>> {
    let dimension = u32::try_from(dimension).map_err(|_| {
        VectorStoreError::SerializationError(format!("dimension {dimension} too large"))
    })?;
    let payload = bincode::serde::encode_to_vec(records, artifact_config())
        .map_err(|e| VectorStoreError::SerializationError(e.to_string()))?;
    let header = ArtifactHeader {
        magic: INDEX_MAGIC,
        schema_version: INDEX_SCHEMA_VERSION,
        dimension,
        record_count: records.len() as u64,
        checksum: *blake3::hash(&payload).as_bytes(),
    };

    let mut bytes = bincode::serde::encode_to_vec(&header, artifact_config())
        .map_err(|e| VectorStoreError::SerializationError(e.to_string()))?;
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

impl VectorIndex {
    /// Serialize the whole index into artifact bytes.
    pub fn encode(&self) -> Result<Vec<u8>> {
        encode_parts(self.dimension().unwrap_or(0), self.records())
    }

    /// Parse artifact bytes, validating header, checksum and dimensionality.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let (header, header_len) =
            bincode::serde::decode_from_slice::<ArtifactHeader, _>(bytes, artifact_config())
                .map_err(|e| corrupt(format!("unreadable header: {e}")))?;

        if header.magic != INDEX_MAGIC {
            return Err(corrupt("not a MoodDine index artifact (bad magic)"));
        }
        if header.schema_version != INDEX_SCHEMA_VERSION {
            return Err(corrupt(format!(
                "unsupported schema_version {} (expected {INDEX_SCHEMA_VERSION})",
                header.schema_version
            )));
        }

        let payload = &bytes[header_len..];
        if blake3::hash(payload).as_bytes() != &header.checksum {
            return Err(corrupt("payload checksum mismatch (truncated or modified file)"));
        }

        let (records, read) = bincode::serde::decode_from_slice::<Vec<VectorRecord>, _>(
            payload,
            artifact_config().with_limit::<MAX_ARTIFACT_BYTES>(),
        )
        .map_err(|e| corrupt(format!("unreadable records: {e}")))?;
        if read != payload.len() {
            return Err(corrupt(format!(
                "expected {} payload bytes, read {read}",
                payload.len()
            )));
        }
        if records.len() as u64 != header.record_count {
            return Err(corrupt(format!(
                "header declares {} records, payload holds {}",
                header.record_count,
                records.len()
            )));
        }

        let expected = header.dimension as usize;
        let mut builder = IndexBuilder::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            if record.embedding.len() != expected {
                return Err(corrupt(format!(
                    "record {position} ('{}') has dimension {}, header declares {expected}",
                    record.locator,
                    record.embedding.len()
                )));
            }
            builder
                .push(record)
                .map_err(|e| corrupt(format!("record {position}: {e}")))?;
        }

        Ok(builder.finish())
    }

    /// Write the index to `path` atomically: readers see either the old file or the
    /// complete new one.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        log::info!("Saving {} records to {}", self.len(), path.display());

        let bytes = self.encode()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let tmp = tmp_path_for(path);
        if let Err(err) = write_synced(&tmp, &bytes).and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }

        log::info!("Index saved ({} bytes)", bytes.len());
        Ok(())
    }

    /// Load a previously saved index.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading index from {}", path.display());

        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(VectorStoreError::NotFound(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };

        let index = Self::decode(&bytes)?;
        log::info!(
            "Loaded {} records (dimension {})",
            index.len(),
            index.dimension().unwrap_or(0)
        );
        Ok(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn sample_index() -> VectorIndex {
        VectorIndex::build(vec![
            VectorRecord::new("images/Noma/1.jpg", vec![0.6, 0.8, 0.0], "Noma"),
            VectorRecord::new("images/Noma/2.jpg", vec![0.0, 0.0, 1.0], "Noma"),
            VectorRecord::new("s3://bucket/Älinea €.png", vec![1.0, 0.0, 0.0], "Alinea"),
        ])
        .unwrap()
    }

    #[test]
    fn save_load_roundtrip_preserves_everything() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("restaurant_index.bin");

        let index = sample_index();
        index.save(&path).unwrap();
        let loaded = VectorIndex::load(&path).unwrap();

        assert_eq!(loaded.records(), index.records());
        assert_eq!(loaded.dimension(), Some(3));
        assert!(!tmp_path_for(&path).exists());
    }

    #[test]
    fn empty_index_roundtrips() {
        let bytes = VectorIndex::empty().encode().unwrap();
        let loaded = VectorIndex::decode(&bytes).unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.dimension(), None);
    }

    #[test]
    fn save_creates_parent_directories() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/index.bin");
        sample_index().save(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let err = VectorIndex::load(tmp.path().join("missing.bin")).unwrap_err();
        assert!(matches!(err, VectorStoreError::NotFound(_)));
    }

    #[test]
    fn modified_payload_is_corrupt() {
        let mut bytes = sample_index().encode().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;
        let err = VectorIndex::decode(&bytes).unwrap_err();
        assert!(matches!(err, VectorStoreError::CorruptIndex(_)));
    }

    #[test]
    fn truncated_artifact_is_corrupt() {
        let bytes = sample_index().encode().unwrap();
        for len in [0, 4, 20, bytes.len() / 2, bytes.len() - 1] {
            let err = VectorIndex::decode(&bytes[..len]).unwrap_err();
            assert!(
                matches!(err, VectorStoreError::CorruptIndex(_)),
                "len {len}: {err}"
            );
        }
    }

    #[test]
    fn foreign_file_is_corrupt() {
        let err = VectorIndex::decode(&[0x42; 128]).unwrap_err();
        assert!(matches!(err, VectorStoreError::CorruptIndex(_)));
    }

    #[test]
    fn inconsistent_dimensions_are_corrupt() {
        let records = vec![
            VectorRecord::new("a.jpg", vec![1.0, 0.0], "A"),
            VectorRecord::new("b.jpg", vec![1.0, 0.0, 0.0], "B"),
        ];
        let bytes = encode_parts(2, &records).unwrap();
        let err = VectorIndex::decode(&bytes).unwrap_err();
        match err {
            VectorStoreError::CorruptIndex(reason) => assert!(reason.contains("b.jpg")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn failed_save_keeps_previous_artifact() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("index.bin");
        sample_index().save(&path).unwrap();
        let before = fs::read(&path).unwrap();

        // A directory squatting on the temp name makes the write fail.
        fs::create_dir(tmp_path_for(&path)).unwrap();
        let replacement =
            VectorIndex::build(vec![VectorRecord::new("x.jpg", vec![1.0], "X")]).unwrap();
        assert!(replacement.save(&path).is_err());

        assert_eq!(fs::read(&path).unwrap(), before);
    }
}
