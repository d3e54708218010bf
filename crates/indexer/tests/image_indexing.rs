use mooddine_indexer::{index_from_manifest, ImageIndexer, IndexerError};
use mooddine_vector_store::{
    lock_path_for_index, SidecarEmbedder, StubEmbedder, VectorIndex, VectorStoreError,
};
use pretty_assertions::assert_eq;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

async fn write_image(root: &Path, group: &str, name: &str, bytes: &[u8]) -> std::path::PathBuf {
    let dir = root.join(group);
    tokio::fs::create_dir_all(&dir).await.expect("create group dir");
    let path = dir.join(name);
    tokio::fs::write(&path, bytes).await.expect("write image");
    path
}

#[tokio::test]
async fn stub_indexing_builds_and_saves_sorted_index() {
    let temp = TempDir::new().expect("tempdir");
    let images = temp.path().join("restaurant_images");
    write_image(&images, "Zuni", "1.jpg", b"zuni-1").await;
    write_image(&images, "Alinea", "2.png", b"alinea-2").await;
    write_image(&images, "Alinea", "1.png", b"alinea-1").await;

    let index_path = temp.path().join("out/restaurant_index.bin");
    let indexer = ImageIndexer::new(&images, &index_path, Arc::new(StubEmbedder::new(16)));
    let stats = indexer.index().await.expect("index");

    assert_eq!(stats.images, 3);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.dimension, Some(16));
    assert_eq!(stats.groups.get("Alinea"), Some(&2));

    let index = VectorIndex::load(&index_path).expect("load");
    let groups: Vec<&str> = index.records().iter().map(|r| r.group.as_str()).collect();
    assert_eq!(groups, vec!["Alinea", "Alinea", "Zuni"]);
    assert!(index.records()[0].locator.ends_with("1.png"));
    assert!(lock_path_for_index(&index_path).exists());
}

#[tokio::test]
async fn failing_images_are_skipped_and_recorded() {
    let temp = TempDir::new().expect("tempdir");
    let images = temp.path().join("restaurant_images");

    let good = write_image(&images, "Noma", "room.jpg", b"jpg").await;
    tokio::fs::write(SidecarEmbedder::sidecar_path(&good), "[0.6, 0.8]")
        .await
        .expect("sidecar");
    // No sidecar at all.
    write_image(&images, "Noma", "terrace.jpg", b"jpg").await;
    // Zero vector, sorted first so it would otherwise fix the dimension.
    let blank = write_image(&images, "Alinea", "blank.jpg", b"jpg").await;
    tokio::fs::write(SidecarEmbedder::sidecar_path(&blank), "[0.0, 0.0]")
        .await
        .expect("sidecar");

    let index_path = temp.path().join("restaurant_index.bin");
    let stats = ImageIndexer::new(&images, &index_path, Arc::new(SidecarEmbedder))
        .index()
        .await
        .expect("index continues past bad images");

    assert_eq!(stats.images, 1);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.errors.len(), 2);
    assert!(stats.errors.iter().any(|e| e.contains("terrace.jpg")));
    assert!(stats
        .errors
        .iter()
        .any(|e| e.contains("blank.jpg") && e.contains("norm")));
    assert_eq!(stats.groups.get("Alinea"), None);

    let index = VectorIndex::load(&index_path).expect("load");
    assert_eq!(index.len(), 1);
    assert_eq!(index.records()[0].embedding, vec![0.6, 0.8]);
    assert!(index.search(&[0.6, 0.8], 10).is_ok());
}

#[tokio::test]
async fn dimension_mismatch_aborts_without_replacing_artifact() {
    let temp = TempDir::new().expect("tempdir");
    let images = temp.path().join("restaurant_images");
    let sidecars = [
        ("Alinea", "odd.jpg", "[1.0, 0.0, 0.0]"),
        ("Noma", "1.jpg", "[0.6, 0.8]"),
        ("Noma", "2.jpg", "[1.0, 0.0]"),
        ("Zuni", "1.jpg", "[0.0, 1.0]"),
    ];
    for (group, name, vector) in sidecars {
        let image = write_image(&images, group, name, b"jpg").await;
        tokio::fs::write(SidecarEmbedder::sidecar_path(&image), vector)
            .await
            .expect("sidecar");
    }

    let index_path = temp.path().join("restaurant_index.bin");
    index_from_manifest_fixture(temp.path(), &index_path).await;
    let before = tokio::fs::read(&index_path).await.expect("read");

    let err = ImageIndexer::new(&images, &index_path, Arc::new(SidecarEmbedder))
        .index()
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        IndexerError::VectorStoreError(VectorStoreError::DimensionMismatch {
            expected: 3,
            actual: 2
        })
    ));
    assert_eq!(tokio::fs::read(&index_path).await.expect("read"), before);
}

async fn index_from_manifest_fixture(root: &Path, index_path: &Path) {
    let manifest = root.join("previous.jsonl");
    tokio::fs::write(
        &manifest,
        "{\"locator\": \"old.jpg\", \"group\": \"Old\", \"embedding\": [1.0, 0.0]}\n",
    )
    .await
    .expect("write manifest");
    index_from_manifest(&manifest, index_path)
        .await
        .expect("previous index");
}

#[tokio::test]
async fn missing_images_dir_is_invalid_path() {
    let temp = TempDir::new().expect("tempdir");
    let err = ImageIndexer::new(
        temp.path().join("missing"),
        temp.path().join("restaurant_index.bin"),
        Arc::new(StubEmbedder::new(8)),
    )
    .index()
    .await
    .unwrap_err();
    assert!(matches!(err, IndexerError::InvalidPath(_)));
}

#[tokio::test]
async fn reindexing_overwrites_previous_artifact() {
    let temp = TempDir::new().expect("tempdir");
    let images = temp.path().join("restaurant_images");
    write_image(&images, "Noma", "1.jpg", b"one").await;
    let index_path = temp.path().join("restaurant_index.bin");
    let indexer = ImageIndexer::new(&images, &index_path, Arc::new(StubEmbedder::new(8)));

    indexer.index().await.expect("first run");
    write_image(&images, "Alinea", "1.jpg", b"two").await;
    indexer.index().await.expect("second run");

    let index = VectorIndex::load(&index_path).expect("load");
    assert_eq!(index.len(), 2);
}

#[tokio::test]
async fn manifest_import_saves_index() {
    let temp = TempDir::new().expect("tempdir");
    let manifest = temp.path().join("embeddings.jsonl");
    tokio::fs::write(
        &manifest,
        concat!(
            "{\"locator\": \"s3://imgs/noma/1.jpg\", \"group\": \"Noma\", \"embedding\": [0.6, 0.8]}\n",
            "{\"locator\": \"s3://imgs/zuni/1.jpg\", \"group\": \"Zuni\", \"embedding\": [1.0, 0.0]}\n",
        ),
    )
    .await
    .expect("write manifest");

    let index_path = temp.path().join("restaurant_index.bin");
    let stats = index_from_manifest(&manifest, &index_path)
        .await
        .expect("import");
    assert_eq!(stats.images, 2);
    assert_eq!(stats.dimension, Some(2));

    let index = VectorIndex::load(&index_path).expect("load");
    assert_eq!(index.records()[0].locator, "s3://imgs/noma/1.jpg");
}

#[tokio::test]
async fn bad_manifest_keeps_existing_artifact() {
    let temp = TempDir::new().expect("tempdir");
    let index_path = temp.path().join("restaurant_index.bin");
    let good = temp.path().join("good.jsonl");
    tokio::fs::write(
        &good,
        "{\"locator\": \"a.jpg\", \"group\": \"A\", \"embedding\": [1.0]}\n",
    )
    .await
    .expect("write");
    index_from_manifest(&good, &index_path).await.expect("import");
    let before = tokio::fs::read(&index_path).await.expect("read");

    let bad = temp.path().join("bad.jsonl");
    tokio::fs::write(&bad, "{\"locator\": 1}\n").await.expect("write");
    let err = index_from_manifest(&bad, &index_path).await.unwrap_err();
    assert!(matches!(err, IndexerError::Manifest { line: 1, .. }));

    assert_eq!(tokio::fs::read(&index_path).await.expect("read"), before);
}
