use nightlight_core::models::{Bounds, Date, MapIdentity, MapProvider, MapType};
use nightlight_core::ports::{ExternalCatalog, ManifestStore, ObjectStore, RequestQueue, TileHost};
use nightlight_core::NightlightError;
use nightlight_store::fs::{DirectoryTileHost, FsManifestStore, FsObjectStore, FsRequestQueue, JsonCatalog};
use nightlight_store::TileHostCredentials;
use std::collections::HashMap;
use tempfile::TempDir;

fn map(month: u32) -> MapIdentity {
    MapIdentity::new(
        MapProvider::Eogdata,
        Bounds::UkraineAndAround,
        MapType::Monthly,
        Date::new(2021, month, 1),
    )
}

#[tokio::test]
async fn test_object_store_lists_nested_keys_sorted() {
    let dir = TempDir::new().unwrap();
    let store = FsObjectStore::new(dir.path());

    let b = "MapProviderEogdata/BoundsUkraineAndAround/MapTypeMonthly/2021_2_1.tif";
    let a = "MapProviderEogdata/BoundsUkraineAndAround/MapTypeMonthly/2021_1_1.tif";
    store.put("raw", b, b"b").await.unwrap();
    store.put("raw", a, b"a").await.unwrap();

    assert_eq!(store.list_keys("raw").await.unwrap(), vec![a.to_string(), b.to_string()]);
    assert!(store.list_keys("processed").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_object_store_metadata_and_delete() {
    let dir = TempDir::new().unwrap();
    let store = FsObjectStore::new(dir.path());
    let key = "a/b/c/2021_1_1.tif";

    let metadata = HashMap::from([("source-url".to_string(), "https://eog/1.tif".to_string())]);
    store.put_with_metadata("raw", key, b"tif", &metadata).await.unwrap();

    assert_eq!(
        store.get_metadata("raw", key, "source-url").await.unwrap(),
        Some("https://eog/1.tif".to_string())
    );
    // Metadata lives outside the bucket directory
    assert_eq!(store.list_keys("raw").await.unwrap(), vec![key.to_string()]);

    store.delete("raw", key).await.unwrap();
    assert!(store.get("raw", key).await.unwrap().is_none());
    assert!(store.get_metadata("raw", key, "source-url").await.unwrap().is_none());
    assert!(store.delete("raw", key).await.is_ok());
}

#[tokio::test]
async fn test_object_store_rejects_traversal() {
    let dir = TempDir::new().unwrap();
    let store = FsObjectStore::new(dir.path());

    let err = store.put("raw", "../outside.tif", b"x").await.unwrap_err();
    assert!(matches!(err, NightlightError::StoreUnavailable { .. }));
}

#[tokio::test]
async fn test_request_queue_appends_messages() {
    let dir = TempDir::new().unwrap();
    let queue = FsRequestQueue::new(dir.path());

    queue.publish_create_request("create", &map(1)).await.unwrap();
    queue.publish_create_request("create", &map(2)).await.unwrap();

    let messages = queue.messages("create").await.unwrap();
    let maps: Vec<_> = messages
        .into_iter()
        .map(|m| m.download_and_crop_raw_tif_request.map)
        .collect();
    assert_eq!(maps, vec![map(1), map(2)]);
}

#[tokio::test]
async fn test_manifest_store_versions() {
    let dir = TempDir::new().unwrap();
    let store = FsManifestStore::new(dir.path().join("manifest").join("options.json"));

    assert!(store.get_document().await.unwrap().is_none());
    assert_eq!(store.put_document(b"[]", None).await.unwrap(), 1);

    let err = store.put_document(b"[1]", None).await.unwrap_err();
    assert!(err.is_conflict());

    assert_eq!(store.put_document(b"[2]", Some(1)).await.unwrap(), 2);
    let doc = store.get_document().await.unwrap().unwrap();
    assert_eq!(doc.bytes, b"[2]");
    assert_eq!(doc.version, 2);
}

#[tokio::test]
async fn test_manifest_interrupted_write_rejects_stale_writer() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.json");
    let store = FsManifestStore::new(&path);
    assert_eq!(store.put_document(b"[]", None).await.unwrap(), 1);

    // A write that stopped after bumping the version but before the document
    std::fs::write(dir.path().join("options.json.version"), "2").unwrap();

    let err = store.put_document(b"[1]", Some(1)).await.unwrap_err();
    assert!(err.is_conflict());

    let doc = store.get_document().await.unwrap().unwrap();
    assert_eq!(doc.bytes, b"[]");
    assert_eq!(doc.version, 2);
    assert_eq!(store.put_document(b"[1]", Some(2)).await.unwrap(), 3);
}

#[tokio::test]
async fn test_directory_tile_host_upload_and_delete() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("local.tif");
    std::fs::write(&source, b"tif").unwrap();

    let host = DirectoryTileHost::new(
        dir.path(),
        TileHostCredentials {
            username: "nightlight".to_string(),
            token: "pk.abc".to_string(),
        },
    );

    let tileset = host
        .upload(&source, "Monthly-UkraineAnd_2021-1-1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tileset.tileset_id, "nightlight.Monthly-UkraineAnd_2021-1-1");
    assert_eq!(tileset.url, "tiles://nightlight.Monthly-UkraineAnd_2021-1-1");

    let published = dir
        .path()
        .join("tilesets")
        .join("nightlight.Monthly-UkraineAnd_2021-1-1.tif");
    assert!(published.exists());

    host.delete("Monthly-UkraineAnd_2021-1-1").await.unwrap();
    assert!(!published.exists());
    host.delete("Monthly-UkraineAnd_2021-1-1").await.unwrap();
}

#[tokio::test]
async fn test_json_catalog_filters() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("catalog.json");

    let mut daily = map(3);
    daily.map_type = MapType::Daily;
    let maps = vec![map(1).with_url("https://eog/1.tif"), daily, map(2)];
    std::fs::write(&path, serde_json::to_vec(&maps).unwrap()).unwrap();

    let catalog = JsonCatalog::new(&path, MapProvider::Eogdata);
    let listed = catalog
        .list_available(Bounds::UkraineAndAround, MapType::Monthly)
        .await
        .unwrap();

    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].source.url, "https://eog/1.tif");
    assert_eq!(listed[1], map(2));
}

#[tokio::test]
async fn test_json_catalog_missing_file() {
    let dir = TempDir::new().unwrap();
    let catalog = JsonCatalog::new(dir.path().join("missing.json"), MapProvider::Eogdata);

    let err = catalog
        .list_available(Bounds::UkraineAndAround, MapType::Monthly)
        .await
        .unwrap_err();
    assert!(matches!(err, NightlightError::StoreUnavailable { .. }));
}
