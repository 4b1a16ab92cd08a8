//! HTTP record store adapter against a static nginx serving fixture records.
//!
//! Needs docker: `cargo test -- --ignored`.

use testcontainers::core::{IntoContainerPort, Mount};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, TestcontainersError};

use gap_reconstructor::ErrorCode;
use gap_reconstructor::store::{HttpRecordStore, RecordStoreConfig};
use gap_reconstructor::tools::ReconstructionTools;
use gap_reconstructor::traits::CheckpointSource;

fn record_store_container() -> Result<(Container<GenericImage>, String), TestcontainersError> {
    let records = format!("{}/tests/fixtures/records", env!("CARGO_MANIFEST_DIR"));

    let image = GenericImage::new("nginx", "1.27-alpine")
        .with_exposed_port(80.tcp())
        .with_mount(Mount::bind_mount(records, "/usr/share/nginx/html"))
        .with_startup_timeout(std::time::Duration::from_secs(30));

    let container = image.start()?;
    let port = container.get_host_port_ipv4(80.tcp())?;
    let base_url = format!("http://127.0.0.1:{}", port);

    Ok((container, base_url))
}

fn wait_for_checkpoint(store: &HttpRecordStore, id: &str) {
    let start = std::time::Instant::now();
    while start.elapsed() < std::time::Duration::from_secs(15) {
        if store.checkpoint(id).is_ok() {
            return;
        }
        std::thread::sleep(std::time::Duration::from_millis(500));
    }
}

#[test]
#[ignore = "requires docker"]
fn http_store_resolves_checkpoints() {
    let (container, base_url) = record_store_container().expect("start record store container");
    let store = HttpRecordStore::new(RecordStoreConfig {
        base_url,
        timeout_secs: 5,
    })
    .expect("build record store client");
    wait_for_checkpoint(&store, "cp-1");

    let checkpoint = store.checkpoint("cp-1").expect("fetch cp-1");
    assert_eq!(checkpoint.odometer_km, 20_000);
    assert!(checkpoint.has_gps());

    let missing = store.checkpoint("cp-404").unwrap_err();
    assert_eq!(missing.code(), ErrorCode::NotFound);

    let history = store.vehicle_checkpoints("car-1").expect("fetch vehicle history");
    assert_eq!(history.len(), 2);

    let tools = ReconstructionTools::default();
    let gap = tools.detect_gap(&store, "cp-1", "cp-2");
    assert_eq!(gap["distance_km"], 820);
    assert_eq!(gap["has_gps"], true);

    let scan = tools.scan_gaps(&store, "car-1");
    assert_eq!(scan["gaps"].as_array().map(Vec::len), Some(1));

    drop(container);
}
