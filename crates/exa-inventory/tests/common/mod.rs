//! Shared helpers for inventory integration tests.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the path to the test fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Install a test subscriber once; `RUST_LOG` controls the output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Pack a fixture directory as a bundle archive named `file_name` inside `dir`.
pub fn pack_bundle(fixture: &str, dir: &Path, file_name: &str) -> PathBuf {
    let source = fixtures_dir().join(fixture);
    let dest = dir.join(file_name);
    let file = fs::File::create(&dest).unwrap();
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    let mut entries: Vec<PathBuf> = fs::read_dir(&source)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    entries.sort();
    for path in entries {
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        builder
            .append_path_with_name(&path, format!("sfa-logs/{name}"))
            .unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap();
    dest
}
