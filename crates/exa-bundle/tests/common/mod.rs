//! Shared helpers for bundle integration tests.

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

/// Pack every file of a fixture directory under `sfa-logs/` into a tar.gz at `dest`.
pub fn pack_fixture(fixture: &str, dest: &Path) {
    let dir = fixtures_dir().join(fixture);
    let file = fs::File::create(dest)
        .unwrap_or_else(|e| panic!("Failed to create archive {}: {}", dest.display(), e));
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));

    let mut entries: Vec<_> = fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("Failed to read fixture dir {}: {}", dir.display(), e))
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
}
