use std::path::PathBuf;
use std::sync::OnceLock;

/// Returns the workspace root directory (the parent of the calling crate).
fn workspace_root() -> PathBuf {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Ensures the test output directory exists. Safe to call multiple times.
pub fn ensure_test_output_dir() -> PathBuf {
    static DIR: OnceLock<PathBuf> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = workspace_root().join("test_output");
        std::fs::create_dir_all(&dir).expect("Failed to create test_output directory");
        dir
    })
    .clone()
}

/// Returns a fresh, empty subdirectory of the test output directory.
///
/// Any previous contents are removed so reruns start clean.
pub fn test_output_subdir(name: &str) -> PathBuf {
    let dir = ensure_test_output_dir().join(name);
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("Failed to clear test output subdirectory");
    }
    std::fs::create_dir_all(&dir).expect("Failed to create test output subdirectory");
    dir
}

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "debug".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
