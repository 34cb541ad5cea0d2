use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const MOCK_FILE_TXT: &str = "mock_file.txt";
const MOCK_FILE_JPEG: &str = "mock-img.jpeg";

/// Directory holding the static fixtures handed out by file generators.
pub fn assets_root() -> &'static Path {
    static ROOT: OnceLock<PathBuf> = OnceLock::new();
    ROOT.get_or_init(|| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets"))
}

pub fn mock_file_txt() -> PathBuf {
    assets_root().join(MOCK_FILE_TXT)
}

pub fn mock_file_jpeg() -> PathBuf {
    assets_root().join(MOCK_FILE_JPEG)
}
