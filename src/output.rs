//! File naming and saving for generated documents.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Replace every character outside `[A-Za-z0-9]` with `_` and lowercase.
///
/// Accented letters are replaced, not folded: "Família" becomes "fam_lia".
pub fn sanitize_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Write `bytes` to `dir/file_name`, creating `dir` when missing.
pub fn save(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    if !dir.as_os_str().is_empty() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(file_name);
    fs::write(&path, bytes)?;
    log::info!("saved {} ({} bytes)", path.display(), bytes.len());
    Ok(path)
}
