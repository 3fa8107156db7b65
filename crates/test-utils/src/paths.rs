//! Scratch locations for files written by tests.

use std::path::PathBuf;

use tempfile::TempDir;

/// A fresh directory removed when the handle is dropped.
pub fn temp_test_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("netcdf_generator_")
        .tempdir()
        .expect("cannot create scratch directory")
}

/// `dir/name`, with an `.nc` extension added when `name` has none.
pub fn netcdf_output_path(dir: &TempDir, name: &str) -> PathBuf {
    let mut path = dir.path().join(name);
    if path.extension().is_none() {
        path.set_extension("nc");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_dir_is_removed_on_drop() {
        let dir = temp_test_dir();
        let kept = dir.path().to_path_buf();
        assert!(kept.is_dir());
        assert!(kept.to_string_lossy().contains("netcdf_generator_"));

        drop(dir);
        assert!(!kept.exists());
    }

    #[test]
    fn test_extension_only_added_when_missing() {
        let dir = temp_test_dir();
        assert!(netcdf_output_path(&dir, "gbr4").ends_with("gbr4.nc"));
        assert!(netcdf_output_path(&dir, "wave.nc4").ends_with("wave.nc4"));
    }
}
