//! Static asset mirroring.

use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

use crate::error::PulseError;

pub const STATIC_DIR: &str = "static";

/// Replace `output_dir/static` with a copy of `templates_dir/static`.
///
/// The destination is removed first so files deleted from the source do not
/// linger. Returns `false` without touching the output when the templates
/// have no static directory.
#[instrument(level = "info", skip_all, fields(templates_dir = %templates_dir.display()))]
pub async fn copy_static(templates_dir: &Path, output_dir: &Path) -> Result<bool, PulseError> {
    let source = templates_dir.join(STATIC_DIR);
    if !fs::try_exists(&source).await? {
        debug!("No static assets to copy");
        return Ok(false);
    }

    let dest = output_dir.join(STATIC_DIR);
    if fs::try_exists(&dest).await? {
        fs::remove_dir_all(&dest).await?;
    }

    let copied = copy_tree(&source, &dest).await?;
    info!(files = copied, "Copied static assets");
    Ok(true)
}

/// Copy a directory tree, returning the number of files copied.
async fn copy_tree(source: &Path, dest: &Path) -> Result<usize, PulseError> {
    let mut pending: Vec<(PathBuf, PathBuf)> = vec![(source.to_path_buf(), dest.to_path_buf())];
    let mut copied = 0;

    while let Some((from, to)) = pending.pop() {
        fs::create_dir_all(&to).await?;
        let mut entries = fs::read_dir(&from).await?;
        while let Some(entry) = entries.next_entry().await? {
            let target = to.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                pending.push((entry.path(), target));
            } else {
                fs::copy(entry.path(), &target).await?;
                copied += 1;
            }
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;

    #[tokio::test]
    async fn test_copy_replaces_stale_files() {
        let templates = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let src_static = templates.path().join(STATIC_DIR);
        stdfs::create_dir_all(src_static.join("img")).unwrap();
        stdfs::write(src_static.join("style.css"), "body {}").unwrap();
        stdfs::write(src_static.join("img").join("logo.svg"), "<svg/>").unwrap();

        let out_static = output.path().join(STATIC_DIR);
        stdfs::create_dir_all(&out_static).unwrap();
        stdfs::write(out_static.join("stale.js"), "old").unwrap();

        assert!(copy_static(templates.path(), output.path()).await.unwrap());

        assert!(!out_static.join("stale.js").exists());
        assert_eq!(stdfs::read_to_string(out_static.join("style.css")).unwrap(), "body {}");
        assert_eq!(
            stdfs::read_to_string(out_static.join("img").join("logo.svg")).unwrap(),
            "<svg/>"
        );
    }

    #[tokio::test]
    async fn test_no_source_leaves_output_alone() {
        let templates = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let out_static = output.path().join(STATIC_DIR);
        stdfs::create_dir_all(&out_static).unwrap();
        stdfs::write(out_static.join("keep.css"), "x").unwrap();

        assert!(!copy_static(templates.path(), output.path()).await.unwrap());
        assert!(out_static.join("keep.css").exists());
    }
}
