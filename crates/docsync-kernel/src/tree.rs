//! Whole-tree export and import between the virtual tree and a real directory.
//!
//! Export materializes what a checkout would see. Import feeds files back
//! through [`VfsOps::write`], so every write rule (conflict skip, identity
//! check, workspace re-parenting) applies exactly as it does for the
//! version-control engine.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::vfs::{StoreBackend, VfsError, VfsOps};

/// Tree transfer error type.
#[derive(Debug, Error)]
pub enum TreeError {
    /// Local filesystem failure.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Virtual filesystem failure.
    #[error(transparent)]
    Vfs(#[from] VfsError),
}

impl TreeError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// What an export produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Record files written.
    pub files: usize,
    /// Directories created.
    pub directories: usize,
}

/// What an import did.
#[derive(Debug, Default)]
pub struct ImportSummary {
    /// Files handed to the store, relative to the source directory.
    pub written: Vec<PathBuf>,
    /// Files that were rejected, with the reason.
    pub failed: Vec<(PathBuf, VfsError)>,
}

impl ImportSummary {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Copy the virtual tree, starting at the repository root, into `dest`.
pub async fn export_tree(fs: &dyn VfsOps, dest: &Path) -> Result<ExportSummary, TreeError> {
    let mut summary = ExportSummary::default();
    let mut pending = vec![PathBuf::new()];

    while let Some(dir) = pending.pop() {
        for entry in fs.readdir(&dir).await? {
            let virtual_path = dir.join(&entry.name);
            let local_path = dest.join(&virtual_path);

            if entry.kind.is_dir() {
                tokio::fs::create_dir_all(&local_path)
                    .await
                    .map_err(|e| TreeError::io(&local_path, e))?;
                summary.directories += 1;
                pending.push(virtual_path);
            } else {
                let data = fs.read(&virtual_path).await?;
                tokio::fs::write(&local_path, &data)
                    .await
                    .map_err(|e| TreeError::io(&local_path, e))?;
                summary.files += 1;
                tracing::trace!(path = %virtual_path.display(), bytes = data.len(), "exported");
            }
        }
    }

    tracing::info!(
        dest = %dest.display(),
        files = summary.files,
        directories = summary.directories,
        "export complete"
    );
    Ok(summary)
}

/// Write every file under `src/<sync root>` into the store.
///
/// Per-file failures are collected rather than aborting the import. A
/// missing sync root directory imports nothing.
pub async fn import_tree(fs: &StoreBackend, src: &Path) -> Result<ImportSummary, TreeError> {
    let mut summary = ImportSummary::default();
    let root = src.join(fs.paths().root());
    if !tokio::fs::try_exists(&root)
        .await
        .map_err(|e| TreeError::io(&root, e))?
    {
        tracing::warn!(path = %root.display(), "nothing to import");
        return Ok(summary);
    }

    let mut files = Vec::new();
    let mut pending = vec![root];
    while let Some(dir) = pending.pop() {
        let mut reader = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| TreeError::io(&dir, e))?;
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|e| TreeError::io(&dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| TreeError::io(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                files.push(path);
            }
        }
    }
    // Parents before children keeps the store consistent mid-import.
    files.sort_by_key(|p| import_rank(fs, src, p));

    for path in files {
        let relative = path.strip_prefix(src).unwrap_or(&path).to_path_buf();
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| TreeError::io(&path, e))?;

        match fs.write(&relative, &data).await {
            Ok(()) => summary.written.push(relative),
            Err(e) => {
                tracing::warn!(path = %relative.display(), error = %e, "import failed");
                summary.failed.push((relative, e));
            }
        }
    }

    tracing::info!(
        src = %src.display(),
        written = summary.written.len(),
        failed = summary.failed.len(),
        "import complete"
    );
    Ok(summary)
}

/// Sort key: workspaces first, then by how deeply the record type nests.
fn import_rank(fs: &StoreBackend, src: &Path, path: &Path) -> (bool, usize, PathBuf) {
    let relative = path.strip_prefix(src).unwrap_or(path);
    let record_type = fs.paths().decode(relative).record_type();
    let depth = record_type.map_or(usize::MAX, |t| t.with_nesting_ancestors().len());
    let workspace = record_type.is_some_and(|t| t.is_workspace());
    (!workspace, depth, relative.to_path_buf())
}
