#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use folio_core::{PipelineConfig, UploadCandidate};
use folio_processing::UploadPipeline;
use folio_storage::{LocalStorage, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

pub const CATEGORY: &str = "items";

/// Pipeline over a throwaway storage root, plus a separate staging area
/// standing in for the transport layer's temp directory.
pub struct TestPipeline {
    pub root: TempDir,
    pub staging: TempDir,
    pub storage: LocalStorage,
    pub pipeline: UploadPipeline,
}

impl TestPipeline {
    /// Write `data` into the staging area and wrap it as a staged candidate.
    pub fn stage(&self, filename: &str, content_type: &str, data: &[u8]) -> UploadCandidate {
        let path = self.staging.path().join(format!("part-{}", uuid::Uuid::new_v4()));
        std::fs::write(&path, data).expect("write staged part");
        UploadCandidate::staged(filename, content_type, data.len() as u64, path)
    }

    pub fn category_dir(&self) -> PathBuf {
        self.root.path().join(CATEGORY)
    }

    pub fn stored_files(&self) -> Vec<PathBuf> {
        files_under(self.root.path())
    }
}

pub fn setup_test_pipeline() -> TestPipeline {
    setup_test_pipeline_with(PipelineConfig::default(), |local| {
        Arc::new(local) as Arc<dyn Storage>
    })
}

pub fn setup_test_pipeline_with(
    config: PipelineConfig,
    wrap: impl FnOnce(LocalStorage) -> Arc<dyn Storage>,
) -> TestPipeline {
    let root = TempDir::new().expect("storage root");
    let staging = TempDir::new().expect("staging dir");
    let storage = LocalStorage::new(root.path());
    let pipeline = UploadPipeline::new(
        config.with_storage_root(root.path()),
        wrap(storage.clone()),
    );

    TestPipeline {
        root,
        staging,
        storage,
        pipeline,
    }
}

/// Every regular file below `dir`, recursively.
pub fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path);
            }
        }
    }
    files.sort();
    files
}
