// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Named, durably stored files associated with tasks.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use playtally_core::task::TaskUid;

const INPUT_ARTIFACT_SUFFIX: &str = "_input.csv";

const OUTPUT_ARTIFACT_SUFFIX: &str = "_output.csv";

const PARTIAL_OUTPUT_ARTIFACT_SUFFIX: &str = "_output.csv.part";

/// Maps task identities to artifact locations on durable storage.
///
/// The naming convention `{task_uid}_input.csv` / `{task_uid}_output.csv`
/// is a compatibility contract. The output artifact only ever appears
/// under its final name once it has been completely written: writers
/// stage it under the `.part` name and rename it on finalization, so
/// the existence of the output artifact implies completion of the
/// task. Artifacts are retained indefinitely.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    uploads_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let uploads_dir = uploads_dir.into();
        fs::create_dir_all(&uploads_dir)?;
        Ok(Self { uploads_dir })
    }

    #[must_use]
    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    #[must_use]
    pub fn input_path(&self, task_uid: &TaskUid) -> PathBuf {
        self.uploads_dir
            .join(format!("{task_uid}{INPUT_ARTIFACT_SUFFIX}"))
    }

    #[must_use]
    pub fn output_path(&self, task_uid: &TaskUid) -> PathBuf {
        self.uploads_dir
            .join(format!("{task_uid}{OUTPUT_ARTIFACT_SUFFIX}"))
    }

    #[must_use]
    pub fn partial_output_path(&self, task_uid: &TaskUid) -> PathBuf {
        self.uploads_dir
            .join(format!("{task_uid}{PARTIAL_OUTPUT_ARTIFACT_SUFFIX}"))
    }

    #[must_use]
    pub fn has_input(&self, task_uid: &TaskUid) -> bool {
        self.input_path(task_uid).exists()
    }

    #[must_use]
    pub fn has_output(&self, task_uid: &TaskUid) -> bool {
        self.output_path(task_uid).exists()
    }

    /// Atomically publish the partially written output artifact under
    /// its final, contractual name.
    pub fn finalize_output(&self, task_uid: &TaskUid) -> io::Result<PathBuf> {
        let output_path = self.output_path(task_uid);
        fs::rename(self.partial_output_path(task_uid), &output_path)?;
        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_naming_convention() -> anyhow::Result<()> {
        let uploads_dir = tempfile::tempdir()?;
        let artifacts = ArtifactStore::new(uploads_dir.path())?;
        let task_uid = TaskUid::random();

        assert_eq!(
            uploads_dir.path().join(format!("{task_uid}_input.csv")),
            artifacts.input_path(&task_uid)
        );
        assert_eq!(
            uploads_dir.path().join(format!("{task_uid}_output.csv")),
            artifacts.output_path(&task_uid)
        );
        Ok(())
    }

    #[test]
    fn creates_missing_uploads_dir() -> anyhow::Result<()> {
        let parent_dir = tempfile::tempdir()?;
        let uploads_dir = parent_dir.path().join("uploads");

        let artifacts = ArtifactStore::new(&uploads_dir)?;

        assert!(uploads_dir.is_dir());
        assert_eq!(uploads_dir, artifacts.uploads_dir());
        Ok(())
    }

    #[test]
    fn finalize_output_renames_partial_artifact() -> anyhow::Result<()> {
        let uploads_dir = tempfile::tempdir()?;
        let artifacts = ArtifactStore::new(uploads_dir.path())?;
        let task_uid = TaskUid::random();

        std::fs::write(artifacts.partial_output_path(&task_uid), "contents")?;
        assert!(!artifacts.has_output(&task_uid));

        let output_path = artifacts.finalize_output(&task_uid)?;

        assert!(artifacts.has_output(&task_uid));
        assert!(!artifacts.partial_output_path(&task_uid).exists());
        assert_eq!("contents", std::fs::read_to_string(output_path)?);
        Ok(())
    }
}
