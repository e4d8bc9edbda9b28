//! Sequential capture-upload-verify cycle over every dataset category.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::dataset;
use crate::upload::{UploadOutcome, Uploader};
use crate::verdict::{MatchMode, is_correct};

/// Result of visiting one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cycle {
    /// Category had no images; nothing was uploaded.
    Skipped,
    /// An upload was attempted and its outcome reported.
    Completed,
}

/// Simulated device walking a dataset once, one category at a time.
pub(crate) struct Simulator<U> {
    uploader: U,
    dataset: PathBuf,
    delay: Duration,
    match_mode: MatchMode,
}

impl<U: Uploader> Simulator<U> {
    pub(crate) fn new(uploader: U, dataset: PathBuf, delay: Duration, match_mode: MatchMode) -> Self {
        Self {
            uploader,
            dataset,
            delay,
            match_mode,
        }
    }

    /// Visit every category in lexicographic order.
    ///
    /// Per-category failures are logged and the run moves on; only an unreadable
    /// dataset root ends the run early.
    pub(crate) async fn run<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<()> {
        let categories = dataset::categories(&self.dataset)?;
        tracing::info!(
            dataset = %self.dataset.display(),
            categories = categories.len(),
            "device simulation started"
        );

        for category in &categories {
            match self.cycle(category, rng).await {
                Ok(Cycle::Skipped) => continue,
                Ok(Cycle::Completed) => {}
                Err(err) => tracing::error!(%category, "error processing category: {err:#}"),
            }
            tokio::time::sleep(self.delay).await;
        }

        tracing::info!("device simulation finished");
        Ok(())
    }

    async fn cycle<R: Rng + ?Sized>(&self, category: &str, rng: &mut R) -> Result<Cycle> {
        let folder = self.dataset.join(category);
        let files = dataset::files(&folder)?;

        let Some(file_name) = files.choose(rng) else {
            tracing::info!(%category, "no images found, skipping");
            return Ok(Cycle::Skipped);
        };

        let path = folder.join(file_name);
        tracing::info!("camera captured {category}/{file_name}");
        let image = std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;

        tracing::info!(bytes = image.len(), "uploading");
        match self.uploader.upload(file_name, image).await? {
            UploadOutcome::Accepted(reply) => {
                tracing::info!("detected {}", reply.class.to_uppercase());
                tracing::info!(bin = reply.bin.as_deref().unwrap_or("?"), "command {}", reply.command);
                if is_correct(self.match_mode, category, &reply.class) {
                    tracing::info!(%category, "correct prediction");
                } else {
                    tracing::warn!(%category, predicted = %reply.class, "incorrect prediction");
                }
            }
            UploadOutcome::Rejected { status, body } => {
                tracing::error!(status, "upload rejected: {body}");
            }
        }

        Ok(Cycle::Completed)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::time::Instant;

    use super::*;
    use crate::upload::SubmitReply;

    /// Records every upload and answers with the file's category prefix.
    #[derive(Default)]
    struct RecordingUploader {
        uploads: Mutex<Vec<(String, Instant)>>,
        fail_on: Option<&'static str>,
    }

    impl RecordingUploader {
        fn uploads(&self) -> Vec<(String, Instant)> {
            self.uploads.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Uploader for RecordingUploader {
        async fn upload(&self, file_name: &str, _image: Vec<u8>) -> Result<UploadOutcome> {
            self.uploads
                .lock()
                .unwrap()
                .push((file_name.to_owned(), Instant::now()));

            let class = file_name.split('-').next().unwrap_or_default().to_owned();
            if self.fail_on == Some(class.as_str()) {
                return Err(anyhow!("connection reset"));
            }
            Ok(UploadOutcome::Accepted(SubmitReply {
                class,
                command: "OPEN_GENERAL".to_owned(),
                bin: Some("General".to_owned()),
            }))
        }
    }

    fn dataset(layout: &[(&str, &[&str])]) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        for (category, files) in layout {
            let dir = root.path().join(category);
            fs::create_dir(&dir).unwrap();
            for file in *files {
                fs::write(dir.join(file), b"\xff\xd8").unwrap();
            }
        }
        root
    }

    fn simulator(uploader: RecordingUploader, root: &tempfile::TempDir) -> Simulator<RecordingUploader> {
        Simulator::new(
            uploader,
            root.path().to_path_buf(),
            Duration::from_secs(2),
            MatchMode::Exact,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn visits_each_category_once_in_order_with_delay() {
        let root = dataset(&[
            ("c", &["c-1.jpg"]),
            ("a", &["a-1.jpg", "a-2.jpg"]),
            ("b", &["b-1.jpg"]),
        ]);
        let sim = simulator(RecordingUploader::default(), &root);

        sim.run(&mut StdRng::seed_from_u64(7)).await.unwrap();

        let uploads = sim.uploader.uploads();
        let categories: Vec<_> = uploads
            .iter()
            .map(|(name, _)| name.split('-').next().unwrap())
            .collect();
        assert_eq!(categories, ["a", "b", "c"]);

        for pair in uploads.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= Duration::from_secs(2));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn empty_category_is_skipped_without_upload() {
        let root = dataset(&[("a", &["a-1.jpg"]), ("b", &[]), ("c", &["c-1.jpg"])]);
        let sim = simulator(RecordingUploader::default(), &root);

        sim.run(&mut StdRng::seed_from_u64(1)).await.unwrap();

        let names: Vec<_> = sim.uploader.uploads().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["a-1.jpg", "c-1.jpg"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_upload_does_not_stop_the_run() {
        let root = dataset(&[("a", &["a-1.jpg"]), ("b", &["b-1.jpg"]), ("c", &["c-1.jpg"])]);
        let uploader = RecordingUploader {
            fail_on: Some("b"),
            ..RecordingUploader::default()
        };
        let sim = simulator(uploader, &root);

        sim.run(&mut StdRng::seed_from_u64(3)).await.unwrap();

        let uploads = sim.uploader.uploads();
        assert_eq!(uploads.len(), 3);
        assert!(uploads[2].1 - uploads[1].1 >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn same_seed_picks_same_images() {
        let files: &[&str] = &["a-1.jpg", "a-2.jpg", "a-3.jpg", "a-4.jpg"];
        let root = dataset(&[("a", files)]);

        let first = simulator(RecordingUploader::default(), &root);
        first.run(&mut StdRng::seed_from_u64(42)).await.unwrap();
        let second = simulator(RecordingUploader::default(), &root);
        second.run(&mut StdRng::seed_from_u64(42)).await.unwrap();

        assert_eq!(first.uploader.uploads()[0].0, second.uploader.uploads()[0].0);
    }

    #[tokio::test]
    async fn unreadable_dataset_root_fails_the_run() {
        let root = tempfile::tempdir().unwrap();
        let sim = Simulator::new(
            RecordingUploader::default(),
            root.path().join("missing"),
            Duration::ZERO,
            MatchMode::Exact,
        );

        assert!(sim.run(&mut StdRng::seed_from_u64(0)).await.is_err());
        assert!(sim.uploader.uploads().is_empty());
    }
}
