use std::{
    fs,
    io::{Read, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client;

/// The two ONNX models the pipeline depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    HandLandmarker,
    FaceMesh,
}

impl ModelKind {
    pub fn label(&self) -> &'static str {
        match self {
            ModelKind::HandLandmarker => "hand landmark",
            ModelKind::FaceMesh => "face mesh",
        }
    }

    fn filename(&self) -> &'static str {
        match self {
            ModelKind::HandLandmarker => "handpose_estimation_mediapipe_2023feb.onnx",
            ModelKind::FaceMesh => "facemesh_2023mar.onnx",
        }
    }

    fn url(&self) -> &'static str {
        match self {
            ModelKind::HandLandmarker => {
                "https://raw.githubusercontent.com/gesturelink/models/refs/heads/main/handpose_estimation_mediapipe_2023feb.onnx"
            }
            ModelKind::FaceMesh => {
                "https://raw.githubusercontent.com/gesturelink/models/refs/heads/main/facemesh_2023mar.onnx"
            }
        }
    }

    pub fn default_path(&self) -> PathBuf {
        PathBuf::from("models").join(self.filename())
    }
}

/// Download the model on first run; cached copies are used as-is.
pub fn ensure_model_ready(kind: ModelKind, path: &Path) -> Result<()> {
    if path.exists() {
        log::debug!("{} model already present at {}", kind.label(), path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create model directory {}", parent.display()))?;
    }

    download_to_path(kind, path)
}

fn download_to_path(kind: ModelKind, dest: &Path) -> Result<()> {
    log::info!(
        "downloading {} model from {} to {}",
        kind.label(),
        kind.url(),
        dest.display()
    );

    let client = Client::new();
    let mut response = client
        .get(kind.url())
        .send()
        .context("failed to start model download")?
        .error_for_status()
        .context("model download returned error status")?;

    let progress = create_progress_bar(response.content_length());

    // Download to a temp name and rename, so an interrupted fetch never
    // leaves a half-written model behind.
    let tmp_path = dest.with_extension("download");
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;

    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; 16 * 1024];
    loop {
        let bytes_read = response
            .read(&mut buffer)
            .context("failed while reading model bytes")?;
        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .context("failed while writing model to disk")?;
        downloaded += bytes_read as u64;
        progress.set_position(downloaded);
    }

    file.sync_all()
        .context("failed to flush downloaded model to disk")?;
    fs::rename(&tmp_path, dest).with_context(|| {
        format!(
            "failed to move temp model {} into place at {}",
            tmp_path.display(),
            dest.display()
        )
    })?;

    progress.finish_with_message(format!("{} model ready", kind.label()));
    Ok(())
}

fn create_progress_bar(total_size: Option<u64>) -> ProgressBar {
    match total_size {
        Some(total) if total > 0 => {
            let pb = ProgressBar::new(total);
            let style = ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})",
            )
            .unwrap()
            .progress_chars("=>-");
            pb.set_style(style);
            pb
        }
        _ => {
            let pb = ProgressBar::new_spinner();
            let style =
                ProgressStyle::with_template("{spinner:.green} downloading model {msg}").unwrap();
            pb.set_style(style);
            pb.enable_steady_tick(Duration::from_millis(100));
            pb
        }
    }
}
