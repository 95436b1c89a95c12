use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Tensor;

use super::LandmarkEngine;
use super::common::{self, FACE_INPUT_SIZE, HAND_INPUT_SIZE, LandmarkOutput};
use crate::types::{FACE_LANDMARK_COUNT, Frame, HAND_LANDMARK_COUNT};

fn build_session(model_path: &Path) -> Result<Session> {
    Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(2)?
        .commit_from_file(model_path)
        .with_context(|| format!("failed to load ORT session from {}", model_path.display()))
}

fn extract_flat(output: &ort::value::DynValue) -> Result<Vec<f32>> {
    let array = output.try_extract_array::<f32>()?;
    Ok(array.iter().copied().collect())
}

fn extract_score(output: &ort::value::DynValue) -> f32 {
    output
        .try_extract_array::<f32>()
        .ok()
        .and_then(|arr| arr.iter().next().copied())
        .unwrap_or(0.0)
}

/// MediaPipe hand landmark model: 224×224 input, 21 landmarks plus a
/// presence score in [0, 1].
pub struct OrtHandEngine {
    session: Session,
}

impl OrtHandEngine {
    pub fn new(model_path: &Path) -> Result<Self> {
        Ok(Self {
            session: build_session(model_path)?,
        })
    }
}

impl LandmarkEngine for OrtHandEngine {
    fn infer(&mut self, frame: &Frame) -> Result<LandmarkOutput> {
        let (input, letterbox) = common::prepare_frame(frame, HAND_INPUT_SIZE)?;
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("hand landmark inference failed")?;
        if outputs.len() < 2 {
            return Err(anyhow!(
                "hand model returned {} outputs, need landmarks and score",
                outputs.len()
            ));
        }

        let flat = extract_flat(&outputs[0])?;
        let raw = common::decode_landmarks(&flat, HAND_LANDMARK_COUNT)?;
        let confidence = extract_score(&outputs[1]).clamp(0.0, 1.0);

        Ok(LandmarkOutput {
            landmarks: common::normalize_landmarks(&raw, &letterbox),
            confidence,
        })
    }
}

/// MediaPipe face mesh model: 192×192 input, 468 landmarks plus a presence
/// score logit.
pub struct OrtFaceEngine {
    session: Session,
}

impl OrtFaceEngine {
    pub fn new(model_path: &Path) -> Result<Self> {
        Ok(Self {
            session: build_session(model_path)?,
        })
    }
}

impl LandmarkEngine for OrtFaceEngine {
    fn infer(&mut self, frame: &Frame) -> Result<LandmarkOutput> {
        let (input, letterbox) = common::prepare_frame(frame, FACE_INPUT_SIZE)?;
        let tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs![tensor])
            .context("face mesh inference failed")?;
        if outputs.len() < 2 {
            return Err(anyhow!(
                "face model returned {} outputs, need landmarks and score",
                outputs.len()
            ));
        }

        let flat = extract_flat(&outputs[0])?;
        let raw = common::decode_landmarks(&flat, FACE_LANDMARK_COUNT)?;
        // The face score head emits a logit.
        let confidence = sigmoid(extract_score(&outputs[1]));

        Ok(LandmarkOutput {
            landmarks: common::normalize_landmarks(&raw, &letterbox),
            confidence,
        })
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_squashes_logits() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(6.0) > 0.99);
        assert!(sigmoid(-6.0) < 0.01);
    }
}
