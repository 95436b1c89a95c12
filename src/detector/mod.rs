mod common;
mod ort;

use std::path::Path;

use anyhow::{Result, anyhow};

use self::common::LandmarkOutput;
use self::ort::{OrtFaceEngine, OrtHandEngine};
use crate::types::{FaceSample, Frame, HAND_LANDMARK_COUNT, HandSample};

/// Fresh detections must clear this score.
const MIN_DETECTION_CONFIDENCE: f32 = 0.7;
/// A subject already being tracked is held at this lower bar.
const MIN_TRACKING_CONFIDENCE: f32 = 0.5;

/// A vision backend that turns frames into landmark sets. Any concrete
/// model can substitute behind this seam.
pub(crate) trait LandmarkEngine: Send + 'static {
    fn infer(&mut self, frame: &Frame) -> Result<LandmarkOutput>;
}

/// Acquire at the detection threshold, hold at the tracking threshold.
#[derive(Debug, Default)]
struct ConfidenceGate {
    tracking: bool,
}

impl ConfidenceGate {
    fn accept(&mut self, confidence: f32) -> bool {
        let min = if self.tracking {
            MIN_TRACKING_CONFIDENCE
        } else {
            MIN_DETECTION_CONFIDENCE
        };
        self.tracking = confidence >= min;
        self.tracking
    }
}

/// Single-hand landmark provider.
pub struct HandLandmarker {
    engine: Box<dyn LandmarkEngine>,
    gate: ConfidenceGate,
}

impl HandLandmarker {
    pub fn new(model_path: &Path) -> Result<Self> {
        let engine = OrtHandEngine::new(model_path)?;
        log::info!("hand landmark backend ready using {}", model_path.display());
        Ok(Self {
            engine: Box::new(engine),
            gate: ConfidenceGate::default(),
        })
    }

    /// Zero-or-one hand for this frame. Low confidence is "no hand
    /// present", not an error.
    pub fn detect(&mut self, frame: &Frame) -> Result<Option<HandSample>> {
        let output = self.engine.infer(frame)?;
        if !self.gate.accept(output.confidence) {
            return Ok(None);
        }

        let points: [(f32, f32); HAND_LANDMARK_COUNT] =
            output.landmarks.as_slice().try_into().map_err(|_| {
                anyhow!(
                    "hand landmark set has {} points, need {}",
                    output.landmarks.len(),
                    HAND_LANDMARK_COUNT
                )
            })?;
        Ok(Some(HandSample { points }))
    }
}

/// Single-face landmark provider.
pub struct FaceLandmarker {
    engine: Box<dyn LandmarkEngine>,
    gate: ConfidenceGate,
}

impl FaceLandmarker {
    pub fn new(model_path: &Path) -> Result<Self> {
        let engine = OrtFaceEngine::new(model_path)?;
        log::info!("face mesh backend ready using {}", model_path.display());
        Ok(Self {
            engine: Box::new(engine),
            gate: ConfidenceGate::default(),
        })
    }

    pub fn detect(&mut self, frame: &Frame) -> Result<Option<FaceSample>> {
        let output = self.engine.infer(frame)?;
        if !self.gate.accept(output.confidence) {
            return Ok(None);
        }
        Ok(Some(FaceSample {
            points: output.landmarks,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_acquires_high_then_holds_low() {
        let mut gate = ConfidenceGate::default();

        // Below the detection bar: nothing acquired.
        assert!(!gate.accept(0.6));
        // Acquired, then held through a dip to the tracking bar.
        assert!(gate.accept(0.8));
        assert!(gate.accept(0.55));
        // Falling under the tracking bar drops the subject entirely.
        assert!(!gate.accept(0.4));
        // Re-acquisition needs the full detection bar again.
        assert!(!gate.accept(0.6));
        assert!(gate.accept(0.75));
    }
}
