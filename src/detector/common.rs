use anyhow::{Context, Result, anyhow};
use fast_image_resize as fir;
use ndarray::Array4;
use rayon::prelude::*;
use thiserror::Error;

use crate::types::Frame;

/// Hand landmark model input side.
pub const HAND_INPUT_SIZE: u32 = 224;
/// Face mesh model input side.
pub const FACE_INPUT_SIZE: u32 = 192;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("landmark payload too short: got {got} values, need {need}")]
    Truncated { got: usize, need: usize },
}

/// Inference result in normalized [0, 1] frame coordinates.
#[derive(Clone, Debug)]
pub struct LandmarkOutput {
    pub landmarks: Vec<(f32, f32)>,
    pub confidence: f32,
}

/// How the frame was fitted into the square model input.
#[derive(Clone, Debug)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub orig_w: u32,
    pub orig_h: u32,
}

/// Letterbox the frame into a `side`×`side` RGB tensor scaled to [0, 1].
pub fn prepare_frame(frame: &Frame, side: u32) -> Result<(Array4<f32>, Letterbox)> {
    let expected_len = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.rgba.len() != expected_len {
        return Err(anyhow!(
            "frame buffer size mismatch: got {}, expected {}",
            frame.rgba.len(),
            expected_len
        ));
    }

    let scale = side as f32 / (frame.width.max(frame.height) as f32);
    let new_w = (frame.width as f32 * scale).round().max(1.0) as u32;
    let new_h = (frame.height as f32 * scale).round().max(1.0) as u32;

    let src_image = fir::images::Image::from_vec_u8(
        frame.width,
        frame.height,
        frame.rgba.clone(),
        fir::PixelType::U8x4,
    )?;
    let mut dst_image = fir::images::Image::new(new_w, new_h, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let resize_options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Interpolation(fir::FilterType::Bilinear));
    resizer
        .resize(&src_image, &mut dst_image, Some(&resize_options))
        .context("fast resize failed")?;
    let resized = dst_image.into_vec();

    // Center the resized frame on a black canvas. Alpha is dropped below,
    // so only the RGB rows need copying in.
    let pad_x = ((side as i64 - new_w as i64) / 2).max(0) as usize;
    let pad_y = ((side as i64 - new_h as i64) / 2).max(0) as usize;
    let mut canvas = vec![0u8; (side as usize) * (side as usize) * 4];
    let dst_stride = side as usize * 4;
    let src_stride = new_w as usize * 4;
    for row in 0..(new_h as usize) {
        let dst_offset = (pad_y + row) * dst_stride + pad_x * 4;
        canvas[dst_offset..dst_offset + src_stride]
            .copy_from_slice(&resized[row * src_stride..(row + 1) * src_stride]);
    }

    let normalized: Vec<f32> = canvas
        .par_chunks_exact(4)
        .flat_map_iter(|px| {
            [
                px[0] as f32 / 255.0,
                px[1] as f32 / 255.0,
                px[2] as f32 / 255.0,
            ]
        })
        .collect();
    let input = Array4::<f32>::from_shape_vec((1, side as usize, side as usize, 3), normalized)
        .map_err(|err| anyhow!("failed to build input tensor: {err}"))?;

    let letterbox = Letterbox {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
        orig_w: frame.width,
        orig_h: frame.height,
    };

    Ok((input, letterbox))
}

/// Split a flat `x, y, z` payload into `count` 2D points.
pub fn decode_landmarks(flat: &[f32], count: usize) -> Result<Vec<(f32, f32)>, DecodeError> {
    if flat.len() < count * 3 {
        return Err(DecodeError::Truncated {
            got: flat.len(),
            need: count * 3,
        });
    }
    Ok(flat
        .chunks_exact(3)
        .take(count)
        .map(|chunk| (chunk[0], chunk[1]))
        .collect())
}

/// Map model-space points back through the letterbox into normalized [0, 1]
/// frame coordinates.
pub fn normalize_landmarks(points: &[(f32, f32)], letterbox: &Letterbox) -> Vec<(f32, f32)> {
    let frame_w = letterbox.orig_w.max(1) as f32;
    let frame_h = letterbox.orig_h.max(1) as f32;
    points
        .iter()
        .map(|&(x, y)| {
            let px = (x - letterbox.pad_x) / letterbox.scale;
            let py = (y - letterbox.pad_y) / letterbox.scale;
            ((px / frame_w).clamp(0.0, 1.0), (py / frame_h).clamp(0.0, 1.0))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_short_payloads() {
        let flat = vec![0.0; 10];
        let err = decode_landmarks(&flat, 21).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { got: 10, need: 63 }));
    }

    #[test]
    fn decode_drops_z() {
        let flat = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let points = decode_landmarks(&flat, 2).unwrap();
        assert_eq!(points, vec![(1.0, 2.0), (4.0, 5.0)]);
    }

    #[test]
    fn normalize_inverts_the_letterbox() {
        // A 640×480 frame letterboxed into 224: scale 0.35, 28px top pad.
        let letterbox = Letterbox {
            scale: 0.35,
            pad_x: 0.0,
            pad_y: 28.0,
            orig_w: 640,
            orig_h: 480,
        };
        // Center of the model input maps to the center of the frame.
        let normalized = normalize_landmarks(&[(112.0, 112.0)], &letterbox);
        let (x, y) = normalized[0];
        assert!((x - 0.5).abs() < 1e-3);
        assert!((y - 0.5).abs() < 1e-3);
    }
}
