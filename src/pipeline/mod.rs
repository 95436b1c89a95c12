pub mod camera;
pub mod rgba_converter;

pub use camera::{CameraDevice, CameraStream, available_cameras, start_camera_stream};
