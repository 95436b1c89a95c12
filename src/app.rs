use anyhow::{Result, anyhow};
use crossbeam_channel::bounded;

use crate::{
    args::Args,
    detector::{FaceLandmarker, HandLandmarker},
    fingers,
    link::SerialLink,
    model_download::{ModelKind, ensure_model_ready},
    nod::NodDetector,
    overlay, pipeline,
    protocol::EmissionGate,
    types::FingerResult,
    window::{Command, PreviewWindow},
};

const WINDOW_TITLE: &str = "gesture-link";

pub fn run(args: Args) -> Result<()> {
    if args.list {
        return list_cameras();
    }

    // The link opens first: everything after this point is covered by its
    // reset-on-drop, so the LEDs go dark however the run ends.
    let mut link = match SerialLink::open(&args.port, args.baud) {
        Ok(link) => Some(link),
        Err(err) => {
            log::warn!("continuing without serial output: {err}");
            None
        }
    };
    let mut link_enabled = !args.no_link;

    let hand_model = ModelKind::HandLandmarker.default_path();
    ensure_model_ready(ModelKind::HandLandmarker, &hand_model)?;
    let face_model = ModelKind::FaceMesh.default_path();
    ensure_model_ready(ModelKind::FaceMesh, &face_model)?;

    let mut hands = HandLandmarker::new(&hand_model)?;
    let mut faces = FaceLandmarker::new(&face_model)?;

    let (frame_tx, frame_rx) = bounded(1);
    let camera = pipeline::start_camera_stream(args.cam_index, frame_tx)?;

    let mut window = PreviewWindow::new(WINDOW_TITLE, 640, 480)?;
    let mut nod_detector = NodDetector::new();
    let mut gate = EmissionGate::new();

    log::info!("press Q to quit, S to toggle the serial link");

    'frames: while window.is_open() {
        let mut frame = frame_rx
            .recv()
            .map_err(|_| anyhow!("camera stream ended"))?;

        let hand = match hands.detect(&frame) {
            Ok(hand) => hand,
            Err(err) => {
                log::warn!("hand inference failed: {err:?}");
                None
            }
        };
        let finger_result = hand
            .as_ref()
            .map(fingers::classify)
            .unwrap_or(FingerResult::closed());

        let face = match faces.detect(&frame) {
            Ok(face) => face,
            Err(err) => {
                log::warn!("face inference failed: {err:?}");
                None
            }
        };
        // The nose buffer only sees frames with a face; absence is not a sample.
        let nod = match &face {
            Some(face) => nod_detector.observe(face.nose_tip().1, frame.timestamp),
            None => false,
        };

        if link_enabled {
            if let Some(message) = gate.decide(finger_result.count, nod) {
                log::debug!(
                    "status changed: {} fingers, nod={}",
                    message.finger_count,
                    message.nod
                );
                if let Some(link) = link.as_mut() {
                    if let Err(err) = link.send(&message) {
                        log::warn!("serial write failed: {err}");
                    }
                }
            }
        }

        overlay::draw(&mut frame, hand.as_ref(), face.as_ref(), &finger_result, nod);
        window.present(&frame)?;

        for command in window.poll_commands() {
            match command {
                Command::Quit => break 'frames,
                Command::ToggleLink => {
                    link_enabled = !link_enabled;
                    log::info!(
                        "serial transmission {}",
                        if link_enabled { "enabled" } else { "disabled" }
                    );
                }
            }
        }
    }

    camera.stop();
    // Dropping the link writes the neutral record before the port closes.
    drop(link.take());
    log::info!("shut down cleanly");
    Ok(())
}

fn list_cameras() -> Result<()> {
    let cameras = pipeline::available_cameras()?;
    if cameras.is_empty() {
        println!("no cameras found");
        return Ok(());
    }
    for device in cameras {
        println!("{}: {}", device.index, device.label);
    }
    Ok(())
}
