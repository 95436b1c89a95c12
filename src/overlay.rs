//! Detection feedback drawn straight into the frame's RGBA buffer.

use crate::types::{FACE_KEY_POINTS, FaceSample, FingerResult, Frame, HandSample};

/// Bone list for the 21-point hand skeleton.
const CONNECTIONS: &[(usize, usize)] = &[
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 4),
    (0, 5),
    (5, 6),
    (6, 7),
    (7, 8),
    (0, 9),
    (9, 10),
    (10, 11),
    (11, 12),
    (0, 13),
    (13, 14),
    (14, 15),
    (15, 16),
    (0, 17),
    (17, 18),
    (18, 19),
    (19, 20),
    (5, 9),
    (9, 13),
    (13, 17),
];

const BONE_THICKNESS: i32 = 3;
const JOINT_RADIUS: i32 = 4;
const FACE_POINT_RADIUS: i32 = 3;

const BONE_COLOR: [u8; 4] = [56, 189, 248, 255];
const JOINT_COLOR: [u8; 4] = [248, 113, 113, 255];
const FACE_POINT_COLOR: [u8; 4] = [74, 222, 128, 255];
const TILE_OPEN: [u8; 4] = [34, 197, 94, 255];
const TILE_CLOSED: [u8; 4] = [63, 63, 70, 255];
const FACE_PRESENT: [u8; 4] = [34, 197, 94, 255];
const FACE_ABSENT: [u8; 4] = [239, 68, 68, 255];
const NOD_FLASH: [u8; 4] = [250, 204, 21, 255];

const TILE_SIDE: i32 = 16;
const TILE_STEP: i32 = 22;
const MARGIN: i32 = 12;

pub fn draw(
    frame: &mut Frame,
    hand: Option<&HandSample>,
    face: Option<&FaceSample>,
    fingers: &FingerResult,
    nod: bool,
) {
    let width = frame.width;
    let height = frame.height;
    let buffer = frame.rgba.as_mut_slice();

    if let Some(hand) = hand {
        draw_hand(buffer, width, height, hand);
    }
    if let Some(face) = face {
        draw_face_points(buffer, width, height, face);
    }
    draw_status(buffer, width, height, fingers, face.is_some(), nod);
}

fn to_pixel(point: (f32, f32), width: u32, height: u32) -> (i32, i32) {
    (
        (point.0 * width.saturating_sub(1) as f32) as i32,
        (point.1 * height.saturating_sub(1) as f32) as i32,
    )
}

fn draw_hand(buffer: &mut [u8], width: u32, height: u32, hand: &HandSample) {
    for &(a, b) in CONNECTIONS {
        let pa = to_pixel(hand.points[a], width, height);
        let pb = to_pixel(hand.points[b], width, height);
        draw_line(buffer, width, height, pa, pb, BONE_COLOR, BONE_THICKNESS);
    }
    for &point in hand.points.iter() {
        let center = to_pixel(point, width, height);
        draw_circle(buffer, width, height, center, JOINT_RADIUS, JOINT_COLOR);
    }
}

fn draw_face_points(buffer: &mut [u8], width: u32, height: u32, face: &FaceSample) {
    for &index in FACE_KEY_POINTS.iter() {
        let Some(&point) = face.points.get(index) else {
            continue;
        };
        let center = to_pixel(point, width, height);
        draw_circle(
            buffer,
            width,
            height,
            center,
            FACE_POINT_RADIUS,
            FACE_POINT_COLOR,
        );
    }
}

// Bottom-left: one tile per finger. Top-left: face presence, plus a flash
// tile while a nod is being reported.
fn draw_status(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    fingers: &FingerResult,
    face_present: bool,
    nod: bool,
) {
    let base_y = height as i32 - MARGIN - TILE_SIDE;
    for (i, &open) in fingers.open.iter().enumerate() {
        let color = if open { TILE_OPEN } else { TILE_CLOSED };
        fill_rect(
            buffer,
            width,
            height,
            MARGIN + i as i32 * TILE_STEP,
            base_y,
            TILE_SIDE,
            TILE_SIDE,
            color,
        );
    }

    let face_color = if face_present {
        FACE_PRESENT
    } else {
        FACE_ABSENT
    };
    fill_rect(
        buffer, width, height, MARGIN, MARGIN, TILE_SIDE, TILE_SIDE, face_color,
    );
    if nod {
        fill_rect(
            buffer,
            width,
            height,
            MARGIN + TILE_STEP,
            MARGIN,
            TILE_SIDE,
            TILE_SIDE,
            NOD_FLASH,
        );
    }
}

fn fill_rect(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    color: [u8; 4],
) {
    for dy in 0..h {
        for dx in 0..w {
            put_pixel_safe(buffer, width, height, x + dx, y + dy, color);
        }
    }
}

fn draw_line(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    p0: (i32, i32),
    p1: (i32, i32),
    color: [u8; 4],
    thickness: i32,
) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = (thickness.max(1) - 1) / 2;

    loop {
        // Square brush around the line point.
        for ox in -radius..=radius {
            for oy in -radius..=radius {
                put_pixel_safe(buffer, width, height, x0 + ox, y0 + oy, color);
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

fn draw_circle(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    center: (i32, i32),
    radius: i32,
    color: [u8; 4],
) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel_safe(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

fn put_pixel_safe(buffer: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux >= width || uy >= height {
        return;
    }
    let idx = ((uy * width + ux) as usize) * 4;
    if idx + 3 < buffer.len() {
        buffer[idx..idx + 4].copy_from_slice(&color);
    }
}
