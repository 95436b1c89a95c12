use anyhow::{Result, anyhow};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::types::Frame;

/// Discrete operator commands read from the keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Quit,
    ToggleLink,
}

/// Preview window: blits RGBA frames and reports key commands.
pub struct PreviewWindow {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl PreviewWindow {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: true,
                ..WindowOptions::default()
            },
        )
        .map_err(|err| anyhow!("failed to create preview window: {err}"))?;

        window.set_target_fps(60);

        Ok(Self {
            window,
            buffer: vec![0; width * height],
            width,
            height,
        })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn present(&mut self, frame: &Frame) -> Result<()> {
        let width = frame.width as usize;
        let height = frame.height as usize;
        if width != self.width || height != self.height {
            self.width = width;
            self.height = height;
            self.buffer.resize(width * height, 0);
        }

        for (dst, px) in self.buffer.iter_mut().zip(frame.rgba.chunks_exact(4)) {
            *dst = u32::from(px[0]) << 16 | u32::from(px[1]) << 8 | u32::from(px[2]);
        }

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|err| anyhow!("window update failed: {err}"))
    }

    pub fn poll_commands(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        for key in self.window.get_keys_pressed(KeyRepeat::No) {
            match key {
                Key::Q | Key::Escape => commands.push(Command::Quit),
                Key::S => commands.push(Command::ToggleLink),
                _ => {}
            }
        }
        commands
    }
}
