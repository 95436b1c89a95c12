use std::{io::Write, thread, time::Duration};

use serialport::SerialPort;
use thiserror::Error;

use crate::protocol::OutboundMessage;

/// Bound on a single blocking write.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);
/// Opening the port resets most microcontrollers; give the firmware time to boot.
const RESET_GRACE: Duration = Duration::from_secs(2);
/// Let the neutral record drain before the port closes.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("failed to open {path} at {baud} baud: {source}")]
    Open {
        path: String,
        baud: u32,
        #[source]
        source: serialport::Error,
    },
    #[error("serial write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Serial connection to the LED controller.
///
/// Dropping the link writes the neutral all-off record first, so the LEDs
/// are cleared on every exit path.
pub struct SerialLink {
    port: Box<dyn SerialPort>,
    path: String,
}

impl SerialLink {
    pub fn open(path: &str, baud: u32) -> Result<Self, LinkError> {
        let port = serialport::new(path, baud)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|source| LinkError::Open {
                path: path.to_string(),
                baud,
                source,
            })?;
        thread::sleep(RESET_GRACE);
        log::info!("serial link open on {path} at {baud} baud");

        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    pub fn send(&mut self, message: &OutboundMessage) -> Result<(), LinkError> {
        self.port.write_all(message.encode().as_bytes())?;
        Ok(())
    }
}

impl Drop for SerialLink {
    fn drop(&mut self) {
        let neutral = OutboundMessage::neutral();
        if let Err(err) = self.port.write_all(neutral.encode().as_bytes()) {
            log::warn!("failed to reset controller on shutdown: {err}");
        }
        let _ = self.port.flush();
        thread::sleep(SHUTDOWN_GRACE);
        log::info!("serial link on {} closed", self.path);
    }
}
