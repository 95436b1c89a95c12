use clap::Parser;

/// Hand and head-nod gesture bridge for a serial LED controller.
#[derive(Parser, Debug)]
#[command(name = "gesture-link", version, about)]
pub struct Args {
    /// Serial port the LED controller is attached to
    #[arg(long, default_value = "/dev/ttyUSB0")]
    pub port: String,

    /// Baud rate for the serial link
    #[arg(long, default_value_t = 115_200)]
    pub baud: u32,

    /// Camera index (default 0)
    #[arg(short, long, default_value_t = 0)]
    pub cam_index: u32,

    /// Start with outbound transmission disabled (toggle with S)
    #[arg(long, default_value_t = false)]
    pub no_link: bool,

    /// List available cameras and exit
    #[arg(long)]
    pub list: bool,
}
