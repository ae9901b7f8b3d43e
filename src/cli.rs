use clap::Parser;
use std::path::PathBuf;

/// Remote-controlled web page: MJPEG feed out, clicks and keys in
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Page to open at startup (default: https://www.google.com)
    #[arg(value_name = "URL")]
    pub home_url: Option<String>,

    /// Interface to listen on (default: 0.0.0.0)
    #[arg(long = "host", value_name = "ADDR")]
    pub host: Option<String>,

    /// HTTP port (default: 5000)
    #[arg(short = 'p', long = "port", value_name = "PORT")]
    pub port: Option<u16>,

    /// Settings file (JSON); also read from PAGECAST_CONFIG
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Legacy high-fidelity mode: PNG frames, one per second
    #[arg(long = "legacy")]
    pub legacy: bool,

    /// Capture interval in milliseconds
    #[arg(long = "capture-ms", value_name = "MS")]
    pub capture_interval_ms: Option<u64>,

    /// JPEG quality (1-100, default: 30)
    #[arg(short = 'q', long = "quality", value_name = "Q", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub jpeg_quality: Option<u8>,

    /// Viewport size of the built-in surface
    #[arg(long = "size", value_names = ["WIDTH", "HEIGHT"], num_args = 2)]
    pub size: Option<Vec<u32>>,

    /// Write logs to a file instead of stderr (default: pagecast.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
