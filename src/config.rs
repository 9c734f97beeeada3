//! Command-line configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "tonepad", about = "A four-note pad with a recorder and saved samples")]
pub struct Config {
    /// Directory holding the saved samples slot
    #[arg(long, env = "TONEPAD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Output amplitude of each tone, 0.0 to 1.0
    #[arg(long, default_value_t = 0.2)]
    pub volume: f32,
}

impl Config {
    pub fn storage_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|dir| dir.join("tonepad"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    pub fn amplitude(&self) -> f32 {
        if self.volume.is_finite() {
            self.volume.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
