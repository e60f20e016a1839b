use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "event-counter")]
#[command(about = "In-memory view/click counter with periodic snapshots")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    // Max stats requests per window
    #[arg(long, default_value_t = 2)]
    pub rate_num: usize,

    // Stats rate limit window in seconds
    #[arg(long, default_value_t = 30)]
    pub rate_time: u64,

    // Seconds between snapshot writes
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub snapshot_interval: u64,

    // File the latest snapshot is written to
    #[arg(short, long, default_value = "output.json")]
    pub output: PathBuf,

    // Chance that a view is followed by a click
    #[arg(long, default_value_t = 0.5, value_parser = parse_probability)]
    pub click_probability: f64,

    // Upper bound of the simulated processing delay, in milliseconds
    #[arg(long, default_value_t = 50)]
    pub max_latency_ms: u64,
}

impl Args {
    pub fn rate_time(&self) -> Duration {
        Duration::from_secs(self.rate_time)
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval)
    }

    pub fn max_latency(&self) -> Duration {
        Duration::from_millis(self.max_latency_ms)
    }
}

fn parse_probability(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{raw} is not a number: {e}"))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is outside [0, 1]"))
    }
}
