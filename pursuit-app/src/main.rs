mod app;
mod host;
mod media;

use std::path::Path;

use anyhow::Result;
use app::{App, AppConfig};
use pursuit_trial::TrialParams;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load(Path::new(&path))?,
        None => {
            info!("no config file given; running the built-in demo trial");
            demo_config()
        }
    };

    App::new(config)?.run()
}

fn demo_config() -> AppConfig {
    let mut trial = TrialParams::new(vec!["pursuit_demo.mp4".into()], 960, 540);
    trial.stop = Some(5.0);
    trial.prompt = Some("Click the cross to begin".into());
    AppConfig {
        trial,
        media_duration_secs: 8.0,
        font_path: None,
        output_path: "trial_result.json".into(),
    }
}
