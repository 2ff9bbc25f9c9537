use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

use scroll_spy::config::{self, OutputFormat};
use scroll_spy::replay;

/// Replays scroll spy scenarios against an in-memory host
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Replay scroll spy scenarios and print every callback invocation"
)]
struct Args {
    /// Scenario file (TOML, or JSON with a .json extension)
    scenario: PathBuf,

    /// Output format (overrides [replay] format from the config file)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

fn main() -> Result<()> {
    // Writes to /tmp/scroll-spy-debug.log at DEBUG level
    #[cfg(debug_assertions)]
    {
        use std::io::Write;

        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/scroll-spy-debug.log")?;

        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .target(env_logger::Target::Pipe(Box::new(log_file)))
            .format(|buf, record| {
                use std::time::SystemTime;
                let datetime: chrono::DateTime<chrono::Local> = SystemTime::now().into();
                writeln!(
                    buf,
                    "[{}] [{}] {}",
                    datetime.format("%Y-%m-%dT%H:%M:%S%.3f"),
                    record.level(),
                    record.args()
                )
            })
            .init();

        log::debug!("=== SCROLL-SPY DEBUG SESSION STARTED ===");
    }

    color_eyre::install()?;

    let config_result = config::load_config();
    if let Some(warning) = &config_result.warning {
        eprintln!("warning: {}", warning);
    }

    let args = Args::parse();
    let format = args.format.unwrap_or(config_result.config.replay.format);

    let scenario = replay::load_scenario(&args.scenario)?;
    let events = replay::run(&scenario, &config_result.config)?;

    let output = replay::render_events(&events, format)?;
    if !output.is_empty() {
        println!("{}", output);
    }

    #[cfg(debug_assertions)]
    log::debug!(
        "=== SCROLL-SPY DEBUG SESSION ENDED ({} events) ===",
        events.len()
    );

    Ok(())
}
