use std::fs::OpenOptions;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use seismodens::config::Config;
use seismodens::host::Invocation;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "seismodens")]
#[command(about = "Seismic-profile density (km/km2) of a polygon")]
struct Cmd {
    /// JSON configuration file
    #[arg(long)]
    config: PathBuf,

    /// Esri JSON polygon feature set; read from stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let config = Config::load(&cmd.config)?;
    init_logging(&config)?;

    let text = match &cmd.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("cannot read stdin")?;
            text
        }
    };

    let backend = config.build_backend();
    let out = Invocation::new().run_feature_set(&text, &backend)?;
    println!("{}", out.density);
    println!("{}", out.length);
    println!("{}", out.area);
    Ok(())
}

fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log_filter {:?}", config.log_filter))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}
