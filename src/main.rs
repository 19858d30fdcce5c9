use std::process;

use anyhow::{bail, Context, Result};

use letter_shuffle::{app::App, config::AppConfig};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const USAGE: &str = "letter-shuffle [--config <file>] [WIDTHxHEIGHT]";

fn run() -> Result<()> {
    env_logger::init();

    let mut config_path: Option<String> = None;
    let mut dims: Option<(u16, u16)> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(args.next().context(USAGE)?);
            }
            flag if flag.starts_with('-') => bail!(
                "Letter Shuffle — animated letter-grid toy\n\nUsage:\n  {USAGE}"
            ),
            size => {
                if dims.is_some() {
                    bail!("Unexpected argument {size:?}\n\nUsage:\n  {USAGE}");
                }
                dims = Some(parse_dims(size)?);
            }
        }
    }

    let config = match config_path {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };
    let (width, height) = dims.unwrap_or((6, 4));

    App::new(config, width, height).run()
}

/// Parse `WIDTHxHEIGHT` such as `6x4`. Zero is rejected here so the app
/// never starts with an empty grid.
fn parse_dims(s: &str) -> Result<(u16, u16)> {
    let (w, h) = s
        .split_once('x')
        .with_context(|| format!("Expected WIDTHxHEIGHT, got {s:?}"))?;
    let width: u16 = w
        .parse()
        .with_context(|| format!("Invalid width {w:?}"))?;
    let height: u16 = h
        .parse()
        .with_context(|| format!("Invalid height {h:?}"))?;
    if width == 0 || height == 0 {
        bail!("Dimensions must be positive, got {s}");
    }
    Ok((width, height))
}
