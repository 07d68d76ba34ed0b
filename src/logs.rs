use std::io::{self, IsTerminal};

use anyhow::{bail, Context, Result};
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

pub fn init(level: &str) -> Result<()> {
    let level = match level {
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        _ => bail!("unknown log level '{}'", level),
    };

    let is_terminal = io::stdout().is_terminal();
    let colors = ColoredLevelConfig::new()
        .info(Color::Green)
        .debug(Color::Magenta);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            let ts = humantime::format_rfc3339_millis(std::time::SystemTime::now());
            if is_terminal {
                out.finish(format_args!(
                    "{ts} [{}] {message}",
                    colors.color(record.level())
                ))
            } else {
                out.finish(format_args!("{ts} [{}] {message}", record.level()))
            }
        })
        .level(level)
        .chain(io::stdout())
        .apply()
        .context("init logger")?;

    Ok(())
}
