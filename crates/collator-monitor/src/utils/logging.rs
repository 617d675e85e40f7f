use anyhow::{Context as _, Result};
use log::{debug, LevelFilter};
use std::fs::OpenOptions;
use std::sync::Mutex;
use time::macros::format_description;
use time::OffsetDateTime;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::prelude::*;

use crate::cli::Cli;

/// UTC wall clock; the file log also carries the date.
struct UtcTimeFormatter {
    with_date: bool,
}

impl FormatTime for UtcTimeFormatter {
    fn format_time(&self, w: &mut fmt::format::Writer<'_>) -> std::fmt::Result {
        let now = OffsetDateTime::now_utc();
        let formatted = if self.with_date {
            now.format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            ))
        } else {
            now.format(format_description!("[hour]:[minute]:[second]"))
        };
        write!(w, "{}", formatted.unwrap_or_else(|_| String::from("??:??:??")))
    }
}

/// Log to `cli.log_file` and, unless `--quiet`, to the terminal.
pub fn setup_logging(cli: &Cli) -> Result<()> {
    let log_level: LevelFilter = cli
        .log_level
        .parse()
        .with_context(|| format!("invalid log level: {}", cli.log_level))?;

    let env_filter = EnvFilter::from_default_env()
        .add_directive(log_level.as_str().to_lowercase().parse()?)
        .add_directive("reqwest=warn".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("hyper_util=warn".parse()?);

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&cli.log_file)
        .with_context(|| format!("failed to open log file {}", cli.log_file.display()))?;

    let file_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(false)
        .with_timer(UtcTimeFormatter { with_date: true })
        .with_writer(Mutex::new(log_file));

    let console_layer = (!cli.quiet).then(|| {
        fmt::layer()
            .with_target(false)
            .with_level(true)
            .with_ansi(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .with_timer(UtcTimeFormatter { with_date: false })
            .compact()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("failed to install log subscriber")?;

    debug!("Logging to {}", cli.log_file.display());
    Ok(())
}
