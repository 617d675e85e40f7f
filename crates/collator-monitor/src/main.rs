use anyhow::Context as _;
use clap::Parser;
use log::error;
use std::any::Any;
use std::panic;

use collator_monitor::{setup_logging, Cli};

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli).context("failed to initialize logging")?;

    panic::set_hook(Box::new(|info| {
        let message = panic_message(info.payload());
        match info.location() {
            Some(location) => error!("collator-monitor panicked at {location}: {message}"),
            None => error!("collator-monitor panicked: {message}"),
        }
    }));

    cli.run().await
}
