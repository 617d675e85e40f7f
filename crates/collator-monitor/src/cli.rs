use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use log::{error, info, warn};

use crate::alert::{AlertDispatcher, WebhookMessage};
use crate::chain::rpc::DEFAULT_RPC_TIMEOUT;
use crate::chain::SubstrateRpcClient;
use crate::config::ChainsConfig;
use crate::console::Console;
use crate::report;
use crate::Aggregator;

pub const DEFAULT_TARGET: &str = "PARANODES.IO";
const WEBHOOK_ENV: &str = "DISCORD_WEBHOOK_URL";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Chain list with `polkadot_chains` and `kusama_chains` groups
    #[arg(short = 'c', long, default_value = "system_chains_config.json")]
    pub config: PathBuf,

    /// Operator name to look for (case-insensitive substring); repeatable
    #[arg(short = 't', long = "target", default_value = DEFAULT_TARGET)]
    pub targets: Vec<String>,

    /// Alert webhook. Falls back to DISCORD_WEBHOOK_URL, then to the first
    /// `discord_webhook_url` in the chain list
    #[arg(short = 'w', long)]
    pub webhook_url: Option<String>,

    /// Send the synthetic test alert regardless of the check results
    #[arg(long, default_value = "false")]
    pub test: bool,

    /// Never send an alert
    #[arg(long, default_value = "false")]
    pub no_alert: bool,

    /// Timeout in seconds for each chain RPC request
    #[arg(long, default_value_t = DEFAULT_RPC_TIMEOUT.as_secs())]
    pub rpc_timeout: u64,

    /// Log level
    #[arg(short = 'l', long, default_value = "info")]
    pub log_level: String,

    /// Log file, appended to
    #[arg(long, default_value = "collator_monitor.log")]
    pub log_file: PathBuf,

    /// Only write to the log file
    #[arg(short = 'q', long, default_value = "false")]
    pub quiet: bool,
}

impl Cli {
    /// Webhook known before the chain list is read.
    fn early_webhook_url(&self) -> Option<String> {
        self.webhook_url
            .clone()
            .or_else(|| std::env::var(WEBHOOK_ENV).ok())
            .filter(|url| !url.trim().is_empty())
    }

    pub async fn run(self) -> anyhow::Result<()> {
        Console::title(&format!(
            "Starting Collator Checks - {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));

        let early_webhook = self.early_webhook_url();
        let config = match ChainsConfig::load(&self.config) {
            Ok(config) => config,
            Err(e) => {
                Console::user_error(&format!("Failed to load chain config: {e}"));
                if let (Some(url), false) = (early_webhook.as_ref(), self.no_alert) {
                    notify_config_failure(url, &e.to_string()).await;
                }
                return Err(e).context("cannot run without a chain list");
            }
        };
        info!(
            "Loaded {} Polkadot and {} Kusama chains from {}",
            config.polkadot_chains.len(),
            config.kusama_chains.len(),
            self.config.display()
        );

        let source = SubstrateRpcClient::new(Duration::from_secs(self.rpc_timeout))
            .context("failed to build RPC client")?;
        let aggregator = Aggregator::new(Box::new(source), self.targets.clone());
        let report = aggregator.run(&config).await;
        report::print_summary(&report);

        let webhook = early_webhook.or_else(|| config.first_webhook_url().map(str::to_string));
        if self.no_alert {
            info!("Alerting disabled, skipping webhook");
        } else if let Some(url) = webhook {
            match AlertDispatcher::new(url) {
                Ok(dispatcher) => {
                    dispatcher.dispatch(&report, self.test).await;
                }
                Err(e) => error!("Failed to set up alert dispatcher: {e}"),
            }
        } else if report.has_alerts() || self.test {
            warn!("No webhook configured, alert not sent");
        }

        Console::section("ALL CHECKS COMPLETE");
        Ok(())
    }
}

async fn notify_config_failure(webhook_url: &str, error: &str) {
    let dispatcher = match AlertDispatcher::new(webhook_url.to_string()) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            error!("Failed to set up alert dispatcher: {e}");
            return;
        }
    };
    if let Err(e) = dispatcher.send(&WebhookMessage::config_failure(error)).await {
        error!("Failed to send configuration failure alert: {e}");
    }
}
