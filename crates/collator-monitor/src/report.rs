//! Console rendering of per-chain results and the end-of-run summary.

use crate::aggregator::RunReport;
use crate::chain::{ss58, CollatorSnapshot};
use crate::checks::Membership;
use crate::config::ChainDescriptor;
use crate::console::Console;
use crate::registry::AddressRegistry;

const UNKNOWN_NAME: &str = "UNKNOWN";

pub fn print_chain_header(chain: &ChainDescriptor) {
    Console::rule();
    Console::progress(&format!("Checking {}", chain.name));
    Console::info("RPC", &chain.rpc_url);
    Console::rule();
}

pub fn print_snapshot(chain: &ChainDescriptor, snapshot: &CollatorSnapshot, registry: &AddressRegistry) {
    Console::title(&format!(
        "Invulnerable Collators ({})",
        snapshot.invulnerables.len()
    ));
    for address in &snapshot.invulnerables {
        Console::item(&listing_line(address, registry));
    }

    Console::title(&format!("Candidate Collators ({})", snapshot.candidates.len()));
    for address in &snapshot.candidates {
        let line = listing_line(address, registry);
        match snapshot.deposit_of(address) {
            Some(deposit) => Console::item(&format!(
                "{line} deposit {}",
                format_balance(deposit, chain.token_decimals, &chain.token_symbol)
            )),
            None => Console::item(&line),
        }
    }
}

pub fn print_membership(target: &str, membership: &Membership) {
    match membership {
        Membership::Invulnerable(address) | Membership::Candidate(address) => {
            let location = membership
                .location()
                .map(|l| l.to_string())
                .unwrap_or_default();
            Console::success(&format!("{target} found in {location} (address: {address})"));
        }
        Membership::Inactive(address) => Console::user_error(&format!(
            "{target} not currently in collator list (address: {address})"
        )),
        Membership::NotRegistered => {
            Console::user_error(&format!("{target} not found in collator registry"))
        }
    }
}

pub fn print_unknown(chain: &ChainDescriptor, unknown: &[String]) {
    if unknown.is_empty() {
        return;
    }
    Console::warning("Unknown Collators Detected:");
    for address in unknown {
        Console::item(address);
    }
    Console::title(&format!(
        "Tip: add these to {}",
        chain.registry_file.display()
    ));
}

pub fn print_summary(report: &RunReport) {
    Console::section("SUMMARY");
    Console::info("Chains checked", &report.chains_checked.to_string());
    Console::info("Operators found", &report.found.len().to_string());

    if !report.has_missing() && report.errors.is_empty() {
        Console::success("All tracked collators present, no chain errors");
        return;
    }

    for (operator, records) in &report.missing {
        Console::user_error(&format!("{operator} missing on {} chain(s):", records.len()));
        for record in records {
            Console::item(&format!("{} ({})", record.chain_name, record.rpc_url));
        }
    }

    if !report.errors.is_empty() {
        Console::warning(&format!("{} chain(s) failed:", report.errors.len()));
        for error in &report.errors {
            Console::item(&format!(
                "{} ({}): {}",
                error.chain_name, error.rpc_url, error.error_message
            ));
        }
    }
}

fn listing_line(address: &str, registry: &AddressRegistry) -> String {
    format!(
        "{} ({})",
        ss58::shorten(address),
        registry.name_of(address).unwrap_or(UNKNOWN_NAME)
    )
}

/// Renders an amount in the chain's smallest unit as whole tokens.
pub fn format_balance(amount: u128, decimals: u8, symbol: &str) -> String {
    let Some(unit) = 10u128.checked_pow(u32::from(decimals)) else {
        return format!("{amount} (10^-{decimals} {symbol})");
    };
    let whole = amount / unit;
    let fraction = amount % unit;
    if fraction == 0 {
        return format!("{whole} {symbol}");
    }
    let digits = format!("{fraction:0width$}", width = usize::from(decimals));
    format!("{whole}.{} {symbol}", digits.trim_end_matches('0'))
}
