use log::{error, info, warn};

const BANNER_WIDTH: usize = 50;

/// Glyph-prefixed status lines routed through the logger, so they reach the
/// log file and, unless quiet, the terminal.
pub struct Console;

impl Console {
    pub fn section(title: &str) {
        info!("{}", centered(&format!(" {title} ")));
    }

    pub fn rule() {
        info!("{}", "=".repeat(BANNER_WIDTH));
    }

    pub fn title(text: &str) {
        info!("{text}");
    }

    pub fn info(label: &str, value: &str) {
        info!("{label}: {value}");
    }

    pub fn item(text: &str) {
        info!("  {text}");
    }

    pub fn success(text: &str) {
        info!("✓ {text}");
    }

    pub fn warning(text: &str) {
        warn!("⚠ {text}");
    }

    pub fn user_error(text: &str) {
        error!("✗ {text}");
    }

    pub fn progress(text: &str) {
        info!("→ {text}");
    }
}

fn centered(text: &str) -> String {
    let len = text.chars().count();
    if len >= BANNER_WIDTH {
        return text.to_string();
    }
    let padding = BANNER_WIDTH - len;
    let left = padding / 2;
    format!("{}{text}{}", "=".repeat(left), "=".repeat(padding - left))
}
