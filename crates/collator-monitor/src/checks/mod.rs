mod membership;
mod unknown;

pub use membership::{check_collator, find_operator_address, CollatorLocation, Membership};
pub use unknown::detect_unknown;
