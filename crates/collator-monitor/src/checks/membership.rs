use std::fmt;

use crate::chain::CollatorSnapshot;
use crate::registry::AddressRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollatorLocation {
    Invulnerable,
    Candidate,
}

impl fmt::Display for CollatorLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invulnerable => write!(f, "Invulnerables"),
            Self::Candidate => write!(f, "Candidates"),
        }
    }
}

/// Where an operator stands on one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Membership {
    Invulnerable(String),
    Candidate(String),
    /// Registered, but in neither collator list.
    Inactive(String),
    NotRegistered,
}

impl Membership {
    pub fn found(&self) -> bool {
        self.location().is_some()
    }

    pub fn location(&self) -> Option<CollatorLocation> {
        match self {
            Self::Invulnerable(_) => Some(CollatorLocation::Invulnerable),
            Self::Candidate(_) => Some(CollatorLocation::Candidate),
            Self::Inactive(_) | Self::NotRegistered => None,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Self::Invulnerable(address) | Self::Candidate(address) | Self::Inactive(address) => {
                Some(address)
            }
            Self::NotRegistered => None,
        }
    }
}

/// First registry address whose name contains `target`, ignoring case.
///
/// Registry order decides ties; an exact name match later in the registry
/// does not win over an earlier substring match.
pub fn find_operator_address<'a>(registry: &'a AddressRegistry, target: &str) -> Option<&'a str> {
    let needle = target.to_lowercase();
    registry
        .iter()
        .find(|(_, name)| name.to_lowercase().contains(&needle))
        .map(|(address, _)| address)
}

pub fn check_collator(
    target: &str,
    snapshot: &CollatorSnapshot,
    registry: &AddressRegistry,
) -> Membership {
    let Some(address) = find_operator_address(registry, target) else {
        return Membership::NotRegistered;
    };

    if snapshot.is_invulnerable(address) {
        Membership::Invulnerable(address.to_string())
    } else if snapshot.is_candidate(address) {
        Membership::Candidate(address.to_string())
    } else {
        Membership::Inactive(address.to_string())
    }
}
