//! Tier assignment for accepted connections.

use std::fmt;

use fileq_config::{Config, ServiceRole, SocketEndpoint};

/// Handler tier a connection is assigned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Served by a local worker.
    Primary,
    /// Proxied to the first mirror.
    MirrorOne,
    /// Proxied to the second mirror.
    MirrorTwo,
}

impl Tier {
    const ROTATION: [Self; 3] = [Self::Primary, Self::MirrorOne, Self::MirrorTwo];

    /// Tier for the `sequence`th accepted connection (1-based).
    ///
    /// The first `batch` connections go to the primary, the next `batch` to
    /// mirror one and the next `batch` to mirror two. After that the tiers
    /// rotate one connection at a time, starting again at the primary.
    pub fn for_sequence(sequence: u64, batch: u64) -> Self {
        let batch = batch.max(1);
        if sequence <= batch {
            Self::Primary
        } else if sequence <= batch.saturating_mul(2) {
            Self::MirrorOne
        } else if sequence <= batch.saturating_mul(3) {
            Self::MirrorTwo
        } else {
            let offset = (sequence - batch.saturating_mul(3) - 1) % 3;
            Self::ROTATION[offset as usize]
        }
    }

    /// Index into the mirror table, or `None` for the primary.
    pub fn mirror_index(self) -> Option<usize> {
        match self {
            Self::Primary => None,
            Self::MirrorOne => Some(0),
            Self::MirrorTwo => Some(1),
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Primary => "primary",
            Self::MirrorOne => "mirror-1",
            Self::MirrorTwo => "mirror-2",
        })
    }
}

/// How an instance spreads its accepted connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionPolicy {
    /// Every connection is served locally.
    Standalone,
    /// Connections rotate between local workers and two mirrors.
    Tiered {
        /// Consecutive connections per tier before rotation starts.
        batch: u64,
        /// Mirror endpoints in tier order.
        mirrors: [SocketEndpoint; 2],
    },
}

impl DistributionPolicy {
    /// Derives the policy from the configured role.
    pub fn from_config(config: &Config) -> Self {
        match config.role() {
            ServiceRole::Mirror => Self::Standalone,
            ServiceRole::Primary => {
                let [one, two] = config.mirrors();
                Self::Tiered {
                    batch: u64::try_from(config.tier_batch).unwrap_or(u64::MAX),
                    mirrors: [one.clone(), two.clone()],
                }
            }
        }
    }

    /// Tier for the `sequence`th accepted connection.
    pub fn tier_for(&self, sequence: u64) -> Tier {
        match self {
            Self::Standalone => Tier::Primary,
            Self::Tiered { batch, .. } => Tier::for_sequence(sequence, *batch),
        }
    }

    /// Endpoint serving `tier`, if it is a mirror tier of this policy.
    pub fn mirror_endpoint(&self, tier: Tier) -> Option<&SocketEndpoint> {
        match self {
            Self::Standalone => None,
            Self::Tiered { mirrors, .. } => tier.mirror_index().map(|index| &mirrors[index]),
        }
    }
}
