use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Part an instance plays in the three-instance deployment.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ServiceRole {
    /// Accepts every client and spreads connections across itself and the
    /// two mirrors.
    #[default]
    Primary,
    /// Serves every connection it accepts locally.
    Mirror,
}

/// Errors encountered while parsing a [`ServiceRole`] from text.
pub type ServiceRoleParseError = strum::ParseError;
