use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Rendering of the `fileqd` event stream on stderr.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// One flattened JSON object per event, carrying connection sequence
    /// numbers and tiers as fields.
    #[default]
    Json,
    /// Terse text lines for an operator watching a terminal.
    Compact,
}

/// Error returned when `log_format` names neither `json` nor `compact`.
pub type LogFormatParseError = strum::ParseError;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("json", LogFormat::Json)]
    #[case("JSON", LogFormat::Json)]
    #[case("Compact", LogFormat::Compact)]
    fn parses_formats_case_insensitively(#[case] input: &str, #[case] expected: LogFormat) {
        assert_eq!(input.parse::<LogFormat>().expect("parse format"), expected);
    }

    #[test]
    fn displays_the_configuration_spelling() {
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }
}
