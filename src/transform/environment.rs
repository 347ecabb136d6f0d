//! Runtime environment classification.
//!
//! Game classes ship as one jar per physical side, and source annotations mark which
//! side a class, member or interface implementation belongs to. At load time every tag
//! is checked against the environment the process is actually running as.

use strum::{AsRefStr, Display, EnumString};

/// Descriptor of the annotation tagging a class, field or method with its environment.
pub const ENVIRONMENT_ANNOTATION: &str = "Lnet/fabricmc/api/Environment;";
/// Descriptor of the annotation tagging one implemented interface with its environment.
pub const ENVIRONMENT_INTERFACE_ANNOTATION: &str = "Lnet/fabricmc/api/EnvironmentInterface;";
/// Descriptor of the repeatable container for interface environment tags.
pub const ENVIRONMENT_INTERFACES_ANNOTATION: &str = "Lnet/fabricmc/api/EnvironmentInterfaces;";

/// The physical side a process runs as.
///
/// The enum constant names mirror the annotation values found in class metadata, so a
/// tag matches the current environment exactly when the strings compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum EnvironmentType {
    /// The game client
    Client,
    /// The dedicated server
    Server,
}

impl EnvironmentType {
    /// Returns `true` if an environment tag read from class metadata names this
    /// environment.
    #[must_use]
    pub fn matches(self, tag: &str) -> bool {
        self.as_ref() == tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn display_matches_annotation_values() {
        assert_eq!(EnvironmentType::Client.to_string(), "CLIENT");
        assert_eq!(EnvironmentType::Server.to_string(), "SERVER");
    }

    #[test]
    fn tag_matching() {
        assert!(EnvironmentType::Client.matches("CLIENT"));
        assert!(!EnvironmentType::Client.matches("SERVER"));
        assert!(!EnvironmentType::Server.matches("client"));
    }

    #[test]
    fn parses_from_tag() {
        assert_eq!(
            EnvironmentType::from_str("SERVER").unwrap(),
            EnvironmentType::Server
        );
        assert!(EnvironmentType::from_str("BOTH").is_err());
    }
}
