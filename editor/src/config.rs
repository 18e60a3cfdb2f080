use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How `toggle_mark` resolves a selection whose runs disagree about a mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MixedSelectionPolicy {
    /// Turn the mark on everywhere unless every run already has it.
    #[default]
    ActivateUnlessUnanimous,
    /// Flip the first run's state and apply the result to every run.
    FollowFirst,
}

impl MixedSelectionPolicy {
    /// The state every selected run ends up in, given their current states.
    pub fn resolve(self, states: &[bool]) -> bool {
        match self {
            MixedSelectionPolicy::ActivateUnlessUnanimous => !states.iter().all(|on| *on),
            MixedSelectionPolicy::FollowFirst => !states.first().copied().unwrap_or(false),
        }
    }

    fn name(self) -> &'static str {
        match self {
            MixedSelectionPolicy::ActivateUnlessUnanimous => "activate-unless-unanimous",
            MixedSelectionPolicy::FollowFirst => "follow-first",
        }
    }
}

impl fmt::Display for MixedSelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MixedSelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activate-unless-unanimous" => Ok(MixedSelectionPolicy::ActivateUnlessUnanimous),
            "follow-first" => Ok(MixedSelectionPolicy::FollowFirst),
            other => Err(format!(
                "unknown mixed-selection policy `{}` (expected activate-unless-unanimous or follow-first)",
                other
            )),
        }
    }
}

/// Session settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub mixed_selection: MixedSelectionPolicy,
    /// Keep a snapshot log for undo/redo.
    pub history: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            mixed_selection: MixedSelectionPolicy::default(),
            history: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policies_resolve_mixed_states() {
        let mixed = [false, true, true];
        assert!(MixedSelectionPolicy::ActivateUnlessUnanimous.resolve(&mixed));
        assert!(MixedSelectionPolicy::FollowFirst.resolve(&mixed));

        let mixed = [true, false];
        assert!(MixedSelectionPolicy::ActivateUnlessUnanimous.resolve(&mixed));
        assert!(!MixedSelectionPolicy::FollowFirst.resolve(&mixed));

        assert!(!MixedSelectionPolicy::ActivateUnlessUnanimous.resolve(&[true, true]));
    }

    #[test]
    fn config_from_toml() {
        let config: EditorConfig = toml::from_str("mixed_selection = \"follow-first\"").unwrap();
        assert_eq!(config.mixed_selection, MixedSelectionPolicy::FollowFirst);
        assert!(config.history);

        let config: EditorConfig = toml::from_str("history = false").unwrap();
        assert_eq!(config.mixed_selection, MixedSelectionPolicy::ActivateUnlessUnanimous);
        assert!(!config.history);
    }

    #[test]
    fn policy_names_parse() {
        for policy in [
            MixedSelectionPolicy::ActivateUnlessUnanimous,
            MixedSelectionPolicy::FollowFirst,
        ] {
            assert_eq!(policy.to_string().parse::<MixedSelectionPolicy>(), Ok(policy));
        }
        assert!("majority".parse::<MixedSelectionPolicy>().is_err());
    }
}
