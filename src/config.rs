//! 展开配置：从 TOML 文件读取默认设置，并与命令行参数合并。
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::net::Net;
use crate::unfold::UnfoldSettings;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct UnfoldConfig {
    /// Largest local configuration to unfold; 0 or absent means unbounded.
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Name of the transition that ends a focused run.
    #[serde(default)]
    pub stop_transition: Option<String>,
    #[serde(default)]
    pub max_events: Option<usize>,
}

impl UnfoldConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: UnfoldConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    /// Values set in `other` win over the ones in `self`.
    pub fn merge(mut self, other: UnfoldConfig) -> Self {
        if other.max_depth.is_some() {
            self.max_depth = other.max_depth;
        }
        if other.stop_transition.is_some() {
            self.stop_transition = other.stop_transition;
        }
        if other.max_events.is_some() {
            self.max_events = other.max_events;
        }
        self
    }

    /// Resolves transition names against `net`.
    pub fn resolve(&self, net: &Net) -> Result<UnfoldSettings> {
        let stop_transition = match &self.stop_transition {
            Some(name) => match net.transition_by_name(name) {
                Some(id) => Some(id),
                None => bail!("stop transition `{}` does not exist in the net", name),
            },
            None => None,
        };
        Ok(UnfoldSettings {
            max_depth: self.max_depth.filter(|d| *d > 0),
            stop_transition,
            max_events: self.max_events,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{Place, Transition};

    #[test]
    fn missing_file_gives_defaults() {
        let config = UnfoldConfig::load_from_file("/nonexistent/unfold.toml").unwrap();
        assert_eq!(config, UnfoldConfig::default());
    }

    #[test]
    fn parses_and_merges_overrides() {
        let file: UnfoldConfig =
            toml::from_str("max_depth = 4\nstop_transition = \"t\"\n").unwrap();
        let cli = UnfoldConfig {
            max_depth: Some(9),
            ..UnfoldConfig::default()
        };
        let merged = file.merge(cli);
        assert_eq!(merged.max_depth, Some(9));
        assert_eq!(merged.stop_transition.as_deref(), Some("t"));
        assert_eq!(merged.max_events, None);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<UnfoldConfig>("depth = 3").is_err());
    }

    #[test]
    fn resolve_checks_transition_names() {
        let mut net = Net::empty();
        net.add_place(Place::new("p", 1)).unwrap();
        let t = net.add_transition(Transition::new("t")).unwrap();

        let ok = UnfoldConfig {
            max_depth: Some(0),
            stop_transition: Some("t".into()),
            max_events: Some(10),
        }
        .resolve(&net)
        .unwrap();
        assert_eq!(ok.stop_transition, Some(t));
        assert_eq!(ok.max_depth, None);

        let missing = UnfoldConfig {
            stop_transition: Some("nope".into()),
            ..UnfoldConfig::default()
        };
        assert!(missing.resolve(&net).is_err());
    }
}
