//! Parsing Options.
//! `unfold [-c config] [-d depth] [-T transition] [-n events] [-m out.mci] <net>`

use clap::{Arg, Command, value_parser};
use std::error::Error;
use std::path::PathBuf;

use crate::config::UnfoldConfig;

fn make_options_parser() -> clap::Command {
    Command::new("unfold")
        .no_binary_name(true)
        .about("Builds the depth-bounded unfolding of a safe Petri net with reset arcs")
        .version("v0.1.0")
        .arg(
            Arg::new("net")
                .value_name("NET")
                .help("Net description (.json, .ron or .toml)")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("TOML file with default settings")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("depth")
                .short('d')
                .long("depth")
                .value_name("N")
                .help("Drop events whose local configuration exceeds N")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("stop")
                .short('T')
                .long("stop-transition")
                .value_name("NAME")
                .help("Stop as soon as this transition occurs"),
        )
        .arg(
            Arg::new("events")
                .short('n')
                .long("max-events")
                .value_name("N")
                .help("Stop after committing N events")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("mci")
                .short('m')
                .long("mci")
                .value_name("FILE")
                .help("Where to write the unfolding in MCI format")
                .value_parser(value_parser!(PathBuf)),
        )
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub net: PathBuf,
    pub config: Option<PathBuf>,
    pub mci: Option<PathBuf>,
    /// Settings given on the command line; they override the config file.
    pub overrides: UnfoldConfig,
}

impl Options {
    pub fn parse_from_str(s: &str) -> Result<Self, Box<dyn Error>> {
        let flags = shellwords::split(s)?;
        Self::parse_from_args(&flags)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, Box<dyn Error>> {
        let app = make_options_parser();
        let matches = app.try_get_matches_from(flags.iter())?;

        let net = matches
            .get_one::<PathBuf>("net")
            .cloned()
            .ok_or("missing net file")?;

        Ok(Options {
            net,
            config: matches.get_one::<PathBuf>("config").cloned(),
            mci: matches.get_one::<PathBuf>("mci").cloned(),
            overrides: UnfoldConfig {
                max_depth: matches.get_one::<usize>("depth").copied(),
                stop_transition: matches.get_one::<String>("stop").cloned(),
                max_events: matches.get_one::<usize>("events").copied(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_from_str() {
        let options =
            Options::parse_from_str("-d 5 -T 'fire alarm' -m out.mci nets/mutex.json").unwrap();
        assert_eq!(options.net, PathBuf::from("nets/mutex.json"));
        assert_eq!(options.mci, Some(PathBuf::from("out.mci")));
        assert_eq!(options.overrides.max_depth, Some(5));
        assert_eq!(options.overrides.stop_transition.as_deref(), Some("fire alarm"));
        assert_eq!(options.config, None);
    }

    #[test]
    fn test_parse_from_args_err() {
        let options = Options::parse_from_args(&["-d".to_owned(), "deep".to_owned(), "n.json".to_owned()]);
        assert!(options.is_err());
        assert!(Options::parse_from_args(&[]).is_err());
    }
}
