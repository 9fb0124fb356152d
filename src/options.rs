//! Command-line options of `pnc`.
//! `pnc <NET> [-o DIR] [-c FILE] [--oracle hashed|sorted] [--seed N] [--dump-model FILE]`

use std::path::PathBuf;

use anyhow::anyhow;
use clap::{Arg, ArgAction, Command, value_parser};

use crate::codegen::oracle::OracleKind;
use crate::config::PncConfig;

fn make_options_parser() -> clap::Command {
    Command::new("pnc")
        .no_binary_name(true)
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compile a Petri net into static C tables for the perpetuum runtime")
        .args_override_self(true)
        .arg(
            Arg::new("input")
                .value_name("NET")
                .help("Net description (.json, .ron, .yaml or .yml)")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Directory receiving the generated .h/.c pair")
                .default_value(".")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file; a missing file means defaults")
                .default_value("pnc.toml")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("oracle")
                .long("oracle")
                .help("How names are mapped to indices")
                .value_parser(["hashed", "sorted"]),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .help("Seed for the hashed oracle")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("dump-model")
                .long("dump-model")
                .value_name("FILE")
                .help("Also write the canonical net description to FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("no-diagnostics")
                .long("no-diagnostics")
                .help("Skip the connectivity report")
                .action(ArgAction::SetTrue),
        )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub config: PathBuf,
    pub oracle: Option<OracleKind>,
    pub seed: Option<u64>,
    pub dump_model: Option<PathBuf>,
    pub no_diagnostics: bool,
}

impl Options {
    pub fn parse_from_str(s: &str) -> anyhow::Result<Self> {
        let flags = shellwords::split(s).map_err(|err| anyhow!("{err:?} in `{s}`"))?;
        Ok(Self::parse_from_args(&flags)?)
    }

    pub fn parse_from_args(flags: &[String]) -> Result<Self, clap::Error> {
        let matches = make_options_parser().try_get_matches_from(flags.iter())?;

        let path = |id: &str| matches.get_one::<PathBuf>(id).cloned();
        let oracle = match matches.get_one::<String>("oracle").map(String::as_str) {
            Some("sorted") => Some(OracleKind::Sorted),
            Some(_) => Some(OracleKind::Hashed),
            None => None,
        };

        Ok(Options {
            input: path("input").unwrap_or_default(),
            output_dir: path("output").unwrap_or_else(|| PathBuf::from(".")),
            config: path("config").unwrap_or_else(|| PathBuf::from("pnc.toml")),
            oracle,
            seed: matches.get_one::<u64>("seed").copied(),
            dump_model: path("dump-model"),
            no_diagnostics: matches.get_flag("no-diagnostics"),
        })
    }

    /// Command-line values win over the configuration file.
    pub fn apply_to(&self, config: &mut PncConfig) {
        if let Some(oracle) = self.oracle {
            config.oracle = oracle;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.no_diagnostics {
            config.diagnostics = false;
        }
    }
}
