//! `pagesync config` subcommands.
//!
//! Keys are addressed as `section.key`. Every change is validated against a
//! copy of the loaded file and only written when it parses and actually
//! differs from what is stored.

use std::fmt::Write as _;

use clap::Subcommand;
use pagesync::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one value
    Get {
        /// Key as section.key (e.g. network.probe_timeout_secs)
        key: String,
    },

    /// Change one value
    Set {
        /// Key as section.key (e.g. geo.disabled)
        key: String,

        /// New value; lists are comma separated
        value: String,
    },

    /// Restore one value to its built-in default
    Reset {
        /// Key as section.key
        key: String,
    },

    /// Print every setting, marking values that differ from the defaults
    List {
        /// Only this section (network, geo, endpoint, portal)
        section: Option<String>,
    },

    /// Print the configuration file location
    Path,
}

/// Outcome of an edit, as reported to the user.
#[derive(Debug, PartialEq, Eq)]
enum Edit {
    Changed { from: String, to: String },
    Unchanged(String),
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => {
            let key = lookup(&key)?;
            println!("{}", display_value(&key.get(&ConfigFile::load()?)));
        }
        ConfigCommands::Set { key, value } => {
            let key = lookup(&key)?;
            report(key, update(key, &value)?);
        }
        ConfigCommands::Reset { key } => {
            let key = lookup(&key)?;
            let default = key.get(&ConfigFile::default());
            report(key, update(key, &default)?);
        }
        ConfigCommands::List { section } => {
            print!("{}", render(&ConfigFile::load()?, section.as_deref())?);
        }
        ConfigCommands::Path => println!("{}", config_file_path().display()),
    }
    Ok(())
}

fn lookup(key: &str) -> Result<ConfigKey, CliError> {
    key.parse::<ConfigKey>().map_err(|_| {
        let known: Vec<String> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!("unknown key '{}' (known: {})", key, known.join(", ")))
    })
}

/// Load, edit and save the user's configuration file.
fn update(key: ConfigKey, value: &str) -> Result<Edit, CliError> {
    let mut config = ConfigFile::load()?;
    let edit = apply(&mut config, key, value)?;
    if matches!(edit, Edit::Changed { .. }) {
        config.save()?;
    }
    Ok(edit)
}

/// Apply `value` to a copy first so a rejected value leaves `config` as it was.
fn apply(config: &mut ConfigFile, key: ConfigKey, value: &str) -> Result<Edit, CliError> {
    let from = key.get(config);
    let mut candidate = config.clone();
    key.set(&mut candidate, value)?;

    let to = key.get(&candidate);
    if to == from {
        return Ok(Edit::Unchanged(to));
    }
    *config = candidate;
    Ok(Edit::Changed { from, to })
}

fn report(key: ConfigKey, edit: Edit) {
    match edit {
        Edit::Changed { from, to } => println!(
            "{}: {} -> {}",
            key,
            display_value(&from),
            display_value(&to)
        ),
        Edit::Unchanged(value) => println!("{} already {}", key, display_value(&value)),
    }
}

fn display_value(value: &str) -> &str {
    if value.is_empty() {
        "(empty)"
    } else {
        value
    }
}

/// INI-style listing; values that differ from the defaults are marked `*`.
fn render(config: &ConfigFile, only: Option<&str>) -> Result<String, CliError> {
    let keys: Vec<ConfigKey> = ConfigKey::all()
        .iter()
        .copied()
        .filter(|key| only.map_or(true, |section| key.section() == section))
        .collect();
    if keys.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "no settings in section '{}'",
            only.unwrap_or_default()
        )));
    }

    let defaults = ConfigFile::default();
    let mut out = String::new();
    let mut section = None;
    for key in keys {
        if section != Some(key.section()) {
            if section.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "[{}]", key.section());
            section = Some(key.section());
        }
        let value = key.get(config);
        let marker = if value == key.get(&defaults) { ' ' } else { '*' };
        let _ = writeln!(out, "{} {} = {}", marker, key.key_name(), display_value(&value));
    }
    Ok(out)
}
