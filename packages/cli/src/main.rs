#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Interactive front end for the law enforcement records toolchain.
//!
//! Presents one menu per record family (officers, crime, forensics, patrol,
//! jail). Every family is loaded from its JSON document in the data
//! directory at startup and cross-family references are checked once all of
//! them are in memory. Nothing is written until the user saves.

mod menu;
mod registry;

use std::path::PathBuf;

use clap::Parser;
use lems_cli_utils::{CliResult, choose, confirm};

use crate::registry::{DataPaths, Family, Registry};

/// Manage officers, cases, evidence, patrols, and prisoners.
#[derive(Parser)]
#[command(name = "lems")]
#[command(about = "Law enforcement records management")]
struct Cli {
    /// Directory holding the per-family JSON documents.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

/// Top-level menu entries.
enum Top {
    Family(Family),
    SaveAll,
    Exit,
}

impl Top {
    const ALL: &[Self] = &[
        Self::Family(Family::Officer),
        Self::Family(Family::Crime),
        Self::Family(Family::Forensics),
        Self::Family(Family::Patrol),
        Self::Family(Family::Jail),
        Self::SaveAll,
        Self::Exit,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Family(family) => family.label(),
            Self::SaveAll => "Save all",
            Self::Exit => "Exit",
        }
    }
}

fn main() -> CliResult<()> {
    lems_cli_utils::init_logger();
    let cli = Cli::parse();

    println!("Law Enforcement Management System");
    println!("Data directory: {}", cli.data_dir.display());
    println!();

    let mut registry = Registry::new(DataPaths::new(&cli.data_dir));
    let dangling = registry.load_all();
    if !dangling.is_empty() {
        println!(
            "{} record(s) point at missing records; see the warnings above.",
            dangling.len()
        );
    }

    let labels: Vec<&str> = Top::ALL.iter().map(Top::label).collect();

    loop {
        let idx = choose("What would you like to manage?", &labels)?;
        match Top::ALL[idx] {
            Top::Family(family) => run_family(&mut registry, family)?,
            Top::SaveAll => save_all(&registry),
            Top::Exit => {
                if confirm("Save everything before exiting?", true)? {
                    save_all(&registry);
                }
                return Ok(());
            }
        }
    }
}

fn run_family(registry: &mut Registry, family: Family) -> CliResult<()> {
    match family {
        Family::Officer => menu::officer::run(registry),
        Family::Crime => menu::crime::run(registry),
        Family::Forensics => menu::forensics::run(registry),
        Family::Patrol => menu::patrol::run(registry),
        Family::Jail => menu::jail::run(registry),
    }
}

fn save_all(registry: &Registry) {
    menu::report(registry.save_all(), |saved| {
        format!(
            "Saved {saved} record file(s) to {}",
            registry.paths().data_dir.display()
        )
    });
}
