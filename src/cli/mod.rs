use std::rc::Rc;

use clap::{Parser, Subcommand};

use crate::ambient::ManualSignal;
use crate::config::load_scheme_config;
use crate::engine::SchemeEngine;
use crate::error::SchemeResult;
use crate::scheme::{Appearance, Scheme};
use crate::storage::JsonFileStore;
use crate::ui::{ClassList, MemoryClassList};

#[derive(Debug, Parser)]
#[command(name = "schemekit")]
#[command(about = "Inspect and change the stored light/dark scheme preference")]
#[command(version)]
#[command(after_help = "Without --ambient the ambient scheme is read from GTK_THEME.")]
pub struct Cli {
    /// Ambient scheme to assume instead of reading GTK_THEME
    #[arg(long, global = true, value_name = "light|dark")]
    pub ambient: Option<Appearance>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show ambient, stored and effective scheme (default)
    Status,
    /// Store a scheme
    Set {
        #[arg(value_name = "light|dark|system")]
        scheme: Scheme,
    },
    /// Advance light -> dark -> system
    Cycle,
    /// Remove the stored scheme
    Clear,
}

pub fn run(cli: Cli) -> SchemeResult<()> {
    let signal = match cli.ambient {
        Some(appearance) => ManualSignal::with_appearance(appearance),
        None => ManualSignal::from_env()?,
    };
    let store = JsonFileStore::with_default_path()?;
    tracing::debug!(path = %store.path().display(), "using preference file");

    let classes = MemoryClassList::new();
    let engine = SchemeEngine::new(
        load_scheme_config(),
        Rc::new(signal),
        Box::new(store),
        Box::new(classes.clone()),
    )?;
    engine.apply_stored_scheme_on_init();

    match cli.command.unwrap_or(Command::Status) {
        Command::Set { scheme } => engine.set_user_scheme(scheme),
        Command::Cycle => {
            engine.set_next_scheme();
        }
        Command::Clear => engine.set_system_scheme(),
        Command::Status => {}
    }

    println!("{}", status_report(&engine, &classes));
    Ok(())
}

fn status_report(engine: &SchemeEngine, classes: &dyn ClassList) -> String {
    let scheme_classes = engine.config().classes();
    let active = scheme_classes
        .classes()
        .into_iter()
        .find(|class| classes.contains(class))
        .unwrap_or("(none)");
    format!(
        "ambient: {}\nuser: {}\ncurrent: {}\nclass: {}",
        engine.ambient_preference(),
        engine.user_scheme(),
        engine.current(),
        active
    )
}
