use clap::Parser;

pub mod ambient;
pub mod broadcast;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod scheme;
pub mod state;
pub mod storage;
pub mod ui;

pub use ambient::{AmbientObserver, AmbientSource, ManualSignal};
pub use broadcast::Subscription;
pub use config::SchemeConfig;
pub use engine::SchemeEngine;
pub use error::{SchemeError, SchemeResult};
pub use scheme::{Appearance, Scheme, SchemeClassMap};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, PreferenceStore};
pub use ui::{ClassList, MemoryClassList};

/// Entrypoint for the `schemekit` binary.
pub fn run() -> SchemeResult<()> {
    logging::init();
    let cli = cli::Cli::parse();
    tracing::debug!(?cli, "starting schemekit");
    cli::run(cli)
}
