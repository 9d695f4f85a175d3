mod cluster;
mod crdgen;
mod delete;
mod finalizer;
mod get;
mod loglevels;
mod phase;
mod version;
mod watch;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::{EnvFilter, Registry, prelude::*};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Parameters {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the version
    Version(version::Parameters),
    /// Print the DebugMode CRD
    Crdgen(crdgen::Parameters),
    /// Print a DebugMode
    Get(get::Parameters),
    /// Move a DebugMode to another phase
    Phase(phase::Parameters),
    /// Manage the finalizers of a DebugMode
    Finalizer(finalizer::Parameters),
    /// Record whether the log levels were applied
    LogLevelsSet(loglevels::Parameters),
    /// Follow the DebugMode changes of a namespace
    Watch(watch::Parameters),
    /// Delete a DebugMode
    Delete(delete::Parameters),
}

fn init_tracing() {
    let json = std::env::var("LOG_FORMAT").is_ok_and(|f| f == "json");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let collector = Registry::default()
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .with(env_filter);
    if let Err(e) = tracing::subscriber::set_global_default(collector) {
        eprintln!("Cannot install the log collector: {e}");
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Parameters::parse();
    match &args.command {
        Commands::Version(args) => version::run(args).await.unwrap_or_else(|e| {
            tracing::error!("Printing the version failed with: {e:}");
            process::exit(1)
        }),
        Commands::Crdgen(args) => crdgen::run(args).await.unwrap_or_else(|e| {
            tracing::error!("Generating the CRD failed with: {e:}");
            process::exit(1)
        }),
        Commands::Get(args) => get::run(args).await.unwrap_or_else(|e| {
            tracing::error!("Getting the debugmode failed with: {e:}");
            process::exit(1)
        }),
        Commands::Phase(args) => phase::run(args).await.unwrap_or_else(|e| {
            tracing::error!("Changing the phase failed with: {e:}");
            process::exit(1)
        }),
        Commands::Finalizer(args) => finalizer::run(args).await,
        Commands::LogLevelsSet(args) => loglevels::run(args).await.unwrap_or_else(|e| {
            tracing::error!("Setting the LogLevelsSet condition failed with: {e:}");
            process::exit(1)
        }),
        Commands::Watch(args) => watch::run(args).await.unwrap_or_else(|e| {
            tracing::error!("Watching failed with: {e:}");
            process::exit(1)
        }),
        Commands::Delete(args) => delete::run(args).await.unwrap_or_else(|e| {
            tracing::error!("Deleting the debugmode failed with: {e:}");
            process::exit(1)
        }),
    }
}
