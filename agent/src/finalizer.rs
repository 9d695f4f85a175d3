use clap::{Args, Parser, Subcommand};
use common::Result;
use std::process;

use crate::cluster::Cluster;

#[derive(Parser, Debug)]
pub struct Parameters {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct Target {
    /// DebugMode name
    #[arg(value_name = "NAME")]
    name: String,
    /// Finalizer token
    #[arg(value_name = "FINALIZER")]
    finalizer: String,
    #[command(flatten)]
    cluster: Cluster,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a finalizer, blocking deletion until it is removed
    Add(Target),
    /// Remove a finalizer
    Remove(Target),
}

async fn add(args: &Target) -> Result<()> {
    let client = args.cluster.client().await?;
    let dm = client.get(&args.name).await?;
    let dm = client.add_finalizer(&dm, &args.finalizer).await?;
    println!("{}", dm.metadata.finalizers.unwrap_or_default().join(","));
    Ok(())
}

async fn remove(args: &Target) -> Result<()> {
    let client = args.cluster.client().await?;
    let dm = client.get(&args.name).await?;
    let dm = client.remove_finalizer(&dm, &args.finalizer).await?;
    println!("{}", dm.metadata.finalizers.unwrap_or_default().join(","));
    Ok(())
}

pub async fn run(cmd: &Parameters) {
    match &cmd.command {
        Commands::Add(args) => add(args).await.unwrap_or_else(|e| {
            tracing::error!("Adding the finalizer failed with: {e:}");
            process::exit(1)
        }),
        Commands::Remove(args) => remove(args).await.unwrap_or_else(|e| {
            tracing::error!("Removing the finalizer failed with: {e:}");
            process::exit(1)
        }),
    }
}
