use clap::Args;
use common::{DebugMode, Result};
use kube::CustomResourceExt;

#[derive(Args, Debug)]
pub struct Parameters {}

pub async fn run(_args: &Parameters) -> Result<()> {
    println!("---");
    print!("{}", serde_yaml::to_string(&DebugMode::crd())?);
    Ok(())
}
