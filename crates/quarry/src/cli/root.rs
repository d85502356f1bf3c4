//! Root command - Show the common dataset root of a job

use crate::cli::load_job;
use std::path::PathBuf;

#[derive(Debug)]
pub struct RootArgs {
    pub job: PathBuf,
}

pub fn run(args: RootArgs) -> anyhow::Result<()> {
    let config = load_job(&args.job)?;
    println!("{}", config.common_root());
    Ok(())
}
