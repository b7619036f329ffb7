use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use edgefix_core::{Config, Policy, ResolvePolicy, StaticPolicy};
use std::path::PathBuf;

use crate::file_walker;

#[derive(Args, Debug, Default, Clone)]
#[command(about = "List discovered functions and their resolved policies")]
pub struct ListArgs {
    /// Directory containing one sub-directory per edge function
    #[arg(value_name = "FUNCTIONS_DIR", value_hint = clap::ValueHint::DirPath)]
    pub functions_dir: PathBuf,

    /// Config file. Defaults to edgefix.toml next to FUNCTIONS_DIR, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

pub fn execute(args: ListArgs) -> Result<()> {
    let config = Config::discover(args.config.as_deref(), &args.functions_dir)
        .context("Failed to load configuration")?;
    let resolver = StaticPolicy::from_config(&config);
    let discovery =
        file_walker::collect_handler_files(&args.functions_dir, &config.handler_file, &resolver)?;

    let width = discovery
        .targets
        .iter()
        .map(|(identity, _)| identity.as_str().len())
        .chain(discovery.excluded.iter().map(|identity| identity.as_str().len()))
        .max()
        .unwrap_or(0);

    for (identity, _) in &discovery.targets {
        let policy = resolver.resolve(identity);
        let label = match policy {
            Policy::PlainAuth => policy.to_string().normal(),
            Policy::UserScopedAuth => policy.to_string().cyan(),
            Policy::CorsOnly => policy.to_string().magenta(),
        };
        println!("{:<width$}  {label}", identity.as_str());
    }
    for identity in &discovery.excluded {
        println!("{:<width$}  {}", identity.as_str(), "excluded".dimmed());
    }
    Ok(())
}
