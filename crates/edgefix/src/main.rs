use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod file_walker;
mod list;
mod report;
mod run;

#[derive(Parser)]
#[command(name = "edgefix")]
#[command(about = "Move edge function handlers onto the shared CORS and auth helpers", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite every handler in a functions directory
    #[command(alias = "r")]
    Run(run::RunArgs),

    /// Show which policy each function resolves to
    #[command(alias = "ls")]
    List(list::ListArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG still wins
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("warn")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Run(args) => run::execute(args),
        Commands::List(args) => list::execute(args),
    }
}
