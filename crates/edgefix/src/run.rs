use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use clap::Args;
use edgefix_core::{
    Anchors, CodemodContext, Config, Pipeline, PipelineOutput, ResolvePolicy, StaticPolicy,
};
use log::debug;
use similar::TextDiff;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::file_walker;
use crate::report::{self, FileStatus, Mode, Summary};

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Rewrite edge function handlers to use the shared helpers")]
pub struct RunArgs {
    /// Directory containing one sub-directory per edge function
    #[arg(value_name = "FUNCTIONS_DIR", value_hint = clap::ValueHint::DirPath)]
    pub functions_dir: PathBuf,

    /// Config file. Defaults to edgefix.toml next to FUNCTIONS_DIR, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write nothing; exit with non-zero code if any file would change
    #[arg(long, conflicts_with = "diff")]
    pub check: bool,

    /// Show diffs instead of writing files
    #[arg(long)]
    pub diff: bool,
}

impl RunArgs {
    fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.diff {
            Mode::Diff
        } else {
            Mode::Write
        }
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<()> {
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(content.as_bytes())?;
            f.flush()
        })
        .map_err(|err| anyhow::anyhow!("Failed to write {}: {err}", path.display()))
}

fn unified_diff(path: &Path, old: &str, new: &str) -> String {
    let diff = TextDiff::from_lines(old, new);
    format!(
        "{}",
        diff.unified_diff().context_radius(3).header(
            &format!("old/{}", path.display()),
            &format!("new/{}", path.display())
        )
    )
}

/// Migrate one handler file. The file is written only if its content changed
/// and the mode allows writing.
fn process_file(
    pipeline: &Pipeline,
    ctx: &CodemodContext<'_>,
    path: &Path,
    mode: Mode,
) -> Result<PipelineOutput> {
    let original =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let output = pipeline
        .run(ctx, &original)
        .with_context(|| format!("Failed to migrate {}", path.display()))?;

    if !output.changed {
        return Ok(output);
    }
    match mode {
        Mode::Write => write_atomic(path, &output.content)?,
        Mode::Diff => print!("{}", unified_diff(path, &original, &output.content)),
        Mode::Check => debug!("{} would change", path.display()),
    }
    Ok(output)
}

pub fn execute(args: RunArgs) -> Result<()> {
    let config = Config::discover(args.config.as_deref(), &args.functions_dir)
        .context("Failed to load configuration")?;
    let anchors: Anchors = config.anchors()?;
    let resolver = StaticPolicy::from_config(&config);
    let mode = args.mode();

    let discovery =
        file_walker::collect_handler_files(&args.functions_dir, &config.handler_file, &resolver)?;
    if discovery.targets.is_empty() {
        eprintln!(
            "No {} files found under {}",
            config.handler_file,
            args.functions_dir.display()
        );
    }

    let pipeline = Pipeline::standard();
    let mut summary = Summary {
        excluded: discovery.excluded.len(),
        ..Summary::default()
    };

    for (identity, path) in &discovery.targets {
        let policy = resolver.resolve(identity);
        let ctx = CodemodContext {
            identity,
            policy,
            anchors: &anchors,
        };
        match process_file(&pipeline, &ctx, path, mode) {
            Ok(output) => {
                let status = FileStatus::of(&output);
                report::print_file(identity, policy, status, mode, &output.record);
                summary.record(status);
            }
            Err(e) => {
                debug!("{}: {e:?}", path.display());
                report::print_error(identity, &e);
                summary.errored += 1;
            }
        }
    }

    summary.print(mode);

    if summary.errored > 0 {
        anyhow::bail!("{} file(s) failed to migrate", summary.errored);
    }
    if mode == Mode::Check && summary.modified > 0 {
        anyhow::bail!("{} file(s) need migration", summary.modified);
    }
    Ok(())
}
