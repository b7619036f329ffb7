use colored::Colorize;
use edgefix_core::{ChangeRecord, FunctionIdentity, Outcome, PipelineOutput, Policy};

/// What happened to one handler file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Modified,
    Compliant,
    /// Left unchanged because some step could not find its anchor.
    Unmatched,
}

impl FileStatus {
    pub fn of(output: &PipelineOutput) -> Self {
        if output.changed {
            FileStatus::Modified
        } else if output.record.has_warnings() {
            FileStatus::Unmatched
        } else {
            FileStatus::Compliant
        }
    }
}

/// How results are being applied, for wording only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Write,
    Check,
    Diff,
}

impl Mode {
    fn modified_label(self) -> &'static str {
        match self {
            Mode::Write => "modified",
            Mode::Check | Mode::Diff => "would modify",
        }
    }
}

fn outcome_tag(outcome: Outcome) -> colored::ColoredString {
    match outcome {
        Outcome::Applied => "applied".green(),
        Outcome::Skipped => "skipped".dimmed(),
        Outcome::Warning => "warning".yellow().bold(),
    }
}

pub fn print_file(
    identity: &FunctionIdentity,
    policy: Policy,
    status: FileStatus,
    mode: Mode,
    record: &ChangeRecord,
) {
    let headline = match status {
        FileStatus::Modified => format!("{} {}", "✓".green(), identity.to_string().green().bold()),
        FileStatus::Compliant => format!("{} {}", "·".dimmed(), identity),
        FileStatus::Unmatched => {
            format!("{} {}", "!".yellow(), identity.to_string().yellow().bold())
        }
    };
    let status_text = match status {
        FileStatus::Modified => mode.modified_label(),
        FileStatus::Compliant => "already compliant",
        FileStatus::Unmatched => "unchanged",
    };
    println!("{headline} ({policy}): {status_text}");

    for note in &record.notes {
        // Skips are noise on compliant files
        if note.outcome == Outcome::Skipped && status == FileStatus::Compliant {
            continue;
        }
        println!(
            "    [{} {}] {}: {}",
            note.step,
            note.step_name,
            outcome_tag(note.outcome),
            note.message
        );
    }
}

pub fn print_error(identity: &FunctionIdentity, error: &anyhow::Error) {
    eprintln!("{} {}: {error:#}", "✗".red(), identity.to_string().red().bold());
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub modified: usize,
    pub compliant: usize,
    pub unmatched: usize,
    pub errored: usize,
    pub excluded: usize,
}

impl Summary {
    pub fn record(&mut self, status: FileStatus) {
        match status {
            FileStatus::Modified => self.modified += 1,
            FileStatus::Compliant => self.compliant += 1,
            FileStatus::Unmatched => self.unmatched += 1,
        }
    }

    pub fn print(&self, mode: Mode) {
        println!();
        println!(
            "{} {}, {} already compliant, {} unmatched, {} errored, {} excluded",
            self.modified.to_string().bold(),
            mode.modified_label(),
            self.compliant,
            self.unmatched,
            self.errored,
            self.excluded
        );
    }
}
