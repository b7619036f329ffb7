use anyhow::{Context, Result};
use edgefix_core::{FunctionIdentity, ResolvePolicy};
use ignore::WalkBuilder;
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Handler files found under a functions directory.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Files to migrate, sorted by path.
    pub targets: Vec<(FunctionIdentity, PathBuf)>,
    /// Functions skipped because they are in the excluded set.
    pub excluded: Vec<FunctionIdentity>,
}

/// Collect every `<functions_dir>/<name>/<handler_file>`.
///
/// - Only direct children of `functions_dir` are functions
/// - Hidden directories and git-ignored paths are skipped
/// - Excluded functions are reported but never returned as targets
pub fn collect_handler_files(
    functions_dir: &Path,
    handler_file: &str,
    resolver: &dyn ResolvePolicy,
) -> Result<Discovery> {
    if !functions_dir.is_dir() {
        anyhow::bail!("{} is not a directory", functions_dir.display());
    }

    let mut builder = WalkBuilder::new(functions_dir);
    builder
        .max_depth(Some(2))
        .hidden(true)
        .git_ignore(true)
        .git_exclude(true);

    let mut discovery = Discovery::default();
    for result in builder.build() {
        let entry = result.with_context(|| format!("Failed to walk {}", functions_dir.display()))?;
        let path = entry.path();
        if entry.depth() != 2 || !path.is_file() || entry.file_name() != handler_file {
            continue;
        }
        let Some(identity) = FunctionIdentity::from_handler_path(path) else {
            debug!("Skipping {}: no function directory", path.display());
            continue;
        };
        if resolver.is_excluded(&identity) {
            debug!("Skipping excluded function {identity}");
            discovery.excluded.push(identity);
        } else {
            info!("Found handler {}", path.display());
            discovery.targets.push((identity, path.to_path_buf()));
        }
    }

    discovery.targets.sort_by(|a, b| a.1.cmp(&b.1));
    discovery.excluded.sort();
    Ok(discovery)
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgefix_core::StaticPolicy;
    use std::fs;

    #[test]
    fn test_collects_direct_children_only() -> Result<()> {
        let dir = tempfile::tempdir()?;
        for name in ["b-fn", "a-fn", "_shared", "nested/deeper"] {
            fs::create_dir_all(dir.path().join(name))?;
            fs::write(dir.path().join(name).join("index.ts"), "")?;
        }
        fs::write(dir.path().join("a-fn/helpers.ts"), "")?;
        fs::create_dir(dir.path().join("no-handler"))?;

        let resolver = StaticPolicy::new(vec!["_shared"], vec![], vec![]);
        let discovery = collect_handler_files(dir.path(), "index.ts", &resolver)?;

        let names: Vec<_> = discovery.targets.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(names, ["a-fn", "b-fn"]);
        assert_eq!(discovery.excluded, [FunctionIdentity::new("_shared")]);
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let resolver = StaticPolicy::default();
        assert!(collect_handler_files(Path::new("does/not/exist"), "index.ts", &resolver).is_err());
    }
}
