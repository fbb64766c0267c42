//! Showing a written figure.

use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::info;

/// Hand `path` to the viewer and block until it exits.
///
/// `viewer` is split on whitespace into a program and leading arguments; the
/// figure path is appended last. Without a viewer the path is printed.
pub fn show(path: &Path, viewer: Option<&str>) -> Result<()> {
    let Some(viewer) = viewer else {
        println!("Figure written to {}", path.display());
        return Ok(());
    };

    let mut parts = viewer.split_whitespace();
    let program = parts.next().context("Viewer command is empty")?;

    info!(viewer = program, path = %path.display(), "Opening figure");
    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to start viewer '{program}'"))?;

    if !status.success() {
        bail!("Viewer '{program}' exited with {status}");
    }
    info!("Viewer closed");
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_no_viewer_is_ok() {
        assert!(show(Path::new("fig.png"), None).is_ok());
    }

    #[test]
    fn test_waits_for_successful_viewer() {
        assert!(show(Path::new("fig.png"), Some("true")).is_ok());
    }

    #[test]
    fn test_failing_viewer_is_error() {
        let err = show(Path::new("fig.png"), Some("false")).unwrap_err();
        assert!(err.to_string().contains("exited with"));
    }

    #[test]
    fn test_missing_viewer_is_error() {
        let err = show(Path::new("fig.png"), Some("no-such-viewer-det-pix")).unwrap_err();
        assert!(err.to_string().contains("Failed to start viewer"));
    }

    #[test]
    fn test_viewer_arguments_are_kept() {
        // `test -n <path>` succeeds only when the path argument arrives.
        assert!(show(Path::new("fig.png"), Some("test -n")).is_ok());
    }
}
