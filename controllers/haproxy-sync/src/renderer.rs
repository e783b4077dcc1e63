//! Config rendering.
//!
//! The template is a Jinja template with a single variable, `nodes`: the
//! ordered list of backend addresses. Output is written to a temp file in the
//! target directory and renamed over the target, so haproxy never reads a
//! half-written config.

use crate::error::ControllerError;
use minijinja::{Environment, UndefinedBehavior, context};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Render `template` with `nodes` bound to `addresses`.
///
/// # Errors
///
/// Returns [`ControllerError::Render`] when the template does not parse or
/// refers to anything other than `nodes`.
pub fn render(template: &str, addresses: &[String]) -> Result<String, ControllerError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    Ok(env.render_str(template, context! { nodes => addresses })?)
}

/// Replace the contents of `path` with `contents` in one rename.
///
/// # Errors
///
/// Returns [`ControllerError::Io`] if the temp file cannot be created,
/// written or moved into place.
pub fn write_atomic(path: &Path, contents: &str) -> Result<(), ControllerError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".haproxy-sync-")
        .tempfile_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;

    // tempfile creates 0600; haproxy may run as another user
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.as_file()
            .set_permissions(std::fs::Permissions::from_mode(0o644))?;
    }

    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Renders the configured template to the configured output path.
#[derive(Debug, Clone)]
pub struct ConfigRenderer {
    template_path: PathBuf,
    output_path: PathBuf,
}

impl ConfigRenderer {
    /// Creates a new renderer.
    pub fn new(template_path: impl Into<PathBuf>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            output_path: output_path.into(),
        }
    }

    /// Output file path
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Read the template, render it for `addresses` and write the output.
    ///
    /// The template is re-read on every call so edits take effect on the
    /// next change without a restart.
    ///
    /// # Errors
    ///
    /// - [`ControllerError::Template`] if the template cannot be read
    /// - [`ControllerError::Render`] if it cannot be rendered
    /// - [`ControllerError::Io`] if the output cannot be written
    pub fn render_to_file(&self, addresses: &[String]) -> Result<(), ControllerError> {
        let template = std::fs::read_to_string(&self.template_path).map_err(|source| {
            ControllerError::Template {
                path: self.template_path.clone(),
                source,
            }
        })?;
        debug!(
            "Rendering {} with {} addresses",
            self.template_path.display(),
            addresses.len()
        );

        let output = render(&template, addresses)?;
        write_atomic(&self.output_path, &output)?;

        info!(
            "Wrote {} ({} backend addresses)",
            self.output_path.display(),
            addresses.len()
        );
        Ok(())
    }
}
