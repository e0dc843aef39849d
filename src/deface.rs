//! Invocation of the external `deface` anonymizer with an exclusion rectangle.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{info, warn};

use crate::error::{Error, Result};
use crate::geometry::OriginalRect;

/// Output file for `input`: `anon_<stem><ext>` in the current working directory.
pub fn output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    PathBuf::from(format!("anon_{stem}{ext}"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DefaceInvocation {
    program: PathBuf,
    input: PathBuf,
    exclude: OriginalRect,
    output: PathBuf,
}

impl DefaceInvocation {
    pub fn new(program: impl Into<PathBuf>, input: impl Into<PathBuf>, exclude: OriginalRect) -> Self {
        let input = input.into();
        let output = output_path(&input);
        Self {
            program: program.into(),
            input,
            exclude,
            output,
        }
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn exclude(&self) -> OriginalRect {
        self.exclude
    }

    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.input.clone().into(),
            "--boxes".into(),
            "--draw-scores".into(),
            "--exclude".into(),
        ];
        args.extend(self.exclude.to_array().iter().map(|v| OsString::from(v.to_string())));
        args.push("--output".into());
        args.push(self.output.clone().into());
        args
    }

    /// Shell-like rendering for the operator; not meant to be re-parsed.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str().to_os_string())
            .chain(self.args())
            .map(|a| a.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Runs the anonymizer to completion on the calling thread.
    ///
    /// Its stdout goes straight to ours; stderr is kept so a failure can be shown.
    pub fn run(&self) -> Result<PathBuf> {
        info!("running {}", self.command_line());
        let child = Command::new(&self.program)
            .args(self.args())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()?;
        let output = child.wait_with_output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!("deface failed with {}: {stderr}", output.status);
            return Err(Error::Deface {
                status: output.status,
                stderr,
            });
        }
        info!("wrote {}", self.output.display());
        Ok(self.output.clone())
    }
}
