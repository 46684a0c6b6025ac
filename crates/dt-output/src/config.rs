//! Persistence settings shared by `save` and `load`.

use std::path::PathBuf;

/// Where experiment directories live and whether progress is reported.
///
/// ```rust,ignore
/// let config = OutputConfig::new("runs").quiet();
/// data.save(Some("sweep"), None, &config)?;
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutputConfig {
    /// Base directory holding one `{exp_name}_{exp_id}` subdirectory per
    /// saved experiment.  Created on save if absent (one level only).
    pub path: PathBuf,

    /// Emit `info`-level progress messages.  Failures are logged regardless.
    pub display: bool,
}

impl OutputConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), display: true }
    }

    /// Disable progress messages.
    pub fn quiet(mut self) -> Self {
        self.display = false;
        self
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::new("ap_output")
    }
}
