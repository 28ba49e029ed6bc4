use std::fmt;
use std::path::PathBuf;

/// A leaf layer that could not be exported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerFailure {
    /// Original (unsanitized) layer name
    pub layer: String,
    pub reason: String,
}

impl fmt::Display for LayerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.layer, self.reason)
    }
}

/// Outcome of one export run.
///
/// Per-layer failures never abort a run; they are collected here so the
/// caller can decide whether a partial export counts as success.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    /// Files written (or, for a dry run, files that would be written)
    pub exported: Vec<PathBuf>,
    /// Leaf layers skipped because they are hidden
    pub hidden: usize,
    pub failures: Vec<LayerFailure>,
}

impl ExportReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_failure(&mut self, layer: &str, reason: impl Into<String>) {
        self.failures.push(LayerFailure {
            layer: layer.to_string(),
            reason: reason.into(),
        });
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Whether the run counts as successful. Per-layer failures only matter
    /// in strict mode.
    pub fn is_success(&self, strict: bool) -> bool {
        !(strict && self.has_failures())
    }
}
