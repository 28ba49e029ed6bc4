use crate::layer_tree::{Layer, LayerTree};
use crate::report::ExportReport;
use crate::traversal::{walk_layers, LayerSink};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// One layer the host has to export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportStep {
    pub locator: Vec<usize>,
    /// Original layer name, used by the host in its log lines
    pub layer_name: String,
    pub destination: PathBuf,
}

/// Result the host reports for one [`ExportStep`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StepOutcome {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Ordered list of exports produced by the layer walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportPlan {
    steps: Vec<ExportStep>,
}

impl ExportPlan {
    /// Walks `tree` and turns every visible leaf into a step targeting
    /// `output_dir`. With `create_dirs` the group directories are created on
    /// the way, exactly as the export will need them.
    ///
    /// The returned report lists the planned destinations and any layer whose
    /// directory could not be created; those layers get no step.
    pub fn build(
        tree: &LayerTree,
        output_dir: &Path,
        prefix: &str,
        create_dirs: bool,
    ) -> (Self, ExportReport) {
        let mut sink = PlanSink {
            output_dir,
            create_dirs,
            steps: Vec::new(),
        };
        let mut report = walk_layers(tree, prefix, &mut sink);
        report.exported = sink.steps.iter().map(|s| s.destination.clone()).collect();
        (Self { steps: sink.steps }, report)
    }

    pub fn steps(&self) -> &[ExportStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Folds the host's per-step outcomes into `report`. Steps without an
    /// outcome count as failed.
    pub fn apply_outcomes(&self, outcomes: &[StepOutcome], report: &mut ExportReport) {
        report.exported.clear();
        for (i, step) in self.steps.iter().enumerate() {
            match outcomes.get(i) {
                Some(outcome) if outcome.ok => report.exported.push(step.destination.clone()),
                Some(outcome) => report.record_failure(
                    &step.layer_name,
                    outcome
                        .error
                        .clone()
                        .unwrap_or_else(|| "export failed".to_string()),
                ),
                None => report.record_failure(&step.layer_name, "no result reported by host"),
            }
        }
    }
}

struct PlanSink<'a> {
    output_dir: &'a Path,
    create_dirs: bool,
    steps: Vec<ExportStep>,
}

impl LayerSink for PlanSink<'_> {
    fn ensure_dir(&mut self, relative_dir: &Path) -> Result<()> {
        if self.create_dirs {
            let dir = self.output_dir.join(relative_dir);
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }

    fn export_layer(&mut self, layer: &Layer, relative_file: &Path) -> Result<()> {
        self.steps.push(ExportStep {
            locator: layer.locator.clone(),
            layer_name: layer.name.clone(),
            destination: self.output_dir.join(relative_file),
        });
        Ok(())
    }
}
