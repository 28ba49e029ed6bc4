pub mod gimp;
pub mod locator;

pub use gimp::GimpHost;
pub use locator::{Locator, Platform};

use crate::job::ExportJob;
use crate::layer_tree::LayerTree;
use crate::notifier::Notifier;
use crate::plan::{ExportPlan, StepOutcome};
use anyhow::Result;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failures of the host process itself, as opposed to failures of single layers
#[derive(Debug, Error)]
pub enum HostError {
    #[error("GIMP executable not found at: {}", .0.display())]
    ExecutableNotFound(PathBuf),

    #[error("Failed to launch GIMP at {}: {source}", .path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("GIMP script failed with {status}")]
    Failed { status: ExitStatus },
}

/// Image editor that loads the input image and exports single layers.
///
/// Implementations are driven in two steps by [`crate::LayerExporter`]: first
/// [`Host::inspect`] describes the layer tree, then [`Host::export`] executes
/// the plan built from it.
pub trait Host {
    /// Returns the name of the host for log messages
    fn name(&self) -> &str;

    /// Loads `job.input()` and describes its layer hierarchy
    fn inspect(&self, job: &ExportJob, notifier: &Notifier) -> Result<LayerTree>;

    /// Exports every step of `plan`, returning one outcome per step in order.
    /// A failing step must not stop the remaining ones.
    fn export(
        &self,
        job: &ExportJob,
        plan: &ExportPlan,
        notifier: &Notifier,
    ) -> Result<Vec<StepOutcome>>;
}
