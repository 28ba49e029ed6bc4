pub mod exporter;
pub mod host;
pub mod job;
pub mod layer_tree;
pub mod naming;
pub mod notifier;
pub mod plan;
pub mod report;
pub mod traversal;

// Re-exports for easy access
pub use exporter::LayerExporter;
pub use host::{GimpHost, Host, HostError, Locator};
pub use job::ExportJob;
pub use layer_tree::{Layer, LayerNode, LayerTree};
pub use notifier::Notifier;
pub use plan::{ExportPlan, ExportStep, StepOutcome};
pub use report::{ExportReport, LayerFailure};
