//! End-to-end "layered image → PNG files" pipeline orchestrator.
//!
//! [`LayerExporter`] drives a concrete [`Host`] through a linear sequence:
//! - create the output directory,
//! - ask the host to describe the image's layer tree,
//! - walk the tree once ([`ExportPlan::build`]), creating group directories,
//! - hand the resulting plan to the host for export,
//! - fold the per-layer outcomes into an [`ExportReport`].
//!
//! Nothing is retried and no state survives the run. Host-level failures
//! (executable missing, image that fails to load, crashed session) abort with
//! an error; single layers that fail to export are only recorded.

use crate::host::Host;
use crate::job::ExportJob;
use crate::notifier::Notifier;
use crate::plan::ExportPlan;
use crate::report::ExportReport;
use anyhow::{Context, Result};
use std::fs;
use std::time::Instant;

/// Exports the visible layers of an image through a concrete [`Host`].
pub struct LayerExporter<H: Host> {
    host: H,
    notifier: Notifier,
}

impl<H: Host> LayerExporter<H> {
    pub fn new(host: H, notifier: Notifier) -> Self {
        Self { host, notifier }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Runs `job` to completion.
    ///
    /// For a dry run the host only describes the image; the report then lists
    /// the files that would be written and nothing is created on disk.
    ///
    /// # Errors
    /// - The output directory cannot be created.
    /// - The host cannot be launched, fails to load the image, or exits with
    ///   a non-zero status.
    /// - The host's response is missing or malformed.
    pub fn export(&self, job: &ExportJob) -> Result<ExportReport> {
        let started = Instant::now();
        self.notifier.info(&format!(
            "Exporting layers of {} with {}",
            job.input().display(),
            self.host.name()
        ));
        self.notifier
            .debug(&format!("Output directory: {}", job.output_dir().display()));
        self.notifier.debug(&format!(
            "PSX optimization: {}",
            if job.psx_optimize() { "enabled" } else { "disabled" }
        ));

        if !job.dry_run() {
            fs::create_dir_all(job.output_dir()).with_context(|| {
                format!(
                    "Failed to create output directory {}",
                    job.output_dir().display()
                )
            })?;
        }

        self.notifier.info("Reading layer tree...");
        let tree = self.host.inspect(job, &self.notifier)?;
        self.notifier.debug(&format!(
            "Image '{}' is {}x{} with {} leaf layers",
            tree.name,
            tree.width,
            tree.height,
            tree.leaf_count()
        ));

        let (plan, mut report) =
            ExportPlan::build(&tree, job.output_dir(), job.prefix(), !job.dry_run());
        self.notifier.info(&format!(
            "{} visible layers to export, {} hidden",
            plan.len(),
            report.hidden
        ));

        if job.dry_run() {
            self.notifier.info("Dry run, skipping export");
            return Ok(report);
        }

        if plan.is_empty() {
            self.notifier.warn("No visible layers found in the image");
            return Ok(report);
        }

        self.notifier.info("Exporting layers...");
        let outcomes = self.host.export(job, &plan, &self.notifier)?;
        if outcomes.len() != plan.len() {
            self.notifier.warn(&format!(
                "Host reported {} results for {} layers",
                outcomes.len(),
                plan.len()
            ));
        }
        plan.apply_outcomes(&outcomes, &mut report);

        self.notifier.info(&format!(
            "Exported {} layers in {:.1?}",
            report.exported.len(),
            started.elapsed()
        ));
        Ok(report)
    }
}
