use anyhow::{Context, Result};
use std::path::{self, Path, PathBuf};

/// Parameters of one export run. Built once, never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportJob {
    input: PathBuf,
    output_dir: PathBuf,
    prefix: String,
    psx_optimize: bool,
    debug: bool,
    dry_run: bool,
}

impl ExportJob {
    /// Creates a job with absolute input and output paths. Relative paths are
    /// resolved against the current directory; nothing is checked for existence.
    pub fn new(input: &Path, output_dir: &Path) -> Result<Self> {
        let input = path::absolute(input)
            .with_context(|| format!("Failed to resolve input path {}", input.display()))?;
        let output_dir = path::absolute(output_dir).with_context(|| {
            format!("Failed to resolve output directory {}", output_dir.display())
        })?;

        Ok(Self {
            input,
            output_dir,
            prefix: String::new(),
            psx_optimize: true,
            debug: false,
            dry_run: false,
        })
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Accepted and forwarded to the host, but currently has no effect on the export
    pub fn with_psx_optimize(mut self, psx_optimize: bool) -> Self {
        self.psx_optimize = psx_optimize;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn psx_optimize(&self) -> bool {
        self.psx_optimize
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
