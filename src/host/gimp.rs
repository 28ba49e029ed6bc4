use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

use super::{Host, HostError, Locator};
use crate::job::ExportJob;
use crate::layer_tree::LayerTree;
use crate::notifier::Notifier;
use crate::plan::{ExportPlan, ExportStep, StepOutcome};

/// Environment variable naming the JSON request file read by [`SCRIPT`]
pub const JOB_VARIABLE: &str = "GIMP_LAYER_EXPORT_JOB";

/// Python-Fu program run inside GIMP. It never contains job values; those are
/// read from the request file.
pub const SCRIPT: &str = include_str!("gimp_layers.py");

const REQUEST_FILE: &str = "request.json";
const RESPONSE_FILE: &str = "response.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Inspect,
    Export,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Inspect => write!(f, "inspect"),
            Phase::Export => write!(f, "export"),
        }
    }
}

/// Request file contents for one GIMP session
#[derive(Debug, Serialize)]
pub struct HostRequest<'a> {
    pub phase: Phase,
    pub input: &'a Path,
    /// Where the script writes its JSON response
    pub output: &'a Path,
    pub debug: bool,
    pub psx_optimize: bool,
    #[serde(skip_serializing_if = "no_steps")]
    pub steps: &'a [ExportStep],
}

fn no_steps(steps: &&[ExportStep]) -> bool {
    steps.is_empty()
}

/// GIMP 3 driven through its batch interface and the `python-fu-eval` interpreter
pub struct GimpHost {
    executable: PathBuf,
}

impl GimpHost {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Uses the executable found by [`Locator::current`]
    pub fn locate() -> Self {
        Self::new(Locator::current().find())
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Arguments passed after the executable. Debug runs keep the UI and splash
    /// screen so the session can be watched.
    pub fn command_args(debug: bool) -> Vec<&'static str> {
        let mut args = Vec::new();
        if !debug {
            args.extend(["--no-interface", "--no-splash"]);
        }
        args.extend(["--batch-interpreter", "python-fu-eval", "-b", SCRIPT, "--quit"]);
        args
    }

    fn run_session<T: DeserializeOwned>(
        &self,
        phase: Phase,
        job: &ExportJob,
        steps: &[ExportStep],
        notifier: &Notifier,
    ) -> Result<T> {
        let exchange = TempDir::new().context("Failed to create temporary directory")?;
        let request_path = exchange.path().join(REQUEST_FILE);
        let response_path = exchange.path().join(RESPONSE_FILE);

        let request = HostRequest {
            phase,
            input: job.input(),
            output: &response_path,
            debug: job.debug(),
            psx_optimize: job.psx_optimize(),
            steps,
        };
        let content =
            serde_json::to_string(&request).context("Failed to serialize GIMP request")?;
        fs::write(&request_path, content).with_context(|| {
            format!("Failed to write GIMP request to {}", request_path.display())
        })?;
        notifier.trace(&format!("GIMP request written to {}", request_path.display()));

        notifier.start_spinner(&format!("Running GIMP ({} phase)...", phase));
        let output = Command::new(&self.executable)
            .args(Self::command_args(job.debug()))
            .env(JOB_VARIABLE, &request_path)
            .output();
        notifier.finish_spinner();

        let output = output.map_err(|e| match e.kind() {
            ErrorKind::NotFound => HostError::ExecutableNotFound(self.executable.clone()),
            _ => HostError::Launch {
                path: self.executable.clone(),
                source: e,
            },
        })?;

        notifier.relay("GIMP Output:", &String::from_utf8_lossy(&output.stdout));
        notifier.relay(
            "GIMP Errors/Warnings:",
            &String::from_utf8_lossy(&output.stderr),
        );

        if !output.status.success() {
            return Err(HostError::Failed {
                status: output.status,
            }
            .into());
        }
        notifier.debug(&format!("GIMP {} phase finished successfully", phase));

        let response = fs::read_to_string(&response_path).with_context(|| {
            format!(
                "GIMP {} phase finished without writing {}",
                phase,
                response_path.display()
            )
        })?;
        serde_json::from_str(&response)
            .with_context(|| format!("Malformed response from GIMP {} phase", phase))
    }
}

impl Host for GimpHost {
    fn name(&self) -> &str {
        "gimp"
    }

    fn inspect(&self, job: &ExportJob, notifier: &Notifier) -> Result<LayerTree> {
        self.run_session(Phase::Inspect, job, &[], notifier)
    }

    fn export(
        &self,
        job: &ExportJob,
        plan: &ExportPlan,
        notifier: &Notifier,
    ) -> Result<Vec<StepOutcome>> {
        self.run_session(Phase::Export, job, plan.steps(), notifier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args_headless() {
        let args = GimpHost::command_args(false);
        assert_eq!(
            args,
            vec![
                "--no-interface",
                "--no-splash",
                "--batch-interpreter",
                "python-fu-eval",
                "-b",
                SCRIPT,
                "--quit",
            ]
        );
    }

    #[test]
    fn test_command_args_debug_keeps_ui() {
        let args = GimpHost::command_args(true);
        assert!(!args.contains(&"--no-interface"));
        assert!(!args.contains(&"--no-splash"));
        assert_eq!(args[0], "--batch-interpreter");
        assert_eq!(args.last(), Some(&"--quit"));
    }

    #[test]
    fn test_script_reads_job_from_environment() {
        assert!(SCRIPT.contains(JOB_VARIABLE));
        assert!(SCRIPT.contains("\"compression\", 9"));
        assert!(SCRIPT.contains("\"save-transparent\", True"));
    }

    #[test]
    fn test_request_serialization() {
        let steps = vec![ExportStep {
            locator: vec![1, 0],
            layer_name: "Eyes \"left\"".to_string(),
            destination: PathBuf::from("/out/group_1/spr_eyes.png"),
        }];
        let request = HostRequest {
            phase: Phase::Export,
            input: Path::new("/art/it's \"quoted\".xcf"),
            output: Path::new("/tmp/response.json"),
            debug: false,
            psx_optimize: true,
            steps: &steps,
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["phase"], "export");
        assert_eq!(value["input"], "/art/it's \"quoted\".xcf");
        assert_eq!(value["steps"][0]["locator"], serde_json::json!([1, 0]));
        assert_eq!(value["steps"][0]["layer_name"], "Eyes \"left\"");
        assert_eq!(value["steps"][0]["destination"], "/out/group_1/spr_eyes.png");

        let inspect = HostRequest {
            phase: Phase::Inspect,
            steps: &[],
            ..request
        };
        let text = serde_json::to_string(&inspect).unwrap();
        assert!(text.starts_with(r#"{"phase":"inspect""#));
        assert!(!text.contains("steps"));
    }

    #[test]
    fn test_missing_executable_is_reported_distinctly() {
        let host = GimpHost::new("/definitely/not/here/gimp-3.0");
        let job = ExportJob::new(Path::new("/tmp/in.xcf"), Path::new("/tmp/out")).unwrap();
        let notifier = Notifier::new(0);

        let err = host.inspect(&job, &notifier).unwrap_err();
        match err.downcast_ref::<HostError>() {
            Some(HostError::ExecutableNotFound(path)) => {
                assert_eq!(path, Path::new("/definitely/not/here/gimp-3.0"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
