//! Job submission via the external `qsub` command.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::error::{SubmitError, SubmitResult};
use crate::options::{FlagMap, ProgramOptions, SchedulerOptions, render_option_string};
use crate::script::{JobPayload, render_script};

/// Everything needed to submit one job.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Resolved scheduler options.
    pub scheduler: SchedulerOptions,
    /// The wrapped program's own options.
    pub program: ProgramOptions,
    /// Mapping from program-option keys to flag spellings.
    pub flags: FlagMap,
    /// Target module whose entry point the script should call.
    pub module_name: Option<String>,
    /// Literal command string for the script payload instead of a module.
    pub job_string: Option<String>,
    /// Delimiter for list-valued options.
    pub list_delimiter: String,
}

impl JobRequest {
    /// Create a request with no payload; set one with [`with_module`] or
    /// [`with_command`] before submitting.
    ///
    /// [`with_module`]: JobRequest::with_module
    /// [`with_command`]: JobRequest::with_command
    pub fn new(scheduler: SchedulerOptions) -> Self {
        Self {
            scheduler,
            program: ProgramOptions::new(),
            flags: FlagMap::new(),
            module_name: None,
            job_string: None,
            list_delimiter: ",".to_string(),
        }
    }

    /// Run a target module's entry point.
    pub fn with_module(mut self, name: impl Into<String>) -> Self {
        self.module_name = Some(name.into());
        self
    }

    /// Run a literal command string.
    pub fn with_command(mut self, job_string: impl Into<String>) -> Self {
        self.job_string = Some(job_string.into());
        self
    }

    /// Attach the program's options and their flag map.
    pub fn with_program(mut self, program: ProgramOptions, flags: FlagMap) -> Self {
        self.program = program;
        self.flags = flags;
        self
    }

    /// Set the delimiter used for list-valued options.
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.list_delimiter = delimiter.into();
        self
    }
}

/// Submits job scripts to a PBS cluster.
///
/// Each submission renders the script, writes `<job-name>_temp.pbs` in the
/// working directory, invokes the submission command on it, and renames the
/// file to `<job-name>.p<job-id>` as a record of what was submitted. Calls
/// are independent; no state is shared between them.
pub struct Submitter {
    /// Submission executable, normally `qsub`.
    command: String,
    /// Directory the script file is written to.
    work_dir: PathBuf,
    /// Whether to fabricate qsub output instead of invoking it (for testing).
    mock_mode: bool,
    /// Mock job counter for generating fake job IDs.
    mock_counter: AtomicU64,
}

impl Default for Submitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Submitter {
    /// Create a submitter that runs `qsub` in the current directory.
    pub fn new() -> Self {
        Self {
            command: "qsub".to_string(),
            work_dir: PathBuf::from("."),
            mock_mode: false,
            mock_counter: AtomicU64::new(1000),
        }
    }

    /// Create a submitter in mock mode (for testing).
    ///
    /// Mock mode still writes, chmods, and renames the script file; only
    /// the external command invocation is replaced with fabricated output.
    pub fn mock() -> Self {
        Self {
            mock_mode: true,
            ..Self::new()
        }
    }

    /// Override the submission executable.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Set the directory the script file is written to.
    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    /// Submit a job, returning the assigned job identifier.
    ///
    /// Fails with a configuration error before any file is written if the
    /// request has no payload or an empty job name or walltime. On any
    /// failure after the script is written, the temp file is removed; the
    /// renamed script is left on disk only for successful submissions.
    pub async fn submit(&self, request: &JobRequest) -> SubmitResult<String> {
        let payload = self.build_payload(request)?;
        let options = &request.scheduler;

        let script = render_script(options, &payload);
        debug!(job_name = %options.job_name, "rendered job script:\n{script}");

        let temp_path = self
            .work_dir
            .join(format!("{}_temp.pbs", options.job_name));
        fs::write(&temp_path, &script).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o777)).await?;
        }

        let output = match self.run_submit_command(&temp_path).await {
            Ok(output) => output,
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e);
            }
        };

        let job_id = match parse_job_id(&self.command, &output) {
            Ok(id) => id,
            Err(e) => {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e);
            }
        };

        let final_path = self
            .work_dir
            .join(format!("{}.p{}", options.job_name, job_id));
        fs::rename(&temp_path, &final_path).await?;

        info!(
            job_name = %options.job_name,
            job_id = %job_id,
            script = %final_path.display(),
            "submitted job"
        );
        Ok(job_id)
    }

    /// Validate the request and build the script payload.
    fn build_payload(&self, request: &JobRequest) -> SubmitResult<JobPayload> {
        if request.module_name.is_none() && request.job_string.is_none() {
            return Err(SubmitError::Config(
                "one of module_name and job_string must be specified".to_string(),
            ));
        }
        if request.scheduler.job_name.is_empty() {
            return Err(SubmitError::Config("job name must not be empty".to_string()));
        }
        if request.scheduler.walltime.is_empty() {
            return Err(SubmitError::Config("walltime must not be empty".to_string()));
        }

        if let Some(job_string) = &request.job_string {
            return Ok(JobPayload::Command(job_string.clone()));
        }

        // Checked above: module_name is present when job_string is not.
        let Some(name) = request.module_name.clone() else {
            return Err(SubmitError::Config(
                "one of module_name and job_string must be specified".to_string(),
            ));
        };
        if request.flags.is_empty() {
            warn!(
                module = %name,
                "flag map is empty, no option flags will be appended to the job script"
            );
        }
        let option_string =
            render_option_string(&request.program, &request.flags, &request.list_delimiter);
        Ok(JobPayload::Module {
            name,
            option_string,
        })
    }

    /// Invoke the submission command on the script, returning its stdout.
    async fn run_submit_command(&self, script_path: &Path) -> SubmitResult<String> {
        if self.mock_mode {
            let job_id = self.mock_counter.fetch_add(1, Ordering::SeqCst);
            return Ok(format!("{job_id}.localhost\n"));
        }

        let output = Command::new(&self.command)
            .arg(script_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| SubmitError::CommandFailed {
                command: self.command.clone(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SubmitError::SubmitFailed(stderr.to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extract the job identifier from submission output.
///
/// The identifier is the token before the first `.` of the first line,
/// e.g. `12345` from `12345.clusterhead\n`.
fn parse_job_id(command: &str, output: &str) -> SubmitResult<String> {
    let first_line = output.lines().next().unwrap_or("").trim();
    let token = first_line.split('.').next().unwrap_or("");

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(SubmitError::CommandFailed {
            command: command.to_string(),
            message: format!("unexpected output: {first_line}"),
        });
    }

    Ok(token.to_string())
}
