//! PBS/qsub cluster submission for command-line programs
//!
//! This crate lets a command-line program declare itself "cluster
//! submittable": it registers a standard group of scheduler options on an
//! existing `clap` command, renders those options plus the program's own
//! invocation into a PBS job script, hands the script to `qsub`, and keeps
//! the script on disk renamed with the assigned job id.
//!
//! # Overview
//!
//! There are two parts:
//! 1. [`cluster_args`], which registers the cluster option group
//!    (`-q/--qsub`, `--nodes`, `--ppn`, `--pmem`, `--walltime`, `--queue`,
//!    `--name`, `--email`, `--emailoptions`) on a `clap::Command`, and
//!    [`options_from_matches`], which resolves the parsed group.
//! 2. [`Submitter`], which renders the job script from a [`JobRequest`],
//!    submits it via `qsub`, and renames the script file to
//!    `<job-name>.p<job-id>`.
//!
//! # Example
//!
//! ```ignore
//! use clap::Command;
//! use pbsub::{
//!     cluster_args, flag_map_from_command, options_from_matches, JobRequest, SubmitDefaults,
//!     Submitter,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let defaults = SubmitDefaults::default();
//!     let cmd = cluster_args(Command::new("mytool"), "mytool", &defaults);
//!     let flags = flag_map_from_command(&cmd);
//!     let matches = cmd.get_matches();
//!
//!     let scheduler = options_from_matches(&matches);
//!     if scheduler.submit {
//!         let request = JobRequest::new(scheduler).with_module("mytool");
//!         let job_id = Submitter::new().submit(&request).await?;
//!         println!("Submitted: {}", job_id);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Programs that are not modules can submit a literal command string
//! instead:
//!
//! ```ignore
//! let request = JobRequest::new(scheduler).with_command("./simulate --steps 100");
//! ```

pub mod error;
pub mod options;
pub mod path;
pub mod registrar;
pub mod script;
pub mod submit;

// Re-exports
pub use error::{SubmitError, SubmitResult};
pub use options::{
    FlagMap, OptionValue, ProgramOptions, SchedulerOptions, SubmitDefaults, render_option_string,
};
pub use path::{PathArg, normalize};
pub use registrar::{cluster_args, flag_map_from_command, options_from_matches};
pub use script::{JobPayload, render_script};
pub use submit::{JobRequest, Submitter};
