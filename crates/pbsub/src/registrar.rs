//! Scheduler option registration against a `clap` command.
//!
//! Mirrors the parser-group convention: a host program hands its
//! `clap::Command` to [`cluster_args`] and gets it back with the standard
//! cluster flags registered under a "Cluster" help heading. After parsing,
//! [`options_from_matches`] resolves the group into [`SchedulerOptions`].

use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};

use crate::options::{FlagMap, SchedulerOptions, SubmitDefaults};

/// Register the cluster option group on `cmd`.
///
/// All options are optional with defaults; registration cannot fail.
/// `program` is used for help text and the default job name.
pub fn cluster_args(cmd: Command, program: &str, defaults: &SubmitDefaults) -> Command {
    cmd.arg(
        Arg::new("qsub")
            .short('q')
            .long("qsub")
            .alias("pbs")
            .action(ArgAction::SetTrue)
            .help(format!("Flag to set {program} to submit to cluster"))
            .help_heading("Cluster"),
    )
    .arg(
        Arg::new("qsub_nodes")
            .long("nodes")
            .value_name("N")
            .value_parser(value_parser!(u32).range(1..))
            .default_value(defaults.nodes.to_string())
            .help(format!(
                "Set number of nodes to use for job submission. [default={}]",
                defaults.nodes
            ))
            .help_heading("Cluster"),
    )
    .arg(
        Arg::new("qsub_ppn")
            .long("ppn")
            .value_name("N")
            .value_parser(value_parser!(u32).range(1..))
            .default_value(defaults.ppn.to_string())
            .help(format!(
                "Set ppn to use for job submission. [default={}]",
                defaults.ppn
            ))
            .help_heading("Cluster"),
    )
    .arg(
        Arg::new("qsub_pmem")
            .long("pmem")
            .value_name("GB")
            .value_parser(value_parser!(f64))
            .default_value(defaults.pmem_gb.to_string())
            .help(format!(
                "Set pmem (Gb) to use for job submission, 0 to omit. [default={}Gb]",
                defaults.pmem_gb
            ))
            .help_heading("Cluster"),
    )
    .arg(
        Arg::new("qsub_email")
            .long("email")
            .value_name("ADDRESS")
            .help("Set user email address for PBS notifications")
            .help_heading("Cluster"),
    )
    .arg(
        Arg::new("qsub_emailoptions")
            .long("emailoptions")
            .value_name("EVENTS")
            .default_value("bae")
            .help("Set PBS -m mail options. Requires --email. [default=bae]")
            .help_heading("Cluster"),
    )
    .arg(
        Arg::new("qsub_name")
            .long("name")
            .value_name("NAME")
            .default_value(program.to_string())
            .help(format!("Set PBS -N job name. [default={program}]"))
            .help_heading("Cluster"),
    )
    .arg(
        Arg::new("qsub_walltime")
            .long("walltime")
            .value_name("HH:MM:SS")
            .default_value(defaults.walltime.clone())
            .help(format!(
                "Set PBS maximum wall time, of the form HH:MM:SS. [default={}]",
                defaults.walltime
            ))
            .help_heading("Cluster"),
    )
    .arg(
        Arg::new("qsub_queue")
            .long("queue")
            .value_name("QUEUE")
            .default_value(defaults.queue.clone())
            .help(format!("Set PBS -q queue. [default={}]", defaults.queue))
            .help_heading("Cluster"),
    )
}

/// Resolve the cluster option group from parsed matches.
///
/// A `--pmem` of 0 (or below) drops the memory directive entirely.
pub fn options_from_matches(matches: &ArgMatches) -> SchedulerOptions {
    let stock = SubmitDefaults::default();

    SchedulerOptions {
        submit: matches.get_flag("qsub"),
        job_name: matches
            .get_one::<String>("qsub_name")
            .cloned()
            .unwrap_or_default(),
        walltime: matches
            .get_one::<String>("qsub_walltime")
            .cloned()
            .unwrap_or(stock.walltime),
        nodes: matches
            .get_one::<u32>("qsub_nodes")
            .copied()
            .unwrap_or(stock.nodes),
        ppn: matches
            .get_one::<u32>("qsub_ppn")
            .copied()
            .unwrap_or(stock.ppn),
        pmem_gb: matches
            .get_one::<f64>("qsub_pmem")
            .copied()
            .filter(|pmem| *pmem > 0.0),
        queue: matches
            .get_one::<String>("qsub_queue")
            .cloned()
            .unwrap_or(stock.queue),
        email: matches.get_one::<String>("qsub_email").cloned(),
        email_events: matches
            .get_one::<String>("qsub_emailoptions")
            .cloned()
            .unwrap_or_else(|| "bae".to_string()),
        mpi: false,
        np: None,
    }
}

/// Derive a flag map from a `clap` command.
///
/// Maps each argument id to its long-form flag; arguments without a long
/// flag are skipped. This is the recipe host programs use to forward their
/// own options into a job script.
pub fn flag_map_from_command(cmd: &Command) -> FlagMap {
    let mut map = FlagMap::new();
    for arg in cmd.get_arguments() {
        if let Some(long) = arg.get_long() {
            map.insert(arg.get_id().as_str(), format!("--{long}"));
        }
    }
    map
}
