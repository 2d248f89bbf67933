//! pbsub command-line interface
//!
//! Standalone dispatcher for submitting a command string or a target module
//! to a PBS cluster via qsub.

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use console::style;
use tracing_subscriber::EnvFilter;

use pbsub::{
    FlagMap, JobRequest, ProgramOptions, SubmitDefaults, Submitter, cluster_args,
    options_from_matches,
};

/// Build the pbsub command, cluster option group included.
fn build_cli(defaults: &SubmitDefaults) -> Command {
    let cmd = Command::new("pbsub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Submit a job string or module to a cluster environment using qsub/PBS")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase verbosity (-v, -vv, -vvv)"),
        )
        .arg(
            Arg::new("job_string")
                .short('j')
                .long("job-string")
                .value_name("COMMAND")
                .help("Command string to submit to the cluster"),
        )
        .arg(
            Arg::new("module_name")
                .short('m')
                .long("module-name")
                .value_name("NAME")
                .help("Module name to submit to the cluster"),
        )
        .arg(
            Arg::new("args")
                .value_name("ARGS")
                .num_args(0..)
                .last(true)
                .allow_hyphen_values(true)
                .help("Extra arguments appended verbatim to the job invocation"),
        );
    cluster_args(cmd, "pbsub", defaults)
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let job_string = matches.get_one::<String>("job_string").cloned();
    let module_name = matches.get_one::<String>("module_name").cloned();
    if job_string.is_none() && module_name.is_none() {
        anyhow::bail!("one of --job-string and --module-name must be specified");
    }

    let mut scheduler = options_from_matches(matches);
    scheduler.submit = true;

    // A module name doubles as the job name unless --name was given.
    if let Some(ref module) = module_name {
        if matches.value_source("qsub_name") == Some(ValueSource::DefaultValue) {
            scheduler.job_name = module.clone();
        }
    }

    let mut request = JobRequest::new(scheduler);
    if let Some(job_string) = job_string {
        request = request.with_command(job_string);
    }
    if let Some(module) = module_name {
        request = request.with_module(module);
    }

    // Forward everything after `--` into the invocation, unflagged.
    if let Some(extra) = matches.get_many::<String>("args") {
        let extra: Vec<String> = extra.cloned().collect();
        if !extra.is_empty() {
            let mut program = ProgramOptions::new();
            program.set("extra", extra.join(" "));
            let mut flags = FlagMap::new();
            flags.insert("extra", "");
            request = request.with_program(program, flags);
        }
    }

    let job_name = request.scheduler.job_name.clone();
    println!(
        "{} Submitting {} via {}",
        style("→").cyan().bold(),
        style(&job_name).green(),
        style("qsub").magenta()
    );

    let job_id = Submitter::new().submit(&request).await?;

    println!(
        "{} Submitted job: {}",
        style("✓").green().bold(),
        style(&job_id).cyan()
    );
    println!(
        "  Script saved as: {}",
        style(format!("{job_name}.p{job_id}")).dim()
    );

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let defaults = SubmitDefaults::default();
    let matches = build_cli(&defaults).get_matches();

    // Setup logging
    let filter = match matches.get_count("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    if let Err(e) = run(&matches).await {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
