//! PBS job script rendering.

use crate::options::SchedulerOptions;

/// What the job script runs once the scheduler starts it.
#[derive(Debug, Clone)]
pub enum JobPayload {
    /// A literal command string, emitted verbatim.
    Command(String),
    /// A generated invocation of a target module's entry point, with the
    /// rendered program-option string appended.
    Module {
        name: String,
        option_string: String,
    },
}

impl JobPayload {
    /// Label for the script's comment header: the module's base name, or
    /// the job name when running a literal command.
    fn label<'a>(&'a self, options: &'a SchedulerOptions) -> &'a str {
        match self {
            JobPayload::Module { name, .. } => base_name(name),
            JobPayload::Command(_) => &options.job_name,
        }
    }
}

/// Module name truncated at its first `.`.
fn base_name(module: &str) -> &str {
    module.split('.').next().unwrap_or(module)
}

/// Render a PBS job script.
///
/// Directive order is fixed: shell, name, walltime, environment
/// passthrough, nodes:ppn, optional pmem, queue, optional mail lines, then
/// the payload. The rendered string is never mutated afterwards.
pub fn render_script(options: &SchedulerOptions, payload: &JobPayload) -> String {
    let mut script = String::new();

    script.push_str("#!/bin/bash\n");
    script.push_str(&format!("##{} qsub script\n", payload.label(options)));
    script.push_str("#PBS -S /bin/sh\n");
    script.push_str(&format!("#PBS -N {}\n", options.job_name));
    script.push_str(&format!("#PBS -l walltime={}\n", options.walltime));
    script.push_str("#PBS -V\n");
    script.push_str(&format!(
        "#PBS -l nodes={}:ppn={}\n",
        options.nodes, options.ppn
    ));
    if let Some(pmem) = options.pmem_gb {
        script.push_str(&format!("#PBS -l pmem={}Gb\n", pmem as u64));
    }
    script.push_str(&format!("#PBS -q {}\n", options.queue));
    if let Some(ref email) = options.email {
        script.push_str(&format!("#PBS -M {}\n", email));
        script.push_str(&format!("#PBS -m {}\n", options.email_events));
    }

    match payload {
        JobPayload::Command(command) => {
            script.push_str(command);
            if !command.ends_with('\n') {
                script.push('\n');
            }
        }
        JobPayload::Module {
            name,
            option_string,
        } => {
            if options.mpi {
                script.push_str(&format!("mpirun -n {} ", options.process_count()));
            }
            let module = base_name(name);
            script.push_str(&format!(
                "python -c \"import {module}; {module}.__run__()\" {option_string}\n"
            ));
        }
    }

    script
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_options() -> SchedulerOptions {
        SchedulerOptions::new("foo")
    }

    #[test]
    fn test_directive_order() {
        let script = render_script(
            &test_options(),
            &JobPayload::Module {
                name: "foo".to_string(),
                option_string: String::new(),
            },
        );

        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines[0], "#!/bin/bash");
        assert_eq!(lines[1], "##foo qsub script");
        assert_eq!(lines[2], "#PBS -S /bin/sh");
        assert_eq!(lines[3], "#PBS -N foo");
        assert_eq!(lines[4], "#PBS -l walltime=24:00:00");
        assert_eq!(lines[5], "#PBS -V");
        assert_eq!(lines[6], "#PBS -l nodes=1:ppn=8");
        assert_eq!(lines[7], "#PBS -l pmem=1Gb");
        assert_eq!(lines[8], "#PBS -q auto");
    }

    #[test]
    fn test_module_invocation() {
        let script = render_script(
            &test_options(),
            &JobPayload::Module {
                name: "foo.bar".to_string(),
                option_string: "--files=a,b".to_string(),
            },
        );

        assert!(script.contains("python -c \"import foo; foo.__run__()\" --files=a,b"));
        assert!(script.contains("##foo qsub script"));
    }

    #[test]
    fn test_literal_command() {
        let script = render_script(
            &test_options(),
            &JobPayload::Command("./simulate --steps 100".to_string()),
        );

        assert!(script.ends_with("./simulate --steps 100\n"));
        assert!(!script.contains("python -c"));
    }

    #[test]
    fn test_memory_line() {
        let opts = test_options().with_pmem(Some(2.0));
        let script = render_script(&opts, &JobPayload::Command("true".to_string()));
        assert!(script.contains("#PBS -l pmem=2Gb\n"));

        let opts = test_options().with_pmem(None);
        let script = render_script(&opts, &JobPayload::Command("true".to_string()));
        assert!(!script.contains("pmem"));
    }

    #[test]
    fn test_email_lines() {
        let opts = test_options().with_email("user@example.org");
        let script = render_script(&opts, &JobPayload::Command("true".to_string()));
        assert!(script.contains("#PBS -M user@example.org\n"));
        assert!(script.contains("#PBS -m bae\n"));

        let script = render_script(&test_options(), &JobPayload::Command("true".to_string()));
        assert!(!script.contains("#PBS -M"));
        assert!(!script.contains("#PBS -m "));
    }

    #[test]
    fn test_mpi_wrapper() {
        let opts = test_options().with_nodes(2).with_ppn(4).with_mpi(true);
        let script = render_script(
            &opts,
            &JobPayload::Module {
                name: "foo".to_string(),
                option_string: String::new(),
            },
        );
        assert!(script.contains("mpirun -n 8 python -c"));

        let opts = opts.with_np(3);
        let script = render_script(
            &opts,
            &JobPayload::Module {
                name: "foo".to_string(),
                option_string: String::new(),
            },
        );
        assert!(script.contains("mpirun -n 3 python -c"));
    }

    #[test]
    fn test_mpi_ignored_for_literal_command() {
        let opts = test_options().with_mpi(true);
        let script = render_script(&opts, &JobPayload::Command("./run".to_string()));
        assert!(!script.contains("mpirun"));
    }

    #[test]
    fn test_resource_line() {
        let opts = test_options().with_nodes(3).with_ppn(12);
        let script = render_script(&opts, &JobPayload::Command("true".to_string()));
        assert!(script.contains("#PBS -l nodes=3:ppn=12\n"));
    }
}
