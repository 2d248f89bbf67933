//! Option model: scheduler options, program options, and flag rendering.

/// A single program-option value.
///
/// Closed set of the value shapes a wrapped program can receive. Each
/// variant has its own rendering rule in [`render_option_string`].
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    /// Plain string value.
    Str(String),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Flag-style value: `true` emits the bare flag, `false` emits nothing.
    Bool(bool),
    /// Ordered list of strings, joined with the list delimiter.
    List(Vec<String>),
}

impl OptionValue {
    /// Render the value alone, without a flag.
    fn render_bare(&self, delimiter: &str) -> String {
        match self {
            OptionValue::Str(s) => s.clone(),
            OptionValue::Int(i) => i.to_string(),
            OptionValue::Float(f) => f.to_string(),
            OptionValue::Bool(b) => b.to_string(),
            OptionValue::List(items) => items.join(delimiter),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<i64> for OptionValue {
    fn from(i: i64) -> Self {
        OptionValue::Int(i)
    }
}

impl From<f64> for OptionValue {
    fn from(f: f64) -> Self {
        OptionValue::Float(f)
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(items: Vec<String>) -> Self {
        OptionValue::List(items)
    }
}

/// Insertion-ordered program options.
///
/// Keys are free-form and belong to the wrapped program, never to the
/// scheduler (scheduler options live in [`SchedulerOptions`]). Iteration
/// order is insertion order, so rendered output is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ProgramOptions {
    entries: Vec<(String, OptionValue)>,
}

impl ProgramOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option, replacing any previous value for the same key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self
    }

    /// Look up an option by key.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Insertion-ordered mapping from option key to its command-line flag.
///
/// An empty flag string means the value itself is emitted positionally.
/// Keys with no entry here are skipped when rendering the option string.
#[derive(Debug, Clone, Default)]
pub struct FlagMap {
    entries: Vec<(String, String)>,
}

impl FlagMap {
    /// Create an empty flag map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Map an option key to its long-form flag (or `""` for positional).
    pub fn insert(&mut self, key: impl Into<String>, flag: impl Into<String>) -> &mut Self {
        let key = key.into();
        let flag = flag.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = flag;
        } else {
            self.entries.push((key, flag));
        }
        self
    }

    /// Look up the flag spelling for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, f)| f.as_str())
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, f)| (k.as_str(), f.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, F: Into<String>> FromIterator<(K, F)> for FlagMap {
    fn from_iter<T: IntoIterator<Item = (K, F)>>(iter: T) -> Self {
        let mut map = FlagMap::new();
        for (k, f) in iter {
            map.insert(k, f);
        }
        map
    }
}

/// Render the program-option string for a job script.
///
/// Walks the flag map in order; keys absent from `options` are skipped.
/// - empty flag: the value alone, positionally
/// - `Bool(true)`: the bare flag; `Bool(false)`: nothing
/// - `List`: `flag=a<delimiter>b`
/// - other scalars: `flag=value`
///
/// Tokens are joined with single spaces.
pub fn render_option_string(
    options: &ProgramOptions,
    flags: &FlagMap,
    delimiter: &str,
) -> String {
    let mut tokens = Vec::new();
    for (key, flag) in flags.iter() {
        let Some(value) = options.get(key) else {
            continue;
        };
        if flag.is_empty() {
            tokens.push(value.render_bare(delimiter));
            continue;
        }
        match value {
            OptionValue::Bool(true) => tokens.push(flag.to_string()),
            OptionValue::Bool(false) => {}
            other => tokens.push(format!("{}={}", flag, other.render_bare(delimiter))),
        }
    }
    tokens.join(" ")
}

/// Caller-supplied defaults for the scheduler option group.
#[derive(Debug, Clone)]
pub struct SubmitDefaults {
    /// Number of nodes (`#PBS -l nodes`).
    pub nodes: u32,
    /// Processors per node (`#PBS -l ppn`).
    pub ppn: u32,
    /// Physical memory per node in Gb (`#PBS -l pmem`).
    pub pmem_gb: f64,
    /// Maximum wall time, HH:MM:SS (`#PBS -l walltime`).
    pub walltime: String,
    /// Queue name (`#PBS -q`).
    pub queue: String,
}

impl Default for SubmitDefaults {
    fn default() -> Self {
        Self {
            nodes: 1,
            ppn: 8,
            pmem_gb: 1.0,
            walltime: "24:00:00".to_string(),
            queue: "auto".to_string(),
        }
    }
}

/// Resolved scheduler options for one submission.
///
/// Explicit record separating scheduler options from program options, so
/// nothing is filtered by key prefix at render time.
#[derive(Debug, Clone)]
pub struct SchedulerOptions {
    /// Whether the caller asked for cluster submission (`-q/--qsub`).
    pub submit: bool,
    /// Job name and output script file prefix (`#PBS -N`).
    pub job_name: String,
    /// Wall time string, HH:MM:SS; not validated beyond non-emptiness.
    pub walltime: String,
    /// Number of nodes.
    pub nodes: u32,
    /// Processors per node.
    pub ppn: u32,
    /// Physical memory per node in Gb; `None` omits the memory directive.
    pub pmem_gb: Option<f64>,
    /// Queue name.
    pub queue: String,
    /// Notification address; `None` omits the mail directives.
    pub email: Option<String>,
    /// PBS mail events (begin/abort/end); only emitted with `email`.
    pub email_events: String,
    /// Prefix the generated invocation with an mpirun wrapper.
    pub mpi: bool,
    /// Explicit MPI process count; defaults to `nodes * ppn`.
    pub np: Option<u32>,
}

impl SchedulerOptions {
    /// Create options for `job_name` with the stock defaults.
    pub fn new(job_name: impl Into<String>) -> Self {
        Self::with_defaults(job_name, &SubmitDefaults::default())
    }

    /// Create options for `job_name` from caller-supplied defaults.
    pub fn with_defaults(job_name: impl Into<String>, defaults: &SubmitDefaults) -> Self {
        Self {
            submit: false,
            job_name: job_name.into(),
            walltime: defaults.walltime.clone(),
            nodes: defaults.nodes,
            ppn: defaults.ppn,
            pmem_gb: Some(defaults.pmem_gb),
            queue: defaults.queue.clone(),
            email: None,
            email_events: "bae".to_string(),
            mpi: false,
            np: None,
        }
    }

    /// Set the node count.
    pub fn with_nodes(mut self, nodes: u32) -> Self {
        self.nodes = nodes;
        self
    }

    /// Set the processors-per-node count.
    pub fn with_ppn(mut self, ppn: u32) -> Self {
        self.ppn = ppn;
        self
    }

    /// Set the per-node memory in Gb; `None` drops the memory directive.
    pub fn with_pmem(mut self, pmem_gb: Option<f64>) -> Self {
        self.pmem_gb = pmem_gb;
        self
    }

    /// Set the wall time string.
    pub fn with_walltime(mut self, walltime: impl Into<String>) -> Self {
        self.walltime = walltime.into();
        self
    }

    /// Set the queue name.
    pub fn with_queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = queue.into();
        self
    }

    /// Set the notification address.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Enable the mpirun wrapper for generated invocations.
    pub fn with_mpi(mut self, mpi: bool) -> Self {
        self.mpi = mpi;
        self
    }

    /// Override the MPI process count.
    pub fn with_np(mut self, np: u32) -> Self {
        self.np = Some(np);
        self
    }

    /// Effective MPI process count: explicit override or `nodes * ppn`.
    pub fn process_count(&self) -> u32 {
        self.np.unwrap_or(self.nodes * self.ppn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_scalar_options() {
        let mut options = ProgramOptions::new();
        options.set("threshold", 0.5).set("count", 3i64).set("label", "run1");

        let flags: FlagMap = [
            ("threshold", "--threshold"),
            ("count", "--count"),
            ("label", "--label"),
        ]
        .into_iter()
        .collect();

        let rendered = render_option_string(&options, &flags, ",");
        assert_eq!(rendered, "--threshold=0.5 --count=3 --label=run1");
    }

    #[test]
    fn test_render_bool_options() {
        let mut options = ProgramOptions::new();
        options.set("verbose", true).set("quiet", false);

        let flags: FlagMap = [("verbose", "--verbose"), ("quiet", "--quiet")]
            .into_iter()
            .collect();

        let rendered = render_option_string(&options, &flags, ",");
        assert_eq!(rendered, "--verbose");
    }

    #[test]
    fn test_render_list_option() {
        let mut options = ProgramOptions::new();
        options.set("files", vec!["a".to_string(), "b".to_string()]);

        let flags: FlagMap = [("files", "--files")].into_iter().collect();

        assert_eq!(render_option_string(&options, &flags, ","), "--files=a,b");
        assert_eq!(render_option_string(&options, &flags, ":"), "--files=a:b");
    }

    #[test]
    fn test_render_positional_option() {
        let mut options = ProgramOptions::new();
        options.set("extra", "input.dat output.dat");

        let flags: FlagMap = [("extra", "")].into_iter().collect();

        assert_eq!(
            render_option_string(&options, &flags, ","),
            "input.dat output.dat"
        );
    }

    #[test]
    fn test_render_skips_unmapped_keys() {
        let mut options = ProgramOptions::new();
        options.set("kept", "x").set("dropped", "y");

        let flags: FlagMap = [("kept", "--kept")].into_iter().collect();

        assert_eq!(render_option_string(&options, &flags, ","), "--kept=x");
    }

    #[test]
    fn test_render_follows_flag_map_order() {
        let mut options = ProgramOptions::new();
        options.set("b", "2").set("a", "1");

        let flags: FlagMap = [("a", "--a"), ("b", "--b")].into_iter().collect();

        assert_eq!(render_option_string(&options, &flags, ","), "--a=1 --b=2");
    }

    #[test]
    fn test_render_one_token_per_mapped_key() {
        let mut options = ProgramOptions::new();
        options.set("x", "1").set("y", "2").set("z", true);

        let flags: FlagMap = [("x", "--x"), ("y", "--y"), ("z", "--z")]
            .into_iter()
            .collect();

        let rendered = render_option_string(&options, &flags, ",");
        assert_eq!(rendered.split(' ').count(), 3);
    }

    #[test]
    fn test_program_options_replace() {
        let mut options = ProgramOptions::new();
        options.set("key", "first").set("key", "second");
        assert_eq!(options.len(), 1);
        assert_eq!(options.get("key"), Some(&OptionValue::Str("second".into())));
    }

    #[test]
    fn test_submit_defaults() {
        let defaults = SubmitDefaults::default();
        assert_eq!(defaults.nodes, 1);
        assert_eq!(defaults.ppn, 8);
        assert_eq!(defaults.pmem_gb, 1.0);
        assert_eq!(defaults.walltime, "24:00:00");
        assert_eq!(defaults.queue, "auto");
    }

    #[test]
    fn test_scheduler_options_builder() {
        let opts = SchedulerOptions::new("myjob")
            .with_nodes(4)
            .with_ppn(16)
            .with_pmem(Some(2.0))
            .with_walltime("01:30:00")
            .with_queue("debug")
            .with_email("user@example.org");

        assert_eq!(opts.job_name, "myjob");
        assert_eq!(opts.nodes, 4);
        assert_eq!(opts.ppn, 16);
        assert_eq!(opts.pmem_gb, Some(2.0));
        assert_eq!(opts.walltime, "01:30:00");
        assert_eq!(opts.queue, "debug");
        assert_eq!(opts.email.as_deref(), Some("user@example.org"));
        assert_eq!(opts.email_events, "bae");
    }

    #[test]
    fn test_process_count() {
        let opts = SchedulerOptions::new("j").with_nodes(2).with_ppn(8);
        assert_eq!(opts.process_count(), 16);

        let opts = opts.with_np(4);
        assert_eq!(opts.process_count(), 4);
    }
}
