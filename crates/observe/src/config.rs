use tracing::Level;

/// How log events are filtered, formatted and where they are written to.
#[derive(Debug, Clone)]
pub struct Config {
    /// Filter directives, see
    /// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
    pub(crate) env_filter: String,
    /// Events at this level or more severe go to stderr, the rest to stdout.
    pub(crate) stderr_threshold: Level,
    pub(crate) use_json_format: bool,
}

impl Config {
    pub fn new(env_filter: &str, stderr_threshold: Level, use_json_format: bool) -> Self {
        Self {
            env_filter: env_filter.into(),
            stderr_threshold,
            use_json_format,
        }
    }

    pub fn with_env_filter(mut self, env_filter: &str) -> Self {
        self.env_filter = env_filter.to_string();
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("info", Level::ERROR, false)
    }
}
