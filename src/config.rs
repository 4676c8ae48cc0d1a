use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// CSV input file; an argv path overrides this.
    #[serde(default = "default_input_path")]
    pub input_path: String,
    /// Poll interval while waiting for the ingest queue to drain.
    #[serde(default = "default_queue_poll_ms")]
    pub queue_poll_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregatorConfig {
    /// How long reset() waits for the old aggregator to exit before
    /// continuing anyway.
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_input_path() -> String {
    "./input.csv".into()
}

fn default_queue_poll_ms() -> u64 {
    10
}

fn default_shutdown_timeout_secs() -> u64 {
    5
}

impl Default for IngestConfig {
    fn default() -> Self {
        IngestConfig {
            input_path: default_input_path(),
            queue_poll_ms: default_queue_poll_ms(),
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        AggregatorConfig {
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

impl AppConfig {
    /// Loads from $CONFIG_FILE or ./config.toml; a missing file yields the
    /// defaults, any other read or parse failure is an error.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        match std::fs::read_to_string(&path) {
            Ok(s) => Self::load_from_str(&s),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow::anyhow!("cannot read config file {}: {}", path, e)),
        }
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            !self.ingest.input_path.is_empty(),
            "ingest.input_path must be non-empty"
        );
        anyhow::ensure!(
            self.ingest.queue_poll_ms > 0,
            "ingest.queue_poll_ms must be > 0, got {}",
            self.ingest.queue_poll_ms
        );
        anyhow::ensure!(
            self.aggregator.shutdown_timeout_secs > 0,
            "aggregator.shutdown_timeout_secs must be > 0, got {}",
            self.aggregator.shutdown_timeout_secs
        );
        Ok(())
    }
}
