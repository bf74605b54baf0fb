use anyhow::Context;
use subseq_eval::config::{ExperimentConfig, CONFIG_ENV};
use subseq_eval::evaluation::Runner;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ExperimentConfig::load()
        .with_context(|| format!("loading configuration (set {CONFIG_ENV} to a JSON file)"))?;
    info!(
        input_dir = %config.input_dir.display(),
        results = %config.results_path.display(),
        window_sizes = ?config.window_sizes,
        methods = ?config.methods,
        profile = ?config.profile,
        workers = config.workers,
        "configuration loaded"
    );

    let runner = Runner::new(config).context("invalid configuration")?;
    let summary = runner.run().context("evaluation run failed")?;

    for (series, error) in &summary.failed {
        warn!(series = %series, error = %error, "not evaluated");
    }
    info!(
        processed = summary.processed.len(),
        failed = summary.failed.len(),
        "done"
    );
    Ok(())
}
