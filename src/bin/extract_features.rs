use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use hnfeat::{extract_features, init_logging, parse_summary_arg, FeatureConfig, FeatureEnvelope};

/// Extract a float32 feature row from a post's score, comment count and summary.
#[derive(Debug, Parser)]
#[command(name = "extract_features", version, about)]
struct Cli {
    /// Post score.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    points: i64,

    /// Number of comments.
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    comments: i64,

    /// Summary object as JSON (`articleType`, `contentSummary`, `keywords`).
    /// Text that is not valid JSON is treated as `{}`.
    #[arg(long, default_value = "{}")]
    summary: String,

    /// Config file (TOML, YAML or JSON). Defaults to `hnfeat.*` in the working directory.
    #[arg(long, env = "HNFEAT_CONFIG")]
    config: Option<PathBuf>,

    /// Raise log verbosity (repeatable). Logs go to stderr.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let summary = parse_summary_arg(&cli.summary);

    let envelope = match FeatureConfig::load(cli.config.as_deref()) {
        Ok(cfg) => {
            init_logging(&cfg.log_level, cli.verbose, cfg.log_json);
            extract_features(&cfg, cli.points, cli.comments, &summary)
        }
        Err(err) => {
            init_logging("warn", cli.verbose, false);
            tracing::warn!(error = %err, "config_load_failure");
            FeatureEnvelope::from_error(&err)
        }
    };

    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, &envelope)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}
