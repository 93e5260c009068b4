//! Prints the embedding cost of indexing a reference corpus.
//!
//! ```text
//! payband-estimate <corpus-size> [--json]
//! ```

use anyhow::{Context, bail};

use payband::config::Config;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut corpus_size = None;
    let mut json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "-h" | "--help" => {
                println!("usage: payband-estimate <corpus-size> [--json]");
                return Ok(());
            }
            value if corpus_size.is_none() => {
                corpus_size = Some(
                    value
                        .replace('_', "")
                        .parse::<usize>()
                        .with_context(|| format!("invalid corpus size '{value}'"))?,
                );
            }
            other => bail!("unexpected argument '{other}'"),
        }
    }
    let Some(corpus_size) = corpus_size else {
        bail!("usage: payband-estimate <corpus-size> [--json]");
    };

    let config = Config::from_env()?;
    config.validate()?;

    let estimate = config.cost.estimate(corpus_size);
    tracing::info!(
        corpus_size,
        tokens_per_job = config.cost.tokens_per_job,
        usd_per_million_tokens = config.cost.usd_per_million_tokens,
        "Estimated corpus embedding cost"
    );

    if json {
        println!("{}", serde_json::to_string(&estimate)?);
    } else {
        println!(
            "{corpus_size} reference jobs: {} tokens, ${:.4}",
            estimate.tokens, estimate.usd
        );
    }
    Ok(())
}
