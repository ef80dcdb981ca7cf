//! Generate command - one batch from local CSV files

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::domain::{BatchOutcome, CancelSignal, ClientLimit};
use crate::infrastructure::batch::{BatchOrchestrator, BatchRequest, LogProgress};
use crate::infrastructure::cache::{open_geocode_cache, GeocodeCacheConfig};
use crate::infrastructure::geocoding::{
    GeocodingClient, GeocodingProviderFactory, GeocodingProviderKind,
};
use crate::infrastructure::logging::init_logging;
use crate::infrastructure::render::{HtmlMailerRenderer, MailerAssets};

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Client list CSV
    #[arg(long)]
    pub clients: PathBuf,

    /// Recently sold homes CSV
    #[arg(long)]
    pub sold: PathBuf,

    /// Output directory (defaults to mailer.output_dir)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Sales listed per mailer
    #[arg(long)]
    pub num_nearby: Option<usize>,

    /// "all" or the number of client rows to process
    #[arg(long, default_value = "all")]
    pub num_clients: String,

    #[arg(long)]
    pub provider: Option<GeocodingProviderKind>,

    /// Overrides geocoding.api_key and the provider's environment variable
    #[arg(long)]
    pub api_key: Option<String>,

    /// Keep geocode results in memory only
    #[arg(long)]
    pub no_cache: bool,

    #[arg(long)]
    pub top_banner: Option<PathBuf>,

    #[arg(long)]
    pub bottom_banner: Option<PathBuf>,

    #[arg(long)]
    pub right_side_image: Option<PathBuf>,
}

/// Run one batch in the foreground and print a summary
pub async fn run(args: GenerateArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load()?;
    init_logging(&config.logging);

    if let Some(provider) = args.provider {
        config.geocoding.provider = provider;
    }

    let provider =
        GeocodingProviderFactory::create(&config.geocoding.provider_settings(args.api_key.as_deref()))?;

    let cache_config = if args.no_cache {
        GeocodeCacheConfig::InMemory
    } else {
        config.geocoding.cache_config()
    };
    let cache = open_geocode_cache(&cache_config).await;

    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.mailer.output_dir.clone());
    let assets = MailerAssets::load(
        args.top_banner.as_deref(),
        args.bottom_banner.as_deref(),
        args.right_side_image.as_deref(),
    )
    .await?;
    let renderer = HtmlMailerRenderer::new(output_dir.clone())
        .with_brand(config.mailer.brand.clone())
        .with_assets(assets);

    let geocoder = GeocodingClient::new(provider, cache.clone())
        .with_key_format(config.geocoding.key_format());

    let cancel = CancelSignal::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current row");
            on_interrupt.cancel();
        }
    });

    let orchestrator = BatchOrchestrator::new(Arc::new(geocoder), Arc::new(renderer))
        .with_progress(Arc::new(LogProgress::new()))
        .with_cancel(cancel);

    let mut options = config.mailer.batch_options();
    options.client_limit = ClientLimit::parse(&args.num_clients);
    if let Some(num_nearby) = args.num_nearby {
        options.num_nearby = num_nearby;
    }

    let request = BatchRequest {
        clients_csv: args.clients,
        sold_csv: args.sold,
        output_dir,
        options,
    };

    let result = orchestrator.run_files(&request).await;

    if let Err(e) = cache.flush().await {
        warn!(error = %e, "Failed to flush geocode cache");
    }

    let outcome = result?;
    info!(rendered = outcome.rendered_count(), "Generation finished");
    println!("{}", summary(&outcome));

    Ok(())
}

fn summary(outcome: &BatchOutcome) -> String {
    let mut lines = vec![format!(
        "Generated {} mailers ({} clients, {} sold homes, {} cached / {} fetched lookups)",
        outcome.rendered_count(),
        outcome.stats.clients,
        outcome.stats.sold,
        outcome.stats.cache_hits,
        outcome.stats.fetched,
    )];

    if let Some(merged) = &outcome.merged {
        lines.push(format!("Merged: {}", merged.display()));
    }
    if let Some(report) = &outcome.skip_report {
        lines.push(format!(
            "Skipped {} addresses, see {}",
            outcome.skipped_count(),
            report.display()
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::batch::BatchStats;

    #[test]
    fn test_summary_lists_outputs() {
        let outcome = BatchOutcome {
            merged: Some(PathBuf::from("output/final_mailers.html")),
            skip_report: Some(PathBuf::from("output/skipped_addresses.csv")),
            stats: BatchStats {
                clients: 2,
                sold: 5,
                cache_hits: 3,
                fetched: 4,
            },
            ..BatchOutcome::default()
        };

        let text = summary(&outcome);
        assert!(text.starts_with("Generated 0 mailers (2 clients, 5 sold homes, 3 cached / 4 fetched lookups)"));
        assert!(text.contains("Merged: output/final_mailers.html"));
        assert!(text.contains("Skipped 0 addresses, see output/skipped_addresses.csv"));
    }

    #[test]
    fn test_summary_without_outputs() {
        let text = summary(&BatchOutcome::default());
        assert_eq!(text.lines().count(), 1);
    }
}
