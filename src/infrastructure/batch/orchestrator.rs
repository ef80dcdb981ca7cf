use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use crate::domain::batch::{
    BatchOptions, BatchOutcome, BatchPhase, BatchStats, CancelSignal, ClientMatch, ListKind,
    NearbySale, NoopProgress, Progress, ProgressReporter, SkipRecord,
};
use crate::domain::{
    AddressRecord, Coordinate, DomainError, MailerDocument, MailerRenderer, ProximityMatcher,
};
use crate::infrastructure::geocoding::{GeocodingClient, Lookup};
use crate::infrastructure::observability::record_batch_run;
use crate::infrastructure::records::{load_address_records, write_skip_report};

/// Input files and output location of one run
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub clients_csv: PathBuf,
    pub sold_csv: PathBuf,
    pub output_dir: PathBuf,
    pub options: BatchOptions,
}

/// Step counter shared by every phase of a run
struct Steps<'a> {
    reporter: &'a dyn ProgressReporter,
    current: usize,
    total: usize,
}

impl Steps<'_> {
    fn report(&self, phase: BatchPhase, message: impl Into<String>) {
        self.reporter
            .report(Progress::new(phase, self.current, self.total, message));
    }

    fn advance(&mut self, phase: BatchPhase, message: impl Into<String>) {
        self.current = (self.current + 1).min(self.total);
        self.report(phase, message);
    }
}

/// Drives geocoding, matching, rendering and merging for one pair of lists
///
/// Per-row failures become skip records; only input errors, cancellation and
/// a failed merge end the run with an error.
#[derive(Clone)]
pub struct BatchOrchestrator {
    geocoder: Arc<GeocodingClient>,
    renderer: Arc<dyn MailerRenderer>,
    progress: Arc<dyn ProgressReporter>,
    cancel: CancelSignal,
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("geocoder", &self.geocoder)
            .field("renderer", &self.renderer)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl BatchOrchestrator {
    pub fn new(geocoder: Arc<GeocodingClient>, renderer: Arc<dyn MailerRenderer>) -> Self {
        Self {
            geocoder,
            renderer,
            progress: Arc::new(NoopProgress),
            cancel: CancelSignal::new(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Load both CSV files, run the batch and write the skip report
    #[instrument(skip(self, request), fields(output = %request.output_dir.display()))]
    pub async fn run_files(&self, request: &BatchRequest) -> Result<BatchOutcome, DomainError> {
        self.progress
            .report(Progress::new(BatchPhase::Loading, 0, 1, "Loading CSV data..."));

        let loaded = async {
            let clients = load_address_records(&request.clients_csv).await?;
            let sold = load_address_records(&request.sold_csv).await?;
            Ok::<_, DomainError>((clients, sold))
        }
        .await;

        let (clients, sold) = match loaded {
            Ok(lists) => lists,
            Err(e) => {
                record_batch_run("failed", std::time::Duration::ZERO);
                return Err(e);
            }
        };

        let mut outcome = self.run(clients, sold, &request.options).await?;
        outcome.skip_report = write_skip_report(&request.output_dir, &outcome.skipped).await?;
        Ok(outcome)
    }

    /// Run the pipeline over already-loaded rows
    pub async fn run(
        &self,
        clients: Vec<AddressRecord>,
        sold: Vec<AddressRecord>,
        options: &BatchOptions,
    ) -> Result<BatchOutcome, DomainError> {
        let started = Instant::now();
        let result = self.execute(clients, sold, options).await;

        let status = match &result {
            Ok(_) => "done",
            Err(DomainError::Cancelled) => "cancelled",
            Err(_) => "failed",
        };
        record_batch_run(status, started.elapsed());

        result
    }

    async fn execute(
        &self,
        clients: Vec<AddressRecord>,
        sold: Vec<AddressRecord>,
        options: &BatchOptions,
    ) -> Result<BatchOutcome, DomainError> {
        let clients: Vec<AddressRecord> = clients
            .into_iter()
            .filter(|record| !record.is_boilerplate())
            .collect();
        let clients = options.client_limit.apply(clients);
        let sold: Vec<AddressRecord> = sold
            .into_iter()
            .filter(|record| !record.is_boilerplate())
            .collect();

        let total_clients = clients.len();
        let total_sold = sold.len();
        let mut steps = Steps {
            reporter: self.progress.as_ref(),
            current: 0,
            total: total_clients + total_sold + total_clients + 1,
        };
        let mut stats = BatchStats {
            clients: total_clients,
            sold: total_sold,
            ..BatchStats::default()
        };
        let mut skipped = Vec::new();

        info!(
            clients = total_clients,
            sold = total_sold,
            client_limit = %options.client_limit,
            "Batch started"
        );

        let client_coords = self
            .geocode_list(&clients, ListKind::Client, &mut steps, &mut stats, &mut skipped)
            .await?;
        let sold_coords = self
            .geocode_list(&sold, ListKind::Sold, &mut steps, &mut stats, &mut skipped)
            .await?;

        let matcher = ProximityMatcher::new(options.num_nearby, options.min_distance_miles);
        let format = self.geocoder.key_format();
        let provider = self.geocoder.provider();
        let mut matched = Vec::new();
        let mut rendered = Vec::new();

        for (i, (client, coordinate)) in clients.iter().zip(&client_coords).enumerate() {
            self.ensure_not_cancelled()?;

            let Some(coordinate) = *coordinate else {
                steps.advance(
                    BatchPhase::Matching,
                    format!("Skipped client {}/{}", i + 1, total_clients),
                );
                continue;
            };

            let nearby: Vec<NearbySale> = matcher
                .nearest(coordinate, sold.iter().zip(sold_coords.iter().copied()))
                .into_iter()
                .map(|ranked| NearbySale {
                    record: ranked.item.clone(),
                    coordinate: ranked.coordinate,
                    distance_miles: ranked.distance_miles,
                })
                .collect();

            let client_match = ClientMatch {
                client: client.clone(),
                coordinate,
                nearby,
            };

            let markers: Vec<Coordinate> =
                client_match.nearby.iter().map(|sale| sale.coordinate).collect();
            let map_url = provider.static_map_url(coordinate, &markers);
            let document = MailerDocument::from_match(&client_match, format, map_url);

            match self.renderer.render(matched.len(), &document).await {
                Ok(mailer) => rendered.push(mailer),
                Err(e) => {
                    warn!(row = client.row, error = %e, "Mailer render failed");
                    skipped.push(SkipRecord::render_failed(
                        format.key_for(client),
                        client.row,
                        e.to_string(),
                    ));
                }
            }
            matched.push(client_match);

            steps.advance(
                BatchPhase::Matching,
                format!("Generated mailer {}/{}", i + 1, total_clients),
            );
        }

        self.ensure_not_cancelled()?;
        steps.report(BatchPhase::Merging, "Merging all mailers...");
        let merged = self.renderer.merge(&rendered).await?;
        steps.advance(BatchPhase::Done, "Complete!");

        info!(
            matched = matched.len(),
            rendered = rendered.len(),
            skipped = skipped.len(),
            cache_hits = stats.cache_hits,
            fetched = stats.fetched,
            "Batch complete"
        );

        Ok(BatchOutcome {
            matched,
            skipped,
            rendered,
            merged,
            skip_report: None,
            stats,
        })
    }

    async fn geocode_list(
        &self,
        records: &[AddressRecord],
        list: ListKind,
        steps: &mut Steps<'_>,
        stats: &mut BatchStats,
        skipped: &mut Vec<SkipRecord>,
    ) -> Result<Vec<Option<Coordinate>>, DomainError> {
        let (phase, label) = match list {
            ListKind::Client => (BatchPhase::GeocodingClients, "client"),
            ListKind::Sold => (BatchPhase::GeocodingSold, "sold property"),
        };
        let mut coordinates = Vec::with_capacity(records.len());

        for (i, record) in records.iter().enumerate() {
            self.ensure_not_cancelled()?;

            let key = self.geocoder.key_for(record);
            let lookup = self.geocoder.resolve(&key).await;
            match &lookup {
                Lookup::Cached(_) => stats.cache_hits += 1,
                Lookup::Fetched(_) => stats.fetched += 1,
                Lookup::NoResults | Lookup::Failed(_) => {
                    skipped.push(SkipRecord::geocoding_failed(
                        key,
                        list,
                        record.row,
                        lookup.failure_detail(),
                    ));
                }
            }
            coordinates.push(lookup.coordinate());

            steps.advance(
                phase,
                format!("Geocoding {} {}/{}", label, i + 1, records.len()),
            );
        }

        Ok(coordinates)
    }

    fn ensure_not_cancelled(&self) -> Result<(), DomainError> {
        if self.cancel.is_cancelled() {
            info!("Batch cancelled");
            return Err(DomainError::Cancelled);
        }
        Ok(())
    }
}
