//! Ingest command implementation

use crate::cli::IngestArgs;
use crate::config_loader::load_config_with_overrides;
use crate::output::OutputWriter;
use crate::output_types::{IngestOutput, RejectedSubmission, SampleRow};
use anyhow::{bail, Context, Result};
use futures::stream::{self, StreamExt};
use geosample_core::config::CliConfigOverrides;
use geosample_core::models::Designation;
use geosample_store::{MemorySampleStore, SampleService, SampleStore, Submission};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub async fn execute(
    args: IngestArgs,
    config_path: Option<&Path>,
    output: &OutputWriter,
) -> Result<()> {
    if args.concurrency == 0 {
        bail!("--concurrency must be at least 1");
    }

    let config = load_config_with_overrides(
        config_path,
        CliConfigOverrides {
            neighbor_radius_m: args.radius,
            same_field_radius_m: args.same_field_radius,
            seed: args.seed,
            ..Default::default()
        },
    )?;

    let content = fs::read_to_string(&args.path)
        .with_context(|| format!("Failed to read {}", args.path.display()))?;
    let submissions: Vec<Submission> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse submissions in {}", args.path.display()))?;

    let store = Arc::new(MemorySampleStore::new());
    let service = SampleService::new(Arc::clone(&store), &config)?;

    // Proposals are drawn in input order; only the commits run concurrently.
    let mut rejected = Vec::new();
    let mut drafts = Vec::with_capacity(submissions.len());
    for (index, submission) in submissions.iter().enumerate() {
        match service.prepare(submission).await {
            Ok(draft) => drafts.push((index, draft)),
            Err(e) => rejected.push(RejectedSubmission { index, reason: e.to_string() }),
        }
    }

    let outcomes: Vec<(usize, geosample_core::Result<_>)> = stream::iter(drafts)
        .map(|(index, draft)| {
            let service = &service;
            async move { (index, service.commit(draft).await) }
        })
        .buffer_unordered(args.concurrency)
        .collect()
        .await;

    rejected.extend(outcomes.into_iter().filter_map(|(index, result)| {
        result.err().map(|e| RejectedSubmission { index, reason: e.to_string() })
    }));
    rejected.sort_by_key(|r| r.index);

    let samples = store.list().await?;
    let count = |designation: Designation| {
        samples.iter().filter(|s| s.validity.is_valid() && s.designation == designation).count()
    };

    let result = IngestOutput {
        submitted: submissions.len(),
        stored: samples.len(),
        training: count(Designation::Training),
        validation: count(Designation::Validation),
        invalid: samples.iter().filter(|s| !s.validity.is_valid()).count(),
        rejected,
        samples,
    };

    if output.is_json() {
        output.result(result)?;
        return Ok(());
    }

    output.section("Samples");
    output.table(result.samples.iter().map(SampleRow::from).collect());

    for rejection in &result.rejected {
        output.warning(format!("Submission {} rejected: {}", rejection.index, rejection.reason));
    }

    output.section("Summary");
    output.kv("Stored", format!("{} of {}", result.stored, result.submitted));
    output.kv("Training", result.training);
    output.kv("Validation", result.validation);
    output.kv("Held for review", result.invalid);

    Ok(())
}
