use anyhow::{Context as _, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::commands::{print_json, Context};
use crate::error::invalid_input;
use mailglean_core::{ExclusionSet, Extractor, MessageExtraction};
use mailglean_mail::{auth, body, MailboxClient, StoredCredentials};
use mailglean_sink::{shape_batch, write_table_file, CrmClient, UpsertOutcome};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Cap the number of messages fetched this run
    #[arg(long)]
    pub limit: Option<usize>,
    /// Extract only: no sink output, no processed labels
    #[arg(long)]
    pub dry_run: bool,
    /// Write the CSV export here instead of the configured path
    #[arg(long)]
    pub csv_out: Option<PathBuf>,
}

#[derive(Debug, Default, Serialize)]
struct RunReport {
    fetched: usize,
    skipped: usize,
    retained: usize,
    labeled: usize,
    csv_path: Option<String>,
    crm_attempted: usize,
    crm_failed: usize,
    dry_run: bool,
}

pub fn run(ctx: &Context<'_>, args: RunArgs) -> Result<()> {
    let mailbox = &ctx.config.mailbox;
    let csv_path = args
        .csv_out
        .clone()
        .or_else(|| ctx.config.csv.as_ref().map(|csv| csv.path.clone()));
    if !args.dry_run && csv_path.is_none() && ctx.config.crm.is_none() {
        return Err(invalid_input(
            "no sink configured: set [sinks.csv] or [sinks.crm], or pass --csv-out or --dry-run",
        ));
    }

    // Taxonomy (a): credential problems are fatal before any fetch.
    let credentials = StoredCredentials::load(&mailbox.credentials_path).with_context(|| {
        format!(
            "load mailbox credentials {} (run `mailglean auth` first)",
            mailbox.credentials_path.display()
        )
    })?;
    let access_token = auth::fetch_access_token(&credentials).context("refresh access token")?;
    let client = MailboxClient::new(&mailbox.api_base, &mailbox.user_id, access_token)
        .context("build mailbox client")?;

    let query = MailboxClient::processed_exclusion_query(&mailbox.processed_label);
    let ids = client
        .list_message_ids(&query, args.limit)
        .context("list unprocessed messages")?;
    info!(count = ids.len(), "unprocessed messages found");

    let extractor = Extractor::new(ExclusionSet::new(ctx.config.exclude.iter().cloned()));

    let mut report = RunReport {
        fetched: ids.len(),
        dry_run: args.dry_run,
        ..RunReport::default()
    };
    let mut batch: Vec<MessageExtraction> = Vec::new();
    let mut processed_ids: Vec<String> = Vec::new();

    for id in ids {
        // Taxonomy (b): fetch/decode failures skip the message only.
        let raw = match client.fetch_raw(&id) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(message = %id, error = %err, "fetch failed, skipping message");
                report.skipped += 1;
                continue;
            }
        };
        let text = match body::decode_body(&raw) {
            Ok(text) => text,
            Err(err) => {
                warn!(message = %id, error = %err, "decode failed, skipping message");
                report.skipped += 1;
                continue;
            }
        };

        let result = extractor.extract(&text);
        if !result.names.is_empty() {
            batch.push(MessageExtraction {
                message_id: id.clone(),
                result,
            });
        }
        processed_ids.push(id);
    }
    report.retained = batch.len();

    if !args.dry_run {
        if let Some(path) = &csv_path {
            let table = shape_batch(&batch);
            write_table_file(path, &table)
                .with_context(|| format!("write csv export {}", path.display()))?;
            report.csv_path = Some(path.display().to_string());
        }

        if let Some(crm) = &ctx.config.crm {
            let crm_client = CrmClient::new(
                &crm.endpoint,
                &crm.api_key,
                std::time::Duration::from_secs(crm.timeout_secs),
            )
            .context("build crm client")?;
            // Taxonomy (d): failed upserts are recorded, the rest proceed.
            let outcomes = crm_client.upsert_batch(&batch);
            report.crm_attempted = outcomes.len();
            report.crm_failed = outcomes
                .iter()
                .filter(|outcome: &&UpsertOutcome| !outcome.succeeded())
                .count();
        }

        if mailbox.mark_processed {
            // Deferred until here so a dry run never creates the label.
            let label = client
                .ensure_label(&mailbox.processed_label)
                .with_context(|| format!("ensure label {}", mailbox.processed_label))?;
            for id in &processed_ids {
                match client.add_label(id, &label.id) {
                    Ok(()) => report.labeled += 1,
                    Err(err) => {
                        warn!(message = %id, error = %err, "failed to mark message processed")
                    }
                }
            }
        }
    }

    if ctx.json {
        return print_json(&report);
    }

    println!(
        "Processed {} messages: {} retained, {} skipped{}",
        report.fetched,
        report.retained,
        report.skipped,
        if report.dry_run { " (dry run)" } else { "" }
    );
    if let Some(path) = &report.csv_path {
        println!("CSV export written to {}", path);
    }
    if report.crm_attempted > 0 {
        println!(
            "CRM upserts: {} attempted, {} failed",
            report.crm_attempted, report.crm_failed
        );
    }
    if report.labeled > 0 {
        println!("Marked {} messages processed", report.labeled);
    }
    Ok(())
}
