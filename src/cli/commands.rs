//! Command handlers for Tube Fetcher CLI
//!
//! This module implements the main command handlers that coordinate between
//! CLI arguments and the core application functionality.

use tracing::{debug, info};

use crate::app::models::{NamingTemplate, QueueItem};
use crate::app::naming::{render, NameFields};
use crate::app::queue::{EnqueueRequest, QueueManager};
use crate::app::snapshot::{self, Snapshot};
use crate::app::store::MediaStore;
use crate::cli::args::{
    parse_status_filter, AddArgs, GlobalArgs, HistoryAction, HistoryArgs, QueueAction, QueueArgs,
    SnapshotAction, SnapshotArgs, TemplateAction, TemplateArgs,
};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Open the library store using configuration and CLI overrides
pub async fn open_store(global: &GlobalArgs) -> Result<MediaStore> {
    let config = AppConfig::load(global.config.clone()).await?;
    let db_path = config.database_path(global.data_dir.as_ref())?;
    debug!("Using database at {}", db_path.display());
    Ok(MediaStore::open(&db_path).await?)
}

/// Handle the add command
pub async fn handle_add(args: AddArgs, global: &GlobalArgs) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let store = open_store(global).await?;
    let queue = QueueManager::new(store);

    let mut request = EnqueueRequest::new(
        args.source_id.as_str(),
        args.source_ref.as_str(),
        args.title.as_str(),
        args.quality.as_str(),
        args.format.as_str(),
        args.media_kind(),
        args.transfer_format.as_str(),
    );
    if args.transfer_format.is_empty() {
        request.transfer_format_id = args.quality.clone();
    }

    let job_id = queue.enqueue(request, args.force).await?;
    info!("Enqueued {} as job {}", args.source_id, job_id);
    println!("Queued: {}", job_id);
    Ok(())
}

/// Handle the queue command
pub async fn handle_queue(args: QueueArgs, global: &GlobalArgs) -> Result<()> {
    let store = open_store(global).await?;
    let queue = QueueManager::new(store);

    match args.action {
        QueueAction::List { status } => {
            let items = match status {
                Some(raw) => {
                    let status = parse_status_filter(&raw).map_err(AppError::generic)?;
                    queue.list_by_status(status).await?
                }
                None => queue.list_all().await?,
            };

            if items.is_empty() {
                println!("Queue is empty");
                return Ok(());
            }
            for item in &items {
                print_queue_item(item);
            }
            println!("{} job(s)", items.len());
        }
        QueueAction::Retry { id } => {
            queue.retry(&id).await?;
            println!("Retrying: {}", id);
        }
        QueueAction::Cancel { id } => {
            queue.cancel(&id).await?;
            println!("Cancelled: {}", id);
        }
    }
    Ok(())
}

/// Handle the history command
pub async fn handle_history(args: HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let store = open_store(global).await?;

    match args.action {
        HistoryAction::List { source } => {
            let records = match source {
                Some(source_id) => store.history().get_all_by_source(&source_id).await?,
                None => store.history().get_all().await?,
            };

            if records.is_empty() {
                println!("No completed downloads");
                return Ok(());
            }
            for record in &records {
                println!(
                    "{}  {}  {} ({}, {}){}",
                    record.completed_at.format("%Y-%m-%d %H:%M"),
                    record.source_id,
                    record.title,
                    record.quality,
                    record.format,
                    record
                        .size_bytes
                        .map(|b| format!("  {} bytes", b))
                        .unwrap_or_default(),
                );
            }
            println!("{} record(s)", records.len());
        }
        HistoryAction::Clear => {
            let removed = store.history().clear().await?;
            println!("Removed {} history record(s)", removed);
        }
    }
    Ok(())
}

/// Handle the template command
pub async fn handle_template(args: TemplateArgs, global: &GlobalArgs) -> Result<()> {
    let store = open_store(global).await?;
    let templates = store.templates();

    match args.action {
        TemplateAction::List => {
            let all = templates.get_all().await?;
            if all.is_empty() {
                println!("No templates stored");
                return Ok(());
            }
            for template in &all {
                println!(
                    "{} {}  {}  \"{}\"",
                    if template.is_default { "*" } else { " " },
                    template.id,
                    template.name,
                    template.template,
                );
            }
        }
        TemplateAction::Add {
            name,
            template,
            default,
        } => {
            let record = NamingTemplate::new(name, template);
            templates.put(&record).await?;
            if default {
                templates.set_default(&record.id).await?;
            }
            println!("Stored template {}", record.id);
        }
        TemplateAction::SetDefault { id } => {
            templates.set_default(&id).await?;
            println!("Default template: {}", id);
        }
        TemplateAction::Remove { id } => {
            if templates.delete(&id).await? {
                println!("Removed template {}", id);
            } else {
                println!("No template with id {}", id);
            }
        }
        TemplateAction::Render { id, title } => {
            let template = match id {
                Some(id) => templates
                    .get(&id)
                    .await?
                    .ok_or_else(|| AppError::generic(format!("No template with id {}", id)))?,
                None => match templates.get_default().await? {
                    Some(template) => template,
                    None => {
                        let config = AppConfig::load(global.config.clone()).await?;
                        NamingTemplate::new("fallback", config.naming.fallback_template)
                    }
                },
            };

            let fields = NameFields {
                title: Some(title),
                channel: Some("Sample Channel".to_string()),
                quality: Some("720p".to_string()),
                format: Some("mp4".to_string()),
                date: None,
                duration_secs: Some(754),
                source_id: Some("dQw4w9WgXcQ".to_string()),
            };
            println!("{}", render(&template.template, &fields));
        }
    }
    Ok(())
}

/// Handle the snapshot command
pub async fn handle_snapshot(args: SnapshotArgs, global: &GlobalArgs) -> Result<()> {
    let store = open_store(global).await?;

    match args.action {
        SnapshotAction::Export { file } => {
            let snapshot = snapshot::export(&store).await?;
            let json = snapshot.to_json().map_err(AppError::Snapshot)?;
            tokio::fs::write(&file, json).await?;
            println!(
                "Exported {} history, {} collections, {} tags, {} templates to {}",
                snapshot.history.len(),
                snapshot.collections.len(),
                snapshot.tags.len(),
                snapshot.templates.len(),
                file.display(),
            );
        }
        SnapshotAction::Import { file } => {
            let json = tokio::fs::read_to_string(&file).await?;
            let snapshot = Snapshot::from_json(&json).map_err(AppError::Snapshot)?;
            let report = snapshot::import(&store, &snapshot).await?;
            println!(
                "Imported {} history, {} collections, {} tags, {} templates ({} total)",
                report.history,
                report.collections,
                report.tags,
                report.templates,
                report.total(),
            );
        }
    }
    Ok(())
}

fn print_queue_item(item: &QueueItem) {
    let progress = match item.total_bytes {
        Some(total) => format!(
            "{:>5.1}% ({}/{} bytes)",
            item.progress_pct, item.downloaded_bytes, total
        ),
        None => format!("{} bytes", item.downloaded_bytes),
    };
    println!(
        "{}  {:<9}  {}  {} ({}, {})  {}{}",
        item.id,
        item.status.to_string(),
        item.source_id,
        item.title,
        item.quality,
        item.format,
        progress,
        item.error
            .as_deref()
            .map(|e| format!("  error: {}", e))
            .unwrap_or_default(),
    );
}
