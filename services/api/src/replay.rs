use crate::infra::open_store;
use maat_court_data::config::AppConfig;
use maat_court_data::consumer::{
    ConsumerPool, Disposition, InboundMessage, MessageDispatcher, QueueKind,
};
use maat_court_data::error::AppError;
use maat_court_data::telemetry;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug)]
pub(crate) struct ReplayArgs {
    pub(crate) queue: QueueKind,
    pub(crate) file: PathBuf,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ReplaySummary {
    pub(crate) acked: usize,
    pub(crate) redelivered: usize,
}

pub(crate) async fn run(args: ReplayArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let contents = std::fs::read_to_string(&args.file)?;
    let store = open_store(&config.database)?;
    let dispatcher = Arc::new(MessageDispatcher::new(store, config.processing.clone()));
    let pool = ConsumerPool::start(dispatcher, config.consumer.workers);
    info!(
        queue = %args.queue,
        file = %args.file.display(),
        workers = pool.size(),
        "replaying messages"
    );

    let summary = replay_lines(&pool, args.queue, &contents).await;
    pool.shutdown().await;

    println!(
        "Replayed {} message(s) on {}: {} acked, {} to redeliver",
        summary.acked + summary.redelivered,
        args.queue,
        summary.acked,
        summary.redelivered
    );
    Ok(())
}

/// Submits every non-blank line as one message, in file order, printing each disposition.
pub(crate) async fn replay_lines(
    pool: &ConsumerPool,
    queue: QueueKind,
    contents: &str,
) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let disposition = match pool.submit(InboundMessage::new(queue, line)).await {
            Ok(disposition) => {
                println!("  line {}: {disposition}", index + 1);
                disposition
            }
            Err(err) => {
                println!("  line {}: {err}, redeliver", index + 1);
                Disposition::Redeliver
            }
        };
        match disposition {
            Disposition::Ack => summary.acked += 1,
            Disposition::Redeliver => summary.redelivered += 1,
        }
    }
    summary
}
