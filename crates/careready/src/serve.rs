// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `careready serve` command implementation.
//!
//! Composition root: opens the database, builds the queue client and the
//! inference adapter, then spawns the five consumer loops (evaluation
//! triggers, check signals, inbound messages, notifications, briefs).
//! All loops share one cancellation token installed on SIGINT/SIGTERM.

use std::sync::Arc;

use careready_config::model::CarereadyConfig;
use careready_core::events::queues;
use careready_core::{CarereadyError, InferenceAdapter};
use careready_interpreter::InterpretationRouter;
use careready_openai::OpenAiClient;
use careready_queue::QueueClient;
use careready_readiness::{EvaluationHandler, Orchestrator, SignalHandler};
use careready_storage::Database;
use tracing::{error, info};

use crate::shutdown;
use crate::workers::{BriefWorker, NotificationWorker};

/// Runs the `careready serve` command until a shutdown signal arrives.
pub async fn run_serve(config: CarereadyConfig) -> Result<(), CarereadyError> {
    init_tracing(&config.agent.log_level);

    info!(
        agent_name = config.agent.name.as_str(),
        database_path = config.storage.database_path.as_str(),
        "starting readiness coordinator"
    );

    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
    let queue = QueueClient::new(db.clone(), config.queue.clone());

    let inference: Arc<dyn InferenceAdapter> = Arc::new(OpenAiClient::new(&config.inference)?);

    let orchestrator = Arc::new(Orchestrator::new(db.clone(), queue.clone()));
    let router = InterpretationRouter::new(
        db.clone(),
        queue.clone(),
        inference,
        config.agent.pause_cooldown_minutes,
        config.inference.confidence_threshold,
    );

    let cancel = shutdown::install_signal_handler();

    let consumers = vec![
        queue.subscribe(
            queues::READINESS_EVALUATION,
            Arc::new(EvaluationHandler::new(orchestrator.clone())),
            cancel.clone(),
        ),
        queue.subscribe(
            queues::READINESS_SIGNALS,
            Arc::new(SignalHandler::new(orchestrator, db.clone())),
            cancel.clone(),
        ),
        queue.subscribe(queues::INBOUND_MESSAGES, Arc::new(router), cancel.clone()),
        queue.subscribe(
            queues::NOTIFICATIONS,
            Arc::new(NotificationWorker),
            cancel.clone(),
        ),
        queue.subscribe(
            queues::BRIEF_GENERATION,
            Arc::new(BriefWorker::new(db.clone(), queue.clone())),
            cancel.clone(),
        ),
    ];

    info!(consumers = consumers.len(), "all consumers running");

    for handle in consumers {
        if let Err(e) = handle.await {
            error!(error = %e, "consumer task panicked");
        }
    }

    db.close().await?;
    info!("readiness coordinator stopped");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("careready={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
