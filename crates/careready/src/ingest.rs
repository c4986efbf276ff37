// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `careready ingest` command implementation.
//!
//! Reads an ingestion payload from a JSON file, upserts the appointment
//! facts, and publishes an evaluation event. This stands in for the
//! upstream scheduling feed.

use std::path::Path;

use careready_config::model::CarereadyConfig;
use careready_core::events::{queues, EvaluationEvent, EvaluationTrigger};
use careready_core::types::IngestionPayload;
use careready_core::CarereadyError;
use careready_queue::QueueClient;
use careready_storage::queries::facts;
use careready_storage::Database;
use tracing::info;

/// Runs the `careready ingest <file>` command.
pub async fn run_ingest(config: CarereadyConfig, file: &Path) -> Result<(), CarereadyError> {
    let raw = std::fs::read_to_string(file)
        .map_err(|e| CarereadyError::Config(format!("cannot read {}: {e}", file.display())))?;
    let payload: IngestionPayload = serde_json::from_str(&raw)
        .map_err(|e| CarereadyError::Config(format!("invalid ingestion payload: {e}")))?;

    let db = Database::open_with(&config.storage.database_path, config.storage.wal_mode).await?;
    let queue = QueueClient::new(db.clone(), config.queue.clone());

    let appointment_id = facts::upsert_appointment(&db, &payload).await?;
    info!(
        appointment_id = %appointment_id,
        source_appointment_id = %payload.source_appointment_id,
        "appointment facts ingested"
    );

    let event = EvaluationEvent {
        appointment_id: appointment_id.clone(),
        trigger: EvaluationTrigger::Ingestion,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    queue.publish(queues::READINESS_EVALUATION, &event).await?;

    db.close().await?;
    println!("{appointment_id}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use careready_storage::queries::queue as queue_queries;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_json() -> &'static str {
        r#"{
            "sourceAppointmentId": "EXT-APPT-7",
            "startTime": "2026-03-02T09:00:00Z",
            "endTime": "2026-03-02T11:00:00Z",
            "serviceType": "PERSONAL_CARE",
            "location": "12 Maple St",
            "client": {
                "sourceId": "EXT-CLIENT-7",
                "name": "Avery Client",
                "phone": "+15550001111",
                "address": "12 Maple St"
            },
            "caregiver": {
                "sourceId": "EXT-CG-7",
                "name": "Sam Caregiver",
                "phone": "+15550002222",
                "email": "sam@example.com"
            }
        }"#
    }

    #[tokio::test]
    async fn ingest_upserts_and_publishes_evaluation() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("payload.json");
        let mut f = std::fs::File::create(&json_path).unwrap();
        f.write_all(sample_json().as_bytes()).unwrap();

        let mut config = careready_config::load_and_validate_str("").unwrap();
        config.storage.database_path = dir
            .path()
            .join("ingest.db")
            .to_str()
            .unwrap()
            .to_string();

        run_ingest(config.clone(), &json_path).await.unwrap();

        let db = Database::open(&config.storage.database_path).await.unwrap();
        let entry = queue_queries::dequeue(
            &db,
            queues::READINESS_EVALUATION,
            Duration::from_secs(300),
        )
        .await
        .unwrap()
        .unwrap();
        let event: EvaluationEvent = serde_json::from_str(&entry.payload).unwrap();
        assert_eq!(event.trigger, EvaluationTrigger::Ingestion);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ingest_rejects_malformed_payload() {
        let dir = tempdir().unwrap();
        let json_path = dir.path().join("bad.json");
        std::fs::write(&json_path, "{").unwrap();

        let mut config = careready_config::load_and_validate_str("").unwrap();
        config.storage.database_path = dir
            .path()
            .join("ingest.db")
            .to_str()
            .unwrap()
            .to_string();

        let result = run_ingest(config, &json_path).await;
        assert!(matches!(result, Err(CarereadyError::Config(_))));
    }
}
