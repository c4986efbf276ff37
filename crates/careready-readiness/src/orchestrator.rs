// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evaluation orchestrator and its queue handlers.
//!
//! The orchestrator owns the full evaluation cycle: it materializes the
//! default checklist, reads the current snapshot, runs the pure state
//! machine, persists a changed aggregate, and publishes downstream jobs
//! on actionable transitions. Both queue handlers funnel into the same
//! cycle so a targeted check update still recomputes the whole state.
//!
//! Poison-pill inputs (malformed JSON, unknown discriminants, unknown
//! appointment ids) are logged and acked rather than retried; everything
//! else propagates an error so the queue can redeliver.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use careready_core::events::{
    queues, templates, BriefFormat, BriefGenerationJob, CheckSignal, EvaluationEvent,
    NotificationChannel, NotificationJob,
};
use careready_core::types::ReadinessStatus;
use careready_core::CarereadyError;
use careready_queue::{QueueClient, QueueHandler};
use careready_storage::queries::{checks, facts};
use careready_storage::Database;
use tracing::{info, warn};

use crate::logic;

pub struct Orchestrator {
    db: Database,
    queue: QueueClient,
}

impl Orchestrator {
    pub fn new(db: Database, queue: QueueClient) -> Self {
        Self { db, queue }
    }

    /// Run one full evaluation cycle for an appointment.
    ///
    /// Notifications and brief jobs are published only when the aggregate
    /// status actually changes, which keeps redelivered events idempotent.
    pub async fn run_evaluation(&self, appointment_id: &str) -> Result<(), CarereadyError> {
        checks::ensure_checklist_exists(&self.db, appointment_id).await?;
        let state = checks::get_readiness_state(&self.db, appointment_id).await?;
        let evaluation = logic::evaluate(&state.checks);

        if evaluation.next_status == state.status {
            return Ok(());
        }

        checks::update_readiness_status(
            &self.db,
            appointment_id,
            evaluation.next_status,
            evaluation.risk_score,
        )
        .await?;

        info!(
            appointment_id,
            from = %state.status,
            to = %evaluation.next_status,
            risk_score = evaluation.risk_score,
            "readiness status changed"
        );

        if evaluation.should_notify {
            self.publish_transition_jobs(appointment_id, evaluation.next_status)
                .await?;
        }
        Ok(())
    }

    async fn publish_transition_jobs(
        &self,
        appointment_id: &str,
        status: ReadinessStatus,
    ) -> Result<(), CarereadyError> {
        let contact = facts::caregiver_contact_for_appointment(&self.db, appointment_id)
            .await?
            .ok_or_else(|| CarereadyError::UnknownAppointment(appointment_id.to_string()))?;

        let template_id = match status {
            ReadinessStatus::Blocked => templates::ESCALATION_ALERT,
            ReadinessStatus::Ready => templates::READY_CONFIRMATION,
            _ => return Ok(()),
        };

        let mut data = HashMap::new();
        data.insert("appointmentId".to_string(), appointment_id.to_string());
        data.insert("status".to_string(), status.to_string());
        data.insert("caregiverName".to_string(), contact.name.clone());

        let job = NotificationJob {
            channel: NotificationChannel::Sms,
            recipient: contact.phone.clone(),
            template_id: template_id.to_string(),
            data,
        };
        self.queue.publish(queues::NOTIFICATIONS, &job).await?;

        if status == ReadinessStatus::Ready {
            let brief = BriefGenerationJob {
                appointment_id: appointment_id.to_string(),
                caregiver_id: contact.caregiver_id,
                format: BriefFormat::Text,
                recipient_phone: contact.phone,
            };
            self.queue.publish(queues::BRIEF_GENERATION, &brief).await?;
        }
        Ok(())
    }
}

/// Consumes `readiness-evaluation` events.
pub struct EvaluationHandler {
    orchestrator: Arc<Orchestrator>,
}

impl EvaluationHandler {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl QueueHandler for EvaluationHandler {
    async fn handle(&self, payload: &str) -> Result<(), CarereadyError> {
        let event: EvaluationEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "dropping malformed evaluation event");
                return Ok(());
            }
        };

        match self.orchestrator.run_evaluation(&event.appointment_id).await {
            Ok(()) => Ok(()),
            Err(CarereadyError::UnknownAppointment(id)) => {
                warn!(appointment_id = %id, "dropping evaluation for unknown appointment");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

/// Consumes `readiness-signals` check updates.
pub struct SignalHandler {
    orchestrator: Arc<Orchestrator>,
    db: Database,
}

impl SignalHandler {
    pub fn new(orchestrator: Arc<Orchestrator>, db: Database) -> Self {
        Self { orchestrator, db }
    }
}

#[async_trait]
impl QueueHandler for SignalHandler {
    async fn handle(&self, payload: &str) -> Result<(), CarereadyError> {
        let signal: CheckSignal = match serde_json::from_str(payload) {
            Ok(signal) => signal,
            Err(e) => {
                warn!(error = %e, "dropping unrecognized check signal");
                return Ok(());
            }
        };

        let CheckSignal::UpdateCheck {
            appointment_id,
            check_type,
            status,
            source,
        } = signal;

        info!(
            appointment_id = %appointment_id,
            check_type = %check_type,
            status = %status,
            source = %source,
            "applying check update"
        );

        // The row must exist before a targeted update can land.
        match checks::ensure_checklist_exists(&self.db, &appointment_id).await {
            Ok(()) => {}
            Err(CarereadyError::UnknownAppointment(id)) => {
                warn!(appointment_id = %id, "dropping signal for unknown appointment");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        match checks::update_check_status(&self.db, &appointment_id, check_type, status.into())
            .await
        {
            Ok(()) => {}
            Err(CarereadyError::UnknownAppointment(id)) => {
                warn!(appointment_id = %id, "dropping signal for unknown appointment");
                return Ok(());
            }
            Err(e) => return Err(e),
        }

        match self.orchestrator.run_evaluation(&appointment_id).await {
            Ok(()) => Ok(()),
            Err(CarereadyError::UnknownAppointment(id)) => {
                warn!(appointment_id = %id, "dropping evaluation for unknown appointment");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use careready_config::model::QueueConfig;
    use careready_storage::queries::queue as queue_queries;
    use std::time::Duration;
    use tempfile::tempdir;

    fn test_queue_config() -> QueueConfig {
        QueueConfig {
            wait_time_secs: 1,
            poll_interval_ms: 10,
            error_backoff_secs: 1,
            visibility_timeout_secs: 300,
        }
    }

    async fn setup() -> (Database, QueueClient, Arc<Orchestrator>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("orchestrator.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        let queue = QueueClient::new(db.clone(), test_queue_config());
        let orchestrator = Arc::new(Orchestrator::new(db.clone(), queue.clone()));
        (db, queue, orchestrator, dir)
    }

    async fn seed(db: &Database) -> String {
        use careready_core::types::{CaregiverFacts, ClientFacts, IngestionPayload};
        let payload = IngestionPayload {
            source_appointment_id: "EXT-APPT-100".to_string(),
            start_time: "2026-03-02T09:00:00Z".to_string(),
            end_time: "2026-03-02T11:00:00Z".to_string(),
            service_type: "PERSONAL_CARE".to_string(),
            location: "12 Maple St".to_string(),
            client: ClientFacts {
                source_id: "EXT-CLIENT-1".to_string(),
                name: "Avery Client".to_string(),
                phone: "+15550001111".to_string(),
                address: "12 Maple St".to_string(),
            },
            caregiver: CaregiverFacts {
                source_id: "EXT-CG-1".to_string(),
                name: "Sam Caregiver".to_string(),
                phone: "+15550002222".to_string(),
                email: "sam@example.com".to_string(),
            },
        };
        facts::upsert_appointment(db, &payload).await.unwrap()
    }

    fn signal_json(appointment_id: &str, check_type: &str, status: &str) -> String {
        format!(
            r#"{{"type":"UPDATE_CHECK","appointmentId":"{appointment_id}","checkType":"{check_type}","status":"{status}","source":"AI_CLASSIFIER"}}"#
        )
    }

    async fn drain_one(db: &Database, queue_name: &str) -> Option<String> {
        queue_queries::dequeue(db, queue_name, Duration::from_secs(300))
            .await
            .unwrap()
            .map(|e| e.payload)
    }

    #[tokio::test]
    async fn first_evaluation_moves_to_in_progress_silently() {
        let (db, _queue, orchestrator, _dir) = setup().await;
        let appointment_id = seed(&db).await;

        let handler = EvaluationHandler::new(orchestrator);
        let event = EvaluationEvent {
            appointment_id: appointment_id.clone(),
            trigger: careready_core::events::EvaluationTrigger::Ingestion,
            timestamp: "2026-03-01T10:00:00Z".to_string(),
        };
        handler
            .handle(&serde_json::to_string(&event).unwrap())
            .await
            .unwrap();

        let state = checks::get_readiness_state(&db, &appointment_id).await.unwrap();
        assert_eq!(state.status, ReadinessStatus::InProgress);
        assert_eq!(state.checks.len(), 3);
        assert!(drain_one(&db, queues::NOTIFICATIONS).await.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn failed_check_blocks_and_escalates() {
        let (db, _queue, orchestrator, _dir) = setup().await;
        let appointment_id = seed(&db).await;

        let handler = SignalHandler::new(orchestrator, db.clone());
        handler
            .handle(&signal_json(&appointment_id, "SAFETY_ASSESSMENT", "FAIL"))
            .await
            .unwrap();

        let state = checks::get_readiness_state(&db, &appointment_id).await.unwrap();
        assert_eq!(state.status, ReadinessStatus::Blocked);
        assert_eq!(state.risk_score, 100);

        let payload = drain_one(&db, queues::NOTIFICATIONS).await.unwrap();
        let job: NotificationJob = serde_json::from_str(&payload).unwrap();
        assert_eq!(job.template_id, templates::ESCALATION_ALERT);
        assert_eq!(job.recipient, "+15550002222");

        // No brief on a blocking transition.
        assert!(drain_one(&db, queues::BRIEF_GENERATION).await.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn all_checks_passing_confirms_and_requests_brief() {
        let (db, _queue, orchestrator, _dir) = setup().await;
        let appointment_id = seed(&db).await;

        let handler = SignalHandler::new(orchestrator, db.clone());
        for check in ["ACCESS_CODE", "SAFETY_ASSESSMENT", "CAREGIVER_CONFIRMATION"] {
            handler
                .handle(&signal_json(&appointment_id, check, "PASS"))
                .await
                .unwrap();
        }

        let state = checks::get_readiness_state(&db, &appointment_id).await.unwrap();
        assert_eq!(state.status, ReadinessStatus::Ready);
        assert_eq!(state.risk_score, 0);

        let payload = drain_one(&db, queues::NOTIFICATIONS).await.unwrap();
        let job: NotificationJob = serde_json::from_str(&payload).unwrap();
        assert_eq!(job.template_id, templates::READY_CONFIRMATION);

        let payload = drain_one(&db, queues::BRIEF_GENERATION).await.unwrap();
        let brief: BriefGenerationJob = serde_json::from_str(&payload).unwrap();
        assert_eq!(brief.appointment_id, appointment_id);
        assert_eq!(brief.recipient_phone, "+15550002222");

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reevaluation_without_change_stays_silent() {
        let (db, _queue, orchestrator, _dir) = setup().await;
        let appointment_id = seed(&db).await;

        let handler = SignalHandler::new(orchestrator.clone(), db.clone());
        handler
            .handle(&signal_json(&appointment_id, "SAFETY_ASSESSMENT", "FAIL"))
            .await
            .unwrap();
        let first = drain_one(&db, queues::NOTIFICATIONS).await;
        assert!(first.is_some());

        // Same outcome again: status unchanged, no second alert.
        handler
            .handle(&signal_json(&appointment_id, "SAFETY_ASSESSMENT", "FAIL"))
            .await
            .unwrap();
        assert!(drain_one(&db, queues::NOTIFICATIONS).await.is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recovery_from_blocked_to_ready() {
        let (db, _queue, orchestrator, _dir) = setup().await;
        let appointment_id = seed(&db).await;

        let handler = SignalHandler::new(orchestrator, db.clone());
        handler
            .handle(&signal_json(&appointment_id, "SAFETY_ASSESSMENT", "FAIL"))
            .await
            .unwrap();
        drain_one(&db, queues::NOTIFICATIONS).await.unwrap();

        for check in ["ACCESS_CODE", "SAFETY_ASSESSMENT", "CAREGIVER_CONFIRMATION"] {
            handler
                .handle(&signal_json(&appointment_id, check, "PASS"))
                .await
                .unwrap();
        }

        let state = checks::get_readiness_state(&db, &appointment_id).await.unwrap();
        assert_eq!(state.status, ReadinessStatus::Ready);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn malformed_payloads_are_acked_not_retried() {
        let (db, _queue, orchestrator, _dir) = setup().await;

        let eval = EvaluationHandler::new(orchestrator.clone());
        assert!(eval.handle("{not json").await.is_ok());

        let signals = SignalHandler::new(orchestrator, db.clone());
        assert!(signals.handle("{not json").await.is_ok());
        assert!(signals
            .handle(r#"{"type":"RESOLVE_ALL","appointmentId":"x"}"#)
            .await
            .is_ok());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn unknown_appointment_is_dropped() {
        let (db, _queue, orchestrator, _dir) = setup().await;

        let handler = SignalHandler::new(orchestrator, db.clone());
        let result = handler
            .handle(&signal_json("no-such-appointment", "ACCESS_CODE", "PASS"))
            .await;
        assert!(result.is_ok());

        db.close().await.unwrap();
    }
}
