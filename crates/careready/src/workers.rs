// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Downstream delivery workers.
//!
//! The notification worker validates jobs and logs the delivery decision;
//! actual SMS/email/push transport is out of scope and stays stubbed. The
//! brief worker renders a plain-text appointment brief and hands it back
//! to the notification queue for delivery.

use std::collections::HashMap;

use async_trait::async_trait;
use careready_core::events::{
    queues, templates, BriefGenerationJob, NotificationChannel, NotificationJob,
};
use careready_core::CarereadyError;
use careready_queue::{QueueClient, QueueHandler};
use careready_storage::queries::checks;
use careready_storage::Database;
use tracing::{info, warn};

/// Consumes `notifications` jobs and records the delivery decision.
pub struct NotificationWorker;

#[async_trait]
impl QueueHandler for NotificationWorker {
    async fn handle(&self, payload: &str) -> Result<(), CarereadyError> {
        let job: NotificationJob = match serde_json::from_str(payload) {
            Ok(job) => job,
            Err(e) => {
                warn!(error = %e, "dropping malformed notification job");
                return Ok(());
            }
        };

        if job.recipient.is_empty() {
            warn!(template_id = %job.template_id, "dropping notification without recipient");
            return Ok(());
        }

        info!(
            channel = ?job.channel,
            recipient = %job.recipient,
            template_id = %job.template_id,
            "notification dispatched"
        );
        Ok(())
    }
}

/// Consumes `brief-generation` jobs and queues the rendered brief for
/// delivery.
pub struct BriefWorker {
    db: Database,
    queue: QueueClient,
}

impl BriefWorker {
    pub fn new(db: Database, queue: QueueClient) -> Self {
        Self { db, queue }
    }

    async fn render_brief(&self, job: &BriefGenerationJob) -> Result<String, CarereadyError> {
        let state = checks::get_readiness_state(&self.db, &job.appointment_id).await?;
        let mut lines = vec![format!(
            "Appointment {} is {} (risk {}).",
            state.appointment_id, state.status, state.risk_score
        )];
        for check in &state.checks {
            lines.push(format!("  {}: {}", check.check_type, check.status));
        }
        Ok(lines.join("\n"))
    }
}

#[async_trait]
impl QueueHandler for BriefWorker {
    async fn handle(&self, payload: &str) -> Result<(), CarereadyError> {
        let job: BriefGenerationJob = match serde_json::from_str(payload) {
            Ok(job) => job,
            Err(e) => {
                warn!(error = %e, "dropping malformed brief job");
                return Ok(());
            }
        };

        let brief = match self.render_brief(&job).await {
            Ok(brief) => brief,
            Err(CarereadyError::UnknownAppointment(id)) => {
                warn!(appointment_id = %id, "dropping brief for unknown appointment");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let mut data = HashMap::new();
        data.insert("appointmentId".to_string(), job.appointment_id.clone());
        data.insert("brief".to_string(), brief);

        let delivery = NotificationJob {
            channel: NotificationChannel::Sms,
            recipient: job.recipient_phone.clone(),
            template_id: templates::CAREGIVER_BRIEF_DELIVERY.to_string(),
            data,
        };
        self.queue.publish(queues::NOTIFICATIONS, &delivery).await?;
        info!(
            appointment_id = %job.appointment_id,
            caregiver_id = %job.caregiver_id,
            "brief generated and queued for delivery"
        );
        Ok(())
    }
}
