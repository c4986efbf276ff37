// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interpretation router for inbound conversation messages.
//!
//! Consumes the `inbound-messages` queue and decides, per message, whether
//! to extract readiness signals, draft a digital-twin reply, or stay
//! silent. Order matters: automated senders are discarded first so agent
//! output can never re-enter the pipeline, then any human sender pauses
//! their own twin before the message is processed further.

use std::sync::Arc;

use async_trait::async_trait;
use careready_core::events::{queues, CheckSignal, InboundMessageEvent};
use careready_core::types::{AgentStatus, SenderType};
use careready_core::{CarereadyError, InferenceAdapter};
use careready_queue::{QueueClient, QueueHandler};
use careready_storage::queries::{agents, facts, messages};
use careready_storage::Database;
use tracing::{debug, info, warn};

/// Source label stamped on signals produced by classification.
const CLASSIFIER_SOURCE: &str = "AI_CLASSIFIER";

/// Routes inbound messages to the classification or auto-reply path.
pub struct InterpretationRouter {
    db: Database,
    queue: QueueClient,
    inference: Arc<dyn InferenceAdapter>,
    pause_cooldown_minutes: u64,
    confidence_threshold: f64,
}

impl InterpretationRouter {
    pub fn new(
        db: Database,
        queue: QueueClient,
        inference: Arc<dyn InferenceAdapter>,
        pause_cooldown_minutes: u64,
        confidence_threshold: f64,
    ) -> Self {
        Self {
            db,
            queue,
            inference,
            pause_cooldown_minutes,
            confidence_threshold,
        }
    }

    async fn route(&self, event: InboundMessageEvent) -> Result<(), CarereadyError> {
        // Loop prevention: nothing the system says to itself gets interpreted.
        if event.sender_type.is_automated() {
            debug!(
                appointment_id = %event.appointment_id,
                sender_type = %event.sender_type,
                "ignoring automated sender"
            );
            return Ok(());
        }

        // A human spoke, so their own twin goes quiet for the cooldown.
        agents::pause_agent(
            &self.db,
            &event.sender_id,
            event.sender_type,
            self.pause_cooldown_minutes,
        )
        .await?;

        match event.sender_type {
            SenderType::Caregiver => self.classify(&event).await,
            _ => self.auto_reply(&event).await,
        }
    }

    /// Extract readiness observations and forward the confident ones.
    async fn classify(&self, event: &InboundMessageEvent) -> Result<(), CarereadyError> {
        let analysis = match self.inference.classify_readiness(&event.text).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!(
                    appointment_id = %event.appointment_id,
                    error = %e,
                    "dropping message, classification failed"
                );
                return Ok(());
            }
        };

        for update in analysis.updates {
            if update.confidence <= self.confidence_threshold {
                debug!(
                    appointment_id = %event.appointment_id,
                    category = %update.category,
                    confidence = update.confidence,
                    "discarding low-confidence observation"
                );
                continue;
            }

            let signal = CheckSignal::UpdateCheck {
                appointment_id: event.appointment_id.clone(),
                check_type: update.category,
                status: update.status,
                source: CLASSIFIER_SOURCE.to_string(),
            };
            self.queue.publish(queues::READINESS_SIGNALS, &signal).await?;
            info!(
                appointment_id = %event.appointment_id,
                category = %update.category,
                status = %update.status,
                confidence = update.confidence,
                "forwarded check signal"
            );
        }
        Ok(())
    }

    /// Reply on the caregiver's behalf unless their twin is paused.
    async fn auto_reply(&self, event: &InboundMessageEvent) -> Result<(), CarereadyError> {
        let caregiver_id =
            match facts::caregiver_for_appointment(&self.db, &event.appointment_id).await? {
                Some(id) => id,
                None => {
                    warn!(
                        appointment_id = %event.appointment_id,
                        "dropping message for unknown appointment"
                    );
                    return Ok(());
                }
            };

        let status = agents::effective_agent_status(&self.db, &caregiver_id).await?;
        if status == AgentStatus::Paused {
            info!(
                appointment_id = %event.appointment_id,
                caregiver_id = %caregiver_id,
                "twin paused, staying silent"
            );
            return Ok(());
        }

        let reply = match self.inference.generate_reply(&event.text).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(
                    appointment_id = %event.appointment_id,
                    error = %e,
                    "dropping message, reply generation failed"
                );
                return Ok(());
            }
        };

        messages::insert_message(
            &self.db,
            &event.appointment_id,
            &caregiver_id,
            SenderType::AiAgent,
            &reply,
            true,
        )
        .await?;
        info!(
            appointment_id = %event.appointment_id,
            caregiver_id = %caregiver_id,
            "persisted digital-twin reply"
        );
        Ok(())
    }
}

#[async_trait]
impl QueueHandler for InterpretationRouter {
    async fn handle(&self, payload: &str) -> Result<(), CarereadyError> {
        let event: InboundMessageEvent = match serde_json::from_str(payload) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "dropping malformed inbound message");
                return Ok(());
            }
        };
        self.route(event).await
    }
}
