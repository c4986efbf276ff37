// SPDX-FileCopyrightText: 2026 Careready Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for the storage test modules.

use careready_core::types::{CaregiverFacts, ClientFacts, IngestionPayload};
use tempfile::tempdir;

use crate::database::Database;
use crate::queries::facts;

pub(crate) async fn setup_db() -> (Database, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
    (db, dir)
}

pub(crate) fn sample_payload() -> IngestionPayload {
    IngestionPayload {
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
    }
}

/// Ingest the sample payload and return the internal appointment id.
pub(crate) async fn seed_appointment(db: &Database) -> String {
    facts::upsert_appointment(db, &sample_payload()).await.unwrap()
}
