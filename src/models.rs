// ABOUTME: Domain models for the admin credential and archived course records
// ABOUTME: Serde structs with camelCase wire names for the dashboard client
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core data structures shared by the database layer and route handlers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The sole identity record. At most one row exists for the lifetime of a
/// deployment; zero rows means the deployment was never provisioned.
#[derive(Debug, Clone)]
pub struct AdminCredential {
    /// Stable identifier (token subject)
    pub id: i64,
    /// bcrypt hash of the current password, never the plaintext
    pub password_hash: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last rotation timestamp
    pub updated_at: DateTime<Utc>,
}

/// An archived training-course record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub course_number: String,
    pub course_field: String,
    pub course_name: String,
    pub number_of_beneficiaries: i64,
    pub number_of_graduates: i64,
    pub course_hours: i64,
    pub course_start_date: NaiveDate,
    pub course_end_date: NaiveDate,
    pub trainer_name: String,
    pub trainer_phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating or fully updating a course
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourse {
    pub course_number: String,
    pub course_field: String,
    pub course_name: String,
    pub number_of_beneficiaries: i64,
    pub number_of_graduates: i64,
    pub course_hours: i64,
    pub course_start_date: NaiveDate,
    pub course_end_date: NaiveDate,
    pub trainer_name: String,
    pub trainer_phone_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_wire_names_are_camel_case() {
        let course = NewCourse {
            course_number: "2024-001".into(),
            course_field: "Computing".into(),
            course_name: "Intro to Spreadsheets".into(),
            number_of_beneficiaries: 20,
            number_of_graduates: 18,
            course_hours: 40,
            course_start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            course_end_date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            trainer_name: "A. Trainer".into(),
            trainer_phone_number: "0500000000".into(),
        };

        let json = serde_json::to_string(&course).unwrap();
        assert!(json.contains("courseNumber"));
        assert!(json.contains("numberOfGraduates"));
        assert!(json.contains("trainerPhoneNumber"));
        assert!(!json.contains("course_number"));
    }
}
