// ABOUTME: SQLite storage for the admin credential and archived course records
// ABOUTME: Handles migrations, credential rotation, course CRUD, and statistics queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Database Management
//!
//! This module provides the storage layer for the course archive server:
//! the single admin credential row, the course table, and the grouped
//! aggregation queries behind the statistics endpoints. SQLite's
//! transactional guarantees give the read-compare-write sequence of
//! password rotation its atomicity; no application-level locking exists.

use crate::models::{AdminCredential, Course, NewCourse};
use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Row, Sqlite, SqlitePool};

/// Overview totals across all archived courses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewTotals {
    pub total_courses: i64,
    pub total_graduates: i64,
    pub total_hours: i64,
    pub total_beneficiaries: i64,
}

/// Course count for a single field, for the dashboard breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldCourseCount {
    pub name: String,
    pub count: i64,
}

/// Per-field totals for the field statistics endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTotals {
    pub name: String,
    pub total_courses: i64,
    pub total_graduates: i64,
    pub total_beneficiaries: i64,
    pub total_hours: i64,
}

/// Per-trainer totals for the trainer statistics endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainerTotals {
    pub name: String,
    pub phone: String,
    pub total_courses: i64,
    pub total_graduates: i64,
    pub total_hours: i64,
}

/// Courses started in one `YYYY-MM` bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    pub month: String,
    pub count: i64,
    pub graduates: i64,
}

/// Per-month breakdown within a single year
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearMonthBucket {
    pub month: i64,
    pub courses: i64,
    pub graduates: i64,
    pub hours: i64,
}

/// Database manager for credential and course storage
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or a migration fails
    pub async fn new(database_url: &str) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains(":memory:")
            && !database_url.contains('?')
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        // An in-memory database exists per connection, so the pool must hold
        // exactly one connection and never recycle it
        let pool = if connection_options.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(&connection_options)
                .await?
        } else {
            SqlitePool::connect(&connection_options).await?
        };

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Run database migrations
    pub async fn migrate(&self) -> Result<()> {
        // Single-row credential table; provisioning is the only writer of new rows
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS admin_credentials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS courses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                course_number TEXT NOT NULL,
                course_field TEXT NOT NULL,
                course_name TEXT NOT NULL,
                number_of_beneficiaries INTEGER NOT NULL DEFAULT 0,
                number_of_graduates INTEGER NOT NULL DEFAULT 0,
                course_hours INTEGER NOT NULL DEFAULT 0,
                course_start_date TEXT NOT NULL,
                course_end_date TEXT NOT NULL,
                trainer_name TEXT NOT NULL,
                trainer_phone_number TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Indexes for the grouped statistics queries
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_courses_field ON courses(course_field)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_courses_start_date ON courses(course_start_date)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_courses_trainer ON courses(trainer_name)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    // ── Credential store ────────────────────────────────────────────────

    /// Fetch the sole admin credential, if one has been provisioned.
    /// There is no identity field to look up by; the first row is the
    /// lookup key.
    pub async fn get_admin(&self) -> Result<Option<AdminCredential>> {
        let row = sqlx::query(
            "SELECT id, password_hash, created_at, updated_at
             FROM admin_credentials ORDER BY id LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_credential(&row)).transpose()
    }

    /// Fetch the admin credential by id (the token subject)
    pub async fn get_admin_by_id(&self, id: i64) -> Result<Option<AdminCredential>> {
        let row = sqlx::query(
            "SELECT id, password_hash, created_at, updated_at
             FROM admin_credentials WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_credential(&row)).transpose()
    }

    /// Insert the admin credential. Provisioning-only; fails if a
    /// credential already exists.
    pub async fn insert_admin(&self, password_hash: &str) -> Result<i64> {
        if self.get_admin().await?.is_some() {
            return Err(anyhow::anyhow!("admin credential already provisioned"));
        }

        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO admin_credentials (password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?2)",
        )
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Overwrite the stored password hash in place (credential rotation)
    pub async fn update_admin_password(&self, id: i64, password_hash: &str) -> Result<()> {
        sqlx::query(
            "UPDATE admin_credentials SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
        )
        .bind(password_hash)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Delete all credential rows. Used by the seeder's `--reset` flag only.
    pub async fn delete_admins(&self) -> Result<()> {
        sqlx::query("DELETE FROM admin_credentials")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ── Courses ─────────────────────────────────────────────────────────

    /// Insert a course and return the stored record
    pub async fn create_course(&self, new: &NewCourse) -> Result<Course> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO courses (
                course_number, course_field, course_name,
                number_of_beneficiaries, number_of_graduates, course_hours,
                course_start_date, course_end_date,
                trainer_name, trainer_phone_number,
                created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        )
        .bind(&new.course_number)
        .bind(&new.course_field)
        .bind(&new.course_name)
        .bind(new.number_of_beneficiaries)
        .bind(new.number_of_graduates)
        .bind(new.course_hours)
        .bind(new.course_start_date)
        .bind(new.course_end_date)
        .bind(&new.trainer_name)
        .bind(&new.trainer_phone_number)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.get_course(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("course {id} vanished after insert"))
    }

    /// Fetch a course by id
    pub async fn get_course(&self, id: i64) -> Result<Option<Course>> {
        let row = sqlx::query("SELECT * FROM courses WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_course(&row)).transpose()
    }

    /// List all courses, newest start date first
    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let rows = sqlx::query("SELECT * FROM courses ORDER BY course_start_date DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_course).collect()
    }

    /// The most recently started courses, for the dashboard
    pub async fn recent_courses(&self, limit: i64) -> Result<Vec<Course>> {
        let rows = sqlx::query(
            "SELECT * FROM courses ORDER BY course_start_date DESC, id DESC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::row_to_course).collect()
    }

    /// Replace all fields of a course. Returns false if the id is unknown.
    pub async fn update_course(&self, id: i64, new: &NewCourse) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE courses SET
                course_number = ?1, course_field = ?2, course_name = ?3,
                number_of_beneficiaries = ?4, number_of_graduates = ?5, course_hours = ?6,
                course_start_date = ?7, course_end_date = ?8,
                trainer_name = ?9, trainer_phone_number = ?10,
                updated_at = ?11
             WHERE id = ?12",
        )
        .bind(&new.course_number)
        .bind(&new.course_field)
        .bind(&new.course_name)
        .bind(new.number_of_beneficiaries)
        .bind(new.number_of_graduates)
        .bind(new.course_hours)
        .bind(new.course_start_date)
        .bind(new.course_end_date)
        .bind(&new.trainer_name)
        .bind(&new.trainer_phone_number)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a course. Returns false if the id is unknown.
    pub async fn delete_course(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // ── Statistics ──────────────────────────────────────────────────────

    /// Totals across the whole archive
    pub async fn overview_totals(&self) -> Result<OverviewTotals> {
        let row = sqlx::query(
            "SELECT
                COUNT(*) AS total_courses,
                COALESCE(SUM(number_of_graduates), 0) AS total_graduates,
                COALESCE(SUM(course_hours), 0) AS total_hours,
                COALESCE(SUM(number_of_beneficiaries), 0) AS total_beneficiaries
             FROM courses",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(OverviewTotals {
            total_courses: row.try_get("total_courses")?,
            total_graduates: row.try_get("total_graduates")?,
            total_hours: row.try_get("total_hours")?,
            total_beneficiaries: row.try_get("total_beneficiaries")?,
        })
    }

    /// Course counts grouped by field, most populated first
    pub async fn courses_by_field(&self) -> Result<Vec<FieldCourseCount>> {
        let rows = sqlx::query(
            "SELECT course_field AS name, COUNT(*) AS count
             FROM courses GROUP BY course_field ORDER BY count DESC, name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(FieldCourseCount {
                    name: row.try_get("name")?,
                    count: row.try_get("count")?,
                })
            })
            .collect()
    }

    /// Per-field aggregate totals
    pub async fn field_totals(&self) -> Result<Vec<FieldTotals>> {
        let rows = sqlx::query(
            "SELECT
                course_field AS name,
                COUNT(*) AS total_courses,
                COALESCE(SUM(number_of_graduates), 0) AS total_graduates,
                COALESCE(SUM(number_of_beneficiaries), 0) AS total_beneficiaries,
                COALESCE(SUM(course_hours), 0) AS total_hours
             FROM courses GROUP BY course_field ORDER BY total_courses DESC, name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(FieldTotals {
                    name: row.try_get("name")?,
                    total_courses: row.try_get("total_courses")?,
                    total_graduates: row.try_get("total_graduates")?,
                    total_beneficiaries: row.try_get("total_beneficiaries")?,
                    total_hours: row.try_get("total_hours")?,
                })
            })
            .collect()
    }

    /// Per-trainer aggregate totals, busiest trainer first
    pub async fn trainer_totals(&self) -> Result<Vec<TrainerTotals>> {
        let rows = sqlx::query(
            "SELECT
                trainer_name AS name,
                trainer_phone_number AS phone,
                COUNT(*) AS total_courses,
                COALESCE(SUM(number_of_graduates), 0) AS total_graduates,
                COALESCE(SUM(course_hours), 0) AS total_hours
             FROM courses
             GROUP BY trainer_name, trainer_phone_number
             ORDER BY total_courses DESC, name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(TrainerTotals {
                    name: row.try_get("name")?,
                    phone: row.try_get("phone")?,
                    total_courses: row.try_get("total_courses")?,
                    total_graduates: row.try_get("total_graduates")?,
                    total_hours: row.try_get("total_hours")?,
                })
            })
            .collect()
    }

    /// `YYYY-MM` buckets of course starts since the given date, newest first
    pub async fn courses_by_month(&self, since: NaiveDate) -> Result<Vec<MonthBucket>> {
        let rows = sqlx::query(
            "SELECT
                strftime('%Y-%m', course_start_date) AS month,
                COUNT(*) AS count,
                COALESCE(SUM(number_of_graduates), 0) AS graduates
             FROM courses
             WHERE course_start_date >= ?1
             GROUP BY strftime('%Y-%m', course_start_date)
             ORDER BY month DESC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(MonthBucket {
                    month: row.try_get("month")?,
                    count: row.try_get("count")?,
                    graduates: row.try_get("graduates")?,
                })
            })
            .collect()
    }

    /// Totals for courses started within one calendar year
    pub async fn yearly_totals(&self, year: i32) -> Result<OverviewTotals> {
        let (start, end) = year_bounds(year)?;

        let row = sqlx::query(
            "SELECT
                COUNT(*) AS total_courses,
                COALESCE(SUM(number_of_graduates), 0) AS total_graduates,
                COALESCE(SUM(course_hours), 0) AS total_hours,
                COALESCE(SUM(number_of_beneficiaries), 0) AS total_beneficiaries
             FROM courses
             WHERE course_start_date >= ?1 AND course_start_date <= ?2",
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(OverviewTotals {
            total_courses: row.try_get("total_courses")?,
            total_graduates: row.try_get("total_graduates")?,
            total_hours: row.try_get("total_hours")?,
            total_beneficiaries: row.try_get("total_beneficiaries")?,
        })
    }

    /// Month-by-month breakdown within one calendar year, January first
    pub async fn yearly_monthly_breakdown(&self, year: i32) -> Result<Vec<YearMonthBucket>> {
        let (start, end) = year_bounds(year)?;

        let rows = sqlx::query(
            "SELECT
                CAST(strftime('%m', course_start_date) AS INTEGER) AS month,
                COUNT(*) AS courses,
                COALESCE(SUM(number_of_graduates), 0) AS graduates,
                COALESCE(SUM(course_hours), 0) AS hours
             FROM courses
             WHERE course_start_date >= ?1 AND course_start_date <= ?2
             GROUP BY strftime('%m', course_start_date)
             ORDER BY month",
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(YearMonthBucket {
                    month: row.try_get("month")?,
                    courses: row.try_get("courses")?,
                    graduates: row.try_get("graduates")?,
                    hours: row.try_get("hours")?,
                })
            })
            .collect()
    }

    // ── Row mappers ─────────────────────────────────────────────────────

    fn row_to_credential(row: &sqlx::sqlite::SqliteRow) -> Result<AdminCredential> {
        Ok(AdminCredential {
            id: row.try_get("id")?,
            password_hash: row.try_get("password_hash")?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
            updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
        })
    }

    fn row_to_course(row: &sqlx::sqlite::SqliteRow) -> Result<Course> {
        Ok(Course {
            id: row.try_get("id")?,
            course_number: row.try_get("course_number")?,
            course_field: row.try_get("course_field")?,
            course_name: row.try_get("course_name")?,
            number_of_beneficiaries: row.try_get("number_of_beneficiaries")?,
            number_of_graduates: row.try_get("number_of_graduates")?,
            course_hours: row.try_get("course_hours")?,
            course_start_date: row.try_get("course_start_date")?,
            course_end_date: row.try_get("course_end_date")?,
            trainer_name: row.try_get("trainer_name")?,
            trainer_phone_number: row.try_get("trainer_phone_number")?,
            created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
            updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
        })
    }
}

/// First and last day of a calendar year
fn year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate)> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| anyhow::anyhow!("invalid year: {year}"))?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)
        .ok_or_else(|| anyhow::anyhow!("invalid year: {year}"))?;
    Ok((start, end))
}

fn parse_timestamp(value: &str) -> Result<chrono::DateTime<Utc>> {
    Ok(chrono::DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

/// Current calendar year, for the yearly statistics default
#[must_use]
pub fn current_year() -> i32 {
    Utc::now().year()
}
