// ABOUTME: Statistics route handlers for the dashboard and reporting views
// ABOUTME: Aggregates course counts, graduates, hours, and beneficiaries
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Statistics routes. A handful of grouped SUM/COUNT queries over the
//! course table; no state of their own. All behind the verification gate.

use crate::database::{
    current_year, FieldCourseCount, FieldTotals, MonthBucket, OverviewTotals, TrainerTotals,
    YearMonthBucket,
};
use crate::errors::AppResult;
use crate::models::Course;
use crate::routes::ApiContext;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{Months, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How many courses the dashboard lists as "recent"
const RECENT_COURSE_LIMIT: i64 = 5;
/// How far back the dashboard month buckets reach
const DASHBOARD_MONTHS: u32 = 6;

/// Envelope for statistics payloads
#[derive(Debug, Serialize, Deserialize)]
pub struct StatsResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Dashboard aggregate payload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub overview: OverviewTotals,
    pub courses_by_field: Vec<FieldCourseCount>,
    pub recent_courses: Vec<Course>,
    pub courses_by_month: Vec<MonthBucket>,
}

/// Yearly aggregate payload
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyStats {
    pub year: i32,
    pub overview: OverviewTotals,
    pub monthly_breakdown: Vec<YearMonthBucket>,
}

/// Statistics routes, mounted under `/api/stats`
pub fn routes() -> Router<Arc<ApiContext>> {
    Router::new()
        .route("/dashboard", get(dashboard_stats))
        .route("/fields", get(field_stats))
        .route("/trainers", get(trainer_stats))
        .route("/yearly", get(yearly_stats_current))
        .route("/yearly/:year", get(yearly_stats))
}

/// `GET /api/stats/dashboard`
async fn dashboard_stats(State(context): State<Arc<ApiContext>>) -> AppResult<impl IntoResponse> {
    let overview = context.database.overview_totals().await?;
    let courses_by_field = context.database.courses_by_field().await?;
    let recent_courses = context.database.recent_courses(RECENT_COURSE_LIMIT).await?;

    let since = Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(DASHBOARD_MONTHS))
        .unwrap_or_else(|| Utc::now().date_naive());
    let courses_by_month = context.database.courses_by_month(since).await?;

    Ok(Json(StatsResponse {
        success: true,
        data: DashboardStats {
            overview,
            courses_by_field,
            recent_courses,
            courses_by_month,
        },
    }))
}

/// `GET /api/stats/fields`
async fn field_stats(State(context): State<Arc<ApiContext>>) -> AppResult<impl IntoResponse> {
    let data: Vec<FieldTotals> = context.database.field_totals().await?;
    Ok(Json(StatsResponse {
        success: true,
        data,
    }))
}

/// `GET /api/stats/trainers`
async fn trainer_stats(State(context): State<Arc<ApiContext>>) -> AppResult<impl IntoResponse> {
    let data: Vec<TrainerTotals> = context.database.trainer_totals().await?;
    Ok(Json(StatsResponse {
        success: true,
        data,
    }))
}

/// `GET /api/stats/yearly`, defaulting to the current calendar year
async fn yearly_stats_current(
    State(context): State<Arc<ApiContext>>,
) -> AppResult<impl IntoResponse> {
    yearly_payload(&context, current_year()).await.map(Json)
}

/// `GET /api/stats/yearly/:year`
async fn yearly_stats(
    State(context): State<Arc<ApiContext>>,
    Path(year): Path<i32>,
) -> AppResult<impl IntoResponse> {
    yearly_payload(&context, year).await.map(Json)
}

async fn yearly_payload(
    context: &ApiContext,
    year: i32,
) -> AppResult<StatsResponse<YearlyStats>> {
    let overview = context.database.yearly_totals(year).await?;
    let monthly_breakdown = context.database.yearly_monthly_breakdown(year).await?;

    Ok(StatsResponse {
        success: true,
        data: YearlyStats {
            year,
            overview,
            monthly_breakdown,
        },
    })
}
