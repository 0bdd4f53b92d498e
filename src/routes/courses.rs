// ABOUTME: Course CRUD route handlers for the archive
// ABOUTME: List, fetch, create, update, and delete archived course records
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Course CRUD routes. All of them sit behind the verification gate;
//! handlers are thin wrappers over the database layer.

use crate::errors::{AppError, AppResult, FieldError};
use crate::models::{Course, NewCourse};
use crate::routes::ApiContext;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Envelope for course payloads
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Course routes, mounted under `/api/courses`
pub fn routes() -> Router<Arc<ApiContext>> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route(
            "/:id",
            get(get_course).put(update_course).delete(delete_course),
        )
}

/// `GET /api/courses`. All courses, newest start date first
async fn list_courses(State(context): State<Arc<ApiContext>>) -> AppResult<impl IntoResponse> {
    let courses = context.database.list_courses().await?;
    Ok(Json(CourseResponse {
        success: true,
        data: courses,
    }))
}

/// `GET /api/courses/:id`
async fn get_course(
    State(context): State<Arc<ApiContext>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    let course = context
        .database
        .get_course(id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;

    Ok(Json(CourseResponse {
        success: true,
        data: course,
    }))
}

/// `POST /api/courses`
async fn create_course(
    State(context): State<Arc<ApiContext>>,
    Json(new): Json<NewCourse>,
) -> AppResult<impl IntoResponse> {
    let field_errors = validate_course(&new);
    if !field_errors.is_empty() {
        return Err(AppError::validation(field_errors));
    }

    let course: Course = context.database.create_course(&new).await?;
    info!(course_id = course.id, number = %course.course_number, "Course created");

    Ok(Json(CourseResponse {
        success: true,
        data: course,
    }))
}

/// `PUT /api/courses/:id`. Full replacement of an existing record
async fn update_course(
    State(context): State<Arc<ApiContext>>,
    Path(id): Path<i64>,
    Json(new): Json<NewCourse>,
) -> AppResult<impl IntoResponse> {
    let field_errors = validate_course(&new);
    if !field_errors.is_empty() {
        return Err(AppError::validation(field_errors));
    }

    if !context.database.update_course(id, &new).await? {
        return Err(AppError::not_found("Course"));
    }

    let course = context
        .database
        .get_course(id)
        .await?
        .ok_or_else(|| AppError::not_found("Course"))?;
    info!(course_id = id, "Course updated");

    Ok(Json(CourseResponse {
        success: true,
        data: course,
    }))
}

/// `DELETE /api/courses/:id`
async fn delete_course(
    State(context): State<Arc<ApiContext>>,
    Path(id): Path<i64>,
) -> AppResult<impl IntoResponse> {
    if !context.database.delete_course(id).await? {
        return Err(AppError::not_found("Course"));
    }
    info!(course_id = id, "Course deleted");

    Ok(Json(crate::routes::auth::Ack {
        success: true,
        message: "Course deleted".into(),
    }))
}

/// Field validation mirroring the dashboard form rules
fn validate_course(new: &NewCourse) -> Vec<FieldError> {
    let mut errors = Vec::new();

    let required = [
        ("courseNumber", &new.course_number),
        ("courseField", &new.course_field),
        ("courseName", &new.course_name),
        ("trainerName", &new.trainer_name),
        ("trainerPhoneNumber", &new.trainer_phone_number),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(FieldError::new(field, format!("{field} is required")));
        }
    }

    if new.number_of_beneficiaries < 1 {
        errors.push(FieldError::new(
            "numberOfBeneficiaries",
            "Must be at least 1",
        ));
    }
    if new.number_of_graduates < 0 {
        errors.push(FieldError::new("numberOfGraduates", "Cannot be negative"));
    }
    if new.course_hours < 1 {
        errors.push(FieldError::new("courseHours", "Must be at least 1 hour"));
    }
    if new.course_end_date < new.course_start_date {
        errors.push(FieldError::new(
            "courseEndDate",
            "End date cannot precede start date",
        ));
    }

    errors
}
