// ABOUTME: Integration tests for the statistics routes
// ABOUTME: Covers dashboard, field, trainer, and yearly aggregation endpoints

mod common;
mod helpers;

use anyhow::Result;
use axum::Router;
use chrono::{Datelike, NaiveDate, Utc};
use course_archive::{database::Database, models::NewCourse};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

use common::{build_test_app, create_test_database, sample_course, seed_test_admin, TEST_PASSWORD};

async fn login_token(app: Router) -> String {
    let response = AxumTestRequest::post("/auth/login")
        .json(&json!({ "password": TEST_PASSWORD }))
        .send(app)
        .await;
    let body: Value = response.json();
    body["token"].as_str().expect("token").to_owned()
}

fn course_on(number: &str, field: &str, trainer: &str, start: NaiveDate, graduates: i64) -> NewCourse {
    NewCourse {
        course_field: field.to_owned(),
        trainer_name: trainer.to_owned(),
        number_of_graduates: graduates,
        course_start_date: start,
        course_end_date: start,
        ..sample_course(number)
    }
}

/// Three courses starting this month: two IT courses by the same trainer
/// and one administration course by another.
async fn seed_current_courses(database: &Database) -> Result<()> {
    let today = Utc::now().date_naive();
    database
        .create_course(&course_on("C-1", "IT", "Layla Hassan", today, 10))
        .await?;
    database
        .create_course(&course_on("C-2", "IT", "Layla Hassan", today, 5))
        .await?;
    database
        .create_course(&course_on("C-3", "Administration", "Omar Saleh", today, 8))
        .await?;
    Ok(())
}

#[tokio::test]
async fn test_stats_routes_require_authentication() -> Result<()> {
    let database = create_test_database().await?;
    seed_test_admin(&database).await?;
    let app = build_test_app(database);

    for uri in ["/api/stats/dashboard", "/api/stats/fields", "/api/stats/trainers", "/api/stats/yearly"] {
        let response = AxumTestRequest::get(uri).send(app.clone()).await;
        assert_eq!(response.status(), 401, "expected 401 for {uri}");
    }
    Ok(())
}

#[tokio::test]
async fn test_dashboard_aggregates() -> Result<()> {
    let database = create_test_database().await?;
    seed_test_admin(&database).await?;
    seed_current_courses(&database).await?;
    let app = build_test_app(database);
    let token = login_token(app.clone()).await;

    let response = AxumTestRequest::get("/api/stats/dashboard")
        .bearer(&token)
        .send(app)
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));

    let overview = &body["data"]["overview"];
    assert_eq!(overview["totalCourses"], json!(3));
    assert_eq!(overview["totalGraduates"], json!(23));
    assert_eq!(overview["totalHours"], json!(120));
    assert_eq!(overview["totalBeneficiaries"], json!(60));

    let by_field = body["data"]["coursesByField"]
        .as_array()
        .expect("coursesByField");
    let it = by_field
        .iter()
        .find(|f| f["name"] == json!("IT"))
        .expect("IT bucket");
    assert_eq!(it["count"], json!(2));

    assert_eq!(
        body["data"]["recentCourses"].as_array().expect("recent").len(),
        3
    );

    // All three courses started this month, so one bucket holds them all
    let this_month = Utc::now().format("%Y-%m").to_string();
    let months = body["data"]["coursesByMonth"].as_array().expect("months");
    let bucket = months
        .iter()
        .find(|m| m["month"] == json!(this_month))
        .expect("current month bucket");
    assert_eq!(bucket["count"], json!(3));
    Ok(())
}

#[tokio::test]
async fn test_field_totals() -> Result<()> {
    let database = create_test_database().await?;
    seed_test_admin(&database).await?;
    seed_current_courses(&database).await?;
    let app = build_test_app(database);
    let token = login_token(app.clone()).await;

    let response = AxumTestRequest::get("/api/stats/fields")
        .bearer(&token)
        .send(app)
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json();
    let it = body["data"]
        .as_array()
        .expect("fields")
        .iter()
        .find(|f| f["name"] == json!("IT"))
        .cloned()
        .expect("IT totals");
    assert_eq!(it["totalCourses"], json!(2));
    assert_eq!(it["totalGraduates"], json!(15));
    assert_eq!(it["totalHours"], json!(80));
    Ok(())
}

#[tokio::test]
async fn test_trainer_totals() -> Result<()> {
    let database = create_test_database().await?;
    seed_test_admin(&database).await?;
    seed_current_courses(&database).await?;
    let app = build_test_app(database);
    let token = login_token(app.clone()).await;

    let response = AxumTestRequest::get("/api/stats/trainers")
        .bearer(&token)
        .send(app)
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json();
    let layla = body["data"]
        .as_array()
        .expect("trainers")
        .iter()
        .find(|t| t["name"] == json!("Layla Hassan"))
        .cloned()
        .expect("trainer totals");
    assert_eq!(layla["totalCourses"], json!(2));
    assert_eq!(layla["totalGraduates"], json!(15));
    Ok(())
}

#[tokio::test]
async fn test_yearly_stats_filter_by_year() -> Result<()> {
    let database = create_test_database().await?;
    seed_test_admin(&database).await?;
    seed_current_courses(&database).await?;

    // One extra course archived under an old year
    let old_start = NaiveDate::from_ymd_opt(2019, 5, 10).expect("valid date");
    database
        .create_course(&course_on("C-OLD", "IT", "Omar Saleh", old_start, 12))
        .await?;

    let app = build_test_app(database);
    let token = login_token(app.clone()).await;

    let response = AxumTestRequest::get("/api/stats/yearly/2019")
        .bearer(&token)
        .send(app.clone())
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json();
    assert_eq!(body["data"]["year"], json!(2019));
    assert_eq!(body["data"]["overview"]["totalCourses"], json!(1));
    assert_eq!(body["data"]["overview"]["totalGraduates"], json!(12));

    let may = body["data"]["monthlyBreakdown"]
        .as_array()
        .expect("breakdown")
        .iter()
        .find(|m| m["month"] == json!(5))
        .cloned()
        .expect("May bucket");
    assert_eq!(may["courses"], json!(1));

    // The bare endpoint defaults to the current year
    let response = AxumTestRequest::get("/api/stats/yearly")
        .bearer(&token)
        .send(app)
        .await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json();
    assert_eq!(body["data"]["year"], json!(Utc::now().year()));
    assert_eq!(body["data"]["overview"]["totalCourses"], json!(3));
    Ok(())
}
