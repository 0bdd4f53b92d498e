// ABOUTME: Integration tests for the SQLite storage layer
// ABOUTME: Covers credential provisioning, rotation, course CRUD, and file persistence

mod common;

use anyhow::Result;
use chrono::NaiveDate;
use course_archive::database::Database;

use common::{create_test_database, sample_course};

#[tokio::test]
async fn test_admin_provisioning_is_single_shot() -> Result<()> {
    let database = create_test_database().await?;

    assert!(database.get_admin().await?.is_none());

    let id = database.insert_admin("hash-one").await?;
    let admin = database.get_admin().await?.expect("admin exists");
    assert_eq!(admin.id, id);
    assert_eq!(admin.password_hash, "hash-one");

    // A second insert must be refused
    assert!(database.insert_admin("hash-two").await.is_err());

    // Reset clears the table and allows reseeding
    database.delete_admins().await?;
    assert!(database.get_admin().await?.is_none());
    database.insert_admin("hash-three").await?;
    Ok(())
}

#[tokio::test]
async fn test_password_rotation_updates_hash_in_place() -> Result<()> {
    let database = create_test_database().await?;
    let id = database.insert_admin("old-hash").await?;

    database.update_admin_password(id, "new-hash").await?;

    let admin = database
        .get_admin_by_id(id)
        .await?
        .expect("admin still exists");
    assert_eq!(admin.password_hash, "new-hash");
    assert!(admin.updated_at >= admin.created_at);
    Ok(())
}

#[tokio::test]
async fn test_course_crud_roundtrip() -> Result<()> {
    let database = create_test_database().await?;

    let created = database.create_course(&sample_course("2024-010")).await?;
    assert_eq!(created.course_number, "2024-010");
    assert_eq!(created.number_of_beneficiaries, 20);

    let fetched = database
        .get_course(created.id)
        .await?
        .expect("course exists");
    assert_eq!(fetched.course_name, created.course_name);
    assert_eq!(fetched.course_start_date, created.course_start_date);

    let mut replacement = sample_course("2024-010");
    replacement.number_of_graduates = 19;
    assert!(database.update_course(created.id, &replacement).await?);
    let fetched = database
        .get_course(created.id)
        .await?
        .expect("course exists");
    assert_eq!(fetched.number_of_graduates, 19);

    assert!(database.delete_course(created.id).await?);
    assert!(database.get_course(created.id).await?.is_none());
    assert!(!database.delete_course(created.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_recent_courses_orders_by_start_date() -> Result<()> {
    let database = create_test_database().await?;

    for (number, day) in [("A", 1), ("B", 15), ("C", 28)] {
        let mut course = sample_course(number);
        course.course_start_date = NaiveDate::from_ymd_opt(2024, 6, day).expect("valid date");
        course.course_end_date = course.course_start_date;
        database.create_course(&course).await?;
    }

    let recent = database.recent_courses(2).await?;
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].course_number, "C");
    assert_eq!(recent[1].course_number, "B");
    Ok(())
}

#[tokio::test]
async fn test_file_backed_database_persists_across_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("archive.db");
    let url = format!("sqlite:{}", path.display());

    {
        let database = Database::new(&url).await?;
        database.insert_admin("persisted-hash").await?;
        database.create_course(&sample_course("2024-020")).await?;
    }

    let database = Database::new(&url).await?;
    let admin = database.get_admin().await?.expect("admin persisted");
    assert_eq!(admin.password_hash, "persisted-hash");
    assert_eq!(database.list_courses().await?.len(), 1);
    Ok(())
}
