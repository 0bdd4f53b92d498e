// ABOUTME: Provisioning binary that seeds the single admin credential
// ABOUTME: Hashes a supplied or generated password and inserts it into the database
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Admin Seeding Binary
//!
//! The API serves exactly one admin credential and refuses logins until it
//! exists. This tool creates it. With `--reset` it replaces an existing
//! credential; otherwise seeding a provisioned database is an error.

use anyhow::{bail, Context, Result};
use clap::Parser;
use course_archive::database::Database;
use rand::{distributions::Alphanumeric, Rng};

/// Length of generated passwords when none is supplied
const GENERATED_PASSWORD_LEN: usize = 16;

#[derive(Parser)]
#[command(name = "seed-admin")]
#[command(about = "Provision the single admin credential for the course archive")]
pub struct Args {
    /// Admin password; a random one is generated and printed when omitted
    #[arg(long)]
    password: Option<String>,

    /// Database URL; falls back to the DATABASE_URL environment variable
    #[arg(long)]
    database_url: Option<String>,

    /// Replace an existing credential instead of failing
    #[arg(long)]
    reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let database_url = match args.database_url {
        Some(url) => url,
        None => std::env::var("DATABASE_URL")
            .context("DATABASE_URL is not set and --database-url was not given")?,
    };

    let database = Database::new(&database_url).await?;
    database.migrate().await?;

    if database.get_admin().await?.is_some() {
        if args.reset {
            database.delete_admins().await?;
            println!("Existing admin credential removed");
        } else {
            bail!("An admin credential already exists; pass --reset to replace it");
        }
    }

    let (password, generated) = match args.password {
        Some(p) => (p, false),
        None => (generate_password(), true),
    };

    let hash = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;
    let id = database.insert_admin(&hash).await?;

    println!("Admin credential created (id {id})");
    if generated {
        println!("Generated password: {password}");
        println!("Store it now; it is not recoverable from the database");
    }

    Ok(())
}

fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}
