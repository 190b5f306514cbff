//! `sportsbuddy` command line client.
//!
//! Every invocation restores the saved session from the data directory, runs
//! one command and exits. Logs go to stderr, results to stdout.
//!
//! A run starts in remote mode and only drops to mock mode when the backend
//! fails it. With no remote session stored, bootstrap ends unauthenticated
//! without looking at the mock user, so a mock login made while the backend
//! was down does not carry over to the next run. While the backend is down,
//! commands that need a signed-in user fail with "not signed in".

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use buddy_client::{ClientConfig, FileStorage, SportsBuddy, Storage};
use buddy_core::{
    EventLocation, NewEvent, ProfileDetails, ProfileUpdate, RequiredSkill, SportsEvent,
};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sportsbuddy")]
#[command(about = "Sync your SportsBuddy events, matches and achievements")]
struct Cli {
    /// Backend function URL (overrides the project-derived URL)
    #[arg(long, env = "SPORTSBUDDY_BASE_URL")]
    base_url: Option<String>,

    /// Backend project identifier
    #[arg(long, env = "SPORTSBUDDY_PROJECT_ID")]
    project_id: Option<String>,

    /// Public anonymous key
    #[arg(long, env = "SPORTSBUDDY_ANON_KEY")]
    anon_key: String,

    /// Directory holding the session and cached user data
    #[arg(long, env = "SPORTSBUDDY_DATA_DIR", default_value = ".sportsbuddy")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show session mode, signed-in user and record summary
    Status,
    /// Check that the backend answers
    Health,
    Login {
        email: String,
        password: String,
    },
    Logout,
    Register {
        email: String,
        password: String,
        name: String,
    },
    /// Update the signed-in user's profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    /// Print the full user data record as JSON
    Show,
    Join {
        event_id: String,
    },
    Leave {
        event_id: String,
    },
    Like {
        match_id: String,
    },
    Pass {
        match_id: String,
    },
    /// Forget every passed match
    ResetPassed,
    Achieve {
        achievement_id: String,
    },
    /// List public events
    Events,
    CreateEvent {
        #[arg(long)]
        title: String,
        #[arg(long)]
        sport: String,
        /// Day of the event, `YYYY-MM-DD`
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        start_time: String,
        #[arg(long)]
        end_time: String,
        #[arg(long)]
        location: String,
        #[arg(long, default_value_t = 10)]
        max_participants: u32,
        #[arg(long, default_value = "")]
        description: String,
    },
}

impl Cli {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        match (&self.base_url, &self.project_id) {
            (Some(url), _) => Ok(ClientConfig::with_base_url(url, &self.anon_key)),
            (None, Some(project_id)) => Ok(ClientConfig::new(project_id, &self.anon_key)),
            (None, None) => bail!("either --base-url or --project-id must be given"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.client_config()?;
    let storage: Arc<dyn Storage> = Arc::new(
        FileStorage::open(&cli.data_dir)
            .with_context(|| format!("opening data dir {}", cli.data_dir.display()))?,
    );

    let mut client = SportsBuddy::new(config, storage);
    let state = client.auth_mut().bootstrap().await;
    tracing::info!("Bootstrap finished in {state:?} ({} mode)", client.context().mode());

    run(&mut client, cli.command).await
}

async fn run(client: &mut SportsBuddy, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Status => {
            if !client.preferences().has_seen_welcome() {
                println!("Welcome to SportsBuddy!");
                client.preferences().mark_welcome_seen()?;
            }
            println!("mode: {}", client.context().mode());
            println!("state: {:?}", client.auth().state());
            match client.auth().user() {
                Some(user) => {
                    println!("user: {} <{}> ({})", user.name, user.email, user.id);
                    let record = client.user_data().load(&user.id).await;
                    println!(
                        "events: {}, created: {}, liked: {}, passed: {}, achievements: {}",
                        record.events.len(),
                        record.created_events.len(),
                        record.liked_matches.len(),
                        record.passed_matches.len(),
                        record.achievements.len()
                    );
                }
                None => println!("user: not signed in"),
            }
        }
        Command::Health => {
            let health = client.api().health().await?;
            println!("backend: {}", health.status);
        }
        Command::Login { email, password } => {
            if !client.auth_mut().login(&email, &password).await {
                bail!("login failed: invalid credentials");
            }
            report_signed_in(client);
        }
        Command::Logout => {
            client.auth_mut().logout().await;
            println!("signed out");
        }
        Command::Register {
            email,
            password,
            name,
        } => {
            if !client.auth_mut().register(&email, &password, &name).await {
                bail!("registration failed");
            }
            report_signed_in(client);
        }
        Command::Profile {
            name,
            bio,
            location,
        } => {
            let current = client
                .auth()
                .user()
                .map(|user| user.profile.clone())
                .context("not signed in, run `sportsbuddy login` first")?;
            let profile = (bio.is_some() || location.is_some()).then(|| ProfileDetails {
                bio: bio.unwrap_or(current.bio.clone()),
                location: location.unwrap_or(current.location.clone()),
                ..current
            });
            let update = ProfileUpdate {
                name,
                avatar_url: None,
                profile,
            };
            client.auth_mut().update_user(update).await;
            report_signed_in(client);
        }
        Command::Show => {
            let user_id = signed_in_user(client)?;
            let record = client.user_data().load(&user_id).await;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Join { event_id } => {
            let user_id = signed_in_user(client)?;
            report_saved(client.user_data().join_event(&user_id, &event_id).await)?;
        }
        Command::Leave { event_id } => {
            let user_id = signed_in_user(client)?;
            report_saved(client.user_data().leave_event(&user_id, &event_id).await)?;
        }
        Command::Like { match_id } => {
            let user_id = signed_in_user(client)?;
            report_saved(client.user_data().like_match(&user_id, &match_id).await)?;
        }
        Command::Pass { match_id } => {
            let user_id = signed_in_user(client)?;
            report_saved(client.user_data().pass_match(&user_id, &match_id).await)?;
        }
        Command::ResetPassed => {
            let user_id = signed_in_user(client)?;
            report_saved(client.user_data().reset_passed_matches(&user_id).await)?;
        }
        Command::Achieve { achievement_id } => {
            let user_id = signed_in_user(client)?;
            report_saved(
                client
                    .user_data()
                    .unlock_achievement(&user_id, &achievement_id)
                    .await,
            )?;
        }
        Command::Events => {
            for event in client.api().list_events().await? {
                println!(
                    "{}  {}  {} {}-{}  {} ({}/{})",
                    event.id,
                    event.title,
                    event.date,
                    event.start_time,
                    event.end_time,
                    event.location.name,
                    event.current_participants.len(),
                    event.max_participants
                );
            }
        }
        Command::CreateEvent {
            title,
            sport,
            date,
            start_time,
            end_time,
            location,
            max_participants,
            description,
        } => {
            let user_id = signed_in_user(client)?;
            let input = NewEvent {
                title,
                description,
                sport,
                skill_level_required: RequiredSkill::Any,
                date,
                start_time,
                end_time,
                location: EventLocation {
                    name: location,
                    ..Default::default()
                },
                max_participants,
                is_public: true,
                tags: Vec::new(),
            };

            let event = create_event(client, &user_id, input).await;
            report_saved(client.user_data().mark_event_created(&user_id, &event.id).await)?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
    }
    Ok(())
}

/// Creates the event on the backend, or as a local-only event when that fails.
async fn create_event(client: &SportsBuddy, user_id: &str, input: NewEvent) -> SportsEvent {
    if client.context().is_remote() {
        match client.api().create_event(&input).await {
            Ok(event) => return event,
            Err(err) => tracing::warn!("Creating event remotely failed, keeping it local: {err}"),
        }
    }
    let id = format!("event-{}", Utc::now().timestamp_millis());
    SportsEvent::create(id, user_id.to_string(), input, Utc::now())
}

fn signed_in_user(client: &SportsBuddy) -> anyhow::Result<String> {
    client
        .auth()
        .user()
        .map(|user| user.id.clone())
        .context("not signed in, run `sportsbuddy login` first")
}

fn report_signed_in(client: &SportsBuddy) {
    if let Some(user) = client.auth().user() {
        println!(
            "signed in as {} <{}> ({} mode)",
            user.name,
            user.email,
            client.context().mode()
        );
    }
}

fn report_saved(saved: bool) -> anyhow::Result<()> {
    if !saved {
        bail!("could not save user data locally");
    }
    println!("saved");
    Ok(())
}
