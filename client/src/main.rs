//! FitTrack command-line client
//!
//! Drives the client core against a FitTrack backend: log in, load the
//! week, mark exercises and meals, and inspect progress and streaks.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use fittrack_client::config::ClientConfig;
use fittrack_client::services::{
    AuthService, MealService, ProfileService, RolloverOutcome, RolloverService, WorkoutService,
};
use fittrack_client::{ClientError, ClientResult, ClientState, Session};
use fittrack_shared::validation::{validate_height_cm, validate_weight};
use fittrack_shared::{
    calculate_bmi_result, week_number_at, CompletionToggle, DayOfWeek, FitnessGoal,
    RegisterRequest,
};
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fittrack", version, about = "FitTrack workout and meal tracking")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(long)]
        email: String,
        /// Falls back to the FITTRACK_PASSWORD environment variable
        #[arg(long)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
    },
    /// Log out and forget the session
    Logout,
    /// Exchange the refresh token for a new access token
    Refresh,
    /// Show the plans of a week (default: current week)
    Week {
        #[arg(long)]
        week: Option<u32>,
    },
    /// Show one day of the current week
    Day { day: DayOfWeek },
    /// Mark an exercise complete
    Complete {
        day: DayOfWeek,
        exercise_id: String,
        /// Unmark instead
        #[arg(long)]
        undo: bool,
    },
    /// Mark a meal of a workout day complete
    Meal {
        day: DayOfWeek,
        meal_id: String,
        #[arg(long)]
        undo: bool,
    },
    /// Show the meal plan (one day or the whole week)
    Meals { day: Option<DayOfWeek> },
    /// Mark a meal plan meal as eaten
    Consume {
        day: DayOfWeek,
        meal_id: String,
        #[arg(long)]
        undo: bool,
    },
    /// Generate workout (or meal) plans for the current week
    Generate {
        #[arg(long)]
        goal: Option<FitnessGoal>,
        #[arg(long)]
        meals: bool,
    },
    /// Show current and longest streak
    Streak,
    /// Show weekly completion progress
    Progress {
        #[arg(long)]
        week: Option<u32>,
    },
    /// Show nutrition progress of a day
    Nutrition { day: DayOfWeek },
    /// Run the week rollover check
    Rollover,
    /// BMI from the given measurements or the profile
    Bmi {
        #[arg(long)]
        height_cm: Option<f64>,
        #[arg(long)]
        weight_kg: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::load()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        base_url = %config.api.base_url,
        "Starting FitTrack client"
    );

    let state = ClientState::from_config(config)?;
    let mut session = Session::new();

    if let Err(err) = run(&state, &mut session, cli.command).await {
        error!(code = err.code(), error = %err, "Command failed");
        eprintln!("error: {}", err);
        if err.requires_login() {
            eprintln!("renew with: fittrack refresh, or log in again with: fittrack login --email <email>");
        }
        std::process::exit(1);
    }
    Ok(())
}

async fn run(state: &ClientState, session: &mut Session, command: Commands) -> ClientResult<()> {
    let now = Utc::now();

    match command {
        Commands::Login { email, password } => {
            let password = password_arg(password)?;
            let user = AuthService::login(state, session, &email, &password).await?;
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        Commands::Register { name, email, password } => {
            let request = RegisterRequest {
                name,
                email,
                password: password_arg(password)?,
            };
            let user = AuthService::register(state, session, request).await?;
            println!("Registered {} <{}>", user.name, user.email);
        }
        Commands::Logout => {
            // An expired session still gets cleared
            match AuthService::restore(state, session, now).await {
                Ok(_) => {}
                Err(err) if err.requires_login() => {}
                Err(err) => warn!(error = %err, "Could not restore session before logout"),
            }
            AuthService::logout(state, session).await?;
            println!("Logged out");
        }
        Commands::Refresh => {
            AuthService::refresh(state, session).await?;
            println!("Session refreshed");
        }
        Commands::Week { week } => {
            resume_with_rollover(state, session).await?;
            let week = week.unwrap_or_else(|| week_number_at(now));
            print_json(&WorkoutService::load_week(state, session, week).await?)?;
        }
        Commands::Day { day } => {
            resume_with_rollover(state, session).await?;
            WorkoutService::load_week(state, session, week_number_at(now)).await?;
            print_json(&WorkoutService::select_day(session, day)?)?;
        }
        Commands::Complete { day, exercise_id, undo } => {
            resume_with_rollover(state, session).await?;
            WorkoutService::load_week(state, session, week_number_at(now)).await?;
            let toggle = CompletionToggle::new(exercise_id, !undo);
            let plan = WorkoutService::toggle_exercise(state, session, day, &toggle, now).await?;
            print_json(&plan)?;
        }
        Commands::Meal { day, meal_id, undo } => {
            resume_with_rollover(state, session).await?;
            WorkoutService::load_week(state, session, week_number_at(now)).await?;
            let plan = WorkoutService::toggle_meal(state, session, day, &meal_id, !undo).await?;
            print_json(&plan)?;
        }
        Commands::Meals { day } => {
            resume(state, session).await?;
            match day {
                Some(day) => print_json(&MealService::load_day(state, session, day, now).await?)?,
                None => print_json(&MealService::load_meals(state, session, now).await?)?,
            }
        }
        Commands::Consume { day, meal_id, undo } => {
            resume(state, session).await?;
            MealService::load_meals(state, session, now).await?;
            let plan = MealService::consume(state, session, day, &meal_id, !undo).await?;
            print_json(&plan)?;
        }
        Commands::Generate { goal, meals } => {
            resume(state, session).await?;
            if meals {
                print_json(&MealService::generate(state, session, goal, now).await?)?;
            } else {
                print_json(&WorkoutService::generate_week(state, session, goal, now).await?)?;
            }
        }
        Commands::Streak => {
            resume_with_rollover(state, session).await?;
            print_json(&WorkoutService::streak(state, session, now).await?)?;
        }
        Commands::Progress { week } => {
            resume_with_rollover(state, session).await?;
            let week = week.unwrap_or_else(|| week_number_at(now));
            print_json(&WorkoutService::weekly_progress(state, session, week).await?)?;
        }
        Commands::Nutrition { day } => {
            resume(state, session).await?;
            MealService::load_day(state, session, day, now).await?;
            print_json(&MealService::nutrition_progress(session, day)?)?;
        }
        Commands::Rollover => {
            resume(state, session).await?;
            print_json(&RolloverService::check(state, session, now).await?)?;
        }
        Commands::Bmi { height_cm, weight_kg } => match (height_cm, weight_kg) {
            (Some(height_cm), Some(weight_kg)) => {
                validate_height_cm(height_cm).map_err(ClientError::Validation)?;
                validate_weight(weight_kg).map_err(ClientError::Validation)?;
                let result = calculate_bmi_result(height_cm, weight_kg)
                    .ok_or_else(|| ClientError::Validation("Invalid measurements".to_string()))?;
                print_json(&result)?;
            }
            _ => {
                resume(state, session).await?;
                print_json(&ProfileService::health_insights(state, session).await?)?;
            }
        },
    }
    Ok(())
}

/// Restore the persisted session or fail with a login prompt
async fn resume(state: &ClientState, session: &mut Session) -> ClientResult<()> {
    match AuthService::restore(state, session, Utc::now()).await? {
        Some(_) => Ok(()),
        None => Err(ClientError::Unauthorized("Not logged in".to_string())),
    }
}

/// Restore the session and run the week rollover check
async fn resume_with_rollover(state: &ClientState, session: &mut Session) -> ClientResult<()> {
    resume(state, session).await?;
    let outcome = match RolloverService::check(state, session, Utc::now()).await {
        Ok(outcome) => outcome,
        Err(err) if err.requires_login() => return Err(err),
        Err(err) => {
            warn!(error = %err, "Rollover check failed");
            return Ok(());
        }
    };
    match outcome {
        RolloverOutcome::RolledOver { from_week, to_week, .. } => {
            eprintln!("Week {} archived, plans for week {} generated", from_week, to_week);
        }
        RolloverOutcome::Failed { to_week, reason, .. } => {
            eprintln!("Could not start week {} yet ({}); will retry next time", to_week, reason);
        }
        RolloverOutcome::Initialized { .. } | RolloverOutcome::UpToDate { .. } => {}
    }
    Ok(())
}

fn password_arg(password: Option<String>) -> ClientResult<String> {
    password
        .or_else(|| std::env::var("FITTRACK_PASSWORD").ok())
        .ok_or_else(|| ClientError::Validation("Password is required (--password or FITTRACK_PASSWORD)".to_string()))
}

fn print_json<T: Serialize>(value: &T) -> ClientResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| ClientError::Internal(e.into()))?;
    println!("{}", json);
    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if ClientConfig::is_production() {
            "fittrack_client=warn,fittrack=warn".into()
        } else {
            "fittrack_client=info,fittrack=info,reqwest=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if ClientConfig::is_production() {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
