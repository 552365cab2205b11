use std::{error::Error, process::ExitCode};

use clap::{Args, Parser, Subcommand};
use engine::status;
use migration::{Migrator, MigratorTrait};
use sea_orm::Database;

mod prompt;
mod users;

type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "countdown_admin")]
#[command(about = "Admin utilities for the project countdown (users and their data)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./countdown.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Manage users.
    #[command(subcommand)]
    User(UserCommand),
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// Create a user, prompting for the password.
    Create(UsernameArgs),
    /// Print the projects stored for a user.
    ShowData(UsernameArgs),
    /// Drop every project stored for a user.
    ResetData(ResetArgs),
}

#[derive(Args, Debug)]
struct UsernameArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct ResetArgs {
    #[arg(long)]
    username: String,
    /// Skip the confirmation question.
    #[arg(long, short)]
    yes: bool,
}

async fn run(cli: Cli) -> Result<(), BoxError> {
    let db = Database::connect(&cli.database_url).await?;
    Migrator::up(&db, None).await?;

    let Command::User(command) = cli.command;
    match command {
        UserCommand::Create(UsernameArgs { username }) => {
            if users::exists(&db, &username).await? {
                return Err(format!("user already exists: {username}").into());
            }
            let password = prompt::new_password()?;
            users::create(&db, &username, &password).await?;
            println!("created user: {username}");
        }
        UserCommand::ShowData(UsernameArgs { username }) => {
            let projects = users::projects(&db, &username).await?;
            if projects.is_empty() {
                println!("no projects stored for {username}");
            } else {
                println!("{}", users::describe(&projects, status::today()));
            }
        }
        UserCommand::ResetData(ResetArgs { username, yes }) => {
            let stored = users::projects(&db, &username).await?.len();
            if stored == 0 {
                println!("no projects stored for {username}");
                return Ok(());
            }

            let question = format!("Remove {stored} project(s) of {username}?");
            if !yes && !prompt::confirm(&question)? {
                println!("aborted");
                return Ok(());
            }

            users::clear_projects(&db, &username).await?;
            println!("cleared projects of: {username}");
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
