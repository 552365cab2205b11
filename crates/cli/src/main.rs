mod app;
mod client;
mod config;
mod error;
mod render;

use std::sync::Arc;

use engine::{ProjectStore, status};

use crate::{
    client::{Client, HttpSync},
    error::{AppError, Result},
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let (config, command) = config::load()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "countdown={level},engine={level}",
            level = config.log_level
        ))
        .init();

    let password = config.password.as_deref().ok_or_else(|| {
        AppError::Usage("no password, set COUNTDOWN_CLI_PASSWORD".to_string())
    })?;
    let client = Client::new(&config.base_url, &config.username, password)?;

    let max_projects = match config.max_projects {
        Some(max_projects) => max_projects,
        None => client.settings().await?.max_projects_per_user,
    };

    let store = ProjectStore::builder()
        .sync(Arc::new(HttpSync::new(client)))
        .max_projects(max_projects)
        .load()
        .await;

    let mut app = app::App::new(store, status::today(), config.color);
    let output = app.run(command).await?;
    println!("{output}");
    Ok(())
}
