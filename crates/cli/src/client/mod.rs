//! HTTP access to the project countdown endpoints.

use api_types::{
    ErrorResponse,
    project::{Project as WireProject, ProjectsPayload},
    settings::CountdownSettings,
};
use async_trait::async_trait;
use engine::{PersistenceError, Project, SyncClient};
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::error::{AppError, Result};

const DATA_PATH: &str = "project-countdown/data";
const SETTINGS_PATH: &str = "project-countdown/settings";
const DISABLED: &str = "project countdown is not enabled on the server";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid username or password")]
    Unauthorized,
    /// The feature is disabled on the server.
    #[error("{}", DISABLED)]
    NotFound,
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("cannot reach the server: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<ClientError> for PersistenceError {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Unauthorized => Self::Unauthorized,
            ClientError::NotFound => Self::Rejected(DISABLED.to_string()),
            ClientError::Rejected(err) => Self::Rejected(err),
            ClientError::Server(err) => Self::Server(err),
            ClientError::Transport(err) => Self::Transport(err.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
    username: String,
    password: String,
}

impl Client {
    pub fn new(base_url: &str, username: &str, password: &str) -> Result<Self> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| AppError::Usage(format!("invalid base_url: {err}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    pub async fn settings(&self) -> std::result::Result<CountdownSettings, ClientError> {
        let res = self
            .http
            .get(self.endpoint(SETTINGS_PATH)?)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let res = check(res).await?;
        Ok(res.json::<CountdownSettings>().await?)
    }

    pub async fn projects(&self) -> std::result::Result<Vec<WireProject>, ClientError> {
        let res = self
            .http
            .get(self.endpoint(DATA_PATH)?)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await?;

        let res = check(res).await?;
        Ok(res.json::<ProjectsPayload>().await?.projects)
    }

    pub async fn save_projects(
        &self,
        projects: Vec<WireProject>,
    ) -> std::result::Result<(), ClientError> {
        let res = self
            .http
            .post(self.endpoint(DATA_PATH)?)
            .basic_auth(&self.username, Some(&self.password))
            .json(&ProjectsPayload { projects })
            .send()
            .await?;

        check(res).await.map(|_| ())
    }
}

async fn check(res: reqwest::Response) -> std::result::Result<reqwest::Response, ClientError> {
    if res.status().is_success() {
        return Ok(res);
    }

    let status = res.status();
    let body = res
        .json::<ErrorResponse>()
        .await
        .map(|err| err.error)
        .unwrap_or_else(|_| "unknown error".to_string());

    let err = match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
        StatusCode::NOT_FOUND => ClientError::NotFound,
        status if status.is_client_error() => ClientError::Rejected(body),
        _ => ClientError::Server(body),
    };
    Err(err)
}

fn to_wire(project: &Project) -> WireProject {
    WireProject {
        id: project.id,
        name: project.name.clone(),
        deadline: project.deadline,
        is_important: project.is_important,
    }
}

fn from_wire(project: WireProject) -> Project {
    Project {
        id: project.id,
        name: project.name,
        deadline: project.deadline,
        is_important: project.is_important,
    }
}

/// [`SyncClient`] backed by the countdown server.
#[derive(Debug, Clone)]
pub struct HttpSync {
    client: Client,
}

impl HttpSync {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SyncClient for HttpSync {
    async fn load(&self) -> Vec<Project> {
        match self.client.projects().await {
            Ok(projects) => projects.into_iter().map(from_wire).collect(),
            Err(err) => {
                tracing::warn!("failed to load projects, starting empty: {err}");
                Vec::new()
            }
        }
    }

    async fn save(&self, projects: &[Project]) -> std::result::Result<(), PersistenceError> {
        self.client
            .save_projects(projects.iter().map(to_wire).collect())
            .await
            .map_err(PersistenceError::from)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engine::ProjectStore;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ConnectionTrait, Database, DbBackend, Statement};
    use server::CountdownConfig;

    use super::*;

    async fn spawn_server(countdown: CountdownConfig) -> String {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        db.execute(Statement::from_string(
            DbBackend::Sqlite,
            "INSERT INTO users (username, password) VALUES ('alice', 'secret')",
        ))
        .await
        .unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = server::spawn_with_listener(db, countdown, listener).unwrap();
        format!("http://{addr}")
    }

    fn sync(base_url: &str, password: &str) -> Arc<HttpSync> {
        Arc::new(HttpSync::new(
            Client::new(base_url, "alice", password).unwrap(),
        ))
    }

    #[tokio::test]
    async fn store_round_trips_through_the_server() {
        let base_url = spawn_server(CountdownConfig::default()).await;

        let mut store = ProjectStore::builder()
            .sync(sync(&base_url, "secret"))
            .load()
            .await;
        assert!(store.is_empty());

        let (_, save) = store.add("Thesis", "2030-06-01", true).unwrap();
        save.wait().await.unwrap();
        let (_, save) = store.add("Taxes", "2030-04-15", false).unwrap();
        save.wait().await.unwrap();

        let reloaded = ProjectStore::builder()
            .sync(sync(&base_url, "secret"))
            .load()
            .await;
        assert_eq!(reloaded.projects(), store.projects());
    }

    #[tokio::test]
    async fn settings_announce_the_limit() {
        let base_url = spawn_server(CountdownConfig {
            max_projects_per_user: 7,
            ..CountdownConfig::default()
        })
        .await;

        let client = Client::new(&base_url, "alice", "secret").unwrap();
        assert_eq!(client.settings().await.unwrap().max_projects_per_user, 7);
    }

    #[tokio::test]
    async fn wrong_password_loads_empty_and_fails_saves() {
        let base_url = spawn_server(CountdownConfig::default()).await;
        let sync = sync(&base_url, "wrong");

        assert!(sync.load().await.is_empty());
        assert_eq!(
            sync.save(&[]).await.unwrap_err(),
            PersistenceError::Unauthorized
        );
    }

    #[tokio::test]
    async fn disabled_feature_is_reported() {
        let base_url = spawn_server(CountdownConfig {
            enabled: false,
            ..CountdownConfig::default()
        })
        .await;

        let client = Client::new(&base_url, "alice", "secret").unwrap();
        assert!(matches!(
            client.settings().await,
            Err(ClientError::NotFound)
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transient_failure() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let sync = sync(&format!("http://{addr}"), "secret");
        assert!(sync.save(&[]).await.unwrap_err().is_transient());
    }

    #[test]
    fn base_url_keeps_its_path() {
        let client = Client::new("http://localhost:3000/forum", "u", "p").unwrap();
        assert_eq!(
            client.endpoint(DATA_PATH).unwrap().as_str(),
            "http://localhost:3000/forum/project-countdown/data"
        );

        let client = Client::new("http://localhost:3000", "u", "p").unwrap();
        assert_eq!(
            client.endpoint(SETTINGS_PATH).unwrap().as_str(),
            "http://localhost:3000/project-countdown/settings"
        );
    }

    #[test]
    fn invalid_base_url_is_a_usage_error() {
        assert!(matches!(
            Client::new("not a url", "u", "p"),
            Err(AppError::Usage(_))
        ));
    }

    #[test]
    fn client_errors_describe_themselves() {
        assert_eq!(
            ClientError::Unauthorized.to_string(),
            "invalid username or password"
        );
        assert_eq!(ClientError::NotFound.to_string(), DISABLED);
        assert_eq!(
            ClientError::Rejected("Invalid data format".to_string()).to_string(),
            "request rejected: Invalid data format"
        );
        assert_eq!(
            ClientError::Server("boom".to_string()).to_string(),
            "server error: boom"
        );
    }

    #[tokio::test]
    async fn transport_errors_keep_their_source() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = Client::new(&format!("http://{addr}"), "u", "p").unwrap();
        let err = client.settings().await.unwrap_err();

        assert!(matches!(err, ClientError::Transport(_)));
        assert!(err.to_string().starts_with("cannot reach the server: "));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn client_errors_map_to_persistence_errors() {
        assert_eq!(
            PersistenceError::from(ClientError::Unauthorized),
            PersistenceError::Unauthorized
        );
        assert_eq!(
            PersistenceError::from(ClientError::Rejected("Invalid data format".to_string())),
            PersistenceError::Rejected("Invalid data format".to_string())
        );
        assert!(PersistenceError::from(ClientError::Server("boom".to_string())).is_transient());
        assert!(!PersistenceError::from(ClientError::NotFound).is_transient());
    }
}
