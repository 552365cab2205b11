//! Commands of the `countdown` binary, run against a [`ProjectStore`].

use chrono::NaiveDate;
use clap::Subcommand;
use engine::{ProjectDraft, ProjectStore, SortMode, ViewQuery};

use crate::{
    error::{AppError, Result},
    render,
};

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the projects, running ones first.
    List {
        /// Keywords that must all appear in the name.
        #[arg(long, short)]
        query: Option<String>,
        /// Only projects flagged as important.
        #[arg(long, short)]
        important: bool,
        /// daysLeft, nameAsc, nameDesc, dateAsc or dateDesc.
        #[arg(long, short, default_value_t = SortMode::DaysLeft)]
        sort: SortMode,
    },
    /// Add a project.
    Add {
        name: String,
        /// YYYY-MM-DD, today when omitted.
        #[arg(long, short)]
        deadline: Option<String>,
        #[arg(long, short)]
        important: bool,
    },
    /// Change some fields of the project at INDEX.
    Edit {
        index: usize,
        #[arg(long, short)]
        name: Option<String>,
        #[arg(long, short)]
        deadline: Option<String>,
        #[arg(long, short)]
        important: Option<bool>,
    },
    /// Flip the important flag of the project at INDEX.
    Important { index: usize },
    /// Delete the project at INDEX.
    Remove { index: usize },
}

pub struct App {
    store: ProjectStore,
    today: NaiveDate,
    color: bool,
}

impl App {
    pub fn new(store: ProjectStore, today: NaiveDate, color: bool) -> Self {
        Self {
            store,
            today,
            color,
        }
    }

    pub fn store(&self) -> &ProjectStore {
        &self.store
    }

    /// Run `command` and return what should be printed.
    ///
    /// Mutations wait for their save; a failed save is an error even though
    /// the in-memory store already changed.
    pub async fn run(&mut self, command: Command) -> Result<String> {
        match command {
            Command::List {
                query,
                important,
                sort,
            } => {
                let query = ViewQuery {
                    text: query.unwrap_or_default(),
                    important_only: important,
                    sort,
                };
                let view = self.store.view(&query, self.today);
                Ok(render::view(&view, &query, self.color))
            }
            Command::Add {
                name,
                deadline,
                important,
            } => {
                let mut draft = ProjectDraft::new(self.today);
                draft.name = name;
                if let Some(deadline) = deadline {
                    draft.deadline = deadline;
                }
                draft.is_important = important;

                let (project, save) = self.store.add_draft(draft)?;
                save.wait().await?;
                Ok(format!(
                    "added [{}] {}",
                    self.store.len() - 1,
                    render::summary(&project, self.today)
                ))
            }
            Command::Edit {
                index,
                name,
                deadline,
                important,
            } => {
                if name.is_none() && deadline.is_none() && important.is_none() {
                    return Err(AppError::Usage(
                        "nothing to change, pass --name, --deadline or --important".to_string(),
                    ));
                }

                self.store.start_edit(index)?;
                let fields = [
                    ("name", name),
                    ("deadline", deadline),
                    ("isImportant", important.map(|flag| flag.to_string())),
                ];
                for (field, value) in fields {
                    if let Some(value) = value {
                        self.store.update_field(field, &value)?;
                    }
                }

                let committed = self.store.commit_edit();
                if committed.is_err() {
                    self.store.cancel_edit();
                }
                committed?.wait().await?;
                self.describe("updated", index)
            }
            Command::Important { index } => {
                self.store.toggle_important(index)?.wait().await?;
                self.describe("updated", index)
            }
            Command::Remove { index } => {
                let (project, save) = self.store.remove(index)?;
                save.wait().await?;
                Ok(format!("removed {}", project.name))
            }
        }
    }

    fn describe(&self, verb: &str, index: usize) -> Result<String> {
        let project = self.store.get(index).ok_or(engine::EngineError::Index {
            index,
            len: self.store.len(),
        })?;
        Ok(format!(
            "{verb} [{index}] {}",
            render::summary(project, self.today)
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use engine::{MemorySync, PersistenceError, SyncClient};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    async fn app(sync: Arc<MemorySync>) -> App {
        let store = ProjectStore::builder().sync(sync).load().await;
        App::new(store, date(2025, 6, 1), false)
    }

    fn add(name: &str, deadline: &str) -> Command {
        Command::Add {
            name: name.to_string(),
            deadline: Some(deadline.to_string()),
            important: false,
        }
    }

    fn list() -> Command {
        Command::List {
            query: None,
            important: false,
            sort: SortMode::DaysLeft,
        }
    }

    #[tokio::test]
    async fn add_defaults_the_deadline_to_today() {
        let sync = Arc::new(MemorySync::new());
        let mut app = app(sync.clone()).await;

        let out = app
            .run(Command::Add {
                name: "Standup".to_string(),
                deadline: None,
                important: true,
            })
            .await
            .unwrap();

        assert_eq!(out, "added [0] * Standup 2025-06-01 (due today)");
        let stored = sync.load().await;
        assert_eq!(stored[0].deadline, date(2025, 6, 1));
        assert!(stored[0].is_important);
    }

    #[tokio::test]
    async fn list_without_projects_prints_the_empty_message() {
        let mut app = app(Arc::new(MemorySync::new())).await;
        let out = app.run(list()).await.unwrap();
        assert_eq!(out, "No projects yet, add one to get started");
    }

    #[tokio::test]
    async fn edit_changes_only_given_fields() {
        let mut app = app(Arc::new(MemorySync::new())).await;
        app.run(add("Thesis", "2025-07-01")).await.unwrap();

        let out = app
            .run(Command::Edit {
                index: 0,
                name: None,
                deadline: Some("2025-06-04".to_string()),
                important: Some(true),
            })
            .await
            .unwrap();

        assert_eq!(out, "updated [0] * Thesis 2025-06-04 (3 days left)");
        assert!(!app.store().session().is_editing());
    }

    #[tokio::test]
    async fn edit_without_fields_is_a_usage_error() {
        let mut app = app(Arc::new(MemorySync::new())).await;
        app.run(add("Thesis", "2025-07-01")).await.unwrap();

        let err = app
            .run(Command::Edit {
                index: 0,
                name: None,
                deadline: None,
                important: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
    }

    #[tokio::test]
    async fn invalid_edit_leaves_the_project_alone() {
        let mut app = app(Arc::new(MemorySync::new())).await;
        app.run(add("Thesis", "2025-07-01")).await.unwrap();

        let err = app
            .run(Command::Edit {
                index: 0,
                name: Some("   ".to_string()),
                deadline: None,
                important: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Engine(_)));
        assert_eq!(app.store().get(0).unwrap().name, "Thesis");
        assert!(!app.store().session().is_editing());
    }

    #[tokio::test]
    async fn remove_reports_the_name() {
        let sync = Arc::new(MemorySync::new());
        let mut app = app(sync.clone()).await;
        app.run(add("Thesis", "2025-07-01")).await.unwrap();

        let out = app.run(Command::Remove { index: 0 }).await.unwrap();

        assert_eq!(out, "removed Thesis");
        assert!(sync.load().await.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_index_is_an_engine_error() {
        let mut app = app(Arc::new(MemorySync::new())).await;
        let err = app.run(Command::Important { index: 3 }).await.unwrap_err();
        assert!(matches!(err, AppError::Engine(_)));
    }

    #[tokio::test]
    async fn failed_save_is_reported() {
        let sync = Arc::new(MemorySync::new());
        let mut app = app(sync.clone()).await;
        sync.fail_saves(Some(PersistenceError::Unauthorized)).await;

        let err = app.run(add("Thesis", "2025-07-01")).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Persistence(PersistenceError::Unauthorized)
        ));
        assert_eq!(app.store().len(), 1);
    }
}
