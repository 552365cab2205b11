//! The module contains `ProjectStore`, the owner of a user's collection.
//!
//! Mutations are applied in memory right away and then handed to the
//! [`SyncClient`] on a background task. A failed save is reported through the
//! returned [`PendingSave`] and never rolls the store back. Mutations spawn
//! their save, so they must run inside a Tokio runtime.

use std::{collections::HashSet, sync::Arc};

use chrono::NaiveDate;
use tokio::task::JoinHandle;

use crate::{
    DisplayView, EditSession, EngineError, MemorySync, PersistenceError, Project, ProjectDraft,
    ProjectUpdate, ResultEngine, SyncClient, ViewQuery, pipeline,
};

/// Projects a user may keep unless configured otherwise.
pub const DEFAULT_MAX_PROJECTS: usize = 50;

/// Immutable view of the collection at one point in time.
pub type Snapshot = Arc<Vec<Project>>;

/// A save running in the background.
///
/// Await [`PendingSave::wait`] to learn the outcome; dropping the handle lets
/// the save finish on its own.
#[derive(Debug)]
#[must_use = "dropping a PendingSave ignores whether the save succeeded"]
pub struct PendingSave(JoinHandle<Result<(), PersistenceError>>);

impl PendingSave {
    pub async fn wait(self) -> Result<(), PersistenceError> {
        match self.0.await {
            Ok(result) => result,
            Err(err) => Err(PersistenceError::Transport(format!(
                "save task did not complete: {err}"
            ))),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.0.is_finished()
    }
}

pub struct ProjectStore {
    projects: Snapshot,
    max_projects: usize,
    /// Next id of the sequence, `None` once it ran past `i64::MAX`.
    next_id: Option<i64>,
    session: EditSession,
    sync: Arc<dyn SyncClient>,
}

impl std::fmt::Debug for ProjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectStore")
            .field("projects", &self.projects)
            .field("max_projects", &self.max_projects)
            .field("next_id", &self.next_id)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ProjectStore {
    /// Return a builder for `ProjectStore`. Help to build the struct.
    pub fn builder() -> ProjectStoreBuilder {
        ProjectStoreBuilder::default()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, index: usize) -> Option<&Project> {
        self.projects.get(index)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn max_projects(&self) -> usize {
        self.max_projects
    }

    /// Read-only copy for the display pipeline. Later mutations never show up
    /// in a snapshot already handed out.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.projects)
    }

    /// Derive the display view for `today`.
    pub fn view(&self, query: &ViewQuery, today: NaiveDate) -> DisplayView {
        pipeline::build_view(&self.projects, query, today)
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Append a new project and schedule a save.
    pub fn add(
        &mut self,
        name: &str,
        deadline: &str,
        is_important: bool,
    ) -> ResultEngine<(Project, PendingSave)> {
        self.add_draft(ProjectDraft {
            name: name.to_string(),
            deadline: deadline.to_string(),
            is_important,
        })
    }

    pub fn add_draft(&mut self, draft: ProjectDraft) -> ResultEngine<(Project, PendingSave)> {
        let fields = draft.validate()?;
        if self.projects.len() >= self.max_projects {
            return Err(EngineError::LimitExceeded(self.max_projects));
        }

        let taken: HashSet<i64> = self.projects.iter().map(|project| project.id).collect();
        let project = fields.into_project(allocate_id(&mut self.next_id, &taken));
        Arc::make_mut(&mut self.projects).push(project.clone());
        tracing::debug!("added project {} ({})", project.id, project.name);

        Ok((project, self.persist()))
    }

    /// Replace the mutable fields of the project at `index`, keeping its id.
    pub fn edit(&mut self, index: usize, update: ProjectUpdate) -> ResultEngine<PendingSave> {
        let current = self.checked(index)?;
        let id = current.id;
        let fields = update.merge(current).validate()?;

        Arc::make_mut(&mut self.projects)[index] = fields.into_project(id);
        tracing::debug!("edited project {id} at index {index}");

        Ok(self.persist())
    }

    /// Flip the important flag of the project at `index`.
    pub fn toggle_important(&mut self, index: usize) -> ResultEngine<PendingSave> {
        let is_important = self.checked(index)?.is_important;
        self.edit(index, ProjectUpdate::default().important(!is_important))
    }

    /// Remove the project at `index`, cancelling an edit of that project.
    pub fn remove(&mut self, index: usize) -> ResultEngine<(Project, PendingSave)> {
        self.checked(index)?;

        let removed = Arc::make_mut(&mut self.projects).remove(index);
        self.session.on_removed(index);
        tracing::debug!("removed project {} ({})", removed.id, removed.name);

        Ok((removed, self.persist()))
    }

    /// Open the edit form on the project at `index`.
    pub fn start_edit(&mut self, index: usize) -> ResultEngine<&ProjectDraft> {
        let project = self.checked(index)?.clone();
        self.session.start(index, &project);
        self.session.buffer().ok_or(EngineError::NoActiveEdit)
    }

    pub fn update_field(&mut self, field: &str, value: &str) -> ResultEngine<()> {
        self.session.update_field(field, value)
    }

    /// Validate and apply the edit buffer.
    ///
    /// On a validation error the session stays open so the buffer can be
    /// corrected.
    pub fn commit_edit(&mut self) -> ResultEngine<PendingSave> {
        let EditSession::Editing { index, buffer } = &self.session else {
            return Err(EngineError::NoActiveEdit);
        };
        let (index, update) = (*index, ProjectUpdate::from(buffer.clone()));

        let save = self.edit(index, update)?;
        self.session.cancel();
        Ok(save)
    }

    pub fn cancel_edit(&mut self) {
        self.session.cancel();
    }

    /// Drop local state and load the collection again.
    pub async fn reload(&mut self) {
        let projects = self.sync.load().await;
        self.replace_all(projects);
    }

    fn replace_all(&mut self, projects: Vec<Project>) {
        let (projects, next_id) = assign_unique_ids(projects);
        tracing::info!("loaded {} projects", projects.len());
        if projects.len() > self.max_projects {
            tracing::warn!(
                "collection holds {} projects, above the limit of {}",
                projects.len(),
                self.max_projects
            );
        }

        self.projects = Arc::new(projects);
        self.next_id = next_id;
        self.session.cancel();
    }

    fn checked(&self, index: usize) -> ResultEngine<&Project> {
        self.projects.get(index).ok_or(EngineError::Index {
            index,
            len: self.projects.len(),
        })
    }

    fn persist(&self) -> PendingSave {
        let sync = Arc::clone(&self.sync);
        let snapshot = self.snapshot();
        PendingSave(tokio::spawn(async move {
            let result = sync.save(&snapshot).await;
            match &result {
                Ok(()) => tracing::debug!("saved {} projects", snapshot.len()),
                Err(err) => tracing::error!("failed to save projects: {err}"),
            }
            result
        }))
    }
}

/// Take the next id of the sequence. Once the sequence is exhausted, fall
/// back to the lowest positive id not in `taken`.
fn allocate_id(next_id: &mut Option<i64>, taken: &HashSet<i64>) -> i64 {
    match *next_id {
        Some(id) => {
            *next_id = id.checked_add(1);
            id
        }
        None => {
            let mut id = 1;
            while taken.contains(&id) {
                id += 1;
            }
            id
        }
    }
}

/// Give every project whose id was already seen a fresh one, and return the
/// next id of the sequence.
fn assign_unique_ids(mut projects: Vec<Project>) -> (Vec<Project>, Option<i64>) {
    let mut next_id = projects
        .iter()
        .map(|project| project.id)
        .max()
        .map_or(Some(1), |max| max.checked_add(1))
        .map(|id| id.max(1));

    let mut taken: HashSet<i64> = projects.iter().map(|project| project.id).collect();
    let mut seen = HashSet::with_capacity(projects.len());
    for project in &mut projects {
        if !seen.insert(project.id) {
            let id = allocate_id(&mut next_id, &taken);
            tracing::warn!("duplicate project id {}, reassigning to {id}", project.id);
            project.id = id;
            seen.insert(id);
            taken.insert(id);
        }
    }

    (projects, next_id)
}

pub struct ProjectStoreBuilder {
    sync: Arc<dyn SyncClient>,
    max_projects: usize,
}

impl Default for ProjectStoreBuilder {
    fn default() -> Self {
        Self {
            sync: Arc::new(MemorySync::default()),
            max_projects: DEFAULT_MAX_PROJECTS,
        }
    }
}

impl ProjectStoreBuilder {
    /// Pass the client used to load and save the collection.
    pub fn sync(mut self, sync: Arc<dyn SyncClient>) -> ProjectStoreBuilder {
        self.sync = sync;
        self
    }

    /// Maximum number of projects `add` accepts.
    pub fn max_projects(mut self, max_projects: usize) -> ProjectStoreBuilder {
        self.max_projects = max_projects;
        self
    }

    /// Construct an empty `ProjectStore` without loading.
    pub fn build(self) -> ProjectStore {
        ProjectStore {
            projects: Arc::new(Vec::new()),
            max_projects: self.max_projects,
            next_id: Some(1),
            session: EditSession::Idle,
            sync: self.sync,
        }
    }

    /// Construct `ProjectStore` populated from the sync client.
    pub async fn load(self) -> ProjectStore {
        let mut store = self.build();
        store.reload().await;
        store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(id: i64) -> Project {
        Project {
            id,
            name: format!("p{id}"),
            deadline: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            is_important: false,
        }
    }

    #[test]
    fn next_id_follows_the_largest_id() {
        let (projects, next_id) = assign_unique_ids(vec![project(5), project(2)]);
        assert_eq!(projects.iter().map(|p| p.id).collect::<Vec<_>>(), [5, 2]);
        assert_eq!(next_id, Some(6));
    }

    #[test]
    fn empty_collection_starts_at_one() {
        let (_, next_id) = assign_unique_ids(Vec::new());
        assert_eq!(next_id, Some(1));
    }

    #[test]
    fn duplicated_ids_are_reassigned() {
        let (projects, next_id) =
            assign_unique_ids(vec![project(7), project(3), project(7), project(3)]);
        assert_eq!(
            projects.iter().map(|p| p.id).collect::<Vec<_>>(),
            [7, 3, 8, 9]
        );
        assert_eq!(next_id, Some(10));
    }

    #[test]
    fn exhausted_sequence_reuses_the_lowest_free_id() {
        let (projects, next_id) =
            assign_unique_ids(vec![project(i64::MAX), project(1), project(i64::MAX)]);
        assert_eq!(next_id, None);
        assert_eq!(
            projects.iter().map(|p| p.id).collect::<Vec<_>>(),
            [i64::MAX, 1, 2]
        );
    }

    #[test]
    fn allocation_stops_advancing_at_the_end_of_the_sequence() {
        let mut next_id = Some(i64::MAX);
        let taken = HashSet::from([i64::MAX - 1]);

        assert_eq!(allocate_id(&mut next_id, &taken), i64::MAX);
        assert_eq!(next_id, None);
        assert_eq!(allocate_id(&mut next_id, &HashSet::from([1, 2, 4])), 3);
    }

    #[test]
    fn builder_defaults() {
        let store = ProjectStore::builder().build();
        assert!(store.is_empty());
        assert_eq!(store.max_projects(), DEFAULT_MAX_PROJECTS);
        assert_eq!(*store.session(), EditSession::Idle);
    }
}
