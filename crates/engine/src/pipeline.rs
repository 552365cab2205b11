//! Filter, sort and partition a project collection for display.
//!
//! The pipeline never touches the collection it is given: every step works on
//! borrowed projects and returns freshly allocated sequences.

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{EngineError, Project, StatusBand, status};

/// Display order of the project list.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Fewest days left first.
    #[default]
    DaysLeft,
    NameAsc,
    NameDesc,
    DateAsc,
    DateDesc,
}

impl SortMode {
    /// Menu options, in the order they are offered.
    pub const ALL: [SortMode; 5] = [
        Self::DaysLeft,
        Self::NameAsc,
        Self::NameDesc,
        Self::DateAsc,
        Self::DateDesc,
    ];

    /// Stable identifier, also used on the command line.
    pub fn key(self) -> &'static str {
        match self {
            Self::DaysLeft => "daysLeft",
            Self::NameAsc => "nameAsc",
            Self::NameDesc => "nameDesc",
            Self::DateAsc => "dateAsc",
            Self::DateDesc => "dateDesc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DaysLeft => "by days left",
            Self::NameAsc => "by name (A-Z)",
            Self::NameDesc => "by name (Z-A)",
            Self::DateAsc => "by deadline (earliest first)",
            Self::DateDesc => "by deadline (latest first)",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SortMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::Validation(format!("unknown sort mode '{s}'")))
    }
}

/// What the user asked to see.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Free text; every whitespace-separated keyword must appear in the name.
    pub text: String,
    pub important_only: bool,
    pub sort: SortMode,
}

/// A project together with its derived countdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectRow {
    /// Position of the project in the store, for `edit`/`remove`.
    pub index: usize,
    pub project: Project,
    pub days_left: i64,
    pub status: StatusBand,
}

impl ProjectRow {
    fn new(index: usize, project: &Project, today: NaiveDate) -> Self {
        let days_left = status::days_left(project.deadline, today);
        Self {
            index,
            project: project.clone(),
            days_left,
            status: StatusBand::from_days_left(days_left),
        }
    }
}

/// Sorted rows split into projects still running and projects past due.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayView {
    pub active: Vec<ProjectRow>,
    pub expired: Vec<ProjectRow>,
}

impl DisplayView {
    pub fn len(&self) -> usize {
        self.active.len() + self.expired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.expired.is_empty()
    }
}

/// Lowercased keywords of a free-text query.
pub fn keywords(query: &str) -> Vec<String> {
    query.split_whitespace().map(str::to_lowercase).collect()
}

fn matches(project: &Project, keywords: &[String], important_only: bool) -> bool {
    if important_only && !project.is_important {
        return false;
    }
    if keywords.is_empty() {
        return true;
    }

    let name = project.name.to_lowercase();
    keywords.iter().all(|keyword| name.contains(keyword.as_str()))
}

/// Keep important projects (when asked) whose name contains every keyword.
pub fn filter_projects(projects: &[Project], query: &str, important_only: bool) -> Vec<Project> {
    let keywords = keywords(query);
    projects
        .iter()
        .filter(|project| matches(project, &keywords, important_only))
        .cloned()
        .collect()
}

/// Stable sort by `mode`. `today` is only used by [`SortMode::DaysLeft`].
pub fn sort_projects(projects: &[Project], mode: SortMode, today: NaiveDate) -> Vec<Project> {
    let mut rows: Vec<ProjectRow> = projects
        .iter()
        .enumerate()
        .map(|(index, project)| ProjectRow::new(index, project, today))
        .collect();
    rows.sort_by(|a, b| compare(mode, a, b));
    rows.into_iter().map(|row| row.project).collect()
}

/// Run the whole pipeline: filter, sort, then partition on `days_left >= 0`.
pub fn build_view(projects: &[Project], query: &ViewQuery, today: NaiveDate) -> DisplayView {
    let keywords = keywords(&query.text);
    let mut rows: Vec<ProjectRow> = projects
        .iter()
        .enumerate()
        .filter(|(_, project)| matches(project, &keywords, query.important_only))
        .map(|(index, project)| ProjectRow::new(index, project, today))
        .collect();
    rows.sort_by(|a, b| compare(query.sort, a, b));

    let (active, expired) = rows.into_iter().partition(|row| row.days_left >= 0);
    DisplayView { active, expired }
}

/// Message shown when nothing is left to display.
pub fn empty_message(query: &ViewQuery) -> String {
    let words: Vec<&str> = query.text.split_whitespace().collect();
    if !words.is_empty() {
        return format!("No projects match \"{}\"", words.join("\", \""));
    }
    if query.important_only {
        return "No important projects".to_string();
    }
    "No projects yet, add one to get started".to_string()
}

fn compare(mode: SortMode, a: &ProjectRow, b: &ProjectRow) -> Ordering {
    match mode {
        SortMode::DaysLeft => a.days_left.cmp(&b.days_left),
        SortMode::NameAsc => locale_cmp(&a.project.name, &b.project.name),
        SortMode::NameDesc => locale_cmp(&b.project.name, &a.project.name),
        SortMode::DateAsc => a.project.deadline.cmp(&b.project.deadline),
        SortMode::DateDesc => b.project.deadline.cmp(&a.project.deadline),
    }
}

/// Primary collation key: compatibility-decomposed, accents stripped,
/// lowercased.
fn collation_key(input: &str) -> String {
    input
        .nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Tie-break key: lowercase letters sort before their uppercase form.
fn swapped_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_lowercase() {
            out.extend(ch.to_uppercase());
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

/// Compare names the way a reader expects: case and accents only break ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| swapped_case(a).cmp(&swapped_case(b)))
        .then_with(|| a.cmp(b))
}
