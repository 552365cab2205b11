//! The `users` table as seen by the admin tool.

use chrono::NaiveDate;
use engine::{Project, blob, status};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::BoxError;

mod entity {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
        #[sea_orm(column_type = "Text", nullable)]
        pub project_countdown_data: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub async fn exists(db: &DatabaseConnection, username: &str) -> Result<bool, BoxError> {
    Ok(entity::Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .is_some())
}

async fn find(db: &DatabaseConnection, username: &str) -> Result<entity::Model, BoxError> {
    entity::Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .ok_or_else(|| format!("user not found: {username}").into())
}

pub async fn create(db: &DatabaseConnection, username: &str, password: &str) -> Result<(), BoxError> {
    if exists(db, username).await? {
        return Err(format!("user already exists: {username}").into());
    }

    let user = entity::ActiveModel {
        username: Set(username.to_string()),
        password: Set(password.to_string()),
        project_countdown_data: Set(None),
    };
    entity::Entity::insert(user).exec(db).await?;
    Ok(())
}

/// Projects stored for `username`; an unreadable blob reads as none.
pub async fn projects(db: &DatabaseConnection, username: &str) -> Result<Vec<Project>, BoxError> {
    let user = find(db, username).await?;
    Ok(blob::decode(user.project_countdown_data.as_deref()))
}

pub async fn clear_projects(db: &DatabaseConnection, username: &str) -> Result<(), BoxError> {
    let mut user: entity::ActiveModel = find(db, username).await?.into();
    user.project_countdown_data = Set(None);
    user.update(db).await?;
    Ok(())
}

/// One line per project, in storage order.
pub fn describe(projects: &[Project], today: NaiveDate) -> String {
    projects
        .iter()
        .map(|project| {
            format!(
                "{:>6} {}{} {} ({})",
                project.id,
                if project.is_important { "* " } else { "" },
                project.name,
                project.deadline_text(),
                status::describe_days(status::days_left(project.deadline, today))
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
