use serde::{Deserialize, Serialize};

pub mod project {
    use super::*;
    use chrono::NaiveDate;

    /// A project as it travels over the wire.
    ///
    /// `deadline` is serialized as `YYYY-MM-DD`. `isImportant` may be absent in
    /// blobs written by older clients and then defaults to `false`.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Project {
        pub id: i64,
        pub name: String,
        pub deadline: NaiveDate,
        #[serde(default)]
        pub is_important: bool,
    }

    /// Body of `GET /project-countdown/data` and of the matching `POST`.
    #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ProjectsPayload {
        pub projects: Vec<Project>,
    }
}

pub mod settings {
    use super::*;

    /// Server-side settings a front end needs to size its store.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CountdownSettings {
        pub max_projects_per_user: usize,
    }
}

/// Acknowledgement of a successful save.
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::project::*;

    #[test]
    fn project_uses_camel_case_and_iso_dates() {
        let project = Project {
            id: 7,
            name: "Launch".to_string(),
            deadline: chrono::NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            is_important: true,
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "name": "Launch",
                "deadline": "2099-01-01",
                "isImportant": true
            })
        );
    }

    #[test]
    fn missing_is_important_defaults_to_false() {
        let project: Project =
            serde_json::from_str(r#"{"id":1,"name":"Old","deadline":"2024-05-01"}"#).unwrap();
        assert!(!project.is_important);
    }
}
