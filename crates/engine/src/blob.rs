//! Encoding of the per-user blob: a JSON array of projects.

use crate::{PersistenceError, Project};

/// Decode a stored blob.
///
/// A missing, blank or malformed blob yields an empty collection; this never
/// fails.
pub fn decode(blob: Option<&str>) -> Vec<Project> {
    let Some(blob) = blob.filter(|blob| !blob.trim().is_empty()) else {
        return Vec::new();
    };

    match serde_json::from_str(blob) {
        Ok(projects) => projects,
        Err(err) => {
            tracing::warn!("discarding unreadable project blob: {err}");
            Vec::new()
        }
    }
}

pub fn encode(projects: &[Project]) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(projects)?)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn missing_and_malformed_blobs_are_empty() {
        assert!(decode(None).is_empty());
        assert!(decode(Some("")).is_empty());
        assert!(decode(Some("not json")).is_empty());
        assert!(decode(Some(r#"{"projects": []}"#)).is_empty());
        assert!(decode(Some(r#"[{"id": 1, "name": "x"}]"#)).is_empty());
    }

    #[test]
    fn decodes_what_it_encodes() {
        let projects = vec![Project {
            id: 1_700_000_000_000,
            name: "Launch".to_string(),
            deadline: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            is_important: true,
        }];

        let blob = encode(&projects).unwrap();
        assert_eq!(decode(Some(&blob)), projects);
    }
}
