use serde::Deserialize;

/// GitLab webhook body. Only the fields the reviewer reads are modelled; the
/// rest of the payload is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object_kind: Option<String>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub object_attributes: Option<MergeRequestAttributes>,
    #[serde(default)]
    pub merge_request: Option<MergeRequestAttributes>,
    #[serde(default)]
    pub project: Option<ProjectInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MergeRequestAttributes {
    #[serde(default)]
    pub iid: Option<u64>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectInfo {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub project_id: Option<u64>,
}

impl WebhookPayload {
    /// `event_type`, falling back to `object_kind`.
    pub fn kind(&self) -> Option<&str> {
        self.event_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.object_kind.as_deref())
    }

    /// `object_attributes`, falling back to `merge_request`.
    pub fn merge_request(&self) -> Option<&MergeRequestAttributes> {
        self.object_attributes
            .as_ref()
            .or(self.merge_request.as_ref())
    }

    pub fn project_id(&self) -> Option<u64> {
        self.project.as_ref().and_then(|p| p.id.or(p.project_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_gitlab_merge_request_hook() {
        let p: WebhookPayload = serde_json::from_str(
            r#"{
                "object_kind": "merge_request",
                "event_type": "merge_request",
                "user": {"name": "Dev"},
                "project": {"id": 15, "path_with_namespace": "data/schemas"},
                "object_attributes": {"iid": 3, "action": "open", "title": "Add table", "state": "opened"}
            }"#,
        )
        .unwrap();
        assert_eq!(p.kind(), Some("merge_request"));
        assert_eq!(p.project_id(), Some(15));
        let mr = p.merge_request().unwrap();
        assert_eq!(mr.iid, Some(3));
        assert_eq!(mr.action.as_deref(), Some("open"));
    }

    #[test]
    fn falls_back_to_alternative_fields() {
        let p: WebhookPayload = serde_json::from_str(
            r#"{
                "object_kind": "Merge Request Hook",
                "project": {"project_id": 8},
                "merge_request": {"iid": 11, "action": "update"}
            }"#,
        )
        .unwrap();
        assert_eq!(p.kind(), Some("Merge Request Hook"));
        assert_eq!(p.project_id(), Some(8));
        assert_eq!(p.merge_request().and_then(|m| m.iid), Some(11));
    }
}
