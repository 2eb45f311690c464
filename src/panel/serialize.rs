//! Persisted shape of a panel

use serde::{Deserialize, Serialize};

use super::Parameters;

/// A panel as handed to a layout save/restore collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerializedGroupPanel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<String>,
    #[serde(default)]
    pub props: Parameters,
    pub title: String,
    #[serde(default)]
    pub suppress_closable: bool,
    #[serde(default)]
    pub state: Parameters,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_keys_are_camel_case() {
        let panel = SerializedGroupPanel {
            id: "p1".to_string(),
            content_id: Some("editor".to_string()),
            tab_id: None,
            props: Parameters::new(),
            title: "main.rs".to_string(),
            suppress_closable: true,
            state: Parameters::new(),
        };

        let value = serde_json::to_value(&panel).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "p1",
                "contentId": "editor",
                "props": {},
                "title": "main.rs",
                "suppressClosable": true,
                "state": {}
            })
        );
    }

    #[test]
    fn test_missing_optional_keys_default() {
        let panel: SerializedGroupPanel =
            serde_json::from_str(r#"{"id":"p","title":"T"}"#).unwrap();
        assert!(panel.props.is_empty());
        assert!(!panel.suppress_closable);
        assert_eq!(panel.content_id, None);
    }
}
