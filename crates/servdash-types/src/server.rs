use serde::{Deserialize, Serialize};

use crate::category::ServerCategory;
use crate::id::{generate_id, SERVER_FIELD_ID_PREFIX, SITE_FIELD_ID_PREFIX};
use crate::site::Site;

/// A free-form label/value pair attached to a server or site.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: String,
}

impl CustomField {
    pub fn for_server(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_prefix(SERVER_FIELD_ID_PREFIX, label, value)
    }

    pub fn for_site(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::with_prefix(SITE_FIELD_ID_PREFIX, label, value)
    }

    fn with_prefix(prefix: &str, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: generate_id(prefix),
            label: label.into(),
            value: value.into(),
        }
    }
}

/// A tracked machine or service.
///
/// Which optional fields are present depends on `server_category`
/// (see [`CategoryRules`](crate::CategoryRules)):
/// - `port` only for database servers,
/// - `mx_records` only for email services,
/// - `sites` only for file servers (always `Some`, possibly empty).
///
/// The `type` discriminant is written by [`Item`](crate::Item), not stored here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub server_category: ServerCategory,
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mx_records: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sites: Option<Vec<Site>>,
    #[serde(default)]
    pub is_fixed: bool,
    #[serde(default)]
    pub show_on_mural: bool,
}

impl Server {
    pub fn category(&self) -> ServerCategory {
        self.server_category
    }

    pub fn is_file_server(&self) -> bool {
        self.server_category.is_file_server()
    }

    /// Hosted sites; empty for anything that is not a file server.
    pub fn sites(&self) -> &[Site] {
        self.sites.as_deref().unwrap_or(&[])
    }

    /// Mutable access to the hosted sites of a file server.
    ///
    /// Creates the list if a file server was stored without one. Returns
    /// `None` for other categories, which never carry sites.
    pub fn sites_mut(&mut self) -> Option<&mut Vec<Site>> {
        if !self.is_file_server() {
            return None;
        }
        Some(self.sites.get_or_insert_with(Vec::new))
    }

    pub fn site(&self, site_id: &str) -> Option<&Site> {
        self.sites().iter().find(|s| s.id == site_id)
    }

    /// MX records; empty for anything that is not an email service.
    pub fn mx_records(&self) -> &[String] {
        self.mx_records.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn server(category: ServerCategory) -> Server {
        Server {
            id: "srv_1".into(),
            title: "box".into(),
            server_category: category,
            link: "10.0.0.1".into(),
            port: None,
            login: "root".into(),
            password: "pw".into(),
            custom_fields: vec![],
            mx_records: None,
            sites: None,
            is_fixed: false,
            show_on_mural: false,
        }
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        let value = serde_json::to_value(server(ServerCategory::Generic)).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("sites"));
        assert!(!obj.contains_key("port"));
        assert!(!obj.contains_key("mxRecords"));
        assert_eq!(obj["serverCategory"], "GENERIC");
    }

    #[test]
    fn sites_mut_only_for_file_servers() {
        let mut fs = server(ServerCategory::FileServer);
        fs.sites_mut().unwrap().push(Site::new("site_1", "a.example.com"));
        assert_eq!(fs.sites().len(), 1);
        assert!(fs.site("site_1").is_some());

        let mut db = server(ServerCategory::DbServer);
        assert!(db.sites_mut().is_none());
        assert!(db.sites().is_empty());
    }

    #[test]
    fn unknown_json_fields_are_ignored() {
        let parsed: Server = serde_json::from_value(json!({
            "id": "srv_2",
            "title": "mail",
            "serverCategory": "EMAIL_SERVICE",
            "rawMxRecords": "mx1\nmx2",
            "mxRecords": ["mx1", "mx2"]
        }))
        .unwrap();
        assert_eq!(parsed.mx_records(), ["mx1", "mx2"]);
        assert_eq!(parsed.login, "");
        assert!(!parsed.is_fixed);
    }

    #[test]
    fn custom_field_ids_carry_owner_prefix() {
        assert!(CustomField::for_server("os", "debian").id.starts_with("cf_srv_"));
        assert!(CustomField::for_site("cms", "wordpress").id.starts_with("cf_site_"));
    }
}
