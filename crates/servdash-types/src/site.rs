use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::category::ServerCategory;
use crate::server::CustomField;

/// Placeholder stored for admin credentials nobody has filled in yet.
pub const DEFAULT_ADMIN_CREDENTIAL: &str = "preencher";

/// A domain hosted on a file server.
///
/// Sites live only inside their owning file server's `sites` list. The four
/// `associated_*` fields are weak references: they name another server by id
/// and are cleared when that server is deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub domain_name: String,
    #[serde(default = "default_admin_credential")]
    pub admin_user: String,
    #[serde(default = "default_admin_credential")]
    pub admin_password: String,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub associated_db_server_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub associated_reverse_proxy_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub associated_backup_server_id: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub associated_email_service_id: Option<String>,
    #[serde(default)]
    pub email_mx_records: Vec<String>,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

fn default_admin_credential() -> String {
    DEFAULT_ADMIN_CREDENTIAL.to_string()
}

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

/// One of the weak references a [`Site`] can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SiteAssociation {
    Database,
    ReverseProxy,
    Backup,
    EmailService,
}

impl SiteAssociation {
    pub const ALL: [SiteAssociation; 4] = [
        Self::Database,
        Self::ReverseProxy,
        Self::Backup,
        Self::EmailService,
    ];

    /// The category of server this association is meant to point at.
    pub fn target_category(&self) -> ServerCategory {
        match self {
            Self::Database => ServerCategory::DbServer,
            Self::ReverseProxy => ServerCategory::ReverseProxyServer,
            Self::Backup => ServerCategory::BackupServer,
            Self::EmailService => ServerCategory::EmailService,
        }
    }

    /// JSON field name of the association.
    pub fn field_name(&self) -> &'static str {
        match self {
            Self::Database => "associatedDbServerId",
            Self::ReverseProxy => "associatedReverseProxyId",
            Self::Backup => "associatedBackupServerId",
            Self::EmailService => "associatedEmailServiceId",
        }
    }
}

impl fmt::Display for SiteAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

impl Site {
    /// A site with placeholder credentials and no associations.
    pub fn new(id: impl Into<String>, domain_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            domain_name: domain_name.into(),
            admin_user: default_admin_credential(),
            admin_password: default_admin_credential(),
            associated_db_server_id: None,
            associated_reverse_proxy_id: None,
            associated_backup_server_id: None,
            associated_email_service_id: None,
            email_mx_records: Vec::new(),
            custom_fields: Vec::new(),
        }
    }

    pub fn association(&self, kind: SiteAssociation) -> Option<&str> {
        self.association_slot(kind).as_deref()
    }

    pub fn set_association(&mut self, kind: SiteAssociation, server_id: Option<String>) {
        *self.association_slot_mut(kind) = server_id;
    }

    /// Whether any association names `server_id`.
    pub fn references(&self, server_id: &str) -> bool {
        SiteAssociation::ALL
            .iter()
            .any(|kind| self.association(*kind) == Some(server_id))
    }

    /// Null every association naming `server_id`; returns how many were cleared.
    pub fn clear_references_to(&mut self, server_id: &str) -> usize {
        let mut cleared = 0;
        for kind in SiteAssociation::ALL {
            let slot = self.association_slot_mut(kind);
            if slot.as_deref() == Some(server_id) {
                *slot = None;
                cleared += 1;
            }
        }
        cleared
    }

    fn association_slot(&self, kind: SiteAssociation) -> &Option<String> {
        match kind {
            SiteAssociation::Database => &self.associated_db_server_id,
            SiteAssociation::ReverseProxy => &self.associated_reverse_proxy_id,
            SiteAssociation::Backup => &self.associated_backup_server_id,
            SiteAssociation::EmailService => &self.associated_email_service_id,
        }
    }

    fn association_slot_mut(&mut self, kind: SiteAssociation) -> &mut Option<String> {
        match kind {
            SiteAssociation::Database => &mut self.associated_db_server_id,
            SiteAssociation::ReverseProxy => &mut self.associated_reverse_proxy_id,
            SiteAssociation::Backup => &mut self.associated_backup_server_id,
            SiteAssociation::EmailService => &mut self.associated_email_service_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_take_defaults() {
        let site: Site = serde_json::from_value(json!({
            "id": "site_1",
            "domainName": "a.example.com"
        }))
        .unwrap();
        assert_eq!(site.admin_user, DEFAULT_ADMIN_CREDENTIAL);
        assert_eq!(site.admin_password, DEFAULT_ADMIN_CREDENTIAL);
        assert!(site.associated_db_server_id.is_none());
        assert!(site.email_mx_records.is_empty());
    }

    #[test]
    fn blank_association_reads_as_none() {
        let site: Site = serde_json::from_value(json!({
            "id": "site_1",
            "domainName": "a.example.com",
            "associatedDbServerId": "",
            "associatedBackupServerId": "srv_9"
        }))
        .unwrap();
        assert_eq!(site.association(SiteAssociation::Database), None);
        assert_eq!(site.association(SiteAssociation::Backup), Some("srv_9"));
    }

    #[test]
    fn absent_associations_serialize_as_null() {
        let value = serde_json::to_value(Site::new("site_1", "a.example.com")).unwrap();
        assert_eq!(value["associatedDbServerId"], serde_json::Value::Null);
        assert_eq!(value["associatedEmailServiceId"], serde_json::Value::Null);
        assert_eq!(value["domainName"], "a.example.com");
    }

    #[test]
    fn clearing_references_touches_only_matching_fields() {
        let mut site = Site::new("site_1", "a.example.com");
        site.set_association(SiteAssociation::Database, Some("srv_db".into()));
        site.set_association(SiteAssociation::Backup, Some("srv_db".into()));
        site.set_association(SiteAssociation::ReverseProxy, Some("srv_rp".into()));
        site.admin_user = "root".into();

        assert!(site.references("srv_db"));
        assert_eq!(site.clear_references_to("srv_db"), 2);
        assert!(!site.references("srv_db"));
        assert_eq!(site.association(SiteAssociation::ReverseProxy), Some("srv_rp"));
        assert_eq!(site.admin_user, "root");
        assert_eq!(site.clear_references_to("srv_db"), 0);
    }

    #[test]
    fn association_target_categories() {
        assert_eq!(SiteAssociation::Database.target_category(), ServerCategory::DbServer);
        assert_eq!(SiteAssociation::EmailService.target_category(), ServerCategory::EmailService);
        assert_eq!(SiteAssociation::ReverseProxy.to_string(), "associatedReverseProxyId");
    }
}
