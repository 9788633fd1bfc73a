//! Read-only projections of a [`Collection`].
//!
//! Nothing here mutates; every function takes the collection by reference
//! and returns borrowed servers or owned, display-ready rows.

use serde::Serialize;
use servdash_types::{CategoryFilter, Collection, Server, ServerCategory, Site};

/// Display text for an association that is unset or points nowhere.
pub const NOT_AVAILABLE: &str = "N/A";

/// A site annotated with its owning file server and resolved link texts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenedSite {
    #[serde(flatten)]
    pub site: Site,
    pub group_name: String,
    pub group_id: String,
    pub display_bd_link: String,
    pub display_reverse_proxy_link: String,
}

/// Server counts per category plus the number of hosted sites.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_file_servers: usize,
    pub total_sites: usize,
    pub total_db_servers: usize,
    pub total_reverse_proxy_servers: usize,
    pub total_backup_servers: usize,
    pub total_generic_servers: usize,
    pub total_email_services: usize,
}

impl Stats {
    pub fn count(&self, category: ServerCategory) -> usize {
        match category {
            ServerCategory::Generic => self.total_generic_servers,
            ServerCategory::FileServer => self.total_file_servers,
            ServerCategory::DbServer => self.total_db_servers,
            ServerCategory::ReverseProxyServer => self.total_reverse_proxy_servers,
            ServerCategory::BackupServer => self.total_backup_servers,
            ServerCategory::EmailService => self.total_email_services,
        }
    }

    fn count_mut(&mut self, category: ServerCategory) -> &mut usize {
        match category {
            ServerCategory::Generic => &mut self.total_generic_servers,
            ServerCategory::FileServer => &mut self.total_file_servers,
            ServerCategory::DbServer => &mut self.total_db_servers,
            ServerCategory::ReverseProxyServer => &mut self.total_reverse_proxy_servers,
            ServerCategory::BackupServer => &mut self.total_backup_servers,
            ServerCategory::EmailService => &mut self.total_email_services,
        }
    }
}

/// What deleting a server would take down with it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImpact {
    pub server_id: String,
    pub title: String,
    pub category: ServerCategory,
    /// Sites removed with a file server.
    pub contained_sites: usize,
    /// Sites whose references to this server would be cleared.
    pub associated_sites: usize,
}

impl DeleteImpact {
    /// One-line confirmation prompt.
    pub fn summary(&self) -> String {
        if self.category.is_file_server() {
            format!(
                "Delete file server \"{}\"? Its {} site(s) will be deleted too.",
                self.title, self.contained_sites
            )
        } else if self.associated_sites > 0 {
            format!(
                "Delete server \"{}\"? {} site(s) reference it and will lose that association.",
                self.title, self.associated_sites
            )
        } else {
            format!("Delete server \"{}\"?", self.title)
        }
    }
}

/// Every server, in collection order. Non-server items are skipped.
pub fn all_servers(collection: &Collection) -> Vec<&Server> {
    collection.servers().collect()
}

pub fn servers_in(collection: &Collection, filter: CategoryFilter) -> Vec<&Server> {
    collection
        .servers()
        .filter(|s| filter.matches(s.category()))
        .collect()
}

/// Servers of `category`, e.g. the candidates for a site association.
pub fn available(collection: &Collection, category: ServerCategory) -> Vec<&Server> {
    servers_in(collection, CategoryFilter::Only(category))
}

/// Display text for an association.
///
/// The target's link when it resolves, the raw id when it does not, and
/// [`NOT_AVAILABLE`] when the association is unset.
pub fn link_display(collection: &Collection, server_id: Option<&str>) -> String {
    match server_id {
        Some(id) => collection
            .server(id)
            .map_or_else(|| id.to_string(), |server| server.link.clone()),
        None => NOT_AVAILABLE.to_string(),
    }
}

fn flatten(collection: &Collection, owner: &Server, site: &Site) -> FlattenedSite {
    FlattenedSite {
        group_name: owner.title.clone(),
        group_id: owner.id.clone(),
        display_bd_link: link_display(collection, site.associated_db_server_id.as_deref()),
        display_reverse_proxy_link: link_display(
            collection,
            site.associated_reverse_proxy_id.as_deref(),
        ),
        site: site.clone(),
    }
}

/// All sites of all file servers, in collection order.
pub fn flattened_sites(collection: &Collection) -> Vec<FlattenedSite> {
    collection
        .sites()
        .filter(|(owner, _)| owner.is_file_server())
        .map(|(owner, site)| flatten(collection, owner, site))
        .collect()
}

/// Case-insensitive substring match on domain, group name, and both link
/// displays. A blank query keeps everything.
pub fn filter_sites(sites: Vec<FlattenedSite>, query: &str) -> Vec<FlattenedSite> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return sites;
    }
    sites
        .into_iter()
        .filter(|row| {
            [
                row.site.domain_name.as_str(),
                row.group_name.as_str(),
                row.display_bd_link.as_str(),
                row.display_reverse_proxy_link.as_str(),
            ]
            .iter()
            .any(|text| text.to_lowercase().contains(&query))
        })
        .collect()
}

pub fn stats(collection: &Collection) -> Stats {
    let mut stats = Stats::default();
    for server in collection.servers() {
        *stats.count_mut(server.category()) += 1;
        if server.is_file_server() {
            stats.total_sites += server.sites().len();
        }
    }
    stats
}

/// Sites holding any association to `server_id`.
pub fn sites_associated_with(collection: &Collection, server_id: &str) -> Vec<FlattenedSite> {
    if server_id.is_empty() {
        return Vec::new();
    }
    flattened_sites(collection)
        .into_iter()
        .filter(|row| row.site.references(server_id))
        .collect()
}

pub fn delete_impact(collection: &Collection, server_id: &str) -> Option<DeleteImpact> {
    let server = collection.server(server_id)?;
    Some(DeleteImpact {
        server_id: server.id.clone(),
        title: server.title.clone(),
        category: server.category(),
        contained_sites: server.sites().len(),
        associated_sites: sites_associated_with(collection, server_id).len(),
    })
}

/// The email service named by `service_id`, if it exists and is one.
pub fn email_service<'a>(
    collection: &'a Collection,
    service_id: Option<&str>,
) -> Option<&'a Server> {
    service_id
        .and_then(|id| collection.server(id))
        .filter(|server| server.category() == ServerCategory::EmailService)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_collection;

    #[test]
    fn filters_by_category() {
        let c = sample_collection();
        assert_eq!(all_servers(&c).len(), 4);
        let dbs = servers_in(&c, CategoryFilter::Only(ServerCategory::DbServer));
        assert_eq!(dbs.len(), 1);
        assert_eq!(dbs[0].id, "srv_db");
        assert_eq!(servers_in(&c, CategoryFilter::All).len(), 4);
        assert!(available(&c, ServerCategory::BackupServer).is_empty());
    }

    #[test]
    fn flattened_sites_resolve_links() {
        let c = sample_collection();
        let rows = flattened_sites(&c);
        assert_eq!(rows.len(), 2);
        let a = &rows[0];
        assert_eq!(a.site.domain_name, "a.example.com");
        assert_eq!(a.group_name, "FS1");
        assert_eq!(a.group_id, "srv_fs");
        assert_eq!(a.display_bd_link, "10.0.0.5");
        assert_eq!(a.display_reverse_proxy_link, "rp.local");
        let b = &rows[1];
        assert_eq!(b.display_bd_link, NOT_AVAILABLE);
        assert_eq!(b.display_reverse_proxy_link, NOT_AVAILABLE);
    }

    #[test]
    fn unresolved_reference_displays_raw_id() {
        let mut c = sample_collection();
        c.server_mut("srv_fs").unwrap().sites_mut().unwrap()[1].associated_db_server_id =
            Some("srv_missing".into());
        assert_eq!(flattened_sites(&c)[1].display_bd_link, "srv_missing");
        assert_eq!(link_display(&c, None), NOT_AVAILABLE);
    }

    #[test]
    fn flattened_site_serializes_flat() {
        let c = sample_collection();
        let value = serde_json::to_value(&flattened_sites(&c)[0]).unwrap();
        assert_eq!(value["domainName"], "a.example.com");
        assert_eq!(value["groupName"], "FS1");
        assert_eq!(value["displayBdLink"], "10.0.0.5");
        assert!(value.get("site").is_none());
    }

    #[test]
    fn site_query_matches_any_display_column() {
        let c = sample_collection();
        let rows = || flattened_sites(&c);
        assert_eq!(filter_sites(rows(), "").len(), 2);
        assert_eq!(filter_sites(rows(), "  ").len(), 2);
        assert_eq!(filter_sites(rows(), "B.EXAMPLE").len(), 1);
        assert_eq!(filter_sites(rows(), "fs1").len(), 2);
        assert_eq!(filter_sites(rows(), "10.0.0.5").len(), 1);
        assert_eq!(filter_sites(rows(), "rp.local").len(), 1);
        assert!(filter_sites(rows(), "nothing-matches").is_empty());
    }

    #[test]
    fn stats_count_categories_and_sites() {
        let s = stats(&sample_collection());
        assert_eq!(s.total_file_servers, 1);
        assert_eq!(s.total_sites, 2);
        assert_eq!(s.total_db_servers, 1);
        assert_eq!(s.total_reverse_proxy_servers, 1);
        assert_eq!(s.total_email_services, 1);
        assert_eq!(s.count(ServerCategory::Generic), 0);
    }

    #[test]
    fn associations_and_delete_impact() {
        let c = sample_collection();
        let rows = sites_associated_with(&c, "srv_db");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].site.id, "site_a");
        assert!(sites_associated_with(&c, "").is_empty());

        let impact = delete_impact(&c, "srv_db").unwrap();
        assert_eq!(impact.contained_sites, 0);
        assert_eq!(impact.associated_sites, 1);
        assert!(impact.summary().contains("1 site(s) reference it"));

        let impact = delete_impact(&c, "srv_fs").unwrap();
        assert_eq!(impact.contained_sites, 2);
        assert!(impact.summary().contains("2 site(s) will be deleted"));

        assert!(delete_impact(&c, "srv_missing").is_none());
    }

    #[test]
    fn email_service_lookup() {
        let c = sample_collection();
        let (_, b) = c.find_site("site_b").unwrap();
        let service_id = b.associated_email_service_id.as_deref();
        assert_eq!(email_service(&c, service_id).unwrap().id, "srv_mail");
        assert!(email_service(&c, None).is_none());
        assert!(email_service(&c, Some("srv_db")).is_none());
    }
}
