//! Validated in-memory edits of a [`Collection`].
//!
//! Each function either applies its whole change or returns an error with
//! the collection untouched. Persisting the result is the caller's job.

use serde::Serialize;
use servdash_types::id::{SERVER_ID_PREFIX, SITE_ID_PREFIX};
use servdash_types::{Collection, Server, Site};
use tracing::warn;

use crate::error::{DashboardError, DashboardResult};
use crate::input::{ServerInput, SiteInput};

/// Outcome of [`delete_server`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedServer {
    pub server: Server,
    /// Sites removed along with a file server.
    pub removed_sites: usize,
    /// Association fields nulled in remaining sites.
    pub cleared_references: usize,
}

fn required_id(id: Option<&str>) -> DashboardResult<String> {
    id.map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| DashboardError::MissingFields(vec!["id".to_string()]))
}

/// Create a server, or replace the one named by `input.id` when `is_edit`.
///
/// A file server edited into another file server keeps its sites. A file
/// server edited into another category loses them.
pub fn upsert_server(
    collection: &mut Collection,
    input: ServerInput,
    is_edit: bool,
) -> DashboardResult<Server> {
    let missing = input.missing_fields();
    if !missing.is_empty() {
        return Err(DashboardError::MissingFields(
            missing.iter().map(|f| f.as_str().to_string()).collect(),
        ));
    }

    if !is_edit {
        let server = input.into_server(collection.fresh_id(SERVER_ID_PREFIX));
        collection.push(server.clone());
        return Ok(server);
    }

    let id = required_id(input.id.as_deref())?;
    let index = collection
        .position_of_server(&id)
        .ok_or_else(|| DashboardError::ServerNotFound(id.clone()))?;
    let previous_sites = collection.items()[index]
        .as_server()
        .filter(|s| s.is_file_server())
        .map(|s| s.sites().to_vec())
        .unwrap_or_default();

    let mut server = input.into_server(id);
    if server.is_file_server() {
        server.sites = Some(previous_sites);
    } else if !previous_sites.is_empty() {
        warn!(
            server_id = %server.id,
            category = %server.server_category,
            dropped_sites = previous_sites.len(),
            "file server changed category; hosted sites removed"
        );
    }
    collection.replace(index, server.clone());
    Ok(server)
}

/// Remove a server.
///
/// Deleting a file server removes its sites with it. Deleting any other
/// server nulls every site association pointing at it.
pub fn delete_server(collection: &mut Collection, server_id: &str) -> DashboardResult<DeletedServer> {
    let server = collection
        .remove_server(server_id)
        .ok_or_else(|| DashboardError::ServerNotFound(server_id.to_string()))?;

    let removed_sites = server.sites().len();
    let mut cleared_references = 0;
    if !server.is_file_server() {
        for owner in collection.servers_mut() {
            if let Some(sites) = owner.sites_mut() {
                for site in sites.iter_mut() {
                    cleared_references += site.clear_references_to(server_id);
                }
            }
        }
    }

    Ok(DeletedServer {
        server,
        removed_sites,
        cleared_references,
    })
}

fn file_server_sites<'a>(
    collection: &'a mut Collection,
    file_server_id: &str,
) -> DashboardResult<&'a mut Vec<Site>> {
    collection
        .server_mut(file_server_id)
        .and_then(Server::sites_mut)
        .ok_or_else(|| DashboardError::FileServerNotFound(file_server_id.to_string()))
}

/// Create a site in `input.target_file_server_id`, or update the site named
/// by `input.id` when `is_edit`, moving it if its parent changed.
pub fn upsert_site(
    collection: &mut Collection,
    input: SiteInput,
    is_edit: bool,
) -> DashboardResult<Site> {
    let missing = input.missing_fields(is_edit);
    if !missing.is_empty() {
        return Err(DashboardError::MissingFields(missing));
    }

    let target_id = input.target_file_server_id.trim().to_string();
    if !collection
        .server(&target_id)
        .is_some_and(Server::is_file_server)
    {
        return Err(DashboardError::FileServerNotFound(target_id));
    }
    let email_mx_records = input.resolve_email_mx(collection);

    if !is_edit {
        let site = input.into_site(collection.fresh_id(SITE_ID_PREFIX), email_mx_records);
        file_server_sites(collection, &target_id)?.push(site.clone());
        return Ok(site);
    }

    let site_id = required_id(input.id.as_deref())?;
    let hinted_parent = input
        .original_file_server_id
        .as_deref()
        .filter(|fs| {
            collection
                .server(fs)
                .is_some_and(|owner| owner.site(&site_id).is_some())
        })
        .map(str::to_string);
    let current_parent = hinted_parent
        .or_else(|| {
            collection
                .find_site(&site_id)
                .map(|(owner, _)| owner.id.clone())
        })
        .ok_or_else(|| DashboardError::SiteNotFound {
            site_id: site_id.clone(),
            file_server_id: input
                .original_file_server_id
                .clone()
                .unwrap_or_else(|| target_id.clone()),
        })?;

    let site = input.into_site(site_id.clone(), email_mx_records);
    if current_parent == target_id {
        let sites = file_server_sites(collection, &target_id)?;
        if let Some(slot) = sites.iter_mut().find(|s| s.id == site_id) {
            *slot = site.clone();
        }
    } else {
        file_server_sites(collection, &current_parent)?.retain(|s| s.id != site_id);
        file_server_sites(collection, &target_id)?.push(site.clone());
    }
    Ok(site)
}

/// Remove one site from a file server.
pub fn delete_site(
    collection: &mut Collection,
    site_id: &str,
    file_server_id: &str,
) -> DashboardResult<Site> {
    let sites = file_server_sites(collection, file_server_id)?;
    let index = sites
        .iter()
        .position(|s| s.id == site_id)
        .ok_or_else(|| DashboardError::SiteNotFound {
            site_id: site_id.to_string(),
            file_server_id: file_server_id.to_string(),
        })?;
    Ok(sites.remove(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::sample_collection;
    use crate::views;
    use proptest::prelude::*;
    use servdash_types::{ServerCategory, SiteAssociation};

    fn generic_input(title: &str) -> ServerInput {
        let mut input = ServerInput::new(ServerCategory::Generic);
        input.title = title.into();
        input.link = "host.local".into();
        input.login = Some("root".into());
        input.password = Some("pw".into());
        input
    }

    fn site_input(fs: &str, domain: &str) -> SiteInput {
        let mut input = SiteInput::new(fs);
        input.domain_name = domain.into();
        input
    }

    // ---------------------------------------------------------------
    // Servers
    // ---------------------------------------------------------------

    #[test]
    fn create_assigns_fresh_prefixed_id() {
        let mut c = Collection::new();
        let mut input = generic_input("g1");
        input.id = Some("caller-chosen".into());
        let server = upsert_server(&mut c, input, false).unwrap();
        assert!(server.id.starts_with("srv_"));
        assert_ne!(server.id, "caller-chosen");
        assert_eq!(c.server(&server.id), Some(&server));
    }

    #[test]
    fn blank_title_is_rejected_without_mutation() {
        let mut c = sample_collection();
        let before = c.clone();
        let err = upsert_server(&mut c, generic_input(""), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        match err {
            DashboardError::MissingFields(fields) => assert_eq!(fields, vec!["title"]),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(c, before);
    }

    #[test]
    fn db_server_defaults_port() {
        let mut c = Collection::new();
        let mut input = generic_input("DB");
        input.set_category(ServerCategory::DbServer);
        input.port = Some("  ".into());
        let server = upsert_server(&mut c, input, false).unwrap();
        assert_eq!(server.port.as_deref(), Some("3306"));
    }

    #[test]
    fn reverse_proxy_needs_no_credentials() {
        let mut c = Collection::new();
        let mut input = ServerInput::new(ServerCategory::ReverseProxyServer);
        input.title = "RP".into();
        input.link = "rp.local".into();
        input.login = None;
        input.password = None;
        let server = upsert_server(&mut c, input, false).unwrap();
        assert_eq!(server.login, "n/a");
        assert!(server.port.is_none());
    }

    #[test]
    fn edit_replaces_in_place() {
        let mut c = sample_collection();
        let mut input = ServerInput::from_server(c.server("srv_db").unwrap());
        input.title = "DB-primary".into();
        upsert_server(&mut c, input, true).unwrap();
        assert_eq!(c.position_of_server("srv_db"), Some(1));
        assert_eq!(c.server("srv_db").unwrap().title, "DB-primary");
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn edit_unknown_server_fails() {
        let mut c = sample_collection();
        let mut input = generic_input("x");
        input.id = Some("srv_missing".into());
        let err = upsert_server(&mut c, input, true).unwrap_err();
        assert!(matches!(err, DashboardError::ServerNotFound(id) if id == "srv_missing"));
    }

    #[test]
    fn edit_without_id_is_validation_error() {
        let mut c = sample_collection();
        let err = upsert_server(&mut c, generic_input("x"), true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn file_server_edit_keeps_sites() {
        let mut c = sample_collection();
        let mut input = ServerInput::from_server(c.server("srv_fs").unwrap());
        input.title = "FS1-renamed".into();
        let server = upsert_server(&mut c, input, true).unwrap();
        assert_eq!(server.sites().len(), 2);
        assert_eq!(c.server("srv_fs").unwrap().sites().len(), 2);
    }

    #[test]
    fn file_server_recategorized_drops_sites() {
        let mut c = sample_collection();
        let mut input = ServerInput::from_server(c.server("srv_fs").unwrap());
        input.set_category(ServerCategory::BackupServer);
        let server = upsert_server(&mut c, input, true).unwrap();
        assert!(server.sites.is_none());
        assert!(c.find_site("site_a").is_none());
    }

    #[test]
    fn delete_file_server_cascades_sites() {
        let mut c = sample_collection();
        let deleted = delete_server(&mut c, "srv_fs").unwrap();
        assert_eq!(deleted.removed_sites, 2);
        assert_eq!(deleted.cleared_references, 0);
        assert!(c.find_site("site_a").is_none());
        assert!(views::flattened_sites(&c).is_empty());
    }

    #[test]
    fn delete_db_server_nulls_references() {
        let mut c = sample_collection();
        let deleted = delete_server(&mut c, "srv_db").unwrap();
        assert_eq!(deleted.cleared_references, 1);
        let (_, site) = c.find_site("site_a").unwrap();
        assert!(site.association(SiteAssociation::Database).is_none());
        assert_eq!(site.association(SiteAssociation::ReverseProxy), Some("srv_rp"));
        assert_eq!(views::flattened_sites(&c)[0].display_bd_link, "N/A");
    }

    #[test]
    fn delete_unknown_server_fails() {
        let mut c = sample_collection();
        let err = delete_server(&mut c, "srv_missing").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(c.len(), 4);
    }

    // ---------------------------------------------------------------
    // Sites
    // ---------------------------------------------------------------

    #[test]
    fn create_site_appends_to_target() {
        let mut c = sample_collection();
        let site = upsert_site(&mut c, site_input("srv_fs", "c.example.com"), false).unwrap();
        assert!(site.id.starts_with("site_"));
        let sites = c.server("srv_fs").unwrap().sites();
        assert_eq!(sites.len(), 3);
        assert_eq!(sites[2].domain_name, "c.example.com");
        assert_eq!(sites[2].admin_user, "preencher");
    }

    #[test]
    fn site_in_non_file_server_is_rejected() {
        let mut c = sample_collection();
        let err = upsert_site(&mut c, site_input("srv_db", "c.example.com"), false).unwrap_err();
        assert!(matches!(err, DashboardError::FileServerNotFound(_)));
        let err = upsert_site(&mut c, site_input("srv_none", "c.example.com"), false).unwrap_err();
        assert!(matches!(err, DashboardError::FileServerNotFound(_)));
    }

    #[test]
    fn blank_domain_is_rejected() {
        let mut c = sample_collection();
        let err = upsert_site(&mut c, site_input("srv_fs", " "), false).unwrap_err();
        assert!(matches!(err, DashboardError::MissingFields(f) if f == vec!["domainName"]));
    }

    #[test]
    fn site_mx_copied_from_email_service() {
        let mut c = sample_collection();
        let mut input = site_input("srv_fs", "c.example.com");
        input.raw_email_mx_records = "typed.mx".into();
        input.set_association(SiteAssociation::EmailService, Some("srv_mail".into()));
        let site = upsert_site(&mut c, input, false).unwrap();
        assert_eq!(site.email_mx_records, vec!["mx.mail.example"]);
    }

    #[test]
    fn edit_site_in_place() {
        let mut c = sample_collection();
        let (_, site) = c.find_site("site_a").unwrap();
        let mut input = SiteInput::from_site(site, "srv_fs");
        input.domain_name = "renamed.example.com".into();
        upsert_site(&mut c, input, true).unwrap();
        let sites = c.server("srv_fs").unwrap().sites();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].id, "site_a");
        assert_eq!(sites[0].domain_name, "renamed.example.com");
    }

    #[test]
    fn edit_site_moves_between_file_servers() {
        let mut c = sample_collection();
        let mut fs2 = generic_input("FS2");
        fs2.set_category(ServerCategory::FileServer);
        let fs2 = upsert_server(&mut c, fs2, false).unwrap();

        let (_, site) = c.find_site("site_a").unwrap();
        let mut input = SiteInput::from_site(site, "srv_fs");
        input.target_file_server_id = fs2.id.clone();
        let moved = upsert_site(&mut c, input, true).unwrap();
        assert_eq!(moved.id, "site_a");

        assert!(c.server("srv_fs").unwrap().site("site_a").is_none());
        assert!(c.server(&fs2.id).unwrap().site("site_a").is_some());
        let (owner, _) = c.find_site("site_a").unwrap();
        assert_eq!(owner.id, fs2.id);
    }

    #[test]
    fn edit_site_with_stale_parent_hint_finds_real_parent() {
        let mut c = sample_collection();
        let (_, site) = c.find_site("site_b").unwrap();
        let mut input = SiteInput::from_site(site, "srv_fs");
        input.original_file_server_id = Some("srv_elsewhere".into());
        input.domain_name = "b2.example.com".into();
        upsert_site(&mut c, input, true).unwrap();
        assert_eq!(c.find_site("site_b").unwrap().1.domain_name, "b2.example.com");
        assert_eq!(c.server("srv_fs").unwrap().sites().len(), 2);
    }

    #[test]
    fn edit_missing_site_fails() {
        let mut c = sample_collection();
        let mut input = site_input("srv_fs", "x.example.com");
        input.id = Some("site_missing".into());
        let err = upsert_site(&mut c, input, true).unwrap_err();
        assert!(matches!(err, DashboardError::SiteNotFound { .. }));
        assert_eq!(c.server("srv_fs").unwrap().sites().len(), 2);
    }

    #[test]
    fn delete_site_removes_it() {
        let mut c = sample_collection();
        let removed = delete_site(&mut c, "site_a", "srv_fs").unwrap();
        assert_eq!(removed.domain_name, "a.example.com");
        assert_eq!(c.server("srv_fs").unwrap().sites().len(), 1);

        let err = delete_site(&mut c, "site_a", "srv_fs").unwrap_err();
        assert!(matches!(err, DashboardError::SiteNotFound { .. }));
        let err = delete_site(&mut c, "site_b", "srv_db").unwrap_err();
        assert!(matches!(err, DashboardError::FileServerNotFound(_)));
    }

    // ---------------------------------------------------------------
    // Properties
    // ---------------------------------------------------------------

    fn category_strategy() -> impl Strategy<Value = ServerCategory> {
        proptest::sample::select(ServerCategory::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn stored_servers_match_category_shape(
            ops in proptest::collection::vec((category_strategy(), any::<bool>(), 0usize..4), 1..25)
        ) {
            let mut c = Collection::new();
            for (category, edit, site_count) in ops {
                let mut input = generic_input("s");
                input.set_category(category);
                input.raw_mx_records = "mx.example".into();
                let existing = c.servers().last().map(|s| s.id.clone());
                let is_edit = edit && existing.is_some();
                input.id = existing;
                let server = upsert_server(&mut c, input, is_edit).unwrap();
                if server.is_file_server() {
                    for n in 0..site_count {
                        upsert_site(&mut c, site_input(&server.id, &format!("s{n}.example")), false)
                            .unwrap();
                    }
                }
            }

            let mut ids = std::collections::HashSet::new();
            for server in c.servers() {
                let rules = server.category().rules();
                prop_assert_eq!(server.sites.is_some(), rules.hosts_sites);
                prop_assert_eq!(server.port.is_some(), rules.keeps_port());
                prop_assert_eq!(server.mx_records.is_some(), rules.has_mx_records);
                prop_assert!(ids.insert(server.id.clone()));
                for site in server.sites() {
                    prop_assert!(ids.insert(site.id.clone()));
                }
            }
        }
    }
}
