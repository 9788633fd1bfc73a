use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use servdash_gateway::{Gateway, WriteAck};
use servdash_types::{CategoryFilter, Collection, Server, ServerCategory, Site};
use tracing::{debug, info, warn};

use crate::error::{DashboardError, DashboardResult};
use crate::input::{ServerInput, SiteInput};
use crate::mutation::{self, DeletedServer};
use crate::views::{self, DeleteImpact, FlattenedSite, Stats};

/// Sets the busy flag for its lifetime.
struct BusyGuard(Arc<AtomicBool>);

impl BusyGuard {
    fn start(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(Arc::clone(flag))
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// The dashboard's in-memory collection, kept in step with a [`Gateway`].
///
/// Mutations are applied in memory first and then the whole collection is
/// written. When that write fails the in-memory change stays,
/// [`has_unsynced_changes`](Self::has_unsynced_changes) turns true, and the
/// error is returned; [`sync`](Self::sync) retries the write.
///
/// The busy flag is set while a read or write is in flight. It is cleared
/// on every exit path, including when the future is dropped.
pub struct CollectionStore<G: Gateway> {
    gateway: G,
    collection: Collection,
    category_filter: CategoryFilter,
    site_query: String,
    loading: Arc<AtomicBool>,
    unsynced: bool,
}

impl<G: Gateway> CollectionStore<G> {
    /// An empty store; call [`load`](Self::load) to fetch the collection.
    pub fn new(gateway: G) -> Self {
        Self::with_collection(gateway, Collection::new())
    }

    /// A store seeded with `collection`, treated as already persisted.
    pub fn with_collection(gateway: G, collection: Collection) -> Self {
        Self {
            gateway,
            collection,
            category_filter: CategoryFilter::All,
            site_query: String::new(),
            loading: Arc::new(AtomicBool::new(false)),
            unsynced: false,
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Shared handle to the busy flag, for observers on other tasks.
    pub fn loading_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.loading)
    }

    pub fn has_unsynced_changes(&self) -> bool {
        self.unsynced
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Replace the in-memory collection with the stored one.
    ///
    /// On failure the collection is reset to empty and the error returned.
    /// Returns the number of items loaded.
    pub async fn load(&mut self) -> DashboardResult<usize> {
        let _busy = BusyGuard::start(&self.loading);
        match self.gateway.read().await {
            Ok(collection) => {
                self.collection = collection;
                self.unsynced = false;
                info!(items = self.collection.len(), "collection loaded");
                Ok(self.collection.len())
            }
            Err(e) => {
                warn!(error = %e, "failed to load collection; starting empty");
                self.collection = Collection::new();
                self.unsynced = false;
                Err(DashboardError::Persistence(e))
            }
        }
    }

    /// Write the current collection, clearing the unsynced marker on success.
    pub async fn sync(&mut self) -> DashboardResult<WriteAck> {
        let _busy = BusyGuard::start(&self.loading);
        match self.gateway.write(&self.collection).await {
            Ok(ack) => {
                self.unsynced = false;
                debug!(items = self.collection.len(), "collection synced");
                Ok(ack)
            }
            Err(e) => {
                self.unsynced = true;
                warn!(error = %e, "failed to persist collection; in-memory changes kept");
                Err(DashboardError::Persistence(e))
            }
        }
    }

    // -----------------------------------------------------------------------
    // Filters and views
    // -----------------------------------------------------------------------

    pub fn category_filter(&self) -> CategoryFilter {
        self.category_filter
    }

    pub fn set_category_filter(&mut self, filter: CategoryFilter) {
        self.category_filter = filter;
    }

    pub fn site_query(&self) -> &str {
        &self.site_query
    }

    pub fn set_site_query(&mut self, query: impl Into<String>) {
        self.site_query = query.into();
    }

    pub fn all_servers(&self) -> Vec<&Server> {
        views::all_servers(&self.collection)
    }

    pub fn servers_in(&self, filter: CategoryFilter) -> Vec<&Server> {
        views::servers_in(&self.collection, filter)
    }

    /// Servers matching the active category filter.
    pub fn filtered_servers(&self) -> Vec<&Server> {
        self.servers_in(self.category_filter)
    }

    pub fn flattened_sites(&self) -> Vec<FlattenedSite> {
        views::flattened_sites(&self.collection)
    }

    pub fn filter_sites(&self, query: &str) -> Vec<FlattenedSite> {
        views::filter_sites(self.flattened_sites(), query)
    }

    /// Sites matching the active site query.
    pub fn filtered_sites(&self) -> Vec<FlattenedSite> {
        self.filter_sites(&self.site_query)
    }

    pub fn stats(&self) -> Stats {
        views::stats(&self.collection)
    }

    pub fn available(&self, category: ServerCategory) -> Vec<&Server> {
        views::available(&self.collection, category)
    }

    pub fn available_file_servers(&self) -> Vec<&Server> {
        self.available(ServerCategory::FileServer)
    }

    pub fn available_db_servers(&self) -> Vec<&Server> {
        self.available(ServerCategory::DbServer)
    }

    pub fn available_reverse_proxy_servers(&self) -> Vec<&Server> {
        self.available(ServerCategory::ReverseProxyServer)
    }

    pub fn available_backup_servers(&self) -> Vec<&Server> {
        self.available(ServerCategory::BackupServer)
    }

    pub fn available_email_services(&self) -> Vec<&Server> {
        self.available(ServerCategory::EmailService)
    }

    pub fn sites_associated_with(&self, server_id: &str) -> Vec<FlattenedSite> {
        views::sites_associated_with(&self.collection, server_id)
    }

    pub fn delete_impact(&self, server_id: &str) -> Option<DeleteImpact> {
        views::delete_impact(&self.collection, server_id)
    }

    pub fn find_server(&self, server_id: &str) -> Option<&Server> {
        self.collection.server(server_id)
    }

    /// A site together with the file server holding it.
    pub fn find_site(&self, site_id: &str) -> Option<(&Server, &Site)> {
        self.collection.find_site(site_id)
    }

    /// The email service selected in a site form, if it exists.
    pub fn email_service_for(&self, input: &SiteInput) -> Option<&Server> {
        views::email_service(&self.collection, input.associated_email_service_id.as_deref())
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    pub async fn upsert_server(
        &mut self,
        input: ServerInput,
        is_edit: bool,
    ) -> DashboardResult<Server> {
        let server = mutation::upsert_server(&mut self.collection, input, is_edit)?;
        info!(
            server_id = %server.id,
            category = %server.server_category,
            is_edit,
            "server saved"
        );
        self.sync().await?;
        Ok(server)
    }

    pub async fn delete_server(&mut self, server_id: &str) -> DashboardResult<DeletedServer> {
        let deleted = mutation::delete_server(&mut self.collection, server_id)?;
        info!(
            server_id,
            removed_sites = deleted.removed_sites,
            cleared_references = deleted.cleared_references,
            "server deleted"
        );
        self.sync().await?;
        Ok(deleted)
    }

    pub async fn upsert_site(&mut self, input: SiteInput, is_edit: bool) -> DashboardResult<Site> {
        let file_server_id = input.target_file_server_id.clone();
        let site = mutation::upsert_site(&mut self.collection, input, is_edit)?;
        info!(site_id = %site.id, %file_server_id, is_edit, "site saved");
        self.sync().await?;
        Ok(site)
    }

    pub async fn delete_site(&mut self, site_id: &str, file_server_id: &str) -> DashboardResult<Site> {
        let site = mutation::delete_site(&mut self.collection, site_id, file_server_id)?;
        info!(site_id, file_server_id, "site deleted");
        self.sync().await?;
        Ok(site)
    }
}
