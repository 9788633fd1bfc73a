use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::id::generate_id;
use crate::item::Item;
use crate::server::Server;
use crate::site::Site;

/// Every tracked item, persisted and transferred as one JSON array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    items: Vec<Item>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Self {
        Self { items }
    }

    /// Parse a collection from JSON text. The text must hold an array.
    pub fn from_json(text: &str) -> Result<Self, TypeError> {
        serde_json::from_str(text).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, TypeError> {
        serde_json::to_string(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: impl Into<Item>) {
        self.items.push(item.into());
    }

    /// All server items, in collection order.
    pub fn servers(&self) -> impl Iterator<Item = &Server> {
        self.items.iter().filter_map(Item::as_server)
    }

    pub fn servers_mut(&mut self) -> impl Iterator<Item = &mut Server> {
        self.items.iter_mut().filter_map(Item::as_server_mut)
    }

    pub fn file_servers(&self) -> impl Iterator<Item = &Server> {
        self.servers().filter(|s| s.is_file_server())
    }

    pub fn server(&self, id: &str) -> Option<&Server> {
        self.servers().find(|s| s.id == id)
    }

    pub fn server_mut(&mut self, id: &str) -> Option<&mut Server> {
        self.servers_mut().find(|s| s.id == id)
    }

    /// Index into [`items`](Self::items) of the server with `id`.
    pub fn position_of_server(&self, id: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.as_server().is_some_and(|s| s.id == id))
    }

    /// Replace the item at `index`; returns the previous item.
    pub fn replace(&mut self, index: usize, item: impl Into<Item>) -> Item {
        std::mem::replace(&mut self.items[index], item.into())
    }

    /// Remove the server with `id`, keeping the order of the remaining items.
    pub fn remove_server(&mut self, id: &str) -> Option<Server> {
        let index = self.position_of_server(id)?;
        match self.items.remove(index) {
            Item::Server(server) => Some(server),
            Item::Other(_) => None,
        }
    }

    /// Every hosted site paired with the file server that owns it.
    pub fn sites(&self) -> impl Iterator<Item = (&Server, &Site)> {
        self.file_servers()
            .flat_map(|server| server.sites().iter().map(move |site| (server, site)))
    }

    /// Locate a site and its owning file server.
    pub fn find_site(&self, site_id: &str) -> Option<(&Server, &Site)> {
        self.sites().find(|(_, site)| site.id == site_id)
    }

    /// Whether any item or site already uses `id`, including the `id` field
    /// of items kept verbatim.
    pub fn contains_id(&self, id: &str) -> bool {
        self.items.iter().any(|item| match item {
            Item::Server(s) => s.id == id || s.sites().iter().any(|site| site.id == id),
            Item::Other(value) => value.get("id").and_then(|v| v.as_str()) == Some(id),
        })
    }

    /// Generate an id with `prefix` that no item or site uses yet.
    pub fn fresh_id(&self, prefix: &str) -> String {
        loop {
            let id = generate_id(prefix);
            if !self.contains_id(&id) {
                return id;
            }
        }
    }
}

impl FromIterator<Item> for Collection {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self::from_items(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ServerCategory;
    use proptest::prelude::*;
    use serde_json::json;

    fn sample() -> Collection {
        Collection::from_json(
            &json!([
                {"id": "srv_fs", "type": "server", "title": "FS1", "serverCategory": "FILE_SERVER",
                 "sites": [{"id": "site_a", "domainName": "a.example.com"},
                           {"id": "site_b", "domainName": "b.example.com"}]},
                {"id": "srv_db", "type": "server", "title": "DB1", "serverCategory": "DB_SERVER",
                 "port": "3306"},
                {"type": "note", "id": "note_1", "text": "keep me"}
            ])
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn parses_mixed_items() {
        let c = sample();
        assert_eq!(c.len(), 3);
        assert_eq!(c.servers().count(), 2);
        assert_eq!(c.file_servers().count(), 1);
        assert_eq!(c.sites().count(), 2);
    }

    #[test]
    fn json_roundtrip_is_lossless() {
        let c = sample();
        let text = c.to_json().unwrap();
        assert_eq!(Collection::from_json(&text).unwrap(), c);
    }

    #[test]
    fn non_array_json_is_rejected() {
        assert!(Collection::from_json("{\"a\": 1}").is_err());
        assert!(Collection::from_json("not json").is_err());
        assert!(Collection::from_json("[]").unwrap().is_empty());
    }

    #[test]
    fn lookups_by_id() {
        let c = sample();
        assert_eq!(c.server("srv_db").unwrap().category(), ServerCategory::DbServer);
        assert_eq!(c.position_of_server("srv_db"), Some(1));
        let (parent, site) = c.find_site("site_b").unwrap();
        assert_eq!(parent.id, "srv_fs");
        assert_eq!(site.domain_name, "b.example.com");
        assert!(c.contains_id("site_a"));
        assert!(c.contains_id("note_1"));
        assert!(!c.contains_id("srv_missing"));
    }

    #[test]
    fn remove_server_keeps_other_items() {
        let mut c = sample();
        let removed = c.remove_server("srv_fs").unwrap();
        assert_eq!(removed.sites().len(), 2);
        assert_eq!(c.len(), 2);
        assert_eq!(c.sites().count(), 0);
        assert!(c.remove_server("srv_fs").is_none());
    }

    #[test]
    fn fresh_id_avoids_existing_ids() {
        let c = sample();
        let id = c.fresh_id("srv");
        assert!(id.starts_with("srv_"));
        assert!(!c.contains_id(&id));
    }

    proptest! {
        #[test]
        fn fresh_ids_are_pairwise_distinct(count in 1usize..64) {
            let mut c = Collection::new();
            let mut seen = std::collections::HashSet::new();
            for _ in 0..count {
                let id = c.fresh_id("srv");
                prop_assert!(seen.insert(id.clone()));
                c.push(Server {
                    id,
                    title: String::new(),
                    server_category: ServerCategory::Generic,
                    link: String::new(),
                    port: None,
                    login: String::new(),
                    password: String::new(),
                    custom_fields: vec![],
                    mx_records: None,
                    sites: None,
                    is_fixed: false,
                    show_on_mural: false,
                });
            }
        }
    }
}
