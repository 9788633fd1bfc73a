//! Form-shaped inputs for creating and editing servers and sites.
//!
//! An input carries what a user typed, before category shaping. The
//! mutation functions turn it into a stored [`Server`] or [`Site`].

use servdash_types::{
    join_mx_lines, join_mx_list, parse_mx_lines, parse_mx_list, CategoryFilter, Collection,
    CustomField, RequiredField, Server, ServerCategory, Site, SiteAssociation,
    DEFAULT_ADMIN_CREDENTIAL,
};

/// Data submitted to create or edit a server.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerInput {
    /// Id of the server being edited; ignored on create.
    pub id: Option<String>,
    pub title: String,
    pub server_category: ServerCategory,
    pub link: String,
    pub port: Option<String>,
    /// `None` means "not provided"; the category's credential default applies.
    pub login: Option<String>,
    pub password: Option<String>,
    pub custom_fields: Vec<CustomField>,
    /// One MX record per line. Only read for email services.
    pub raw_mx_records: String,
    pub is_fixed: bool,
    pub show_on_mural: bool,
}

impl ServerInput {
    /// A blank input for `category`, with the category's default port.
    pub fn new(category: ServerCategory) -> Self {
        Self {
            server_category: category,
            port: category.rules().default_port.map(str::to_string),
            login: Some(String::new()),
            password: Some(String::new()),
            ..Self::default()
        }
    }

    /// A blank input preselected from the active category filter.
    pub fn for_filter(filter: CategoryFilter) -> Self {
        match filter {
            CategoryFilter::All => Self::new(ServerCategory::Generic),
            CategoryFilter::Only(category) => Self::new(category),
        }
    }

    /// An edit input prefilled from a stored server.
    pub fn from_server(server: &Server) -> Self {
        Self {
            id: Some(server.id.clone()),
            title: server.title.clone(),
            server_category: server.server_category,
            link: server.link.clone(),
            port: server.port.clone(),
            login: Some(server.login.clone()),
            password: Some(server.password.clone()),
            custom_fields: server.custom_fields.clone(),
            raw_mx_records: join_mx_lines(server.mx_records()),
            is_fixed: server.is_fixed,
            show_on_mural: server.show_on_mural,
        }
    }

    /// Switch category, resetting the port to the new category's default.
    pub fn set_category(&mut self, category: ServerCategory) {
        self.server_category = category;
        self.port = category.rules().default_port.map(str::to_string);
    }

    /// Append a blank custom field and return it for editing.
    pub fn add_custom_field(&mut self) -> &mut CustomField {
        push_blank(&mut self.custom_fields, CustomField::for_server("", ""))
    }

    pub fn remove_custom_field(&mut self, index: usize) -> Option<CustomField> {
        remove_at(&mut self.custom_fields, index)
    }

    /// Required fields left blank for this input's category.
    pub fn missing_fields(&self) -> Vec<RequiredField> {
        let rules = self.server_category.rules();
        let login = self.login.as_deref().unwrap_or(rules.credential_default);
        let password = self.password.as_deref().unwrap_or(rules.credential_default);
        rules.missing_fields(|field| match field {
            RequiredField::Title => self.title.as_str(),
            RequiredField::Link => self.link.as_str(),
            RequiredField::Login => login,
            RequiredField::Password => password,
        })
    }

    /// Shape the input into a stored server under `id`.
    ///
    /// Fields the category does not keep are dropped. Sites are not carried
    /// over here; a file server always starts with an empty list.
    pub(crate) fn into_server(self, id: String) -> Server {
        let rules = self.server_category.rules();
        let credential =
            |value: Option<String>| value.unwrap_or_else(|| rules.credential_default.to_string());
        Server {
            id,
            port: rules.resolve_port(self.port.as_deref()),
            login: credential(self.login),
            password: credential(self.password),
            mx_records: rules
                .has_mx_records
                .then(|| parse_mx_lines(&self.raw_mx_records)),
            sites: rules.hosts_sites.then(Vec::new),
            title: self.title,
            server_category: self.server_category,
            link: self.link,
            custom_fields: self.custom_fields,
            is_fixed: self.is_fixed,
            show_on_mural: self.show_on_mural,
        }
    }
}

/// Data submitted to create or edit a site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteInput {
    /// Id of the site being edited; ignored on create.
    pub id: Option<String>,
    pub domain_name: String,
    pub admin_user: String,
    pub admin_password: String,
    pub associated_db_server_id: Option<String>,
    pub associated_reverse_proxy_id: Option<String>,
    pub associated_backup_server_id: Option<String>,
    pub associated_email_service_id: Option<String>,
    /// Comma-separated MX records, used only without an email service.
    pub raw_email_mx_records: String,
    pub custom_fields: Vec<CustomField>,
    /// File server the site should end up in.
    pub target_file_server_id: String,
    /// File server the site lived in when the edit started.
    pub original_file_server_id: Option<String>,
}

impl SiteInput {
    /// A blank input for a new site under `file_server_id`.
    pub fn new(file_server_id: impl Into<String>) -> Self {
        let file_server_id = file_server_id.into();
        Self {
            id: None,
            domain_name: String::new(),
            admin_user: DEFAULT_ADMIN_CREDENTIAL.to_string(),
            admin_password: DEFAULT_ADMIN_CREDENTIAL.to_string(),
            associated_db_server_id: None,
            associated_reverse_proxy_id: None,
            associated_backup_server_id: None,
            associated_email_service_id: None,
            raw_email_mx_records: String::new(),
            custom_fields: Vec::new(),
            original_file_server_id: Some(file_server_id.clone()),
            target_file_server_id: file_server_id,
        }
    }

    /// An edit input prefilled from a stored site.
    ///
    /// With an email service associated the MX text is left empty, since
    /// the records are taken from that service on submit.
    pub fn from_site(site: &Site, file_server_id: impl Into<String>) -> Self {
        let file_server_id = file_server_id.into();
        let raw_email_mx_records = if site.associated_email_service_id.is_some() {
            String::new()
        } else {
            join_mx_list(&site.email_mx_records)
        };
        Self {
            id: Some(site.id.clone()),
            domain_name: site.domain_name.clone(),
            admin_user: site.admin_user.clone(),
            admin_password: site.admin_password.clone(),
            associated_db_server_id: site.associated_db_server_id.clone(),
            associated_reverse_proxy_id: site.associated_reverse_proxy_id.clone(),
            associated_backup_server_id: site.associated_backup_server_id.clone(),
            associated_email_service_id: site.associated_email_service_id.clone(),
            raw_email_mx_records,
            custom_fields: site.custom_fields.clone(),
            original_file_server_id: Some(file_server_id.clone()),
            target_file_server_id: file_server_id,
        }
    }

    pub fn association(&self, kind: SiteAssociation) -> Option<&str> {
        match kind {
            SiteAssociation::Database => self.associated_db_server_id.as_deref(),
            SiteAssociation::ReverseProxy => self.associated_reverse_proxy_id.as_deref(),
            SiteAssociation::Backup => self.associated_backup_server_id.as_deref(),
            SiteAssociation::EmailService => self.associated_email_service_id.as_deref(),
        }
    }

    /// Set or clear an association. A blank id clears it.
    pub fn set_association(&mut self, kind: SiteAssociation, server_id: Option<String>) {
        let server_id = server_id.filter(|id| !id.trim().is_empty());
        let slot = match kind {
            SiteAssociation::Database => &mut self.associated_db_server_id,
            SiteAssociation::ReverseProxy => &mut self.associated_reverse_proxy_id,
            SiteAssociation::Backup => &mut self.associated_backup_server_id,
            SiteAssociation::EmailService => &mut self.associated_email_service_id,
        };
        *slot = server_id;
    }

    /// Append a blank custom field and return it for editing.
    pub fn add_custom_field(&mut self) -> &mut CustomField {
        push_blank(&mut self.custom_fields, CustomField::for_site("", ""))
    }

    pub fn remove_custom_field(&mut self, index: usize) -> Option<CustomField> {
        remove_at(&mut self.custom_fields, index)
    }

    /// Names of required fields left blank.
    pub fn missing_fields(&self, is_edit: bool) -> Vec<String> {
        let mut missing = Vec::new();
        if self.domain_name.trim().is_empty() {
            missing.push("domainName".to_string());
        }
        if self.target_file_server_id.trim().is_empty() {
            missing.push("targetFileServerId".to_string());
        }
        if is_edit && self.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            missing.push("id".to_string());
        }
        missing
    }

    /// MX records the stored site gets.
    ///
    /// With an email service associated they are copied from that service
    /// (empty if it no longer exists); otherwise the raw text is parsed.
    pub(crate) fn resolve_email_mx(&self, collection: &Collection) -> Vec<String> {
        match self.associated_email_service_id.as_deref() {
            Some(service_id) => collection
                .server(service_id)
                .map(|service| service.mx_records().to_vec())
                .unwrap_or_default(),
            None => parse_mx_list(&self.raw_email_mx_records),
        }
    }

    pub(crate) fn into_site(self, id: String, email_mx_records: Vec<String>) -> Site {
        let blank_as_none = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        Site {
            id,
            domain_name: self.domain_name.trim().to_string(),
            admin_user: self.admin_user,
            admin_password: self.admin_password,
            associated_db_server_id: blank_as_none(self.associated_db_server_id),
            associated_reverse_proxy_id: blank_as_none(self.associated_reverse_proxy_id),
            associated_backup_server_id: blank_as_none(self.associated_backup_server_id),
            associated_email_service_id: blank_as_none(self.associated_email_service_id),
            email_mx_records,
            custom_fields: self.custom_fields,
        }
    }
}

fn push_blank(fields: &mut Vec<CustomField>, field: CustomField) -> &mut CustomField {
    fields.push(field);
    let last = fields.len() - 1;
    &mut fields[last]
}

fn remove_at(fields: &mut Vec<CustomField>, index: usize) -> Option<CustomField> {
    (index < fields.len()).then(|| fields.remove(index))
}
