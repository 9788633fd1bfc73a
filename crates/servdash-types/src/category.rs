use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// The kind of machine or service a [`Server`](crate::Server) represents.
///
/// The category decides which fields a server carries; see [`CategoryRules`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerCategory {
    #[default]
    Generic,
    FileServer,
    DbServer,
    ReverseProxyServer,
    BackupServer,
    EmailService,
}

impl ServerCategory {
    /// Every category, in dashboard order.
    pub const ALL: [ServerCategory; 6] = [
        Self::Generic,
        Self::FileServer,
        Self::DbServer,
        Self::ReverseProxyServer,
        Self::BackupServer,
        Self::EmailService,
    ];

    /// Wire name used in the persisted JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generic => "GENERIC",
            Self::FileServer => "FILE_SERVER",
            Self::DbServer => "DB_SERVER",
            Self::ReverseProxyServer => "REVERSE_PROXY_SERVER",
            Self::BackupServer => "BACKUP_SERVER",
            Self::EmailService => "EMAIL_SERVICE",
        }
    }

    /// The field rules for this category.
    pub fn rules(&self) -> &'static CategoryRules {
        match self {
            Self::Generic => &GENERIC_RULES,
            Self::FileServer => &FILE_SERVER_RULES,
            Self::DbServer => &DB_SERVER_RULES,
            Self::ReverseProxyServer => &REVERSE_PROXY_RULES,
            Self::BackupServer => &BACKUP_SERVER_RULES,
            Self::EmailService => &EMAIL_SERVICE_RULES,
        }
    }

    pub fn is_file_server(&self) -> bool {
        matches!(self, Self::FileServer)
    }
}

impl fmt::Display for ServerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerCategory {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| TypeError::UnknownCategory(s.to_string()))
    }
}

/// Category selection used by the server list view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(ServerCategory),
}

impl CategoryFilter {
    pub fn matches(&self, category: ServerCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => *c == category,
        }
    }
}

impl From<ServerCategory> for CategoryFilter {
    fn from(category: ServerCategory) -> Self {
        Self::Only(category)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("ALL"),
            Self::Only(c) => c.fmt(f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// A server field that a category may require to be non-empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequiredField {
    Title,
    Link,
    Login,
    Password,
}

impl RequiredField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Link => "link",
            Self::Login => "login",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field presence, defaults, and requirements for one [`ServerCategory`].
///
/// Validation and field pruning both read from this table; no other code
/// branches on the category to decide which fields a server keeps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryRules {
    /// Fields that must be non-empty on submission.
    pub required: &'static [RequiredField],
    /// Default port when the category keeps a port at all.
    pub default_port: Option<&'static str>,
    /// Whether servers of this category own a `sites` list.
    pub hosts_sites: bool,
    /// Whether servers of this category carry `mxRecords`.
    pub has_mx_records: bool,
    /// Value for `login`/`password` when the input does not carry them.
    pub credential_default: &'static str,
}

const FULL_REQUIRED: &[RequiredField] = &[
    RequiredField::Title,
    RequiredField::Link,
    RequiredField::Login,
    RequiredField::Password,
];

static GENERIC_RULES: CategoryRules = CategoryRules {
    required: FULL_REQUIRED,
    default_port: None,
    hosts_sites: false,
    has_mx_records: false,
    credential_default: "",
};

static FILE_SERVER_RULES: CategoryRules = CategoryRules {
    required: FULL_REQUIRED,
    default_port: None,
    hosts_sites: true,
    has_mx_records: false,
    credential_default: "",
};

static DB_SERVER_RULES: CategoryRules = CategoryRules {
    required: FULL_REQUIRED,
    default_port: Some("3306"),
    hosts_sites: false,
    has_mx_records: false,
    credential_default: "",
};

static REVERSE_PROXY_RULES: CategoryRules = CategoryRules {
    required: &[RequiredField::Title, RequiredField::Link],
    default_port: None,
    hosts_sites: false,
    has_mx_records: false,
    credential_default: "n/a",
};

static BACKUP_SERVER_RULES: CategoryRules = CategoryRules {
    required: FULL_REQUIRED,
    default_port: None,
    hosts_sites: false,
    has_mx_records: false,
    credential_default: "",
};

static EMAIL_SERVICE_RULES: CategoryRules = CategoryRules {
    required: &[RequiredField::Title],
    default_port: None,
    hosts_sites: false,
    has_mx_records: true,
    credential_default: "n/a",
};

impl CategoryRules {
    /// Whether servers under these rules keep a `port` field.
    pub fn keeps_port(&self) -> bool {
        self.default_port.is_some()
    }

    /// Required fields whose value (as returned by `value_of`) is blank.
    pub fn missing_fields<'a>(
        &self,
        value_of: impl Fn(RequiredField) -> &'a str,
    ) -> Vec<RequiredField> {
        self.required
            .iter()
            .copied()
            .filter(|field| value_of(*field).trim().is_empty())
            .collect()
    }

    /// The port to store: the given one if non-blank, else the default.
    ///
    /// Returns `None` for categories that do not keep a port.
    pub fn resolve_port(&self, port: Option<&str>) -> Option<String> {
        let default = self.default_port?;
        match port.map(str::trim) {
            Some(p) if !p.is_empty() => Some(p.to_string()),
            _ => Some(default.to_string()),
        }
    }
}
