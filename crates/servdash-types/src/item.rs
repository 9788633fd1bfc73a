use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::server::Server;

/// A top-level entry of the persisted [`Collection`](crate::Collection).
///
/// Items are tagged by their JSON `type` field. Only servers are modelled;
/// objects of any other type are kept verbatim so that reading and writing
/// back a collection never drops data this version does not understand.
/// A `server` object that does not fit [`Server`] is kept the same way.
#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Server(Server),
    Other(Value),
}

#[derive(Serialize)]
#[serde(tag = "type")]
enum TaggedRef<'a> {
    #[serde(rename = "server")]
    Server(&'a Server),
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Tagged {
    #[serde(rename = "server")]
    Server(Server),
}

impl Item {
    pub fn as_server(&self) -> Option<&Server> {
        match self {
            Self::Server(s) => Some(s),
            Self::Other(_) => None,
        }
    }

    pub fn as_server_mut(&mut self) -> Option<&mut Server> {
        match self {
            Self::Server(s) => Some(s),
            Self::Other(_) => None,
        }
    }

    /// The `type` discriminant as written to JSON.
    pub fn type_name(&self) -> Option<&str> {
        match self {
            Self::Server(_) => Some("server"),
            Self::Other(v) => v.get("type").and_then(Value::as_str),
        }
    }
}

impl From<Server> for Item {
    fn from(server: Server) -> Self {
        Self::Server(server)
    }
}

impl Serialize for Item {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Server(server) => TaggedRef::Server(server).serialize(serializer),
            Self::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Item {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        if value.get("type").and_then(Value::as_str) != Some("server") {
            return Ok(Self::Other(value));
        }
        match Tagged::deserialize(&value) {
            Ok(Tagged::Server(server)) => Ok(Self::Server(server)),
            Err(e) => {
                let id = value.get("id").and_then(Value::as_str).unwrap_or("?");
                warn!(id, error = %e, "unreadable server item kept as-is");
                Ok(Self::Other(value))
            }
        }
    }
}
