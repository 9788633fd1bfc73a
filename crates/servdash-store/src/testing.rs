//! Shared fixtures and gateways for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use servdash_gateway::{Gateway, GatewayError, GatewayResult, WriteAck};
use servdash_types::Collection;

/// FS1 with two sites, plus a database, a reverse proxy, and a mail service.
///
/// `site_a` references the database and the proxy; `site_b` the mail service.
pub fn sample_collection() -> Collection {
    Collection::from_json(
        &json!([
            {"id": "srv_fs", "type": "server", "title": "FS1", "serverCategory": "FILE_SERVER",
             "link": "fs.local", "login": "root", "password": "pw",
             "sites": [
                {"id": "site_a", "domainName": "a.example.com",
                 "adminUser": "admin", "adminPassword": "secret",
                 "associatedDbServerId": "srv_db",
                 "associatedReverseProxyId": "srv_rp",
                 "associatedBackupServerId": null,
                 "associatedEmailServiceId": null,
                 "emailMxRecords": [], "customFields": []},
                {"id": "site_b", "domainName": "b.example.com",
                 "associatedEmailServiceId": "srv_mail",
                 "emailMxRecords": ["mx.mail.example"]}
             ]},
            {"id": "srv_db", "type": "server", "title": "DB1", "serverCategory": "DB_SERVER",
             "link": "10.0.0.5", "port": "3306", "login": "dba", "password": "pw"},
            {"id": "srv_rp", "type": "server", "title": "RP1",
             "serverCategory": "REVERSE_PROXY_SERVER", "link": "rp.local",
             "login": "n/a", "password": "n/a"},
            {"id": "srv_mail", "type": "server", "title": "Mail",
             "serverCategory": "EMAIL_SERVICE", "link": "", "login": "n/a", "password": "n/a",
             "mxRecords": ["mx.mail.example"]}
        ])
        .to_string(),
    )
    .unwrap()
}

/// In-memory gateway whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyGateway {
    stored: Mutex<Collection>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub writes: AtomicUsize,
}

impl FlakyGateway {
    pub fn with(collection: Collection) -> Self {
        Self {
            stored: Mutex::new(collection),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Collection {
        self.stored.lock().unwrap().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Gateway for FlakyGateway {
    async fn read(&self) -> GatewayResult<Collection> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GatewayError::Status {
                status: 500,
                body: "internal server error".into(),
            });
        }
        Ok(self.stored())
    }

    async fn write(&self, collection: &Collection) -> GatewayResult<WriteAck> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GatewayError::Status {
                status: 500,
                body: "internal server error".into(),
            });
        }
        *self.stored.lock().unwrap() = collection.clone();
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(WriteAck::ok("data saved"))
    }
}
