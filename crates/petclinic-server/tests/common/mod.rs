// crates/petclinic-server/tests/common/mod.rs
// ============================================================================
// Module: Server Test Harness
// Description: Spawns the clinic HTTP server on an ephemeral port.
// Purpose: Drive the real axum app over HTTP in integration tests.
// Dependencies: petclinic-config, petclinic-server, reqwest, tempfile, tokio
// ============================================================================

#![allow(dead_code, reason = "Helpers are shared across test binaries.")]

use std::path::PathBuf;

use petclinic_config::PetClinicConfig;
use petclinic_server::PetClinicServer;
use petclinic_server::ServerError;
use serde_json::Value;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Token accepted by every test server.
pub const VALID_TOKEN: &str = "valid-token";

/// Seed section with owner John Doe and pet Fido.
pub const JOHN_WITH_FIDO: &str = r#"
[[seed.owners]]
first_name = "John"
last_name = "Doe"
address = "123 Main Street"
city = "Anytown"
telephone = "1234567890"

[[seed.owners.pets]]
name = "Fido"
birth_date = "2020-01-01"
type_id = 1
type_name = "dog"
"#;

/// Running test server.
pub struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:41234`.
    pub base_url: String,
    /// HTTP client for requests.
    pub client: reqwest::Client,
    /// Audit log path.
    pub audit_path: PathBuf,
    /// Shutdown signal.
    shutdown: Option<oneshot::Sender<()>>,
    /// Server task.
    join: Option<JoinHandle<Result<(), ServerError>>>,
}

impl TestServer {
    /// Returns an absolute URL for `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Sends an authorized POST with an optional JSON body.
    pub async fn post_authorized(&self, path: &str, body: Option<Value>) -> reqwest::Response {
        let request = self.client.post(self.url(path)).header("Authorization", VALID_TOKEN);
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        request.send().await.expect("request")
    }

    /// Fetches a JSON document.
    pub async fn get_json(&self, path: &str) -> (u16, Value) {
        let response = self.client.get(self.url(path)).send().await.expect("request");
        let status = response.status().as_u16();
        let body = response.json::<Value>().await.expect("json body");
        (status, body)
    }

    /// Returns parsed audit log lines.
    pub fn audit_lines(&self) -> Vec<Value> {
        let content = std::fs::read_to_string(&self.audit_path).unwrap_or_default();
        content.lines().filter_map(|line| serde_json::from_str(line).ok()).collect()
    }

    /// Stops the server and waits for it to exit.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            join.await.expect("server task").expect("server result");
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Spawns an in-memory server seeded with John Doe and Fido.
pub async fn spawn_seeded(dir: &TempDir) -> TestServer {
    spawn_server(dir, "", JOHN_WITH_FIDO).await
}

/// Spawns a server with extra config sections appended.
pub async fn spawn_server(dir: &TempDir, store_section: &str, seed_section: &str) -> TestServer {
    let audit_path = dir.path().join("audit.jsonl");
    let toml = format!(
        "[server]\nbind = \"127.0.0.1:0\"\n\n[server.auth]\ntokens = [\"{VALID_TOKEN}\"]\n\n\
         [server.audit]\npath = '{}'\n\n{store_section}\n{seed_section}",
        audit_path.display()
    );
    let config = PetClinicConfig::from_toml(&toml).expect("config");
    let server = PetClinicServer::from_config(config).expect("server");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let join = tokio::spawn(server.serve_with_shutdown(listener, async move {
        let _ = shutdown_rx.await;
    }));
    TestServer {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        audit_path,
        shutdown: Some(shutdown_tx),
        join: Some(join),
    }
}

/// Returns the first owner's id and first pet's id from `GET /owners`.
pub async fn first_owner_and_pet(server: &TestServer) -> (u64, u64) {
    let (_, owners) = server.get_json("/owners").await;
    let owner = &owners[0];
    let owner_id = owner["id"].as_u64().expect("owner id");
    let pet_id = owner["pets"][0]["id"].as_u64().expect("pet id");
    (owner_id, pet_id)
}
