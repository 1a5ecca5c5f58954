//! Shared helpers for integration tests
//!
//! Wires a mock catalog server, an in-memory store and a connectivity
//! signal into the same component graph the app uses.

#![allow(dead_code)]

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use soylem_sync::client::cards::CardsApi;
use soylem_sync::client::connectivity::ConnectivityState;
use soylem_sync::client::offline::MutationQueue;
use soylem_sync::client::storage::MemoryStore;
use soylem_sync::client::{ResilientClient, SyncEngine};
use soylem_sync::shared::Endpoints;

/// Everything a test needs, pre-wired
pub struct Harness {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub connectivity: ConnectivityState,
    pub client: Arc<ResilientClient<MemoryStore>>,
}

impl Harness {
    /// Start a mock server and wire the client graph against it
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(MemoryStore::new());
        let connectivity = ConnectivityState::new(true);
        let client = Arc::new(
            ResilientClient::new(
                Arc::clone(&store),
                Endpoints::new(server.uri()),
                connectivity.subscribe(),
            )
            .expect("client builds"),
        );
        Self {
            server,
            store,
            connectivity,
            client,
        }
    }

    pub fn engine(&self) -> SyncEngine<MemoryStore> {
        SyncEngine::new(Arc::clone(&self.store), Arc::clone(&self.client))
    }

    pub fn queue(&self) -> MutationQueue<MemoryStore> {
        MutationQueue::new(Arc::clone(&self.store))
    }

    pub fn cards_api(&self) -> CardsApi<MemoryStore> {
        CardsApi::new(Arc::clone(&self.client), self.queue())
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.server.uri())
    }
}

/// Wire-shape card record
pub fn card_json(id: &str, title: &str, version: u64) -> serde_json::Value {
    json!({
        "_id": id,
        "title": title,
        "imageUri": format!("/uploads/{}.jpg", id),
        "section": "animals",
        "line": 1,
        "page": 1,
        "version": version,
        "updatedAt": "2024-05-01T10:00:00Z"
    })
}

pub async fn mount_manifest(server: &MockServer, version: u64) {
    Mock::given(method("GET"))
        .and(path("/api/global/cards/manifest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "version": version,
            "updatedAt": "2024-05-02T00:00:00Z"
        })))
        .mount(server)
        .await;
}

pub async fn mount_changes(server: &MockServer, since: &str, changes: serde_json::Value) {
    let mut mock = Mock::given(method("GET")).and(path("/api/global/cards/changes"));
    if !since.is_empty() {
        mock = mock.and(query_param("since", since));
    }
    mock.respond_with(ResponseTemplate::new(200).set_body_json(changes))
        .mount(server)
        .await;
}

pub async fn mount_card(server: &MockServer, id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/global/cards/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}
