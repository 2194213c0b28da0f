//! Shared test utilities and fixtures
//!
//! A wiremock server shaped like the pets API: `/api/pets` and
//! `/api/practitioners/{id}`.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use petvet_providers::endpoints::parse_base_url;
use petvet_providers::{HttpPetService, ServiceSettings};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn base_url(server: &MockServer) -> String {
    format!("{}/api", server.uri())
}

pub fn service_for(server: &MockServer) -> Arc<HttpPetService> {
    let settings = ServiceSettings::new(parse_base_url(&base_url(server)).unwrap())
        .with_timeout(Duration::from_secs(5));
    Arc::new(HttpPetService::new(&settings).unwrap())
}

pub fn pet_json(first: &str, last: &str, vet: Option<i64>) -> Value {
    match vet {
        Some(id) => json!({ "firstName": first, "lastName": last, "practitionerId": id }),
        None => json!({ "firstName": first, "lastName": last }),
    }
}

pub fn vet_json(first: &str, last: &str, title: &str) -> Value {
    json!({ "firstName": first, "lastName": last, "title": title })
}

pub async fn mount_pets(server: &MockServer, pets: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path("/api/pets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(pets)))
        .mount(server)
        .await;
}

pub async fn mount_pets_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/api/pets"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub async fn mount_vet(server: &MockServer, id: i64, vet: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/practitioners/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(vet))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_vet_delayed(server: &MockServer, id: i64, vet: Value, delay: Duration) {
    Mock::given(method("GET"))
        .and(path(format!("/api/practitioners/{id}")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(vet)
                .set_delay(delay),
        )
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_vet_status(server: &MockServer, id: i64, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/api/practitioners/{id}")))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(server)
        .await;
}

/// Requests the server saw for practitioner endpoints.
pub async fn vet_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path().starts_with("/api/practitioners/"))
        .count()
}
