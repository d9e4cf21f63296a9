// crates/petclinic-server/tests/owner_endpoints.rs
// ============================================================================
// Module: Owner Endpoint Tests
// Description: HTTP tests for owner listing, lookup, creation, and pets.
// Purpose: Validate the read routes and the authenticated mutation routes.
// Dependencies: petclinic-server, reqwest, tempfile, tokio
// ============================================================================

//! ## Overview
//! Covers `GET /owners`, `GET /owners/{ownerId}`, `POST /owners`,
//! `POST /owners/{ownerId}/pets`, and `GET /pettypes` over a live listener,
//! including concurrent pet registration and pet type name conflicts.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only HTTP assertions."
)]

mod common;

use serde_json::Value;
use serde_json::json;

use crate::common::VALID_TOKEN;
use crate::common::first_owner_and_pet;
use crate::common::spawn_seeded;

/// Valid owner payload for creation.
fn jane_roe() -> Value {
    json!({
        "firstName": "Jane",
        "lastName": "Roe",
        "address": "9 Elm Road",
        "city": "Othertown",
        "telephone": "5550001111"
    })
}

// ============================================================================
// SECTION: Reads
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn list_owners_returns_seeded_owner_with_pets() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;

    let (status, owners) = server.get_json("/owners").await;
    assert_eq!(status, 200);
    let owners = owners.as_array().unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0]["firstName"], "John");
    assert_eq!(owners[0]["telephone"], "1234567890");
    assert_eq!(owners[0]["pets"][0]["name"], "Fido");
    assert_eq!(owners[0]["pets"][0]["birthDate"], "2020-01-01");
    assert_eq!(owners[0]["pets"][0]["type"]["name"], "dog");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn list_owners_filters_by_last_name_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;

    let (_, owners) = server.get_json("/owners?lastName=Do").await;
    assert_eq!(owners.as_array().unwrap().len(), 1);
    let (_, owners) = server.get_json("/owners?lastName=Smith").await;
    assert!(owners.as_array().unwrap().is_empty());
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn show_owner_returns_owner_or_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;
    let (owner_id, _) = first_owner_and_pet(&server).await;

    let (status, owner) = server.get_json(&format!("/owners/{owner_id}")).await;
    assert_eq!(status, 200);
    assert_eq!(owner["lastName"], "Doe");

    let (status, body) = server.get_json("/owners/4242").await;
    assert_eq!(status, 404);
    assert_eq!(body["message"], "Owner with ID 4242 not found");

    let (status, _) = server.get_json("/owners/not-a-number").await;
    assert_eq!(status, 400);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn pet_types_lists_seeded_types() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;

    let (status, types) = server.get_json("/pettypes").await;
    assert_eq!(status, 200);
    assert_eq!(types, json!([{ "id": 1, "name": "dog" }]));
    server.stop().await;
}

// ============================================================================
// SECTION: Create Owner
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn create_owner_requires_authorization() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;

    let response = server.client.post(server.url("/owners")).json(&jane_roe()).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
    let (_, owners) = server.get_json("/owners").await;
    assert_eq!(owners.as_array().unwrap().len(), 1);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn create_owner_assigns_id() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;

    let response = server.post_authorized("/owners", Some(jane_roe())).await;
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_u64().unwrap();
    assert_eq!(created["pets"], json!([]));

    let (status, owner) = server.get_json(&format!("/owners/{id}")).await;
    assert_eq!(status, 200);
    assert_eq!(owner["city"], "Othertown");
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn create_owner_rejects_invalid_fields() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;

    let mut owner = jane_roe();
    owner["telephone"] = json!("555-0001");
    let response = server.post_authorized("/owners", Some(owner)).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "telephone must contain digits only");

    let mut owner = jane_roe();
    owner["lastName"] = json!("   ");
    let response = server.post_authorized("/owners", Some(owner)).await;
    assert_eq!(response.status().as_u16(), 400);

    let response = server
        .client
        .post(server.url("/owners"))
        .header("Authorization", VALID_TOKEN)
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    server.stop().await;
}

// ============================================================================
// SECTION: Add Pet
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn add_pet_attaches_pet_to_owner() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;
    let (owner_id, _) = first_owner_and_pet(&server).await;

    let pet = json!({
        "name": "Whiskers",
        "birthDate": "2021-06-15",
        "type": { "id": 2, "name": "cat" }
    });
    let response = server.post_authorized(&format!("/owners/{owner_id}/pets"), Some(pet)).await;
    assert_eq!(response.status().as_u16(), 201);
    let created: Value = response.json().await.unwrap();
    assert!(created["id"].as_u64().is_some());

    let (_, owner) = server.get_json(&format!("/owners/{owner_id}")).await;
    let names: Vec<&str> =
        owner["pets"].as_array().unwrap().iter().filter_map(|pet| pet["name"].as_str()).collect();
    assert!(names.contains(&"Fido"));
    assert!(names.contains(&"Whiskers"));
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn add_pet_rejects_duplicate_name_and_unknown_owner() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;
    let (owner_id, _) = first_owner_and_pet(&server).await;
    let fido = json!({
        "name": "fido",
        "birthDate": "2022-02-02",
        "type": { "id": 1, "name": "dog" }
    });

    let response =
        server.post_authorized(&format!("/owners/{owner_id}/pets"), Some(fido.clone())).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "name already exists for this owner");

    let response = server.post_authorized("/owners/31337/pets", Some(fido.clone())).await;
    assert_eq!(response.status().as_u16(), 404);

    let response = server
        .client
        .post(server.url(&format!("/owners/{owner_id}/pets")))
        .json(&fido)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn add_pet_rejects_renaming_a_stored_pet_type() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;
    let (owner_id, _) = first_owner_and_pet(&server).await;
    let jane = server.post_authorized("/owners", Some(jane_roe())).await;
    let jane: Value = jane.json().await.unwrap();
    let jane_id = jane["id"].as_u64().unwrap();

    let tom = json!({
        "name": "Tom",
        "birthDate": "2021-03-03",
        "type": { "id": 1, "name": "cat" }
    });
    let response = server.post_authorized(&format!("/owners/{jane_id}/pets"), Some(tom)).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "type id 1 is already named dog");

    let (_, owner) = server.get_json(&format!("/owners/{owner_id}")).await;
    assert_eq!(owner["pets"][0]["type"]["name"], "dog");
    let (_, types) = server.get_json("/pettypes").await;
    assert_eq!(types, json!([{ "id": 1, "name": "dog" }]));
    server.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_add_pet_requests_all_persist() {
    let dir = tempfile::tempdir().unwrap();
    let server = spawn_seeded(&dir).await;
    let (owner_id, _) = first_owner_and_pet(&server).await;
    let url = server.url(&format!("/owners/{owner_id}/pets"));

    let requests: Vec<_> = (0..12)
        .map(|index| {
            let client = server.client.clone();
            let url = url.clone();
            tokio::spawn(async move {
                let pet = json!({
                    "name": format!("Pet{index}"),
                    "birthDate": "2022-02-02",
                    "type": { "id": 1, "name": "dog" }
                });
                let response = client
                    .post(url)
                    .header("Authorization", VALID_TOKEN)
                    .json(&pet)
                    .send()
                    .await
                    .unwrap();
                response.status().as_u16()
            })
        })
        .collect();
    for request in requests {
        assert_eq!(request.await.unwrap(), 201);
    }

    let (_, owner) = server.get_json(&format!("/owners/{owner_id}")).await;
    assert_eq!(owner["pets"].as_array().unwrap().len(), 13);
    server.stop().await;
}
