// HTTP-level tests for the intake pipeline and role enforcement.

mod common;

use anyhow::Result;
use serde_json::{json, Value};

use common::{admin_token, send_json, spawn_app};
use mera_api::auth::policy::Role;

fn registration(member_id: &str, name: &str) -> Value {
    json!({
        "member_id": member_id,
        "name": name,
        "medicaid_id": "MD-1001",
        "phone": "555-0101",
        "address": null,
        "member_dob": "1985-08-25",
        "note": "referred by care coordinator"
    })
}

#[tokio::test]
async fn register_and_list_potential_customers() -> Result<()> {
    let t = spawn_app();
    let token = admin_token(&t.state, "ops@mera.example", Role::Admin).await?;

    let (status, body) = send_json(
        &t.app,
        "POST",
        "/api/intake/potential-customers",
        Some(&token),
        Some(registration("M-100", "Maria Lopez")),
    )
    .await?;
    assert_eq!(status, 201);
    assert_eq!(body["data"]["status"], "New");
    assert_eq!(body["data"]["member_id"], "M-100");

    let (status, body) = send_json(
        &t.app,
        "GET",
        "/api/intake/potential-customers",
        Some(&token),
        None,
    )
    .await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn duplicate_member_id_conflicts() -> Result<()> {
    let t = spawn_app();
    let token = admin_token(&t.state, "ops@mera.example", Role::Admin).await?;

    for expected in [201, 409] {
        let (status, _) = send_json(
            &t.app,
            "POST",
            "/api/intake/potential-customers",
            Some(&token),
            Some(registration("M-100", "Maria Lopez")),
        )
        .await?;
        assert_eq!(status, expected);
    }
    Ok(())
}

#[tokio::test]
async fn fill_form_moves_record_to_gen_creds() -> Result<()> {
    let t = spawn_app();
    let token = admin_token(&t.state, "ops@mera.example", Role::Admin).await?;

    let (_, created) = send_json(
        &t.app,
        "POST",
        "/api/intake/potential-customers",
        Some(&token),
        Some(registration("M-100", "Maria Lopez")),
    )
    .await?;
    let id = created["data"]["potential_customer_id"].as_i64().unwrap();

    let (status, body) = send_json(
        &t.app,
        "POST",
        "/api/intake/form",
        Some(&token),
        Some(json!({
            "potential_customer_id": id,
            "address": "12 Elm St",
            "preferred_delivery_time": "morning",
            "allergies": "peanuts",
            // Empty strings must not clobber existing values
            "delivery_note": ""
        })),
    )
    .await?;
    assert_eq!(status, 200);
    assert_eq!(body["data"]["status"], "GenCreds");
    assert_eq!(body["data"]["address"], "12 Elm St");
    assert_eq!(body["data"]["allergies"], "peanuts");
    assert_eq!(body["data"]["delivery_note"], Value::Null);

    // A second submission hits the already-completed guard
    let (status, _) = send_json(
        &t.app,
        "POST",
        "/api/intake/form",
        Some(&token),
        Some(json!({ "potential_customer_id": id, "address": "somewhere else" })),
    )
    .await?;
    assert_eq!(status, 409);
    Ok(())
}

#[tokio::test]
async fn fill_form_for_unknown_record_is_not_found() -> Result<()> {
    let t = spawn_app();
    let token = admin_token(&t.state, "ops@mera.example", Role::Admin).await?;

    let (status, _) = send_json(
        &t.app,
        "POST",
        "/api/intake/form",
        Some(&token),
        Some(json!({ "potential_customer_id": 9999, "address": "12 Elm St" })),
    )
    .await?;
    assert_eq!(status, 404);
    Ok(())
}

#[tokio::test]
async fn reject_removes_the_staged_record() -> Result<()> {
    let t = spawn_app();
    let token = admin_token(&t.state, "ops@mera.example", Role::Admin).await?;

    let (_, created) = send_json(
        &t.app,
        "POST",
        "/api/intake/potential-customers",
        Some(&token),
        Some(registration("M-100", "Maria Lopez")),
    )
    .await?;
    let id = created["data"]["potential_customer_id"].as_i64().unwrap();

    let uri = format!("/api/intake/potential-customers/{}", id);
    let (status, _) = send_json(&t.app, "DELETE", &uri, Some(&token), None).await?;
    assert_eq!(status, 200);

    // Gone means gone
    let (status, _) = send_json(&t.app, "DELETE", &uri, Some(&token), None).await?;
    assert_eq!(status, 404);
    Ok(())
}

#[tokio::test]
async fn super_admin_cannot_touch_the_intake_pipeline() -> Result<()> {
    let t = spawn_app();
    let super_token = admin_token(&t.state, "root@mera.example", Role::SuperAdmin).await?;

    let (status, body) = send_json(
        &t.app,
        "GET",
        "/api/intake/potential-customers",
        Some(&super_token),
        None,
    )
    .await?;
    assert_eq!(status, 403);
    assert_eq!(body["error"], true);

    let (status, _) = send_json(
        &t.app,
        "POST",
        "/api/intake/potential-customers",
        Some(&super_token),
        Some(registration("M-100", "Maria Lopez")),
    )
    .await?;
    assert_eq!(status, 403);
    Ok(())
}

#[tokio::test]
async fn admin_cannot_provision_admins() -> Result<()> {
    let t = spawn_app();
    let admin = admin_token(&t.state, "ops@mera.example", Role::Admin).await?;

    let (status, _) = send_json(
        &t.app,
        "POST",
        "/api/admins",
        Some(&admin),
        Some(json!({ "email": "new.hire@mera.example" })),
    )
    .await?;
    assert_eq!(status, 403);
    Ok(())
}

#[tokio::test]
async fn super_admin_provisions_admins_with_one_time_password() -> Result<()> {
    let t = spawn_app();
    let super_token = admin_token(&t.state, "root@mera.example", Role::SuperAdmin).await?;

    let (status, body) = send_json(
        &t.app,
        "POST",
        "/api/admins",
        Some(&super_token),
        Some(json!({ "email": "new.hire@mera.example" })),
    )
    .await?;
    assert_eq!(status, 201);
    assert_eq!(body["data"]["admin"]["username"], "new.hire");
    assert_eq!(body["data"]["admin"]["role"], "Admin");
    assert_eq!(body["data"]["password"], "new.hire123");
    // The hash never leaves the server
    assert!(body["data"]["admin"].get("password_hash").is_none());

    // The fresh admin can log in with the handed-off password
    let (status, _) = send_json(
        &t.app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "new.hire", "password": "new.hire123" })),
    )
    .await?;
    assert_eq!(status, 200);
    Ok(())
}

#[tokio::test]
async fn unknown_role_in_provisioning_is_a_bad_request() -> Result<()> {
    let t = spawn_app();
    let super_token = admin_token(&t.state, "root@mera.example", Role::SuperAdmin).await?;

    let (status, _) = send_json(
        &t.app,
        "POST",
        "/api/admins",
        Some(&super_token),
        Some(json!({ "email": "x@mera.example", "role": "Overlord" })),
    )
    .await?;
    assert_eq!(status, 400);
    Ok(())
}
