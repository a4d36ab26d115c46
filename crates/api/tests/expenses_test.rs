//! Expenses, settlement and balances over HTTP.

mod common;

use axum::http::{Method, StatusCode};
use common::{app, group_with_members, send};
use serde_json::{Value, json};

fn share_amounts(expense: &Value) -> Vec<String> {
    expense["shares"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["amount"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_equal_split_on_create() {
    let app = app().await;
    let (group_id, users) = group_with_members(&app, &["Alice", "Bob", "Carol"]).await;

    let (status, expense) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/expenses"),
        Some(json!({ "description": "Dinner", "amount": "100.00", "paid_by_user_id": users[0] })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(expense["amount"], "100.00");
    assert_eq!(share_amounts(&expense), vec!["33.34", "33.33", "33.33"]);
    assert_eq!(expense["shares"][0]["user_id"], users[0].as_str());
    assert_eq!(expense["shares"][0]["is_settled"], false);
}

#[tokio::test]
async fn test_explicit_shares_must_sum() {
    let app = app().await;
    let (group_id, users) = group_with_members(&app, &["Alice", "Bob"]).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/expenses"),
        Some(json!({
            "description": "Hotel",
            "amount": "100.00",
            "shares": [
                { "user_id": users[0], "amount": "60.00" },
                { "user_id": users[1], "amount": "40.01" },
            ],
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");

    let (_, list) = send(&app, Method::GET, &format!("/groups/{group_id}/expenses"), None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_rejections() {
    let app = app().await;
    let (group_id, users) = group_with_members(&app, &["Alice"]).await;
    let (_, outsider) = group_with_members(&app, &["Mallory"]).await;
    let uri = format!("/groups/{group_id}/expenses");

    let cases = [
        json!({ "description": "Zero", "amount": "0.00" }),
        json!({ "description": "  ", "amount": "5.00" }),
        json!({ "description": "Payer", "amount": "5.00", "paid_by_user_id": outsider[0] }),
        json!({ "description": "Foreign", "amount": "5.00",
                "shares": [{ "user_id": outsider[0], "amount": "5.00" }] }),
        json!({ "description": "Dup", "amount": "10.00",
                "shares": [{ "user_id": users[0], "amount": "5.00" },
                           { "user_id": users[0], "amount": "5.00" }] }),
    ];

    for body in cases {
        let (status, _) = send(&app, Method::POST, &uri, Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    }
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected() {
    let app = app().await;
    let (group_id, users) = group_with_members(&app, &["Alice", "Bob"]).await;
    let uri = format!("/groups/{group_id}/expenses");
    let max = "79228162514264337593543950335";

    let cases = [
        json!({ "description": "Shares", "amount": "100.00",
                "shares": [{ "user_id": users[0], "amount": max },
                           { "user_id": users[1], "amount": max }] }),
        json!({ "description": "Amount", "amount": max }),
    ];

    for body in cases {
        let (status, error) = send(&app, Method::POST, &uri, Some(body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(error["error"], "VALIDATION_ERROR");
    }

    let (_, list) = send(&app, Method::GET, &uri, None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_group_cannot_split() {
    let app = app().await;
    let (group_id, _) = group_with_members(&app, &[]).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/expenses"),
        Some(json!({ "description": "Taxi", "amount": "12.00" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_group_and_expense() {
    let app = app().await;
    let missing = uuid::Uuid::now_v7();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/groups/{missing}/expenses"),
        Some(json!({ "description": "Taxi", "amount": "12.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, &format!("/expenses/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, &format!("/groups/{missing}/balances"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_amount_update_resplits() {
    let app = app().await;
    let (group_id, _) = group_with_members(&app, &["Alice", "Bob", "Carol"]).await;
    let (_, expense) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/expenses"),
        Some(json!({ "description": "Dinner", "amount": "30.00" })),
    )
    .await;
    let id = expense["id"].as_str().unwrap();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/expenses/{id}"),
        Some(json!({ "amount": "10.00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(share_amounts(&updated), vec!["3.34", "3.33", "3.33"]);

    let (_, fetched) = send(&app, Method::GET, &format!("/expenses/{id}"), None).await;
    assert_eq!(fetched["amount"], "10.00");
    assert_eq!(share_amounts(&fetched), vec!["3.34", "3.33", "3.33"]);
}

#[tokio::test]
async fn test_description_only_update_keeps_shares() {
    let app = app().await;
    let (group_id, users) = group_with_members(&app, &["Alice", "Bob"]).await;
    let (_, expense) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/expenses"),
        Some(json!({ "description": "Dinner", "amount": "20.00", "paid_by_user_id": users[0] })),
    )
    .await;
    let id = expense["id"].as_str().unwrap();
    let share_id = expense["shares"][1]["id"].as_str().unwrap();
    send(
        &app,
        Method::POST,
        &format!("/expenses/{id}/shares/{share_id}/settle"),
        None,
    )
    .await;

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/expenses/{id}"),
        Some(json!({ "description": "Lunch", "paid_by_user_id": null })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "Lunch");
    assert!(updated["paid_by_user_id"].is_null());
    assert_eq!(updated["shares"][1]["id"], share_id);
    assert_eq!(updated["shares"][1]["is_settled"], true);
}

#[tokio::test]
async fn test_settle_and_balances() {
    let app = app().await;
    let (group_id, users) = group_with_members(&app, &["Alice", "Bob", "Carol"]).await;
    let (_, expense) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/expenses"),
        Some(json!({ "description": "Dinner", "amount": "30.00", "paid_by_user_id": users[0] })),
    )
    .await;
    let id = expense["id"].as_str().unwrap();

    let (status, balances) = send(&app, Method::GET, &format!("/groups/{group_id}/balances"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balances["group_id"], group_id.as_str());
    let entries = balances["balances"].as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["user"]["name"], "Alice");
    assert_eq!(entries[0]["balance"], "20.00");
    assert_eq!(entries[1]["balance"], "-10.00");
    assert_eq!(entries[2]["balance"], "-10.00");

    let bob_share = expense["shares"][1]["id"].as_str().unwrap();
    let uri = format!("/expenses/{id}/shares/{bob_share}/settle");
    let (status, share) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(share["is_settled"], true);

    let (status, again) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["is_settled"], true);

    let (_, balances) = send(&app, Method::GET, &format!("/groups/{group_id}/balances"), None).await;
    let entries = balances["balances"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["balance"], "20.00");
    assert_eq!(entries[1]["user"]["name"], "Carol");
    assert_eq!(entries[1]["balance"], "-10.00");
}

#[tokio::test]
async fn test_settle_share_of_other_expense() {
    let app = app().await;
    let (group_id, _) = group_with_members(&app, &["Alice"]).await;
    let uri = format!("/groups/{group_id}/expenses");
    let (_, first) = send(&app, Method::POST, &uri, Some(json!({ "description": "A", "amount": "1.00" }))).await;
    let (_, second) = send(&app, Method::POST, &uri, Some(json!({ "description": "B", "amount": "2.00" }))).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!(
            "/expenses/{}/shares/{}/settle",
            first["id"].as_str().unwrap(),
            second["shares"][0]["id"].as_str().unwrap()
        ),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_expense() {
    let app = app().await;
    let (group_id, _) = group_with_members(&app, &["Alice"]).await;
    let (_, expense) = send(
        &app,
        Method::POST,
        &format!("/groups/{group_id}/expenses"),
        Some(json!({ "description": "Taxi", "amount": "9.99" })),
    )
    .await;
    let id = expense["id"].as_str().unwrap();

    let (status, _) = send(&app, Method::DELETE, &format!("/expenses/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &format!("/expenses/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
