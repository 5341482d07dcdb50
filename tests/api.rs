//! # Integration Tests for the HTTP API
//!
//! Drives the full router with in-memory `SQLite`: authentication and role
//! gates, order placement against stock, subsidy windows, the verification
//! workflow, the ledger and image upload.

#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use agrotrust::api::{self, state::AppState};
use agrotrust::auth::{Claims, TokenService};
use agrotrust::config::database::{create_connection, create_tables};
use agrotrust::core::user::{NewUser, create_user};
use agrotrust::entities::Role;

const SECRET: &str = "integration-test-secret-with-32-chars!";
const PASSWORD: &str = "harvest-2024";

struct TestApp {
    router: Router,
    db: Arc<sea_orm::DatabaseConnection>,
    _uploads: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let db = create_connection("sqlite::memory:").await.unwrap();
        create_tables(&db).await.unwrap();
        let uploads = tempfile::tempdir().unwrap();
        let state = AppState::new(
            db,
            TokenService::new(SECRET, 3600),
            uploads.path().to_path_buf(),
        );
        let db = Arc::clone(&state.db);
        Self {
            router: api::app(state),
            db,
            _uploads: uploads,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Registers a farmer or buyer and returns (token, user id).
    async fn register(&self, name: &str, role: &str) -> (String, i64) {
        let email = format!("{}@example.com", name.to_lowercase());
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({ "name": name, "email": email, "password": PASSWORD, "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap(),
        )
    }

    /// Creates a privileged account directly and logs in through the API.
    async fn privileged(&self, name: &str, role: Role) -> (String, i64) {
        let email = format!("{}@example.com", name.to_lowercase());
        create_user(
            &self.db,
            NewUser {
                name: name.to_string(),
                email: email.clone(),
                password: PASSWORD.to_string(),
                role,
                phone: None,
                location: None,
            },
        )
        .await
        .unwrap();
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap(),
        )
    }

    async fn list_crop(&self, token: &str, quantity: f64) -> i64 {
        let (status, body) = self
            .call(
                "POST",
                "/api/crops",
                Some(token),
                Some(json!({
                    "name": "Tomato",
                    "category": "Vegetable",
                    "pricePerUnit": 25.0,
                    "quantityAvailable": quantity,
                    "location": "Nashik"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

// -- Health & auth ------------------------------------------------------------

#[tokio::test]
async fn test_health_probe() {
    let app = TestApp::new().await;
    let (status, body) = app.call("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new().await;
    let (token, id) = app.register("Asha", "FARMER").await;

    let (status, me) = app.call("GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["id"], id);
    assert_eq!(me["role"], "FARMER");
    assert_eq!(me["verificationStatus"], "UNVERIFIED");
    assert!(me.get("passwordHash").is_none());

    let (status, _) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ASHA@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .call(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "asha@example.com", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "UNAUTHORIZED");
}

#[tokio::test]
async fn test_registration_rules() {
    let app = TestApp::new().await;
    app.register("Ravi", "BUYER").await;

    let duplicate = json!({
        "name": "Ravi Again", "email": "ravi@example.com", "password": PASSWORD, "role": "BUYER"
    });
    let (status, body) = app.call("POST", "/api/auth/register", None, Some(duplicate)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "CONFLICT");

    let admin = json!({
        "name": "Mallory", "email": "mallory@example.com", "password": PASSWORD, "role": "ADMIN"
    });
    let (status, _) = app.call("POST", "/api/auth/register", None, Some(admin)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method("POST")
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST");
}

#[tokio::test]
async fn test_token_and_role_gates() {
    let app = TestApp::new().await;
    let (buyer, buyer_id) = app.register("Ravi", "BUYER").await;

    let (status, _) = app.call("GET", "/api/orders/mine", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.call("GET", "/api/orders/mine", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = TokenService::new("another-secret-that-is-32-chars-long", 3600)
        .sign(&Claims {
            sub: buyer_id.to_string(),
            role: Role::Admin,
            iat: 0,
            exp: u64::MAX / 2,
        })
        .unwrap();
    let (status, _) = app.call("GET", "/api/admin/stats", Some(&forged), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let expired = TokenService::new(SECRET, 3600)
        .sign(&Claims {
            sub: buyer_id.to_string(),
            role: Role::Buyer,
            iat: 1_000,
            exp: 2_000,
        })
        .unwrap();
    let (status, body) = app.call("GET", "/api/auth/me", Some(&expired), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Token expired");

    let crop = json!({
        "name": "Rice", "category": "Grain", "pricePerUnit": 40.0,
        "quantityAvailable": 10.0, "location": "Karnal"
    });
    let (status, body) = app.call("POST", "/api/crops", Some(&buyer), Some(crop)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");

    let (status, _) = app.call("GET", "/api/admin/stats", Some(&buyer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// -- Orders ---------------------------------------------------------------------

#[tokio::test]
async fn test_order_more_than_available_is_rejected() {
    let app = TestApp::new().await;
    let (farmer, _) = app.register("Asha", "FARMER").await;
    let (buyer, _) = app.register("Ravi", "BUYER").await;
    let crop_id = app.list_crop(&farmer, 10.0).await;

    let (status, body) = app
        .call(
            "POST",
            "/api/orders",
            Some(&buyer),
            Some(json!({ "cropId": crop_id, "quantity": 11.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INSUFFICIENT_STOCK");

    let (_, crop) = app.call("GET", &format!("/api/crops/{crop_id}"), None, None).await;
    assert_eq!(crop["quantityAvailable"], 10.0);
    assert_eq!(crop["status"], "AVAILABLE");

    let (status, _) = app
        .call(
            "POST",
            "/api/orders",
            Some(&buyer),
            Some(json!({ "cropId": 999, "quantity": 1.0 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_exact_quantity_sells_out() {
    let app = TestApp::new().await;
    let (farmer, farmer_id) = app.register("Asha", "FARMER").await;
    let (buyer, _) = app.register("Ravi", "BUYER").await;
    let crop_id = app.list_crop(&farmer, 10.0).await;

    let (status, order) = app
        .call(
            "POST",
            "/api/orders",
            Some(&buyer),
            Some(json!({ "cropId": crop_id, "quantity": 10.0, "deliveryAddress": "Pune" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{order}");
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["totalPrice"], 250.0);
    assert_eq!(order["farmerId"], farmer_id);

    let (_, crop) = app.call("GET", &format!("/api/crops/{crop_id}"), None, None).await;
    assert_eq!(crop["quantityAvailable"], 0.0);
    assert_eq!(crop["status"], "SOLD_OUT");

    let (_, sales) = app.call("GET", "/api/orders/sales", Some(&farmer), None).await;
    assert_eq!(sales.as_array().unwrap().len(), 1);

    let (_, unread) = app
        .call("GET", "/api/notifications/unread-count", Some(&farmer), None)
        .await;
    assert_eq!(unread["unread"], 1);
}

#[tokio::test]
async fn test_order_lifecycle_and_cancel_restock() {
    let app = TestApp::new().await;
    let (farmer, _) = app.register("Asha", "FARMER").await;
    let (buyer, _) = app.register("Ravi", "BUYER").await;
    let crop_id = app.list_crop(&farmer, 6.0).await;

    let (_, order) = app
        .call(
            "POST",
            "/api/orders",
            Some(&buyer),
            Some(json!({ "cropId": crop_id, "quantity": 4.0 })),
        )
        .await;
    let status_uri = format!("/api/orders/{}/status", order["id"]);

    let (status, body) = app
        .call("PATCH", &status_uri, Some(&farmer), Some(json!({ "status": "DELIVERED" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "CONFLICT");

    let (status, _) = app
        .call("PATCH", &status_uri, Some(&buyer), Some(json!({ "status": "CONFIRMED" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call("PATCH", &status_uri, Some(&farmer), Some(json!({ "status": "CONFIRMED" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CONFIRMED");

    let (status, body) = app
        .call("PATCH", &status_uri, Some(&buyer), Some(json!({ "status": "CANCELLED" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "CANCELLED");

    let (_, crop) = app.call("GET", &format!("/api/crops/{crop_id}"), None, None).await;
    assert_eq!(crop["quantityAvailable"], 6.0);
}

// -- Subsidies ------------------------------------------------------------------

#[tokio::test]
async fn test_subsidy_inactive_and_deadline() {
    let app = TestApp::new().await;
    let (official, _) = app.privileged("Officer", Role::GovOfficial).await;
    let (farmer, _) = app.register("Asha", "FARMER").await;

    let create = |deadline: Option<String>| {
        json!({
            "title": "Seed grant",
            "description": "Certified seed at half price",
            "amount": 5000.0,
            "deadline": deadline
        })
    };

    let (status, open) = app
        .call("POST", "/api/subsidies", Some(&official), Some(create(None)))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{open}");
    let apply_uri = format!("/api/subsidies/{}/apply", open["id"]);

    let (status, application) = app
        .call("POST", &apply_uri, Some(&farmer), Some(json!({ "note": "3 acres" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application["status"], "PENDING");

    let (status, _) = app.call("POST", &apply_uri, Some(&farmer), Some(json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call("DELETE", &format!("/api/subsidies/{}", open["id"]), Some(&official), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.call("POST", &apply_uri, Some(&farmer), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "SUBSIDY_UNAVAILABLE");

    let past = (chrono::Utc::now() - chrono::Duration::days(2)).to_rfc3339();
    let (_, closed) = app
        .call("POST", "/api/subsidies", Some(&official), Some(create(Some(past))))
        .await;
    let (status, body) = app
        .call(
            "POST",
            &format!("/api/subsidies/{}/apply", closed["id"]),
            Some(&farmer),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "SUBSIDY_UNAVAILABLE");

    let (_, visible) = app.call("GET", "/api/subsidies", Some(&farmer), None).await;
    assert_eq!(visible.as_array().unwrap().len(), 1);

    let (status, reviewed) = app
        .call(
            "PATCH",
            &format!("/api/subsidies/applications/{}/review", application["id"]),
            Some(&official),
            Some(json!({ "status": "APPROVED", "reply": "Collect at the block office" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["status"], "APPROVED");
}

// -- Verification ---------------------------------------------------------------

#[tokio::test]
async fn test_verification_workflow() {
    let app = TestApp::new().await;
    let (admin, _) = app.privileged("Admin", Role::Admin).await;
    let (farmer, _) = app.register("Asha", "FARMER").await;
    let documents = json!({ "documentType": "AADHAAR", "documentNumber": "1234-5678-9012" });

    let (status, request) = app
        .call("POST", "/api/verifications", Some(&farmer), Some(documents.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .call("POST", "/api/verifications", Some(&farmer), Some(documents))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "CONFLICT");

    let (_, pending) = app.call("GET", "/api/verifications", Some(&admin), None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (status, reviewed) = app
        .call(
            "PATCH",
            &format!("/api/verifications/{}/review", request["id"]),
            Some(&admin),
            Some(json!({ "status": "APPROVED" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviewed["status"], "APPROVED");

    let (_, me) = app.call("GET", "/api/auth/me", Some(&farmer), None).await;
    assert_eq!(me["isVerified"], true);
    assert_eq!(me["verificationStatus"], "VERIFIED");

    let (_, notes) = app.call("GET", "/api/notifications", Some(&farmer), None).await;
    let notes = notes.as_array().unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["kind"], "VERIFICATION");

    let (_, ledger) = app.call("GET", "/api/ledger/verify", Some(&admin), None).await;
    assert_eq!(ledger["valid"], true);
    assert_eq!(ledger["entries"], 1);
}

// -- Uploads --------------------------------------------------------------------

fn multipart_request(uri: &str, token: &str, file_name: &str, content_type: &str) -> Request<Body> {
    let boundary = "agrotrust-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\n\
         Content-Type: {content_type}\r\n\r\nnot-really-pixels\r\n--{boundary}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_crop_image_upload() {
    let app = TestApp::new().await;
    let (farmer, _) = app.register("Asha", "FARMER").await;
    let (other, _) = app.register("Bala", "FARMER").await;
    let crop_id = app.list_crop(&farmer, 3.0).await;
    let uri = format!("/api/crops/{crop_id}/image");

    let (status, _) = app
        .send(multipart_request(&uri, &farmer, "invoice.pdf", "application/pdf"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(multipart_request(&uri, &other, "tomato.png", "image/png"))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, crop) = app
        .send(multipart_request(&uri, &farmer, "tomato.png", "image/png"))
        .await;
    assert_eq!(status, StatusCode::OK, "{crop}");
    let image_url = crop["imageUrl"].as_str().unwrap();
    assert!(image_url.starts_with("/uploads/crop-"));
    assert!(image_url.ends_with(".png"));

    let (status, _) = app.call("GET", image_url, None, None).await;
    assert_eq!(status, StatusCode::OK);
}
