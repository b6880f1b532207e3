//! Checkout session endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use checkout::{ClickOutcome, TransactionInfo};
use keygate_core::{Address, CheckoutError, LockAddress, PurchaseError};
use uuid::Uuid;

use super::{route_error, RouteError};
use crate::dto::{
    ApiError, CheckoutResponse, CreateCheckoutRequest, ReportTransactionRequest, ResetResponse,
};
use crate::{AppState, CheckoutEntry};

/// Create checkout routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_checkout))
        .route("/sessions/:id", delete(close_checkout))
        .route("/sessions/:id/locks", get(get_locks))
        .route("/sessions/:id/locks/:address/click", post(click_lock))
        .route(
            "/sessions/:id/locks/:address/transaction",
            post(report_transaction),
        )
        .route("/sessions/:id/transactions", get(get_transactions))
        .route("/sessions/:id/reset", post(reset_checkout))
}

fn checkout_error(err: CheckoutError) -> RouteError {
    route_error(err.status_code(), err.error_code(), err)
}

fn parse_lock(address: &str) -> Result<LockAddress, RouteError> {
    Address::parse(address).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiError::bad_request(e.to_string())),
        )
    })
}

async fn checkout_response(id: Uuid, entry: &CheckoutEntry) -> CheckoutResponse {
    let snapshot = entry.session.store().snapshot().await;
    CheckoutResponse {
        checkout_id: id,
        session_id: snapshot.session_id,
        purchasing_lock_address: snapshot.purchasing_lock_address,
        locks: entry.session.rows().await,
    }
}

async fn load(state: &AppState, id: Uuid) -> Result<Arc<CheckoutEntry>, RouteError> {
    state.checkout(id).await.map_err(checkout_error)
}

/// POST /checkout/sessions - Open a checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    Json(request): Json<CreateCheckoutRequest>,
) -> Result<(StatusCode, Json<CheckoutResponse>), RouteError> {
    let (id, entry) = state
        .open_checkout(request.locks, request.account)
        .await
        .map_err(checkout_error)?;
    Ok((StatusCode::CREATED, Json(checkout_response(id, &entry).await)))
}

/// DELETE /checkout/sessions/:id - Close a checkout
pub async fn close_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, RouteError> {
    state.close_checkout(id).await.map_err(checkout_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /checkout/sessions/:id/locks - Current row of every lock
pub async fn get_locks(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckoutResponse>, RouteError> {
    let entry = load(&state, id).await?;
    Ok(Json(checkout_response(id, &entry).await))
}

/// POST /checkout/sessions/:id/locks/:address/click - Click a lock row
pub async fn click_lock(
    State(state): State<AppState>,
    Path((id, address)): Path<(Uuid, String)>,
) -> Result<Json<ClickOutcome>, RouteError> {
    let lock = parse_lock(&address)?;
    let entry = load(&state, id).await?;
    let outcome = entry.session.click(&lock).await.map_err(checkout_error)?;
    Ok(Json(outcome))
}

/// POST /checkout/sessions/:id/locks/:address/transaction - Wallet result
/// for the pending purchase of a lock
pub async fn report_transaction(
    State(state): State<AppState>,
    Path((id, address)): Path<(Uuid, String)>,
    Json(request): Json<ReportTransactionRequest>,
) -> Result<StatusCode, RouteError> {
    let lock = parse_lock(&address)?;
    let entry = load(&state, id).await?;

    let result = match (request.hash, request.error) {
        (Some(hash), _) if !hash.is_empty() => Ok(hash),
        (_, Some(reason)) => Err(PurchaseError::Rejected { reason }),
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiError::bad_request("either hash or error is required")),
            ))
        }
    };

    entry
        .bridge
        .report(&lock, result)
        .await
        .map_err(checkout_error)?;
    Ok(StatusCode::ACCEPTED)
}

/// GET /checkout/sessions/:id/transactions - Transaction info emitted so far
pub async fn get_transactions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TransactionInfo>>, RouteError> {
    let entry = load(&state, id).await?;
    Ok(Json(entry.session.transactions()))
}

/// POST /checkout/sessions/:id/reset - Start a new checkout session
pub async fn reset_checkout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResetResponse>, RouteError> {
    let entry = load(&state, id).await?;
    let session_id = entry.session.reset().await;
    Ok(Json(ResetResponse { session_id }))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::create_router;
    use crate::AppState;

    const LOCK_A: &str = "0x1111111111111111111111111111111111111111";
    const LOCK_B: &str = "0x2222222222222222222222222222222222222222";
    const ACCOUNT: &str = "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";

    async fn call(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (u16, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(body) => Body::from(body.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn checkout_body(balance: &str) -> Value {
        json!({
            "locks": [
                { "address": LOCK_A, "name": "General", "expirationDuration": 86400, "keyPrice": "1", "maxNumberOfKeys": 10 },
                { "address": LOCK_B, "name": "VIP", "expirationDuration": 86400, "keyPrice": "10", "unlimitedKeys": true }
            ],
            "account": { "account": ACCOUNT, "balances": { "eth": balance } }
        })
    }

    async fn open(app: &axum::Router, balance: &str) -> String {
        let (status, body) = call(app, Method::POST, "/checkout/sessions", Some(checkout_body(balance))).await;
        assert_eq!(status, 201);
        body["checkoutId"].as_str().unwrap().to_string()
    }

    fn variants(body: &Value) -> Vec<String> {
        body["locks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["variant"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_open_checkout_rows() {
        let app = create_router(AppState::new());
        let (status, body) =
            call(&app, Method::POST, "/checkout/sessions", Some(checkout_body("5"))).await;
        assert_eq!(status, 201);
        assert_eq!(variants(&body), vec!["purchaseable", "insufficient_balance"]);
        assert_eq!(body["locks"][0]["formattedKeyPrice"], "1 ETH");
        assert_eq!(body["locks"][0]["formattedDuration"], "1 day");
        assert_eq!(body["locks"][1]["formattedKeysAvailable"], "Unlimited");
        assert!(body["purchasingLockAddress"].is_null());
    }

    #[tokio::test]
    async fn test_empty_checkout_rejected() {
        let app = create_router(AppState::new());
        let body = json!({ "locks": [], "account": { "account": ACCOUNT } });
        let (status, body) = call(&app, Method::POST, "/checkout/sessions", Some(body)).await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "no_locks");
    }

    #[tokio::test]
    async fn test_purchase_through_wallet_report() {
        let app = create_router(AppState::new());
        let id = open(&app, "50").await;

        let click_a = format!("/checkout/sessions/{}/locks/{}/click", id, LOCK_A);
        let (status, body) = call(&app, Method::POST, &click_a, None).await;
        assert_eq!(status, 200);
        assert_eq!(body["outcome"], "started");

        let click_b = format!("/checkout/sessions/{}/locks/{}/click", id, LOCK_B);
        let (_, body) = call(&app, Method::POST, &click_b, None).await;
        assert_eq!(body["outcome"], "ignored");
        assert_eq!(body["purchasing"], LOCK_A);

        let locks = format!("/checkout/sessions/{}/locks", id);
        let (_, body) = call(&app, Method::GET, &locks, None).await;
        assert_eq!(variants(&body), vec!["processing", "disabled"]);

        // The wallet submits; retry until the purchase is waiting on the bridge
        let report = format!("/checkout/sessions/{}/locks/{}/transaction", id, LOCK_A);
        let mut accepted = false;
        for _ in 0..100 {
            let (status, _) = call(&app, Method::POST, &report, Some(json!({ "hash": "0xabc" }))).await;
            if status == 202 {
                accepted = true;
                break;
            }
            assert_eq!(status, 409);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert!(accepted);

        let transactions = format!("/checkout/sessions/{}/transactions", id);
        let mut body = Value::Null;
        for _ in 0..100 {
            body = call(&app, Method::GET, &transactions, None).await.1;
            if body.as_array().is_some_and(|a| !a.is_empty()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(body, json!([{ "lock": LOCK_A, "hash": "0xabc" }]));

        let (_, body) = call(&app, Method::GET, &locks, None).await;
        assert_eq!(variants(&body), vec!["confirmed", "disabled"]);
        assert_eq!(body["locks"][0]["transactionHash"], "0xabc");
    }

    #[tokio::test]
    async fn test_report_requires_hash_or_error() {
        let app = create_router(AppState::new());
        let id = open(&app, "50").await;
        let report = format!("/checkout/sessions/{}/locks/{}/transaction", id, LOCK_A);
        let (status, body) = call(&app, Method::POST, &report, Some(json!({}))).await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], "bad_request");
    }

    #[tokio::test]
    async fn test_unknown_session_and_bad_address() {
        let app = create_router(AppState::new());
        let missing = format!(
            "/checkout/sessions/{}/locks",
            "00000000-0000-0000-0000-000000000000"
        );
        let (status, body) = call(&app, Method::GET, &missing, None).await;
        assert_eq!(status, 404);
        assert_eq!(body["code"], "session_not_found");

        let id = open(&app, "1").await;
        let bad = format!("/checkout/sessions/{}/locks/not-an-address/click", id);
        let (status, _) = call(&app, Method::POST, &bad, None).await;
        assert_eq!(status, 400);

        let unknown = format!(
            "/checkout/sessions/{}/locks/0x3333333333333333333333333333333333333333/click",
            id
        );
        let (status, body) = call(&app, Method::POST, &unknown, None).await;
        assert_eq!(status, 404);
        assert_eq!(body["code"], "unknown_lock");
    }

    #[tokio::test]
    async fn test_reset_reopens_rows() {
        let app = create_router(AppState::new());
        let id = open(&app, "50").await;
        let click = format!("/checkout/sessions/{}/locks/{}/click", id, LOCK_A);
        call(&app, Method::POST, &click, None).await;

        let reset = format!("/checkout/sessions/{}/reset", id);
        let (status, body) = call(&app, Method::POST, &reset, None).await;
        assert_eq!(status, 200);
        assert!(body["sessionId"].is_string());

        let locks = format!("/checkout/sessions/{}/locks", id);
        let (_, body) = call(&app, Method::GET, &locks, None).await;
        assert_eq!(variants(&body), vec!["purchaseable", "purchaseable"]);
    }

    async fn wait_pending_report(app: &axum::Router, uri: &str, hash: &str) -> u16 {
        let mut status = 0;
        for _ in 0..100 {
            status = call(app, Method::POST, uri, Some(json!({ "hash": hash }))).await.0;
            if status != 409 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        status
    }

    #[tokio::test]
    async fn test_reset_discards_late_wallet_report() {
        let app = create_router(AppState::new());
        let id = open(&app, "50").await;
        let click_a = format!("/checkout/sessions/{}/locks/{}/click", id, LOCK_A);
        call(&app, Method::POST, &click_a, None).await;

        // Let the purchase reach the bridge before resetting
        tokio::time::sleep(Duration::from_millis(20)).await;
        let reset = format!("/checkout/sessions/{}/reset", id);
        call(&app, Method::POST, &reset, None).await;

        let report_a = format!("/checkout/sessions/{}/locks/{}/transaction", id, LOCK_A);
        let (status, body) = call(&app, Method::POST, &report_a, Some(json!({ "hash": "0xold" }))).await;
        assert_eq!(status, 409);
        assert_eq!(body["code"], "no_pending_purchase");

        let click_b = format!("/checkout/sessions/{}/locks/{}/click", id, LOCK_B);
        let (_, body) = call(&app, Method::POST, &click_b, None).await;
        assert_eq!(body["outcome"], "started");
        let report_b = format!("/checkout/sessions/{}/locks/{}/transaction", id, LOCK_B);
        assert_eq!(wait_pending_report(&app, &report_b, "0xnew").await, 202);

        let transactions = format!("/checkout/sessions/{}/transactions", id);
        let mut body = Value::Null;
        for _ in 0..100 {
            body = call(&app, Method::GET, &transactions, None).await.1;
            if body.as_array().is_some_and(|a| !a.is_empty()) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(body, json!([{ "lock": LOCK_B, "hash": "0xnew" }]));
    }

    #[tokio::test]
    async fn test_close_checkout_removes_session() {
        let state = AppState::new();
        let app = create_router(state.clone());
        let id = open(&app, "1").await;
        assert_eq!(state.open_checkouts().await, 1);

        let session = format!("/checkout/sessions/{}", id);
        let (status, _) = call(&app, Method::DELETE, &session, None).await;
        assert_eq!(status, 204);
        assert_eq!(state.open_checkouts().await, 0);

        let locks = format!("/checkout/sessions/{}/locks", id);
        let (status, _) = call(&app, Method::GET, &locks, None).await;
        assert_eq!(status, 404);

        let (status, body) = call(&app, Method::DELETE, &session, None).await;
        assert_eq!(status, 404);
        assert_eq!(body["code"], "session_not_found");
    }
}
