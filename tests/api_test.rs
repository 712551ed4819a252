//! Router-level tests.
//!
//! The full router runs over hand-written fake services, so these tests
//! exercise routing, authentication layers, extractors and error mapping
//! without a database or Redis.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use villa_market::api::{create_router, AppState};
use villa_market::domain::{
    Actor, AdminAction, Booking, BookingAction, BookingChanges, BookingStatus, Message,
    MessageThread, NewVilla, Notification, PlatformStats, PriceBreakdown, ProfileUpdate,
    PublicProfile, Review, StayDates, ThreadSummary, User, UserRole, Villa, VillaChanges,
    VillaDetail, VillaSearch, VillaStatus,
};
use villa_market::errors::{AppError, AppResult};
use villa_market::services::{
    AdminService, AuthService, BookingRequest, BookingService, Claims, MessageService,
    NotificationService, ReviewService, ServiceContainer, TokenResponse, UserService,
    VillaService,
};
use villa_market::types::{Page, PaginationParams};

const GUEST_TOKEN: &str = "guest-token";
const HOST_TOKEN: &str = "host-token";
const ADMIN_TOKEN: &str = "admin-token";
/// Signed while its holder was an admin; the account is a guest now.
const DEMOTED_TOKEN: &str = "demoted-token";
/// Names an account that has since been deleted.
const DELETED_TOKEN: &str = "deleted-token";

const GUEST_ID: Uuid = Uuid::from_u128(1);
const HOST_ID: Uuid = Uuid::from_u128(2);
const ADMIN_ID: Uuid = Uuid::from_u128(3);
const DELETED_ID: Uuid = Uuid::from_u128(4);

const TAKEN_EMAIL: &str = "taken@villa.test";
const GOOD_PASSWORD: &str = "correct-password";
const VILLA_CAPACITY: i32 = 4;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The only stay already held on the fake calendar.
fn held_stay() -> StayDates {
    StayDates::new(date(2026, 7, 10), date(2026, 7, 15)).unwrap()
}

fn user(email: &str, role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: "$argon2id$fake".to_string(),
        name: "Test User".to_string(),
        role,
        phone: None,
        bio: None,
        avatar_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

// =============================================================================
// Fake services
// =============================================================================

/// One fake backing every service trait.
struct FakeMarket;

#[async_trait]
impl AuthService for FakeMarket {
    async fn register(
        &self,
        email: String,
        _password: String,
        _name: String,
        role: UserRole,
    ) -> AppResult<User> {
        if email == TAKEN_EMAIL {
            return Err(AppError::conflict("Email already registered"));
        }
        if role == UserRole::Admin {
            return Err(AppError::validation("Cannot self-register as admin"));
        }
        Ok(user(&email, role))
    }

    async fn login(&self, _email: String, password: String) -> AppResult<TokenResponse> {
        if password != GOOD_PASSWORD {
            return Err(AppError::InvalidCredentials);
        }
        Ok(TokenResponse {
            access_token: GUEST_TOKEN.to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let (sub, role) = match token {
            GUEST_TOKEN => (GUEST_ID, "guest"),
            HOST_TOKEN => (HOST_ID, "host"),
            ADMIN_TOKEN => (ADMIN_ID, "admin"),
            DEMOTED_TOKEN => (GUEST_ID, "admin"),
            DELETED_TOKEN => (DELETED_ID, "host"),
            _ => return Err(AppError::Unauthorized),
        };
        Ok(Claims {
            sub,
            email: format!("{}@villa.test", role),
            role: role.to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }

    async fn change_password(
        &self,
        _user_id: Uuid,
        current_password: String,
        _new_password: String,
    ) -> AppResult<()> {
        if current_password == GOOD_PASSWORD {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }
}

#[async_trait]
impl UserService for FakeMarket {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        let role = match id {
            GUEST_ID => UserRole::Guest,
            HOST_ID => UserRole::Host,
            ADMIN_ID => UserRole::Admin,
            _ => return Err(AppError::NotFound),
        };
        let mut u = user(&format!("{}@villa.test", role), role);
        u.id = id;
        Ok(u)
    }

    async fn update_profile(&self, _id: Uuid, _update: ProfileUpdate) -> AppResult<User> {
        Err(AppError::NotFound)
    }

    async fn public_profile(&self, _id: Uuid) -> AppResult<PublicProfile> {
        Err(AppError::NotFound)
    }
}

#[async_trait]
impl VillaService for FakeMarket {
    async fn create(&self, actor: Actor, _villa: NewVilla) -> AppResult<VillaDetail> {
        if !actor.role.can_list_villas() {
            return Err(AppError::Forbidden);
        }
        Err(AppError::internal("not used"))
    }

    async fn get(&self, _id: Uuid, _viewer: Option<Actor>) -> AppResult<VillaDetail> {
        Err(AppError::NotFound)
    }

    async fn update(&self, _actor: Actor, _id: Uuid, _changes: VillaChanges) -> AppResult<VillaDetail> {
        Err(AppError::NotFound)
    }

    async fn delete(&self, _actor: Actor, _id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }

    async fn search(&self, _filter: VillaSearch, _params: PaginationParams) -> AppResult<Page<Villa>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn list_own(&self, _actor: Actor, _params: PaginationParams) -> AppResult<Page<Villa>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn availability(&self, _id: Uuid, _from: NaiveDate, _to: NaiveDate) -> AppResult<Vec<StayDates>> {
        Ok(vec![held_stay()])
    }

    async fn quote(&self, _id: Uuid, _dates: StayDates, _guests: i32) -> AppResult<PriceBreakdown> {
        Err(AppError::NotFound)
    }
}

#[async_trait]
impl BookingService for FakeMarket {
    async fn create(&self, actor: Actor, request: BookingRequest) -> AppResult<Booking> {
        if request.guests > VILLA_CAPACITY {
            return Err(AppError::validation(format!(
                "This villa sleeps at most {} guests",
                VILLA_CAPACITY
            )));
        }
        if request.dates.overlaps(&held_stay()) {
            return Err(AppError::conflict("Villa is already booked for these dates"));
        }

        let nights = request.dates.nights();
        Ok(Booking {
            id: Uuid::new_v4(),
            villa_id: request.villa_id,
            guest_id: actor.id,
            dates: request.dates,
            guests: request.guests,
            notes: request.notes,
            status: BookingStatus::Pending,
            price: PriceBreakdown {
                nightly_rate_cents: 10_000,
                nights,
                subtotal_cents: 10_000 * nights,
                cleaning_fee_cents: 0,
                service_fee_cents: 0,
                total_cents: 10_000 * nights,
            },
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    async fn get(&self, _actor: Actor, _id: Uuid) -> AppResult<Booking> {
        Err(AppError::NotFound)
    }

    async fn list_mine(
        &self,
        _actor: Actor,
        _status: Option<BookingStatus>,
        _params: PaginationParams,
    ) -> AppResult<Page<Booking>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn list_for_host(
        &self,
        actor: Actor,
        _status: Option<BookingStatus>,
        _params: PaginationParams,
    ) -> AppResult<Page<Booking>> {
        if !actor.role.can_list_villas() {
            return Err(AppError::Forbidden);
        }
        Ok(Page::new(Vec::new(), 0))
    }

    async fn update(&self, _actor: Actor, _id: Uuid, _changes: BookingChanges) -> AppResult<Booking> {
        Err(AppError::NotFound)
    }

    async fn change_status(&self, _actor: Actor, _id: Uuid, _action: BookingAction) -> AppResult<Booking> {
        Err(AppError::NotFound)
    }
}

#[async_trait]
impl MessageService for FakeMarket {
    async fn open_thread(&self, _actor: Actor, _booking_id: Uuid) -> AppResult<MessageThread> {
        Err(AppError::NotFound)
    }

    async fn list_threads(&self, _actor: Actor, _params: PaginationParams) -> AppResult<Page<ThreadSummary>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn list_messages(
        &self,
        _actor: Actor,
        _thread_id: Uuid,
        _params: PaginationParams,
    ) -> AppResult<Page<Message>> {
        Err(AppError::NotFound)
    }

    async fn send(&self, _actor: Actor, _thread_id: Uuid, _content: String) -> AppResult<Message> {
        Err(AppError::NotFound)
    }

    async fn mark_read(&self, _actor: Actor, _thread_id: Uuid) -> AppResult<u64> {
        Err(AppError::NotFound)
    }
}

#[async_trait]
impl ReviewService for FakeMarket {
    async fn create(
        &self,
        _actor: Actor,
        _booking_id: Uuid,
        _rating: i32,
        _comment: String,
    ) -> AppResult<Review> {
        Err(AppError::validation("You can review a stay only after it ends"))
    }

    async fn list_for_villa(&self, _villa_id: Uuid, _params: PaginationParams) -> AppResult<Page<Review>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn flag(&self, _actor: Actor, _id: Uuid, _reason: String) -> AppResult<Review> {
        Err(AppError::NotFound)
    }

    async fn reply(&self, _actor: Actor, _id: Uuid, _reply: String) -> AppResult<Review> {
        Err(AppError::NotFound)
    }
}

#[async_trait]
impl NotificationService for FakeMarket {
    async fn list(
        &self,
        _actor: Actor,
        _unread_only: bool,
        _params: PaginationParams,
    ) -> AppResult<Page<Notification>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn unread_count(&self, _actor: Actor) -> AppResult<u64> {
        Ok(3)
    }

    async fn mark_read(&self, _actor: Actor, _id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }

    async fn mark_all_read(&self, _actor: Actor) -> AppResult<u64> {
        Ok(3)
    }

    async fn delete(&self, _actor: Actor, _id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }
}

#[async_trait]
impl AdminService for FakeMarket {
    async fn list_users(
        &self,
        _role: Option<UserRole>,
        _search: Option<String>,
        _params: PaginationParams,
    ) -> AppResult<Page<User>> {
        Ok(Page::new(vec![user("guest@villa.test", UserRole::Guest)], 1))
    }

    async fn change_role(&self, _admin: Actor, _user_id: Uuid, _role: UserRole) -> AppResult<User> {
        Err(AppError::NotFound)
    }

    async fn delete_user(&self, _admin: Actor, _user_id: Uuid) -> AppResult<()> {
        Err(AppError::NotFound)
    }

    async fn list_villas(&self, _status: Option<VillaStatus>, _params: PaginationParams) -> AppResult<Page<Villa>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn set_villa_status(&self, _admin: Actor, _villa_id: Uuid, _status: VillaStatus) -> AppResult<Villa> {
        Err(AppError::NotFound)
    }

    async fn list_bookings(
        &self,
        _status: Option<BookingStatus>,
        _params: PaginationParams,
    ) -> AppResult<Page<Booking>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn list_reviews(&self, _flagged_only: bool, _params: PaginationParams) -> AppResult<Page<Review>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn set_review_visibility(&self, _admin: Actor, _review_id: Uuid, _is_visible: bool) -> AppResult<Review> {
        Err(AppError::NotFound)
    }

    async fn list_actions(&self, _params: PaginationParams) -> AppResult<Page<AdminAction>> {
        Ok(Page::new(Vec::new(), 0))
    }

    async fn stats(&self) -> AppResult<PlatformStats> {
        Ok(PlatformStats {
            users: 12,
            hosts: 3,
            active_villas: 5,
            pending_bookings: 2,
            confirmed_bookings: 4,
            completed_bookings: 9,
            flagged_reviews: 1,
        })
    }
}

struct FakeContainer(Arc<FakeMarket>);

impl ServiceContainer for FakeContainer {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.0.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.0.clone()
    }

    fn villas(&self) -> Arc<dyn VillaService> {
        self.0.clone()
    }

    fn bookings(&self) -> Arc<dyn BookingService> {
        self.0.clone()
    }

    fn messages(&self) -> Arc<dyn MessageService> {
        self.0.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewService> {
        self.0.clone()
    }

    fn notifications(&self) -> Arc<dyn NotificationService> {
        self.0.clone()
    }

    fn admin(&self) -> Arc<dyn AdminService> {
        self.0.clone()
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn app() -> Router {
    create_router(AppState::new(Arc::new(FakeContainer(Arc::new(FakeMarket)))))
}

async fn send(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn booking_body(check_in: &str, check_out: &str, guests: i32) -> Value {
    json!({
        "villa_id": Uuid::new_v4(),
        "check_in": check_in,
        "check_out": check_out,
        "guests": guests,
    })
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn register_returns_created_user_without_password() {
    let (status, body) = send(
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": "new@villa.test",
            "password": "long-enough-password",
            "name": "New Guest"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "new@villa.test");
    assert_eq!(body["role"], "guest");
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn register_duplicate_email_is_conflict() {
    let (status, body) = send(
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "email": TAKEN_EMAIL,
            "password": "long-enough-password",
            "name": "Someone"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn register_rejects_malformed_payload() {
    let (status, body) = send(
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": "not-an-email", "password": "short", "name": "X" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let (status, body) = send(
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "guest@villa.test", "password": "wrong-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn login_returns_bearer_token() {
    let (status, body) = send(
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": "guest@villa.test", "password": GOOD_PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert!(body["access_token"].is_string());
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let (status, body) = send(Method::GET, "/bookings", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn protected_route_with_unknown_token_is_unauthorized() {
    let (status, _) = send(Method::GET, "/users/me", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_of_deleted_account_is_unauthorized() {
    let (status, body) = send(Method::GET, "/users/me", Some(DELETED_TOKEN), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = send(Method::GET, "/villas", Some(DELETED_TOKEN), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn current_user_comes_from_the_stored_account() {
    let (status, body) = send(Method::GET, "/users/me", Some(HOST_TOKEN), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], HOST_ID.to_string());
    assert_eq!(body["role"], "host");
}

// =============================================================================
// Villas
// =============================================================================

#[tokio::test]
async fn villa_search_is_public() {
    let (status, body) = send(Method::GET, "/villas?location=bali&page=1", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["total"], 0);
}

#[tokio::test]
async fn villa_search_rejects_half_date_range() {
    let (status, _) = send(Method::GET, "/villas?check_in=2026-07-01", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_villa_id_gets_json_error_body() {
    let (status, body) = send(Method::GET, "/villas/not-a-uuid", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn unparsable_search_filter_gets_json_error_body() {
    let (status, body) = send(Method::GET, "/villas?min_price=abc", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("min_price"));
}

#[tokio::test]
async fn malformed_booking_id_gets_json_error_body() {
    let (status, body) = send(Method::GET, "/bookings/123", Some(GUEST_TOKEN), None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn villa_search_with_invalid_token_is_unauthorized() {
    let (status, _) = send(Method::GET, "/villas", Some("forged"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guests_cannot_list_host_bookings() {
    let (status, _) = send(Method::GET, "/host/bookings", Some(GUEST_TOKEN), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(Method::GET, "/host/bookings", Some(HOST_TOKEN), None).await;
    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Bookings
// =============================================================================

#[tokio::test]
async fn booking_free_dates_is_created_pending() {
    let (status, body) = send(
        Method::POST,
        "/bookings",
        Some(GUEST_TOKEN),
        Some(booking_body("2026-07-15", "2026-07-18", 2)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["check_in"], "2026-07-15");
    assert_eq!(body["price"]["nights"], 3);
}

#[tokio::test]
async fn booking_overlapping_dates_is_conflict() {
    let (status, body) = send(
        Method::POST,
        "/bookings",
        Some(GUEST_TOKEN),
        Some(booking_body("2026-07-12", "2026-07-20", 2)),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn booking_over_capacity_is_bad_request() {
    let (status, body) = send(
        Method::POST,
        "/bookings",
        Some(GUEST_TOKEN),
        Some(booking_body("2026-08-01", "2026-08-05", VILLA_CAPACITY + 1)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn booking_with_reversed_dates_is_bad_request() {
    let (status, _) = send(
        Method::POST,
        "/bookings",
        Some(GUEST_TOKEN),
        Some(booking_body("2026-08-05", "2026-08-01", 2)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Reviews and notifications
// =============================================================================

#[tokio::test]
async fn review_before_stay_completes_is_bad_request() {
    let (status, body) = send(
        Method::POST,
        "/reviews",
        Some(GUEST_TOKEN),
        Some(json!({
            "booking_id": Uuid::new_v4(),
            "rating": 5,
            "comment": "Lovely pool"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn review_rating_out_of_range_is_rejected_before_service() {
    let (status, body) = send(
        Method::POST,
        "/reviews",
        Some(GUEST_TOKEN),
        Some(json!({
            "booking_id": Uuid::new_v4(),
            "rating": 6,
            "comment": "Too good"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Rating"));
}

#[tokio::test]
async fn unread_notification_count() {
    let (status, body) = send(
        Method::GET,
        "/notifications/unread-count",
        Some(GUEST_TOKEN),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);
}

// =============================================================================
// Administration
// =============================================================================

#[tokio::test]
async fn admin_routes_reject_non_admins() {
    let (status, body) = send(Method::GET, "/admin/stats", Some(HOST_TOKEN), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn demoted_admin_token_loses_admin_access() {
    let (status, body) = send(Method::GET, "/admin/stats", Some(DEMOTED_TOKEN), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn admin_routes_require_a_token() {
    let (status, _) = send(Method::GET, "/admin/users", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_stats_for_admin() {
    let (status, body) = send(Method::GET, "/admin/stats", Some(ADMIN_TOKEN), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], 12);
    assert_eq!(body["flagged_reviews"], 1);
}

#[tokio::test]
async fn admin_user_listing_hides_password_hashes() {
    let (status, body) = send(Method::GET, "/admin/users", Some(ADMIN_TOKEN), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 1);
    assert!(body["data"][0].get("password_hash").is_none());
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_reports_unconfigured_services_as_disabled() {
    let (status, body) = send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "disabled");
    assert_eq!(body["services"]["redis"]["status"], "disabled");
}
