use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    response::Html,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::Scalar;

use crate::{
    handlers,
    middleware::{metrics_middleware, request_id_middleware},
    openapi::ApiDoc,
};

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(true);

    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(error = %e, origin, "CORS_ORIGIN is not a valid header value, cross-origin requests will be refused");
            cors
        }
    }
}

pub fn build_router(state: Arc<crate::AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    // Customer-facing booking flow plus the owner's per-shop views
    let shop_routes = Router::new()
        .route(
            "/{shop_id}/services/{service_id}/slots",
            get(handlers::availability_handler::get_slots),
        )
        .route(
            "/{shop_id}/services/{service_id}/selection/tap",
            post(handlers::availability_handler::tap_selection),
        )
        .route(
            "/{shop_id}/services/{service_id}/selection/validate",
            post(handlers::availability_handler::validate_selection),
        )
        .route(
            "/{shop_id}/services/{service_id}/bookings",
            post(handlers::bookings_handler::create_booking),
        )
        .route("/{shop_id}/calendar", get(handlers::availability_handler::get_calendar))
        .route("/{shop_id}/range-check", get(handlers::availability_handler::check_range))
        .route("/{shop_id}/bookings", get(handlers::owner_handler::get_shop_bookings))
        .route("/{shop_id}/bookings/today", get(handlers::owner_handler::get_todays_bookings))
        .route("/{shop_id}/analytics", get(handlers::owner_handler::get_analytics))
        .route("/{shop_id}/indicators", get(handlers::owner_handler::get_day_indicators));

    let booking_routes = Router::new().route(
        "/{id}/status",
        put(handlers::bookings_handler::update_booking_status),
    );

    let owner_routes = Router::new().route("/bookings", get(handlers::owner_handler::get_owner_bookings));

    let me_routes = Router::new().route("/bookings", get(handlers::bookings_handler::get_my_bookings));

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/shops", shop_routes)
        .nest("/api/bookings", booking_routes)
        .nest("/api/owner", owner_routes)
        .nest("/api/me", me_routes)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/docs", get(api_reference))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn api_reference() -> Html<String> {
    Html(Scalar::new(ApiDoc::openapi()).to_html())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        auth::{issue_jwt, SessionClaims},
        clock::FixedClock,
        engine::{parse_date, test_support::{booking, sample_service, sample_shop}, BookingStatus},
        handlers::detached_metrics_state,
        middleware::REQUEST_ID_HEADER,
        store::{BookingStore, InMemoryStore},
        AppConfig, AppState,
    };

    const SECRET: &str = "router_test_secret";

    async fn app() -> (Router, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        let shop = sample_shop("09:00", "18:00");
        store.insert_shop(shop.clone()).await;
        store.insert_service(sample_service(&shop, 60, false)).await;

        let state = Arc::new(AppState {
            bookings: store.clone(),
            directory: store.clone(),
            clock: Arc::new(FixedClock::on(parse_date("2024-06-01").unwrap())),
            config: AppConfig::for_tests(SECRET),
            metrics: Arc::new(detached_metrics_state()),
        });

        (build_router(state), store)
    }

    fn bearer(user_id: &str) -> String {
        let claims = SessionClaims {
            sub: user_id.to_string(),
            name: Some(format!("{} name", user_id)),
            email: Some(format!("{}@example.com", user_id)),
            exp: chrono::Utc::now().timestamp() + 3600,
        };
        format!("Bearer {}", issue_jwt(&claims, SECRET).unwrap())
    }

    fn get(uri: &str, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, bearer(user));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn send_json(method: &str, uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, bearer(user));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn noon_selection(date: &str) -> Value {
        json!({
            "selection": {
                "startDate": date,
                "endDate": date,
                "timeSlot": { "time": "12:00 PM", "time24": "12:00", "isAvailable": true }
            },
            "notes": "Short back and sides"
        })
    }

    const BOOKINGS_URI: &str = "/api/shops/shop-1/services/service-1/bookings";

    #[tokio::test]
    async fn health_is_ok_and_carries_request_id() {
        let (app, _) = app().await;
        let response = app.oneshot(get("/health", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn slots_reflect_accepted_bookings_only() {
        let (app, store) = app().await;
        store.insert_booking(booking("2024-06-10", "12:00", BookingStatus::Accepted)).await;
        store.insert_booking(booking("2024-06-10", "13:00", BookingStatus::Pending)).await;

        let response = app
            .oneshot(get("/api/shops/shop-1/services/service-1/slots?date=2024-06-10", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let slots = json_body(response).await;
        let slots = slots.as_array().unwrap();
        assert_eq!(slots.len(), 9);
        assert_eq!(slots[3]["time24"], "12:00");
        assert_eq!(slots[3]["isAvailable"], false);
        assert_eq!(slots[4]["isAvailable"], true);
    }

    #[tokio::test]
    async fn malformed_query_dates_are_bad_requests() {
        let (app, _) = app().await;

        let response = app
            .clone()
            .oneshot(get("/api/shops/shop-1/services/service-1/slots?date=10/06/2024", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(get("/api/shops/shop-1/calendar?month=2024-13", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn calendar_is_a_full_grid_with_held_days_blocked() {
        let (app, store) = app().await;
        store.insert_booking(booking("2024-06-10", "12:00", BookingStatus::Accepted)).await;

        let response = app
            .oneshot(get("/api/shops/shop-1/calendar?month=2024-06", None))
            .await
            .unwrap();
        let body = json_body(response).await;
        let days = body["days"].as_array().unwrap();

        assert_eq!(days.len(), 42);
        let held = days.iter().find(|d| d["date"] == "2024-06-10").unwrap();
        assert_eq!(held["isBlocked"], true);
        assert_eq!(held["isSelectable"], false);
        let free = days.iter().find(|d| d["date"] == "2024-06-11").unwrap();
        assert_eq!(free["isSelectable"], true);
    }

    #[tokio::test]
    async fn calendar_and_range_check_need_a_known_shop() {
        let (app, _) = app().await;

        let response = app
            .clone()
            .oneshot(get("/api/shops/missing/calendar?month=2024-06", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(get("/api/shops/missing/range-check?start=2024-06-10&end=2024-06-12", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tapping_the_start_again_makes_a_single_day() {
        let (app, _) = app().await;
        let uri = "/api/shops/shop-1/services/service-1/selection/tap";

        let response = app
            .clone()
            .oneshot(send_json("POST", uri, None, json!({ "date": "2024-06-10" })))
            .await
            .unwrap();
        let first = json_body(response).await;
        assert_eq!(first["state"], "START_SELECTED");

        let response = app
            .oneshot(send_json(
                "POST",
                uri,
                None,
                json!({ "selection": first["selection"], "date": "2024-06-10" }),
            ))
            .await
            .unwrap();
        let second = json_body(response).await;
        assert_eq!(second["state"], "RANGE_SELECTED");
        assert_eq!(second["selection"]["endDate"], "2024-06-10");
    }

    #[tokio::test]
    async fn submitting_without_identity_asks_to_sign_in() {
        let (app, store) = app().await;

        let response = app
            .oneshot(send_json("POST", BOOKINGS_URI, None, noon_selection("2024-06-10")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["error"], "Please sign in to book");
        assert!(store.fetch_bookings_for_owner("owner-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn book_accept_then_conflict() {
        let (app, _) = app().await;

        let response = app
            .clone()
            .oneshot(send_json("POST", BOOKINGS_URI, Some("customer-a"), noon_selection("2024-06-10")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let booking_id = json_body(response).await["bookingId"].as_str().unwrap().to_string();

        // The customer may not accept their own request
        let response = app
            .clone()
            .oneshot(send_json(
                "PUT",
                &format!("/api/bookings/{}/status", booking_id),
                Some("customer-a"),
                json!({ "status": "ACCEPTED" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(send_json(
                "PUT",
                &format!("/api/bookings/{}/status", booking_id),
                Some("owner-1"),
                json!({ "status": "ACCEPTED", "responseMessage": "See you at noon" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let accepted = json_body(response).await;
        assert_eq!(accepted["status"], "ACCEPTED");
        assert_eq!(accepted["responseMessage"], "See you at noon");

        let response = app
            .clone()
            .oneshot(send_json("POST", BOOKINGS_URI, Some("customer-b"), noon_selection("2024-06-10")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = app
            .oneshot(get("/api/me/bookings?status=ACCEPTED", Some("customer-a")))
            .await
            .unwrap();
        let mine = json_body(response).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        assert_eq!(mine[0]["customerName"], "customer-a name");
    }

    #[tokio::test]
    async fn owner_views_are_limited_to_the_owner() {
        let (app, store) = app().await;
        store.insert_booking(booking("2024-06-01", "10:00", BookingStatus::Accepted)).await;

        let response = app
            .clone()
            .oneshot(get("/api/shops/shop-1/analytics", Some("someone-else")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(get("/api/shops/shop-1/bookings/today", Some("owner-1")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await.as_array().unwrap().len(), 1);

        let response = app
            .clone()
            .oneshot(get("/api/shops/shop-1/analytics", Some("owner-1")))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["analytics"]["confirmedBookings"], 1);

        let response = app
            .oneshot(get("/api/shops/shop-1/indicators?month=2024-06", Some("owner-1")))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["days"]["2024-06-01"]["accepted"], 1);
    }

    #[tokio::test]
    async fn owner_routes_require_a_token() {
        let (app, _) = app().await;
        let response = app.oneshot(get("/api/owner/bookings", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
