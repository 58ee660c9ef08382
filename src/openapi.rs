use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hustle Booking API",
        version = "1.0.0",
        description = "Availability, booking requests and owner views for Hustle shops"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        // Health
        crate::handlers::health::health_check,

        // Availability
        crate::handlers::availability_handler::get_slots,
        crate::handlers::availability_handler::get_calendar,
        crate::handlers::availability_handler::check_range,
        crate::handlers::availability_handler::tap_selection,
        crate::handlers::availability_handler::validate_selection,

        // Bookings
        crate::handlers::bookings_handler::create_booking,
        crate::handlers::bookings_handler::update_booking_status,
        crate::handlers::bookings_handler::get_my_bookings,

        // Owner
        crate::handlers::owner_handler::get_shop_bookings,
        crate::handlers::owner_handler::get_todays_bookings,
        crate::handlers::owner_handler::get_analytics,
        crate::handlers::owner_handler::get_day_indicators,
        crate::handlers::owner_handler::get_owner_bookings,
    ),
    components(
        schemas(
            // Core models
            crate::models::Booking,
            crate::models::Shop,
            crate::models::ShopHours,
            crate::models::Service,
            crate::models::ServiceProfile,
            crate::engine::BookingStatus,
            crate::engine::TimeSlot,
            crate::engine::CalendarDay,
            crate::engine::Selection,
            crate::engine::SelectionState,
            crate::engine::ValidatedSelection,
            crate::engine::BookingAnalytics,
            crate::engine::WeeklyBookingCounts,
            crate::engine::DayIndicators,

            // Input and response models
            crate::models::CreateBookingInput,
            crate::models::UpdateStatusInput,
            crate::models::BookingMutationResponse,
            crate::models::SelectionTapInput,
            crate::models::SelectionResponse,
            crate::models::SelectionValidateInput,
            crate::models::SelectionValidationResponse,
            crate::models::CalendarMonthResponse,
            crate::models::RangeCheckResponse,
            crate::models::AnalyticsResponse,
            crate::models::IndicatorsResponse,
            crate::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check"),
        (name = "availability", description = "Slots, calendar and selection for customers"),
        (name = "bookings", description = "Booking requests and status changes"),
        (name = "owner", description = "Shop owner views"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("__session"))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
