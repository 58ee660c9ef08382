pub mod booking;
pub mod booking_input;
pub mod shop;

pub use booking::{Booking, NewBooking};
pub use booking_input::{
    AnalyticsResponse, BookingMutationResponse, CalendarMonthResponse, CreateBookingInput, IndicatorsResponse,
    RangeCheckResponse, SelectionResponse, SelectionTapInput, SelectionValidateInput, SelectionValidationResponse,
    UpdateStatusInput,
};
pub use shop::{Service, ServiceProfile, Shop, ShopHours};
