//! Owner-facing write path for booking status changes.

use super::error::BookingError;
use super::status::{Actor, BookingStatus};
use crate::models::Booking;
use crate::store::BookingStore;

/// Resolve who `actor_id` is for `booking` and check they may move it to `next`
pub fn authorize_transition(
    booking: &Booking,
    actor_id: &str,
    next: BookingStatus,
) -> Result<Actor, BookingError> {
    let actor = if booking.shop_owner_id == actor_id {
        Actor::ShopOwner
    } else if booking.customer_id == actor_id {
        Actor::Customer
    } else {
        return Err(BookingError::Forbidden(
            "Only the shop owner or the customer can change this booking".to_string(),
        ));
    };

    if !BookingStatus::can_be_issued_by(next, actor) {
        return Err(BookingError::Forbidden(
            "Customers can only cancel their own bookings".to_string(),
        ));
    }

    if !booking.status.can_transition_to(next) {
        return Err(BookingError::InvalidTransition {
            from: booking.status,
            to: next,
        });
    }

    Ok(actor)
}

/// Apply a status change, guarded by the status that was read.
///
/// Accepting fails with a conflict when another accepted booking already
/// holds the same shop, date and time.
pub async fn change_status(
    store: &dyn BookingStore,
    booking_id: &str,
    actor_id: &str,
    next: BookingStatus,
    response_message: Option<&str>,
) -> Result<Booking, BookingError> {
    let booking = store.fetch_booking(booking_id).await?;
    let actor = authorize_transition(&booking, actor_id, next)?;

    let updated = store
        .update_booking_status(booking_id, booking.status, next, response_message)
        .await?;

    tracing::info!(
        booking_id,
        from = %booking.status,
        to = %next,
        actor = ?actor,
        "Booking status changed"
    );

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::booking;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn strangers_are_forbidden() {
        let pending = booking("2024-06-10", "10:00", BookingStatus::Pending);
        let result = authorize_transition(&pending, "someone-else", BookingStatus::Accepted);
        assert!(matches!(result, Err(BookingError::Forbidden(_))));
    }

    #[test]
    fn customer_may_cancel_but_not_accept() {
        let pending = booking("2024-06-10", "10:00", BookingStatus::Pending);

        assert_eq!(
            authorize_transition(&pending, &pending.customer_id, BookingStatus::Cancelled).unwrap(),
            Actor::Customer
        );
        assert!(matches!(
            authorize_transition(&pending, &pending.customer_id, BookingStatus::Accepted),
            Err(BookingError::Forbidden(_))
        ));
    }

    #[test]
    fn owner_is_held_to_the_transition_table() {
        let denied = booking("2024-06-10", "10:00", BookingStatus::Denied);
        let result = authorize_transition(&denied, &denied.shop_owner_id, BookingStatus::Accepted);

        assert!(matches!(
            result,
            Err(BookingError::InvalidTransition {
                from: BookingStatus::Denied,
                to: BookingStatus::Accepted
            })
        ));
    }

    #[tokio::test]
    async fn accepting_a_held_slot_conflicts() {
        let store = InMemoryStore::new();
        let first = store
            .insert_booking(booking("2024-06-10", "10:00", BookingStatus::Pending))
            .await;
        let second = store
            .insert_booking(booking("2024-06-10", "10:00", BookingStatus::Pending))
            .await;

        let accepted = change_status(&store, &first.id, &first.shop_owner_id, BookingStatus::Accepted, Some("See you"))
            .await
            .unwrap();
        assert_eq!(accepted.status, BookingStatus::Accepted);
        assert_eq!(accepted.response_message, "See you");

        let result = change_status(&store, &second.id, &second.shop_owner_id, BookingStatus::Accepted, None).await;
        assert!(matches!(result, Err(BookingError::Conflict(_))));

        // Denying the loser is still allowed
        let denied = change_status(&store, &second.id, &second.shop_owner_id, BookingStatus::Denied, None)
            .await
            .unwrap();
        assert_eq!(denied.status, BookingStatus::Denied);
    }
}
