pub mod auth;
pub mod permissions;

pub use auth::{AuthenticatedUser, MaybeUser};
pub use permissions::require_shop_owner;
