pub mod claims;
pub mod jwt;

pub use claims::SessionClaims;
pub use jwt::{issue_jwt, validate_jwt};
