use crate::{models::Shop, store::ShopDirectory, AppError, AppResult};

use super::AuthenticatedUser;

/// Load `shop_id` and check that `user` owns it
pub async fn require_shop_owner(
    directory: &dyn ShopDirectory,
    shop_id: &str,
    user: &AuthenticatedUser,
) -> AppResult<Shop> {
    let shop = directory.fetch_shop(shop_id).await?;

    if shop.owner_id != user.user_id {
        tracing::warn!(shop_id, user_id = %user.user_id, "Non-owner attempted to read shop bookings");
        return Err(AppError::Forbidden(
            "Only the shop owner can view this shop's bookings".to_string(),
        ));
    }

    Ok(shop)
}
