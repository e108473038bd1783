//! Order domain model.
//!
//! # Responsibility
//! - Define the `Order` record persisted in the `Orders` table.
//! - Hold the optionally loaded owning `User`.
//!
//! # Invariants
//! - `user_id` must reference an existing user at write time (store-enforced).
//! - `quantity >= 1`.
//! - `price` is fixed-point `decimal(18,2)` with `price >= 0.01`.
//! - `user`, when present, is a read-side projection and is never written.

use crate::model::user::{check_text, User, UserId};
use crate::model::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Integer identity of an `Orders` row.
pub type OrderId = i64;

pub const PRODUCT_MAX_CHARS: usize = 100;
pub const PRICE_SCALE: u32 = 2;
/// `decimal(18,2)` leaves 16 integer digits.
const PRICE_INTEGER_DIGITS: u32 = 16;

/// Purchase line owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// `None` lets the store generate the identity on insert.
    pub id: Option<OrderId>,
    pub user_id: UserId,
    pub product: String,
    pub quantity: i32,
    pub price: Decimal,
    /// Populated only by reads that ask for the owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

impl Order {
    /// Creates an order whose identity will be generated by the store.
    pub fn new(user_id: UserId, product: impl Into<String>, quantity: i32, price: Decimal) -> Self {
        Self {
            id: None,
            user_id,
            product: product.into(),
            quantity,
            price,
            user: None,
        }
    }

    /// Creates an order with a caller-assigned identity.
    pub fn with_id(
        id: OrderId,
        user_id: UserId,
        product: impl Into<String>,
        quantity: i32,
        price: Decimal,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(user_id, product, quantity, price)
        }
    }

    /// Checks required fields and range bounds.
    ///
    /// The foreign key itself is left to the store.
    ///
    /// # Errors
    /// - Returns the first violated field constraint.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_text("product", &self.product, PRODUCT_MAX_CHARS)?;

        if self.quantity < 1 {
            return Err(ValidationError::OutOfRange {
                field: "quantity",
                detail: format!("must be at least 1, got {}", self.quantity),
            });
        }

        validate_price(self.price)
    }
}

/// Validates a price against `decimal(18,2)` with a `0.01` floor.
///
/// # Errors
/// - `OutOfRange` when below `0.01` or wider than 16 integer digits.
/// - `TooPrecise` when more than two fractional digits are significant.
pub fn validate_price(price: Decimal) -> Result<(), ValidationError> {
    let min = Decimal::new(1, PRICE_SCALE);
    if price < min {
        return Err(ValidationError::OutOfRange {
            field: "price",
            detail: format!("must be at least {min}, got {price}"),
        });
    }

    let limit = Decimal::from(10_i64.pow(PRICE_INTEGER_DIGITS));
    if price >= limit {
        return Err(ValidationError::OutOfRange {
            field: "price",
            detail: format!("must be below {limit}, got {price}"),
        });
    }

    let scale = price.normalize().scale();
    if scale > PRICE_SCALE {
        return Err(ValidationError::TooPrecise {
            field: "price",
            max_scale: PRICE_SCALE,
            actual: scale,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{validate_price, Order, PRODUCT_MAX_CHARS};
    use crate::model::ValidationError;
    use rust_decimal::Decimal;

    #[test]
    fn valid_order_passes() {
        let order = Order::new(1, "Laptop", 1, Decimal::new(99999, 2));
        assert!(order.validate().is_ok());
        assert!(order.user.is_none());
    }

    #[test]
    fn zero_quantity_is_out_of_range() {
        let order = Order::with_id(9, 1, "Mouse", 0, Decimal::new(2550, 2));
        assert!(matches!(
            order.validate(),
            Err(ValidationError::OutOfRange {
                field: "quantity",
                ..
            })
        ));
    }

    #[test]
    fn product_over_limit_is_rejected() {
        let order = Order::new(1, "x".repeat(PRODUCT_MAX_CHARS + 1), 1, Decimal::ONE);
        assert!(matches!(
            order.validate(),
            Err(ValidationError::TooLong {
                field: "product",
                ..
            })
        ));
    }

    #[test]
    fn price_floor_and_scale() {
        assert!(validate_price(Decimal::new(1, 2)).is_ok());
        assert!(validate_price(Decimal::new(10, 3)).is_ok());
        assert!(matches!(
            validate_price(Decimal::ZERO),
            Err(ValidationError::OutOfRange { field: "price", .. })
        ));
        assert!(matches!(
            validate_price(Decimal::new(10_001, 3)),
            Err(ValidationError::TooPrecise { actual: 3, .. })
        ));
    }
}
