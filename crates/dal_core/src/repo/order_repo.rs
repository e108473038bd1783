//! Order repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `Orders` table plus lookup by owning user.
//! - Load the owning `User` only when the caller asks for it.
//!
//! # Invariants
//! - `Price` is written as canonical two-digit text and read back exactly.
//! - `Order::user` is ignored on writes; only `user_id` is persisted.
//! - Reads that include the user use an inner join, which cannot drop rows
//!   because `UserId` is a non-null foreign key.

use crate::model::order::{Order, OrderId, PRICE_SCALE};
use crate::model::user::UserId;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::user_repo::parse_user_row;
use crate::repo::{ensure_connection_ready, in_write_scope};
use log::debug;
use rusqlite::{params, Connection, Params, Row};
use rust_decimal::Decimal;
use std::str::FromStr;

const ORDER_SELECT_SQL: &str = "SELECT
    o.OrderId AS OrderId,
    o.UserId AS UserId,
    o.Product AS Product,
    o.Quantity AS Quantity,
    o.Price AS Price
FROM Orders o";

const ORDER_WITH_USER_SELECT_SQL: &str = "SELECT
    o.OrderId AS OrderId,
    o.UserId AS UserId,
    o.Product AS Product,
    o.Quantity AS Quantity,
    o.Price AS Price,
    u.Id AS Id,
    u.FirstName AS FirstName,
    u.LastName AS LastName,
    u.Email AS Email
FROM Orders o
INNER JOIN Users u ON u.Id = o.UserId";

/// Repository interface for order CRUD operations.
///
/// Every read takes `include_user`; when `true` each returned order carries
/// its owning `User` in `Order::user`.
pub trait OrderRepository {
    fn get_by_id(&self, id: OrderId, include_user: bool) -> RepoResult<Option<Order>>;
    /// Returns every order ordered by identity.
    fn get_all(&self, include_user: bool) -> RepoResult<Vec<Order>>;
    /// Returns the orders owned by `user_id`; empty for an unknown user.
    fn get_by_user_id(&self, user_id: UserId, include_user: bool) -> RepoResult<Vec<Order>>;
    fn add(&self, order: &Order) -> RepoResult<OrderId>;
    fn update(&self, order: &Order) -> RepoResult<()>;
    fn delete(&self, id: OrderId) -> RepoResult<bool>;
    fn exists(&self, id: OrderId) -> RepoResult<bool>;
}

/// SQLite-backed order repository.
pub struct SqliteOrderRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrderRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version does not match.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_orders<P: Params>(
        &self,
        filter: &str,
        bind: P,
        include_user: bool,
    ) -> RepoResult<Vec<Order>> {
        let base = if include_user {
            ORDER_WITH_USER_SELECT_SQL
        } else {
            ORDER_SELECT_SQL
        };
        let mut stmt = self
            .conn
            .prepare(&format!("{base} {filter} ORDER BY o.OrderId ASC;"))?;
        let mut rows = stmt.query(bind)?;
        let mut orders = Vec::new();

        while let Some(row) = rows.next()? {
            orders.push(parse_order_row(row, include_user)?);
        }

        Ok(orders)
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn get_by_id(&self, id: OrderId, include_user: bool) -> RepoResult<Option<Order>> {
        let mut orders = self.query_orders("WHERE o.OrderId = ?1", [id], include_user)?;
        Ok(orders.pop())
    }

    fn get_all(&self, include_user: bool) -> RepoResult<Vec<Order>> {
        self.query_orders("", [], include_user)
    }

    fn get_by_user_id(&self, user_id: UserId, include_user: bool) -> RepoResult<Vec<Order>> {
        self.query_orders("WHERE o.UserId = ?1", [user_id], include_user)
    }

    fn add(&self, order: &Order) -> RepoResult<OrderId> {
        if matches!(order.id, Some(id) if id <= 0) {
            return Err(RepoError::InvalidArgument(
                "caller-assigned order id must be positive",
            ));
        }
        order.validate()?;

        self.conn.execute(
            "INSERT INTO Orders (OrderId, UserId, Product, Quantity, Price)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                order.id,
                order.user_id,
                order.product,
                order.quantity,
                price_to_db(order.price),
            ],
        )?;

        let id = order.id.unwrap_or_else(|| self.conn.last_insert_rowid());
        debug!(
            "event=order_add module=repo status=ok order_id={id} user_id={}",
            order.user_id
        );
        Ok(id)
    }

    fn update(&self, order: &Order) -> RepoResult<()> {
        let id = order
            .id
            .ok_or(RepoError::InvalidArgument("order id is required for update"))?;
        order.validate()?;

        let changed = self.conn.execute(
            "UPDATE Orders
             SET
                UserId = ?2,
                Product = ?3,
                Quantity = ?4,
                Price = ?5
             WHERE OrderId = ?1;",
            params![
                id,
                order.user_id,
                order.product,
                order.quantity,
                price_to_db(order.price),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound { entity: "order", id });
        }

        debug!("event=order_update module=repo status=ok order_id={id}");
        Ok(())
    }

    fn delete(&self, id: OrderId) -> RepoResult<bool> {
        in_write_scope(self.conn, |conn| {
            if !order_exists(conn, id)? {
                debug!("event=order_delete module=repo status=noop order_id={id}");
                return Ok(false);
            }

            conn.execute("DELETE FROM Orders WHERE OrderId = ?1;", [id])?;
            debug!("event=order_delete module=repo status=ok order_id={id}");
            Ok(true)
        })
    }

    fn exists(&self, id: OrderId) -> RepoResult<bool> {
        order_exists(self.conn, id)
    }
}

fn order_exists(conn: &Connection, id: OrderId) -> RepoResult<bool> {
    let exists = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM Orders WHERE OrderId = ?1);",
        [id],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(exists)
}

fn parse_order_row(row: &Row<'_>, include_user: bool) -> RepoResult<Order> {
    let order_id: OrderId = row.get("OrderId")?;
    let price_text: String = row.get("Price")?;
    let price = Decimal::from_str(&price_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid price `{price_text}` in Orders.Price for order {order_id}"
        ))
    })?;

    let user = if include_user {
        Some(parse_user_row(row)?)
    } else {
        None
    };

    Ok(Order {
        id: Some(order_id),
        user_id: row.get("UserId")?,
        product: row.get("Product")?,
        quantity: row.get("Quantity")?,
        price,
        user,
    })
}

fn price_to_db(price: Decimal) -> String {
    let mut fixed = price;
    fixed.rescale(PRICE_SCALE);
    fixed.to_string()
}
