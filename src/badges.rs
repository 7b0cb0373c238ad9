//! Menu badges derived from order history.
//!
//! Both the menu and the admin product list call [`product_badges`]; nothing
//! else decides badges.

use crate::models::{Badge, OrderGroup, Product};
use chrono::{DateTime, Utc};

pub const POPULAR_MIN_ORDERS: u32 = 50;
pub const POPULAR_MIN_PER_DAY: f64 = 50.0;
pub const POPULAR_WINDOW_DAYS: f64 = 2.0;
pub const NEW_WINDOW_DAYS: f64 = 1.0;

const MS_PER_DAY: f64 = 86_400_000.0;

fn days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / MS_PER_DAY
}

/// `group` is the product's orders, if any were placed.
///
/// "New" while the product is at most a day old. "Popular" needs at least 50
/// orders on the counter, an average of 50 a day since creation (ages under a
/// day count as one day), and the 50th order in the group placed within the
/// last two days. The badge drops once that 50th order ages past two days,
/// even if orders keep coming.
pub fn product_badges(product: &Product, group: Option<&OrderGroup>, now: DateTime<Utc>) -> Vec<Badge> {
    let mut badges = Vec::new();
    let days_since_created = days_between(product.created_at, now);

    if days_since_created <= NEW_WINDOW_DAYS {
        badges.push(Badge::New);
    }

    if is_popular(product, group, days_since_created, now) {
        badges.push(Badge::Popular);
    }

    badges
}

fn is_popular(product: &Product, group: Option<&OrderGroup>, days_since_created: f64, now: DateTime<Utc>) -> bool {
    if product.order_count < POPULAR_MIN_ORDERS {
        return false;
    }

    let per_day = product.order_count as f64 / days_since_created.max(1.0);
    if per_day < POPULAR_MIN_PER_DAY {
        return false;
    }

    let threshold_index = POPULAR_MIN_ORDERS as usize - 1;
    group
        .and_then(|g| g.orders.get(threshold_index))
        .map(|order| days_between(order.timestamp, now) <= POPULAR_WINDOW_DAYS)
        .unwrap_or(false)
}
