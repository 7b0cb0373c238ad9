//! Soft delete: Active -> Trashed -> Restored | Purged.
//!
//! Every move between an active table and its trash table is a
//! [`TableStore::save_pair`] with the *receiving* table first. A failed
//! second write can leave a record in both tables, never in neither.

use crate::error::{CafeError, Result};
use crate::models::{OrderGroup, Product, TrashedOrderGroup, TrashedProduct};
use crate::tables::{Orders, Products, TableStore, TrashedOrders, TrashedProducts};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

pub fn trash_product(store: &TableStore, id: &str, now: DateTime<Utc>) -> Result<TrashedProduct> {
    let mut products = store.load::<Products>();
    let index = products
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| CafeError::not_found(format!("product {id}")))?;

    let trashed = TrashedProduct {
        product: products.remove(index),
        deleted_at: now,
    };

    let mut bin = store.load::<TrashedProducts>();
    bin.push(trashed.clone());
    store.save_pair::<TrashedProducts, Products>(&bin, &products)?;

    info!(id, name = %trashed.product.name, "product moved to trash");
    Ok(trashed)
}

/// Refused while any order in the group is completed.
pub fn trash_order_group(store: &TableStore, product_name: &str, now: DateTime<Utc>) -> Result<TrashedOrderGroup> {
    let mut orders = store.load::<Orders>();
    let group = orders
        .get(product_name)
        .ok_or_else(|| CafeError::not_found(format!("orders for {product_name}")))?;

    if group.has_completed() {
        return Err(CafeError::policy("Completed orders cannot be deleted"));
    }

    let group = orders.remove(product_name).unwrap_or_default();
    let trashed = TrashedOrderGroup {
        id: Uuid::new_v4().to_string(),
        product_name: product_name.to_string(),
        total_orders: group.orders.len(),
        total_value: group.total_value(),
        orders: group.orders,
        deleted_at: now,
    };

    let mut bin = store.load::<TrashedOrders>();
    bin.push(trashed.clone());
    store.save_pair::<TrashedOrders, Orders>(&bin, &orders)?;

    info!(product = product_name, count = trashed.total_orders, "order group moved to trash");
    Ok(trashed)
}

/// Refused when an active product already has the same name.
pub fn restore_product(store: &TableStore, id: &str) -> Result<Product> {
    let mut bin = store.load::<TrashedProducts>();
    let index = bin
        .iter()
        .position(|p| p.product.id == id)
        .ok_or_else(|| CafeError::not_found(format!("trashed product {id}")))?;

    let mut products = store.load::<Products>();
    if products.iter().any(|p| p.name == bin[index].product.name) {
        return Err(CafeError::validation(format!(
            "A product named {} already exists",
            bin[index].product.name
        )));
    }

    let product = bin.remove(index).product;
    products.push(product.clone());
    store.save_pair::<Products, TrashedProducts>(&products, &bin)?;

    info!(id, name = %product.name, "product restored");
    Ok(product)
}

/// Appends the trashed orders to the product's current group.
pub fn restore_order_group(store: &TableStore, id: &str) -> Result<OrderGroup> {
    let mut bin = store.load::<TrashedOrders>();
    let index = bin
        .iter()
        .position(|g| g.id == id)
        .ok_or_else(|| CafeError::not_found(format!("trashed orders {id}")))?;

    let trashed = bin.remove(index);
    let mut orders = store.load::<Orders>();
    let group = orders.entry(trashed.product_name.clone()).or_default();
    group.orders.extend(trashed.orders);
    let restored = group.clone();

    store.save_pair::<Orders, TrashedOrders>(&orders, &bin)?;

    info!(product = %trashed.product_name, "order group restored");
    Ok(restored)
}

pub fn purge_product(store: &TableStore, id: &str) -> Result<()> {
    let mut bin = store.load::<TrashedProducts>();
    let before = bin.len();
    bin.retain(|p| p.product.id != id);
    if bin.len() == before {
        return Err(CafeError::not_found(format!("trashed product {id}")));
    }
    store.save::<TrashedProducts>(&bin)?;
    info!(id, "product deleted permanently");
    Ok(())
}

pub fn purge_order_group(store: &TableStore, id: &str) -> Result<()> {
    let mut bin = store.load::<TrashedOrders>();
    let before = bin.len();
    bin.retain(|g| g.id != id);
    if bin.len() == before {
        return Err(CafeError::not_found(format!("trashed orders {id}")));
    }
    store.save::<TrashedOrders>(&bin)?;
    info!(id, "order group deleted permanently");
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    pub products: usize,
    pub order_groups: usize,
    /// Names left in the trash because an active product already uses them.
    pub skipped: Vec<String>,
}

pub fn restore_all(store: &TableStore) -> Result<RestoreReport> {
    let mut products = store.load::<Products>();
    let mut orders = store.load::<Orders>();
    let trashed_products = store.load::<TrashedProducts>();
    let trashed_orders = store.load::<TrashedOrders>();

    let mut report = RestoreReport::default();
    let mut kept = Vec::new();
    for trashed in trashed_products {
        if products.iter().any(|p| p.name == trashed.product.name) {
            report.skipped.push(trashed.product.name.clone());
            kept.push(trashed);
        } else {
            products.push(trashed.product);
            report.products += 1;
        }
    }

    for group in trashed_orders {
        orders
            .entry(group.product_name)
            .or_default()
            .orders
            .extend(group.orders);
        report.order_groups += 1;
    }

    store.save_pair::<Products, Orders>(&products, &orders)?;
    store.save_pair::<TrashedProducts, TrashedOrders>(&kept, &Vec::new())?;

    info!(
        products = report.products,
        order_groups = report.order_groups,
        skipped = report.skipped.len(),
        "trash restored"
    );
    Ok(report)
}

/// Irreversible. Both trash tables end empty.
pub fn empty_trash(store: &TableStore) -> Result<(usize, usize)> {
    let products = store.load::<TrashedProducts>().len();
    let groups = store.load::<TrashedOrders>().len();
    store.save_pair::<TrashedProducts, TrashedOrders>(&Vec::new(), &Vec::new())?;
    info!(products, groups, "trash emptied");
    Ok((products, groups))
}
