use crate::badges::product_badges;
use crate::clock::Clock;
use crate::dialog::{Dialog, DialogResult, Outcome, Prompt};
use crate::error::{CafeError, Result};
use crate::models::{Category, CreateOrder, MenuItem, Offer, Order, Section, Sugar};
use crate::sync::{Mirror, PollTimer, Reconcile};
use crate::tables::{Offers, Orders, Products, TableName, TableStore};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const MIN_QUANTITY: u32 = 1;
pub const MAX_QUANTITY: u32 = 10;
pub const MIN_TABLE: u32 = 1;
pub const MAX_TABLE: u32 = 50;

/// Validator for the table number field of the order form.
pub fn parse_table_number(raw: &str) -> std::result::Result<u32, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("Please enter the table number".to_string());
    }
    let n = raw.parse::<u32>().map_err(|_| table_range_message())?;
    check_table_number(n)?;
    Ok(n)
}

fn check_table_number(n: u32) -> std::result::Result<(), String> {
    if (MIN_TABLE..=MAX_TABLE).contains(&n) {
        Ok(())
    } else {
        Err(table_range_message())
    }
}

fn table_range_message() -> String {
    format!("Table number must be between {MIN_TABLE} and {MAX_TABLE}")
}

/// The customer-facing menu and order form.
pub struct MenuController {
    store: TableStore,
    clock: Arc<dyn Clock>,
    poll: PollTimer,
    products: Mirror<Products>,
    orders: Mirror<Orders>,
    offers: Mirror<Offers>,
}

impl MenuController {
    pub fn new(store: TableStore, clock: Arc<dyn Clock>, poll_interval: Duration) -> Self {
        MenuController {
            products: Mirror::load(&store),
            orders: Mirror::load(&store),
            offers: Mirror::load(&store),
            store,
            clock,
            poll: PollTimer::new(poll_interval),
        }
    }

    /// Products by category, each with its badges, in the order they were added.
    pub fn menu(&self) -> BTreeMap<Category, Vec<MenuItem>> {
        let now = self.clock.now();
        let mut menu: BTreeMap<Category, Vec<MenuItem>> = BTreeMap::new();
        for product in self.products.get() {
            let group = self.orders.get().get(&product.name);
            menu.entry(product.category).or_default().push(MenuItem {
                product: product.clone(),
                badges: product_badges(product, group, now),
            });
        }
        menu
    }

    pub fn items(&self, category: Category) -> Vec<MenuItem> {
        self.menu().remove(&category).unwrap_or_default()
    }

    /// Offers that are switched on and not past their date.
    pub fn live_offers(&self) -> Vec<Offer> {
        let now = self.clock.now();
        self.offers
            .get()
            .iter()
            .filter(|o| o.is_live(now))
            .cloned()
            .collect()
    }

    /// Places one order and bumps the product's counter.
    ///
    /// Sugar is kept only for hot drinks, which default to none.
    pub fn place_order(&mut self, request: CreateOrder) -> Result<Order> {
        if !(MIN_QUANTITY..=MAX_QUANTITY).contains(&request.quantity) {
            return Err(CafeError::validation(format!(
                "Quantity must be between {MIN_QUANTITY} and {MAX_QUANTITY}"
            )));
        }
        check_table_number(request.table_number).map_err(CafeError::Validation)?;

        let mut products = self.store.load::<Products>();
        let product = products
            .iter_mut()
            .find(|p| p.name == request.product)
            .ok_or_else(|| CafeError::not_found(format!("product {}", request.product)))?;

        let now = self.clock.now();
        let sugar = if product.category.takes_sugar() {
            Some(request.sugar.unwrap_or(Sugar::None))
        } else {
            None
        };

        let order = Order {
            product: product.name.clone(),
            category: product.category,
            quantity: request.quantity,
            price: product.price,
            total: product.price * request.quantity as f64,
            sugar,
            table_number: request.table_number,
            customer_name: request
                .customer_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            customer_id: super::customer_id(now),
            completed: false,
            timestamp: now,
        };
        product.order_count += 1;

        let mut orders = self.store.load::<Orders>();
        orders
            .entry(order.product.clone())
            .or_default()
            .orders
            .push(order.clone());

        self.store.save_pair::<Orders, Products>(&orders, &products)?;
        self.orders.set(orders);
        self.products.set(products);

        info!(
            product = %order.product,
            quantity = order.quantity,
            table = order.table_number,
            customer = %order.customer_id,
            "order placed"
        );
        Ok(order)
    }

    /// The confirmation form: table number (required), then customer name
    /// (optional). Cancelling either field places nothing.
    pub fn confirm_order(
        &mut self,
        dialog: &mut dyn Dialog,
        product: &str,
        quantity: u32,
        sugar: Option<Sugar>,
    ) -> Result<Outcome<Order>> {
        let table = match dialog.input(
            &Prompt::new("Confirm order", "Table number"),
            &|raw: &str| parse_table_number(raw).map(|_| ()),
        ) {
            DialogResult::Confirmed(raw) => parse_table_number(&raw).map_err(CafeError::Validation)?,
            DialogResult::Cancelled => return Ok(Outcome::Cancelled),
        };

        let customer_name = match dialog.input(
            &Prompt::new("Confirm order", "Customer name (optional)"),
            &|_: &str| Ok(()),
        ) {
            DialogResult::Confirmed(name) => Some(name),
            DialogResult::Cancelled => return Ok(Outcome::Cancelled),
        };

        let order = self.place_order(CreateOrder {
            product: product.to_string(),
            quantity,
            sugar,
            table_number: table,
            customer_name,
        })?;
        Ok(Outcome::Done(order))
    }
}

impl Reconcile for MenuController {
    fn store(&self) -> &TableStore {
        &self.store
    }

    fn poll_timer(&mut self) -> &mut PollTimer {
        &mut self.poll
    }

    fn showing(&self) -> &'static [Section] {
        &[Section::Menu, Section::Offers]
    }

    fn watched_tables(&self) -> &'static [TableName] {
        &[TableName::Products, TableName::Orders, TableName::Offers]
    }

    fn sections_for(&self, table: TableName) -> &'static [Section] {
        match table {
            // badges read the order history
            TableName::Products | TableName::Orders => &[Section::Menu],
            TableName::Offers => &[Section::Offers],
            _ => &[],
        }
    }

    fn reload(&mut self, table: TableName) -> bool {
        match table {
            TableName::Products => self.products.refresh(&self.store),
            TableName::Orders => self.orders.refresh(&self.store),
            TableName::Offers => self.offers.refresh(&self.store),
            _ => false,
        }
    }
}
