use crate::auth::AdminGate;
use crate::badges::product_badges;
use crate::clock::Clock;
use crate::dialog::{Dialog, Outcome, Prompt};
use crate::error::{CafeError, Result};
use crate::models::{
    CreateOffer, CreateProduct, MenuItem, Offer, OrdersSummary, OrdersTable, Product, Section, TrashedOrderGroup,
    TrashedProduct,
};
use crate::recycle;
use crate::sync::{Mirror, PollTimer, Reconcile};
use crate::tables::{Offers, Orders, Products, TableName, TableStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// The back-office screen: products, orders and offers tabs.
pub struct AdminController {
    store: TableStore,
    clock: Arc<dyn Clock>,
    gate: AdminGate,
    poll: PollTimer,
    tab: Section,
    products: Mirror<Products>,
    orders: Mirror<Orders>,
    offers: Mirror<Offers>,
}

impl AdminController {
    /// Navigating to the admin screen with a typed password.
    pub fn open(
        store: TableStore,
        clock: Arc<dyn Clock>,
        gate: AdminGate,
        password: &str,
        poll_interval: Duration,
    ) -> Result<Self> {
        gate.verify(password)?;
        Ok(Self::unlocked(store, clock, gate, poll_interval))
    }

    /// Navigating through the password dialog. Cancelling stays put.
    pub fn open_with_dialog(
        store: TableStore,
        clock: Arc<dyn Clock>,
        gate: AdminGate,
        dialog: &mut dyn Dialog,
        poll_interval: Duration,
    ) -> Outcome<Self> {
        match gate.prompt(dialog, "Admin panel") {
            Outcome::Done(()) => Outcome::Done(Self::unlocked(store, clock, gate, poll_interval)),
            Outcome::Cancelled => Outcome::Cancelled,
        }
    }

    fn unlocked(store: TableStore, clock: Arc<dyn Clock>, gate: AdminGate, poll_interval: Duration) -> Self {
        info!(tab = %store.tab(), "admin screen opened");
        AdminController {
            products: Mirror::load(&store),
            orders: Mirror::load(&store),
            offers: Mirror::load(&store),
            store,
            clock,
            gate,
            poll: PollTimer::new(poll_interval),
            tab: Section::AddProducts,
        }
    }

    pub fn current_tab(&self) -> Section {
        self.tab
    }

    /// Switching tabs always redraws the new tab.
    pub fn switch_tab(&mut self, tab: Section) -> Result<Vec<Section>> {
        match tab {
            Section::AddProducts | Section::ManageOrders | Section::ManageOffers => {
                self.tab = tab;
                Ok(vec![tab])
            }
            other => Err(CafeError::validation(format!("{other:?} is not an admin tab"))),
        }
    }

    // ----- products -----

    pub fn products(&self) -> Vec<MenuItem> {
        let now = self.clock.now();
        self.products
            .get()
            .iter()
            .map(|product| MenuItem {
                product: product.clone(),
                badges: product_badges(product, self.orders.get().get(&product.name), now),
            })
            .collect()
    }

    pub fn add_product(&mut self, new: CreateProduct) -> Result<Product> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(CafeError::validation("Please enter the product name"));
        }
        if !new.price.is_finite() || new.price < 0.0 {
            return Err(CafeError::validation("Price cannot be negative"));
        }

        let mut products = self.store.load::<Products>();
        if products.iter().any(|p| p.name == name) {
            return Err(CafeError::validation(format!("A product named {name} already exists")));
        }

        let product = Product {
            id: super::new_id(),
            category: new.category,
            name,
            description: new.description.trim().to_string(),
            price: new.price,
            created_at: self.clock.now(),
            order_count: 0,
        };
        products.push(product.clone());
        self.store.save::<Products>(&products)?;
        self.products.set(products);

        info!(id = %product.id, name = %product.name, "product added");
        Ok(product)
    }

    /// Soft delete: the product moves to the trash.
    pub fn delete_product(&mut self, dialog: &mut dyn Dialog, id: &str) -> Result<Outcome<TrashedProduct>> {
        if !self.store.load::<Products>().iter().any(|p| p.id == id) {
            return Err(CafeError::not_found(format!("product {id}")));
        }
        if !dialog.confirm(&Prompt::new("Delete product", "Are you sure you want to delete this product?")) {
            return Ok(Outcome::Cancelled);
        }

        let trashed = recycle::trash_product(&self.store, id, self.clock.now())?;
        self.products.refresh(&self.store);
        Ok(Outcome::Done(trashed))
    }

    // ----- orders -----

    pub fn orders(&self) -> &OrdersTable {
        self.orders.get()
    }

    pub fn summary(&self) -> OrdersSummary {
        OrdersSummary::of(self.orders.get())
    }

    /// Marks one order done. Completion never reverts.
    pub fn complete_order(&mut self, product_name: &str, index: usize) -> Result<()> {
        let mut orders = self.store.load::<Orders>();
        let order = orders
            .get_mut(product_name)
            .and_then(|g| g.orders.get_mut(index))
            .ok_or_else(|| CafeError::not_found(format!("order {} of {product_name}", index + 1)))?;

        if order.completed {
            return Ok(());
        }
        order.completed = true;

        self.store.save::<Orders>(&orders)?;
        self.orders.set(orders);
        info!(product = product_name, index, "order completed");
        Ok(())
    }

    /// Returns how many orders changed state.
    pub fn complete_all(&mut self, product_name: &str) -> Result<usize> {
        let mut orders = self.store.load::<Orders>();
        let group = orders
            .get_mut(product_name)
            .ok_or_else(|| CafeError::not_found(format!("orders for {product_name}")))?;

        let mut changed = 0;
        for order in group.orders.iter_mut().filter(|o| !o.completed) {
            order.completed = true;
            changed += 1;
        }
        if changed == 0 {
            return Ok(0);
        }

        self.store.save::<Orders>(&orders)?;
        self.orders.set(orders);
        info!(product = product_name, changed, "all orders completed");
        Ok(changed)
    }

    /// Soft delete of a whole group. A group holding any completed order
    /// is refused with an alert before the user is asked anything.
    pub fn delete_order_group(
        &mut self,
        dialog: &mut dyn Dialog,
        product_name: &str,
    ) -> Result<Outcome<TrashedOrderGroup>> {
        let group = self
            .store
            .load::<Orders>()
            .remove(product_name)
            .ok_or_else(|| CafeError::not_found(format!("orders for {product_name}")))?;
        if group.has_completed() {
            return Err(super::refuse(dialog, "Delete orders", "Completed orders cannot be deleted"));
        }

        let prompt = Prompt::new(
            "Delete orders",
            format!("Are you sure you want to delete all orders for {product_name}?"),
        );
        if !dialog.confirm(&prompt) {
            return Ok(Outcome::Cancelled);
        }

        let trashed = recycle::trash_order_group(&self.store, product_name, self.clock.now())?;
        self.orders.refresh(&self.store);
        Ok(Outcome::Done(trashed))
    }

    /// Password, then a final confirmation, then every order is gone for good.
    pub fn delete_all_orders(&mut self, dialog: &mut dyn Dialog) -> Result<Outcome<usize>> {
        if !self.gate.prompt(dialog, "Delete all orders").is_done() {
            return Ok(Outcome::Cancelled);
        }
        let prompt = Prompt::new(
            "Are you sure?",
            "All orders will be deleted. This cannot be undone!",
        );
        if !dialog.confirm(&prompt) {
            return Ok(Outcome::Cancelled);
        }

        let removed: usize = self.store.load::<Orders>().values().map(|g| g.orders.len()).sum();
        self.store.remove::<Orders>()?;
        self.orders.set(OrdersTable::new());
        info!(removed, "all orders deleted");
        Ok(Outcome::Done(removed))
    }

    // ----- offers -----

    pub fn offers(&self) -> &[Offer] {
        self.offers.get()
    }

    pub fn is_offer_expired(&self, offer: &Offer) -> bool {
        offer.is_expired(self.clock.now())
    }

    pub fn add_offer(&mut self, new: CreateOffer) -> Result<Offer> {
        let title = new.title.trim().to_string();
        if title.is_empty() {
            return Err(CafeError::validation("Please enter the offer title"));
        }
        if new.discount > 100 {
            return Err(CafeError::validation("Discount must be between 0 and 100"));
        }

        let offer = Offer {
            id: super::new_id(),
            title,
            description: new.description.trim().to_string(),
            discount: new.discount,
            valid_until: new.valid_until,
            active: new.active,
            created_at: self.clock.now(),
        };

        let mut offers = self.store.load::<Offers>();
        offers.push(offer.clone());
        self.store.save::<Offers>(&offers)?;
        self.offers.set(offers);

        info!(id = %offer.id, title = %offer.title, "offer added");
        Ok(offer)
    }

    /// Flips `active`. Expired offers stay as they are.
    pub fn toggle_offer(&mut self, dialog: &mut dyn Dialog, id: &str) -> Result<Offer> {
        let now = self.clock.now();
        let mut offers = self.store.load::<Offers>();
        let offer = offers
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| CafeError::not_found(format!("offer {id}")))?;

        if offer.is_expired(now) {
            return Err(super::refuse(dialog, "Toggle offer", "Expired offers cannot be toggled"));
        }
        offer.active = !offer.active;
        let toggled = offer.clone();

        self.store.save::<Offers>(&offers)?;
        self.offers.set(offers);
        info!(id, active = toggled.active, "offer toggled");
        Ok(toggled)
    }

    pub fn delete_offer(&mut self, dialog: &mut dyn Dialog, id: &str) -> Result<Outcome<()>> {
        let mut offers = self.store.load::<Offers>();
        let before = offers.len();
        offers.retain(|o| o.id != id);
        if offers.len() == before {
            return Err(CafeError::not_found(format!("offer {id}")));
        }
        if !dialog.confirm(&Prompt::new("Delete offer", "Are you sure you want to delete this offer?")) {
            return Ok(Outcome::Cancelled);
        }

        self.store.save::<Offers>(&offers)?;
        self.offers.set(offers);
        info!(id, "offer deleted");
        Ok(Outcome::Done(()))
    }
}

impl Reconcile for AdminController {
    fn store(&self) -> &TableStore {
        &self.store
    }

    fn poll_timer(&mut self) -> &mut PollTimer {
        &mut self.poll
    }

    fn showing(&self) -> &'static [Section] {
        match self.tab {
            Section::ManageOrders => &[Section::ManageOrders],
            Section::ManageOffers => &[Section::ManageOffers],
            _ => &[Section::AddProducts],
        }
    }

    fn watched_tables(&self) -> &'static [TableName] {
        &[TableName::Products, TableName::Orders, TableName::Offers]
    }

    fn sections_for(&self, table: TableName) -> &'static [Section] {
        match table {
            TableName::Products => &[Section::AddProducts],
            // product cards show badges
            TableName::Orders => &[Section::ManageOrders, Section::AddProducts],
            TableName::Offers => &[Section::ManageOffers],
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
