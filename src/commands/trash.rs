use crate::auth::AdminGate;
use crate::dialog::{Dialog, Outcome, Prompt};
use crate::error::{CafeError, Result};
use crate::models::{OrderGroup, Product, Section, TrashEntry, TrashedOrderGroup, TrashedProduct};
use crate::recycle::{self, RestoreReport};
use crate::sync::{Mirror, PollTimer, Reconcile};
use crate::tables::{TableName, TableStore, TrashedOrders, TrashedProducts};
use std::time::Duration;
use tracing::info;

/// Where the screen goes when the password prompt is dismissed.
pub const BACK_TO: Section = Section::AddProducts;

/// The recycle bin screen.
///
/// Every navigation builds a fresh controller, so the password is asked for
/// on every page load.
pub struct TrashController {
    store: TableStore,
    poll: PollTimer,
    products: Mirror<TrashedProducts>,
    orders: Mirror<TrashedOrders>,
}

impl TrashController {
    pub fn open(
        store: TableStore,
        gate: &AdminGate,
        password: &str,
        poll_interval: Duration,
    ) -> Result<Self> {
        gate.verify(password)?;
        Ok(Self::unlocked(store, poll_interval))
    }

    /// On cancel, `Err` carries the section to navigate back to.
    pub fn open_with_dialog(
        store: TableStore,
        gate: &AdminGate,
        dialog: &mut dyn Dialog,
        poll_interval: Duration,
    ) -> std::result::Result<Self, Section> {
        match gate.prompt(dialog, "Trash") {
            Outcome::Done(()) => Ok(Self::unlocked(store, poll_interval)),
            Outcome::Cancelled => {
                info!(tab = %store.tab(), back_to = ?BACK_TO, "trash prompt dismissed");
                Err(BACK_TO)
            }
        }
    }

    fn unlocked(store: TableStore, poll_interval: Duration) -> Self {
        info!(tab = %store.tab(), "trash screen opened");
        TrashController {
            products: Mirror::load(&store),
            orders: Mirror::load(&store),
            store,
            poll: PollTimer::new(poll_interval),
        }
    }

    pub fn trashed_products(&self) -> &[TrashedProduct] {
        self.products.get()
    }

    pub fn trashed_orders(&self) -> &[TrashedOrderGroup] {
        self.orders.get()
    }

    pub fn is_empty(&self) -> bool {
        self.products.get().is_empty() && self.orders.get().is_empty()
    }

    /// Products and order groups together, most recently deleted first.
    pub fn entries(&self) -> Vec<TrashEntry> {
        let mut entries: Vec<TrashEntry> = self
            .products
            .get()
            .iter()
            .cloned()
            .map(TrashEntry::Product)
            .chain(self.orders.get().iter().cloned().map(TrashEntry::Orders))
            .collect();
        entries.sort_by_key(|e| std::cmp::Reverse(e.deleted_at()));
        entries
    }

    pub fn restore_product(&mut self, dialog: &mut dyn Dialog, id: &str) -> Result<Outcome<Product>> {
        self.require_product(id)?;
        if !dialog.confirm(&Prompt::new("Restore product", "Restore this product?")) {
            return Ok(Outcome::Cancelled);
        }
        let product = recycle::restore_product(&self.store, id)?;
        self.products.refresh(&self.store);
        Ok(Outcome::Done(product))
    }

    pub fn delete_product_permanently(&mut self, dialog: &mut dyn Dialog, id: &str) -> Result<Outcome<()>> {
        self.require_product(id)?;
        let prompt = Prompt::new("Delete permanently", "Delete this product for good? This cannot be undone!");
        if !dialog.confirm(&prompt) {
            return Ok(Outcome::Cancelled);
        }
        recycle::purge_product(&self.store, id)?;
        self.products.refresh(&self.store);
        Ok(Outcome::Done(()))
    }

    pub fn restore_orders(&mut self, dialog: &mut dyn Dialog, id: &str) -> Result<Outcome<OrderGroup>> {
        self.require_orders(id)?;
        if !dialog.confirm(&Prompt::new("Restore orders", "Restore these orders?")) {
            return Ok(Outcome::Cancelled);
        }
        let group = recycle::restore_order_group(&self.store, id)?;
        self.orders.refresh(&self.store);
        Ok(Outcome::Done(group))
    }

    pub fn delete_orders_permanently(&mut self, dialog: &mut dyn Dialog, id: &str) -> Result<Outcome<()>> {
        self.require_orders(id)?;
        let prompt = Prompt::new("Delete permanently", "Delete these orders for good? This cannot be undone!");
        if !dialog.confirm(&prompt) {
            return Ok(Outcome::Cancelled);
        }
        recycle::purge_order_group(&self.store, id)?;
        self.orders.refresh(&self.store);
        Ok(Outcome::Done(()))
    }

    /// With nothing in the trash this only tells the user so.
    pub fn restore_all(&mut self, dialog: &mut dyn Dialog) -> Result<Outcome<RestoreReport>> {
        if self.is_empty() {
            dialog.alert(&Prompt::new("Trash is empty", "There is nothing to restore"));
            return Ok(Outcome::Done(RestoreReport::default()));
        }
        let text = format!(
            "Restore everything ({} products, {} order groups)?",
            self.products.get().len(),
            self.orders.get().len()
        );
        if !dialog.confirm(&Prompt::new("Restore all", text)) {
            return Ok(Outcome::Cancelled);
        }

        let report = recycle::restore_all(&self.store)?;
        self.refresh_bins();
        Ok(Outcome::Done(report))
    }

    /// Irreversible. Returns the (products, order groups) removed.
    pub fn empty_trash(&mut self, dialog: &mut dyn Dialog) -> Result<Outcome<(usize, usize)>> {
        if self.is_empty() {
            dialog.alert(&Prompt::new("Trash is empty", "There is nothing to delete"));
            return Ok(Outcome::Done((0, 0)));
        }
        let text = format!(
            "Delete everything ({} products, {} order groups) for good? This cannot be undone!",
            self.products.get().len(),
            self.orders.get().len()
        );
        if !dialog.confirm(&Prompt::new("Empty trash", text)) {
            return Ok(Outcome::Cancelled);
        }

        let removed = recycle::empty_trash(&self.store)?;
        self.refresh_bins();
        Ok(Outcome::Done(removed))
    }

    fn refresh_bins(&mut self) {
        self.products.refresh(&self.store);
        self.orders.refresh(&self.store);
    }

    fn require_product(&self, id: &str) -> Result<()> {
        if self.store.load::<TrashedProducts>().iter().any(|p| p.product.id == id) {
            Ok(())
        } else {
            Err(CafeError::not_found(format!("trashed product {id}")))
        }
    }

    fn require_orders(&self, id: &str) -> Result<()> {
        if self.store.load::<TrashedOrders>().iter().any(|g| g.id == id) {
            Ok(())
        } else {
            Err(CafeError::not_found(format!("trashed orders {id}")))
        }
    }
}

impl Reconcile for TrashController {
    fn store(&self) -> &TableStore {
        &self.store
    }

    fn poll_timer(&mut self) -> &mut PollTimer {
        &mut self.poll
    }

    fn showing(&self) -> &'static [Section] {
        &[Section::Trash]
    }

    fn watched_tables(&self) -> &'static [TableName] {
        &[TableName::TrashedProducts, TableName::TrashedOrders]
    }

    fn sections_for(&self, table: TableName) -> &'static [Section] {
        match table {
            TableName::TrashedProducts | TableName::TrashedOrders => &[Section::Trash],
            _ => &[],
        }
    }

    fn reload(&mut self, table: TableName) -> bool {
        match table {
            TableName::TrashedProducts => self.products.refresh(&self.store),
            TableName::TrashedOrders => self.orders.refresh(&self.store),
            _ => false,
        }
    }
}
