use crate::db::Storage;
use crate::error::Result;
use crate::models::{Offer, OrdersTable, Product, TrashedOrderGroup, TrashedProduct};
use crate::sync::{ChangeBus, ChangeEvent, LocalBus, TabId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use tracing::{info, warn};

pub const DEFAULT_KEY_PREFIX: &str = "swy_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableName {
    Products,
    Orders,
    Offers,
    TrashedProducts,
    TrashedOrders,
}

impl TableName {
    pub fn as_str(self) -> &'static str {
        match self {
            TableName::Products => "products",
            TableName::Orders => "orders",
            TableName::Offers => "offers",
            TableName::TrashedProducts => "trashed_products",
            TableName::TrashedOrders => "trashed_orders",
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named table and the shape stored under its key.
pub trait Table {
    const NAME: TableName;
    type Value: Serialize + DeserializeOwned + Default + Clone;
}

pub struct Products;
pub struct Orders;
pub struct Offers;
pub struct TrashedProducts;
pub struct TrashedOrders;

impl Table for Products {
    const NAME: TableName = TableName::Products;
    type Value = Vec<Product>;
}

impl Table for Orders {
    const NAME: TableName = TableName::Orders;
    type Value = OrdersTable;
}

impl Table for Offers {
    const NAME: TableName = TableName::Offers;
    type Value = Vec<Offer>;
}

impl Table for TrashedProducts {
    const NAME: TableName = TableName::TrashedProducts;
    type Value = Vec<TrashedProduct>;
}

impl Table for TrashedOrders {
    const NAME: TableName = TableName::TrashedOrders;
    type Value = Vec<TrashedOrderGroup>;
}

/// Everything tabs of one installation share: the storage and the bus.
#[derive(Clone)]
pub struct SharedStore {
    storage: Arc<dyn Storage>,
    bus: Arc<dyn ChangeBus>,
    prefix: String,
}

impl SharedStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self::with_bus(storage, Arc::new(LocalBus::new()), DEFAULT_KEY_PREFIX)
    }

    pub fn with_bus(storage: Arc<dyn Storage>, bus: Arc<dyn ChangeBus>, prefix: &str) -> Self {
        SharedStore {
            storage,
            bus,
            prefix: prefix.to_string(),
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// A new tab: its own identity on the bus and its own inbox.
    pub fn open_tab(&self) -> TableStore {
        let subscription = self.bus.subscribe();
        info!(tab = %subscription.tab, "tab opened");
        TableStore {
            storage: Arc::clone(&self.storage),
            bus: Arc::clone(&self.bus),
            prefix: self.prefix.clone(),
            tab: subscription.tab,
            inbox: subscription.inbox,
        }
    }
}

/// One tab's handle on the shared tables.
pub struct TableStore {
    storage: Arc<dyn Storage>,
    bus: Arc<dyn ChangeBus>,
    prefix: String,
    tab: TabId,
    inbox: Receiver<ChangeEvent>,
}

impl TableStore {
    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn key(&self, table: TableName) -> String {
        format!("{}{}", self.prefix, table.as_str())
    }

    /// Missing, unreadable and malformed tables all load as empty.
    pub fn load<T: Table>(&self) -> T::Value {
        let key = self.key(T::NAME);
        let raw = match self.storage.get_item(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::Value::default(),
            Err(e) => {
                warn!(%key, error = %e, "failed to read table, treating as empty");
                return T::Value::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            info!(%key, error = %e, "malformed table data, treating as empty");
            T::Value::default()
        })
    }

    pub fn save<T: Table>(&self, value: &T::Value) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.storage.set_item(&self.key(T::NAME), &raw)?;
        self.notify(T::NAME, Some(raw));
        Ok(())
    }

    /// Drops the table's key. It loads as empty afterwards.
    pub fn remove<T: Table>(&self) -> Result<()> {
        self.storage.remove_item(&self.key(T::NAME))?;
        self.notify(T::NAME, None);
        Ok(())
    }

    /// Writes `first` then `second` as one logical operation. `second` is
    /// never committed without `first`.
    pub fn save_pair<A: Table, B: Table>(&self, first: &A::Value, second: &B::Value) -> Result<()> {
        let first_raw = serde_json::to_string(first)?;
        let second_raw = serde_json::to_string(second)?;
        let first_key = self.key(A::NAME);
        let second_key = self.key(B::NAME);

        self.storage.set_items(&[
            (first_key.as_str(), first_raw.as_str()),
            (second_key.as_str(), second_raw.as_str()),
        ])?;

        self.notify(A::NAME, Some(first_raw));
        self.notify(B::NAME, Some(second_raw));
        Ok(())
    }

    /// Raw stored value, for callers that diff serialized forms.
    pub fn raw(&self, table: TableName) -> Option<String> {
        self.storage.get_item(&self.key(table)).ok().flatten()
    }

    /// Broadcasts from other tabs received since the last call.
    pub fn take_changes(&self) -> Vec<ChangeEvent> {
        self.inbox.try_iter().collect()
    }

    fn notify(&self, table: TableName, new_value: Option<String>) {
        self.bus.publish(self.tab, ChangeEvent { table, new_value });
    }
}

impl Drop for TableStore {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.tab);
    }
}
