use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    HotDrinks,
    ColdDrinks,
    IceCream,
    Milkshake,
}

impl Category {
    pub fn display_name(self) -> &'static str {
        match self {
            Category::HotDrinks => "Hot drinks",
            Category::ColdDrinks => "Cold drinks",
            Category::IceCream => "Ice cream",
            Category::Milkshake => "Milkshake",
        }
    }

    /// Only hot drinks take sugar.
    pub fn takes_sugar(self) -> bool {
        matches!(self, Category::HotDrinks)
    }
}

/// Spoons of sugar, persisted as the spoon count string.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum Sugar {
    #[serde(rename = "0")]
    None,
    #[serde(rename = "0.5")]
    Half,
    #[serde(rename = "1")]
    One,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
}

impl Sugar {
    pub fn spoons(self) -> f64 {
        match self {
            Sugar::None => 0.0,
            Sugar::Half => 0.5,
            Sugar::One => 1.0,
            Sugar::Two => 2.0,
            Sugar::Three => 3.0,
        }
    }

    pub fn label(self) -> String {
        match self {
            Sugar::None => "No sugar".to_string(),
            other => format!("{} spoon sugar", other.spoons()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub category: Category,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order_count: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProduct {
    pub category: Category,
    pub name: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrashedProduct {
    #[serde(flatten)]
    pub product: Product,
    pub deleted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub discount: u32,
    pub valid_until: NaiveDate,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// `valid_until` is read as midnight UTC of that day.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.valid_until.and_time(chrono::NaiveTime::MIN).and_utc() < now
    }

    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.active && !self.is_expired(now)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOffer {
    pub title: String,
    pub description: String,
    pub discount: u32,
    pub valid_until: NaiveDate,
    pub active: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub product: String,
    pub category: Category,
    pub quantity: u32,
    pub price: f64,
    pub total: f64,
    #[serde(default)]
    pub sugar: Option<Sugar>,
    pub table_number: u32,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub customer_id: String,
    #[serde(default)]
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrder {
    pub product: String,
    pub quantity: u32,
    pub sugar: Option<Sugar>,
    pub table_number: u32,
    pub customer_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct OrderGroup {
    pub orders: Vec<Order>,
}

impl OrderGroup {
    pub fn has_completed(&self) -> bool {
        self.orders.iter().any(|o| o.completed)
    }

    pub fn pending_count(&self) -> usize {
        self.orders.iter().filter(|o| !o.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.orders.len() - self.pending_count()
    }

    pub fn total_value(&self) -> f64 {
        self.orders.iter().map(|o| o.total).sum()
    }
}

/// Orders grouped by product name.
pub type OrdersTable = BTreeMap<String, OrderGroup>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrashedOrderGroup {
    pub id: String,
    pub product_name: String,
    pub orders: Vec<Order>,
    pub total_orders: usize,
    pub total_value: f64,
    pub deleted_at: DateTime<Utc>,
}

/// One row of the trash screen.
#[derive(Debug, Clone, PartialEq)]
pub enum TrashEntry {
    Product(TrashedProduct),
    Orders(TrashedOrderGroup),
}

impl TrashEntry {
    pub fn deleted_at(&self) -> DateTime<Utc> {
        match self {
            TrashEntry::Product(p) => p.deleted_at,
            TrashEntry::Orders(g) => g.deleted_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Badge {
    New,
    Popular,
}

impl Badge {
    pub fn label(self) -> &'static str {
        match self {
            Badge::New => "New",
            Badge::Popular => "Most requested",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    pub product: Product,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct OrdersSummary {
    pub total_orders: usize,
    pub completed_orders: usize,
    pub total_sales: f64,
}

impl OrdersSummary {
    pub fn of(orders: &OrdersTable) -> Self {
        let mut summary = OrdersSummary::default();
        for order in orders.values().flat_map(|g| g.orders.iter()) {
            summary.total_orders += 1;
            summary.total_sales += order.total;
            if order.completed {
                summary.completed_orders += 1;
            }
        }
        summary
    }
}

/// A screen area that renders from one or more tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    // menu page
    Menu,
    Offers,
    // admin page
    AddProducts,
    ManageOrders,
    ManageOffers,
    // trash page
    Trash,
}
