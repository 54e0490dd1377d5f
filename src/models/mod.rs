pub mod category;
pub mod item;
pub mod product;
pub mod sale_order;
pub mod stock_movement;
pub mod supplier;
pub mod user;

pub use category::{Category, CategoryForm};
pub use item::{InventoryItem, InventoryItemDisplay, ItemForm, NewInventoryItem};
pub use product::{NewProduct, Product, ProductDisplay, ProductForm};
pub use sale_order::{NewSaleOrder, SaleOrder, SaleOrderDisplay, SaleOrderForm, SaleStatus};
pub use stock_movement::{
    MovementType, NewStockMovement, StockMovement, StockMovementDisplay, StockMovementForm,
};
pub use supplier::{NewSupplier, Supplier, SupplierForm};
pub use user::{CreateUser, LoginForm, SignupForm, User};

/// One `<option>` of a select box, pre-computed for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl ToString, label: impl Into<String>, current: &str) -> Self {
        let value = value.to_string();
        let selected = value == current.trim();
        Self {
            value,
            label: label.into(),
            selected,
        }
    }
}

/// Renders an optional id the way a select box submits it.
pub(crate) fn id_field(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_default()
}
