//! Ordering session
//!
//! One retailer's browsing-and-ordering session: the loaded catalog snapshot,
//! the currently selected style and the cart. Submitting borrows the session
//! immutably, so the cart cannot change while an order is in flight.

use crate::cart::{Cart, CartError, LineChange, SummaryRow};
use crate::catalog::{
    CatalogCache, CatalogError, CatalogLoad, CatalogManager, CatalogSource, default_item,
    filter_items, sort_for_display,
};
use crate::order::{OrderError, OrderService};
use crate::remote::RemoteStore;
use crate::ClientConfig;
use shared::models::{ColorSelections, SizeQuantities};
use shared::{AppError, CatalogItem, ErrorCode, Order};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrderingError {
    #[error("Style {0} is not in the catalog")]
    StyleNotFound(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl OrderingError {
    pub fn code(&self) -> ErrorCode {
        match self {
            OrderingError::StyleNotFound(_) => ErrorCode::StyleNotFound,
            OrderingError::Cart(e) => e.code(),
            OrderingError::Catalog(e) => e.code(),
            OrderingError::Order(e) => e.code(),
        }
    }
}

impl From<OrderingError> for AppError {
    fn from(err: OrderingError) -> Self {
        match err {
            OrderingError::Cart(e) => e.into(),
            OrderingError::Catalog(e) => e.into(),
            OrderingError::Order(e) => e.into(),
            other => AppError::with_message(other.code(), other.to_string()),
        }
    }
}

pub struct OrderingSession<R> {
    catalog: CatalogManager<R>,
    orders: OrderService<R>,
    items: Vec<CatalogItem>,
    selected: Option<String>,
    cart: Cart,
    priority_styles: Vec<String>,
    default_style: String,
}

impl<R: RemoteStore> OrderingSession<R> {
    pub fn new(remote: Arc<R>, cache: CatalogCache, config: &ClientConfig) -> Self {
        Self {
            catalog: CatalogManager::new(remote.clone(), cache),
            orders: OrderService::new(remote),
            items: Vec::new(),
            selected: None,
            cart: Cart::new(),
            priority_styles: config.priority_styles.clone(),
            default_style: config.default_style.clone(),
        }
    }

    /// Load the catalog and select the default style
    pub async fn load_catalog(&mut self) -> Result<CatalogSource, OrderingError> {
        let CatalogLoad { items, source } = self.catalog.initialize_items().await?;
        self.replace_items(items);
        Ok(source)
    }

    /// Manual refresh; the current items stay in place on failure
    pub async fn refresh_catalog(&mut self) -> Result<(), OrderingError> {
        let items = self.catalog.sync_now().await?;
        self.replace_items(items);
        Ok(())
    }

    fn replace_items(&mut self, items: Vec<CatalogItem>) {
        self.items = items;
        let keep = self
            .selected
            .as_deref()
            .is_some_and(|style| self.items.iter().any(|i| i.name == style));
        if !keep {
            self.selected = default_item(&self.items, &self.default_style).map(|i| i.name.clone());
        }
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Items in list order (priority styles first)
    pub fn list_items(&self) -> Vec<&CatalogItem> {
        sort_for_display(&self.items, &self.priority_styles)
    }

    pub fn search(&self, query: &str) -> Vec<&CatalogItem> {
        filter_items(&self.items, query, &self.priority_styles)
    }

    pub fn item(&self, style: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.name == style)
    }

    pub fn selected_item(&self) -> Option<&CatalogItem> {
        self.selected.as_deref().and_then(|style| self.item(style))
    }

    pub fn select(&mut self, style: &str) -> Result<&CatalogItem, OrderingError> {
        let index = self
            .items
            .iter()
            .position(|i| i.name == style)
            .ok_or_else(|| OrderingError::StyleNotFound(style.to_string()))?;
        self.selected = Some(style.to_string());
        Ok(&self.items[index])
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Add a selection for a catalog style
    pub fn add_to_cart(&mut self, style: &str, selection: &ColorSelections) -> Result<(), OrderingError> {
        if self.item(style).is_none() {
            return Err(OrderingError::StyleNotFound(style.to_string()));
        }
        self.cart.add_to_cart(style, selection)?;
        Ok(())
    }

    pub fn edit_line(
        &mut self,
        index: usize,
        color: &str,
        sizes: &SizeQuantities,
    ) -> Result<LineChange, OrderingError> {
        Ok(self.cart.edit_line(index, color, sizes)?)
    }

    pub fn delete_color_from_line(&mut self, index: usize, color: &str) -> Result<LineChange, OrderingError> {
        Ok(self.cart.delete_color_from_line(index, color)?)
    }

    pub fn summary_rows(&self) -> Vec<SummaryRow> {
        self.cart.summary_rows()
    }

    pub fn total_quantity(&self) -> u64 {
        self.cart.total_quantity()
    }

    pub fn empty_cart(&mut self) {
        self.cart.empty();
    }

    /// Submit the cart; the cart is kept until [`Self::empty_cart`] is called
    pub async fn submit_order(&self, party_name: &str, note: &str) -> Result<Order, OrderingError> {
        Ok(self.orders.submit_order(&self.cart, party_name, note).await?)
    }
}
