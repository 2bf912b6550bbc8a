use serde::{Deserialize, Serialize};

/// A coupon product as listed by the products endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub expiry: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PickerState {
    #[default]
    Closed,
    Loading,
    Open,
    Failed(String),
}

/// Product list cache plus the picker dialog state.
///
/// The list is fetched once; later searches reuse it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
    picker: PickerState,
}

impl ProductCatalog {
    /// Opens the picker. Returns true when the list has to be fetched first.
    pub fn open(&mut self) -> bool {
        if self.products.is_empty() {
            self.picker = PickerState::Loading;
            true
        } else {
            self.picker = PickerState::Open;
            false
        }
    }

    pub fn loaded(&mut self, result: Result<Vec<Product>, String>) {
        match result {
            Ok(products) => {
                self.products = products;
                self.picker = PickerState::Open;
            }
            Err(message) => {
                self.picker = PickerState::Failed(message);
            }
        }
    }

    pub fn close(&mut self) {
        self.picker = PickerState::Closed;
    }

    pub fn find(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn picker(&self) -> &PickerState {
        &self.picker
    }
}
