use serde::{Deserialize, Serialize};
use super::{Product, ProductId};

/// One requested (product, quantity) pair of an order.
///
/// `quantity` is signed so that bad input reaches validation instead of
/// failing to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl OrderItem {
    pub fn new(product_id: impl Into<ProductId>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub product_id: ProductId,
    pub product_name: String,
    pub old_stock: u32,
    pub new_stock: u32,
    pub reduced_quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsufficientStockItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub requested_quantity: i64,
    pub available_stock: u32,
}

impl StockUpdate {
    /// Plans the decrement of `quantity` units from `product`, or reports the
    /// shortage when the product cannot cover it.
    pub fn plan(product: &Product, quantity: i64) -> Result<Self, InsufficientStockItem> {
        match u32::try_from(quantity) {
            Ok(reduced) if reduced <= product.stock => Ok(Self {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                old_stock: product.stock,
                new_stock: product.stock - reduced,
                reduced_quantity: reduced,
            }),
            _ => Err(InsufficientStockItem {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                requested_quantity: quantity,
                available_stock: product.stock,
            }),
        }
    }
}

/// Outcome of processing one order, as reported to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessOrderResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updated_items: Vec<StockUpdate>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insufficient_stock_items: Vec<InsufficientStockItem>,
    pub total_items_updated: usize,
}

impl ProcessOrderResponse {
    pub fn fulfilled(updated_items: Vec<StockUpdate>) -> Self {
        Self {
            success: true,
            message: "Order processed successfully! Stock updated for all items.".to_string(),
            total_items_updated: updated_items.len(),
            updated_items,
            insufficient_stock_items: Vec::new(),
        }
    }

    pub fn insufficient(insufficient_stock_items: Vec<InsufficientStockItem>) -> Self {
        Self {
            success: false,
            message: "Insufficient stock for some items".to_string(),
            updated_items: Vec::new(),
            insufficient_stock_items,
            total_items_updated: 0,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            updated_items: Vec::new(),
            insufficient_stock_items: Vec::new(),
            total_items_updated: 0,
        }
    }
}
