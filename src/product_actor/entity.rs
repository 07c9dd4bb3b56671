use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductId, ProductPatch, ProductStatus};
use super::actions::{ProductAction, ProductActionResult};

impl Entity for Product {
    type Id = ProductId;
    type CreatePayload = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;

    fn id(&self) -> &ProductId { &self.id }

    /// Creates a new active Product from creation parameters.
    fn from_create(id: ProductId, payload: ProductCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            name: payload.name,
            sku: payload.sku,
            stock: payload.stock,
            price: payload.price,
            status: ProductStatus::Active,
        })
    }

    fn on_create(&mut self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name required".to_string());
        }
        check_price(self.price)
    }

    /// Updates the product's price or status. Stock only moves through actions.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), String> {
        if let Some(price) = patch.price {
            check_price(price)?;
            self.price = price;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Errors
    /// `DecrementStock` fails when the amount exceeds the current stock, so
    /// stock never goes below zero.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, String> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::StockLevel(self.stock)),
            ProductAction::DecrementStock(amount) => {
                if amount > self.stock {
                    return Err(format!(
                        "Insufficient stock: requested {}, available {}",
                        amount, self.stock
                    ));
                }
                self.stock -= amount;
                Ok(ProductActionResult::Decremented { remaining: self.stock })
            }
        }
    }
}

fn check_price(price: f64) -> Result<(), String> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(format!("Invalid price: {}", price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle() -> Product {
        Product::from_create(ProductId::from("product_1"), ProductCreate::new("Candle", "CN-7", 5, 12.5)).unwrap()
    }

    #[test]
    fn test_decrement_within_stock() {
        let mut product = candle();
        let result = product.handle_action(ProductAction::DecrementStock(5));
        assert_eq!(result, Ok(ProductActionResult::Decremented { remaining: 0 }));
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_decrement_beyond_stock_is_rejected() {
        let mut product = candle();
        assert!(product.handle_action(ProductAction::DecrementStock(6)).is_err());
        assert_eq!(product.stock, 5);
    }

    #[test]
    fn test_check_stock() {
        let mut product = candle();
        assert_eq!(product.handle_action(ProductAction::CheckStock), Ok(ProductActionResult::StockLevel(5)));
    }

    #[test]
    fn test_create_rejects_blank_name_and_bad_price() {
        let mut blank = Product::from_create(ProductId::from("p"), ProductCreate::new(" ", "X", 1, 1.0)).unwrap();
        assert!(blank.on_create().is_err());

        let mut negative = Product::from_create(ProductId::from("p"), ProductCreate::new("Mug", "X", 1, -1.0)).unwrap();
        assert!(negative.on_create().is_err());
    }

    #[test]
    fn test_update_reprices_and_deactivates_without_touching_stock() {
        let mut product = candle();
        let patch = ProductPatch { price: Some(14.0), status: Some(ProductStatus::Inactive) };
        product.on_update(patch).unwrap();
        assert_eq!(product.price, 14.0);
        assert_eq!(product.status, ProductStatus::Inactive);
        assert_eq!(product.stock, 5);
    }
}
