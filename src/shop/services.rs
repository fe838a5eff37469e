use std::collections::HashMap;

use super::dto::CartItem;
use super::repo::Product;
use crate::error::ApiError;

pub const DEFAULT_CUSTOMER_NAME: &str = "Khách lẻ";
pub const DEFAULT_ORDER_NOTE: &str = "Đơn tạo từ /shopping-list";

/// Name and unit price copied from the product at order time. Later catalog
/// edits must not change this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSnapshot {
    pub product_id: i64,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

/// Validate a cart against the catalog and compute line snapshots plus the
/// order total. Runs entirely before any write.
pub fn price_cart(
    items: &[CartItem],
    products: &HashMap<i64, Product>,
) -> Result<(Vec<LineSnapshot>, i64), ApiError> {
    if items.is_empty() {
        return Err(ApiError::EmptyCart);
    }

    for item in items {
        if item.product_id <= 0 {
            return Err(ApiError::InvalidItem(format!(
                "invalid product id: {}",
                item.product_id
            )));
        }
        if item.qty <= 0 || item.qty > i32::MAX as i64 {
            return Err(ApiError::InvalidItem(format!(
                "invalid quantity {} for product {}",
                item.qty, item.product_id
            )));
        }
    }

    let mut missing: Vec<i64> = items
        .iter()
        .filter(|item| !products.contains_key(&item.product_id))
        .map(|item| item.product_id)
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        missing.dedup();
        return Err(ApiError::MissingProducts(missing));
    }

    let mut lines = Vec::with_capacity(items.len());
    let mut total: i64 = 0;
    for item in items {
        let product = &products[&item.product_id];
        total += item.qty * product.price;
        lines.push(LineSnapshot {
            product_id: product.id,
            product_name: product.name.clone(),
            unit_price: product.price,
            quantity: item.qty as i32,
        });
    }

    Ok((lines, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn product(id: i64, name: &str, price: i64) -> Product {
        Product {
            id,
            name: name.to_string(),
            price,
            unit: None,
            badge: None,
            image: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn catalog(products: Vec<Product>) -> HashMap<i64, Product> {
        products.into_iter().map(|p| (p.id, p)).collect()
    }

    #[test]
    fn totals_and_snapshots() {
        let products = catalog(vec![product(1, "Rau muống", 1000), product(2, "Cá hồi", 25000)]);
        let items = [
            CartItem {
                product_id: 1,
                qty: 2,
            },
            CartItem {
                product_id: 2,
                qty: 1,
            },
        ];
        let (lines, total) = price_cart(&items, &products).expect("valid cart");
        assert_eq!(total, 2 * 1000 + 25000);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            LineSnapshot {
                product_id: 1,
                product_name: "Rau muống".into(),
                unit_price: 1000,
                quantity: 2,
            }
        );
    }

    #[test]
    fn snapshot_is_a_copy_not_a_reference() {
        let mut products = catalog(vec![product(1, "Trứng gà", 3000)]);
        let items = [CartItem {
            product_id: 1,
            qty: 2,
        }];
        let (lines, total) = price_cart(&items, &products).expect("valid cart");

        // catalog edit after pricing
        products.get_mut(&1).unwrap().price = 9999;
        assert_eq!(lines[0].unit_price, 3000);
        assert_eq!(total, 6000);
    }

    #[test]
    fn empty_cart_is_rejected() {
        let products = catalog(vec![product(1, "Gạo", 20000)]);
        match price_cart(&[], &products) {
            Err(ApiError::EmptyCart) => {}
            other => panic!("expected EmptyCart, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_quantity_is_rejected() {
        let products = catalog(vec![product(1, "Gạo", 20000)]);
        for qty in [0, -3] {
            let items = [CartItem {
                product_id: 1,
                qty,
            }];
            match price_cart(&items, &products) {
                Err(ApiError::InvalidItem(_)) => {}
                other => panic!("expected InvalidItem for qty {qty}, got {other:?}"),
            }
        }
    }

    #[test]
    fn non_positive_product_id_is_rejected() {
        let products = catalog(vec![product(1, "Gạo", 20000)]);
        let items = [CartItem {
            product_id: 0,
            qty: 1,
        }];
        assert!(matches!(
            price_cart(&items, &products),
            Err(ApiError::InvalidItem(_))
        ));
    }

    #[test]
    fn unknown_products_are_listed_sorted_and_deduped() {
        let products = catalog(vec![product(1, "Gạo", 20000)]);
        let items = [
            CartItem {
                product_id: 9,
                qty: 1,
            },
            CartItem {
                product_id: 1,
                qty: 1,
            },
            CartItem {
                product_id: 4,
                qty: 2,
            },
            CartItem {
                product_id: 9,
                qty: 3,
            },
        ];
        match price_cart(&items, &products) {
            Err(ApiError::MissingProducts(ids)) => assert_eq!(ids, vec![4, 9]),
            other => panic!("expected MissingProducts, got {other:?}"),
        }
    }

    #[test]
    fn validation_precedes_missing_product_check() {
        // a bad quantity fails even when other ids are unknown
        let products = catalog(vec![]);
        let items = [
            CartItem {
                product_id: 7,
                qty: 0,
            },
            CartItem {
                product_id: 8,
                qty: 1,
            },
        ];
        assert!(matches!(
            price_cart(&items, &products),
            Err(ApiError::InvalidItem(_))
        ));
    }
}
