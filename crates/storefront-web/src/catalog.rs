//! Product catalog

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: &'static str,
    pub name: &'static str,
    pub blurb: &'static str,
    pub price: Decimal,
}

/// Products offered in the store
pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: "vitalidad-perro",
            name: "Vitalidad Canina",
            blurb: "Suplemento diario para articulaciones y pelaje.",
            price: dec!(349.00),
        },
        Product {
            id: "calma-gato",
            name: "Calma Felina",
            blurb: "Fórmula herbal para gatos ansiosos.",
            price: dec!(289.50),
        },
        Product {
            id: "digest-plus",
            name: "Digest Plus",
            blurb: "Probióticos naturales para perros y gatos.",
            price: dec!(250.50),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_unique() {
        let products = products();
        let ids: HashSet<_> = products.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), products.len());
        assert!(products.iter().all(|p| p.price > Decimal::ZERO));
    }
}
