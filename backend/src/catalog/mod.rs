//! Item catalog
//!
//! Read-only lookup of catalog group → item → price distribution. Baskets are
//! drawn from here. Group and item order is significant: a uniform item draw
//! indexes into the group's item list, so reordering changes seeded output.

use serde::{Deserialize, Serialize};

/// A single purchasable item and its price distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Item name as it appears in transaction descriptions
    pub name: String,

    /// Mean price (currency units)
    pub mean: f64,

    /// Standard deviation of the price (currency units)
    pub std_dev: f64,
}

impl CatalogItem {
    pub fn new(name: impl Into<String>, mean: f64, std_dev: f64) -> Self {
        Self {
            name: name.into(),
            mean,
            std_dev,
        }
    }
}

/// Named group of items (e.g. raw ingredients, maintenance consumables)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogGroup {
    pub name: String,
    pub items: Vec<CatalogItem>,
}

/// Ordered collection of item groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub groups: Vec<CatalogGroup>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    pub fn new(groups: Vec<CatalogGroup>) -> Self {
        Self { groups }
    }

    /// Look up a group by name
    pub fn group(&self, name: &str) -> Option<&CatalogGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Look up an item by group and item name
    pub fn item(&self, group: &str, item: &str) -> Option<&CatalogItem> {
        self.group(group)?.items.iter().find(|i| i.name == item)
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Check structural soundness: unique group names, no empty group, and
    /// finite, non-negative price parameters.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = std::collections::HashSet::new();
        for group in &self.groups {
            if !seen.insert(group.name.as_str()) {
                return Err(format!("duplicate catalog group: {}", group.name));
            }
            if group.items.is_empty() {
                return Err(format!("catalog group '{}' has no items", group.name));
            }
            for item in &group.items {
                if !item.mean.is_finite() || !item.std_dev.is_finite() {
                    return Err(format!(
                        "item '{}' in group '{}' has a non-finite price parameter",
                        item.name, group.name
                    ));
                }
                if item.std_dev < 0.0 {
                    return Err(format!(
                        "item '{}' in group '{}' has negative std_dev {}",
                        item.name, group.name, item.std_dev
                    ));
                }
            }
        }
        Ok(())
    }

    /// The standard café catalog
    pub fn standard() -> Self {
        fn group(name: &str, items: &[(&str, f64, f64)]) -> CatalogGroup {
            CatalogGroup {
                name: name.to_string(),
                items: items
                    .iter()
                    .map(|(n, mean, sd)| CatalogItem::new(*n, *mean, *sd))
                    .collect(),
            }
        }

        Self::new(vec![
            group(
                BAHAN_BAKU,
                &[
                    ("susu", 22_000.0, 7_000.0),
                    ("gula", 16_000.0, 4_000.0),
                    ("kopi", 25_000.0, 10_000.0),
                    ("telur", 28_000.0, 9_000.0),
                    ("indomie", 3_500.0, 500.0),
                    ("pasar", 175_000.0, 75_000.0),
                    ("toko ibu", 150_000.0, 60_000.0),
                    ("dampit", 40_000.0, 15_000.0),
                    ("roti", 18_000.0, 5_000.0),
                    ("es batu", 10_000.0, 2_000.0),
                    ("air galon", 7_000.0, 1_000.0),
                ],
            ),
            group(
                OPERASIONAL_PENDUKUNG,
                &[
                    ("lpg", 23_000.0, 1_000.0),
                    ("sabun", 15_000.0, 5_000.0),
                    ("minyak", 28_000.0, 8_000.0),
                    ("tisue", 12_000.0, 4_000.0),
                    ("bensin", 15_000.0, 5_000.0),
                ],
            ),
            group(
                MAINTENANCE_HABIS_PAKAI,
                &[
                    ("baterai", 15_000.0, 5_000.0),
                    ("pengharum ruangan", 30_000.0, 10_000.0),
                    ("pupuk tanaman", 50_000.0, 15_000.0),
                    ("makanan kucing", 25_000.0, 5_000.0),
                    ("alat kebersihan", 20_000.0, 8_000.0),
                    ("sponge cuci piring", 5_000.0, 2_000.0),
                    ("sabun cuci piring", 15_000.0, 5_000.0),
                    ("tissue toilet", 20_000.0, 8_000.0),
                    ("perbaikan meja / kursi", 40_000.0, 10_000.0),
                    ("pengadaan gelas pecah", 30_000.0, 20_000.0),
                ],
            ),
            group(
                MAINTENANCE_ALAT,
                &[
                    ("ember", 35_000.0, 10_000.0),
                    ("gagang pel", 40_000.0, 15_000.0),
                    ("sapu", 25_000.0, 8_000.0),
                    ("perbaikan elektrikal", 65_000.0, 15_000.0),
                    ("perbaikan kecil ruang", 80_000.0, 30_000.0),
                ],
            ),
            group(
                LAIN_LAIN,
                &[
                    ("ATK", 25_000.0, 10_000.0),
                    ("fotokopi", 15_000.0, 5_000.0),
                    ("biaya tak terduga", 50_000.0, 25_000.0),
                    ("bayar pengamen", 1_500.0, 500.0),
                    ("sumbangan kecil", 10_000.0, 5_000.0),
                    ("pembelian impulsif", 20_000.0, 10_000.0),
                ],
            ),
        ])
    }
}

/// Raw ingredients
pub const BAHAN_BAKU: &str = "BAHAN_BAKU";
/// Supporting operational supplies (gas, soap, fuel)
pub const OPERASIONAL_PENDUKUNG: &str = "OPERASIONAL_PENDUKUNG";
/// Maintenance consumables
pub const MAINTENANCE_HABIS_PAKAI: &str = "MAINTENANCE_HABIS_PAKAI";
/// Maintenance tools and repairs
pub const MAINTENANCE_ALAT: &str = "MAINTENANCE_ALAT";
/// Miscellaneous
pub const LAIN_LAIN: &str = "LAIN_LAIN";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = Catalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.groups.len(), 5);
        assert_eq!(catalog.group(BAHAN_BAKU).unwrap().items.len(), 11);
        assert_eq!(catalog.group(LAIN_LAIN).unwrap().items.len(), 6);
    }

    #[test]
    fn test_item_lookup() {
        let catalog = Catalog::standard();
        let lpg = catalog.item(OPERASIONAL_PENDUKUNG, "lpg").unwrap();
        assert_eq!(lpg.mean, 23_000.0);
        assert!(catalog.item(OPERASIONAL_PENDUKUNG, "kopi").is_none());
        assert!(catalog.group("NOPE").is_none());
    }

    #[test]
    fn test_validate_rejects_empty_group() {
        let catalog = Catalog::new(vec![CatalogGroup {
            name: "EMPTY".to_string(),
            items: vec![],
        }]);
        let err = catalog.validate().unwrap_err();
        assert!(err.contains("EMPTY"));
    }

    #[test]
    fn test_validate_rejects_negative_spread() {
        let catalog = Catalog::new(vec![CatalogGroup {
            name: "G".to_string(),
            items: vec![CatalogItem::new("x", 10.0, -1.0)],
        }]);
        assert!(catalog.validate().is_err());
    }

    #[test]
    fn test_catalog_json_roundtrip_preserves_order() {
        let catalog = Catalog::standard();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back, catalog);
        let names: Vec<_> = back.group_names().collect();
        assert_eq!(names[0], BAHAN_BAKU);
        assert_eq!(names[4], LAIN_LAIN);
    }
}
