use serde::Serialize;

use crate::nutrition::MealSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductKind {
    Shake,
    Tea,
    Supplement,
    Snack,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupplementProduct {
    pub id: &'static str,
    pub name: &'static str,
    pub name_sq: &'static str,
    pub kind: ProductKind,
    pub calories: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub serving_size: &'static str,
    pub meal_timing: &'static [MealSlot],
    pub preparation: &'static str,
    pub benefits: &'static [&'static str],
}

use MealSlot::{Breakfast, Dinner, Lunch, Snack};

const SHAKE_BENEFITS: &[&str] = &[
    "Meal replacement",
    "High protein",
    "21 essential nutrients",
    "Weight management",
];
const SHAKE_PREPARATION: &str =
    "Mix 2 scoops with 250ml nonfat milk or soymilk. Blend or shake well.";

static PRODUCTS: [SupplementProduct; 7] = [
    SupplementProduct {
        id: "formula1_vanilla",
        name: "Formula 1 Nutritional Shake Mix - Vanilla",
        name_sq: "Formula 1 Përzierje Nutritive - Vanilje",
        kind: ProductKind::Shake,
        calories: 170,
        protein: 17.0,
        carbs: 13.0,
        fat: 2.0,
        serving_size: "2 scoops + 250ml milk",
        meal_timing: &[Breakfast, Lunch, Dinner],
        preparation: SHAKE_PREPARATION,
        benefits: SHAKE_BENEFITS,
    },
    SupplementProduct {
        id: "formula1_chocolate",
        name: "Formula 1 Nutritional Shake Mix - Chocolate",
        name_sq: "Formula 1 Përzierje Nutritive - Çokollatë",
        kind: ProductKind::Shake,
        calories: 170,
        protein: 17.0,
        carbs: 13.0,
        fat: 2.0,
        serving_size: "2 scoops + 250ml milk",
        meal_timing: &[Breakfast, Lunch, Dinner],
        preparation: SHAKE_PREPARATION,
        benefits: SHAKE_BENEFITS,
    },
    SupplementProduct {
        id: "protein_powder",
        name: "Personalized Protein Powder",
        name_sq: "Pluhur Proteini i Personalizuar",
        kind: ProductKind::Supplement,
        calories: 20,
        protein: 5.0,
        carbs: 0.0,
        fat: 0.0,
        serving_size: "1 tablespoon",
        meal_timing: &[Breakfast, Lunch, Dinner, Snack],
        preparation: "Add to shakes, smoothies, or meals to increase protein content.",
        benefits: &["Additional protein", "Muscle support", "Versatile usage"],
    },
    SupplementProduct {
        id: "herbal_tea",
        name: "Herbal Tea Concentrate",
        name_sq: "Koncentrat Çaji Bimor",
        kind: ProductKind::Tea,
        calories: 5,
        protein: 0.0,
        carbs: 1.0,
        fat: 0.0,
        serving_size: "1 teaspoon + 250ml water",
        meal_timing: &[Breakfast, Snack],
        preparation: "Mix 1 teaspoon with 250ml hot water. Steep for 3-5 minutes.",
        benefits: &["Metabolism support", "Antioxidants", "Natural energy"],
    },
    SupplementProduct {
        id: "afresh_energy",
        name: "Afresh Energy Drink",
        name_sq: "Pije Energjie Afresh",
        kind: ProductKind::Tea,
        calories: 15,
        protein: 0.0,
        carbs: 4.0,
        fat: 0.0,
        serving_size: "1 sachet + 250ml water",
        meal_timing: &[Breakfast, Snack],
        preparation: "Mix 1 sachet with 250ml cold water. Stir well.",
        benefits: &["Natural energy", "Caffeine", "Tulsi extract", "Low calorie"],
    },
    SupplementProduct {
        id: "aloe_concentrate",
        name: "Herbal Aloe Concentrate",
        name_sq: "Koncentrat Aloe Bimor",
        kind: ProductKind::Supplement,
        calories: 10,
        protein: 0.0,
        carbs: 2.0,
        fat: 0.0,
        serving_size: "2 capfuls + 250ml water",
        meal_timing: &[Breakfast, Lunch, Dinner],
        preparation: "Mix 2 capfuls with 250ml water. Drink throughout the day.",
        benefits: &["Digestive health", "Hydration", "Nutrient absorption"],
    },
    SupplementProduct {
        id: "protein_bar",
        name: "Protein Bar",
        name_sq: "Biskotë Proteini",
        kind: ProductKind::Snack,
        calories: 140,
        protein: 10.0,
        carbs: 15.0,
        fat: 4.0,
        serving_size: "1 bar",
        meal_timing: &[Snack],
        preparation: "Ready to eat. Store in cool, dry place.",
        benefits: &["Convenient protein", "Portable snack", "Satisfying"],
    },
];

/// Fixed product table; built at compile time and never mutated.
pub struct SupplementCatalog {
    products: &'static [SupplementProduct],
}

static BUILTIN: SupplementCatalog = SupplementCatalog {
    products: &PRODUCTS,
};

impl SupplementCatalog {
    pub fn builtin() -> &'static SupplementCatalog {
        &BUILTIN
    }

    pub fn products(&self) -> &'static [SupplementProduct] {
        self.products
    }

    pub fn get(&self, id: &str) -> Option<&'static SupplementProduct> {
        self.products.iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let catalog = SupplementCatalog::builtin();
        let mut ids: Vec<_> = catalog.products().iter().map(|p| p.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), catalog.products().len());
    }

    #[test]
    fn lookup_by_id() {
        let bar = SupplementCatalog::builtin().get("protein_bar").unwrap();
        assert_eq!(bar.calories, 140);
        assert_eq!(bar.name_sq, "Biskotë Proteini");
        assert!(SupplementCatalog::builtin().get("unknown").is_none());
    }
}
