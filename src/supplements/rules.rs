use serde::Serialize;

use super::catalog::{SupplementCatalog, SupplementProduct};
use crate::{
    nutrition::{Goal, MealSlot},
    recipes::Recipe,
};

/// How supplements meet the regular meal; fixed per goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CombinationPolicy {
    Replace,
    Augment,
}

impl CombinationPolicy {
    pub fn for_goal(goal: Goal) -> Self {
        match goal {
            Goal::WeightLoss => CombinationPolicy::Replace,
            Goal::Maintenance | Goal::MuscleGain => CombinationPolicy::Augment,
        }
    }
}

const SNACK_NOTE: &str = "Ushqimet e lehta Herbalife ofrojnë ushqim të përshtatshëm midis vakteve.";

/// Product ids and the Albanian note for one table cell.
pub fn table_entry(goal: Goal, slot: MealSlot) -> (&'static [&'static str], &'static str) {
    use Goal::*;
    use MealSlot::*;
    match (goal, slot) {
        (WeightLoss, Breakfast) => (
            &["formula1_vanilla", "herbal_tea"],
            "Formula 1 për mëngjes ofron kalori të kontrolluara dhe lëndë ushqyese thelbësore. Çaji bimor mbështet metabolizmin.",
        ),
        (WeightLoss, Lunch) => (
            &["formula1_chocolate", "aloe_concentrate"],
            "Formula 1 për drekë ndihmon në kontrollin e kalorive duke ofruar lëndë ushqyese thelbësore.",
        ),
        (WeightLoss, Dinner) => (
            &["protein_powder"],
            "Një darkë e lehtë me pluhur proteini ruan masën muskulore gjatë humbjes së peshës.",
        ),
        (WeightLoss, Snack) => (&["protein_bar", "afresh_energy"], SNACK_NOTE),
        (Maintenance, Breakfast) => (
            &["formula1_vanilla", "herbal_tea"],
            "Formula 1 ofron një fillim ushqyes për ditën tuaj me proteinë cilësore të lartë.",
        ),
        (Maintenance, Lunch) => (
            &["protein_powder"],
            "Shtoni pluhurin e proteinës në drekën tuaj të rregullt për proteinë shtesë.",
        ),
        (Maintenance, Dinner) => (
            &["aloe_concentrate"],
            "Koncentrati i aloe mbështet shëndetin tretësor dhe thithjen e lëndëve ushqyese.",
        ),
        (Maintenance, Snack) => (&["protein_bar"], SNACK_NOTE),
        (MuscleGain, Breakfast) => (
            &["formula1_chocolate", "protein_powder"],
            "Formula 1 me pluhur proteini jep proteinë shtesë për rritjen e muskujve.",
        ),
        (MuscleGain, Lunch) => (
            &["formula1_vanilla", "protein_powder"],
            "Formula 1 me pluhur proteini jep proteinë shtesë për rritjen e muskujve.",
        ),
        (MuscleGain, Dinner) => (
            &["protein_powder"],
            "Pluhuri i proteinës me darkën mbështet rikuperimin e muskujve.",
        ),
        (MuscleGain, Snack) => (&["protein_bar", "protein_powder"], SNACK_NOTE),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub goal: Goal,
    pub slot: MealSlot,
    pub policy: CombinationPolicy,
    pub products: Vec<&'static SupplementProduct>,
    pub note: &'static str,
    pub total_calories: u32,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
}

impl Recommendation {
    fn new(
        goal: Goal,
        slot: MealSlot,
        products: Vec<&'static SupplementProduct>,
        note: &'static str,
    ) -> Self {
        Self {
            goal,
            slot,
            policy: CombinationPolicy::for_goal(goal),
            total_calories: products.iter().map(|p| p.calories).sum(),
            total_protein: products.iter().map(|p| p.protein).sum(),
            total_carbs: products.iter().map(|p| p.carbs).sum(),
            total_fat: products.iter().map(|p| p.fat).sum(),
            products,
            note,
        }
    }

    pub fn product_ids(&self) -> Vec<String> {
        self.products.iter().map(|p| p.id.to_string()).collect()
    }
}

/// The table cell for `(goal, slot)`, every id resolved.
pub fn recommend(catalog: &SupplementCatalog, goal: Goal, slot: MealSlot) -> Recommendation {
    let (ids, note) = table_entry(goal, slot);
    let products = ids.iter().filter_map(|id| catalog.get(id)).collect();
    Recommendation::new(goal, slot, products, note)
}

/// Table cell restricted to products within 80% of the slot budget,
/// at most two.
pub fn recommend_within(
    catalog: &SupplementCatalog,
    goal: Goal,
    slot: MealSlot,
    target_kcal: u32,
) -> Recommendation {
    let full = recommend(catalog, goal, slot);
    let budget = target_kcal as f64 * 0.8;
    let products = full
        .products
        .into_iter()
        .filter(|p| p.calories as f64 <= budget)
        .take(2)
        .collect();
    Recommendation::new(goal, slot, products, full.note)
}

/// Parses free-form labels; `None` means "no supplement".
pub fn recommend_labels(
    catalog: &SupplementCatalog,
    goal: &str,
    slot: &str,
) -> Option<Recommendation> {
    let goal = goal.parse::<Goal>().ok()?;
    let slot = slot.parse::<MealSlot>().ok()?;
    Some(recommend(catalog, goal, slot))
}

fn product_line(p: &SupplementProduct) -> String {
    format!("🥤 {} ({})", p.name_sq, p.serving_size)
}

fn preparation_step(p: &SupplementProduct) -> String {
    format!("Përgatit {}: {}", p.name_sq, p.preparation)
}

fn supplement_meal(rec: &Recommendation) -> Recipe {
    let names: Vec<&str> = rec.products.iter().map(|p| p.name_sq).collect();
    let mut steps: Vec<String> = rec.products.iter().map(|p| preparation_step(p)).collect();
    steps.push(format!("💡 {}", rec.note));
    Recipe {
        name: format!("Herbalife {}", names.join(" + ")),
        meal_type: rec.slot,
        kcal: rec.total_calories,
        protein: rec.total_protein,
        carbs: rec.total_carbs,
        fat: rec.total_fat,
        tags: vec!["herbalife".into(), "meal_replacement".into()],
        ingredients: rec.products.iter().map(|p| product_line(p)).collect(),
        steps,
        supplements: rec.product_ids(),
        skill_notes: None,
    }
}

/// Applies the goal's policy. An empty recommendation leaves the regular
/// meal untouched.
pub fn combine(regular: Option<&Recipe>, rec: &Recommendation) -> Option<Recipe> {
    if rec.products.is_empty() {
        return regular.cloned();
    }
    match (rec.policy, regular) {
        (CombinationPolicy::Replace, _) | (CombinationPolicy::Augment, None) => {
            Some(supplement_meal(rec))
        }
        (CombinationPolicy::Augment, Some(meal)) => {
            let names: Vec<&str> = rec.products.iter().map(|p| p.name_sq).collect();
            let mut combined = meal.clone();
            combined.name = format!("{} + {}", meal.name, names.join(" + "));
            combined.kcal += rec.total_calories;
            combined.protein += rec.total_protein;
            combined.carbs += rec.total_carbs;
            combined.fat += rec.total_fat;
            combined.tags.extend(["herbalife".to_string(), "integrated".to_string()]);
            combined
                .ingredients
                .extend(rec.products.iter().map(|p| product_line(p)));
            combined
                .steps
                .extend(rec.products.iter().map(|p| preparation_step(p)));
            combined.steps.push(format!("💡 {}", rec.note));
            combined.supplements.extend(rec.product_ids());
            Some(combined)
        }
    }
}

/// Label-level entry point: unknown goal or slot returns the regular meal.
pub fn combine_labels(
    catalog: &SupplementCatalog,
    regular: Option<&Recipe>,
    goal: &str,
    slot: &str,
) -> Option<Recipe> {
    match recommend_labels(catalog, goal, slot) {
        Some(rec) => combine(regular, &rec),
        None => regular.cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::model::sample;

    fn catalog() -> &'static SupplementCatalog {
        SupplementCatalog::builtin()
    }

    #[test]
    fn every_cell_resolves_to_products() {
        for goal in Goal::ALL {
            for slot in MealSlot::ALL {
                let (ids, note) = table_entry(goal, slot);
                assert!(!ids.is_empty(), "{goal:?}/{slot}");
                assert!(!note.is_empty());
                let rec = recommend(catalog(), goal, slot);
                assert_eq!(rec.products.len(), ids.len(), "{goal:?}/{slot}: unresolved id");
            }
        }
    }

    #[test]
    fn policy_is_uniform_per_goal() {
        for goal in Goal::ALL {
            let expected = CombinationPolicy::for_goal(goal);
            for slot in MealSlot::ALL {
                assert_eq!(recommend(catalog(), goal, slot).policy, expected);
            }
        }
        assert_eq!(
            CombinationPolicy::for_goal(Goal::WeightLoss),
            CombinationPolicy::Replace
        );
        assert_eq!(
            CombinationPolicy::for_goal(Goal::MuscleGain),
            CombinationPolicy::Augment
        );
    }

    #[test]
    fn replace_uses_only_supplements() {
        let regular = sample("Byrek", MealSlot::Breakfast, 600, &[], &["petë"]);
        let rec = recommend(catalog(), Goal::WeightLoss, MealSlot::Breakfast);
        let meal = combine(Some(&regular), &rec).unwrap();
        assert_eq!(meal.kcal, 175);
        assert_eq!(meal.protein, 17.0);
        assert_eq!(meal.carbs, 14.0);
        assert_eq!(meal.supplements, vec!["formula1_vanilla", "herbal_tea"]);
        assert!(meal.has_tag("meal_replacement"));
        assert!(!meal.ingredients.iter().any(|i| i == "petë"));
    }

    #[test]
    fn augment_sums_regular_and_every_product() {
        let regular = sample("Tavë kosi", MealSlot::Lunch, 700, &["traditional"], &["kos"]);
        let rec = recommend(catalog(), Goal::MuscleGain, MealSlot::Lunch);
        let meal = combine(Some(&regular), &rec).unwrap();
        assert_eq!(meal.kcal, 700 + 170 + 20);
        assert_eq!(meal.protein, 20.0 + 17.0 + 5.0);
        assert_eq!(meal.carbs, 40.0 + 13.0);
        assert_eq!(meal.fat, 10.0 + 2.0);
        assert!(meal.name.starts_with("Tavë kosi + "));
        assert!(meal.has_tag("traditional") && meal.has_tag("integrated"));
        assert_eq!(meal.ingredients.len(), 3);
    }

    #[test]
    fn augment_without_regular_meal_is_supplement_only() {
        let rec = recommend(catalog(), Goal::Maintenance, MealSlot::Snack);
        let meal = combine(None, &rec).unwrap();
        assert_eq!(meal.kcal, 140);
        assert_eq!(meal.meal_type, MealSlot::Snack);
    }

    #[test]
    fn unknown_labels_fall_back_to_regular_meal() {
        let regular = sample("Fërgesë", MealSlot::Dinner, 650, &[], &[]);
        let out = combine_labels(catalog(), Some(&regular), "bulk", "dinner").unwrap();
        assert_eq!(out, regular);
        let out = combine_labels(catalog(), Some(&regular), "Mbajtje", "brunch").unwrap();
        assert_eq!(out, regular);
        assert!(combine_labels(catalog(), None, "?", "?").is_none());

        let out = combine_labels(catalog(), Some(&regular), "Mbajtje", "Darkë").unwrap();
        assert_eq!(out.kcal, 660);
    }

    #[test]
    fn budget_filter_drops_heavy_products() {
        // 0.8 * 150 = 120: the 170 kcal shake no longer fits
        let rec = recommend_within(catalog(), Goal::WeightLoss, MealSlot::Breakfast, 150);
        assert_eq!(rec.product_ids(), vec!["herbal_tea"]);
        assert_eq!(rec.total_calories, 5);

        let rec = recommend_within(catalog(), Goal::WeightLoss, MealSlot::Breakfast, 600);
        assert_eq!(rec.products.len(), 2);

        let rec = recommend_within(catalog(), Goal::MuscleGain, MealSlot::Dinner, 10);
        assert!(rec.products.is_empty());
    }
}
