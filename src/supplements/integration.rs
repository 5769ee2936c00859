use std::collections::BTreeMap;

use serde::Serialize;

use super::{
    catalog::SupplementCatalog,
    rules::{combine, recommend, recommend_within},
};
use crate::{
    nutrition::{Goal, MealSlot, MealSplit},
    planner::WeekPlan,
};

/// Applies the goal's rule to every slot of the week. Main slots only get
/// products that fit their calorie share; each day also gets a supplement
/// snack.
pub fn integrate_plan(
    catalog: &SupplementCatalog,
    plan: &WeekPlan,
    goal: Goal,
    split: &MealSplit,
) -> WeekPlan {
    let mut out = plan.clone();
    for day in &mut out.days {
        for slot in MealSlot::MAIN {
            let rec = recommend_within(catalog, goal, slot, split.get(slot));
            let combined = combine(day.get(slot), &rec);
            day.set(slot, combined);
        }
        let rec = recommend(catalog, goal, MealSlot::Snack);
        let snack = combine(day.get(MealSlot::Snack), &rec);
        day.set(MealSlot::Snack, snack);
    }
    out
}

/// Localized product name to number of uses across the plan.
pub fn shopping_list(catalog: &SupplementCatalog, plan: &WeekPlan) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for (_, _, recipe) in plan.meals() {
        for product in recipe.supplements.iter().filter_map(|id| catalog.get(id)) {
            *counts.entry(product.name_sq.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SupplementNutrition {
    pub total_calories: u32,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub products_used: usize,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn nutrition_summary(catalog: &SupplementCatalog, plan: &WeekPlan) -> SupplementNutrition {
    let mut sum = SupplementNutrition::default();
    for (_, _, recipe) in plan.meals() {
        for p in recipe.supplements.iter().filter_map(|id| catalog.get(id)) {
            sum.total_calories += p.calories;
            sum.total_protein += p.protein;
            sum.total_carbs += p.carbs;
            sum.total_fat += p.fat;
            sum.products_used += 1;
        }
    }
    sum.total_protein = round1(sum.total_protein);
    sum.total_carbs = round1(sum.total_carbs);
    sum.total_fat = round1(sum.total_fat);
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        nutrition::kcal_split,
        planner::DayPlan,
        recipes::model::sample,
    };

    fn one_day() -> WeekPlan {
        let mut day = DayPlan::new("E Hënë");
        day.set(
            MealSlot::Breakfast,
            Some(sample("Qull", MealSlot::Breakfast, 500, &[], &["tërshërë"])),
        );
        day.set(
            MealSlot::Lunch,
            Some(sample("Tavë", MealSlot::Lunch, 800, &[], &["mish"])),
        );
        WeekPlan { days: vec![day] }
    }

    #[test]
    fn weight_loss_replaces_every_slot() {
        let catalog = SupplementCatalog::builtin();
        let split = kcal_split(2000, "30/40/30");
        let plan = integrate_plan(catalog, &one_day(), Goal::WeightLoss, &split);
        let day = &plan.days[0];

        let breakfast = day.breakfast.as_ref().unwrap();
        assert!(breakfast.has_tag("meal_replacement"));
        assert_eq!(breakfast.kcal, 175);
        // empty dinner slot still gets the supplement meal
        assert!(day.dinner.is_some());
        assert_eq!(day.snack.as_ref().unwrap().meal_type, MealSlot::Snack);
    }

    #[test]
    fn maintenance_augments_and_counts() {
        let catalog = SupplementCatalog::builtin();
        let split = kcal_split(2000, "30/40/30");
        let plan = integrate_plan(catalog, &one_day(), Goal::Maintenance, &split);
        let day = &plan.days[0];

        assert_eq!(day.lunch.as_ref().unwrap().kcal, 800 + 20);
        assert!(day.breakfast.as_ref().unwrap().name.starts_with("Qull + "));

        let list = shopping_list(catalog, &plan);
        let total: u32 = list.values().sum();
        let summary = nutrition_summary(catalog, &plan);
        assert_eq!(total as usize, summary.products_used);
        assert!(summary.total_calories > 0);
    }

    #[test]
    fn summary_of_plain_plan_is_zero() {
        let catalog = SupplementCatalog::builtin();
        assert_eq!(
            nutrition_summary(catalog, &one_day()),
            SupplementNutrition::default()
        );
        assert!(shopping_list(catalog, &one_day()).is_empty());
    }
}
