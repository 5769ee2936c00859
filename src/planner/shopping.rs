use std::collections::HashMap;

use serde::Serialize;

use super::plan::WeekPlan;

/// Marks ingredient lines that stand for a supplement product.
pub const SUPPLEMENT_MARK: &str = "🥤";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShoppingItem {
    pub item: String,
    pub count: u32,
}

/// Ingredient lines of every planned meal, counted by exact text. Most
/// frequent first, then alphabetical.
pub fn shopping_list(plan: &WeekPlan) -> Vec<ShoppingItem> {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for (_, _, recipe) in plan.meals() {
        for line in &recipe.ingredients {
            let line = line.trim();
            if line.is_empty() || line.starts_with(SUPPLEMENT_MARK) {
                continue;
            }
            *counts.entry(line).or_insert(0) += 1;
        }
    }

    let mut items: Vec<ShoppingItem> = counts
        .into_iter()
        .map(|(item, count)| ShoppingItem {
            item: item.to_string(),
            count,
        })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.item.cmp(&b.item)));
    items
}
