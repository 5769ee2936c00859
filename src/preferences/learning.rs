use std::collections::HashMap;

use serde::Serialize;

use crate::{nutrition::MealSlot, recipes::Recipe};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PreferenceStat {
    pub avg_rating: f64,
    pub count: i64,
}

impl PreferenceStat {
    /// Full weight from five ratings on.
    pub fn confidence(&self) -> f64 {
        (self.count as f64 / 5.0).min(1.0)
    }
}

/// Food item (as rated) to aggregate rating.
pub type PreferenceMap = HashMap<String, PreferenceStat>;

const MEASUREMENT_WORDS: &[&str] = &[
    "g", "kg", "ml", "l", "tsp", "tbsp", "cup", "cups", "oz", "lb", "pound", "pounds", "copë",
    "lugë", "gotë",
];

const SYNONYMS: &[(&str, &[&str])] = &[
    ("chicken", &["poultry", "breast", "thigh", "pulë", "pule"]),
    ("beef", &["meat", "steak", "ground", "viç", "mish"]),
    ("fish", &["salmon", "tuna", "cod", "seafood", "peshk", "troftë", "levrek"]),
    ("vegetables", &["veggies", "veggie", "vegetable", "perime"]),
    ("cheese", &["dairy", "mozzarella", "cheddar", "feta", "djathë", "djath"]),
];

/// First word of an ingredient line that is neither a quantity nor a unit.
pub fn extract_ingredient_name(ingredient: &str) -> String {
    let lower = ingredient.to_lowercase();
    lower
        .split_whitespace()
        .find(|w| !MEASUREMENT_WORDS.contains(w) && w.replace(',', ".").parse::<f64>().is_err())
        .map(str::to_string)
        .unwrap_or_else(|| lower.trim().to_string())
}

pub fn ingredients_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a.contains(&b) || b.contains(&a) {
        return true;
    }
    SYNONYMS.iter().any(|(main, variants)| {
        (a == *main && variants.contains(&b.as_str()))
            || (b == *main && variants.contains(&a.as_str()))
    })
}

/// Planner bonus: Σ (avg − 3) · 0.2 · confidence over every
/// ingredient/rated-item match. Liked foods push up, disliked down.
pub fn planner_bonus(recipe: &Recipe, prefs: &PreferenceMap) -> f64 {
    let mut bonus = 0.0;
    for ingredient in &recipe.ingredients {
        let name = extract_ingredient_name(ingredient);
        for (item, stat) in prefs {
            if ingredients_match(&name, item) {
                bonus += (stat.avg_rating - 3.0) * 0.2 * stat.confidence();
            }
        }
    }
    bonus
}

/// Confidence-weighted mean rating of the recipe's rated ingredients, 0
/// when nothing matches.
pub fn preference_score(recipe: &Recipe, prefs: &PreferenceMap, slot: Option<MealSlot>) -> f64 {
    let mut score = 0.0;
    let mut weight = 0.0;
    for ingredient in &recipe.ingredients {
        let name = extract_ingredient_name(ingredient);
        for (item, stat) in prefs {
            if ingredients_match(&name, item) {
                let w = stat.confidence();
                score += stat.avg_rating * w;
                weight += w;
            }
        }
    }
    // Items rated with a slot word in their name ("mëngjes me vezë").
    if let Some(slot) = slot {
        let ratings: Vec<f64> = prefs
            .iter()
            .filter(|(item, _)| {
                let item = item.to_lowercase();
                item.contains(slot.as_str()) || item.contains(&slot.label_sq().to_lowercase())
            })
            .map(|(_, s)| s.avg_rating)
            .collect();
        if !ratings.is_empty() {
            score += ratings.iter().sum::<f64>() / ratings.len() as f64 * 0.5;
            weight += 0.5;
        }
    }
    if weight > 0.0 {
        score / weight.max(1.0)
    } else {
        0.0
    }
}

/// Recipes ordered by preference score; stable for ties.
pub fn rank_recipes(recipes: Vec<Recipe>, prefs: &PreferenceMap, slot: Option<MealSlot>) -> Vec<Recipe> {
    if prefs.is_empty() {
        return recipes;
    }
    let mut scored: Vec<(f64, Recipe)> = recipes
        .into_iter()
        .map(|r| (preference_score(&r, prefs, slot), r))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, r)| r).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct RatedFood {
    pub food_item: String,
    pub avg_rating: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreferenceInsights {
    pub total_ratings: i64,
    pub favorite_foods: Vec<RatedFood>,
    pub disliked_foods: Vec<RatedFood>,
    pub preference_confidence: f64,
}

pub fn insights(prefs: &PreferenceMap) -> PreferenceInsights {
    let mut favorites = Vec::new();
    let mut disliked = Vec::new();
    for (food, stat) in prefs {
        let rated = RatedFood {
            food_item: food.clone(),
            avg_rating: stat.avg_rating,
        };
        if stat.avg_rating >= 4.0 {
            favorites.push(rated);
        } else if stat.avg_rating <= 2.0 {
            disliked.push(rated);
        }
    }
    // name as tie-break keeps HashMap order out of the output
    favorites.sort_by(|a, b| {
        b.avg_rating
            .total_cmp(&a.avg_rating)
            .then_with(|| a.food_item.cmp(&b.food_item))
    });
    disliked.sort_by(|a, b| {
        a.avg_rating
            .total_cmp(&b.avg_rating)
            .then_with(|| a.food_item.cmp(&b.food_item))
    });
    favorites.truncate(5);
    disliked.truncate(5);

    let total_ratings: i64 = prefs.values().map(|s| s.count).sum();
    PreferenceInsights {
        total_ratings,
        favorite_foods: favorites,
        disliked_foods: disliked,
        preference_confidence: (total_ratings as f64 / 20.0).min(1.0),
    }
}
