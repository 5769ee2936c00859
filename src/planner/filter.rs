use crate::{nutrition::MealSlot, recipes::Recipe};

/// Albanian and English protein words, checked in order.
const PROTEIN_KEYWORDS: &[&str] = &[
    "chicken", "pulë", "pule", "beef", "viç", "vici", "pork", "derr", "turkey", "gjeldeti",
    "fish", "peshk", "tuna", "salmon", "troftë", "sarde", "shrimp", "karkalec", "egg", "vezë",
    "veze", "tofu", "tempeh", "beans", "fasule", "chickpea", "qiqra", "lentil", "thjerrëz",
    "thjerrez", "cheese", "djath", "yogurt", "kos",
];

pub const OTHER_PROTEIN: &str = "other";

/// Guesses the dominant protein from name, ingredients and tags.
pub fn main_protein(recipe: &Recipe) -> &'static str {
    let hay = recipe.haystack();
    PROTEIN_KEYWORDS
        .iter()
        .find(|k| hay.contains(*k))
        .copied()
        .unwrap_or(OTHER_PROTEIN)
}

/// Recipes for `slot` without any excluded keyword in name or
/// ingredients. With include tags, recipes carrying one are preferred;
/// if none do, the whole slot pool is kept.
pub fn filter_recipes<'a>(
    recipes: &'a [Recipe],
    slot: MealSlot,
    include_tags: &[String],
    exclude_keywords: &[String],
) -> Vec<&'a Recipe> {
    let excluded: Vec<String> = exclude_keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect();

    let pool: Vec<&Recipe> = recipes
        .iter()
        .filter(|r| r.meal_type == slot)
        .filter(|r| {
            let text = format!("{} {}", r.name, r.ingredients.join(" ")).to_lowercase();
            !excluded.iter().any(|bad| text.contains(bad.as_str()))
        })
        .collect();

    if include_tags.is_empty() {
        return pool;
    }
    let preferred: Vec<&Recipe> = pool
        .iter()
        .copied()
        .filter(|r| include_tags.iter().any(|t| r.has_tag(t)))
        .collect();
    if preferred.is_empty() {
        pool
    } else {
        preferred
    }
}
