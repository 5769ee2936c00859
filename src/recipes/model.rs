use serde::{Deserialize, Serialize};

use crate::{nutrition::MealSlot, skills::SkillNotes};

/// Tag carried by every generated recipe.
pub const AI_TAG: &str = "AI";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub meal_type: MealSlot,
    pub kcal: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    /// Catalog ids of supplement products blended into this meal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supplements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_notes: Option<SkillNotes>,
}

impl Recipe {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_generated(&self) -> bool {
        self.has_tag(AI_TAG)
    }

    /// Lower-cased name, ingredients and tags, for keyword searches.
    pub fn haystack(&self) -> String {
        let mut hay = self.name.to_lowercase();
        for part in self.ingredients.iter().chain(self.tags.iter()) {
            hay.push(' ');
            hay.push_str(&part.to_lowercase());
        }
        hay
    }

    pub fn dedup_key(&self) -> (String, MealSlot) {
        (self.name.trim().to_lowercase(), self.meal_type)
    }
}

const BUILTIN_JSON: &str = include_str!("../../data/recipes.json");

pub fn builtin_recipes() -> anyhow::Result<Vec<Recipe>> {
    Ok(serde_json::from_str(BUILTIN_JSON)?)
}

/// Built-ins first; a stored recipe is dropped when its name and meal
/// type collide with one already present.
pub fn merge_recipes(builtin: &[Recipe], stored: Vec<Recipe>) -> Vec<Recipe> {
    let mut seen: std::collections::HashSet<(String, MealSlot)> =
        builtin.iter().map(Recipe::dedup_key).collect();
    let mut all = builtin.to_vec();
    for r in stored {
        if seen.insert(r.dedup_key()) {
            all.push(r);
        }
    }
    all
}

#[cfg(test)]
pub(crate) fn sample(name: &str, slot: MealSlot, kcal: u32, tags: &[&str], ingredients: &[&str]) -> Recipe {
    Recipe {
        name: name.to_string(),
        meal_type: slot,
        kcal,
        protein: 20.0,
        carbs: 40.0,
        fat: 10.0,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ingredients: ingredients.iter().map(|t| t.to_string()).collect(),
        steps: vec!["Përziej.".to_string()],
        supplements: Vec::new(),
        skill_notes: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_book_covers_every_main_slot() {
        let book = builtin_recipes().unwrap();
        for slot in MealSlot::MAIN {
            let n = book.iter().filter(|r| r.meal_type == slot).count();
            assert!(n >= 7, "{slot}: only {n} recipes");
        }
        assert!(book.iter().all(|r| r.kcal > 0 && !r.ingredients.is_empty()));
    }

    #[test]
    fn merge_prefers_builtin_on_collision() {
        let builtin = vec![sample("Byrek", MealSlot::Lunch, 600, &[], &[])];
        let mut dup = sample("byrek ", MealSlot::Lunch, 900, &["AI"], &[]);
        dup.kcal = 900;
        let other_slot = sample("Byrek", MealSlot::Dinner, 700, &["AI"], &[]);
        let merged = merge_recipes(&builtin, vec![dup, other_slot]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].kcal, 600);
        assert_eq!(merged[1].meal_type, MealSlot::Dinner);
    }
}
