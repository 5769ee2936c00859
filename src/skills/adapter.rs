use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::CookingSkill;
use crate::recipes::Recipe;

/// Level-specific guidance attached to an adapted recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillNotes {
    pub level: CookingSkill,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tips: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub techniques: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<String>,
    pub prep_time_minutes: u32,
}

struct StepRewrite {
    pattern: Regex,
    prefix: &'static str,
    replacement: &'static str,
}

lazy_static! {
    static ref STEP_REWRITES: Vec<StepRewrite> = vec![
        StepRewrite {
            pattern: Regex::new(r"(?i)\bsauté").unwrap(),
            prefix: "Heat a pan over medium heat.",
            replacement: "cook while stirring occasionally",
        },
        StepRewrite {
            pattern: Regex::new(r"(?i)\bsimmer").unwrap(),
            prefix: "Bring to a gentle boil, then reduce heat.",
            replacement: "let it bubble gently",
        },
        StepRewrite {
            pattern: Regex::new(r"(?i)\bbake").unwrap(),
            prefix: "Preheat your oven first.",
            replacement: "cook in the oven",
        },
    ];
    static ref SEASON: Regex = Regex::new(r"(?i)\bseason").unwrap();
}

fn simplify_step(step: &str) -> String {
    for rw in STEP_REWRITES.iter() {
        if rw.pattern.is_match(step) {
            let body = rw.pattern.replace_all(step, rw.replacement);
            return format!("{} {}", rw.prefix, body);
        }
    }
    if SEASON.is_match(step) {
        return format!("Add salt, pepper, and any other spices. {step}");
    }
    step.to_string()
}

fn simplify_ingredient(ingredient: &str) -> String {
    // "tbsp" before "tsp"; one rewrite per line
    for (short, long) in [("tbsp", "tablespoon"), ("tsp", "teaspoon"), ("clove", "piece")] {
        if ingredient.contains(short) {
            return ingredient.replace(short, long);
        }
    }
    ingredient.to_string()
}

fn mentions(recipe: &Recipe, words: &[&str]) -> bool {
    recipe.ingredients.iter().any(|ing| {
        let ing = ing.to_lowercase();
        words.iter().any(|w| ing.contains(w))
    })
}

fn beginner_tips(recipe: &Recipe) -> Vec<String> {
    let mut tips = vec![
        "Read through all steps before starting".to_string(),
        "Prepare all ingredients before cooking".to_string(),
        "Keep a clean workspace".to_string(),
    ];
    if mentions(recipe, &["chicken", "pulë", "pule"]) {
        tips.push("Chicken is done when juices run clear".into());
    }
    if mentions(recipe, &["pasta", "makarona", "spageti"]) {
        tips.push("Test pasta by tasting - it should be al dente".into());
    }
    if mentions(recipe, &["rice", "oriz"]) {
        tips.push("Use a 2:1 ratio of water to rice".into());
    }
    tips
}

fn intermediate_tips(recipe: &Recipe) -> Vec<String> {
    let mut tips = vec![
        "Taste and adjust seasoning as you cook".to_string(),
        "Let meat rest before cutting".to_string(),
        "Use a meat thermometer for accuracy".to_string(),
    ];
    if mentions(recipe, &["fish", "peshk", "troftë", "levrek"]) {
        tips.push("Fish is done when it flakes easily with a fork".into());
    }
    if mentions(recipe, &["vegetables", "perime"]) {
        tips.push("Cut vegetables uniformly for even cooking".into());
    }
    tips
}

fn advanced_techniques(recipe: &Recipe) -> Vec<String> {
    let mut techniques = vec![
        "Master the art of seasoning and layering flavors".to_string(),
        "Experiment with different cooking methods".to_string(),
        "Develop your own variations and improvements".to_string(),
    ];
    if mentions(recipe, &["meat", "mish"]) {
        techniques.push("Try sous vide for perfect doneness".into());
    }
    if mentions(recipe, &["sauce", "salcë", "salce"]) {
        techniques.push("Learn to make mother sauces and derivatives".into());
    }
    techniques
}

fn variations(recipe: &Recipe) -> Vec<String> {
    let mut out = vec![
        "Try different protein sources".to_string(),
        "Experiment with different cuisines".to_string(),
        "Add your own creative twists".to_string(),
    ];
    let name = recipe.name.to_lowercase();
    if name.contains("pasta") || name.contains("makarona") {
        out.push("Try different pasta shapes".into());
        out.push("Experiment with different sauces".into());
    }
    if name.contains("salad") || name.contains("sallatë") {
        out.push("Add seasonal ingredients".into());
        out.push("Try different dressings".into());
    }
    out
}

/// Minutes, from the unadapted recipe's ingredient and step counts.
pub fn estimate_prep_time(recipe: &Recipe, level: CookingSkill) -> u32 {
    let base: usize = match level {
        CookingSkill::Beginner => 45,
        CookingSkill::Intermediate => 30,
        CookingSkill::Advanced => 20,
    };
    // base * (1 + parts / 10), truncated
    let parts = recipe.ingredients.len() + recipe.steps.len();
    (base * (10 + parts) / 10) as u32
}

pub fn adapt(recipe: &Recipe, level: CookingSkill) -> Recipe {
    let mut adapted = recipe.clone();
    let prep_time_minutes = estimate_prep_time(recipe, level);
    let notes = match level {
        CookingSkill::Beginner => {
            adapted.steps = recipe.steps.iter().map(|s| simplify_step(s)).collect();
            adapted.ingredients = recipe
                .ingredients
                .iter()
                .map(|i| simplify_ingredient(i))
                .collect();
            SkillNotes {
                level,
                tips: beginner_tips(recipe),
                techniques: Vec::new(),
                variations: Vec::new(),
                prep_time_minutes,
            }
        }
        CookingSkill::Intermediate => SkillNotes {
            level,
            tips: intermediate_tips(recipe),
            techniques: Vec::new(),
            variations: Vec::new(),
            prep_time_minutes,
        },
        CookingSkill::Advanced => SkillNotes {
            level,
            tips: Vec::new(),
            techniques: advanced_techniques(recipe),
            variations: variations(recipe),
            prep_time_minutes,
        },
    };
    adapted.skill_notes = Some(notes);
    adapted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{nutrition::MealSlot, recipes::model::sample};

    #[test]
    fn beginner_steps_are_spelled_out() {
        assert_eq!(
            simplify_step("Sauté spinaqin për dy minuta."),
            "Heat a pan over medium heat. cook while stirring occasionally spinaqin për dy minuta."
        );
        assert!(simplify_step("Simmer for 20 min").starts_with("Bring to a gentle boil"));
        assert!(simplify_step("Season the fish").starts_with("Add salt, pepper"));
        assert_eq!(simplify_step("Përziej."), "Përziej.");
    }

    #[test]
    fn beginner_measurements_are_expanded() {
        assert_eq!(simplify_ingredient("1 tbsp vaj"), "1 tablespoon vaj");
        assert_eq!(simplify_ingredient("1 tsp kripë"), "1 teaspoon kripë");
        assert_eq!(simplify_ingredient("2 clove hudhër"), "2 piece hudhër");
    }

    #[test]
    fn prep_time_scales_with_complexity() {
        // 3 ingredients + 1 step => factor 1.4
        let r = sample("Pulë me oriz", MealSlot::Lunch, 700, &[], &["200 g pulë", "80 g oriz", "kripë"]);
        assert_eq!(estimate_prep_time(&r, CookingSkill::Beginner), 63);
        assert_eq!(estimate_prep_time(&r, CookingSkill::Intermediate), 42);
        assert_eq!(estimate_prep_time(&r, CookingSkill::Advanced), 28);
    }

    #[test]
    fn adapt_attaches_level_notes() {
        let r = sample("Pulë me oriz", MealSlot::Lunch, 700, &[], &["200 g pulë", "80 g oriz"]);
        let b = adapt(&r, CookingSkill::Beginner);
        let notes = b.skill_notes.unwrap();
        assert_eq!(notes.level, CookingSkill::Beginner);
        assert_eq!(notes.tips.len(), 5);

        let a = adapt(&r, CookingSkill::Advanced);
        let notes = a.skill_notes.unwrap();
        assert!(notes.tips.is_empty());
        assert_eq!(notes.techniques.len(), 3);
        assert_eq!(notes.variations.len(), 3);
        assert_eq!(a.steps, r.steps);
    }

    #[test]
    fn skill_parses_albanian() {
        assert_eq!("Mesatar".parse::<CookingSkill>().unwrap(), CookingSkill::Intermediate);
        assert!("chef".parse::<CookingSkill>().is_err());
    }
}
