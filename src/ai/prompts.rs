use serde::Deserialize;

use super::{extract_json_object, AiError, AiProvider};
use crate::{
    nutrition::MealSlot,
    recipes::{model::AI_TAG, Recipe},
};

pub const SUBSTITUTIONS_UNAVAILABLE: &str =
    "Zëvendësimet inteligjente nuk janë të disponueshme për momentin.";

#[derive(Debug, Deserialize)]
struct GeneratedRecipe {
    name: String,
    kcal: Option<f64>,
    #[serde(default)]
    protein: f64,
    #[serde(default)]
    carbs: f64,
    #[serde(default)]
    fat: f64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    ingredients: Vec<String>,
    #[serde(default)]
    steps: Vec<String>,
}

fn join_or(items: &[String], empty: &str) -> String {
    if items.is_empty() {
        empty.to_string()
    } else {
        items.join(", ")
    }
}

/// Asks the model for a fresh recipe near `kcal` for the slot.
pub async fn expand_recipe(
    ai: &dyn AiProvider,
    slot: MealSlot,
    kcal: u32,
    tags: &[String],
    exclusions: &[String],
) -> Result<Recipe, AiError> {
    let prompt = format!(
        "Create a new {slot} recipe of about {kcal} kcal.\n\
         Must include tags: {}.\n\
         Must exclude: {}.\n\
         Return only JSON with: name, ingredients, steps, kcal, protein, carbs, fat, tags.",
        join_or(tags, "any"),
        join_or(exclusions, "none"),
    );
    let reply = ai.complete("You are a recipe generator.", &prompt).await?;
    let json = extract_json_object(&reply)
        .ok_or_else(|| AiError::Api("recipe reply carried no JSON object".into()))?;
    let generated: GeneratedRecipe =
        serde_json::from_str(json).map_err(|e| AiError::Api(format!("bad recipe JSON: {e}")))?;
    if generated.name.trim().is_empty() {
        return Err(AiError::Api("recipe without a name".into()));
    }

    let mut tags = generated.tags;
    if !tags.iter().any(|t| t == AI_TAG) {
        tags.push(AI_TAG.to_string());
    }
    Ok(Recipe {
        name: generated.name.trim().to_string(),
        meal_type: slot,
        kcal: generated.kcal.map_or(kcal, |k| k.max(0.0).round() as u32),
        protein: generated.protein,
        carbs: generated.carbs,
        fat: generated.fat,
        tags,
        ingredients: generated.ingredients,
        steps: generated.steps,
        supplements: Vec::new(),
        skill_notes: None,
    })
}

/// Bullet list of swaps; a fixed notice when the model is unavailable.
pub async fn suggest_substitutions(
    ai: &dyn AiProvider,
    ingredients: &[String],
    pantry: &[String],
) -> String {
    let prompt = format!(
        "The user has a pantry with: {}.\n\
         Suggest substitutions for these recipe ingredients: {}.\n\
         Only suggest realistic food swaps that are common in cooking.\n\
         Respond briefly as a bullet list: Ingredient → Suggested Substitute.",
        pantry.join(", "),
        ingredients.join(", "),
    );
    match ai.complete("You are a helpful cooking assistant.", &prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "substitutions unavailable");
            SUBSTITUTIONS_UNAVAILABLE.to_string()
        }
    }
}

/// Returns `text` unchanged when translation fails.
pub async fn translate_to_albanian(ai: &dyn AiProvider, text: &str) -> String {
    let prompt = format!("Translate this into clear, natural Albanian:\n{text}");
    match ai.complete("You are a translator.", &prompt).await {
        Ok(t) => t,
        Err(e) => {
            tracing::debug!(error = %e, "translation skipped");
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::mock::MockProvider;

    #[tokio::test]
    async fn expanded_recipe_is_tagged_and_slotted() {
        let ai = MockProvider::default().with_text(
            r#"Here you go: {"name": "Tavë me perime", "kcal": 540, "protein": 21,
            "carbs": 60, "fat": 18, "tags": ["vegetarian"],
            "ingredients": ["200 g kungull"], "steps": ["Piq."]}"#,
        );
        let r = expand_recipe(&ai, MealSlot::Dinner, 600, &[], &[]).await.unwrap();
        assert_eq!(r.name, "Tavë me perime");
        assert_eq!(r.meal_type, MealSlot::Dinner);
        assert_eq!(r.kcal, 540);
        assert_eq!(r.tags, vec!["vegetarian".to_string(), "AI".to_string()]);
    }

    #[tokio::test]
    async fn expanded_recipe_defaults_kcal_to_target() {
        let ai = MockProvider::default().with_text(r#"{"name": "Supë"}"#);
        let r = expand_recipe(&ai, MealSlot::Lunch, 777, &[], &[]).await.unwrap();
        assert_eq!(r.kcal, 777);
        assert_eq!(r.protein, 0.0);
    }

    #[tokio::test]
    async fn expand_rejects_garbage() {
        let ai = MockProvider::default().with_text("sorry, I can't");
        assert!(expand_recipe(&ai, MealSlot::Lunch, 700, &[], &[]).await.is_err());
    }

    #[tokio::test]
    async fn fallbacks_when_model_fails() {
        let ai = MockProvider::failing();
        let subs = suggest_substitutions(&ai, &["kos".into()], &["qumësht".into()]).await;
        assert_eq!(subs, SUBSTITUTIONS_UNAVAILABLE);
        assert_eq!(translate_to_albanian(&ai, "Bake it").await, "Bake it");
        assert_eq!(ai.calls(), 2);
    }
}
