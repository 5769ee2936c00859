use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    nutrition::{Activity, Goal, MacroTargets, MealSlot, MealSplit},
    planner::{ShoppingItem, WeekPlan},
    supplements::SupplementNutrition,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct GeneratePlanRequest {
    pub total_kcal: Option<u32>,
    pub use_auto_kcal: bool,
    pub activity: Option<Activity>,
    pub goal: Option<Goal>,
    pub pattern: Option<String>,
    pub include_tags: Vec<String>,
    pub exclude_keywords: Vec<String>,
    pub use_supplements: bool,
    pub use_ai_expand: bool,
    /// Translate the steps of generated recipes into Albanian.
    pub translate_steps: bool,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyObjective {
    pub kcal: u32,
    pub macros: MacroTargets,
    pub split: MealSplit,
}

/// Stored plan body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDocument {
    pub week: WeekPlan,
    pub goal: Goal,
    pub pattern: String,
    pub objective: DailyObjective,
    pub with_supplements: bool,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub plan: WeekPlan,
    pub objective: DailyObjective,
    pub shopping_list: Vec<ShoppingItem>,
    pub supplement_nutrition: Option<SupplementNutrition>,
    pub generated_recipes: usize,
    pub new_achievements: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct PlanSummary {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub week_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub goal: Goal,
    pub kcal: u32,
    pub with_supplements: bool,
    pub empty_slots: usize,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SubstitutionRequest {
    pub pantry: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MealSubstitution {
    pub day: String,
    pub slot: MealSlot,
    pub recipe: String,
    pub suggestions: String,
}
