use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    dto::{DailyObjective, GeneratePlanRequest, MealSubstitution, PlanDocument, PlanResponse},
    repo::{self, StoredPlan},
};
use crate::{
    ai::prompts::{suggest_substitutions, translate_to_albanian},
    analytics,
    auth::current_user,
    error::{AppError, AppResult},
    nutrition::{calc_tdee, kcal_split, macro_targets, MealSlot},
    planner::{self, make_week_plan, PlanOptions, ShoppingItem, WeekPlan, NO_RECIPE, SUPPLEMENT_MARK},
    preferences,
    recipes::{self, recipe_book},
    skills::adapt,
    social::achievements,
    state::AppState,
    supplements::{integrate_plan, integration, nutrition_summary, SupplementCatalog},
};

pub const MIN_KCAL: u32 = 1200;
pub const MAX_KCAL: u32 = 4000;

/// Recipe ingredients followed by "🥤 "-prefixed supplement products.
pub fn full_shopping_list(doc: &PlanDocument) -> Vec<ShoppingItem> {
    let mut items = planner::shopping_list(&doc.week);
    if doc.with_supplements {
        let catalog = SupplementCatalog::builtin();
        items.extend(
            integration::shopping_list(catalog, &doc.week)
                .into_iter()
                .map(|(name, count)| ShoppingItem {
                    item: format!("{SUPPLEMENT_MARK} {name}"),
                    count,
                }),
        );
    }
    items
}

fn daily_kcal(req: &GeneratePlanRequest, auto_kcal: u32, fallback: u32) -> AppResult<u32> {
    if req.use_auto_kcal {
        return Ok(auto_kcal.clamp(MIN_KCAL, MAX_KCAL));
    }
    let kcal = req.total_kcal.unwrap_or(fallback);
    if !(MIN_KCAL..=MAX_KCAL).contains(&kcal) {
        return Err(AppError::bad_request(format!(
            "total_kcal must be between {MIN_KCAL} and {MAX_KCAL}"
        )));
    }
    Ok(kcal)
}

/// Generated recipes come back in English; their steps are translated
/// one recipe per call. Line count must survive the round trip.
async fn translate_generated_steps(state: &AppState, week: &mut WeekPlan) {
    for day in &mut week.days {
        for slot in MealSlot::ALL {
            let Some(mut recipe) = day.get(slot).cloned() else {
                continue;
            };
            if !recipe.is_generated() || recipe.steps.is_empty() {
                continue;
            }
            let joined = recipe.steps.join("\n");
            let translated = translate_to_albanian(state.ai.as_ref(), &joined).await;
            let lines: Vec<String> = translated
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
            if lines.len() == recipe.steps.len() {
                recipe.steps = lines;
                day.set(slot, Some(recipe));
            }
        }
    }
}

pub async fn generate_plan(
    state: &AppState,
    user_id: Uuid,
    req: GeneratePlanRequest,
) -> AppResult<PlanResponse> {
    let user = current_user(state, user_id).await?;
    let profile = user.profile.0.clone();
    let activity = req.activity.unwrap_or(profile.activity);
    let goal = req.goal.unwrap_or(profile.goal);
    let pattern = req
        .pattern
        .clone()
        .unwrap_or_else(|| state.config.planner.default_pattern.clone());

    let (auto_kcal, protein_from_weight) = calc_tdee(&profile, activity, goal);
    let fallback = u32::try_from(state.config.planner.default_calorie_target).unwrap_or(2000);
    let total_kcal = daily_kcal(&req, auto_kcal, fallback)?;
    let objective = DailyObjective {
        kcal: total_kcal,
        macros: macro_targets(total_kcal, goal, protein_from_weight),
        split: kcal_split(total_kcal, &pattern),
    };

    let prefs = preferences::repo::preferences(&state.db, user_id).await?;
    let mut exclusions = req.exclude_keywords.clone();
    exclusions.extend(user.preferences.0.disliked_foods.iter().cloned());
    let skill = user.skill();

    let book = recipe_book(state).await?;
    let opts = PlanOptions {
        total_kcal,
        pattern: &pattern,
        include_tags: &req.include_tags,
        exclude_keywords: &exclusions,
        preferences: &prefs,
        skill,
        seed: req.seed,
        ai_expand: req.use_ai_expand,
    };
    let outcome = make_week_plan(&book, &opts, state.ai.as_ref()).await;

    for recipe in &outcome.generated {
        match recipes::repo::save_generated(&state.db, recipe).await {
            Ok(true) => info!(name = %recipe.name, "generated recipe saved"),
            Ok(false) => {}
            Err(e) => warn!(error = %e, name = %recipe.name, "saving generated recipe failed"),
        }
    }

    let mut week = if req.use_supplements {
        integrate_plan(SupplementCatalog::builtin(), &outcome.plan, goal, &outcome.split)
    } else {
        outcome.plan
    };
    if req.translate_steps {
        translate_generated_steps(state, &mut week).await;
    }
    week.for_each_meal_mut(|r| *r = adapt(r, skill));

    let empty = week.empty_slots();
    if empty > 0 {
        warn!(%user_id, empty, "plan has empty slots");
    }

    let doc = PlanDocument {
        week,
        goal,
        pattern,
        objective,
        with_supplements: req.use_supplements,
    };
    let stored = repo::insert(&state.db, user_id, &doc).await?;
    info!(%user_id, plan_id = %stored.id, kcal = total_kcal, "meal plan generated");

    analytics::record(
        &state.db,
        Some(user_id),
        "meal_plan_generated",
        json!({
            "plan_id": stored.id,
            "total_kcal": total_kcal,
            "goal": goal,
            "use_supplements": req.use_supplements,
            "generated_recipes": outcome.generated.len(),
        }),
    )
    .await;
    let new_achievements = achievements::check_and_award(&state.db, user_id).await?;

    Ok(plan_response(stored, outcome.generated.len(), new_achievements))
}

pub fn plan_response(
    stored: StoredPlan,
    generated_recipes: usize,
    new_achievements: Vec<&'static str>,
) -> PlanResponse {
    let doc = stored.plan.0;
    let shopping_list = full_shopping_list(&doc);
    let supplement_nutrition = doc
        .with_supplements
        .then(|| nutrition_summary(SupplementCatalog::builtin(), &doc.week));
    PlanResponse {
        id: stored.id,
        created_at: stored.created_at,
        plan: doc.week,
        objective: doc.objective,
        shopping_list,
        supplement_nutrition,
        generated_recipes,
        new_achievements,
    }
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// One row per day and main slot, plus filled snacks.
pub fn plan_csv(week: &WeekPlan) -> String {
    let mut out = String::from("Dita,Vakti,Receta,kcal,Proteina,Karbo,Yndyrna\n");
    for day in &week.days {
        for slot in MealSlot::ALL {
            let row = match day.get(slot) {
                Some(r) => format!(
                    "{},{},{},{},{:.1},{:.1},{:.1}",
                    csv_field(&day.day),
                    csv_field(slot.label_sq()),
                    csv_field(&r.name),
                    r.kcal,
                    r.protein,
                    r.carbs,
                    r.fat
                ),
                None if slot == MealSlot::Snack => continue,
                None => format!(
                    "{},{},{},,,,",
                    csv_field(&day.day),
                    csv_field(slot.label_sq()),
                    NO_RECIPE
                ),
            };
            out.push_str(&row);
            out.push('\n');
        }
    }
    out
}

pub async fn substitutions(state: &AppState, week: &WeekPlan, pantry: &[String]) -> Vec<MealSubstitution> {
    let mut out = Vec::new();
    for (day, slot, recipe) in week.meals() {
        let suggestions =
            suggest_substitutions(state.ai.as_ref(), &recipe.ingredients, pantry).await;
        out.push(MealSubstitution {
            day: day.to_string(),
            slot,
            recipe: recipe.name.clone(),
            suggestions,
        });
    }
    out
}
