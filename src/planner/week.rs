use std::collections::{HashMap, HashSet};

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::{debug, warn};

use super::{
    filter::{filter_recipes, main_protein},
    plan::{DayPlan, WeekPlan, DAYS},
};
use crate::{
    ai::{prompts::expand_recipe, AiProvider},
    nutrition::{kcal_split, MealSlot, MealSplit},
    preferences::{learning::planner_bonus, PreferenceMap},
    recipes::Recipe,
    skills::CookingSkill,
};

const TOP_K: usize = 5;
const NOVELTY_CHANCE: f64 = 0.25;

pub struct PlanOptions<'a> {
    pub total_kcal: u32,
    pub pattern: &'a str,
    pub include_tags: &'a [String],
    pub exclude_keywords: &'a [String],
    pub preferences: &'a PreferenceMap,
    pub skill: CookingSkill,
    pub seed: Option<u64>,
    pub ai_expand: bool,
}

pub struct PlanOutcome {
    pub plan: WeekPlan,
    pub split: MealSplit,
    /// Model-generated recipes placed in the plan, to be persisted.
    pub generated: Vec<Recipe>,
}

#[derive(Default)]
struct Variety {
    used_names: HashSet<String>,
    protein_uses: HashMap<&'static str, u32>,
    last_protein: HashMap<MealSlot, &'static str>,
}

impl Variety {
    fn score(&self, r: &Recipe, slot: MealSlot, target: u32, opts: &PlanOptions<'_>) -> f64 {
        let mut s = -((r.kcal as f64 - target as f64).abs() / 10.0);

        if self.used_names.contains(&r.name) {
            s -= 100.0;
        }

        let protein = main_protein(r);
        s -= *self.protein_uses.get(protein).unwrap_or(&0) as f64 * 0.8;
        if self.last_protein.get(&slot) == Some(&protein) {
            s -= 0.8;
        }

        let overlap = opts.include_tags.iter().filter(|t| r.has_tag(t)).count();
        s += 0.3 * overlap as f64;

        if !opts.preferences.is_empty() {
            s += planner_bonus(r, opts.preferences);
        }

        if opts.skill.preferred_tags().iter().any(|t| r.has_tag(t)) {
            s += 0.5;
        }
        s
    }

    fn record(&mut self, r: &Recipe, slot: MealSlot) {
        self.used_names.insert(r.name.clone());
        let protein = main_protein(r);
        *self.protein_uses.entry(protein).or_insert(0) += 1;
        self.last_protein.insert(slot, protein);
    }
}

/// Seven days of breakfast, lunch and dinner. Picks uniformly among the
/// five best-scored unused recipes per slot; a slot stays empty when
/// nothing is left and the model cannot supply one.
pub async fn make_week_plan(
    recipes: &[Recipe],
    opts: &PlanOptions<'_>,
    ai: &dyn AiProvider,
) -> PlanOutcome {
    let mut rng = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let split = kcal_split(opts.total_kcal, opts.pattern);
    let mut variety = Variety::default();
    let mut generated = Vec::new();
    let mut days = Vec::with_capacity(DAYS.len());

    let mut ai_tags: Vec<String> = opts.include_tags.to_vec();
    ai_tags.extend(opts.skill.preferred_tags().iter().map(|t| t.to_string()));

    for day in DAYS {
        let mut day_plan = DayPlan::new(day);

        for slot in MealSlot::MAIN {
            let target = split.get(slot);
            let pool: Vec<&Recipe> =
                filter_recipes(recipes, slot, opts.include_tags, opts.exclude_keywords)
                    .into_iter()
                    .filter(|r| !variety.used_names.contains(&r.name))
                    .collect();

            let mut scored: Vec<(f64, &Recipe)> = pool
                .into_iter()
                .map(|r| (variety.score(r, slot, target, opts), r))
                .collect();
            scored.sort_by(|a, b| b.0.total_cmp(&a.0));
            let top: Vec<&Recipe> = scored.iter().take(TOP_K).map(|(_, r)| *r).collect();
            let mut chosen: Option<Recipe> = top.choose(&mut rng).map(|r| (*r).clone());

            let mut need_ai = chosen.is_none();
            if opts.ai_expand && !need_ai {
                need_ai = rng.gen::<f64>() < NOVELTY_CHANCE;
            }

            if opts.ai_expand && need_ai {
                match expand_recipe(ai, slot, target, &ai_tags, opts.exclude_keywords).await {
                    Ok(fresh) if !variety.used_names.contains(&fresh.name) => {
                        debug!(day, %slot, name = %fresh.name, "generated recipe");
                        generated.push(fresh.clone());
                        chosen = Some(fresh);
                    }
                    Ok(fresh) => debug!(name = %fresh.name, "generated recipe already used"),
                    Err(e) => warn!(error = %e, day, %slot, "recipe expansion failed"),
                }
            }

            if let Some(r) = &chosen {
                variety.record(r, slot);
            }
            day_plan.set(slot, chosen);
        }
        days.push(day_plan);
    }

    PlanOutcome {
        plan: WeekPlan { days },
        split,
        generated,
    }
}
