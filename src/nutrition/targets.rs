use serde::{Deserialize, Serialize};

use super::types::{Activity, BodyProfile, Gender, Goal, MealSlot};

pub const DEFAULT_PATTERN: &str = "30/40/30";

/// Calories for the three main meals of a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealSplit {
    pub breakfast: u32,
    pub lunch: u32,
    pub dinner: u32,
}

impl MealSplit {
    pub fn get(&self, slot: MealSlot) -> u32 {
        match slot {
            MealSlot::Breakfast => self.breakfast,
            MealSlot::Lunch => self.lunch,
            MealSlot::Dinner => self.dinner,
            MealSlot::Snack => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

/// Mifflin–St Jeor BMR scaled by activity and goal.
/// Returns `(daily_kcal, protein_g_from_weight)`.
pub fn calc_tdee(profile: &BodyProfile, activity: Activity, goal: Goal) -> (u32, u32) {
    let sex_adj = match profile.gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };
    let bmr = 10.0 * profile.weight_kg + 6.25 * profile.height_cm - 5.0 * profile.age as f64
        + sex_adj;
    let tdee = bmr * activity.multiplier();
    let goal_adj = match goal {
        Goal::WeightLoss => 0.85,
        Goal::Maintenance => 1.0,
        Goal::MuscleGain => 1.10,
    };
    let kcal = (tdee * goal_adj).round().max(0.0) as u32;

    let g_per_kg = match goal {
        Goal::WeightLoss => 1.7,
        Goal::Maintenance => 1.4,
        Goal::MuscleGain => 1.8,
    };
    let protein_g = (g_per_kg * profile.weight_kg).round() as u32;
    (kcal, protein_g)
}

/// Protein / carbs / fat percentages per goal.
pub fn macro_split(goal: Goal) -> (u32, u32, u32) {
    match goal {
        Goal::WeightLoss => (30, 40, 30),
        Goal::MuscleGain => (30, 50, 20),
        Goal::Maintenance => (25, 50, 25),
    }
}

pub fn macro_targets(total_kcal: u32, goal: Goal, protein_from_weight: u32) -> MacroTargets {
    let (p_pct, c_pct, f_pct) = macro_split(goal);
    let kcal = total_kcal as f64;
    let p_from_pct = (kcal * p_pct as f64 / 100.0 / 4.0).round() as u32;
    let carbs_g = (kcal * c_pct as f64 / 100.0 / 4.0).round() as u32;
    let fat_g = (kcal * f_pct as f64 / 100.0 / 9.0).round() as u32;
    MacroTargets {
        protein_g: protein_from_weight.max(p_from_pct),
        carbs_g,
        fat_g,
    }
}

/// Each share is a percentage, so anything above 100 is malformed.
fn parse_pattern(pattern: &str) -> Option<(u32, u32, u32)> {
    let parts: Vec<u32> = pattern
        .split('/')
        .map(|p| p.trim().parse::<u32>().ok().filter(|v| *v <= 100))
        .collect::<Option<_>>()?;
    match parts.as_slice() {
        [b, l, d] if b + l + d > 0 => Some((*b, *l, *d)),
        _ => None,
    }
}

/// Splits the daily target by a "B/L/D" percentage pattern. Malformed
/// patterns (non-numeric, shares over 100, zero sum) fall back to 30/40/30.
pub fn kcal_split(total_kcal: u32, pattern: &str) -> MealSplit {
    let (b, l, d) = parse_pattern(pattern).unwrap_or((30, 40, 30));
    let factor = total_kcal as f64 / (b + l + d) as f64;
    MealSplit {
        breakfast: (b as f64 * factor).round() as u32,
        lunch: (l as f64 * factor).round() as u32,
        dinner: (d as f64 * factor).round() as u32,
    }
}
