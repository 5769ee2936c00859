use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    nutrition::{calc_tdee, targets::macro_split, Activity, BodyProfile},
    planner::WeekPlan,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalCheck {
    pub target: f64,
    pub actual: f64,
    pub met: bool,
    pub percentage: f64,
}

impl GoalCheck {
    fn new(target: f64, actual: f64, met: bool) -> Self {
        let percentage = if target > 0.0 {
            round1(actual / target * 100.0)
        } else {
            0.0
        };
        Self {
            target: round1(target),
            actual: round1(actual),
            met,
            percentage,
        }
    }
}

/// Goal name ("calories", "protein", "carbs", "fat") to its check.
pub type GoalsMet = BTreeMap<String, GoalCheck>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DayTotals {
    pub kcal: u32,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

/// Report body before it is stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDraft {
    pub total_calories: u32,
    pub avg_daily_calories: u32,
    pub protein_avg: f64,
    pub carbs_avg: f64,
    pub fat_avg: f64,
    pub days_with_food: usize,
    pub goals_met: GoalsMet,
    pub recommendations: Vec<String>,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn day_totals(plan: &WeekPlan) -> Vec<DayTotals> {
    plan.days
        .iter()
        .map(|d| {
            d.meals().fold(DayTotals::default(), |mut t, (_, r)| {
                t.kcal += r.kcal;
                t.protein += r.protein;
                t.carbs += r.carbs;
                t.fat += r.fat;
                t
            })
        })
        .collect()
}

/// Checks averages against targets derived from the profile at moderate
/// activity.
pub fn goals_met(profile: &BodyProfile, kcal: f64, protein: f64, carbs: f64, fat: f64) -> GoalsMet {
    let goal = profile.goal;
    let (target_kcal, protein_g) = calc_tdee(profile, Activity::Moderate, goal);
    let target_kcal = target_kcal as f64;
    let (_, c_pct, f_pct) = macro_split(goal);
    let target_carbs = target_kcal * c_pct as f64 / 100.0 / 4.0;
    let target_fat = target_kcal * f_pct as f64 / 100.0 / 9.0;
    let target_protein = protein_g as f64;

    let within = |actual: f64, target: f64, tol: f64| (actual - target).abs() <= target * tol;
    let mut out = GoalsMet::new();
    out.insert(
        "calories".into(),
        GoalCheck::new(target_kcal, kcal, within(kcal, target_kcal, 0.10)),
    );
    out.insert(
        "protein".into(),
        GoalCheck::new(target_protein, protein, protein >= target_protein * 0.9),
    );
    out.insert(
        "carbs".into(),
        GoalCheck::new(target_carbs, carbs, within(carbs, target_carbs, 0.20)),
    );
    out.insert(
        "fat".into(),
        GoalCheck::new(target_fat, fat, within(fat, target_fat, 0.20)),
    );
    out
}

pub fn recommendations(goals: &GoalsMet) -> Vec<String> {
    let missed = |key: &str| goals.get(key).map_or(false, |g| !g.met);
    let mut out = Vec::new();

    if let Some(cal) = goals.get("calories").filter(|g| !g.met) {
        if cal.percentage > 110.0 {
            out.push("Zvogëloni porcionet për të arritur objektivin e kalorive.".to_string());
        } else if cal.percentage < 90.0 {
            out.push("Shtoni ushqime të lehta të shëndetshme për të rritur kaloritë ditore.".to_string());
        }
    }
    if missed("protein") {
        out.push("Rritni proteinën me mish pa yndyrë, peshk ose burime bimore.".to_string());
    }
    if missed("carbs") {
        out.push("Përqendrohuni te karbohidratet komplekse si drithërat e plota dhe perimet.".to_string());
    }
    if missed("fat") {
        out.push("Përfshini yndyrna të shëndetshme si vaj ulliri, arra dhe avokado.".to_string());
    }
    if goals.values().filter(|g| g.met).count() >= 3 {
        out.push("Punë e shkëlqyer! Po arrini shumicën e objektivave ushqyese.".to_string());
    }
    if out.is_empty() {
        out.push("Vazhdoni kështu! Ushqyerja juaj është e balancuar.".to_string());
    }
    out
}

/// Totals over the days that have food; empty days do not drag averages.
pub fn build_report(plan: &WeekPlan, profile: &BodyProfile) -> ReportDraft {
    let days: Vec<DayTotals> = day_totals(plan).into_iter().filter(|d| d.kcal > 0).collect();
    let n = days.len().max(1) as f64;

    let total_calories: u32 = days.iter().map(|d| d.kcal).sum();
    let avg_kcal = total_calories as f64 / n;
    let protein_avg = days.iter().map(|d| d.protein).sum::<f64>() / n;
    let carbs_avg = days.iter().map(|d| d.carbs).sum::<f64>() / n;
    let fat_avg = days.iter().map(|d| d.fat).sum::<f64>() / n;

    let goals = goals_met(profile, avg_kcal, protein_avg, carbs_avg, fat_avg);
    let recommendations = recommendations(&goals);
    ReportDraft {
        total_calories,
        avg_daily_calories: avg_kcal as u32,
        protein_avg: round1(protein_avg),
        carbs_avg: round1(carbs_avg),
        fat_avg: round1(fat_avg),
        days_with_food: days.len(),
        goals_met: goals,
        recommendations,
    }
}
