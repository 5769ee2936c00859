use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::{
    preferences::{learning::RatedFood, PreferenceMap},
    reports::NutritionReport,
};

const STREAK_GAP: Duration = Duration::days(7);

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutritionAverages {
    pub avg_daily_calories: f64,
    pub avg_protein: f64,
    pub avg_carbs: f64,
    pub avg_fat: f64,
    pub goal_achievement_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FoodCount {
    pub food_item: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    pub total_meal_plans: usize,
    pub total_nutrition_reports: usize,
    pub total_food_ratings: i64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub nutrition: Option<NutritionAverages>,
    pub favorite_foods: Vec<RatedFood>,
    pub most_rated_foods: Vec<FoodCount>,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Plans no more than a week apart extend a streak. The current streak
/// counts back from the latest plan and is zero once that plan is more
/// than a week old. `dates` must be sorted ascending.
pub fn streaks(dates: &[OffsetDateTime], now: OffsetDateTime) -> (u32, u32) {
    let Some(last) = dates.last() else {
        return (0, 0);
    };

    let mut current = 0;
    if now - *last <= STREAK_GAP {
        current = 1;
        for pair in dates.windows(2).rev() {
            if pair[1] - pair[0] <= STREAK_GAP {
                current += 1;
            } else {
                break;
            }
        }
    }

    let mut longest = 1;
    let mut run = 1;
    for pair in dates.windows(2) {
        if pair[1] - pair[0] <= STREAK_GAP {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    (current, longest)
}

/// Averages over the four newest reports; `reports` is newest first.
pub fn nutrition_averages(reports: &[NutritionReport]) -> Option<NutritionAverages> {
    let recent = &reports[..reports.len().min(4)];
    if recent.is_empty() {
        return None;
    }
    let n = recent.len() as f64;
    let avg = |f: fn(&NutritionReport) -> f64| recent.iter().map(f).sum::<f64>() / n;

    let ratios: Vec<f64> = recent.iter().filter_map(NutritionReport::goal_ratio).collect();
    let goal_achievement_rate = if ratios.is_empty() {
        0.0
    } else {
        round1(ratios.iter().sum::<f64>() / ratios.len() as f64 * 100.0)
    };

    Some(NutritionAverages {
        avg_daily_calories: avg(|r| r.avg_daily_calories as f64).round(),
        avg_protein: round1(avg(|r| r.protein_avg)),
        avg_carbs: round1(avg(|r| r.carbs_avg)),
        avg_fat: round1(avg(|r| r.fat_avg)),
        goal_achievement_rate,
    })
}

pub fn build(
    plan_dates: &[OffsetDateTime],
    reports: &[NutritionReport],
    prefs: &PreferenceMap,
    now: OffsetDateTime,
) -> Insights {
    let (current_streak, longest_streak) = streaks(plan_dates, now);

    let mut favorite_foods: Vec<RatedFood> = prefs
        .iter()
        .filter(|(_, s)| s.avg_rating >= 4.0)
        .map(|(food, s)| RatedFood {
            food_item: food.clone(),
            avg_rating: s.avg_rating,
        })
        .collect();
    favorite_foods.sort_by(|a, b| {
        b.avg_rating
            .total_cmp(&a.avg_rating)
            .then_with(|| a.food_item.cmp(&b.food_item))
    });
    favorite_foods.truncate(5);

    let mut most_rated_foods: Vec<FoodCount> = prefs
        .iter()
        .map(|(food, s)| FoodCount {
            food_item: food.clone(),
            count: s.count,
        })
        .collect();
    most_rated_foods.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.food_item.cmp(&b.food_item)));
    most_rated_foods.truncate(5);

    Insights {
        total_meal_plans: plan_dates.len(),
        total_nutrition_reports: reports.len(),
        total_food_ratings: prefs.values().map(|s| s.count).sum(),
        current_streak,
        longest_streak,
        nutrition: nutrition_averages(reports),
        favorite_foods,
        most_rated_foods,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{preferences::PreferenceStat, reports::generator::GoalCheck};
    use sqlx::types::Json;
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn streaks_follow_weekly_gaps() {
        let now = datetime!(2025-03-01 12:00 UTC);
        let dates = [
            datetime!(2025-01-01 0:00 UTC),
            datetime!(2025-01-05 0:00 UTC),
            datetime!(2025-01-30 0:00 UTC),
            datetime!(2025-02-06 0:00 UTC),
            datetime!(2025-02-12 0:00 UTC),
            datetime!(2025-02-25 0:00 UTC),
            datetime!(2025-02-28 0:00 UTC),
        ];
        assert_eq!(streaks(&dates, now), (2, 3));

        // latest plan too old: no current streak
        let later = datetime!(2025-03-20 0:00 UTC);
        assert_eq!(streaks(&dates, later), (0, 3));
        assert_eq!(streaks(&[], now), (0, 0));
        assert_eq!(streaks(&dates[..1], datetime!(2025-01-02 0:00 UTC)), (1, 1));
    }

    fn report(kcal: i64, met: &[bool]) -> NutritionReport {
        let goals = met
            .iter()
            .enumerate()
            .map(|(i, m)| {
                (
                    format!("g{i}"),
                    GoalCheck {
                        target: 1.0,
                        actual: 1.0,
                        met: *m,
                        percentage: 100.0,
                    },
                )
            })
            .collect();
        let now = OffsetDateTime::now_utc();
        NutritionReport {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            week_start: now,
            total_calories: kcal * 7,
            avg_daily_calories: kcal,
            protein_avg: 100.0,
            carbs_avg: 200.0,
            fat_avg: 60.0,
            weight_change: 0.0,
            goals_met: Json(goals),
            recommendations: Json(Vec::new()),
            created_at: now,
        }
    }

    #[test]
    fn averages_use_four_newest_reports() {
        let reports = vec![
            report(2000, &[true, true, false, false]),
            report(2200, &[true, true, true, true]),
            report(1800, &[]),
            report(2000, &[false, false]),
            report(9000, &[true]),
        ];
        let avg = nutrition_averages(&reports).unwrap();
        assert_eq!(avg.avg_daily_calories, 2000.0);
        // (0.5 + 1.0 + 0.0) / 3
        assert_eq!(avg.goal_achievement_rate, 50.0);
        assert!(nutrition_averages(&[]).is_none());
    }

    #[test]
    fn food_lists_are_ranked() {
        let mut prefs = PreferenceMap::new();
        prefs.insert("byrek".into(), PreferenceStat { avg_rating: 4.5, count: 2 });
        prefs.insert("fasule".into(), PreferenceStat { avg_rating: 2.0, count: 6 });
        prefs.insert("tavë".into(), PreferenceStat { avg_rating: 5.0, count: 1 });
        let insights = build(&[], &[], &prefs, OffsetDateTime::now_utc());
        assert_eq!(insights.total_food_ratings, 9);
        assert_eq!(insights.favorite_foods[0].food_item, "tavë");
        assert_eq!(insights.favorite_foods.len(), 2);
        assert_eq!(insights.most_rated_foods[0].food_item, "fasule");
        assert_eq!(insights.current_streak, 0);
    }
}
