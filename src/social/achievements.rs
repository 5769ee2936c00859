use serde::Serialize;
use serde_json::json;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{analytics, plans, reports::generator::GoalsMet};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

pub const FIRST_WEEK: &str = "first_week";
pub const MEAL_PREP_PRO: &str = "meal_prep_pro";
pub const PROTEIN_MASTER: &str = "protein_master";
pub const SOCIAL_BUTTERFLY: &str = "social_butterfly";

pub static ACHIEVEMENTS: [Achievement; 4] = [
    Achievement {
        id: FIRST_WEEK,
        name: "Java e parë",
        description: "Krijuat planin tuaj të parë javor.",
    },
    Achievement {
        id: MEAL_PREP_PRO,
        name: "Mjeshtër i planifikimit",
        description: "Krijuat 10 plane ushqimore.",
    },
    Achievement {
        id: PROTEIN_MASTER,
        name: "Mjeshtër i proteinës",
        description: "Arritët objektivin e proteinës në një raport javor.",
    },
    Achievement {
        id: SOCIAL_BUTTERFLY,
        name: "Flutur sociale",
        description: "Ndatë progresin tuaj me miqtë.",
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

#[derive(Debug, Serialize)]
pub struct EarnedAchievement {
    #[serde(flatten)]
    pub achievement: Achievement,
    #[serde(with = "time::serde::rfc3339")]
    pub awarded_at: OffsetDateTime,
}

#[derive(FromRow)]
struct AwardRow {
    achievement_id: String,
    awarded_at: OffsetDateTime,
}

/// Returns true only the first time; repeated awards are no-ops.
pub async fn award(db: &SqlitePool, user_id: Uuid, id: &'static str) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        INSERT OR IGNORE INTO user_achievements (user_id, achievement_id, awarded_at)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(id)
    .bind(OffsetDateTime::now_utc())
    .execute(db)
    .await?;

    let new = res.rows_affected() == 1;
    if new {
        tracing::info!(%user_id, achievement = id, "achievement awarded");
        analytics::record(
            db,
            Some(user_id),
            "achievement_awarded",
            json!({ "achievements": [id] }),
        )
        .await;
    }
    Ok(new)
}

async fn award_all(
    db: &SqlitePool,
    user_id: Uuid,
    ids: impl IntoIterator<Item = &'static str>,
) -> anyhow::Result<Vec<&'static str>> {
    let mut awarded = Vec::new();
    for id in ids {
        if award(db, user_id, id).await? {
            awarded.push(id);
        }
    }
    Ok(awarded)
}

/// Activity-based achievements: plan counts and shared progress.
pub async fn check_and_award(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<Vec<&'static str>> {
    let plans = plans::repo::count(db, user_id).await?;
    let shared = analytics::repo::count_event(db, user_id, "progress_shared").await?;

    let mut due = Vec::new();
    if plans >= 1 {
        due.push(FIRST_WEEK);
    }
    if plans >= 10 {
        due.push(MEAL_PREP_PRO);
    }
    if shared >= 1 {
        due.push(SOCIAL_BUTTERFLY);
    }
    award_all(db, user_id, due).await
}

/// Nutrition achievements from a freshly generated report.
pub async fn check_report(
    db: &SqlitePool,
    user_id: Uuid,
    goals: &GoalsMet,
) -> anyhow::Result<Vec<&'static str>> {
    let protein_met = goals.get("protein").map_or(false, |g| g.met);
    award_all(db, user_id, protein_met.then_some(PROTEIN_MASTER)).await
}

pub async fn list(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<Vec<EarnedAchievement>> {
    let rows = sqlx::query_as::<_, AwardRow>(
        r#"
        SELECT achievement_id, awarded_at
        FROM user_achievements
        WHERE user_id = ?
        ORDER BY awarded_at
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows
        .into_iter()
        .filter_map(|r| {
            find(&r.achievement_id).map(|a| EarnedAchievement {
                achievement: *a,
                awarded_at: r.awarded_at,
            })
        })
        .collect())
}
