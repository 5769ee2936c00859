use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{nutrition::BodyProfile, skills::CookingSkill};

/// Dietary choices stored with the user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DietPreferences {
    pub dietary_restrictions: Vec<String>,
    pub favorite_cuisines: Vec<String>,
    pub disliked_foods: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub cooking_skill: String,
    pub profile: Json<BodyProfile>,
    pub preferences: Json<DietPreferences>,
    pub created_at: OffsetDateTime,
    pub last_login: OffsetDateTime,
}

pub struct NewUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub cooking_skill: CookingSkill,
    pub profile: &'a BodyProfile,
}

impl User {
    pub fn skill(&self) -> CookingSkill {
        self.cooking_skill.parse().unwrap_or_default()
    }

    pub async fn find_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, cooking_skill, profile, preferences,
                   created_at, last_login
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, cooking_skill, profile, preferences,
                   created_at, last_login
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, username, password_hash, cooking_skill, profile, preferences,
                   created_at, last_login
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(db: &SqlitePool, new: NewUser<'_>) -> anyhow::Result<User> {
        let now = OffsetDateTime::now_utc();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (id, email, username, password_hash, cooking_skill, profile, preferences,
                 created_at, last_login)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, email, username, password_hash, cooking_skill, profile, preferences,
                      created_at, last_login
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.email)
        .bind(new.username)
        .bind(new.password_hash)
        .bind(new.cooking_skill.as_str())
        .bind(Json(new.profile))
        .bind(Json(DietPreferences::default()))
        .bind(now)
        .bind(now)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    pub async fn touch_login(db: &SqlitePool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(OffsetDateTime::now_utc())
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_profile(db: &SqlitePool, id: Uuid, profile: &BodyProfile) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET profile = ? WHERE id = ?")
            .bind(Json(profile))
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_preferences(
        db: &SqlitePool,
        id: Uuid,
        prefs: &DietPreferences,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET preferences = ? WHERE id = ?")
            .bind(Json(prefs))
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn update_password(db: &SqlitePool, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    pub async fn set_skill(db: &SqlitePool, id: Uuid, skill: CookingSkill) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET cooking_skill = ? WHERE id = ?")
            .bind(skill.as_str())
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Dependent rows go with the user through ON DELETE CASCADE.
    pub async fn delete(db: &SqlitePool, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(db)
            .await?;
        Ok(res.rows_affected() == 1)
    }
}

/// Inserts a user with default profile for tests elsewhere in the crate.
#[cfg(test)]
pub(crate) async fn test_user(db: &SqlitePool, username: &str) -> Uuid {
    let profile = BodyProfile::default();
    let email = format!("{username}@test.al");
    User::create(
        db,
        NewUser {
            email: &email,
            username,
            password_hash: "hash",
            cooking_skill: CookingSkill::Intermediate,
            profile: &profile,
        },
    )
    .await
    .unwrap()
    .id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    #[tokio::test]
    async fn create_and_update_user() {
        let state = AppState::fake().await;
        let profile = BodyProfile::default();
        let user = User::create(
            &state.db,
            NewUser {
                email: "a@b.al",
                username: "arta",
                password_hash: "hash",
                cooking_skill: CookingSkill::Advanced,
                profile: &profile,
            },
        )
        .await
        .unwrap();
        assert_eq!(user.skill(), CookingSkill::Advanced);
        assert_eq!(user.profile.0, profile);

        let prefs = DietPreferences {
            disliked_foods: vec!["peshk".into()],
            ..Default::default()
        };
        User::update_preferences(&state.db, user.id, &prefs).await.unwrap();
        User::set_skill(&state.db, user.id, CookingSkill::Beginner).await.unwrap();

        let found = User::find_by_username(&state.db, "arta").await.unwrap().unwrap();
        assert_eq!(found.preferences.0, prefs);
        assert_eq!(found.skill(), CookingSkill::Beginner);

        assert!(User::delete(&state.db, user.id).await.unwrap());
        assert!(User::find_by_id(&state.db, user.id).await.unwrap().is_none());
    }
}
