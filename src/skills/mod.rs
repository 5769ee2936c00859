use std::{fmt, str::FromStr};

use axum::Router;
use serde::{Deserialize, Serialize};

use crate::{nutrition::types::UnknownLabel, state::AppState};

pub mod adapter;
pub mod handlers;

pub use adapter::{adapt, SkillNotes};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CookingSkill {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CookingSkill {
    pub fn as_str(self) -> &'static str {
        match self {
            CookingSkill::Beginner => "beginner",
            CookingSkill::Intermediate => "intermediate",
            CookingSkill::Advanced => "advanced",
        }
    }

    /// Recipe tags that suit this level; intermediate has none.
    pub fn preferred_tags(self) -> &'static [&'static str] {
        match self {
            CookingSkill::Beginner => &["quick", "easy", "simple"],
            CookingSkill::Intermediate => &[],
            CookingSkill::Advanced => &["complex", "advanced", "gourmet"],
        }
    }
}

impl fmt::Display for CookingSkill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CookingSkill {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" | "fillestar" => Ok(CookingSkill::Beginner),
            "intermediate" | "mesatar" => Ok(CookingSkill::Intermediate),
            "advanced" | "i avancuar" | "avancuar" => Ok(CookingSkill::Advanced),
            _ => Err(UnknownLabel {
                kind: "cooking skill",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for CookingSkill {
    type Error = UnknownLabel;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Five fixed suggestions for growing past the current level.
pub fn skill_recommendations(level: CookingSkill) -> [&'static str; 5] {
    match level {
        CookingSkill::Beginner => [
            "Start with simple one-pot meals",
            "Learn basic knife skills",
            "Practice with eggs (scrambled, fried, boiled)",
            "Master rice and pasta cooking",
            "Learn to season food properly",
        ],
        CookingSkill::Intermediate => [
            "Try more complex techniques like braising",
            "Experiment with different cuisines",
            "Learn to make your own stocks and sauces",
            "Practice timing multiple dishes",
            "Develop your palate and taste testing skills",
        ],
        CookingSkill::Advanced => [
            "Master advanced techniques like sous vide",
            "Create your own recipes",
            "Learn about food science and chemistry",
            "Experiment with fermentation",
            "Teach others to cook",
        ],
    }
}

pub fn router() -> Router<AppState> {
    handlers::routes()
}
