use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Raised when a form value matches none of the known labels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized {kind}: {value}")]
pub struct UnknownLabel {
    pub kind: &'static str,
    pub value: String,
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['_', ' '], "-")
}

/// Fitness objective selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Goal {
    WeightLoss,
    Maintenance,
    MuscleGain,
}

impl Goal {
    pub const ALL: [Goal; 3] = [Goal::WeightLoss, Goal::Maintenance, Goal::MuscleGain];

    pub fn label_sq(self) -> &'static str {
        match self {
            Goal::WeightLoss => "Humbje peshe",
            Goal::Maintenance => "Mbajtje",
            Goal::MuscleGain => "Shtim muskuj",
        }
    }
}

impl FromStr for Goal {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "weight-loss" | "humbje-peshe" | "humbje" => Ok(Goal::WeightLoss),
            "maintenance" | "mbajtje" => Ok(Goal::Maintenance),
            "muscle-gain" | "muscle-building" | "shtim-muskuj" => Ok(Goal::MuscleGain),
            _ => Err(UnknownLabel {
                kind: "goal",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Goal {
    type Error = UnknownLabel;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Daily meal occasion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];
    /// Slots filled from the recipe book.
    pub const MAIN: [MealSlot; 3] = [MealSlot::Breakfast, MealSlot::Lunch, MealSlot::Dinner];

    pub fn as_str(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "breakfast",
            MealSlot::Lunch => "lunch",
            MealSlot::Dinner => "dinner",
            MealSlot::Snack => "snack",
        }
    }

    pub fn label_sq(self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Mëngjes",
            MealSlot::Lunch => "Drekë",
            MealSlot::Dinner => "Darkë",
            MealSlot::Snack => "Ushqim i lehtë",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "breakfast" | "mëngjes" | "mengjes" => Ok(MealSlot::Breakfast),
            "lunch" | "drekë" | "dreke" => Ok(MealSlot::Lunch),
            "dinner" | "darkë" | "darke" => Ok(MealSlot::Dinner),
            "snack" | "snacks" | "ushqim-i-lehtë" | "ushqim-i-lehte" => Ok(MealSlot::Snack),
            _ => Err(UnknownLabel {
                kind: "meal slot",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for MealSlot {
    type Error = UnknownLabel;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Gender {
    Male,
    Female,
}

impl FromStr for Gender {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "male" | "m" | "mashkull" => Ok(Gender::Male),
            "female" | "f" | "femër" | "femer" => Ok(Gender::Female),
            _ => Err(UnknownLabel {
                kind: "gender",
                value: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = UnknownLabel;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Daily activity level used as the TDEE multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Activity {
    Sedentary,
    Moderate,
    Athlete,
}

impl Activity {
    pub fn multiplier(self) -> f64 {
        match self {
            Activity::Sedentary => 1.2,
            Activity::Moderate => 1.55,
            Activity::Athlete => 1.725,
        }
    }
}

impl FromStr for Activity {
    type Err = UnknownLabel;

    // UI labels carry a parenthesised hint, e.g. "Mesatar (3-4x/ javë)".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n = normalize(s);
        if n == "sedentary" || n.starts_with("në-zyrë") || n.starts_with("ne-zyre") {
            Ok(Activity::Sedentary)
        } else if n == "moderate" || n.starts_with("mesatar") {
            Ok(Activity::Moderate)
        } else if n == "athlete" || n.starts_with("sportist") {
            Ok(Activity::Athlete)
        } else {
            Err(UnknownLabel {
                kind: "activity",
                value: s.to_string(),
            })
        }
    }
}

impl TryFrom<String> for Activity {
    type Error = UnknownLabel;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Body data captured on the profile form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyProfile {
    pub age: u32,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Gender,
    pub activity: Activity,
    pub goal: Goal,
}

impl Default for BodyProfile {
    fn default() -> Self {
        Self {
            age: 28,
            height_cm: 178.0,
            weight_kg: 78.0,
            gender: Gender::Male,
            activity: Activity::Moderate,
            goal: Goal::WeightLoss,
        }
    }
}

impl BodyProfile {
    /// Bounds of the profile form inputs.
    pub fn validate(&self) -> Result<(), String> {
        if !(14..=90).contains(&self.age) {
            return Err("age must be between 14 and 90".into());
        }
        if !(130.0..=220.0).contains(&self.height_cm) {
            return Err("height must be between 130 and 220 cm".into());
        }
        if !(35.0..=250.0).contains(&self.weight_kg) {
            return Err("weight must be between 35 and 250 kg".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn goal_parses_albanian_and_english_labels() {
        assert_eq!("Humbje peshe".parse::<Goal>().unwrap(), Goal::WeightLoss);
        assert_eq!("weight-loss".parse::<Goal>().unwrap(), Goal::WeightLoss);
        assert_eq!("Mbajtje".parse::<Goal>().unwrap(), Goal::Maintenance);
        assert_eq!("Shtim muskuj".parse::<Goal>().unwrap(), Goal::MuscleGain);
        assert_eq!("Muscle Building".parse::<Goal>().unwrap(), Goal::MuscleGain);
        assert!("bulk".parse::<Goal>().is_err());
    }

    #[test]
    fn meal_slot_parses_labels() {
        assert_eq!("Mëngjes".parse::<MealSlot>().unwrap(), MealSlot::Breakfast);
        assert_eq!("DINNER".parse::<MealSlot>().unwrap(), MealSlot::Dinner);
        assert_eq!("snack".parse::<MealSlot>().unwrap(), MealSlot::Snack);
        let err = "brunch".parse::<MealSlot>().unwrap_err();
        assert_eq!(err.kind, "meal slot");
    }

    #[test]
    fn activity_accepts_ui_labels() {
        assert_eq!(
            "Në zyrë (pak aktiv)".parse::<Activity>().unwrap(),
            Activity::Sedentary
        );
        assert_eq!(
            "Mesatar (3-4x/ javë)".parse::<Activity>().unwrap(),
            Activity::Moderate
        );
        assert_eq!(
            "Sportist (5-6x/ javë)".parse::<Activity>().unwrap(),
            Activity::Athlete
        );
    }

    #[test]
    fn goal_serde_uses_kebab_case_and_accepts_labels() {
        let json = serde_json::to_string(&Goal::MuscleGain).unwrap();
        assert_eq!(json, "\"muscle-gain\"");
        let g: Goal = serde_json::from_str("\"Humbje peshe\"").unwrap();
        assert_eq!(g, Goal::WeightLoss);
    }

    #[test]
    fn profile_bounds() {
        let mut p = BodyProfile::default();
        assert!(p.validate().is_ok());
        p.age = 10;
        assert!(p.validate().is_err());
    }
}
