use serde::{Deserialize, Serialize};

use crate::{nutrition::MealSlot, recipes::Recipe};

pub const DAYS: [&str; 7] = [
    "E Hënë",
    "E Martë",
    "E Mërkurë",
    "E Enjte",
    "E Premte",
    "E Shtunë",
    "E Diel",
];

/// Shown in place of an empty slot.
pub const NO_RECIPE: &str = "Nuk u gjet recetë";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub day: String,
    pub breakfast: Option<Recipe>,
    pub lunch: Option<Recipe>,
    pub dinner: Option<Recipe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snack: Option<Recipe>,
}

impl DayPlan {
    pub fn new(day: &str) -> Self {
        Self {
            day: day.to_string(),
            ..Default::default()
        }
    }

    pub fn get(&self, slot: MealSlot) -> Option<&Recipe> {
        match slot {
            MealSlot::Breakfast => self.breakfast.as_ref(),
            MealSlot::Lunch => self.lunch.as_ref(),
            MealSlot::Dinner => self.dinner.as_ref(),
            MealSlot::Snack => self.snack.as_ref(),
        }
    }

    pub fn set(&mut self, slot: MealSlot, recipe: Option<Recipe>) {
        let target = match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
            MealSlot::Snack => &mut self.snack,
        };
        *target = recipe;
    }

    pub fn meals(&self) -> impl Iterator<Item = (MealSlot, &Recipe)> {
        MealSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|r| (slot, r)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeekPlan {
    pub days: Vec<DayPlan>,
}

impl WeekPlan {
    /// Every filled slot with its day label.
    pub fn meals(&self) -> impl Iterator<Item = (&str, MealSlot, &Recipe)> {
        self.days
            .iter()
            .flat_map(|d| d.meals().map(move |(slot, r)| (d.day.as_str(), slot, r)))
    }

    pub fn for_each_meal_mut(&mut self, mut f: impl FnMut(&mut Recipe)) {
        for day in &mut self.days {
            for recipe in [
                &mut day.breakfast,
                &mut day.lunch,
                &mut day.dinner,
                &mut day.snack,
            ]
            .into_iter()
            .flatten()
            {
                f(recipe);
            }
        }
    }

    pub fn empty_slots(&self) -> usize {
        self.days
            .iter()
            .map(|d| MealSlot::MAIN.iter().filter(|s| d.get(**s).is_none()).count())
            .sum()
    }
}
