//! Weekly meal planning over the recipe book.

pub mod filter;
pub mod plan;
pub mod shopping;
pub mod week;

pub use plan::{DayPlan, WeekPlan, DAYS, NO_RECIPE};
pub use shopping::{shopping_list, ShoppingItem, SUPPLEMENT_MARK};
pub use week::{make_week_plan, PlanOptions, PlanOutcome};
