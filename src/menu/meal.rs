use std::{fmt, str::FromStr};

use crate::error::Error;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Brunch,
}

impl MealType {
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Dinner, Self::Brunch];

    /// The value posted to the origin's meal type field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Brunch => "Brunch",
        }
    }
}

impl FromStr for MealType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|meal_type| meal_type.as_str() == s)
            .ok_or_else(|| Error::InvalidMealType(s.to_owned()))
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_valid_meal_type(meal_type: &str) -> bool {
    meal_type.parse::<MealType>().is_ok()
}
