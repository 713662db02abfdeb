mod date;
mod location;
mod meal;

pub use date::{date_iter, format_date, parse_date, today};
pub use location::{is_valid_location, Location};
pub use meal::{is_valid_meal_type, MealType};

use crate::error::Result;

/// A validated request for one day's meal at one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuQuery {
    location: Location,
    date: String,
    meal_type: MealType,
}

impl MenuQuery {
    /// Validates location and meal type. The date is passed to the origin as-is.
    pub fn new(location: &str, date: impl Into<String>, meal_type: &str) -> Result<Self> {
        let location = location.parse()?;
        let meal_type = meal_type.parse()?;
        Ok(Self {
            location,
            date: date.into(),
            meal_type,
        })
    }

    #[must_use]
    pub const fn location(&self) -> Location {
        self.location
    }

    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    #[must_use]
    pub const fn meal_type(&self) -> MealType {
        self.meal_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_query_validates_location_first() {
        let err = MenuQuery::new("Unknown Hall", "1/1/2025", "Supper").unwrap_err();
        assert!(matches!(err, Error::InvalidLocation(_)));
        let err = MenuQuery::new("Stern Dining", "1/1/2025", "Supper").unwrap_err();
        assert!(matches!(err, Error::InvalidMealType(_)));
    }

    #[test]
    fn test_query_keeps_raw_date() {
        let query = MenuQuery::new("Stern Dining", "not a date", "Lunch").unwrap();
        assert_eq!(query.location(), Location::Stern);
        assert_eq!(query.date(), "not a date");
        assert_eq!(query.meal_type(), MealType::Lunch);
    }
}
