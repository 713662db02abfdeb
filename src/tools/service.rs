use std::{collections::BTreeMap, sync::Arc};

use serde::Serialize;
use tokio::sync::Mutex;

use crate::{
    cache::MenuCache,
    error::{Error, Result},
    fetch::DiningHallClient,
    menu::{
        date_iter, format_date, is_valid_location, is_valid_meal_type, parse_date, today,
        Location, MealType, MenuQuery,
    },
};

pub const DEFAULT_RANGE_DAYS: i64 = 7;
pub const MAX_RANGE_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuResponse {
    pub location: Location,
    pub date: String,
    pub meal_type: MealType,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuRangeResponse {
    pub location: Location,
    pub meal_type: MealType,
    /// Items per `M/D/YYYY` date. Days that failed to load are empty.
    pub menus: BTreeMap<String, Vec<String>>,
}

/// The session client serialises all origin traffic; the cache is shared.
pub struct MenuService {
    client: Mutex<DiningHallClient>,
    cache: Arc<MenuCache>,
}

impl MenuService {
    pub fn new(client: DiningHallClient, cache: Arc<MenuCache>) -> Self {
        Self {
            client: Mutex::new(client),
            cache,
        }
    }

    pub fn cache(&self) -> &MenuCache {
        &self.cache
    }

    /// Menu for one day, today when `date` is missing or blank.
    pub async fn get_menu(
        &self,
        location: &str,
        date: Option<&str>,
        meal_type: &str,
    ) -> Result<MenuResponse> {
        check_names(location, meal_type)?;
        let date = date
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map_or_else(today, ToOwned::to_owned);
        let query = MenuQuery::new(location, date, meal_type)?;
        let items = self.items_for(&query).await?;
        Ok(MenuResponse {
            location: query.location(),
            date: query.date().to_owned(),
            meal_type: query.meal_type(),
            items,
        })
    }

    async fn items_for(&self, query: &MenuQuery) -> Result<Vec<String>> {
        let (location, date, meal_type) = (
            query.location().name(),
            query.date(),
            query.meal_type().as_str(),
        );
        if let Some(items) = self.cache.get(location, date, meal_type).await {
            log::trace!("Cache hit for {location} {meal_type} on {date}");
            return Ok(items);
        }
        let items = self.client.lock().await.fetch_menu(query).await?;
        self.cache.set(location, date, meal_type, &items).await;
        Ok(items)
    }

    /// Menus for `days` consecutive days (default 7, at most 30).
    pub async fn get_menus_range(
        &self,
        location: &str,
        meal_type: &str,
        days: Option<i64>,
        start_date: Option<&str>,
    ) -> Result<MenuRangeResponse> {
        check_names(location, meal_type)?;
        let location: Location = location.parse()?;
        let meal_type: MealType = meal_type.parse()?;
        let start = match start_date.map(str::trim).filter(|d| !d.is_empty()) {
            Some(d) => parse_date(d)?,
            None => parse_date(&today())?,
        };

        let mut menus = BTreeMap::new();
        for date in date_iter(start, clamp_days(days)).map(format_date) {
            let query = MenuQuery::new(location.name(), date.as_str(), meal_type.as_str())?;
            let items = self.items_for(&query).await.unwrap_or_else(|e| {
                log::warn!("Could not load {location} {meal_type} on {date}: {e}");
                Vec::new()
            });
            menus.insert(date, items);
        }
        Ok(MenuRangeResponse {
            location,
            meal_type,
            menus,
        })
    }
}

/// Rejects unknown names before a date is defaulted or parsed.
fn check_names(location: &str, meal_type: &str) -> Result<()> {
    if !is_valid_location(location) {
        return Err(Error::InvalidLocation(location.to_owned()));
    }
    if !is_valid_meal_type(meal_type) {
        return Err(Error::InvalidMealType(meal_type.to_owned()));
    }
    Ok(())
}

fn clamp_days(days: Option<i64>) -> i64 {
    days.filter(|&d| d > 0)
        .unwrap_or(DEFAULT_RANGE_DAYS)
        .min(MAX_RANGE_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::test_origin::{spawn_origin, Origin};

    async fn setup() -> (Arc<Origin>, MenuService) {
        let origin = Arc::new(Origin::default());
        let base_url = spawn_origin(Arc::clone(&origin)).await;
        let client = DiningHallClient::new(&base_url).unwrap();
        (origin, MenuService::new(client, Arc::new(MenuCache::default())))
    }

    #[test]
    fn test_clamp_days() {
        assert_eq!(clamp_days(None), 7);
        assert_eq!(clamp_days(Some(0)), 7);
        assert_eq!(clamp_days(Some(-3)), 7);
        assert_eq!(clamp_days(Some(3)), 3);
        assert_eq!(clamp_days(Some(90)), 30);
    }

    #[tokio::test]
    async fn test_get_menu_uses_cache() {
        let (origin, service) = setup().await;
        let first = service
            .get_menu("Stern Dining", Some("1/5/2025"), "Lunch")
            .await
            .unwrap();
        assert_eq!(first.items, vec!["Scrambled Eggs", "Bacon"]);
        assert_eq!(first.location, Location::Stern);
        assert_eq!(first.date, "1/5/2025");

        let second = service
            .get_menu("Stern Dining", Some("1/5/2025"), "Lunch")
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(origin.counts(), (2, 1, 1));

        service
            .get_menu("Stern Dining", Some("1/6/2025"), "Lunch")
            .await
            .unwrap();
        assert_eq!(origin.counts(), (2, 1, 2));
    }

    #[tokio::test]
    async fn test_get_menu_defaults_to_today() {
        let (_origin, service) = setup().await;
        let res = service.get_menu("Ricker Dining", Some("  "), "Dinner").await.unwrap();
        assert_eq!(res.date, today());
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let (origin, service) = setup().await;
        Origin::set(&origin.fail_postbacks, true);
        let err = service
            .get_menu("EVGR Dining", Some("1/5/2025"), "Lunch")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Status { .. }));
        assert_eq!(service.cache.len().await, 0);
    }

    #[tokio::test]
    async fn test_invalid_location_makes_no_requests() {
        let (origin, service) = setup().await;
        let err = service
            .get_menu("Unknown Hall", Some("1/1/2025"), "Lunch")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLocation(_)));
        let err = service
            .get_menus_range("Unknown Hall", "Lunch", None, None)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(origin.counts(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_get_menus_range() {
        let (origin, service) = setup().await;
        let res = service
            .get_menus_range("Branner Dining", "Dinner", Some(3), Some("1/30/2025"))
            .await
            .unwrap();
        let dates: Vec<_> = res.menus.keys().cloned().collect();
        assert_eq!(dates, vec!["1/30/2025", "1/31/2025", "2/1/2025"]);
        assert!(res.menus.values().all(|items| items.len() == 2));
        assert_eq!(origin.counts(), (2, 1, 3));
    }

    #[tokio::test]
    async fn test_get_menus_range_failed_days_are_empty() {
        let (origin, service) = setup().await;
        Origin::set(&origin.fail_page_loads, true);
        let res = service
            .get_menus_range("Branner Dining", "Lunch", Some(2), Some("3/1/2025"))
            .await
            .unwrap();
        assert_eq!(res.menus.len(), 2);
        assert!(res.menus.values().all(Vec::is_empty));
    }

    #[tokio::test]
    async fn test_names_are_checked_before_the_date() {
        let (origin, service) = setup().await;
        let err = service
            .get_menus_range("Branner Dining", "Supper", Some(2), Some("not a date"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidMealType(m) if m == "Supper"));
        let err = service
            .get_menu("Nowhere", Some("1/5/2025"), "Lunch")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLocation(l) if l == "Nowhere"));
        assert_eq!(origin.counts(), (0, 0, 0));
    }

    #[tokio::test]
    async fn test_get_menus_range_rejects_bad_start_date() {
        let (origin, service) = setup().await;
        let err = service
            .get_menus_range("Branner Dining", "Lunch", Some(2), Some("2025-03-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDate(_)));
        assert_eq!(origin.counts(), (0, 0, 0));
    }

    #[test]
    fn test_response_serializes_camel_case() {
        let res = MenuResponse {
            location: Location::Arrillaga,
            date: "1/5/2025".into(),
            meal_type: MealType::Brunch,
            items: vec!["Waffles".into()],
        };
        assert_eq!(
            serde_json::to_value(&res).unwrap(),
            serde_json::json!({
                "location": "Arrillaga Family Dining Commons",
                "date": "1/5/2025",
                "mealType": "Brunch",
                "items": ["Waffles"],
            })
        );
    }
}
