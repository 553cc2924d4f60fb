//! Factor resolver
//!
//! Derives the location cost multiplier and the seasonal/day-of-week
//! multiplier from a location and a wedding date. Lookups are table driven:
//! city first, then country, then neutral `1.0`.

use chrono::{Datelike, NaiveDate};

use crate::error::BudgetResult;
use crate::models::{parse_wedding_date, BudgetLocation, DayOfWeek};

/// Surcharge layered on top of the base factor for destination weddings
pub const DESTINATION_SURCHARGE: f64 = 1.15;

/// City cost-of-living tiers, keyed by lowercase city name
const CITY_FACTORS: &[(&str, f64)] = &[
    ("new york", 1.6),
    ("nyc", 1.6),
    ("manhattan", 1.7),
    ("brooklyn", 1.45),
    ("san francisco", 1.55),
    ("los angeles", 1.4),
    ("boston", 1.35),
    ("washington", 1.3),
    ("seattle", 1.3),
    ("honolulu", 1.3),
    ("chicago", 1.25),
    ("miami", 1.25),
    ("san diego", 1.25),
    ("denver", 1.1),
    ("austin", 1.1),
    ("portland", 1.05),
    ("nashville", 1.05),
    ("atlanta", 1.05),
    ("houston", 0.95),
    ("phoenix", 0.95),
    ("las vegas", 0.95),
    ("kansas city", 0.9),
    ("st. louis", 0.9),
    ("st louis", 0.9),
    ("cleveland", 0.85),
    ("detroit", 0.85),
    ("memphis", 0.85),
    ("london", 1.5),
    ("paris", 1.45),
    ("sydney", 1.3),
    ("dublin", 1.25),
    ("toronto", 1.2),
    ("vancouver", 1.2),
];

/// Country-level defaults used when the city is not listed
const COUNTRY_FACTORS: &[(&str, f64)] = &[
    ("united states", 1.0),
    ("usa", 1.0),
    ("us", 1.0),
    ("united kingdom", 1.2),
    ("uk", 1.2),
    ("england", 1.2),
    ("ireland", 1.15),
    ("france", 1.15),
    ("italy", 1.1),
    ("switzerland", 1.5),
    ("canada", 1.05),
    ("australia", 1.1),
    ("germany", 1.05),
    ("spain", 0.9),
    ("portugal", 0.85),
    ("greece", 0.9),
    ("mexico", 0.7),
    ("thailand", 0.6),
    ("india", 0.5),
];

/// Month multipliers, January first. Peak season is May-October.
const MONTH_FACTORS: [f64; 12] = [0.85, 0.85, 0.9, 1.0, 1.1, 1.2, 1.1, 1.1, 1.2, 1.2, 0.95, 0.9];

/// Multiplier for the day-of-week bucket
pub fn day_factor(day: DayOfWeek) -> f64 {
    match day {
        DayOfWeek::Saturday => 1.15,
        DayOfWeek::Friday | DayOfWeek::Sunday => 1.05,
        DayOfWeek::Weekday => 0.85,
    }
}

/// Multiplier for a calendar month (1-12); out-of-range months are neutral
pub fn month_factor(month: u32) -> f64 {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_FACTORS.get(i as usize))
        .copied()
        .unwrap_or(1.0)
}

/// Resolved adjustment factors for one wedding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factors {
    /// Base location tier times the destination surcharge
    pub location_factor: f64,
    /// Month factor times day factor
    pub seasonal_factor: f64,
    pub day_of_week: DayOfWeek,
    pub month_factor: f64,
    pub day_factor: f64,
    /// Where the base location factor came from
    pub location_source: LocationSource,
    pub destination: bool,
}

/// Which lookup table produced the location factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    City,
    Country,
    Default,
}

/// Stateless resolver for location and seasonal factors
#[derive(Debug, Clone, Copy, Default)]
pub struct FactorResolver;

impl FactorResolver {
    /// Resolve factors for a location and an already-validated date
    pub fn resolve(location: &BudgetLocation, wedding_date: NaiveDate) -> Factors {
        let (base, location_source) = Self::base_location_factor(location);
        let location_factor = if location.is_destination {
            round4(base * DESTINATION_SURCHARGE)
        } else {
            base
        };

        let day_of_week = DayOfWeek::from_weekday(wedding_date.weekday());
        let month = month_factor(wedding_date.month());
        let day = day_factor(day_of_week);

        Factors {
            location_factor,
            seasonal_factor: round4(month * day),
            day_of_week,
            month_factor: month,
            day_factor: day,
            location_source,
            destination: location.is_destination,
        }
    }

    /// Resolve factors from a date string, failing with `InvalidDate`
    pub fn resolve_str(location: &BudgetLocation, wedding_date: &str) -> BudgetResult<Factors> {
        let date = parse_wedding_date(wedding_date)?;
        Ok(Self::resolve(location, date))
    }

    /// Resolve using the date attached to the location
    pub fn resolve_location(location: &BudgetLocation) -> BudgetResult<Factors> {
        let date = location.parsed_wedding_date()?;
        Ok(Self::resolve(location, date))
    }

    fn base_location_factor(location: &BudgetLocation) -> (f64, LocationSource) {
        let city = normalize(&location.city);
        if let Some(factor) = lookup(CITY_FACTORS, &city) {
            return (factor, LocationSource::City);
        }

        let country = normalize(&location.country);
        if let Some(factor) = lookup(COUNTRY_FACTORS, &country) {
            return (factor, LocationSource::Country);
        }

        (1.0, LocationSource::Default)
    }
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn lookup(table: &[(&str, f64)], key: &str) -> Option<f64> {
    table.iter().find(|(name, _)| *name == key).map(|(_, f)| *f)
}

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_city_lookup_wins_over_country() {
        let location = BudgetLocation::new("  San   Francisco ", "United States");
        let factors = FactorResolver::resolve(&location, date("2025-04-15"));
        assert_eq!(factors.location_factor, 1.55);
        assert_eq!(factors.location_source, LocationSource::City);
    }

    #[test]
    fn test_country_fallback_then_neutral() {
        let italy = BudgetLocation::new("Lucca", "Italy");
        let factors = FactorResolver::resolve(&italy, date("2025-04-15"));
        assert_eq!(factors.location_factor, 1.1);
        assert_eq!(factors.location_source, LocationSource::Country);

        let unknown = BudgetLocation::new("Smallville", "Atlantis");
        let factors = FactorResolver::resolve(&unknown, date("2025-04-15"));
        assert_eq!(factors.location_factor, 1.0);
        assert_eq!(factors.location_source, LocationSource::Default);
    }

    #[test]
    fn test_destination_surcharge_layers_on_base() {
        let location = BudgetLocation::new("Lucca", "Italy").as_destination();
        let factors = FactorResolver::resolve(&location, date("2025-04-15"));
        assert_eq!(factors.location_factor, 1.265);

        let neutral = BudgetLocation::new("Nowhere", "Atlantis").as_destination();
        let factors = FactorResolver::resolve(&neutral, date("2025-04-15"));
        assert!(factors.location_factor > 1.0);
    }

    #[test]
    fn test_day_of_week_ordering() {
        let location = BudgetLocation::new("Nowhere", "Atlantis");
        // 2025-04-19 is a Saturday, 04-18 a Friday, 04-15 a Tuesday
        let saturday = FactorResolver::resolve(&location, date("2025-04-19"));
        let friday = FactorResolver::resolve(&location, date("2025-04-18"));
        let tuesday = FactorResolver::resolve(&location, date("2025-04-15"));

        assert_eq!(saturday.day_of_week, DayOfWeek::Saturday);
        assert_eq!(friday.day_of_week, DayOfWeek::Friday);
        assert_eq!(tuesday.day_of_week, DayOfWeek::Weekday);
        assert!(saturday.seasonal_factor > friday.seasonal_factor);
        assert!(friday.seasonal_factor > 1.0);
        assert!(tuesday.seasonal_factor < 1.0);
    }

    #[test]
    fn test_seasonal_combines_month_and_day() {
        let location = BudgetLocation::new("Nowhere", "Atlantis");
        // June Saturday: 1.2 * 1.15
        let june = FactorResolver::resolve(&location, date("2025-06-14"));
        assert_eq!(june.seasonal_factor, 1.38);
        // January weekday: 0.85 * 0.85
        let january = FactorResolver::resolve(&location, date("2025-01-14"));
        assert_eq!(january.seasonal_factor, 0.7225);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let location = BudgetLocation::new("Austin", "USA");
        let a = FactorResolver::resolve(&location, date("2025-10-11"));
        let b = FactorResolver::resolve(&location, date("2025-10-11"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_unparseable_date() {
        let location = BudgetLocation::new("Austin", "USA");
        let err = FactorResolver::resolve_str(&location, "next spring").unwrap_err();
        assert!(matches!(err, crate::error::BudgetError::InvalidDate(_)));
    }

    #[test]
    fn test_resolve_location_uses_attached_date() {
        let location = BudgetLocation::new("Austin", "USA").with_wedding_date("2025-10-11");
        let factors = FactorResolver::resolve_location(&location).unwrap();
        assert_eq!(factors.day_of_week, DayOfWeek::Saturday);
        assert_eq!(factors.location_factor, 1.1);
    }

    #[test]
    fn test_month_factor_bounds() {
        assert_eq!(month_factor(0), 1.0);
        assert_eq!(month_factor(13), 1.0);
        assert_eq!(month_factor(6), 1.2);
    }
}
