//! Preference adjuster
//!
//! Re-weights the estimated cost of preference-sensitive categories. Every
//! run recomputes from the pre-preference base each category records (see
//! [`BudgetCategory::apply_preference_multiplier`]) times the combined
//! multiplier, so applying the same preferences twice gives the same result
//! as applying them once, and a new choice replaces the old multiplier
//! instead of stacking on it. Percentages are never touched.

use tracing::debug;

use crate::models::{BudgetCategory, BudgetPreferences};

/// Prefix of the rationale notes written by the adjuster
pub const PREFERENCE_NOTE_PREFIX: &str = "Preference: ";

/// Categories whose cost depends on preferences
pub const PREFERENCE_SENSITIVE: &[&str] = &[
    "photography",
    "entertainment",
    "transportation",
    "catering",
    "flowers",
    "stationery",
    "attire",
];

const COVERAGE_BASELINE_HOURS: f64 = 6.0;
const COVERAGE_SURCHARGE_PER_HOUR: f64 = 0.10;
const MUSIC_BASELINE_HOURS: f64 = 4.0;
const MUSIC_SURCHARGE_PER_HOUR: f64 = 0.125;
const TRANSPORT_BASELINE_HOURS: f64 = 4.0;
const TRANSPORT_SURCHARGE_PER_HOUR: f64 = 0.10;
const MAKEUP_SURCHARGE_PER_SERVICE: f64 = 0.05;
const DIY_FLOWERS_DISCOUNT: f64 = 0.85;
const DIY_STATIONERY_DISCOUNT: f64 = 0.80;

/// The combined effect of the preferences on one category
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceEffect {
    pub category: &'static str,
    pub multiplier: f64,
    /// One short phrase per contributing preference
    pub reasons: Vec<String>,
}

struct EffectBuilder {
    multiplier: f64,
    reasons: Vec<String>,
}

impl EffectBuilder {
    fn new() -> Self {
        Self {
            multiplier: 1.0,
            reasons: Vec::new(),
        }
    }

    fn apply(&mut self, factor: f64, reason: String) {
        if (factor - 1.0).abs() < 1e-9 {
            return;
        }
        self.multiplier *= factor;
        self.reasons.push(reason);
    }

    fn finish(self, category: &'static str) -> PreferenceEffect {
        PreferenceEffect {
            category,
            multiplier: (self.multiplier * 10_000.0).round() / 10_000.0,
            reasons: self.reasons,
        }
    }
}

/// Stateless preference re-weighting
#[derive(Debug, Clone, Copy, Default)]
pub struct PreferenceAdjuster;

impl PreferenceAdjuster {
    /// Re-weight categories for a set of preferences
    ///
    /// Only categories listed in [`PREFERENCE_SENSITIVE`] are recomputed;
    /// the rest are returned as they are.
    pub fn apply(categories: &[BudgetCategory], preferences: &BudgetPreferences) -> Vec<BudgetCategory> {
        for key in preferences.unrecognized_keys() {
            debug!(key, "Ignoring unrecognized preference");
        }

        categories
            .iter()
            .map(|category| {
                let mut category = category.clone();
                if let Some(effect) = Self::effect_for(category.id.as_str(), preferences) {
                    category.apply_preference_multiplier(effect.multiplier);
                }
                category
            })
            .collect()
    }

    /// Check if preferences can change this category's cost
    pub fn is_sensitive(category_id: &str) -> bool {
        PREFERENCE_SENSITIVE.contains(&category_id)
    }

    /// Multiplier for one category, or `None` if preferences never touch it
    pub fn effect_for(category_id: &str, preferences: &BudgetPreferences) -> Option<PreferenceEffect> {
        let id: &'static str = PREFERENCE_SENSITIVE.iter().find(|&&c| c == category_id)?;
        let mut effect = EffectBuilder::new();
        let p = preferences;

        match id {
            "photography" => {
                if let Some(hours) = p.coverage_hours {
                    let extra = (hours - COVERAGE_BASELINE_HOURS).max(0.0);
                    effect.apply(
                        1.0 + COVERAGE_SURCHARGE_PER_HOUR * extra,
                        format!("{} hours of coverage", hours),
                    );
                }
                if let Some(coverage) = &p.photo_video_coverage {
                    let factor = if contains(coverage, "video") { 1.5 } else { 1.0 };
                    effect.apply(factor, format!("'{}' coverage", coverage));
                }
            }
            "entertainment" => {
                if let Some(choice) = &p.music_choice {
                    effect.apply(music_choice_factor(choice), format!("'{}' music", choice));
                }
                if let Some(hours) = p.music_hours {
                    let extra = (hours - MUSIC_BASELINE_HOURS).max(0.0);
                    effect.apply(
                        1.0 + MUSIC_SURCHARGE_PER_HOUR * extra,
                        format!("{} hours of music", hours),
                    );
                }
            }
            "transportation" => {
                if let Some(kind) = &p.transportation_type {
                    effect.apply(transportation_factor(kind), format!("'{}' transportation", kind));
                }
                if let Some(hours) = p.transportation_hours {
                    let extra = (hours - TRANSPORT_BASELINE_HOURS).max(0.0);
                    effect.apply(
                        1.0 + TRANSPORT_SURCHARGE_PER_HOUR * extra,
                        format!("{} hours of transportation", hours),
                    );
                }
            }
            "catering" => {
                if let Some(style) = &p.catering_style {
                    effect.apply(catering_style_factor(style), format!("'{}' catering", style));
                }
                if let Some(bar) = &p.bar_service {
                    effect.apply(bar_service_factor(bar), format!("'{}' bar service", bar));
                }
            }
            "flowers" => {
                if let Some(style) = &p.floral_style {
                    effect.apply(floral_style_factor(style), format!("'{}' florals", style));
                }
                if !p.diy_elements.is_empty() {
                    effect.apply(DIY_FLOWERS_DISCOUNT, "DIY elements".to_string());
                }
            }
            "stationery" => {
                if !p.diy_elements.is_empty() {
                    effect.apply(DIY_STATIONERY_DISCOUNT, "DIY elements".to_string());
                }
            }
            "attire" => {
                if let Some(coverage) = &p.beauty_coverage {
                    let factor = if contains(coverage, "party") { 1.25 } else { 1.0 };
                    effect.apply(factor, format!("'{}' beauty coverage", coverage));
                }
                if !p.makeup_services.is_empty() {
                    let count = p.makeup_services.len() as f64;
                    effect.apply(
                        1.0 + MAKEUP_SURCHARGE_PER_SERVICE * count,
                        format!("{} makeup services", p.makeup_services.len()),
                    );
                }
            }
            _ => {}
        }

        Some(effect.finish(id))
    }

    /// Every non-neutral effect, in category order
    pub fn effects(preferences: &BudgetPreferences) -> Vec<PreferenceEffect> {
        PREFERENCE_SENSITIVE
            .iter()
            .filter_map(|id| Self::effect_for(id, preferences))
            .filter(|e| !e.reasons.is_empty())
            .collect()
    }

    /// Rationale notes for the preferences, one per affected category
    pub fn describe(preferences: &BudgetPreferences) -> Vec<String> {
        Self::effects(preferences)
            .into_iter()
            .map(|effect| {
                format!(
                    "{}{} cost x{:.2} ({}).",
                    PREFERENCE_NOTE_PREFIX,
                    capitalize(effect.category),
                    effect.multiplier,
                    effect.reasons.join(", ")
                )
            })
            .collect()
    }
}

fn contains(value: &str, needle: &str) -> bool {
    value.to_lowercase().contains(needle)
}

fn music_choice_factor(choice: &str) -> f64 {
    let choice = choice.to_lowercase();
    if choice.contains("band") {
        1.6
    } else if choice.contains("quartet") {
        1.3
    } else if choice.contains("playlist") {
        0.4
    } else {
        1.0
    }
}

fn transportation_factor(kind: &str) -> f64 {
    let kind = kind.to_lowercase();
    if kind.contains("party bus") {
        2.2
    } else if kind.contains("limo") {
        1.8
    } else if kind.contains("suv") {
        1.3
    } else {
        1.0
    }
}

fn catering_style_factor(style: &str) -> f64 {
    let style = style.to_lowercase();
    if style.contains("buffet") {
        0.85
    } else if style.contains("plated") {
        1.15
    } else if style.contains("station") {
        1.3
    } else {
        1.0
    }
}

fn bar_service_factor(bar: &str) -> f64 {
    let bar = bar.to_lowercase();
    if bar.contains("open") {
        1.2
    } else if bar.contains("beer") || bar.contains("wine") {
        1.1
    } else {
        1.0
    }
}

fn floral_style_factor(style: &str) -> f64 {
    let style = style.to_lowercase();
    if style.contains("lavish") {
        1.4
    } else if style.contains("minimal") {
        0.8
    } else {
        1.0
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryId, Money, Percentage};

    fn total() -> Money {
        Money::from_units(40_000)
    }

    fn categories() -> Vec<BudgetCategory> {
        [
            ("Venue", 3000),
            ("Catering", 2500),
            ("Photography", 1000),
            ("Attire", 800),
            ("Flowers", 800),
            ("Entertainment", 800),
            ("Stationery", 300),
            ("Transportation", 300),
            ("Favors", 200),
            ("Contingency", 300),
        ]
        .iter()
        .map(|&(name, bp)| {
            let pct = Percentage::from_basis_points(bp);
            BudgetCategory::named(name, pct).with_estimated_cost(Money::percentage_of(total(), pct))
        })
        .collect()
    }

    fn cost(categories: &[BudgetCategory], id: &str) -> Money {
        let id = CategoryId::parse(id).unwrap();
        categories
            .iter()
            .find(|c| c.id == id)
            .unwrap()
            .estimated_cost()
    }

    #[test]
    fn test_transportation_limo_vs_sedan() {
        let sedan = BudgetPreferences {
            transportation_type: Some("Standard sedan".into()),
            ..Default::default()
        };
        let limo = BudgetPreferences {
            transportation_type: Some("Limo".into()),
            ..Default::default()
        };

        let with_sedan = PreferenceAdjuster::apply(&categories(), &sedan);
        let with_limo = PreferenceAdjuster::apply(&with_sedan, &limo);

        assert_eq!(cost(&with_sedan, "transportation"), Money::from_units(1_200));
        assert_eq!(cost(&with_limo, "transportation"), Money::from_units(2_160));

        // Back to sedan recomputes from the baseline instead of dividing.
        let back = PreferenceAdjuster::apply(&with_limo, &sedan);
        assert_eq!(cost(&back, "transportation"), Money::from_units(1_200));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let prefs = BudgetPreferences {
            coverage_hours: Some(8.0),
            music_choice: Some("Live band".into()),
            catering_style: Some("Buffet".into()),
            diy_elements: vec!["centerpieces".into()],
            makeup_services: vec!["bride".into(), "mother of the bride".into()],
            ..Default::default()
        };
        let once = PreferenceAdjuster::apply(&categories(), &prefs);
        let twice = PreferenceAdjuster::apply(&once, &prefs);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_documented_multipliers() {
        let prefs = BudgetPreferences {
            coverage_hours: Some(8.0),
            music_hours: Some(6.0),
            catering_style: Some("Plated".into()),
            diy_elements: vec!["invitations".into()],
            ..Default::default()
        };
        let adjusted = PreferenceAdjuster::apply(&categories(), &prefs);

        // 4000 * 1.2
        assert_eq!(cost(&adjusted, "photography"), Money::from_units(4_800));
        // 3200 * 1.25
        assert_eq!(cost(&adjusted, "entertainment"), Money::from_units(4_000));
        // 10000 * 1.15
        assert_eq!(cost(&adjusted, "catering"), Money::from_units(11_500));
        // 3200 * 0.85 and 1200 * 0.8
        assert_eq!(cost(&adjusted, "flowers"), Money::from_units(2_720));
        assert_eq!(cost(&adjusted, "stationery"), Money::from_units(960));
        // untouched
        assert_eq!(cost(&adjusted, "venue"), Money::from_units(12_000));
    }

    #[test]
    fn test_percentages_never_change() {
        let prefs = BudgetPreferences {
            transportation_type: Some("Party bus".into()),
            ..Default::default()
        };
        let before = categories();
        let after = PreferenceAdjuster::apply(&before, &prefs);
        for (a, b) in before.iter().zip(&after) {
            assert_eq!(a.percentage, b.percentage);
        }
        assert_eq!(cost(&after, "transportation"), Money::from_units(2_640));
    }

    #[test]
    fn test_unrecognized_keys_are_noops() {
        let prefs: BudgetPreferences =
            serde_json::from_str(r#"{"weatherBackupPlan": "tent", "planningAssistance": "day-of"}"#)
                .unwrap();
        let adjusted = PreferenceAdjuster::apply(&categories(), &prefs);
        assert_eq!(adjusted, categories());
        assert!(PreferenceAdjuster::describe(&prefs).is_empty());
    }

    #[test]
    fn test_describe() {
        let prefs = BudgetPreferences {
            transportation_type: Some("Limo".into()),
            ..Default::default()
        };
        let notes = PreferenceAdjuster::describe(&prefs);
        assert_eq!(
            notes,
            vec!["Preference: Transportation cost x1.80 ('Limo' transportation).".to_string()]
        );
    }

    #[test]
    fn test_non_sensitive_category_has_no_effect() {
        assert!(PreferenceAdjuster::effect_for("venue", &BudgetPreferences::default()).is_none());
    }
}
