//! Structured preference selections made by the couple
//!
//! Recognized keys are typed fields. Anything else lands in `other` and is
//! carried through persistence untouched, but never affects a category.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{BudgetError, BudgetResult};

/// Longest booking accepted for any hours-based preference
pub const MAX_HOURS: f64 = 24.0;

/// Most makeup services that can be listed
pub const MAX_MAKEUP_SERVICES: usize = 12;

/// Preference choices that re-weight category costs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_choice: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub makeup_services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transportation_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catering_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bar_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_video_coverage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floral_style: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diy_elements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beauty_coverage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_assistance: Option<String>,

    /// Unrecognized keys, kept but ignored
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_json::Value>,
}

impl BudgetPreferences {
    /// Check if no recognized preference is set
    pub fn is_empty(&self) -> bool {
        self.music_choice.is_none()
            && self.music_hours.is_none()
            && self.coverage_hours.is_none()
            && self.makeup_services.is_empty()
            && self.transportation_type.is_none()
            && self.transportation_hours.is_none()
            && self.catering_style.is_none()
            && self.bar_service.is_none()
            && self.photo_video_coverage.is_none()
            && self.floral_style.is_none()
            && self.diy_elements.is_empty()
            && self.beauty_coverage.is_none()
            && self.planning_assistance.is_none()
    }

    /// Check hours and list sizes before they reach any cost
    ///
    /// # Errors
    ///
    /// `InvalidInput` for hours that are not finite, negative or above
    /// [`MAX_HOURS`], and for more than [`MAX_MAKEUP_SERVICES`] services.
    pub fn validate(&self) -> BudgetResult<()> {
        let hours = [
            ("coverageHours", self.coverage_hours),
            ("musicHours", self.music_hours),
            ("transportationHours", self.transportation_hours),
        ];
        for (key, value) in hours {
            if let Some(value) = value {
                if !value.is_finite() || !(0.0..=MAX_HOURS).contains(&value) {
                    return Err(BudgetError::InvalidInput(format!(
                        "{} must be between 0 and {}, got {}",
                        key, MAX_HOURS, value
                    )));
                }
            }
        }
        if self.makeup_services.len() > MAX_MAKEUP_SERVICES {
            return Err(BudgetError::InvalidInput(format!(
                "at most {} makeup services can be listed, got {}",
                MAX_MAKEUP_SERVICES,
                self.makeup_services.len()
            )));
        }
        Ok(())
    }

    /// Names of keys that were supplied but are not recognized
    pub fn unrecognized_keys(&self) -> Vec<&str> {
        self.other.keys().map(String::as_str).collect()
    }

    /// Overlay another set of preferences; fields set in `other` win
    pub fn merged_with(&self, update: &BudgetPreferences) -> BudgetPreferences {
        fn pick<T: Clone>(new: &Option<T>, old: &Option<T>) -> Option<T> {
            new.clone().or_else(|| old.clone())
        }
        fn pick_list(new: &[String], old: &[String]) -> Vec<String> {
            if new.is_empty() {
                old.to_vec()
            } else {
                new.to_vec()
            }
        }

        let mut other = self.other.clone();
        other.extend(update.other.clone());

        BudgetPreferences {
            music_choice: pick(&update.music_choice, &self.music_choice),
            music_hours: pick(&update.music_hours, &self.music_hours),
            coverage_hours: pick(&update.coverage_hours, &self.coverage_hours),
            makeup_services: pick_list(&update.makeup_services, &self.makeup_services),
            transportation_type: pick(&update.transportation_type, &self.transportation_type),
            transportation_hours: pick(&update.transportation_hours, &self.transportation_hours),
            catering_style: pick(&update.catering_style, &self.catering_style),
            bar_service: pick(&update.bar_service, &self.bar_service),
            photo_video_coverage: pick(&update.photo_video_coverage, &self.photo_video_coverage),
            floral_style: pick(&update.floral_style, &self.floral_style),
            diy_elements: pick_list(&update.diy_elements, &self.diy_elements),
            beauty_coverage: pick(&update.beauty_coverage, &self.beauty_coverage),
            planning_assistance: pick(&update.planning_assistance, &self.planning_assistance),
            other,
        }
    }
}
