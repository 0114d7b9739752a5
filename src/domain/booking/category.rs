//! Training categories offered for one-on-one sessions.

use crate::domain::foundation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of session categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCategory {
    BoxingFitness,
    StrengthMuscle,
    HathaYoga,
    PostureRehab,
    Calisthenics,
    NutritionCoaching,
}

impl SessionCategory {
    pub const ALL: [SessionCategory; 6] = [
        SessionCategory::BoxingFitness,
        SessionCategory::StrengthMuscle,
        SessionCategory::HathaYoga,
        SessionCategory::PostureRehab,
        SessionCategory::Calisthenics,
        SessionCategory::NutritionCoaching,
    ];

    /// Returns the wire and storage identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionCategory::BoxingFitness => "boxing_fitness",
            SessionCategory::StrengthMuscle => "strength_muscle",
            SessionCategory::HathaYoga => "hatha_yoga",
            SessionCategory::PostureRehab => "posture_rehab",
            SessionCategory::Calisthenics => "calisthenics",
            SessionCategory::NutritionCoaching => "nutrition_coaching",
        }
    }

    /// Returns the human-facing label.
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionCategory::BoxingFitness => "Boxing Fitness",
            SessionCategory::StrengthMuscle => "Strength and Muscle Building",
            SessionCategory::HathaYoga => "Hatha Yoga",
            SessionCategory::PostureRehab => "Posture Correction & Rehab",
            SessionCategory::Calisthenics => "Calisthenics & Bodyweight Training",
            SessionCategory::NutritionCoaching => "Nutrition Coaching",
        }
    }
}

impl fmt::Display for SessionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the identifier or the display label, case-insensitively.
impl FromStr for SessionCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| {
                c.as_str().eq_ignore_ascii_case(needle)
                    || c.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                ValidationError::invalid_format(
                    "category",
                    format!("unknown category '{}'", needle),
                )
            })
    }
}
