//! Clinical profile types for cardiac-risk triage.
//!
//! `RawProfile` mirrors the request body accepted at the boundary;
//! `ClinicalProfile` is the normalized value the classifier and the
//! explanation generator consume.

use serde::{Deserialize, Serialize};

/// Biological sex as recorded on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BiologicalSex {
    Male,
    Female,
}

/// Chest pain presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChestPainType {
    Typical,
    Atypical,
    NonAnginal,
    Asymptomatic,
}

/// Resting electrocardiogram result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestingEcg {
    Normal,
    StTAbnormality,
    LeftVentricularHypertrophy,
}

/// Thallium stress scan result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThalliumScan {
    Normal,
    FixedDefect,
    ReversibleDefect,
}

impl ThalliumScan {
    /// Whether the scan shows a perfusion defect of either kind.
    #[must_use]
    pub fn is_abnormal(self) -> bool {
        matches!(self, Self::FixedDefect | Self::ReversibleDefect)
    }
}

/// Yes/no answer used by the intake form for exercise-induced angina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

/// Error raised when a profile breaks an internal invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidProfileError {
    #[error("Height must be positive to derive BMI, got {0} m")]
    NonPositiveHeight(f64),
}

/// Collected range violations for a raw profile.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}", .0.join("; "))]
pub struct ValidationError(pub Vec<String>);

/// Raw intake fields as submitted by a client.
///
/// Enumerated fields are rejected at deserialization when they carry an
/// unknown value; numeric ranges are checked by [`RawProfile::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProfile {
    pub age: u32,
    pub sex: BiologicalSex,
    #[serde(rename = "chestPain")]
    pub chest_pain: ChestPainType,
    #[serde(rename = "bloodPressure")]
    pub blood_pressure: u32,
    pub cholesterol: u32,
    /// 0 or 1
    #[serde(rename = "fastingBS")]
    pub fasting_bs: u8,
    #[serde(rename = "restECG")]
    pub rest_ecg: RestingEcg,
    #[serde(rename = "maxHeartRate")]
    pub max_heart_rate: u32,
    #[serde(rename = "exerciseAngina")]
    pub exercise_angina: Answer,
    pub oldpeak: f64,
    pub thallium: ThalliumScan,
    pub height_m: f64,
    pub weight_kg: f64,
}

impl RawProfile {
    /// Check every numeric field against its accepted range.
    ///
    /// # Errors
    /// Returns all violations at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if !(1..=120).contains(&self.age) {
            errors.push(format!("Age {} out of range [1, 120]", self.age));
        }
        if !(50..=300).contains(&self.blood_pressure) {
            errors.push(format!(
                "Blood pressure {} out of range [50, 300]",
                self.blood_pressure
            ));
        }
        if !(100..=600).contains(&self.cholesterol) {
            errors.push(format!(
                "Cholesterol {} out of range [100, 600]",
                self.cholesterol
            ));
        }
        if self.fasting_bs > 1 {
            errors.push(format!(
                "Fasting blood sugar {} must be 0 or 1",
                self.fasting_bs
            ));
        }
        if !(60..=220).contains(&self.max_heart_rate) {
            errors.push(format!(
                "Maximum heart rate {} out of range [60, 220]",
                self.max_heart_rate
            ));
        }
        if !(0.0..=10.0).contains(&self.oldpeak) {
            errors.push(format!("Oldpeak {} out of range [0, 10]", self.oldpeak));
        }
        if !(0.0..=3.0).contains(&self.height_m) {
            errors.push(format!("Height {} m out of range [0, 3]", self.height_m));
        }
        if !(10.0..=500.0).contains(&self.weight_kg) {
            errors.push(format!(
                "Weight {} kg out of range [10, 500]",
                self.weight_kg
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(errors))
        }
    }
}

/// Normalized clinical profile for one diagnostic request.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalProfile {
    pub age: u32,
    pub sex: BiologicalSex,
    pub chest_pain: ChestPainType,
    /// mmHg
    pub resting_blood_pressure: u32,
    /// mg/dL
    pub cholesterol: u32,
    pub fasting_blood_sugar_high: bool,
    pub resting_ecg: RestingEcg,
    pub max_heart_rate: u32,
    pub exercise_induced_angina: bool,
    /// ST depression induced by exercise ("oldpeak")
    pub st_depression: f64,
    pub thallium_scan: ThalliumScan,
    pub height_m: f64,
    pub weight_kg: f64,
}

impl ClinicalProfile {
    /// Body-mass index, failing when height is not positive.
    ///
    /// # Errors
    /// Returns `InvalidProfileError::NonPositiveHeight` for `height_m <= 0`.
    pub fn try_bmi(&self) -> Result<f64, InvalidProfileError> {
        if self.height_m <= 0.0 {
            return Err(InvalidProfileError::NonPositiveHeight(self.height_m));
        }
        Ok(self.weight_kg / (self.height_m * self.height_m))
    }

    /// Body-mass index, or `None` when it cannot be derived.
    #[must_use]
    pub fn bmi(&self) -> Option<f64> {
        self.try_bmi().ok()
    }

    #[must_use]
    pub fn bmi_category(&self) -> Option<BmiCategory> {
        self.bmi().map(BmiCategory::from_bmi)
    }
}

/// Builds normalized profiles from already-validated raw input.
pub struct ProfileBuilder;

impl ProfileBuilder {
    /// Normalize a raw profile. No range checks are repeated here.
    #[must_use]
    pub fn build(raw: &RawProfile) -> ClinicalProfile {
        ClinicalProfile {
            age: raw.age,
            sex: raw.sex,
            chest_pain: raw.chest_pain,
            resting_blood_pressure: raw.blood_pressure,
            cholesterol: raw.cholesterol,
            fasting_blood_sugar_high: raw.fasting_bs == 1,
            resting_ecg: raw.rest_ecg,
            max_heart_rate: raw.max_heart_rate,
            exercise_induced_angina: raw.exercise_angina == Answer::Yes,
            st_depression: raw.oldpeak,
            thallium_scan: raw.thallium,
            height_m: raw.height_m,
            weight_kg: raw.weight_kg,
        }
    }
}

/// WHO adult BMI bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            Self::Underweight
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else {
            Self::Obese
        }
    }

    /// Get the range the band covers, for display.
    #[must_use]
    pub fn range(&self) -> &'static str {
        match self {
            Self::Underweight => "< 18.5",
            Self::Normal => "18.5 - 24.9",
            Self::Overweight => "25 - 29.9",
            Self::Obese => ">= 30",
        }
    }
}
