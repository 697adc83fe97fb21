use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Substance-use section of the intake form. The five flags are not
/// independent: `none` excludes every concrete substance and vice versa.
/// All changes must go through [`SubstanceUse::toggled`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstanceUse {
    pub marijuana: bool,
    pub cocaine: bool,
    pub alcohol: bool,
    pub cigarette: bool,
    pub none: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubstanceFlag {
    Marijuana,
    Cocaine,
    Alcohol,
    Cigarette,
    None,
}

impl SubstanceUse {
    /// Applies one checkbox change, enforcing the mutual exclusion between
    /// `none` and the concrete substances. Checking `none` clears the four
    /// substance flags; checking any substance clears `none`; unchecking
    /// only touches the flag itself.
    pub fn toggled(self, flag: SubstanceFlag, checked: bool) -> SubstanceUse {
        if matches!(flag, SubstanceFlag::None) {
            return if checked {
                SubstanceUse {
                    none: true,
                    ..SubstanceUse::default()
                }
            } else {
                SubstanceUse { none: false, ..self }
            };
        }

        let mut next = SubstanceUse { none: false, ..self };
        match flag {
            SubstanceFlag::Marijuana => next.marijuana = checked,
            SubstanceFlag::Cocaine => next.cocaine = checked,
            SubstanceFlag::Alcohol => next.alcohol = checked,
            SubstanceFlag::Cigarette => next.cigarette = checked,
            SubstanceFlag::None => {}
        }
        next
    }
}

/// Presenting-symptom checkboxes plus the free-text "other fears" field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainSymptoms {
    pub sadness: bool,
    pub depression: bool,
    pub anxiety: bool,
    pub nervousness: bool,
    pub phobias: bool,
    pub other_fear: String,
}

/// The structured clinical intake record attached to a patient. Fields
/// mirror the practice's paper form; free-text fields stay empty strings
/// until filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anamnesis {
    // Identification
    pub civil_status: String,
    pub has_children: String,
    pub number_of_children: String,
    pub had_abortion: String,
    pub occupation: String,
    pub education_level: String,

    // Family history
    pub mothers_name: String,
    pub mothers_relationship: String,
    pub fathers_name: String,
    pub fathers_relationship: String,
    pub has_siblings: String,
    pub number_of_siblings: String,
    pub siblings_relationship: String,
    pub childhood_description: String,

    // Health
    pub continuous_medication: String,
    pub medications_details: String,
    pub relevant_medical_diagnosis: String,
    pub substance_use: SubstanceUse,
    pub sleep_quality: String,

    // Emotional state
    pub main_symptoms: MainSymptoms,
    pub anxiety_level: String,
    pub irritability_level: String,
    pub sadness_level: String,
    pub carries_guilt: String,
    pub carries_injustice: String,
    pub suicidal_thoughts: String,
    pub suicidal_thoughts_comment: String,

    // Social and financial context
    pub has_close_friends: String,
    pub social_consideration: String,
    pub physical_activity: String,
    pub financial_status: String,
    pub daily_routine: String,

    // Treatment history and expectations
    pub how_found_analysis: String,
    pub how_found_analysis_other: String,
    pub previous_therapy: String,
    pub previous_therapy_duration: String,
    pub main_reason: String,
    pub situation_start: String,
    pub triggering_event: String,
    pub expectations_analysis: String,

    pub general_observations: String,
}

impl Anamnesis {
    /// The documentation gate's completeness rule: the record counts as
    /// started once ANY field carries content (non-empty string, true
    /// flag, non-zero number). A single fold over the serialized field map
    /// keeps the rule in one place as fields come and go.
    pub fn has_any_content(&self) -> bool {
        serde_json::to_value(self)
            .map(|value| value_has_content(&value))
            .unwrap_or(false)
    }
}

fn value_has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => items.iter().any(value_has_content),
        Value::Object(fields) => fields.values().any(value_has_content),
    }
}
