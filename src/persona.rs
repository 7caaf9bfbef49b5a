//! Persona definitions.
//!
//! A persona frames the assistant for one conversational mode via a system
//! instruction. The set is closed: unknown identifiers are rejected at the
//! string-parsing boundary, and instruction lookup is infallible.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier for one of the fixed personas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PersonaId {
    /// General medical Q&A.
    #[default]
    GeneralChat,
    /// Maps described symptoms to possible causes.
    SymptomChecker,
    /// Drug uses, dosage, side effects, precautions.
    DrugInformation,
    /// Step-by-step first-aid instructions.
    FirstAid,
    /// Preventive care and lifestyle advice.
    HealthTips,
}

impl PersonaId {
    /// All personas, in selector order.
    pub const ALL: [PersonaId; 5] = [
        PersonaId::GeneralChat,
        PersonaId::SymptomChecker,
        PersonaId::DrugInformation,
        PersonaId::FirstAid,
        PersonaId::HealthTips,
    ];

    /// Stable identifier used on the UI boundary and in config files.
    pub fn id(&self) -> &'static str {
        match self {
            PersonaId::GeneralChat => "general-chat",
            PersonaId::SymptomChecker => "symptom-checker",
            PersonaId::DrugInformation => "drug-information",
            PersonaId::FirstAid => "first-aid",
            PersonaId::HealthTips => "health-tips",
        }
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            PersonaId::GeneralChat => "General Chat",
            PersonaId::SymptomChecker => "Symptom Checker",
            PersonaId::DrugInformation => "Drug Information",
            PersonaId::FirstAid => "First Aid",
            PersonaId::HealthTips => "Health Tips",
        }
    }

    /// One-line description for the persona selector.
    pub fn description(&self) -> &'static str {
        match self {
            PersonaId::GeneralChat => "Factual answers to general medical questions",
            PersonaId::SymptomChecker => "Possible causes for described symptoms",
            PersonaId::DrugInformation => "Drug uses, dosage, side effects, precautions",
            PersonaId::FirstAid => "Step-by-step first-aid instructions",
            PersonaId::HealthTips => "Preventive care tips: diet, lifestyle, exercise",
        }
    }

    /// System instruction sent to the model for this persona.
    pub fn instruction(&self) -> &'static str {
        match self {
            PersonaId::GeneralChat => {
                "You are a helpful and safe medical assistant. \
                 Answer factually and concisely in 4-5 sentences."
            }
            PersonaId::SymptomChecker => {
                "You are a medical assistant. The user will describe symptoms. \
                 Suggest possible causes and advise seeing a doctor."
            }
            PersonaId::DrugInformation => {
                "You are a medical assistant. Provide drug details \
                 (uses, dosage, side effects, precautions). Do NOT prescribe."
            }
            PersonaId::FirstAid => {
                "You are a first-aid assistant. \
                 Give step-by-step safe first-aid instructions."
            }
            PersonaId::HealthTips => {
                "You are a health advisor. \
                 Provide preventive care tips (diet, lifestyle, exercise)."
            }
        }
    }
}

impl fmt::Display for PersonaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PersonaId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        PersonaId::ALL
            .into_iter()
            .find(|p| p.id() == normalized)
            .ok_or(Error::UnknownPersona { id: s.to_string() })
    }
}
