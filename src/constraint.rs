//! Adjacency constraints and the attempt-indexed relaxation policy.

use serde::{Deserialize, Serialize};

use crate::model::entity::Occupant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GenderCode {
    Female,
    Male,
    /// Blank attribute. Never conflicts with anyone.
    Unspecified,
    /// Passed through as written. Only an identical raw value conflicts.
    Unrecognized(String),
}

impl GenderCode {
    pub fn normalize(raw: &str) -> GenderCode {
        let value = raw.trim().to_lowercase();
        match value.as_str() {
            "" => GenderCode::Unspecified,
            "f" | "female" | "woman" | "girl" | "k" | "kız" | "kiz" | "kadın" | "kadin" => GenderCode::Female,
            "m" | "male" | "man" | "boy" | "e" | "erkek" => GenderCode::Male,
            _ => GenderCode::Unrecognized(raw.trim().to_string()),
        }
    }

    pub fn conflicts_with(&self, other: &GenderCode) -> bool {
        self != &GenderCode::Unspecified && self == other
    }
}

const COHORT_SEPARATORS: &[char] = &['-', '/', ' ', '.', '_'];

/// Cohort level of a label: "9-A" and "9/B" are both level "9".
///
/// Labels without a leading number use the text before the first separator.
pub fn cohort_level(cohort: &str) -> Option<String> {
    let trimmed = cohort.trim();
    let digits: String = trimmed.chars().take_while(|c| c.is_ascii_digit()).collect();
    if !digits.is_empty() {
        return Some(digits.parse::<u64>().map(|n| n.to_string()).unwrap_or(digits));
    }
    let head = trimmed.split(COHORT_SEPARATORS).next().unwrap_or("");
    if head.is_empty() {
        None
    } else {
        Some(head.to_lowercase())
    }
}

/// Normalized attributes the evaluator compares.
#[derive(Debug, Clone, PartialEq)]
pub struct Traits {
    pub gender: GenderCode,
    pub level: Option<String>,
    pub special_case: bool,
}

impl Traits {
    pub fn of(occupant: &Occupant) -> Traits {
        Traits {
            gender: GenderCode::normalize(&occupant.gender),
            level: cohort_level(&occupant.cohort),
            special_case: occupant.special_case,
        }
    }

    pub fn same_gender(&self, other: &Traits) -> bool {
        self.gender.conflicts_with(&other.gender)
    }

    pub fn same_level(&self, other: &Traits) -> bool {
        matches!((&self.level, &other.level), (Some(a), Some(b)) if a == b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub gender_ok: bool,
    pub cohort_ok: bool,
}

impl Verdict {
    pub fn judge<'a>(traits: &Traits, neighbors: impl IntoIterator<Item = &'a Traits>) -> Verdict {
        let mut verdict = Verdict { gender_ok: true, cohort_ok: true };
        for neighbor in neighbors {
            verdict.gender_ok &= !traits.same_gender(neighbor);
            verdict.cohort_ok &= !traits.same_level(neighbor);
        }
        verdict
    }
}

/// Gender and cohort validity of `occupant` against its adjacent occupants.
pub fn evaluate(occupant: &Occupant, neighbors: &[&Occupant]) -> Verdict {
    let neighbor_traits: Vec<Traits> = neighbors.iter().map(|n| Traits::of(n)).collect();
    Verdict::judge(&Traits::of(occupant), &neighbor_traits)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintLevel {
    Strict,
    Moderate,
    Relaxed,
}

impl ConstraintLevel {
    pub fn gender_active(&self) -> bool {
        matches!(self, ConstraintLevel::Strict | ConstraintLevel::Moderate)
    }

    pub fn cohort_active(&self) -> bool {
        matches!(self, ConstraintLevel::Strict)
    }

    /// Number of active rules.
    pub fn strictness(&self) -> u8 {
        self.gender_active() as u8 + self.cohort_active() as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConstraintLevel::Strict => "STRICT",
            ConstraintLevel::Moderate => "MODERATE",
            ConstraintLevel::Relaxed => "RELAXED",
        }
    }

    pub fn permits(&self, verdict: Verdict) -> bool {
        (!self.gender_active() || verdict.gender_ok) && (!self.cohort_active() || verdict.cohort_ok)
    }
}

/// Level used for a 1-based attempt index. The policy bottoms out at
/// MODERATE; RELAXED is only reachable by name.
pub fn level_for_attempt(attempt: usize) -> ConstraintLevel {
    match attempt {
        0..=3 => ConstraintLevel::Strict,
        _ => ConstraintLevel::Moderate,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LevelName {
    Known(ConstraintLevel),
    Unknown(String),
}

impl LevelName {
    pub fn parse(name: &str) -> LevelName {
        match name.trim().to_uppercase().as_str() {
            "STRICT" => LevelName::Known(ConstraintLevel::Strict),
            "MODERATE" => LevelName::Known(ConstraintLevel::Moderate),
            "RELAXED" => LevelName::Known(ConstraintLevel::Relaxed),
            _ => LevelName::Unknown(name.to_string()),
        }
    }
}

impl From<ConstraintLevel> for LevelName {
    fn from(level: ConstraintLevel) -> Self {
        LevelName::Known(level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintCheck {
    Valid,
    Violated(Verdict),
    /// Level name was not recognized; the placement is allowed unconditionally.
    DefaultedValid(String),
}

impl ConstraintCheck {
    pub fn is_valid(&self) -> bool {
        !matches!(self, ConstraintCheck::Violated(_))
    }
}

/// Runs the evaluator for the rules `level` activates.
pub fn check_constraints(occupant: &Occupant, neighbors: &[&Occupant], level: &LevelName) -> ConstraintCheck {
    match level {
        LevelName::Known(level) => {
            let verdict = evaluate(occupant, neighbors);
            if level.permits(verdict) {
                ConstraintCheck::Valid
            } else {
                ConstraintCheck::Violated(verdict)
            }
        }
        LevelName::Unknown(name) => {
            tracing::warn!(level = %name, "unknown constraint level, treating placement as valid");
            ConstraintCheck::DefaultedValid(name.clone())
        }
    }
}
