// =============================================================================
// VALIDATE — Les validateurs de valeurs des termes
// =============================================================================
//
// Chaque Term peut porter un validateur qui décide si une valeur littérale
// est acceptable pour ce champ. Quatre sortes existent :
//
//   Length        chaîne dont la longueur est <= max (bornes incluses)
//   NumericRange  nombre tel que start <= v <= end (comparaison flottante)
//   Enumerated    valeur appartenant à un ensemble fixe ; en mode joker,
//                 `*` dans la valeur devient `.*` et le motif doit couvrir
//                 ENTIÈREMENT la forme texte d'un des éléments
//   Regex         chaîne qui correspond ENTIÈREMENT au motif
//
// Le résultat distingue deux niveaux :
//   Ok(Valid) / Ok(Invalid(message))  → échec de validation, "normal"
//   Err(TypeMismatch)                 → le validateur a reçu un type qu'il
//                                       ne sait pas lire : erreur de
//                                       programmation
//
// =============================================================================

use regex::Regex;

use super::error::{CstError, Result};
use super::typeside::Value;

/// Résultat d'une validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    /// Le message d'échec, s'il y en a un.
    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(msg) => Some(msg),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Validator {
    Length {
        max_length: usize,
    },
    NumericRange {
        start: f64,
        end: f64,
    },
    Enumerated {
        values: Vec<Value>,
        allow_wildcard: bool,
    },
    Regex {
        pattern: String,
        /// Motif compilé et ancré (`^(?:...)$`)
        regex: Regex,
    },
}

impl Validator {
    pub fn length(max_length: usize) -> Self {
        Validator::Length { max_length }
    }

    pub fn numeric_range(start: impl Into<f64>, end: impl Into<f64>) -> Self {
        Validator::NumericRange {
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn enumerated<I, V>(values: I, allow_wildcard: bool) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Validator::Enumerated {
            values: values.into_iter().map(Into::into).collect(),
            allow_wildcard,
        }
    }

    /// Compile le motif ancré : une correspondance partielle ne suffit pas.
    pub fn regex(pattern: &str) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{})$", pattern))?;
        Ok(Validator::Regex {
            pattern: pattern.to_string(),
            regex,
        })
    }

    /// Valide `value` pour le champ `field`.
    pub fn check(&self, field: &str, value: &Value) -> Result<ValidationOutcome> {
        match self {
            Validator::Length { max_length } => {
                let s = expect_str(field, value)?;
                if s.chars().count() <= *max_length {
                    Ok(ValidationOutcome::Valid)
                } else {
                    Ok(ValidationOutcome::Invalid(format!(
                        "Valeur : {} dépasse la longueur maximale de {} pour le champ : {}",
                        s, max_length, field
                    )))
                }
            }
            Validator::NumericRange { start, end } => {
                let v = value.as_f64().ok_or_else(|| CstError::TypeMismatch {
                    field: field.to_string(),
                    expected: "numérique",
                    found: value.kind_name().to_string(),
                })?;
                if *start <= v && v <= *end {
                    Ok(ValidationOutcome::Valid)
                } else {
                    Ok(ValidationOutcome::Invalid(format!(
                        "Valeur : {} hors de l'intervalle {} à {} pour le champ : {}",
                        value, start, end, field
                    )))
                }
            }
            Validator::Enumerated {
                values,
                allow_wildcard,
            } => {
                let found = if *allow_wildcard {
                    let s = expect_str(field, value)?;
                    matches_wildcard(values, s)?
                } else {
                    values.contains(value)
                };
                if found {
                    Ok(ValidationOutcome::Valid)
                } else {
                    Ok(ValidationOutcome::Invalid(format!(
                        "Valeur : {} ne correspond à aucune valeur énumérée pour le champ : {}",
                        value, field
                    )))
                }
            }
            Validator::Regex { pattern, regex } => {
                let s = expect_str(field, value)?;
                if regex.is_match(s) {
                    Ok(ValidationOutcome::Valid)
                } else {
                    Ok(ValidationOutcome::Invalid(format!(
                        "Valeur : {} ne correspond pas à l'expression {} pour le champ : {}",
                        s, pattern, field
                    )))
                }
            }
        }
    }
}

fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| CstError::TypeMismatch {
        field: field.to_string(),
        expected: "chaîne",
        found: value.kind_name().to_string(),
    })
}

/// Sans `*`, simple appartenance. Avec `*`, chaque segment est échappé
/// puis les segments sont joints par `.*`.
fn matches_wildcard(values: &[Value], candidate: &str) -> Result<bool> {
    if !candidate.contains('*') {
        return Ok(values.iter().any(|v| v.as_text() == candidate));
    }
    let body = candidate
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    let regex = Regex::new(&format!("^{}$", body))?;
    Ok(values.iter().any(|v| regex.is_match(&v.as_text())))
}
