// =============================================================================
// TERM — Un champ typé d'une définition
// =============================================================================
//
// Un Term = { nom, description, type de valeur, validateur optionnel }.
//
// Un Term sans validateur accepte toute valeur : c'est un champ
// "pass-through". Un Term est immuable une fois construit.
//
// EXEMPLE :
//   Term::length("title", "Un nom pour la ressource.", ValueType::String, 256)
//   → accepte 'Rust' mais refuse une chaîne de 257 caractères.
//
// =============================================================================

use std::fmt;

use super::error::Result;
use super::typeside::{Value, ValueType};
use super::validate::{ValidationOutcome, Validator};

#[derive(Debug, Clone)]
pub struct Term {
    name: String,
    description: Option<String>,
    value_type: ValueType,
    validator: Option<Validator>,
}

impl Term {
    /// Term sans description ni validateur.
    pub fn new(name: &str, value_type: ValueType) -> Self {
        Term {
            name: name.to_string(),
            description: None,
            value_type,
            validator: None,
        }
    }

    pub fn with_validator(
        name: &str,
        description: &str,
        value_type: ValueType,
        validator: Validator,
    ) -> Self {
        Term {
            name: name.to_string(),
            description: Some(description.to_string()),
            value_type,
            validator: Some(validator),
        }
    }

    pub fn length(name: &str, description: &str, value_type: ValueType, max_length: usize) -> Self {
        Term::with_validator(name, description, value_type, Validator::length(max_length))
    }

    pub fn numeric_range(
        name: &str,
        description: &str,
        value_type: ValueType,
        start: impl Into<f64>,
        end: impl Into<f64>,
    ) -> Self {
        Term::with_validator(
            name,
            description,
            value_type,
            Validator::numeric_range(start, end),
        )
    }

    pub fn enumerated<I, V>(
        name: &str,
        description: &str,
        value_type: ValueType,
        values: I,
        allow_wildcard: bool,
    ) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Term::with_validator(
            name,
            description,
            value_type,
            Validator::enumerated(values, allow_wildcard),
        )
    }

    /// Échoue si le motif ne compile pas.
    pub fn regex(name: &str, description: &str, value_type: ValueType, pattern: &str) -> Result<Self> {
        Ok(Term::with_validator(
            name,
            description,
            value_type,
            Validator::regex(pattern)?,
        ))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn validator(&self) -> Option<&Validator> {
        self.validator.as_ref()
    }

    pub fn validate(&self, value: &Value) -> Result<ValidationOutcome> {
        match &self.validator {
            Some(validator) => validator.check(&self.name, value),
            None => Ok(ValidationOutcome::Valid),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} : {}", self.name, self.value_type)
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_without_validator_accepts_anything() {
        let t = Term::new("name", ValueType::String);
        assert!(t.validate(&Value::from("x")).unwrap().is_valid());
        assert!(t.validate(&Value::from(42i64)).unwrap().is_valid());
        assert!(t.validator().is_none());
    }

    #[test]
    fn test_term_with_range() {
        let t = Term::numeric_range("size", "taille", ValueType::Long, 0, 100);
        assert!(t.validate(&Value::from(100i64)).unwrap().is_valid());
        assert!(!t.validate(&Value::from(101i64)).unwrap().is_valid());
        assert_eq!(t.description(), Some("taille"));
    }

    #[test]
    fn test_regex_term() {
        let t = Term::regex("other", "desc", ValueType::String, ".*aaa").unwrap();
        assert!(t.validate(&Value::from("baaa")).unwrap().is_valid());
        assert!(!t.validate(&Value::from("aaab")).unwrap().is_valid());
    }

    #[test]
    fn test_display() {
        let t = Term::new("title", ValueType::String);
        assert_eq!(format!("{}", t), "title : String");
    }
}
