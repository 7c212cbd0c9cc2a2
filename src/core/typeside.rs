// =============================================================================
// TYPESIDE — Les types primitifs des termes et des valeurs
// =============================================================================
//
// Chaque Term d'une définition déclare un type de valeur (String, Long...)
// et chaque Pair transporte une valeur scalaire concrète.
//
// ANALOGIE : c'est l'équivalent des types d'attributs d'un catalogue
// (chaîne, entier long, date, géométrie...), indépendamment de tout format
// de transport.
//
// CONTRAINTE : les Pairs vivent dans des ENSEMBLES (déduplication des
// sorties identiques), donc une Value doit être totalement ordonnée et
// hachable, y compris les flottants, comparés via `total_cmp`.
//
// =============================================================================

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Le type déclaré d'un Term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    String,
    Integer,
    Long,
    Float,
    Double,
    Boolean,
    Date,
    Geometry,
    Binary,
    Xml,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "String",
            ValueType::Integer => "Integer",
            ValueType::Long => "Long",
            ValueType::Float => "Float",
            ValueType::Double => "Double",
            ValueType::Boolean => "Boolean",
            ValueType::Date => "Date",
            ValueType::Geometry => "Geometry",
            ValueType::Binary => "Binary",
            ValueType::Xml => "Xml",
        };
        write!(f, "{}", name)
    }
}

/// Une valeur scalaire concrète.
///
/// Les entiers sont toujours portés sur 64 bits : un Term `Long` ou
/// `Integer` reçoit une `Value::Integer`.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

impl Value {
    /// Nom court du genre de valeur, pour les messages d'erreur.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Lecture numérique (entiers et flottants confondus).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(fl) => Some(*fl),
            _ => None,
        }
    }

    /// Forme textuelle brute (sans guillemets), utilisée pour les
    /// comparaisons d'énumérations et les motifs `LIKE`.
    pub fn as_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(fl) => fl.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Null => "null".to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Integer(_) => 2,
            Value::Float(_) => 3,
            Value::String(_) => 4,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::Null, Value::Null) => Ordering::Equal,
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(fl) => fl.to_bits().hash(state),
            Value::Boolean(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "'{}'", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "NULL"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(fl: f64) -> Self {
        Value::Float(fl)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::from("a").kind_name(), "string");
        assert_eq!(Value::from(42i64).as_i64(), Some(42));
        assert_eq!(Value::from(3i32).as_f64(), Some(3.0));
        assert_eq!(Value::from(true).as_f64(), None);
    }

    #[test]
    fn test_float_total_order() {
        let mut set = BTreeSet::new();
        set.insert(Value::Float(f64::NAN));
        set.insert(Value::Float(f64::NAN));
        set.insert(Value::Float(1.5));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_integer_and_float_are_distinct() {
        assert_ne!(Value::Integer(20), Value::Float(20.0));
    }

    #[test]
    fn test_as_text_is_unquoted() {
        assert_eq!(Value::from("Text").as_text(), "Text");
        assert_eq!(format!("{}", Value::from("Text")), "'Text'");
    }
}
