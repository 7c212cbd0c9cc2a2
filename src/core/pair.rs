// =============================================================================
// PAIR — L'unité de transformation : un champ et sa valeur
// =============================================================================
//
// Une Pair est UNE instance concrète d'un champ externe :
//   ("title", 'myTitle'), ("size", 20)...
//
// Les Pairs sont des valeurs immuables : une transformation produit
// toujours de NOUVELLES Pairs. Elles voyagent en ensembles ordonnés
// (`PairSet`) :
//   - deux sorties identiques (clé, valeur) sont fusionnées
//   - l'ordre d'itération est déterministe (utile pour reconstruire
//     un OR stable dans les filtres)
//
// =============================================================================

use std::collections::BTreeSet;
use std::fmt;

use super::typeside::Value;

/// Ensemble de Pairs, sémantique ensembliste.
pub type PairSet = BTreeSet<Pair>;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair {
    key: String,
    value: Value,
}

impl Pair {
    pub fn new(key: &str, value: impl Into<Value>) -> Self {
        Pair {
            key: key.to_string(),
            value: value.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Même valeur, nouvelle clé.
    pub fn renamed(&self, key: &str) -> Pair {
        Pair::new(key, self.value.clone())
    }

    /// Même clé, nouvelle valeur.
    pub fn with_value(&self, value: impl Into<Value>) -> Pair {
        Pair::new(&self.key, value)
    }

    /// Ensemble réduit à cette seule Pair.
    pub fn into_set(self) -> PairSet {
        BTreeSet::from([self])
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.key, self.value)
    }
}
