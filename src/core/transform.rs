// =============================================================================
// TRANSFORM — Les fonctions de transformation par terme
// =============================================================================
//
// Une PairTransform est une fonction NOMMÉE :  Pair → ensemble de Pairs
//
//   - 0 Pair  → le champ est abandonné (drop)
//   - 1 Pair  → renommage et/ou conversion de valeur
//   - n Pairs → éclatement (fan-out) vers plusieurs champs
//
// Une TransformTable range ces fonctions par nom de terme. Elle est
// utilisée à la fois par les Definitions (migrations entre versions) et
// par les transformateurs de taxonomie (namespace ↔ canonique).
//
// RÈGLE : "aucune transformation enregistrée" est un cas EXPLICITE
// (`None` à la recherche) qui laisse passer la Pair telle quelle. Ce
// n'est jamais une fonction identité cachée dans la table.
//
// =============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::pair::{Pair, PairSet};

type TransformFn = dyn Fn(&Pair) -> PairSet + Send + Sync;

/// Une fonction de transformation nommée.
#[derive(Clone)]
pub struct PairTransform {
    name: String,
    func: Arc<TransformFn>,
}

impl PairTransform {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&Pair) -> PairSet + Send + Sync + 'static,
    {
        PairTransform {
            name: name.to_string(),
            func: Arc::new(func),
        }
    }

    /// Renomme la clé, conserve la valeur.
    pub fn rename(to: &str) -> Self {
        let target = to.to_string();
        PairTransform::new(&format!("rename->{}", to), move |pair| {
            pair.renamed(&target).into_set()
        })
    }

    /// Abandonne la Pair.
    pub fn drop_term() -> Self {
        PairTransform::new("drop", |_| PairSet::new())
    }

    /// Éclate une Pair vers plusieurs clés, même valeur.
    pub fn fan_out(keys: &[&str]) -> Self {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        PairTransform::new(&format!("fan-out->{}", keys.join("|")), move |pair| {
            keys.iter().map(|k| pair.renamed(k)).collect()
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, pair: &Pair) -> PairSet {
        (self.func)(pair)
    }
}

impl fmt::Debug for PairTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairTransform")
            .field("name", &self.name)
            .finish()
    }
}

/// Table nom de terme → transformation.
#[derive(Debug, Clone, Default)]
pub struct TransformTable {
    transforms: BTreeMap<String, PairTransform>,
}

impl TransformTable {
    pub fn new() -> Self {
        TransformTable::default()
    }

    pub fn insert(&mut self, term: &str, transform: PairTransform) -> &mut Self {
        self.transforms.insert(term.to_string(), transform);
        self
    }

    pub fn get(&self, term: &str) -> Option<&PairTransform> {
        self.transforms.get(term)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.transforms.contains_key(term)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.transforms.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PairTransform)> {
        self.transforms.iter().map(|(k, t)| (k.as_str(), t))
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Applique la table à une Pair. Sans transformation enregistrée
    /// pour sa clé, la Pair passe inchangée.
    pub fn apply_pair(&self, pair: &Pair) -> PairSet {
        match self.get(pair.key()) {
            Some(transform) => transform.apply(pair),
            None => pair.clone().into_set(),
        }
    }

    /// Applique la table à tout un ensemble : l'union des résultats.
    pub fn apply(&self, pairs: &PairSet) -> PairSet {
        pairs.iter().flat_map(|p| self.apply_pair(p)).collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_transform_passes_through() {
        let table = TransformTable::new();
        let pairs = Pair::new("name", "myName").into_set();
        assert_eq!(table.apply(&pairs), pairs);
        assert!(table.get("name").is_none());
    }

    #[test]
    fn test_drop_and_fan_out() {
        let mut table = TransformTable::new();
        table
            .insert("legacy", PairTransform::drop_term())
            .insert("topic", PairTransform::fan_out(&["topic.keyword", "topic.category"]));

        let pairs: PairSet = [Pair::new("legacy", 1i64), Pair::new("topic", "rust")]
            .into_iter()
            .collect();
        let out = table.apply(&pairs);
        assert_eq!(out.len(), 2);
        assert!(out.contains(&Pair::new("topic.keyword", "rust")));
        assert!(out.contains(&Pair::new("topic.category", "rust")));
    }

    #[test]
    fn test_union_deduplicates_outputs() {
        let mut table = TransformTable::new();
        table
            .insert("a", PairTransform::rename("merged"))
            .insert("b", PairTransform::rename("merged"));
        let pairs: PairSet = [Pair::new("a", "x"), Pair::new("b", "x")].into_iter().collect();
        assert_eq!(table.apply(&pairs), Pair::new("merged", "x").into_set());
    }

    #[test]
    fn test_debug_shows_name() {
        let t = PairTransform::rename("metadata.title");
        assert!(format!("{:?}", t).contains("rename->metadata.title"));
    }
}
