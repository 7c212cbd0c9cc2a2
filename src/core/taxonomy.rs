// =============================================================================
// TAXONOMY — Correspondance namespace ↔ taxonomie canonique
// =============================================================================
//
// Tous les namespaces finissent par parler la MÊME langue interne : la
// taxonomie canonique. Un TaxonomyTransformer décrit, pour UN namespace,
// comment passer de la DERNIÈRE version de ce namespace vers la taxonomie
// canonique, et inversement :
//
//   namespace (dernière version) ──to_canonical──▶ canonique
//   namespace (dernière version) ◀─from_canonical── canonique
//
// EXEMPLE :
//   to_canonical["subtitle"]            = rename → ext.ddms.subtitle
//   from_canonical["ext.ddms.subtitle"] = rename → subtitle
//
// Comme pour les Definitions, chaque sens est indexé par sa PROPRE clé
// (nom côté namespace pour to_canonical, nom côté canonique pour
// from_canonical) et un terme sans transformation passe tel quel.
//
// =============================================================================

use std::fmt;

use super::pair::PairSet;
use super::transform::{PairTransform, TransformTable};

#[derive(Debug, Clone)]
pub struct TaxonomyTransformer {
    namespace: String,
    to_canonical: TransformTable,
    from_canonical: TransformTable,
}

impl TaxonomyTransformer {
    pub fn new(namespace: &str) -> Self {
        TaxonomyTransformer {
            namespace: namespace.to_string(),
            to_canonical: TransformTable::new(),
            from_canonical: TransformTable::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn to_canonical_transforms(&self) -> &TransformTable {
        &self.to_canonical
    }

    pub fn from_canonical_transforms(&self) -> &TransformTable {
        &self.from_canonical
    }

    /// Enregistre les deux sens d'une correspondance.
    /// `term` est le nom côté namespace, `canonical_term` le nom côté
    /// canonique.
    pub fn add_taxonomy_transform(
        &mut self,
        term: &str,
        to: PairTransform,
        canonical_term: &str,
        from: PairTransform,
    ) -> &mut Self {
        self.to_canonical.insert(term, to);
        self.from_canonical.insert(canonical_term, from);
        self
    }

    /// Renommage simple dans les deux sens.
    pub fn add_name_transform(&mut self, term: &str, canonical_term: &str) -> &mut Self {
        self.add_taxonomy_transform(
            term,
            PairTransform::rename(canonical_term),
            canonical_term,
            PairTransform::rename(term),
        )
    }

    /// Pairs du namespace (dernière version) → Pairs canoniques.
    pub fn to_canonical(&self, pairs: &PairSet) -> PairSet {
        self.to_canonical.apply(pairs)
    }

    /// Pairs canoniques → Pairs du namespace (dernière version).
    pub fn from_canonical(&self, pairs: &PairSet) -> PairSet {
        self.from_canonical.apply(pairs)
    }
}

impl fmt::Display for TaxonomyTransformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "taxonomy {} <-> canonical {{", self.namespace)?;
        for (term, t) in self.to_canonical.iter() {
            writeln!(f, "  {} => {}", term, t.name())?;
        }
        for (term, t) in self.from_canonical.iter() {
            writeln!(f, "  {} <= {}", term, t.name())?;
        }
        write!(f, "}}")
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pair::Pair;

    #[test]
    fn test_name_transform_both_ways() {
        let mut t = TaxonomyTransformer::new("cst:ddf");
        t.add_name_transform("subtitle", "ext.ddms.subtitle");

        let canonical = t.to_canonical(&Pair::new("subtitle", "s").into_set());
        assert_eq!(canonical, Pair::new("ext.ddms.subtitle", "s").into_set());

        let back = t.from_canonical(&canonical);
        assert_eq!(back, Pair::new("subtitle", "s").into_set());
    }

    #[test]
    fn test_unmapped_terms_pass_through() {
        let t = TaxonomyTransformer::new("cst:ddf");
        let pairs = Pair::new("title", "x").into_set();
        assert_eq!(t.to_canonical(&pairs), pairs);
        assert_eq!(t.from_canonical(&pairs), pairs);
    }

    #[test]
    fn test_fan_out_to_canonical() {
        let mut t = TaxonomyTransformer::new("cst:def");
        t.add_taxonomy_transform(
            "keyword",
            PairTransform::fan_out(&["topic.keyword", "topic.vocabulary"]),
            "topic.keyword",
            PairTransform::rename("keyword"),
        );
        let out = t.to_canonical(&Pair::new("keyword", "rust").into_set());
        assert_eq!(out.len(), 2);
    }
}
