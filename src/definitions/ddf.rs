// =============================================================================
// DDF — Le namespace `cst:ddf`
// =============================================================================
//
// Version 1 :
//   id            String  longueur ≤ 32
//   datatype      String  libellé DCMI Type (joker `*` accepté)
//   title         String  longueur ≤ 256
//   subtitle      String  longueur ≤ 256
//   resource-size Long    0 ..= i64::MAX (octets)
//
// Correspondance canonique :
//   subtitle      ↔ ext.ddms.subtitle
//   resource-size : entier → texte à l'entrée, texte → entier à la sortie
//
// =============================================================================

use crate::core::definition::Definition;
use crate::core::pair::{Pair, PairSet};
use crate::core::registry::Registry;
use crate::core::taxonomy::TaxonomyTransformer;
use crate::core::term::Term;
use crate::core::transform::PairTransform;
use crate::core::typeside::{Value, ValueType};

pub const NAMESPACE: &str = "cst:ddf";

/// Libellés DCMI Type (et non les noms de termes).
pub const DATATYPES: [&str; 12] = [
    "Collection",
    "Dataset",
    "Event",
    "Image",
    "Interactive Resource",
    "Moving Image",
    "Physical Object",
    "Service",
    "Software",
    "Sound",
    "Still Image",
    "Text",
];

pub fn ddf_v1() -> Definition {
    Definition::with_terms(
        NAMESPACE,
        1,
        [
            Term::length("id", "Metacard unique id", ValueType::String, 32),
            Term::enumerated(
                "datatype",
                "DCMI Type term labels are expected here as opposed to term names.",
                ValueType::String,
                DATATYPES,
                true,
            ),
            Term::length("title", "A name for the resource.", ValueType::String, 256),
            Term::length("subtitle", "A subtitle for the resource.", ValueType::String, 256),
            Term::numeric_range(
                "resource-size",
                "The resource size in bytes",
                ValueType::Long,
                0,
                i64::MAX as f64,
            ),
        ],
    )
}

pub fn ddf_taxonomy_transformer() -> TaxonomyTransformer {
    let mut transformer = TaxonomyTransformer::new(NAMESPACE);
    transformer
        .add_name_transform("subtitle", "ext.ddms.subtitle")
        .add_taxonomy_transform(
            "resource-size",
            PairTransform::new("size->text", |pair| {
                pair.with_value(pair.value().as_text()).into_set()
            }),
            "resource-size",
            PairTransform::new("text->size", parse_size),
        );
    transformer
}

/// Une taille illisible reste telle quelle.
fn parse_size(pair: &Pair) -> PairSet {
    let parsed = match pair.value() {
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::Integer),
        Value::Integer(_) => Some(pair.value().clone()),
        _ => None,
    };
    parsed
        .map(|value| pair.with_value(value))
        .unwrap_or_else(|| pair.clone())
        .into_set()
}

/// Enregistre la version 1 et sa correspondance canonique.
pub fn register_ddf(registry: &Registry) {
    registry.register_definition(ddf_v1());
    registry.register_taxonomy_transformer(ddf_taxonomy_transformer());
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::definition::DefinitionKey;
    use crate::filter::rewrite::{Direction, FilterRewriter};
    use crate::filter::Filter;

    fn registry() -> Registry {
        let registry = Registry::new();
        register_ddf(&registry);
        registry
    }

    #[test]
    fn test_terms() {
        let def = ddf_v1();
        assert_eq!(def.key(), &DefinitionKey::new("cst:ddf", 1));
        assert_eq!(def.terms().count(), 5);
        let id = def.term("id").unwrap();
        assert!(id.validate(&Value::from("a".repeat(32))).unwrap().is_valid());
        assert!(!id.validate(&Value::from("a".repeat(33))).unwrap().is_valid());
    }

    #[test]
    fn test_datatype_labels_with_wildcard() {
        let def = ddf_v1();
        let datatype = def.term("datatype").unwrap();
        assert!(datatype.validate(&Value::from("Moving Image")).unwrap().is_valid());
        assert!(datatype.validate(&Value::from("Still*")).unwrap().is_valid());
        assert!(!datatype.validate(&Value::from("MovingImage")).unwrap().is_valid());
    }

    #[test]
    fn test_resource_size_round_trip() {
        let r = registry();
        let key = DefinitionKey::new(NAMESPACE, 1);
        let canonical = r
            .to_canonical_pair(Pair::new("resource-size", 2048i64), &key)
            .unwrap();
        assert_eq!(canonical, Pair::new("resource-size", "2048").into_set());

        let back = r.from_canonical(&canonical, &key).unwrap();
        assert_eq!(back, Pair::new("resource-size", 2048i64).into_set());

        let garbage = r
            .from_canonical_pair(Pair::new("resource-size", "lots"), &key)
            .unwrap();
        assert_eq!(garbage, Pair::new("resource-size", "lots").into_set());
    }

    #[test]
    fn test_subtitle_rename_in_filter() {
        let r = registry();
        let def = r.latest_definition(NAMESPACE).unwrap();
        let out = FilterRewriter::new(&r, def, Direction::ToCanonical)
            .rewrite(&Filter::like("subtitle", "intro*"));
        assert_eq!(out.filter, Some(Filter::like("ext.ddms.subtitle", "intro*")));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_negative_size_rejected() {
        let r = registry();
        let def = r.latest_definition(NAMESPACE).unwrap();
        let out = FilterRewriter::new(&r, def, Direction::ToCanonical)
            .rewrite(&Filter::equal("resource-size", -1i64));
        assert_eq!(out.errors.len(), 1);
        assert!(out.filter.is_none());
    }
}
