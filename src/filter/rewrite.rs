// =============================================================================
// REWRITE — Réécriture d'un filtre vers / depuis la taxonomie canonique
// =============================================================================
//
// Le réécrivain parcourt un filtre, extrait de chaque prédicat lié à un
// terme la Pair (propriété, littéral), la fait passer par la chaîne de
// migration et la correspondance canonique, puis reconstruit un filtre
// équivalent :
//
//   title = 'x'         ──▶ 1 Pair  ──▶ metadata.title = 'x'
//   keyword = 'rust'    ──▶ 2 Pairs ──▶ (topic.a = 'rust' OR topic.b = 'rust')
//   legacy = 1          ──▶ 0 Pair  ──▶ prédicat retiré (avertissement)
//   inconnu = 1         ──▶ terme absent de la définition : tel quel
//                                                     (avertissement)
//
// Stratégies par genre de nœud (voir PredicateKind) :
//   - Comparison, Like  : recherche du terme, validation, transformation
//   - Logical           : réécriture des enfants ; un nœud logique sans
//                         enfant restant disparaît lui aussi
//   - Between, NullCheck, Temporal, Spatial : reconstruits sans recherche
//                         de terme (aucun littéral lié à la taxonomie)
//   - Constant          : tel quel
//
// ÉCHECS :
//   - un littéral refusé par son Term interrompt TOUTE la réécriture :
//     jamais d'arbre partiellement réécrit
//   - une comparaison sans couple propriété/littéral aussi
//   - les avertissements, eux, s'accumulent sans interrompre
//
// Un FilterRewriter ne sert qu'une fois : `rewrite` le consomme.
//
// =============================================================================

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use super::{Expr, Filter, PredicateKind};
use crate::core::definition::{Definition, DefinitionKey};
use crate::core::error::CstError;
use crate::core::pair::{Pair, PairSet};
use crate::core::registry::Registry;
use crate::core::typeside::Value;
use crate::core::validate::ValidationOutcome;

/// Sens de la réécriture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Requête entrante : namespace → canonique
    ToCanonical,
    /// Requête sortante : canonique → namespace
    FromCanonical,
}

/// Condition non fatale relevée pendant la réécriture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteWarning {
    UnknownTerm { term: String, definition: DefinitionKey },
    DroppedTerm { term: String },
}

impl fmt::Display for RewriteWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteWarning::UnknownTerm { term, definition } => write!(
                f,
                "le terme {} ne fait pas partie de {} et passe tel quel",
                term, definition
            ),
            RewriteWarning::DroppedTerm { term } => {
                write!(f, "le terme {} a été retiré du filtre", term)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum RewriteError {
    /// Littéral refusé par le validateur de son Term.
    #[error("{message}")]
    Validation { term: String, message: String },

    #[error(transparent)]
    Configuration(#[from] CstError),

    #[error("un nom de propriété et un littéral sont requis pour la recherche")]
    MissingOperands,
}

/// Résultat d'une réécriture. Un `errors` non vide signifie que
/// l'arbre ne doit pas être utilisé (il est alors absent).
#[derive(Debug)]
pub struct RewriteOutcome {
    pub filter: Option<Filter>,
    pub warnings: Vec<RewriteWarning>,
    pub errors: Vec<RewriteError>,
}

impl RewriteOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Tout le filtre a été retiré sans erreur.
    pub fn is_dropped(&self) -> bool {
        self.filter.is_none() && self.errors.is_empty()
    }
}

/// Issue de la recherche d'un terme pour un prédicat.
enum Mapped {
    /// Terme inconnu : le prédicat d'origine est conservé.
    PassThrough,
    Pairs(PairSet),
}

/// Côté du littéral dans une comparaison.
#[derive(Clone, Copy)]
enum Orientation {
    PropertyFirst,
    LiteralFirst,
}

pub struct FilterRewriter<'r> {
    registry: &'r Registry,
    definition: Arc<Definition>,
    direction: Direction,
    warnings: Vec<RewriteWarning>,
}

impl<'r> FilterRewriter<'r> {
    pub fn new(registry: &'r Registry, definition: Arc<Definition>, direction: Direction) -> Self {
        FilterRewriter {
            registry,
            definition,
            direction,
            warnings: Vec::new(),
        }
    }

    pub fn rewrite(mut self, filter: &Filter) -> RewriteOutcome {
        match self.visit(filter) {
            Ok(filter) => {
                debug!(
                    definition = %self.definition.key(),
                    warnings = self.warnings.len(),
                    dropped = filter.is_none(),
                    "filter rewritten"
                );
                RewriteOutcome {
                    filter,
                    warnings: self.warnings,
                    errors: Vec::new(),
                }
            }
            Err(err) => {
                warn!(definition = %self.definition.key(), error = %err, "filter rewrite aborted");
                RewriteOutcome {
                    filter: None,
                    warnings: self.warnings,
                    errors: vec![err],
                }
            }
        }
    }

    /// `Ok(None)` : le nœud a été retiré.
    fn visit(&mut self, filter: &Filter) -> Result<Option<Filter>, RewriteError> {
        match filter.kind() {
            PredicateKind::Logical => self.visit_logical(filter),
            PredicateKind::Comparison => self.visit_comparison(filter),
            PredicateKind::Like => self.visit_like(filter),
            // pas de terme à rechercher : reconstruits à l'identique
            PredicateKind::Constant
            | PredicateKind::Between
            | PredicateKind::NullCheck
            | PredicateKind::Temporal
            | PredicateKind::Spatial => Ok(Some(filter.clone())),
        }
    }

    fn visit_logical(&mut self, filter: &Filter) -> Result<Option<Filter>, RewriteError> {
        let mut kept = Vec::new();
        for child in filter.children() {
            if let Some(rewritten) = self.visit(child)? {
                kept.push(rewritten);
            }
        }
        if kept.is_empty() {
            return Ok(None);
        }
        Ok(match filter {
            Filter::And(_) => Some(Filter::And(kept)),
            Filter::Or(_) => Some(Filter::Or(kept)),
            _ => kept.pop().map(Filter::negate),
        })
    }

    fn visit_comparison(&mut self, filter: &Filter) -> Result<Option<Filter>, RewriteError> {
        let Filter::Comparison { op, match_case, .. } = filter else {
            return Ok(Some(filter.clone()));
        };
        let (name, value, orientation) = match filter.operands()[..] {
            [left, right] => attribute_operands(left, right)?,
            _ => return Err(RewriteError::MissingOperands),
        };
        let rebuilt = match self.map_attribute(name, value)? {
            Mapped::PassThrough => return Ok(Some(filter.clone())),
            Mapped::Pairs(pairs) => pairs
                .into_iter()
                .map(|pair| {
                    let property = Expr::property(pair.key());
                    let literal = Expr::Literal(pair.value().clone());
                    let (left, right) = match orientation {
                        Orientation::PropertyFirst => (property, literal),
                        Orientation::LiteralFirst => (literal, property),
                    };
                    Filter::Comparison {
                        op: *op,
                        left,
                        right,
                        match_case: *match_case,
                    }
                })
                .collect(),
        };
        Ok(self.combine(name, rebuilt))
    }

    /// Le motif joue le rôle du littéral.
    fn visit_like(&mut self, filter: &Filter) -> Result<Option<Filter>, RewriteError> {
        let Filter::Like {
            expr,
            pattern,
            wildcard,
            single_char,
            escape,
            match_case,
        } = filter
        else {
            return Ok(Some(filter.clone()));
        };
        let name = expr.as_property().ok_or(RewriteError::MissingOperands)?;
        let value = Value::from(pattern.as_str());
        let rebuilt = match self.map_attribute(name, &value)? {
            Mapped::PassThrough => return Ok(Some(filter.clone())),
            Mapped::Pairs(pairs) => pairs
                .into_iter()
                .map(|pair| Filter::Like {
                    expr: Expr::property(pair.key()),
                    pattern: pair.value().as_text(),
                    wildcard: *wildcard,
                    single_char: *single_char,
                    escape: *escape,
                    match_case: *match_case,
                })
                .collect(),
        };
        Ok(self.combine(name, rebuilt))
    }

    /// 0 prédicat → retiré, 1 → en place, n → OR.
    fn combine(&mut self, term: &str, mut rebuilt: Vec<Filter>) -> Option<Filter> {
        match rebuilt.len() {
            0 => {
                debug!(term, "term dropped from filter");
                self.warnings.push(RewriteWarning::DroppedTerm {
                    term: term.to_string(),
                });
                None
            }
            1 => rebuilt.pop(),
            _ => Some(Filter::Or(rebuilt)),
        }
    }

    fn map_attribute(&mut self, name: &str, value: &Value) -> Result<Mapped, RewriteError> {
        let Some(term) = self.definition.term(name) else {
            debug!(term = name, definition = %self.definition.key(), "unknown term passed through");
            self.warnings.push(RewriteWarning::UnknownTerm {
                term: name.to_string(),
                definition: self.definition.key().clone(),
            });
            return Ok(Mapped::PassThrough);
        };

        match term.validate(value) {
            Ok(ValidationOutcome::Valid) => {}
            Ok(ValidationOutcome::Invalid(message)) => {
                return Err(RewriteError::Validation {
                    term: name.to_string(),
                    message,
                })
            }
            // un littéral du mauvais type est un refus, pas une panne
            Err(err @ CstError::TypeMismatch { .. }) => {
                return Err(RewriteError::Validation {
                    term: name.to_string(),
                    message: err.to_string(),
                })
            }
            Err(err) => return Err(err.into()),
        }

        let pair = Pair::new(name, value.clone());
        let key = self.definition.key();
        let pairs = match self.direction {
            Direction::ToCanonical => self.registry.to_canonical_pair(pair, key)?,
            Direction::FromCanonical => self.registry.from_canonical_pair(pair, key)?,
        };
        Ok(Mapped::Pairs(pairs))
    }
}

/// Extrait (propriété, littéral) quel que soit leur ordre.
fn attribute_operands<'a>(
    left: &'a Expr,
    right: &'a Expr,
) -> Result<(&'a str, &'a Value, Orientation), RewriteError> {
    match (left, right) {
        (Expr::Property(name), Expr::Literal(value)) if !name.trim().is_empty() => {
            Ok((name, value, Orientation::PropertyFirst))
        }
        (Expr::Literal(value), Expr::Property(name)) if !name.trim().is_empty() => {
            Ok((name, value, Orientation::LiteralFirst))
        }
        _ => Err(RewriteError::MissingOperands),
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::taxonomy::TaxonomyTransformer;
    use crate::core::term::Term;
    use crate::core::transform::PairTransform;
    use crate::core::typeside::ValueType;
    use crate::filter::{ComparisonOp, SpatialOp, TemporalOp};

    const NS: &str = "cst:def";

    fn setup() -> (Registry, Arc<Definition>) {
        let registry = Registry::new();
        let mut d = Definition::new(NS, 1);
        d.add_term(Term::length("title", "titre", ValueType::String, 10))
            .add_term(Term::new("keyword", ValueType::String))
            .add_term(Term::new("legacy", ValueType::String))
            .add_term(Term::numeric_range("size", "taille", ValueType::Long, 0, 100));
        registry.register_definition(d);

        let mut t = TaxonomyTransformer::new(NS);
        t.add_name_transform("title", "metadata.title")
            .add_taxonomy_transform(
                "keyword",
                PairTransform::fan_out(&["topic.keyword", "topic.vocabulary"]),
                "topic.keyword",
                PairTransform::rename("keyword"),
            )
            .add_taxonomy_transform(
                "legacy",
                PairTransform::drop_term(),
                "legacy",
                PairTransform::drop_term(),
            );
        registry.register_taxonomy_transformer(t);

        let definition = registry.latest_definition(NS).unwrap();
        (registry, definition)
    }

    fn rewrite(filter: &Filter) -> RewriteOutcome {
        let (registry, definition) = setup();
        FilterRewriter::new(&registry, definition, Direction::ToCanonical).rewrite(filter)
    }

    #[test]
    fn test_simple_rename() {
        let out = rewrite(&Filter::equal("title", "rust"));
        assert!(out.is_ok());
        assert!(out.warnings.is_empty());
        assert_eq!(out.filter, Some(Filter::equal("metadata.title", "rust")));
    }

    #[test]
    fn test_unknown_term_passes_through() {
        let filter = Filter::equal("unknown", "x");
        let out = rewrite(&filter);
        assert_eq!(out.filter, Some(filter));
        assert_eq!(out.warnings.len(), 1);
        assert!(out.errors.is_empty());
        assert!(matches!(&out.warnings[0], RewriteWarning::UnknownTerm { term, .. } if term == "unknown"));
    }

    #[test]
    fn test_multi_valued_mapping_becomes_or() {
        let out = rewrite(&Filter::equal("keyword", "rust"));
        assert!(out.warnings.is_empty());
        assert!(out.errors.is_empty());
        assert_eq!(
            out.filter,
            Some(Filter::or(vec![
                Filter::equal("topic.keyword", "rust"),
                Filter::equal("topic.vocabulary", "rust"),
            ]))
        );
    }

    #[test]
    fn test_invalid_literal_aborts() {
        let tree = Filter::and(vec![
            Filter::equal("keyword", "rust"),
            Filter::equal("title", "much too long for ten"),
        ]);
        let out = rewrite(&tree);
        assert!(out.filter.is_none());
        assert_eq!(out.errors.len(), 1);
        assert!(matches!(&out.errors[0], RewriteError::Validation { term, .. } if term == "title"));
    }

    #[test]
    fn test_type_mismatch_is_a_validation_error() {
        let out = rewrite(&Filter::equal("size", "big"));
        assert!(out.filter.is_none());
        assert!(matches!(out.errors[0], RewriteError::Validation { .. }));
    }

    #[test]
    fn test_dropped_term() {
        let out = rewrite(&Filter::equal("legacy", "x"));
        assert!(out.is_dropped());
        assert_eq!(
            out.warnings,
            vec![RewriteWarning::DroppedTerm { term: "legacy".into() }]
        );
    }

    #[test]
    fn test_logical_nodes_prune_dropped_children() {
        let tree = Filter::and(vec![
            Filter::equal("legacy", "x"),
            Filter::negate(Filter::equal("legacy", "y")),
            Filter::equal("title", "t"),
        ]);
        let out = rewrite(&tree);
        assert_eq!(
            out.filter,
            Some(Filter::and(vec![Filter::equal("metadata.title", "t")]))
        );
        assert_eq!(out.warnings.len(), 2);

        let all_dropped = Filter::or(vec![Filter::equal("legacy", "x")]);
        assert!(rewrite(&all_dropped).is_dropped());
    }

    #[test]
    fn test_literal_first_orientation_preserved() {
        let filter = Filter::Comparison {
            op: ComparisonOp::Less,
            left: Expr::literal(5i64),
            right: Expr::property("size"),
            match_case: false,
        };
        let out = rewrite(&filter);
        assert_eq!(out.filter, Some(filter));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_like_keeps_pattern_settings() {
        let filter = Filter::Like {
            expr: Expr::property("title"),
            pattern: "ru%".into(),
            wildcard: '%',
            single_char: '_',
            escape: '!',
            match_case: false,
        };
        let out = rewrite(&filter);
        assert_eq!(
            out.filter,
            Some(Filter::Like {
                expr: Expr::property("metadata.title"),
                pattern: "ru%".into(),
                wildcard: '%',
                single_char: '_',
                escape: '!',
                match_case: false,
            })
        );
    }

    #[test]
    fn test_missing_operands() {
        let filter = Filter::Comparison {
            op: ComparisonOp::Equal,
            left: Expr::property("title"),
            right: Expr::property("keyword"),
            match_case: true,
        };
        let out = rewrite(&filter);
        assert!(out.filter.is_none());
        assert!(matches!(out.errors[0], RewriteError::MissingOperands));

        let blank = Filter::equal("  ", "x");
        assert!(matches!(rewrite(&blank).errors[0], RewriteError::MissingOperands));
    }

    #[test]
    fn test_non_taxonomy_predicates_untouched() {
        let tree = Filter::and(vec![
            Filter::is_null("title"),
            Filter::Temporal {
                op: TemporalOp::After,
                left: Expr::property("created"),
                right: Expr::literal("2020-01-01"),
            },
            Filter::Spatial {
                op: SpatialOp::Intersects,
                left: Expr::property("location"),
                right: Expr::literal("POINT(0 0)"),
                distance: None,
            },
            Filter::Between {
                expr: Expr::property("size"),
                lower: Expr::literal(1i64),
                upper: Expr::literal(1000i64),
            },
        ]);
        let out = rewrite(&tree);
        assert_eq!(out.filter, Some(tree));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_from_canonical_direction() {
        let (registry, definition) = setup();
        let out = FilterRewriter::new(&registry, definition, Direction::FromCanonical)
            .rewrite(&Filter::equal("keyword", "rust"));
        // from_canonical n'a rien pour "keyword" : passe tel quel
        assert_eq!(out.filter, Some(Filter::equal("keyword", "rust")));
    }

    #[test]
    fn test_missing_transformer_is_a_configuration_error() {
        let registry = Registry::new();
        registry.register_definition(Definition::with_terms(
            NS,
            1,
            [Term::new("title", ValueType::String)],
        ));
        let definition = registry.latest_definition(NS).unwrap();
        let out = FilterRewriter::new(&registry, definition, Direction::ToCanonical)
            .rewrite(&Filter::equal("title", "x"));
        assert!(matches!(
            out.errors[0],
            RewriteError::Configuration(CstError::NoTransformer(_))
        ));
    }

    #[test]
    fn test_warning_messages() {
        let w = RewriteWarning::UnknownTerm {
            term: "foo".into(),
            definition: DefinitionKey::new("cst:ddf", 1),
        };
        assert!(w.to_string().contains("cst:ddf:1"));
        assert!(RewriteWarning::DroppedTerm { term: "bar".into() }
            .to_string()
            .contains("bar"));
    }
}
