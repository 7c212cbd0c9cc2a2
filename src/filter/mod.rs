// =============================================================================
// FILTER — L'arbre de prédicats réécrit par le moteur
// =============================================================================
//
// Les requêtes arrivent avec un filtre : un arbre de prédicats immuable.
//
//   AND
//   ├── title = 'rust'
//   ├── NOT (resource-size < 1024)
//   └── created AFTER '2020-01-01'
//
// La grammaire réelle des filtres (analyse, sérialisation) appartient à
// une bibliothèque externe. On ne porte ici que le modèle minimal dont
// le réécrivain a besoin : pour chaque nœud, son GENRE, ses opérandes et,
// pour un littéral, sa valeur scalaire typée.
//
// Genres de nœuds :
//   - logiques       : AND, OR, NOT, INCLUDE, EXCLUDE
//   - comparaisons   : =, !=, <, <=, >, >=        (liées à un terme)
//   - motif          : LIKE                       (lié à un terme)
//   - intervalle     : BETWEEN
//   - absence        : IS NULL, IS NIL
//   - temporels      : AFTER, BEFORE, DURING
//   - spatiaux       : CONTAINS, INTERSECTS, WITHIN, DWITHIN
//
// Display sert au diagnostic uniquement, ce n'est pas un format d'échange.
//
// =============================================================================

pub mod query;
pub mod rewrite;

use std::fmt;

use crate::core::typeside::Value;

/// Un opérande de prédicat.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Property(String),
    Literal(Value),
    Function { name: String, args: Vec<Expr> },
}

impl Expr {
    pub fn property(name: &str) -> Self {
        Expr::Property(name.to_string())
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn as_property(&self) -> Option<&str> {
        match self {
            Expr::Property(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Property(name) => write!(f, "{}", name),
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::Function { name, args } => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", name, args.join(", "))
            }
        }
    }
}

/// Opérateur de comparaison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,          // =
    NotEqual,       // !=
    Less,           // <
    LessOrEqual,    // <=
    Greater,        // >
    GreaterOrEqual, // >=
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComparisonOp::Equal => write!(f, "="),
            ComparisonOp::NotEqual => write!(f, "!="),
            ComparisonOp::Less => write!(f, "<"),
            ComparisonOp::LessOrEqual => write!(f, "<="),
            ComparisonOp::Greater => write!(f, ">"),
            ComparisonOp::GreaterOrEqual => write!(f, ">="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalOp {
    After,
    Before,
    During,
}

impl fmt::Display for TemporalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemporalOp::After => write!(f, "AFTER"),
            TemporalOp::Before => write!(f, "BEFORE"),
            TemporalOp::During => write!(f, "DURING"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialOp {
    Contains,
    Intersects,
    Within,
    DWithin,
}

impl fmt::Display for SpatialOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialOp::Contains => write!(f, "CONTAINS"),
            SpatialOp::Intersects => write!(f, "INTERSECTS"),
            SpatialOp::Within => write!(f, "WITHIN"),
            SpatialOp::DWithin => write!(f, "DWITHIN"),
        }
    }
}

/// Le genre d'un nœud : c'est lui qui choisit la stratégie de réécriture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    Constant,
    Logical,
    Comparison,
    Like,
    Between,
    NullCheck,
    Temporal,
    Spatial,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Accepte tout
    Include,
    /// Refuse tout
    Exclude,
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Comparison {
        op: ComparisonOp,
        left: Expr,
        right: Expr,
        match_case: bool,
    },
    Like {
        expr: Expr,
        pattern: String,
        wildcard: char,
        single_char: char,
        escape: char,
        match_case: bool,
    },
    Between {
        expr: Expr,
        lower: Expr,
        upper: Expr,
    },
    IsNull(Expr),
    IsNil {
        expr: Expr,
        nil_reason: Option<String>,
    },
    Temporal {
        op: TemporalOp,
        left: Expr,
        right: Expr,
    },
    Spatial {
        op: SpatialOp,
        left: Expr,
        right: Expr,
        /// Uniquement pour DWITHIN
        distance: Option<f64>,
    },
}

impl Filter {
    pub fn comparison(op: ComparisonOp, property: &str, value: impl Into<Value>) -> Self {
        Filter::Comparison {
            op,
            left: Expr::property(property),
            right: Expr::literal(value),
            match_case: true,
        }
    }

    pub fn equal(property: &str, value: impl Into<Value>) -> Self {
        Filter::comparison(ComparisonOp::Equal, property, value)
    }

    /// LIKE avec les caractères usuels : `*`, `.` et `\`.
    pub fn like(property: &str, pattern: &str) -> Self {
        Filter::Like {
            expr: Expr::property(property),
            pattern: pattern.to_string(),
            wildcard: '*',
            single_char: '.',
            escape: '\\',
            match_case: true,
        }
    }

    pub fn and(children: Vec<Filter>) -> Self {
        Filter::And(children)
    }

    pub fn or(children: Vec<Filter>) -> Self {
        Filter::Or(children)
    }

    pub fn negate(child: Filter) -> Self {
        Filter::Not(Box::new(child))
    }

    pub fn is_null(property: &str) -> Self {
        Filter::IsNull(Expr::property(property))
    }

    pub fn kind(&self) -> PredicateKind {
        match self {
            Filter::Include | Filter::Exclude => PredicateKind::Constant,
            Filter::And(_) | Filter::Or(_) | Filter::Not(_) => PredicateKind::Logical,
            Filter::Comparison { .. } => PredicateKind::Comparison,
            Filter::Like { .. } => PredicateKind::Like,
            Filter::Between { .. } => PredicateKind::Between,
            Filter::IsNull(_) | Filter::IsNil { .. } => PredicateKind::NullCheck,
            Filter::Temporal { .. } => PredicateKind::Temporal,
            Filter::Spatial { .. } => PredicateKind::Spatial,
        }
    }

    /// Les opérandes directs du nœud (vide pour un nœud logique).
    pub fn operands(&self) -> Vec<&Expr> {
        match self {
            Filter::Include | Filter::Exclude => vec![],
            Filter::And(_) | Filter::Or(_) | Filter::Not(_) => vec![],
            Filter::Comparison { left, right, .. }
            | Filter::Temporal { left, right, .. }
            | Filter::Spatial { left, right, .. } => vec![left, right],
            Filter::Like { expr, .. } | Filter::IsNull(expr) | Filter::IsNil { expr, .. } => {
                vec![expr]
            }
            Filter::Between { expr, lower, upper } => vec![expr, lower, upper],
        }
    }

    /// Les sous-filtres d'un nœud logique.
    pub fn children(&self) -> Vec<&Filter> {
        match self {
            Filter::And(children) | Filter::Or(children) => children.iter().collect(),
            Filter::Not(child) => vec![child.as_ref()],
            _ => vec![],
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, children: &[Filter], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", sep)?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Include => write!(f, "INCLUDE"),
            Filter::Exclude => write!(f, "EXCLUDE"),
            Filter::And(children) => write_joined(f, children, "AND"),
            Filter::Or(children) => write_joined(f, children, "OR"),
            Filter::Not(child) => write!(f, "NOT {}", child),
            Filter::Comparison { op, left, right, .. } => write!(f, "{} {} {}", left, op, right),
            Filter::Like { expr, pattern, .. } => write!(f, "{} LIKE '{}'", expr, pattern),
            Filter::Between { expr, lower, upper } => {
                write!(f, "{} BETWEEN {} AND {}", expr, lower, upper)
            }
            Filter::IsNull(expr) => write!(f, "{} IS NULL", expr),
            Filter::IsNil { expr, .. } => write!(f, "{} IS NIL", expr),
            Filter::Temporal { op, left, right } => write!(f, "{} {} {}", left, op, right),
            Filter::Spatial { op, left, right, distance } => match distance {
                Some(d) => write!(f, "{}({}, {}, {})", op, left, right, d),
                None => write!(f, "{}({}, {})", op, left, right),
            },
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Filter::equal("title", "x").kind(), PredicateKind::Comparison);
        assert_eq!(Filter::like("title", "x*").kind(), PredicateKind::Like);
        assert_eq!(Filter::is_null("title").kind(), PredicateKind::NullCheck);
        assert_eq!(Filter::and(vec![]).kind(), PredicateKind::Logical);
        assert_eq!(Filter::Include.kind(), PredicateKind::Constant);
    }

    #[test]
    fn test_operands_and_children() {
        let eq = Filter::equal("title", "x");
        let ops = eq.operands();
        assert_eq!(ops[0].as_property(), Some("title"));
        assert_eq!(ops[1].as_literal(), Some(&Value::from("x")));

        let tree = Filter::or(vec![eq.clone(), Filter::negate(eq)]);
        assert_eq!(tree.children().len(), 2);
        assert!(tree.operands().is_empty());
    }

    #[test]
    fn test_display() {
        let tree = Filter::and(vec![
            Filter::equal("title", "rust"),
            Filter::negate(Filter::comparison(ComparisonOp::Less, "size", 10i64)),
        ]);
        assert_eq!(format!("{}", tree), "(title = 'rust' AND NOT size < 10)");

        let spatial = Filter::Spatial {
            op: SpatialOp::DWithin,
            left: Expr::property("location"),
            right: Expr::literal("POINT(1 2)"),
            distance: Some(5.0),
        };
        assert_eq!(format!("{}", spatial), "DWITHIN(location, 'POINT(1 2)', 5)");
    }
}
