// =============================================================================
// DEFINITION — Un instantané versionné des termes d'un namespace
// =============================================================================
//
// Une Definition est identifiée par le couple (namespace, version) :
//   ("cst:ddf", 1), ("cst:ddf", 2)...
//
// Elle contient :
//   - ses Terms : nom → Term
//   - les transformations VERS la version précédente (to_previous),
//     indexées par le nom du terme dans CETTE version
//   - les transformations DEPUIS la version précédente (from_previous),
//     indexées par le nom du terme dans la version PRÉCÉDENTE
//
// EXEMPLE (renommage) :
//
//   v1 : title ─────────from_previous["title"]──────────▶ v2 : metadata.title
//   v1 : title ◀────to_previous["metadata.title"]──────── v2 : metadata.title
//
// Les deux sens sont enregistrés sous des clés INDÉPENDANTES et ne sont
// pas tenus d'être inverses l'un de l'autre (une conversion d'unités
// peut perdre de l'information dans un sens).
//
// Une fois enregistrée dans le registre, une Definition est partagée
// (`Arc<Definition>`) et n'est plus jamais modifiée.
//
// =============================================================================

use std::collections::BTreeMap;
use std::fmt;

use super::pair::PairSet;
use super::term::Term;
use super::transform::{PairTransform, TransformTable};

/// Identité d'une Definition : `namespace:version`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DefinitionKey {
    pub namespace: String,
    pub version: u32,
}

impl DefinitionKey {
    pub fn new(namespace: &str, version: u32) -> Self {
        DefinitionKey {
            namespace: namespace.to_string(),
            version,
        }
    }
}

impl fmt::Display for DefinitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.version)
    }
}

#[derive(Debug, Clone)]
pub struct Definition {
    key: DefinitionKey,
    terms: BTreeMap<String, Term>,
    to_previous: TransformTable,
    from_previous: TransformTable,
}

impl Definition {
    /// Crée une Definition vide.
    pub fn new(namespace: &str, version: u32) -> Self {
        Definition {
            key: DefinitionKey::new(namespace, version),
            terms: BTreeMap::new(),
            to_previous: TransformTable::new(),
            from_previous: TransformTable::new(),
        }
    }

    /// Crée une Definition à partir d'une liste de termes (sans transformations).
    pub fn with_terms(namespace: &str, version: u32, terms: impl IntoIterator<Item = Term>) -> Self {
        let mut def = Definition::new(namespace, version);
        for term in terms {
            def.add_term(term);
        }
        def
    }

    pub fn key(&self) -> &DefinitionKey {
        &self.key
    }

    pub fn namespace(&self) -> &str {
        &self.key.namespace
    }

    pub fn version(&self) -> u32 {
        self.key.version
    }

    pub fn term(&self, name: &str) -> Option<&Term> {
        self.terms.get(name)
    }

    pub fn terms(&self) -> impl Iterator<Item = &Term> {
        self.terms.values()
    }

    pub fn has_term(&self, name: &str) -> bool {
        self.terms.contains_key(name)
    }

    pub fn to_previous_transforms(&self) -> &TransformTable {
        &self.to_previous
    }

    pub fn from_previous_transforms(&self) -> &TransformTable {
        &self.from_previous
    }

    /// Ajoute un terme qui passe tel quel d'une version à l'autre.
    pub fn add_term(&mut self, term: Term) -> &mut Self {
        self.terms.insert(term.name().to_string(), term);
        self
    }

    /// Ajoute un terme et ses deux transformations, indexées par SON nom.
    pub fn add_term_with_transforms(
        &mut self,
        term: Term,
        to_previous: PairTransform,
        from_previous: PairTransform,
    ) -> &mut Self {
        let name = term.name().to_string();
        self.to_previous.insert(&name, to_previous);
        self.from_previous.insert(&name, from_previous);
        self.add_term(term)
    }

    /// Ajoute un terme renommé : `to_previous` est indexée par le nouveau
    /// nom, `from_previous` par `previous_term` (nom dans la version
    /// précédente).
    pub fn add_renamed_term(
        &mut self,
        term: Term,
        to_previous: PairTransform,
        previous_term: &str,
        from_previous: PairTransform,
    ) -> &mut Self {
        let name = term.name().to_string();
        self.to_previous.insert(&name, to_previous);
        self.from_previous.insert(previous_term, from_previous);
        self.add_term(term)
    }

    /// Transformation descendante seule, pour un terme de cette version.
    pub fn add_to_previous_transform(&mut self, term: &str, transform: PairTransform) -> &mut Self {
        self.to_previous.insert(term, transform);
        self
    }

    /// Transformation montante seule, indexée par un terme de la version
    /// précédente.
    pub fn add_from_previous_transform(
        &mut self,
        previous_term: &str,
        transform: PairTransform,
    ) -> &mut Self {
        self.from_previous.insert(previous_term, transform);
        self
    }

    /// Un pas vers la version précédente (v → v-1).
    pub fn to_previous_version(&self, pairs: &PairSet) -> PairSet {
        self.to_previous.apply(pairs)
    }

    /// Un pas depuis la version précédente (v-1 → v).
    pub fn from_previous_version(&self, pairs: &PairSet) -> PairSet {
        self.from_previous.apply(pairs)
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "definition {} {{", self.key)?;
        writeln!(f, "  terms")?;
        for term in self.terms.values() {
            writeln!(f, "    {}", term)?;
        }
        if !self.to_previous.is_empty() {
            writeln!(f, "  to_previous")?;
            for (name, t) in self.to_previous.iter() {
                writeln!(f, "    {} -> {}", name, t.name())?;
            }
        }
        if !self.from_previous.is_empty() {
            writeln!(f, "  from_previous")?;
            for (name, t) in self.from_previous.iter() {
                writeln!(f, "    {} -> {}", name, t.name())?;
            }
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
    use crate::core::typeside::ValueType;

    fn v2() -> Definition {
        let mut d = Definition::new("cst:def", 2);
        d.add_term(Term::new("name", ValueType::String)).add_renamed_term(
            Term::length("metadata.title", "titre", ValueType::String, 10),
            PairTransform::rename("title"),
            "title",
            PairTransform::rename("metadata.title"),
        );
        d
    }

    #[test]
    fn test_key_display() {
        assert_eq!(format!("{}", DefinitionKey::new("cst:ddf", 3)), "cst:ddf:3");
    }

    #[test]
    fn test_renamed_term_uses_two_keys() {
        let d = v2();
        assert!(d.to_previous_transforms().contains("metadata.title"));
        assert!(d.from_previous_transforms().contains("title"));
        assert!(!d.from_previous_transforms().contains("metadata.title"));
        assert!(d.has_term("metadata.title"));
        assert!(!d.has_term("title"));
    }

    #[test]
    fn test_single_steps() {
        let d = v2();
        let up = d.from_previous_version(&Pair::new("title", "t").into_set());
        assert_eq!(up, Pair::new("metadata.title", "t").into_set());

        let down = d.to_previous_version(&up);
        assert_eq!(down, Pair::new("title", "t").into_set());

        // terme sans transformation : identité
        let same = d.from_previous_version(&Pair::new("name", "n").into_set());
        assert_eq!(same, Pair::new("name", "n").into_set());
    }

    #[test]
    fn test_with_terms() {
        let d = Definition::with_terms(
            "cst:def",
            1,
            [Term::new("a", ValueType::String), Term::new("b", ValueType::Long)],
        );
        assert_eq!(d.terms().count(), 2);
        assert_eq!(d.version(), 1);
        assert!(format!("{}", d).contains("definition cst:def:1"));
    }
}
