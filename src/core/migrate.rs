// =============================================================================
// MIGRATE — Migration en chaîne entre versions et vers la taxonomie
// =============================================================================
//
// Étant donné un ensemble de Pairs exprimé dans la version A d'un
// namespace, on veut l'exprimer dans la version B du MÊME namespace.
//
// ┌─────────────────────────────────────────────────────────────────────┐
// │                                                                     │
// │  MONTÉE   (A < B) : v_A ──▶ v_A+1 ──▶ ... ──▶ v_B                   │
// │    chaque pas applique from_previous de la version d'ARRIVÉE        │
// │                                                                     │
// │  DESCENTE (A > B) : v_A ──▶ v_A-1 ──▶ ... ──▶ v_B                   │
// │    chaque pas applique to_previous de la version de DÉPART          │
// │    (celle qui porte le terme sous son nouveau nom)                  │
// │                                                                     │
// │  A = B : rien à faire, les Pairs sont rendues telles quelles        │
// │                                                                     │
// └─────────────────────────────────────────────────────────────────────┘
//
// ATOMICITÉ : toute la chaîne est vérifiée AVANT la première
// transformation, sur un instantané unique du registre. Une version
// manquante fait échouer l'appel sans aucun effet partiel.
//
// Au-dessus de la chaîne se trouve la correspondance canonique :
//
//   to_canonical   : v_from ──chaîne──▶ v_latest ──taxonomie──▶ canonique
//   from_canonical : canonique ──taxonomie──▶ v_latest ──chaîne──▶ v_to
//
// Ces fonctions sont pures vis-à-vis d'un instantané : mêmes entrées,
// même registre → mêmes sorties. Elles peuvent être appelées depuis
// n'importe quel nombre de threads sans verrou supplémentaire.
//
// =============================================================================

use std::sync::Arc;

use tracing::debug;

use super::definition::{Definition, DefinitionKey};
use super::error::{CstError, Result};
use super::pair::{Pair, PairSet};
use super::registry::{latest_in, Registry, VersionMap};
use super::taxonomy::TaxonomyTransformer;

/// Sens d'un pas de migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// v-1 → v, avec from_previous de v
    Up,
    /// v → v-1, avec to_previous de v
    Down,
}

fn check_same_namespace(from: &DefinitionKey, to: &DefinitionKey) -> Result<()> {
    if from.namespace != to.namespace {
        return Err(CstError::CrossNamespace {
            from: from.namespace.clone(),
            to: to.namespace.clone(),
        });
    }
    Ok(())
}

/// Résout la chaîne complète des pas, ou échoue sur la première version
/// absente de l'intervalle [min, max].
fn resolve_chain(
    versions: &VersionMap,
    namespace: &str,
    from: u32,
    to: u32,
) -> Result<Vec<(Arc<Definition>, Step)>> {
    let (low, high) = if from <= to { (from, to) } else { (to, from) };

    // seules les versions enregistrées sont parcourues : un grand écart
    // de numéros ne coûte rien
    let mut expected = Some(low);
    for version in versions.range(low..=high).map(|(v, _)| *v) {
        if Some(version) != expected {
            break;
        }
        expected = if version == high { None } else { Some(version + 1) };
    }
    if let Some(version) = expected {
        return Err(CstError::MissingVersion {
            namespace: namespace.to_string(),
            version,
        });
    }
    if low == high {
        return Ok(Vec::new());
    }

    let step = if from < to { Step::Up } else { Step::Down };
    let steps = versions.range(low + 1..=high).map(|(_, def)| (Arc::clone(def), step));
    Ok(match step {
        Step::Up => steps.collect(),
        Step::Down => steps.rev().collect(),
    })
}

fn walk(pairs: &PairSet, chain: &[(Arc<Definition>, Step)]) -> PairSet {
    let mut current = pairs.clone();
    for (def, step) in chain {
        current = match step {
            Step::Up => def.from_previous_version(&current),
            Step::Down => def.to_previous_version(&current),
        };
    }
    current
}

fn migrate_in(
    versions: &VersionMap,
    pairs: &PairSet,
    from: &DefinitionKey,
    to: &DefinitionKey,
) -> Result<PairSet> {
    check_same_namespace(from, to)?;
    if from.version == to.version {
        return Ok(pairs.clone());
    }
    let chain = resolve_chain(versions, &from.namespace, from.version, to.version)?;
    debug!(
        namespace = %from.namespace,
        from = from.version,
        to = to.version,
        pairs = pairs.len(),
        "migrating pairs"
    );
    Ok(walk(pairs, &chain))
}

impl Registry {
    /// Migre `pairs` de la version `from` vers la version `to`.
    pub fn migrate(
        &self,
        pairs: &PairSet,
        from: &DefinitionKey,
        to: &DefinitionKey,
    ) -> Result<PairSet> {
        check_same_namespace(from, to)?;
        if from.version == to.version {
            return Ok(pairs.clone());
        }
        let versions = self
            .versions(&from.namespace)
            .ok_or_else(|| CstError::NoDefinitions(from.namespace.clone()))?;
        migrate_in(&versions, pairs, from, to)
    }

    pub fn migrate_pair(
        &self,
        pair: Pair,
        from: &DefinitionKey,
        to: &DefinitionKey,
    ) -> Result<PairSet> {
        self.migrate(&pair.into_set(), from, to)
    }

    /// Version `from` → dernière version → taxonomie canonique.
    pub fn to_canonical(&self, pairs: &PairSet, from: &DefinitionKey) -> Result<PairSet> {
        let (versions, transformer) = self.canonical_context(&from.namespace)?;
        let latest = latest_in(&from.namespace, &versions)?;
        let at_latest = migrate_in(&versions, pairs, from, latest.key())?;
        Ok(transformer.to_canonical(&at_latest))
    }

    pub fn to_canonical_pair(&self, pair: Pair, from: &DefinitionKey) -> Result<PairSet> {
        self.to_canonical(&pair.into_set(), from)
    }

    /// Taxonomie canonique → dernière version → version `to`.
    pub fn from_canonical(&self, pairs: &PairSet, to: &DefinitionKey) -> Result<PairSet> {
        let (versions, transformer) = self.canonical_context(&to.namespace)?;
        let latest = latest_in(&to.namespace, &versions)?;
        // la chaîne est vérifiée avant la moindre transformation
        let chain = if latest.version() == to.version {
            Vec::new()
        } else {
            resolve_chain(&versions, &to.namespace, latest.version(), to.version)?
        };
        let at_latest = transformer.from_canonical(pairs);
        Ok(walk(&at_latest, &chain))
    }

    pub fn from_canonical_pair(&self, pair: Pair, to: &DefinitionKey) -> Result<PairSet> {
        self.from_canonical(&pair.into_set(), to)
    }

    fn canonical_context(
        &self,
        namespace: &str,
    ) -> Result<(Arc<VersionMap>, Arc<TaxonomyTransformer>)> {
        let versions = self
            .versions(namespace)
            .ok_or_else(|| CstError::NoDefinitions(namespace.to_string()))?;
        let transformer = self
            .transformer(namespace)
            .ok_or_else(|| CstError::NoTransformer(namespace.to_string()))?;
        Ok((versions, transformer))
    }
}
