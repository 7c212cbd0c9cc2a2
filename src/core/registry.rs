// =============================================================================
// REGISTRY — Le registre partagé des définitions et transformateurs
// =============================================================================
//
// Le registre est l'unique état MUTABLE du moteur :
//
//   namespace → (version → Definition)
//   namespace → TaxonomyTransformer
//   liste ordonnée des namespaces préférés
//
// Il est peuplé par un composant de configuration externe
// (register/unregister) et LU en continu par les pipelines de requêtes.
//
// CONCURRENCE :
//   Chaque table de versions est un `Arc<VersionMap>` immuable. Une
//   écriture construit une NOUVELLE table puis remplace l'Arc sous le
//   verrou : un lecteur ne voit jamais une table à moitié modifiée, et il
//   peut garder son instantané aussi longtemps qu'il le veut sans bloquer
//   les écritures suivantes.
//   Les verrous ne protègent que des échanges d'Arc ; un verrou
//   empoisonné garde donc des données cohérentes et on le récupère.
//
// =============================================================================

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use super::definition::{Definition, DefinitionKey};
use super::error::{CstError, Result};
use super::taxonomy::TaxonomyTransformer;

/// Les versions enregistrées d'un namespace.
pub type VersionMap = BTreeMap<u32, Arc<Definition>>;

/// Anomalie de configuration : signalée, jamais fatale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Une version porte des transformations dans un seul sens.
    OneWayTransforms { definition: DefinitionKey, missing: &'static str },
    /// Une clé `to_previous` qui n'est pas un terme de sa définition.
    UnknownToPreviousKey { definition: DefinitionKey, key: String },
    /// Une clé `from_previous` qui n'est pas un terme de la version précédente.
    UnknownFromPreviousKey { definition: DefinitionKey, key: String },
    /// Trou dans la suite des versions : `from..=to` absentes.
    VersionGap { namespace: String, from: u32, to: u32 },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::OneWayTransforms { definition, missing } => write!(
                f,
                "{} : transformations présentes dans un seul sens ({} absent)",
                definition, missing
            ),
            ConfigWarning::UnknownToPreviousKey { definition, key } => write!(
                f,
                "{} : la transformation to_previous '{}' ne correspond à aucun terme",
                definition, key
            ),
            ConfigWarning::UnknownFromPreviousKey { definition, key } => write!(
                f,
                "{} : la transformation from_previous '{}' ne correspond à aucun terme de la version précédente",
                definition, key
            ),
            ConfigWarning::VersionGap { namespace, from, to } if from == to => {
                write!(f, "{} : version {} absente", namespace, from)
            }
            ConfigWarning::VersionGap { namespace, from, to } => {
                write!(f, "{} : versions {} à {} absentes", namespace, from, to)
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    definitions: RwLock<HashMap<String, Arc<VersionMap>>>,
    transformers: RwLock<HashMap<String, Arc<TaxonomyTransformer>>>,
    ordered_namespaces: RwLock<Vec<String>>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    // ── Écritures (composant de configuration) ──

    /// Enregistre (ou remplace) une Definition. Les anomalies détectées
    /// dans le namespace sont tracées, pas rejetées.
    pub fn register_definition(&self, definition: impl Into<Arc<Definition>>) {
        let definition = definition.into();
        let key = definition.key().clone();
        debug!(namespace = %key.namespace, version = key.version, "registering definition");
        {
            let mut defs = write(&self.definitions);
            let mut versions = defs
                .get(&key.namespace)
                .map(|current| VersionMap::clone(current))
                .unwrap_or_default();
            versions.insert(key.version, definition);
            defs.insert(key.namespace.clone(), Arc::new(versions));
        }
        for finding in self.audit_namespace(&key.namespace) {
            warn!(namespace = %key.namespace, "{}", finding);
        }
    }

    /// Retire une version ; les autres versions du namespace restent.
    /// Sans effet si la version est absente.
    pub fn unregister_definition(&self, key: &DefinitionKey) {
        debug!(namespace = %key.namespace, version = key.version, "unregistering definition");
        let mut defs = write(&self.definitions);
        if let Some(current) = defs.get(&key.namespace) {
            if current.contains_key(&key.version) {
                let mut versions = VersionMap::clone(current);
                versions.remove(&key.version);
                defs.insert(key.namespace.clone(), Arc::new(versions));
            }
        }
    }

    /// Un seul transformateur par namespace : le dernier enregistré gagne.
    pub fn register_taxonomy_transformer(&self, transformer: impl Into<Arc<TaxonomyTransformer>>) {
        let transformer = transformer.into();
        debug!(namespace = %transformer.namespace(), "registering taxonomy transformer");
        write(&self.transformers).insert(transformer.namespace().to_string(), transformer);
    }

    pub fn unregister_taxonomy_transformer(&self, namespace: &str) {
        debug!(namespace = %namespace, "unregistering taxonomy transformer");
        write(&self.transformers).remove(namespace);
    }

    /// Remplace la liste de préférence : l'ordre donné d'abord (doublons
    /// retirés), puis les namespaces déjà enregistrés qui n'y figurent
    /// pas, triés.
    pub fn set_ordered_namespaces<S: AsRef<str>>(&self, namespaces: &[S]) {
        let mut seen = BTreeSet::new();
        let mut ordered: Vec<String> = namespaces
            .iter()
            .map(|ns| ns.as_ref().to_string())
            .filter(|ns| seen.insert(ns.clone()))
            .collect();
        for ns in self.namespaces() {
            if seen.insert(ns.clone()) {
                ordered.push(ns);
            }
        }
        debug!(namespaces = ?ordered, "ordered namespaces updated");
        *write(&self.ordered_namespaces) = ordered;
    }

    // ── Lectures (pipelines de requêtes) ──

    pub fn ordered_namespaces(&self) -> Vec<String> {
        read(&self.ordered_namespaces).clone()
    }

    /// Namespaces ayant au moins une Definition, triés.
    pub fn namespaces(&self) -> Vec<String> {
        let mut names: Vec<String> = read(&self.definitions)
            .iter()
            .filter(|(_, versions)| !versions.is_empty())
            .map(|(ns, _)| ns.clone())
            .collect();
        names.sort();
        names
    }

    /// Instantané des versions d'un namespace.
    pub fn versions(&self, namespace: &str) -> Option<Arc<VersionMap>> {
        read(&self.definitions).get(namespace).cloned()
    }

    pub fn definitions(&self) -> Vec<Arc<Definition>> {
        let defs = read(&self.definitions);
        let mut all: Vec<Arc<Definition>> = defs
            .values()
            .flat_map(|versions| versions.values().cloned())
            .collect();
        all.sort_by(|a, b| a.key().cmp(b.key()));
        all
    }

    pub fn definitions_in(&self, namespace: &str) -> Vec<Arc<Definition>> {
        self.versions(namespace)
            .map(|versions| versions.values().cloned().collect())
            .unwrap_or_default()
    }

    pub fn definition(&self, namespace: &str, version: u32) -> Option<Arc<Definition>> {
        self.versions(namespace)?.get(&version).cloned()
    }

    /// Comme [`Registry::definition`], mais en erreur si absente.
    pub fn require_definition(&self, key: &DefinitionKey) -> Result<Arc<Definition>> {
        self.definition(&key.namespace, key.version)
            .ok_or_else(|| CstError::UnknownDefinition(key.to_string()))
    }

    /// La version la plus haute enregistrée pour `namespace`.
    pub fn latest_definition(&self, namespace: &str) -> Result<Arc<Definition>> {
        let versions = self
            .versions(namespace)
            .ok_or_else(|| CstError::NoDefinitions(namespace.to_string()))?;
        latest_in(namespace, &versions)
    }

    pub fn transformer(&self, namespace: &str) -> Option<Arc<TaxonomyTransformer>> {
        read(&self.transformers).get(namespace).cloned()
    }

    // ── Audit de configuration ──

    /// Recense les anomalies d'un namespace sans jamais échouer.
    pub fn audit_namespace(&self, namespace: &str) -> Vec<ConfigWarning> {
        let Some(versions) = self.versions(namespace) else {
            return Vec::new();
        };
        let mut findings = Vec::new();

        // un trou par intervalle, jamais par version manquante
        let keys: Vec<u32> = versions.keys().copied().collect();
        for window in keys.windows(2) {
            let (low, high) = (window[0], window[1]);
            if high - low > 1 {
                findings.push(ConfigWarning::VersionGap {
                    namespace: namespace.to_string(),
                    from: low + 1,
                    to: high - 1,
                });
            }
        }

        for (version, def) in versions.iter() {
            for key in def.to_previous_transforms().keys() {
                if !def.has_term(key) {
                    findings.push(ConfigWarning::UnknownToPreviousKey {
                        definition: def.key().clone(),
                        key: key.to_string(),
                    });
                }
            }

            // la plus ancienne version n'a pas de précédente : rien à vérifier
            let Some(previous) = version.checked_sub(1).and_then(|p| versions.get(&p)) else {
                continue;
            };

            let to_empty = def.to_previous_transforms().is_empty();
            let from_empty = def.from_previous_transforms().is_empty();
            if to_empty != from_empty {
                findings.push(ConfigWarning::OneWayTransforms {
                    definition: def.key().clone(),
                    missing: if to_empty { "to_previous" } else { "from_previous" },
                });
            }

            for key in def.from_previous_transforms().keys() {
                if !previous.has_term(key) {
                    findings.push(ConfigWarning::UnknownFromPreviousKey {
                        definition: def.key().clone(),
                        key: key.to_string(),
                    });
                }
            }
        }
        findings
    }
}

pub(crate) fn latest_in(namespace: &str, versions: &VersionMap) -> Result<Arc<Definition>> {
    versions
        .values()
        .next_back()
        .cloned()
        .ok_or_else(|| CstError::NoLatestVersion(namespace.to_string()))
}
