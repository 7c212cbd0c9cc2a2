// =============================================================================
// NEGOTIATE — Choix du couple namespace:version avec une source distante
// =============================================================================
//
// Une source distante annonce les types qu'elle sait servir, sous la
// forme `namespace:version` :
//
//   ["cst:ddf:1", "cst:ddf:2", "other:ns:4"]
//
// Localement, on dispose d'une liste ORDONNÉE de namespaces préférés.
// La négociation :
//
//   1. prend le premier namespace préféré annoncé par la source
//   2. trie les versions annoncées pour ce namespace (croissant)
//   3. retient la plus basse version qui a une Definition locale
//
// Un échec de négociation n'est PAS une erreur : l'appelant repasse en
// mode non négocié. On le signale par `None` et un avertissement.
//
// Le résultat peut être mis en cache par source (NegotiationCache) ;
// le cache tolère une liste de capacités devenue obsolète.
//
// =============================================================================

use tracing::{debug, warn};

use super::definition::DefinitionKey;
use super::error::{CstError, Result};
use super::registry::Registry;

/// Découpe `namespace:version` sur le DERNIER ':' (les namespaces
/// contiennent eux-mêmes des ':').
pub fn parse_type_name(type_name: &str) -> Result<DefinitionKey> {
    let invalid = || CstError::InvalidTypeName(type_name.to_string());
    let (namespace, version) = type_name.rsplit_once(':').ok_or_else(invalid)?;
    if namespace.is_empty() {
        return Err(invalid());
    }
    let version = version.trim().parse::<u32>().map_err(|_| invalid())?;
    Ok(DefinitionKey::new(namespace, version))
}

/// Négocie un type commun entre les préférences locales et les types
/// annoncés par la source distante.
pub fn negotiate<P, R>(registry: &Registry, preference: &[P], remote: &[R]) -> Option<DefinitionKey>
where
    P: AsRef<str>,
    R: AsRef<str>,
{
    let remote: Vec<&str> = remote.iter().map(|name| name.as_ref()).collect();
    let advertised: Vec<DefinitionKey> = remote
        .iter()
        .filter_map(|name| match parse_type_name(name) {
            Ok(key) => Some(key),
            Err(_) => {
                debug!(type_name = *name, "ignoring unparsable remote type name");
                None
            }
        })
        .collect();

    let Some(namespace) = preference
        .iter()
        .map(|ns| ns.as_ref())
        .find(|ns: &&str| advertised.iter().any(|key| key.namespace == *ns))
    else {
        warn!(?remote, "no preferred namespace is served by the remote source");
        return None;
    };

    let mut versions: Vec<u32> = advertised
        .iter()
        .filter(|key| key.namespace == namespace)
        .map(|key| key.version)
        .collect();
    versions.sort_unstable();
    versions.dedup();

    match versions
        .into_iter()
        .find(|v| registry.definition(namespace, *v).is_some())
    {
        Some(version) => {
            let key = DefinitionKey::new(namespace, version);
            debug!(type_name = %key, "negotiated remote type");
            Some(key)
        }
        None => {
            warn!(namespace, "no advertised version has a local definition");
            None
        }
    }
}

impl Registry {
    /// Négocie avec la liste ordonnée de namespaces du registre.
    pub fn negotiate<R: AsRef<str>>(&self, remote: &[R]) -> Option<DefinitionKey> {
        negotiate(self, &self.ordered_namespaces(), remote)
    }
}

/// Résultat de négociation mémorisé pour UNE source distante.
#[derive(Debug, Clone, Default)]
pub struct NegotiationCache {
    pinned: Option<DefinitionKey>,
    cached: Option<DefinitionKey>,
}

impl NegotiationCache {
    pub fn new() -> Self {
        NegotiationCache::default()
    }

    /// Source configurée avec un type explicite : pas de négociation.
    pub fn pinned(type_name: &str) -> Result<Self> {
        Ok(NegotiationCache {
            pinned: Some(parse_type_name(type_name)?),
            cached: None,
        })
    }

    pub fn cached(&self) -> Option<&DefinitionKey> {
        self.cached.as_ref()
    }

    /// Type à utiliser pour la source. Le cache n'est réutilisé que si sa
    /// Definition est toujours enregistrée.
    pub fn resolve<R: AsRef<str>>(&mut self, registry: &Registry, remote: &[R]) -> Option<DefinitionKey> {
        if let Some(pinned) = &self.pinned {
            return Some(pinned.clone());
        }
        if let Some(key) = &self.cached {
            if registry.definition(&key.namespace, key.version).is_some() {
                return Some(key.clone());
            }
            debug!(type_name = %key, "cached negotiation is stale");
        }
        self.cached = registry.negotiate(remote);
        self.cached.clone()
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }
}
