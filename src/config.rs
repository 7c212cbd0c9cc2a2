// =============================================================================
// CONFIG — Configuration du moteur
// =============================================================================
//
// La configuration est chargée depuis du JSON par le composant qui pilote
// le cycle de vie du moteur, puis appliquée au registre :
//
//   {
//     "ordered_namespaces": ["cst:ddf", "cst:other"],
//     "incoming_queries": true,
//     "pinned_type_name": "cst:ddf:1"
//   }
//
// Tous les champs sont optionnels. La configuration n'est jamais
// réécrite par le moteur.
//
// =============================================================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::definition::DefinitionKey;
use crate::core::error::Result;
use crate::core::negotiate::NegotiationCache;
use crate::core::registry::Registry;
use crate::filter::query::QueryFilterTransformer;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Namespaces préférés, dans l'ordre.
    #[serde(default)]
    pub ordered_namespaces: Vec<String>,
    /// Sens par défaut des requêtes : vers la taxonomie canonique.
    #[serde(default = "default_true")]
    pub incoming_queries: bool,
    /// `namespace:version` imposé à une source distante.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_type_name: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            ordered_namespaces: Vec::new(),
            incoming_queries: true,
            pinned_type_name: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Cache de négociation pour une source : figé si un type est imposé.
    pub fn negotiation_cache(&self) -> Result<NegotiationCache> {
        match &self.pinned_type_name {
            Some(type_name) => NegotiationCache::pinned(type_name),
            None => Ok(NegotiationCache::new()),
        }
    }

    /// Transformateur de requêtes pour la définition négociée `key`.
    pub fn query_transformer(
        &self,
        registry: Arc<Registry>,
        key: &DefinitionKey,
    ) -> Result<QueryFilterTransformer> {
        let definition = registry.require_definition(key)?;
        Ok(QueryFilterTransformer::new(registry, definition)
            .incoming_by_default(self.incoming_queries))
    }
}

impl Registry {
    pub fn apply_config(&self, config: &EngineConfig) {
        debug!(
            namespaces = config.ordered_namespaces.len(),
            incoming = config.incoming_queries,
            "applying engine configuration"
        );
        self.set_ordered_namespaces(&config.ordered_namespaces);
    }
}
