// =============================================================================
// QUERY — Étape de transformation des requêtes
// =============================================================================
//
// Une requête traverse le pipeline avec son filtre et un sac de
// propriétés libres (JSON). Le QueryFilterTransformer :
//
//   1. lit la propriété `incomingQuery` (sens de la réécriture) ;
//      absente ou non booléenne, on prend le sens par défaut
//   2. réécrit le filtre avec un FilterRewriter neuf
//   3. rend une NOUVELLE requête : filtre réécrit, pagination copiée,
//      et deux propriétés de diagnostic :
//        originalQuery        → le filtre d'origine (texte)
//        cstTransformWarnings → les avertissements
//
// Filtre entièrement retiré → INCLUDE.
// Erreur de réécriture → Err : la requête est rejetée.
//
// =============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use tracing::warn;

use super::rewrite::{Direction, FilterRewriter, RewriteError, RewriteOutcome};
use super::Filter;
use crate::core::definition::Definition;
use crate::core::registry::Registry;

pub const INCOMING_QUERY: &str = "incomingQuery";
pub const ORIGINAL_QUERY: &str = "originalQuery";
pub const TRANSFORM_WARNINGS: &str = "cstTransformWarnings";

#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub filter: Filter,
    pub start_index: u32,
    pub page_size: u32,
    pub sort_by: Option<String>,
    pub timeout_millis: u64,
    pub properties: BTreeMap<String, JsonValue>,
}

impl QueryRequest {
    pub fn new(filter: Filter) -> Self {
        QueryRequest {
            filter,
            start_index: 1,
            page_size: 10,
            sort_by: None,
            timeout_millis: 0,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<JsonValue>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Les chaînes d'une propriété tableau (vide si absente).
    pub fn string_list(&self, key: &str) -> Vec<String> {
        self.properties
            .get(key)
            .and_then(JsonValue::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Réécrit les filtres des requêtes pour UNE définition.
#[derive(Debug, Clone)]
pub struct QueryFilterTransformer {
    registry: Arc<Registry>,
    definition: Arc<Definition>,
    incoming_by_default: bool,
}

impl QueryFilterTransformer {
    pub fn new(registry: Arc<Registry>, definition: Arc<Definition>) -> Self {
        QueryFilterTransformer {
            registry,
            definition,
            incoming_by_default: true,
        }
    }

    /// Sens utilisé quand la requête ne porte pas `incomingQuery`.
    pub fn incoming_by_default(mut self, incoming: bool) -> Self {
        self.incoming_by_default = incoming;
        self
    }

    /// Sens demandé par la requête ; une valeur non booléenne est
    /// signalée puis ignorée.
    fn direction(&self, request: &QueryRequest) -> Direction {
        let incoming = match request.properties.get(INCOMING_QUERY) {
            None => self.incoming_by_default,
            Some(JsonValue::Bool(incoming)) => *incoming,
            Some(other) => {
                warn!(
                    value = %other,
                    default = self.incoming_by_default,
                    "incomingQuery is not a boolean, using the default direction"
                );
                self.incoming_by_default
            }
        };
        if incoming {
            Direction::ToCanonical
        } else {
            Direction::FromCanonical
        }
    }

    /// Rend la requête réécrite, ou la première erreur de réécriture :
    /// une requête en échec ne doit jamais partir avec son filtre d'origine.
    pub fn transform(&self, request: QueryRequest) -> Result<QueryRequest, RewriteError> {
        let direction = self.direction(&request);
        let RewriteOutcome {
            filter,
            warnings,
            errors,
        } = FilterRewriter::new(&self.registry, Arc::clone(&self.definition), direction)
            .rewrite(&request.filter);

        if let Some(err) = errors.into_iter().next() {
            return Err(err);
        }

        let warnings: Vec<JsonValue> = warnings
            .iter()
            .map(|w| JsonValue::String(w.to_string()))
            .collect();

        let mut properties = request.properties;
        properties.insert(
            ORIGINAL_QUERY.to_string(),
            JsonValue::String(request.filter.to_string()),
        );
        properties.insert(TRANSFORM_WARNINGS.to_string(), JsonValue::Array(warnings));

        Ok(QueryRequest {
            filter: filter.unwrap_or(Filter::Include),
            start_index: request.start_index,
            page_size: request.page_size,
            sort_by: request.sort_by,
            timeout_millis: request.timeout_millis,
            properties,
        })
    }
}
