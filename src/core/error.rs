// =============================================================================
// ERROR — Les erreurs de configuration du moteur
// =============================================================================
//
// Deux familles d'échecs existent dans le moteur :
//   - les ERREURS DE CONFIGURATION (ce module) : registre incomplet,
//     migration entre namespaces, version manquante dans la chaîne...
//     Elles sont fatales et ne doivent jamais être "réessayées" : c'est
//     l'opérateur qui doit corriger le registre.
//   - les ERREURS DE VALIDATION : une valeur littérale refusée par son
//     Term pendant la réécriture d'un filtre (voir filter::rewrite).
//
// Les conditions non fatales (terme inconnu, terme abandonné) ne sont PAS
// des erreurs : ce sont des avertissements collectés par le réécrivain.
//
// =============================================================================

use thiserror::Error;

/// Raccourci pour les opérations du moteur.
pub type Result<T> = std::result::Result<T, CstError>;

#[derive(Debug, Error)]
pub enum CstError {
    /// Une migration ne peut pas traverser deux namespaces.
    #[error(
        "les transformations doivent rester dans un même namespace (depuis '{from}', vers '{to}')"
    )]
    CrossNamespace { from: String, to: String },

    #[error("aucune définition enregistrée pour le namespace '{0}'")]
    NoDefinitions(String),

    #[error("impossible de déterminer la dernière version du namespace '{0}'")]
    NoLatestVersion(String),

    /// Un maillon de la chaîne de migration n'est pas enregistré.
    #[error("version {version} manquante dans la chaîne de migration du namespace '{namespace}'")]
    MissingVersion { namespace: String, version: u32 },

    #[error("aucun transformateur de taxonomie enregistré pour le namespace '{0}'")]
    NoTransformer(String),

    #[error("définition inconnue : {0}")]
    UnknownDefinition(String),

    /// Un validateur a reçu une valeur d'un type qu'il ne sait pas lire.
    /// C'est une erreur de programmation, pas un échec de validation.
    #[error("le champ '{field}' attend une valeur {expected}, reçu {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("expression régulière invalide : {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Identifiant distant qui n'a pas la forme `namespace:version`.
    #[error("identifiant de type invalide '{0}' (attendu namespace:version)")]
    InvalidTypeName(String),

    #[error("configuration invalide : {0}")]
    Config(#[from] serde_json::Error),
}
