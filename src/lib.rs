// =============================================================================
// TAXORUST — Moteur de transformation de schémas versionnés
// =============================================================================
//
// Des sources de données externes parlent chacune leur propre schéma
// (un namespace), qui évolue par versions. Le moteur traduit les champs
// et les filtres de requête :
//
//   namespace:v ──migration──▶ namespace:latest ──taxonomie──▶ canonique
//
// et dans l'autre sens pour les requêtes sortantes.
//
// Architecture :
//   core/        → termes, définitions, registre, migrations, négociation
//   filter/      → arbre de prédicats et réécriture des filtres
//   definitions/ → définitions livrées (cst:ddf)
//   config       → configuration JSON du moteur
//
// Concepts fondamentaux :
//   Pair       = (nom de champ, valeur), l'unité transformée
//   Definition = un instantané versionné des termes d'un namespace
//   Chaîne     = les versions adjacentes parcourues pour une migration
//   Taxonomie  = le schéma canonique interne commun à tous les namespaces
//
// =============================================================================

pub mod core;
pub mod filter;
pub mod definitions;
pub mod config;
