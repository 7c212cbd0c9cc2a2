// =============================================================================
// CORE — Le cœur du moteur de transformation de schémas versionnés
// =============================================================================
//
// Ce module regroupe toute la logique pure sur des ensembles de Pairs :
// pas de filtre ni de réseau : uniquement des termes, des versions et
// des transformations par terme.
//
// Architecture :
//   typeside   → les types primitifs et les valeurs scalaires
//   pair       → (nom de champ, valeur), l'unité transformée
//   validate   → les validateurs de valeurs (longueur, plage, énuméré, regex)
//   term       → un champ nommé, typé, avec un validateur optionnel
//   transform  → les fonctions nommées Pair → {Pairs}, rangées par terme
//   definition → un instantané versionné des termes d'un namespace
//   taxonomy   → dernière version d'un namespace ↔ taxonomie canonique
//   registry   → l'état partagé (définitions, transformateurs, préférences)
//   migrate    → la chaîne de versions et la correspondance canonique
//   negotiate  → le choix namespace:version avec une source distante
//   error      → les erreurs de configuration
//
// =============================================================================

pub mod error;
pub mod typeside;
pub mod pair;
pub mod validate;
pub mod term;
pub mod transform;
pub mod definition;
pub mod taxonomy;
pub mod registry;
pub mod migrate;
pub mod negotiate;
