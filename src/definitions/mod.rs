// =============================================================================
// DEFINITIONS — Les définitions livrées avec le moteur
// =============================================================================
//
//   ddf → namespace `cst:ddf`, version 1, et sa correspondance canonique
//
// =============================================================================

pub mod ddf;
