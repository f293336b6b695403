//! Types d'erreurs pour le crate wfs

use thiserror::Error;

/// Erreurs pouvant survenir lors d'un échange avec GeoServer
#[derive(Debug, Error)]
pub enum WfsError {
    /// Couche indisponible (statut non-200, timeout, réseau, corps invalide)
    #[error("Layer {layer} could not be loaded: {reason}")]
    LayerUnavailable { layer: String, reason: String },

    /// Données d'inscription rejetées avant tout appel réseau
    #[error("Invalid registration: {0}")]
    Registration(#[from] RegistrationError),

    /// GeoServer a répondu avec un statut HTTP d'échec
    #[error("GeoServer responded with status {status}")]
    TransactionStatus { status: u16 },

    /// Échec transport lors d'une transaction
    #[error("Transaction request failed: {0}")]
    Transport(#[from] TransportError),

    /// URL d'endpoint invalide
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl WfsError {
    /// Crée une erreur de couche indisponible avec contexte
    pub fn layer_unavailable(layer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LayerUnavailable {
            layer: layer.into(),
            reason: reason.into(),
        }
    }

    /// Nom de la couche concernée, si l'erreur porte sur une couche
    pub fn layer(&self) -> Option<&str> {
        match self {
            Self::LayerUnavailable { layer, .. } => Some(layer),
            _ => None,
        }
    }
}

/// Erreurs de validation d'une inscription (toujours corrigeables par l'utilisateur)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Utilisateur ou station absent
    #[error("incomplete input data: missing {0}")]
    MissingSection(&'static str),

    /// Champ obligatoire vide après trim
    #[error("first name, last name and email are required (missing {0})")]
    MissingField(&'static str),

    /// Format d'email invalide
    #[error("invalid email format: {0}")]
    InvalidEmail(String),

    /// Coordonnées de la station non numériques
    #[error("invalid station coordinates ({field}: {value:?})")]
    InvalidCoordinate { field: &'static str, value: String },
}

/// Erreurs de la couche transport HTTP
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Délai d'attente dépassé
    #[error("request timed out")]
    Timeout,

    /// Erreur réseau (connexion refusée, DNS, lecture du corps…)
    #[error("network error: {0}")]
    Network(String),
}
