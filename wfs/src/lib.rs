//! # wfs
//!
//! Client GeoServer pour un visualiseur cartographique: lecture de couches
//! vectorielles (WFS GetFeature, GeoJSON) et inscription d'utilisateurs sur
//! des stations (WFS-T Insert).
//!
//! ## Features
//!
//! - Lecture d'une couche ou de plusieurs en parallèle (best effort)
//! - Cache explicite des couches chargées, avec invalidation
//! - Validation locale des inscriptions avant tout appel réseau
//! - Classement des réponses de transaction (exception / insertion / non confirmé)
//! - Recherche de station par nom (insensible à la casse et aux tirets)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wfs::{Endpoint, LayerClient, LayerId};
//!
//! let endpoint = Endpoint::new("http://localhost:8080/geoserver", "proyecto_lineab");
//! let client = LayerClient::new(endpoint);
//!
//! let departments = client.fetch_layer(LayerId::Departments.type_name()).await?;
//! println!("{} départements", departments.features.len());
//! ```

pub mod endpoint;
pub mod error;
pub mod layers;
pub mod search;
pub mod transaction;
pub mod transport;
pub mod types;

pub use endpoint::{Endpoint, DEFAULT_READ_TIMEOUT, DEFAULT_WRITE_TIMEOUT};
pub use error::{RegistrationError, TransportError, WfsError};
pub use layers::{BatchFetch, LayerCache, LayerClient};
pub use search::{filter_stations, find_station};
pub use transaction::{ReplyStatus, TransactionClient};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{
    Credentials, LayerId, RawCoordinate, Registrant, RegistrationForm, RegistrationOutcome,
    StationTarget,
};
pub use url::Url;

/// Résout des clés du visualiseur vers les couches connues
///
/// Les clés absentes de la table (fonds de carte, fautes de frappe) sont
/// ignorées sans erreur. Les doublons sont conservés une seule fois.
pub fn resolve_layers<'a, I>(keys: I) -> Vec<LayerId>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut layers = Vec::new();
    for key in keys {
        match LayerId::from_key(key) {
            Some(layer) if !layers.contains(&layer) => layers.push(layer),
            Some(_) => {}
            None => tracing::debug!(key, "Key without server layer, skipped"),
        }
    }
    layers
}
