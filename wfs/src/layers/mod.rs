//! Lecture des couches vectorielles (WFS GetFeature → GeoJSON)

pub mod cache;

use std::collections::HashMap;

use futures::future::join_all;
use geojson::FeatureCollection;
use tracing::{debug, info, warn};

use crate::endpoint::Endpoint;
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::WfsError;

pub use cache::LayerCache;

/// Client de lecture des couches
#[derive(Debug, Clone)]
pub struct LayerClient<T = ReqwestTransport> {
    endpoint: Endpoint,
    transport: T,
}

impl LayerClient<ReqwestTransport> {
    /// Crée un client avec le transport reqwest par défaut
    pub fn new(endpoint: Endpoint) -> Self {
        Self::with_transport(endpoint, ReqwestTransport::new())
    }
}

impl<T: HttpTransport> LayerClient<T> {
    pub fn with_transport(endpoint: Endpoint, transport: T) -> Self {
        Self {
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Récupère une couche par son nom de type serveur
    ///
    /// La collection est retournée telle que reçue. Toute défaillance (statut
    /// non-200, timeout, réseau, corps illisible) donne
    /// [`WfsError::LayerUnavailable`] portant le nom de la couche. Aucun retry.
    pub async fn fetch_layer(&self, layer_name: &str) -> Result<FeatureCollection, WfsError> {
        let url = self
            .endpoint
            .get_feature_url(layer_name)
            .map_err(|e| WfsError::layer_unavailable(layer_name, e.to_string()))?;

        let response = self
            .transport
            .get(&url, self.endpoint.read_timeout)
            .await
            .map_err(|e| WfsError::layer_unavailable(layer_name, e.to_string()))?;

        if response.status != 200 {
            return Err(WfsError::layer_unavailable(
                layer_name,
                format!("HTTP {}", response.status),
            ));
        }

        let collection: FeatureCollection = serde_json::from_slice(&response.body).map_err(|e| {
            WfsError::layer_unavailable(layer_name, format!("malformed body: {}", e))
        })?;

        debug!(
            layer = layer_name,
            features = collection.features.len(),
            "Layer fetched"
        );
        Ok(collection)
    }

    /// Récupère plusieurs couches en parallèle (best effort)
    ///
    /// Chaque couche est indépendante: un échec est journalisé et la clé est
    /// simplement absente du résultat.
    pub async fn fetch_layers(&self, names: &[&str]) -> HashMap<String, FeatureCollection> {
        self.fetch_layers_detailed(names).await.layers
    }

    /// Comme [`fetch_layers`](Self::fetch_layers), en conservant les erreurs
    pub async fn fetch_layers_detailed(&self, names: &[&str]) -> BatchFetch {
        let results = join_all(names.iter().map(|name| async move {
            (name.to_string(), self.fetch_layer(name).await)
        }))
        .await;

        let mut batch = BatchFetch {
            layers: HashMap::with_capacity(results.len()),
            failures: Vec::new(),
        };
        for (name, result) in results {
            match result {
                Ok(collection) => {
                    batch.layers.insert(name, collection);
                }
                Err(e) => {
                    warn!(layer = %name, error = %e, "Layer skipped");
                    batch.failures.push(e);
                }
            }
        }

        info!(
            requested = names.len(),
            loaded = batch.layers.len(),
            "Batch layer fetch settled"
        );
        batch
    }
}

/// Résultat d'un chargement groupé
#[derive(Debug, Default)]
pub struct BatchFetch {
    /// Couches reçues, par nom de type
    pub layers: HashMap<String, FeatureCollection>,
    /// Échecs, chacun portant le nom de sa couche
    pub failures: Vec<WfsError>,
}

impl BatchFetch {
    /// Raison de l'échec d'une couche, si elle a échoué
    pub fn failure(&self, layer: &str) -> Option<&WfsError> {
        self.failures.iter().find(|e| e.layer() == Some(layer))
    }
}
