//! Chargement séquentiel des couches actives dans le cache
//!
//! Les couches sont demandées une par une, dans l'ordre de rendu. Le premier
//! échec interrompt la passe; les couches déjà reçues restent en cache.

use tracing::{info, warn};
use wfs::{HttpTransport, LayerCache, LayerClient, LayerId, WfsError};

/// Résultat d'une passe de chargement
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Couches chargées pendant cette passe
    pub loaded: Vec<LayerId>,
    /// Couches non demandées après l'échec
    pub skipped: Vec<LayerId>,
    /// Couches polygonales chargées, utilisables comme filtre
    pub filterable: Vec<LayerId>,
    /// Échec ayant interrompu la passe
    pub error: Option<WfsError>,
}

impl LoadOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Message affichable en cas d'échec
    pub fn user_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| {
            format!(
                "Some layers could not be loaded ({}). Try reloading.",
                e.layer().unwrap_or("unknown layer")
            )
        })
    }
}

/// Charge les couches actives absentes du cache
pub async fn sync_layers<T: HttpTransport>(
    client: &LayerClient<T>,
    cache: &mut LayerCache,
    active: &[LayerId],
) -> LoadOutcome {
    let mut outcome = LoadOutcome::default();
    let pending = cache.missing(active.iter().copied());

    if pending.is_empty() {
        return outcome;
    }

    info!(layers = pending.len(), "Loading layers");

    let mut pending = pending.into_iter();
    while let Some(layer) = pending.next() {
        match client.fetch_layer(layer.type_name()).await {
            Ok(collection) => {
                cache.insert(layer, collection);
                outcome.loaded.push(layer);
            }
            Err(e) => {
                warn!(layer = %layer, error = %e, "Layer load failed, stopping");
                outcome.error = Some(e);
                outcome.skipped = pending.collect();
                break;
            }
        }
    }

    outcome.filterable = LayerId::THEMATIC
        .into_iter()
        .filter(|layer| outcome.loaded.contains(layer))
        .collect();

    outcome
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use wfs::{Credentials, Endpoint, HttpResponse, TransportError, Url};

    use super::*;
    use crate::viewer::{Viewer, ViewerState};

    const EMPTY: &str = r#"{"type":"FeatureCollection","features":[]}"#;
    const STATIONS: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","geometry":{"type":"Point","coordinates":[-75.5,6.2]},
         "properties":{"cod_emt":"27015330","nom_emt":"OLAYA HERRERA - MEDELLIN"}}]}"#;

    /// Transport de test: liste de types en échec, journal des types demandés
    #[derive(Default)]
    struct StubTransport {
        failing: Vec<&'static str>,
        requested: Mutex<Vec<String>>,
    }

    impl StubTransport {
        fn failing(types: &[&'static str]) -> Self {
            Self {
                failing: types.to_vec(),
                ..Default::default()
            }
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl HttpTransport for StubTransport {
        async fn get(
            &self,
            url: &Url,
            _timeout: Duration,
        ) -> Result<HttpResponse, TransportError> {
            let type_name = url
                .query_pairs()
                .find(|(k, _)| k == "typeName")
                .map(|(_, v)| v.rsplit(':').next().unwrap_or_default().to_string())
                .unwrap_or_default();
            self.requested.lock().unwrap().push(type_name.clone());

            if self.failing.contains(&type_name.as_str()) {
                return Err(TransportError::Timeout);
            }
            let body = if type_name == "estacion" { STATIONS } else { EMPTY };
            Ok(HttpResponse::new(200, body))
        }

        async fn post_xml(
            &self,
            _url: &Url,
            _body: String,
            _credentials: &Credentials,
            _timeout: Duration,
        ) -> Result<HttpResponse, TransportError> {
            Ok(HttpResponse::new(405, ""))
        }
    }

    fn client(transport: StubTransport) -> LayerClient<StubTransport> {
        LayerClient::with_transport(Endpoint::new("http://geo.test/geoserver", "ws"), transport)
    }

    #[tokio::test]
    async fn test_sync_loads_missing_layers_once() {
        let client = client(StubTransport::default());
        let mut cache = LayerCache::new();
        let active = [LayerId::Departments, LayerId::Stations];

        let first = sync_layers(&client, &mut cache, &active).await;
        assert!(first.is_ok());
        assert_eq!(first.loaded, active.to_vec());
        assert_eq!(first.filterable, vec![LayerId::Departments]);

        let second = sync_layers(&client, &mut cache, &active).await;
        assert!(second.loaded.is_empty());
        assert_eq!(client_requested(&client), vec!["departamento", "estacion"]);
    }

    fn client_requested(client: &LayerClient<StubTransport>) -> Vec<String> {
        client.transport().requested()
    }

    #[tokio::test]
    async fn test_sync_stops_at_first_failure() {
        let client = client(StubTransport::failing(&["municipio"]));
        let mut cache = LayerCache::new();
        let active = [
            LayerId::Departments,
            LayerId::Municipalities,
            LayerId::Stations,
        ];

        let outcome = sync_layers(&client, &mut cache, &active).await;
        assert_eq!(outcome.loaded, vec![LayerId::Departments]);
        assert_eq!(outcome.skipped, vec![LayerId::Stations]);
        assert_eq!(
            outcome.error.as_ref().and_then(|e| e.layer()),
            Some("municipio")
        );
        assert!(outcome.user_message().unwrap().contains("municipio"));

        assert!(cache.contains(LayerId::Departments));
        assert!(!cache.contains(LayerId::Stations));
    }

    #[tokio::test]
    async fn test_viewer_refresh_and_invalidate() {
        let client = client(StubTransport::default());
        let mut viewer = Viewer::new(ViewerState::default());

        let outcome = viewer.refresh(&client).await;
        assert_eq!(outcome.loaded.len(), 2);
        assert_eq!(viewer.visible_layers().len(), 2);

        let found = viewer.find_station("olaya herrera medellin").unwrap();
        assert_eq!(
            found.property("cod_emt").and_then(|v| v.as_str()),
            Some("27015330")
        );

        assert!(viewer.invalidate(LayerId::Stations));
        assert!(viewer.find_station("olaya").is_none());

        let outcome = viewer.refresh(&client).await;
        assert_eq!(outcome.loaded, vec![LayerId::Stations]);
        assert_eq!(client_requested(&client).len(), 3);
    }

    #[tokio::test]
    async fn test_hidden_layers_not_visible() {
        let client = client(StubTransport::default());
        let mut viewer = Viewer::new(ViewerState::default());
        viewer.refresh(&client).await;

        viewer.state.toggle("departamentos");
        let visible: Vec<_> = viewer.visible_layers().into_iter().map(|(l, _, _)| l).collect();
        assert_eq!(visible, vec![LayerId::Stations]);
        // La couche reste en cache
        assert!(viewer.cache().contains(LayerId::Departments));
    }
}
