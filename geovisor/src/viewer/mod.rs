//! État du visualiseur: fonds de carte, couches actives, opacités
//!
//! Le chargement des couches actives est délégué à [`loader`].

pub mod loader;

use std::collections::{BTreeMap, BTreeSet};

use geojson::{Feature, FeatureCollection};
use tracing::debug;
use wfs::{HttpTransport, LayerCache, LayerClient, LayerId};

use crate::config::ViewerConfig;
pub use loader::{sync_layers, LoadOutcome};

/// Fond de carte (exclusif)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BaseLayer {
    #[default]
    Osm,
    GoogleSatellite,
}

impl BaseLayer {
    pub fn key(self) -> &'static str {
        match self {
            BaseLayer::Osm => "osm",
            BaseLayer::GoogleSatellite => "googleSatellite",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "osm" => Some(BaseLayer::Osm),
            "googleSatellite" => Some(BaseLayer::GoogleSatellite),
            _ => None,
        }
    }
}

/// Couches affichées et leurs opacités
#[derive(Debug, Clone)]
pub struct ViewerState {
    base: BaseLayer,
    active: BTreeSet<LayerId>,
    opacity: BTreeMap<LayerId, f64>,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

impl ViewerState {
    pub fn from_config(config: &ViewerConfig) -> Self {
        let mut state = Self {
            base: BaseLayer::default(),
            active: BTreeSet::new(),
            opacity: BTreeMap::new(),
        };

        for key in &config.active {
            if let Some(base) = BaseLayer::from_key(key) {
                state.base = base;
            } else if let Some(layer) = LayerId::from_key(key) {
                state.active.insert(layer);
            }
        }
        for (layer, value) in &config.opacity {
            state.set_opacity(*layer, *value);
        }
        state
    }

    pub fn base(&self) -> BaseLayer {
        self.base
    }

    /// Bascule une clé du visualiseur
    ///
    /// Les fonds de carte sont exclusifs: activer l'un désactive l'autre, et
    /// re-sélectionner le fond courant ne change rien. Retourne `false` pour
    /// une clé inconnue.
    pub fn toggle(&mut self, key: &str) -> bool {
        if let Some(base) = BaseLayer::from_key(key) {
            self.base = base;
            return true;
        }

        match LayerId::from_key(key) {
            Some(layer) => {
                if !self.active.remove(&layer) {
                    self.active.insert(layer);
                }
                debug!(layer = %layer, active = self.active.contains(&layer), "Layer toggled");
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, key: &str) -> bool {
        if let Some(base) = BaseLayer::from_key(key) {
            return self.base == base;
        }
        LayerId::from_key(key).is_some_and(|layer| self.active.contains(&layer))
    }

    /// Couches actives dans l'ordre de rendu
    pub fn active_layers(&self) -> Vec<LayerId> {
        self.active.iter().copied().collect()
    }

    /// Opacité d'une couche (0.6 par défaut, 1.0 pour les stations)
    pub fn opacity(&self, layer: LayerId) -> f64 {
        self.opacity
            .get(&layer)
            .copied()
            .unwrap_or(if layer.is_thematic() { 0.6 } else { 1.0 })
    }

    /// Fixe l'opacité, bornée à [0, 1]; une valeur non numérique est ignorée
    pub fn set_opacity(&mut self, layer: LayerId, value: f64) {
        if value.is_nan() {
            return;
        }
        self.opacity.insert(layer, value.clamp(0.0, 1.0));
    }
}

/// Session du visualiseur: état + cache des couches chargées
#[derive(Debug, Default)]
pub struct Viewer {
    pub state: ViewerState,
    cache: LayerCache,
}

impl Viewer {
    pub fn new(state: ViewerState) -> Self {
        Self {
            state,
            cache: LayerCache::new(),
        }
    }

    pub fn cache(&self) -> &LayerCache {
        &self.cache
    }

    /// Charge les couches actives absentes du cache
    pub async fn refresh<T: HttpTransport>(&mut self, client: &LayerClient<T>) -> LoadOutcome {
        let active = self.state.active_layers();
        sync_layers(client, &mut self.cache, &active).await
    }

    /// Force le rechargement d'une couche au prochain `refresh`
    pub fn invalidate(&mut self, layer: LayerId) -> bool {
        self.cache.invalidate(layer)
    }

    /// Couches actives et chargées, dans l'ordre de rendu, avec leur opacité
    pub fn visible_layers(&self) -> Vec<(LayerId, &FeatureCollection, f64)> {
        self.state
            .active_layers()
            .into_iter()
            .filter_map(|layer| {
                self.cache
                    .get(layer)
                    .map(|fc| (layer, fc, self.state.opacity(layer)))
            })
            .collect()
    }

    /// Recherche une station parmi la couche chargée
    pub fn find_station(&self, term: &str) -> Option<&Feature> {
        let stations = self.cache.get(LayerId::Stations)?;
        wfs::find_station(stations, term)
    }
}
