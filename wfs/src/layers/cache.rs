//! Cache des couches déjà chargées
//!
//! Valeur explicite détenue par l'appelant: une couche chargée reste en cache
//! jusqu'à `invalidate` ou `clear`. Aucune déduplication des requêtes en vol.

use std::collections::BTreeMap;

use geojson::FeatureCollection;

use crate::types::LayerId;

#[derive(Debug, Clone, Default)]
pub struct LayerCache {
    layers: BTreeMap<LayerId, FeatureCollection>,
}

impl LayerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, layer: LayerId) -> Option<&FeatureCollection> {
        self.layers.get(&layer)
    }

    pub fn contains(&self, layer: LayerId) -> bool {
        self.layers.contains_key(&layer)
    }

    /// Stocke une couche; retourne l'ancienne valeur si elle existait
    pub fn insert(
        &mut self,
        layer: LayerId,
        collection: FeatureCollection,
    ) -> Option<FeatureCollection> {
        self.layers.insert(layer, collection)
    }

    /// Couches actives absentes du cache, dans l'ordre donné
    pub fn missing<I>(&self, active: I) -> Vec<LayerId>
    where
        I: IntoIterator<Item = LayerId>,
    {
        let mut missing = Vec::new();
        for layer in active {
            if !self.contains(layer) && !missing.contains(&layer) {
                missing.push(layer);
            }
        }
        missing
    }

    /// Retire une couche pour forcer son rechargement
    pub fn invalidate(&mut self, layer: LayerId) -> bool {
        self.layers.remove(&layer).is_some()
    }

    pub fn clear(&mut self) {
        self.layers.clear();
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Couches présentes, dans l'ordre de rendu
    pub fn layers(&self) -> impl Iterator<Item = (LayerId, &FeatureCollection)> {
        self.layers.iter().map(|(layer, fc)| (*layer, fc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_collection() -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: Vec::new(),
            foreign_members: None,
        }
    }

    #[test]
    fn test_insert_and_get() {
        let mut cache = LayerCache::new();
        assert!(cache.is_empty());

        assert!(cache.insert(LayerId::Departments, empty_collection()).is_none());
        assert!(cache.contains(LayerId::Departments));
        assert!(cache.get(LayerId::Stations).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_missing_preserves_order_and_dedups() {
        let mut cache = LayerCache::new();
        cache.insert(LayerId::Municipalities, empty_collection());

        let missing = cache.missing([
            LayerId::Stations,
            LayerId::Municipalities,
            LayerId::Departments,
            LayerId::Stations,
        ]);
        assert_eq!(missing, vec![LayerId::Stations, LayerId::Departments]);
    }

    #[test]
    fn test_invalidate() {
        let mut cache = LayerCache::new();
        cache.insert(LayerId::Villages, empty_collection());

        assert!(cache.invalidate(LayerId::Villages));
        assert!(!cache.invalidate(LayerId::Villages));
        assert_eq!(cache.missing([LayerId::Villages]), vec![LayerId::Villages]);
    }

    #[test]
    fn test_layers_in_render_order() {
        let mut cache = LayerCache::new();
        cache.insert(LayerId::Stations, empty_collection());
        cache.insert(LayerId::Departments, empty_collection());
        cache.insert(LayerId::Villages, empty_collection());

        let order: Vec<_> = cache.layers().map(|(layer, _)| layer).collect();
        assert_eq!(
            order,
            vec![LayerId::Departments, LayerId::Villages, LayerId::Stations]
        );

        cache.clear();
        assert!(cache.is_empty());
    }
}
