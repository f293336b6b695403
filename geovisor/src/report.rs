//! Rapport de chargement des couches
//!
//! Collecte les couches reçues et les échecs d'une passe de chargement, puis
//! les affiche ou les sauvegarde en JSON.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use geojson::FeatureCollection;
use serde::Serialize;

/// Statut global du chargement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    /// Toutes les couches demandées ont été reçues
    Success,
    /// Une partie des couches a été reçue
    PartialSuccess,
    /// Aucune couche reçue
    Failed,
}

/// Statistiques d'une couche reçue
#[derive(Debug, Clone, Default, Serialize)]
pub struct LayerStats {
    pub features: usize,
    /// Fichier GeoJSON écrit (optionnel)
    pub exported_to: Option<String>,
}

/// Échec de chargement d'une couche
#[derive(Debug, Clone, Serialize)]
pub struct LayerFailure {
    pub layer: String,
    pub message: String,
}

/// Rapport complet de chargement
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Workspace interrogé
    pub workspace: String,
    pub duration_secs: f64,
    pub status: LoadStatus,

    /// Nombre de couches demandées
    pub layers_requested: usize,
    /// Nombre total d'entités reçues
    pub features_total: usize,

    pub by_layer: BTreeMap<String, LayerStats>,
    pub failures: Vec<LayerFailure>,
}

impl Default for LoadReport {
    fn default() -> Self {
        Self {
            workspace: String::new(),
            duration_secs: 0.0,
            status: LoadStatus::Success,
            layers_requested: 0,
            features_total: 0,
            by_layer: BTreeMap::new(),
            failures: Vec::new(),
        }
    }
}

impl LoadReport {
    pub fn new(workspace: &str) -> Self {
        Self {
            workspace: workspace.to_string(),
            ..Default::default()
        }
    }

    /// Enregistre une couche reçue
    pub fn record_loaded(&mut self, layer: &str, collection: &FeatureCollection) {
        self.layers_requested += 1;
        self.features_total += collection.features.len();
        self.by_layer.entry(layer.to_string()).or_default().features = collection.features.len();
    }

    /// Enregistre une couche en échec
    pub fn record_failure(&mut self, layer: &str, message: &str) {
        self.layers_requested += 1;
        self.failures.push(LayerFailure {
            layer: layer.to_string(),
            message: message.to_string(),
        });
    }

    /// Associe un fichier exporté à une couche reçue
    pub fn record_export(&mut self, layer: &str, path: &Path) {
        if let Some(stats) = self.by_layer.get_mut(layer) {
            stats.exported_to = Some(path.display().to_string());
        }
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let has_failures = !self.failures.is_empty();
        let has_success = !self.by_layer.is_empty();

        self.status = match (has_failures, has_success) {
            (false, _) => LoadStatus::Success,
            (true, true) => LoadStatus::PartialSuccess,
            (true, false) => LoadStatus::Failed,
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("LOAD REPORT - Workspace {}", self.workspace);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Layers: {} requested, {} loaded, {} failed",
            self.layers_requested,
            self.by_layer.len(),
            self.failures.len()
        );
        println!("Features: {}", self.features_total);

        if !self.by_layer.is_empty() {
            println!("\n--- BY LAYER ---");
            for (layer, stats) in &self.by_layer {
                match &stats.exported_to {
                    Some(path) => println!("  {}: {} features -> {}", layer, stats.features, path),
                    None => println!("  {}: {} features", layer, stats.features),
                }
            }
        }

        if !self.failures.is_empty() {
            println!("\n--- FAILURES ({}) ---", self.failures.len());
            for f in &self.failures {
                println!("  [{}] {}", f.layer, f.message);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .context(format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} layers loaded, {} features, {} failures",
            self.workspace,
            self.by_layer.len(),
            self.features_total,
            self.failures.len()
        )
    }
}
