//! Export vers GeoJSON
//!
//! Les collections sont écrites telles que reçues du serveur, une par fichier
//! `{couche}.geojson`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use ::geojson::FeatureCollection;
use anyhow::{Context, Result};
use tracing::debug;

/// Écrit une collection dans un fichier GeoJSON
pub fn export_layer(collection: &FeatureCollection, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer(&mut writer, collection)
        .context(format!("Failed to write {}", output_path.display()))?;
    writer.flush()?;

    debug!(
        path = %output_path.display(),
        features = collection.features.len(),
        "Layer exported"
    );
    Ok(())
}

/// Écrit chaque couche dans `output_dir`, créé si besoin
///
/// Retourne les chemins écrits, triés par nom de couche.
pub fn export_layers(
    layers: &HashMap<String, FeatureCollection>,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)
        .context(format!("Failed to create directory: {}", output_dir.display()))?;

    let mut names: Vec<_> = layers.keys().collect();
    names.sort();

    let mut written = Vec::with_capacity(names.len());
    for name in names {
        let path = output_dir.join(format!("{}.geojson", name));
        export_layer(&layers[name], &path)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(json: &str) -> FeatureCollection {
        json.parse::<::geojson::GeoJson>()
            .unwrap()
            .try_into()
            .unwrap()
    }

    #[test]
    fn test_export_layer_keeps_properties() {
        let fc = collection(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","geometry":{"type":"Point","coordinates":[-74.1,4.6]},
                 "properties":{"cod_emt":"E1","nom_emt":"Station 1"}}]}"#,
        );
        let path = std::env::temp_dir()
            .join(format!("geovisor_export_layer_{}.geojson", std::process::id()));

        export_layer(&fc, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let back = collection(&content);
        assert_eq!(back.features.len(), 1);
        assert_eq!(
            back.features[0].property("nom_emt").and_then(|v| v.as_str()),
            Some("Station 1")
        );

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_export_layers_names_files() {
        let empty = collection(r#"{"type":"FeatureCollection","features":[]}"#);
        let mut layers = HashMap::new();
        layers.insert("municipio".to_string(), empty.clone());
        layers.insert("departamento".to_string(), empty);

        let dir = std::env::temp_dir()
            .join(format!("geovisor_export_layers_{}", std::process::id()));
        let written = export_layers(&layers, &dir).unwrap();

        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["departamento.geojson", "municipio.geojson"]);
        assert!(written.iter().all(|p| p.exists()));

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_export_layer_bad_path() {
        let fc = collection(r#"{"type":"FeatureCollection","features":[]}"#);
        let path = Path::new("/nonexistent-dir/geovisor/out.geojson");
        assert!(export_layer(&fc, path).is_err());
    }
}
