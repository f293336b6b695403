//! Sérialisation du document WFS-T (Insert)

use std::fmt::Write;

use chrono::{DateTime, SecondsFormat, Utc};

use super::validate::ValidatedRegistration;
use crate::endpoint::Endpoint;

/// Échappe les caractères spéciaux XML (`& < > " '`)
pub fn escape_xml(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&apos;"),
            c => result.push(c),
        }
    }
    result
}

/// Construit la transaction d'insertion d'une inscription
///
/// Le point est écrit en `longitude latitude` dans EPSG:4326.
pub fn build_insert(
    endpoint: &Endpoint,
    registration: &ValidatedRegistration,
    submitted_at: DateTime<Utc>,
) -> String {
    let ws = &endpoint.workspace;
    let layer = &endpoint.layer_name;
    let mut xml = String::with_capacity(1024);

    // write! sur une String ne peut pas échouer
    let _ = write!(
        xml,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<wfs:Transaction xmlns:wfs="http://www.opengis.net/wfs"
                 xmlns:gml="http://www.opengis.net/gml"
                 xmlns:{ws}="{namespace}"
                 xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
                 version="1.1.0"
                 service="WFS">
  <wfs:Insert>
    <{ws}:{layer}>
      <{ws}:nombre>{first_name}</{ws}:nombre>
      <{ws}:apellido>{last_name}</{ws}:apellido>
      <{ws}:correo>{email}</{ws}:correo>
      <{ws}:estacion_id>{station_id}</{ws}:estacion_id>
      <{ws}:estacion_nombre>{station_name}</{ws}:estacion_nombre>
      <{ws}:fecha_registro>{timestamp}</{ws}:fecha_registro>
      <{ws}:geom>
        <gml:Point srsName="EPSG:4326">
          <gml:pos>{lon} {lat}</gml:pos>
        </gml:Point>
      </{ws}:geom>
    </{ws}:{layer}>
  </wfs:Insert>
</wfs:Transaction>"#,
        namespace = escape_xml(&endpoint.namespace_uri),
        first_name = escape_xml(&registration.first_name),
        last_name = escape_xml(&registration.last_name),
        email = escape_xml(&registration.email),
        station_id = escape_xml(&registration.station_id),
        station_name = escape_xml(&registration.station_name),
        timestamp = submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        lon = registration.location.x(),
        lat = registration.location.y(),
    );
    xml
}
