//! Test de contención punto-en-polígono
//!
//! Ray casting hacia longitudes crecientes: el punto está dentro si el rayo
//! cruza el borde un número impar de veces.
//!
//! La regla de bordes es la que usan los datos históricos y no se debe
//! "corregir": una arista (p1, p2) es candidata solo si
//! `min(lon) < lon <= max(lon)`, `lat <= max(lat)` y la arista no es
//! vertical en longitud; entre candidatas se alterna el flag si la arista es
//! horizontal en latitud o si `lat <= latitud_de_cruce`. Un punto justo sobre
//! el borde sale de esta fórmula, no de una regla general de "frontera".
//!
//! Las entradas degeneradas no se protegen: un polígono vacío no tiene aristas
//! (fuera), uno de un solo punto solo tiene una arista de longitud cero
//! (fuera). El polígono se usa tal cual; la arista de cierre sale de indexar
//! módulo el número de vértices, nunca de cerrar el anillo.

use crate::models::LatLon;

pub fn contains(point: LatLon, polygon: &[LatLon]) -> bool {
    let Some(&first) = polygon.first() else {
        return false;
    };
    let n = polygon.len();
    let (lat, lon) = (point.latitude, point.longitude);

    let mut inside = false;
    let mut p1 = first;
    for i in 1..=n {
        let p2 = polygon[i % n];
        if lon > p1.longitude.min(p2.longitude)
            && lon <= p1.longitude.max(p2.longitude)
            && lat <= p1.latitude.max(p2.latitude)
            && p1.longitude != p2.longitude
        {
            let crossing = (lon - p1.longitude) * (p2.latitude - p1.latitude) / (p2.longitude - p1.longitude)
                + p1.latitude;
            if p1.latitude == p2.latitude || lat <= crossing {
                inside = !inside;
            }
        }
        p1 = p2;
    }

    inside
}
