//! Turning command-line place arguments into coordinates.

use std::time::Duration;

use log::info;
use trafficway_core::{GeoPoint, Geocoder, PlaceCandidate};
use trafficway_planner::{GeoResolver, ResolverConfig};

use crate::CliError;

/// Resolver for one-shot lookups; there is no typing to debounce.
pub(crate) fn one_shot_resolver<G: Geocoder>(geocoder: G) -> GeoResolver<G> {
    let config = ResolverConfig::default().with_debounce(Duration::ZERO);
    GeoResolver::with_config(geocoder, config)
}

pub(crate) async fn candidates<G: Geocoder>(
    resolver: &GeoResolver<G>,
    query: &str,
) -> Vec<PlaceCandidate> {
    resolver
        .resolve(query)
        .await
        .into_candidates()
        .unwrap_or_default()
}

/// Read `text` as `lat,lon` or look it up as a place name.
///
/// Coordinates are returned unvalidated so the planner can explain an
/// out-of-range endpoint in its rationale.
pub(crate) async fn resolve_endpoint<G: Geocoder>(
    resolver: &GeoResolver<G>,
    field: &'static str,
    text: &str,
) -> Result<GeoPoint, CliError> {
    if let Some(point) = coordinates(text) {
        return Ok(point);
    }
    let best = candidates(resolver, text).await.into_iter().next();
    let Some(place) = best else {
        return Err(CliError::UnknownPlace {
            field,
            query: text.to_owned(),
        });
    };
    info!("{field} {text:?} resolved to {}", place.display_name);
    Ok(place.point)
}

fn coordinates(text: &str) -> Option<GeoPoint> {
    let (lat, lon) = text.split_once(',')?;
    Some(GeoPoint {
        latitude: lat.trim().parse().ok()?,
        longitude: lon.trim().parse().ok()?,
    })
}
