use std::collections::HashSet;

use models::{Entity, EntityKind};
use serde_json::{Map, Value};
use tracing::debug;

use super::{parse_object, sorted, ResourceService};
use crate::errors::ServiceError;

/// Filters accepted by [`ResourceService::search_places`].
#[derive(Debug, Default, PartialEq)]
pub struct PlaceFilter {
    pub states: Vec<String>,
    pub cities: Vec<String>,
    pub amenities: Vec<String>,
}

impl PlaceFilter {
    pub fn from_body(body: &[u8]) -> Result<Self, ServiceError> {
        let payload = parse_object(body)?;
        Ok(Self {
            states: id_list(&payload, "states")?,
            cities: id_list(&payload, "cities")?,
            amenities: id_list(&payload, "amenities")?,
        })
    }
}

fn id_list(payload: &Map<String, Value>, key: &str) -> Result<Vec<String>, ServiceError> {
    match payload.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|_| ServiceError::Validation(key.to_string())),
    }
}

impl ResourceService {
    /// Places matching a JSON filter body.
    ///
    /// Without `states` and `cities` every place is a candidate; otherwise
    /// the candidates are the places in the listed cities plus those in
    /// any city of the listed states. A non-empty `amenities` list keeps
    /// only candidates linked to all of them.
    pub async fn search_places(&self, body: &[u8]) -> Result<Vec<Entity>, ServiceError> {
        let filter = PlaceFilter::from_body(body)?;
        let places = self.storage.all(Some(EntityKind::Place)).await;

        let unrestricted = filter.states.is_empty() && filter.cities.is_empty();
        let cities: Option<HashSet<String>> = if unrestricted {
            None
        } else {
            let mut ids: HashSet<String> = filter.cities.iter().cloned().collect();
            ids.extend(
                self.storage
                    .all(Some(EntityKind::City))
                    .await
                    .into_values()
                    .filter(|c| {
                        c.relation("state_id")
                            .is_some_and(|s| filter.states.iter().any(|id| id == s))
                    })
                    .map(|c| c.id().to_string()),
            );
            Some(ids)
        };

        let matches: Vec<Entity> = places
            .into_values()
            .filter(|e| {
                let Some(place) = e.as_place() else { return false };
                let in_area = cities.as_ref().map_or(true, |ids| ids.contains(&place.city_id));
                in_area && filter.amenities.iter().all(|a| place.has_amenity(a))
            })
            .collect();
        debug!(?filter, results = matches.len(), "places_search");
        Ok(sorted(matches))
    }
}
