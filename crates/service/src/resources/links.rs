//! Many-to-many links between places and amenities.
//!
//! The link set lives on the place (`amenity_ids`); amenities carry no
//! back-reference.

use std::collections::HashSet;

use chrono::Utc;
use common::metrics::record_mutation;
use models::{Entity, EntityKind};
use tracing::info;

use super::{sorted, ResourceService};
use crate::errors::ServiceError;

impl ResourceService {
    /// Amenities linked to a place. Ids that no longer resolve are skipped.
    pub async fn place_amenities(&self, place_id: &str) -> Result<Vec<Entity>, ServiceError> {
        let place = self.get(EntityKind::Place, place_id).await?;
        let mut amenities = Vec::new();
        for amenity_id in place.as_place().map(|p| p.amenity_ids.as_slice()).unwrap_or_default() {
            if let Some(amenity) = self.storage.get(EntityKind::Amenity, amenity_id).await {
                amenities.push(amenity);
            }
        }
        Ok(sorted(amenities))
    }

    /// Link an amenity to a place. The flag is false when it was already linked.
    pub async fn link_amenity(
        &self,
        place_id: &str,
        amenity_id: &str,
    ) -> Result<(Entity, bool), ServiceError> {
        let place = self.get(EntityKind::Place, place_id).await?;
        let amenity = self.get(EntityKind::Amenity, amenity_id).await?;
        if place.as_place().is_some_and(|p| p.has_amenity(amenity_id)) {
            return Ok((amenity, false));
        }

        let linked = amenity_id.to_string();
        let now = Utc::now();
        self.storage
            .modify(
                EntityKind::Place,
                place_id,
                Box::new(move |e: &mut Entity| {
                    if let Some(place) = e.as_place_mut() {
                        place.link_amenity(&linked);
                    }
                    e.base_mut().touch(now);
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("Place"))?;
        self.storage.save().await?;
        record_mutation(EntityKind::Place.class_name(), "link");
        info!(place_id = %place_id, amenity_id = %amenity_id, "amenity_linked");
        Ok((amenity, true))
    }

    pub async fn unlink_amenity(
        &self,
        place_id: &str,
        amenity_id: &str,
    ) -> Result<(), ServiceError> {
        let place = self.get(EntityKind::Place, place_id).await?;
        self.get(EntityKind::Amenity, amenity_id).await?;
        if !place.as_place().is_some_and(|p| p.has_amenity(amenity_id)) {
            return Err(ServiceError::not_found("amenity link"));
        }

        let unlinked = amenity_id.to_string();
        let now = Utc::now();
        self.storage
            .modify(
                EntityKind::Place,
                place_id,
                Box::new(move |e: &mut Entity| {
                    if let Some(place) = e.as_place_mut() {
                        place.unlink_amenity(&unlinked);
                    }
                    e.base_mut().touch(now);
                    Ok(())
                }),
            )
            .await?
            .ok_or_else(|| ServiceError::not_found("Place"))?;
        self.storage.save().await?;
        record_mutation(EntityKind::Place.class_name(), "unlink");
        info!(place_id = %place_id, amenity_id = %amenity_id, "amenity_unlinked");
        Ok(())
    }

    /// Drop a deleted amenity from every place still linking it, except
    /// places in `skip` (composite keys) that are being deleted anyway.
    pub(super) async fn detach_amenity(
        &self,
        amenity_id: &str,
        skip: &HashSet<String>,
    ) -> Result<(), ServiceError> {
        let linking: Vec<String> = self
            .storage
            .all(Some(EntityKind::Place))
            .await
            .into_iter()
            .filter(|(key, e)| {
                !skip.contains(key) && e.as_place().is_some_and(|p| p.has_amenity(amenity_id))
            })
            .map(|(_, e)| e.id().to_string())
            .collect();
        for place_id in linking {
            let detached = amenity_id.to_string();
            self.storage
                .modify(
                    EntityKind::Place,
                    &place_id,
                    Box::new(move |e: &mut Entity| {
                        if let Some(place) = e.as_place_mut() {
                            place.unlink_amenity(&detached);
                        }
                        Ok(())
                    }),
                )
                .await?;
        }
        Ok(())
    }
}
