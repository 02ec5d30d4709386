//! Vector map adapter.
//!
//! Drawing happens in an external map layer. After every layer event the
//! editor re-reads the full drawn feature set and reconciles it against the
//! store with [`MapAdapter::reconcile`].

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::adapter::{
    CoordinateSpace, CreateRequest, MediumAdapter, kind_mismatch, unsupported_geometry,
    unsupported_request,
};
use crate::config::{Thresholds, TimelineSettings, ZoomLimits};
use crate::constants::FEATURE_HIT_TOLERANCE;
use crate::error::RegionError;
use crate::medium::{LoadedMedium, MediumKind, MediumLoadError};
use crate::model::{
    DrawnFeature, Feature, Geometry, Label, LonLat, Region, RegionId, ValidationRules,
};
use crate::tool::ToolMode;
use crate::viewport::Viewport;

/// Adapter for map features in `[lon, lat]` degrees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapAdapter {
    attached: bool,
    /// Drawing layer id -> region id, recorded when a feature is adopted.
    bindings: HashMap<String, RegionId>,
}

impl MapAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_domain(feature: &Feature) -> Result<(), RegionError> {
        match feature.geometry.coordinates().find(|c| !in_domain(c)) {
            Some([lon, lat]) => Err(RegionError::out_of_domain(format!(
                "coordinate ({lon}, {lat}) is outside lon [-180, 180], lat [-90, 90]"
            ))),
            None => Ok(()),
        }
    }

    /// Region bound to a layer id: a recorded binding first, then the id
    /// itself if it is the UUID of a current region.
    fn resolve(&self, layer_id: &str, current: &[Region]) -> Option<RegionId> {
        let exists = |id: &RegionId| current.iter().any(|r| r.id == *id);
        self.bindings
            .get(layer_id)
            .copied()
            .filter(exists)
            .or_else(|| Uuid::parse_str(layer_id).ok().filter(exists))
    }

    /// Reconcile the drawn feature set with the current regions.
    ///
    /// Known features keep their region (id, label and color) with the drawn
    /// geometry; a layer id is known if it was bound on an earlier pass or is
    /// the id of a current region. Other features become new regions stamped
    /// with `label`. A layer id that is a UUID is adopted as the region id,
    /// any other layer id is bound to the generated one. Regions missing from
    /// the drawn set are dropped. Existing regions keep their order and new
    /// ones are appended. Features that fail validation are skipped (a known
    /// region then keeps its old geometry).
    pub fn reconcile(
        &mut self,
        current: &[Region],
        drawn: Vec<DrawnFeature>,
        label: &Label,
        rules: &ValidationRules,
    ) -> Vec<Region> {
        let mut updates: Vec<(RegionId, Option<Feature>)> = Vec::new();
        let mut created: Vec<Region> = Vec::new();
        let mut claimed: HashSet<RegionId> = HashSet::new();

        for feature in drawn {
            let layer_id = feature.id.clone();
            let known = layer_id.as_deref().and_then(|id| self.resolve(id, current));
            if let Some(id) = known.filter(|id| !claimed.insert(*id)) {
                log::warn!("Map: region {} drawn twice, kept the first", id);
                continue;
            }

            let geometry = Geometry::Feature(feature.into_feature());
            let checked = geometry
                .validate(rules)
                .and_then(|()| self.commit_rule(geometry, current, known));

            match (known, checked) {
                (Some(id), Ok(Geometry::Feature(feature))) => updates.push((id, Some(feature))),
                (None, Ok(geometry)) => {
                    let mut region = Region::new(label, geometry);
                    let adopted = layer_id
                        .as_deref()
                        .and_then(|id| Uuid::parse_str(id).ok())
                        .filter(|id| !claimed.contains(id));
                    if let Some(id) = adopted {
                        region = region.with_id(id);
                    }
                    claimed.insert(region.id);
                    if let Some(layer_id) = layer_id {
                        self.bindings.insert(layer_id, region.id);
                    }
                    created.push(region);
                }
                (Some(id), Err(e)) => {
                    log::warn!("Map: kept previous geometry of region {}: {}", id, e);
                    updates.push((id, None));
                }
                (None, Err(e)) => log::warn!("Map: skipped new drawn feature: {}", e),
                (Some(id), Ok(_)) => {
                    log::warn!("Map: region {} got a non-feature geometry", id);
                    updates.push((id, None));
                }
            }
        }

        let mut next: Vec<Region> = current
            .iter()
            .filter_map(|region| {
                let (_, feature) = updates.iter().find(|(id, _)| *id == region.id)?;
                let mut region = region.clone();
                if let Some(feature) = feature {
                    region.geometry = Geometry::Feature(feature.clone());
                }
                Some(region)
            })
            .collect();

        log::debug!(
            "Map: reconciled {} regions -> {} kept, {} new, {} removed",
            current.len(),
            next.len(),
            created.len(),
            current.len() - next.len()
        );
        next.extend(created);
        self.bindings.retain(|_, id| claimed.contains(id));
        next
    }
}

fn in_domain([lon, lat]: &LonLat) -> bool {
    (-180.0..=180.0).contains(lon) && (-90.0..=90.0).contains(lat)
}

impl MediumAdapter for MapAdapter {
    fn kind(&self) -> MediumKind {
        MediumKind::Map
    }

    fn attach(&mut self, medium: LoadedMedium) -> Result<(), MediumLoadError> {
        match medium {
            LoadedMedium::Map => {
                log::info!("Map: attached");
                self.attached = true;
                self.bindings.clear();
                Ok(())
            }
            other => Err(kind_mismatch(MediumKind::Map, &other)),
        }
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn supports_tool(&self, tool: ToolMode) -> bool {
        tool == ToolMode::Select
    }

    fn transform_space(&self) -> CoordinateSpace {
        CoordinateSpace::LonLat
    }

    fn initial_viewport(&self, _zoom: &ZoomLimits, _timeline: &TimelineSettings) -> Viewport {
        Viewport::Fixed
    }

    fn hit_tolerance(&self) -> f32 {
        FEATURE_HIT_TOLERANCE as f32
    }

    fn create_rule(
        &self,
        request: &CreateRequest,
        _thresholds: &Thresholds,
    ) -> Result<Geometry, RegionError> {
        match request {
            CreateRequest::Feature(feature) => Ok(Geometry::Feature(feature.clone())),
            other => Err(unsupported_request(other, MediumKind::Map)),
        }
    }

    fn commit_rule(
        &self,
        geometry: Geometry,
        _existing: &[Region],
        _exclude: Option<RegionId>,
    ) -> Result<Geometry, RegionError> {
        match &geometry {
            Geometry::Feature(feature) => {
                Self::check_domain(feature)?;
                Ok(geometry)
            }
            other => Err(unsupported_geometry(other, MediumKind::Map)),
        }
    }

    fn reconcile_features(
        &mut self,
        current: &[Region],
        drawn: Vec<DrawnFeature>,
        label: &Label,
        rules: &ValidationRules,
    ) -> Option<Vec<Region>> {
        Some(self.reconcile(current, drawn, label, rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeatureGeometry;

    fn point(lon: f64, lat: f64) -> DrawnFeature {
        DrawnFeature::new(FeatureGeometry::Point {
            coordinates: [lon, lat],
        })
    }

    fn label() -> Label {
        Label::new("building", "#3366FF")
    }

    fn region_at(lon: f64, lat: f64) -> Region {
        Region::new(
            &Label::new("road", "#FF9900"),
            Geometry::Feature(point(lon, lat).into_feature()),
        )
    }

    #[test]
    fn test_out_of_range_rejected() {
        let adapter = MapAdapter::new();
        let err = adapter
            .commit_rule(
                Geometry::Feature(point(181.0, 10.0).into_feature()),
                &[],
                None,
            )
            .unwrap_err();
        assert!(matches!(err, RegionError::OutOfDomain { .. }));
        assert!(
            adapter
                .commit_rule(Geometry::Feature(point(-180.0, 90.0).into_feature()), &[], None)
                .is_ok()
        );
    }

    #[test]
    fn test_reconcile_update_create_remove() {
        let mut adapter = MapAdapter::new();
        let kept = region_at(10.0, 50.0);
        let dropped = region_at(11.0, 51.0);
        let current = vec![kept.clone(), dropped.clone()];

        let drawn = vec![
            point(12.0, 52.0),
            point(10.5, 50.5).with_id(kept.id.to_string()),
        ];
        let next = adapter.reconcile(&current, drawn, &label(), &ValidationRules::default());

        assert_eq!(next.len(), 2);
        assert_eq!(next[0].id, kept.id);
        assert_eq!(next[0].label, "road");
        assert_eq!(
            next[0].geometry,
            Geometry::Feature(point(10.5, 50.5).into_feature())
        );
        assert_eq!(next[1].label, "building");
        assert_eq!(next[1].color, "#3366FF");
        assert!(next.iter().all(|r| r.id != dropped.id));
    }

    #[test]
    fn test_reconcile_invalid_feature() {
        let mut adapter = MapAdapter::new();
        let known = region_at(10.0, 50.0);
        let current = vec![known.clone()];

        let drawn = vec![
            point(200.0, 0.0).with_id(known.id.to_string()),
            DrawnFeature::new(FeatureGeometry::LineString {
                coordinates: vec![[0.0, 0.0]],
            }),
        ];
        let next = adapter.reconcile(&current, drawn, &label(), &ValidationRules::default());

        // Known region keeps its geometry; the broken new line is skipped
        assert_eq!(next, current);
    }

    #[test]
    fn test_unknown_id_creates() {
        let mut adapter = MapAdapter::new();
        let next = adapter.reconcile(
            &[],
            vec![point(1.0, 1.0).with_id("draw-layer-7")],
            &label(),
            &ValidationRules::default(),
        );
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn test_layer_id_keeps_region_across_resyncs() {
        let mut adapter = MapAdapter::new();
        let rules = ValidationRules::default();
        let drawn = || vec![point(10.0, 20.0).with_id("draw-1")];

        let first = adapter.reconcile(&[], drawn(), &label(), &rules);
        let relabeled = Label::new("road", "#FF9900");
        let second = adapter.reconcile(&first, drawn(), &relabeled, &rules);
        assert_eq!(second, first);

        let moved = adapter.reconcile(
            &second,
            vec![point(11.0, 21.0).with_id("draw-1")],
            &relabeled,
            &rules,
        );
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].id, first[0].id);
        assert_eq!(moved[0].label, "building");

        // Dropping the feature forgets the binding
        assert!(adapter.reconcile(&moved, Vec::new(), &label(), &rules).is_empty());
        let again = adapter.reconcile(&[], drawn(), &label(), &rules);
        assert_ne!(again[0].id, first[0].id);
    }

    #[test]
    fn test_uuid_layer_id_adopted() {
        let mut adapter = MapAdapter::new();
        let id = Uuid::new_v4();
        let next = adapter.reconcile(
            &[],
            vec![
                point(1.0, 1.0).with_id(id.to_string()),
                point(2.0, 2.0).with_id(id.to_string()),
            ],
            &label(),
            &ValidationRules::default(),
        );
        assert_eq!(next.len(), 2);
        assert_eq!(next[0].id, id);
        assert_ne!(next[1].id, id);
    }

    #[test]
    fn test_duplicate_known_id_kept_once() {
        let mut adapter = MapAdapter::new();
        let known = region_at(10.0, 50.0);
        let current = vec![known.clone()];
        let next = adapter.reconcile(
            &current,
            vec![
                point(10.5, 50.5).with_id(known.id.to_string()),
                point(99.0, 9.0).with_id(known.id.to_string()),
            ],
            &label(),
            &ValidationRules::default(),
        );
        assert_eq!(next.len(), 1);
        assert_eq!(
            next[0].geometry,
            Geometry::Feature(point(10.5, 50.5).into_feature())
        );
    }
}
