//! Region store: the owned, ordered collection of regions of one editor.
//!
//! The store is replace-on-write from the outside: every successful mutation
//! is followed by exactly one call of the change listener with the full list.
//! Failed mutations leave the list untouched and emit nothing.

use std::fmt;

use crate::error::RegionError;
use crate::model::{Geometry, GeometryPatch, Label, Region, RegionId, ValidationRules};

/// Callback receiving the full region list after each committed mutation.
pub type ChangeListener = Box<dyn FnMut(&[Region])>;

/// Ordered region collection with single selection.
#[derive(Default)]
pub struct RegionStore {
    regions: Vec<Region>,
    selected: Option<RegionId>,
    rules: ValidationRules,
    /// Number of emissions so far
    revision: u64,
    on_change: Option<ChangeListener>,
}

impl fmt::Debug for RegionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegionStore")
            .field("regions", &self.regions.len())
            .field("selected", &self.selected)
            .field("rules", &self.rules)
            .field("revision", &self.revision)
            .field("listening", &self.on_change.is_some())
            .finish()
    }
}

impl RegionStore {
    /// Create an empty store.
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            rules,
            ..Default::default()
        }
    }

    /// Install the change listener, replacing any previous one.
    pub fn set_listener(&mut self, listener: ChangeListener) {
        self.on_change = Some(listener);
    }

    /// Initialize the store with an existing list without emitting.
    ///
    /// Regions are adopted as given; invalid ones are kept but logged.
    pub fn load(&mut self, regions: Vec<Region>) {
        for region in &regions {
            if let Err(e) = region.geometry.validate(&self.rules) {
                log::warn!("Store: loaded region {} is invalid: {}", region.id, e);
            }
        }
        log::debug!("Store: loaded {} regions", regions.len());
        self.regions = regions;
        self.selected = None;
    }

    /// Counter bumped by every emitted mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn get(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.get(id).is_some()
    }

    /// Id of the selected region.
    pub fn selected(&self) -> Option<RegionId> {
        self.selected
    }

    /// The selected region itself.
    pub fn selected_region(&self) -> Option<&Region> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Append a region after validating its geometry.
    pub fn add(&mut self, region: Region) -> Result<RegionId, RegionError> {
        region.geometry.validate(&self.rules)?;
        let id = region.id;
        log::info!(
            "Store: added {} region {} '{}' (total: {})",
            region.geometry.kind_name(),
            id,
            region.label,
            self.regions.len() + 1
        );
        self.regions.push(region);
        self.emit();
        Ok(id)
    }

    /// Merge a geometry patch into an existing region.
    ///
    /// Label and color are left alone; use [`RegionStore::relabel`] for those.
    pub fn update(&mut self, id: RegionId, patch: GeometryPatch) -> Result<(), RegionError> {
        let index = self.index_of(id)?;
        let merged = self.regions[index].geometry.merge(patch)?;
        merged.validate(&self.rules)?;
        log::debug!("Store: updated {} region {}", merged.kind_name(), id);
        self.regions[index].geometry = merged;
        self.emit();
        Ok(())
    }

    /// Replace the whole geometry of a region (same variant only).
    pub fn set_geometry(&mut self, id: RegionId, geometry: Geometry) -> Result<(), RegionError> {
        self.update(id, geometry.into())
    }

    /// Reassign the label of a region, snapshotting the new color.
    pub fn relabel(&mut self, id: RegionId, label: &Label) -> Result<(), RegionError> {
        let index = self.index_of(id)?;
        let region = &mut self.regions[index];
        log::info!(
            "Store: relabeled region {} '{}' -> '{}'",
            id,
            region.label,
            label.value
        );
        region.label = label.value.clone();
        region.color = label.color.clone();
        self.emit();
        Ok(())
    }

    /// Remove a region. Removing an absent id is a no-op.
    ///
    /// Returns whether anything was removed.
    pub fn remove(&mut self, id: RegionId) -> bool {
        let Some(index) = self.regions.iter().position(|r| r.id == id) else {
            log::debug!("Store: remove of unknown region {} ignored", id);
            return false;
        };
        self.regions.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        log::info!(
            "Store: removed region {} (remaining: {})",
            id,
            self.regions.len()
        );
        self.emit();
        true
    }

    /// Select a region, or clear the selection with `None`.
    ///
    /// Selection is not a list mutation and does not emit.
    pub fn select(&mut self, id: Option<RegionId>) -> Result<(), RegionError> {
        if let Some(id) = id {
            self.index_of(id)?;
        }
        if self.selected != id {
            log::debug!("Store: selection {:?} -> {:?}", self.selected, id);
        }
        self.selected = id;
        Ok(())
    }

    /// Replace the whole list in one emission.
    ///
    /// The selection survives if its region is still present.
    pub fn replace_all(&mut self, regions: Vec<Region>) {
        self.regions = regions;
        if let Some(id) = self.selected
            && !self.contains(id)
        {
            self.selected = None;
        }
        log::debug!("Store: replaced list ({} regions)", self.regions.len());
        self.emit();
    }

    fn index_of(&self, id: RegionId) -> Result<usize, RegionError> {
        self.regions
            .iter()
            .position(|r| r.id == id)
            .ok_or(RegionError::NotFound { id })
    }

    fn emit(&mut self) {
        self.revision += 1;
        if let Some(listener) = self.on_change.as_mut() {
            listener(&self.regions);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use uuid::Uuid;

    use super::*;
    use crate::geometry::Point;

    fn label() -> Label {
        Label::new("car", "#FF0000")
    }

    fn rect(x: f32, y: f32, w: f32, h: f32) -> Region {
        Region::new(
            &label(),
            Geometry::Box {
                x,
                y,
                width: w,
                height: h,
            },
        )
    }

    /// Store plus a log of every emitted list length.
    fn recording_store() -> (RegionStore, Rc<RefCell<Vec<usize>>>) {
        let emissions = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&emissions);
        let mut store = RegionStore::new(ValidationRules::default());
        store.set_listener(Box::new(move |regions| sink.borrow_mut().push(regions.len())));
        (store, emissions)
    }

    #[test]
    fn test_add_emits_once() {
        let (mut store, emissions) = recording_store();
        let id = store.add(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).unwrap().label, "car");
        assert_eq!(*emissions.borrow(), vec![1]);
    }

    #[test]
    fn test_degenerate_add_leaves_store_unchanged() {
        let (mut store, emissions) = recording_store();
        let err = store.add(rect(0.0, 0.0, 10.0, 2.0)).unwrap_err();
        assert!(matches!(err, RegionError::DegenerateGeometry { .. }));

        let triangle_missing_vertex = Region::new(
            &label(),
            Geometry::Polygon {
                points: vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)],
            },
        );
        assert!(store.add(triangle_missing_vertex).is_err());
        assert!(store.is_empty());
        assert!(emissions.borrow().is_empty());
    }

    #[test]
    fn test_load_does_not_emit() {
        let (mut store, emissions) = recording_store();
        store.load(vec![rect(0.0, 0.0, 10.0, 10.0), rect(0.0, 0.0, 1.0, 1.0)]);
        assert_eq!(store.len(), 2);
        assert!(emissions.borrow().is_empty());
    }

    #[test]
    fn test_update_keeps_id_and_label() {
        let (mut store, emissions) = recording_store();
        let id = store.add(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        store
            .update(
                id,
                GeometryPatch::Box {
                    x: Some(20.0),
                    y: None,
                    width: None,
                    height: None,
                },
            )
            .unwrap();

        let region = store.get(id).unwrap();
        assert_eq!(region.label, "car");
        assert!(matches!(region.geometry, Geometry::Box { x, .. } if x == 20.0));
        assert_eq!(emissions.borrow().len(), 2);
    }

    #[test]
    fn test_update_errors() {
        let (mut store, emissions) = recording_store();
        let id = store.add(rect(0.0, 0.0, 10.0, 10.0)).unwrap();

        let missing = Uuid::new_v4();
        assert_eq!(
            store.set_geometry(missing, Geometry::Span { start: 0, end: 1 }),
            Err(RegionError::NotFound { id: missing })
        );
        assert!(matches!(
            store.set_geometry(id, Geometry::Span { start: 0, end: 1 }),
            Err(RegionError::GeometryMismatch { .. })
        ));
        assert!(matches!(
            store.update(
                id,
                GeometryPatch::Box {
                    x: None,
                    y: None,
                    width: Some(1.0),
                    height: None
                }
            ),
            Err(RegionError::DegenerateGeometry { .. })
        ));
        assert_eq!(emissions.borrow().len(), 1);
    }

    #[test]
    fn test_relabel_snapshots_color() {
        let (mut store, _) = recording_store();
        let id = store.add(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        store.relabel(id, &Label::new("truck", "#0000FF")).unwrap();
        let region = store.get(id).unwrap();
        assert_eq!(region.label, "truck");
        assert_eq!(region.color, "#0000FF");
    }

    #[test]
    fn test_remove_twice_equals_once() {
        let (mut store, emissions) = recording_store();
        let a = store.add(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        store.add(rect(20.0, 0.0, 10.0, 10.0)).unwrap();
        store.select(Some(a)).unwrap();

        assert!(store.remove(a));
        let after_once = store.regions().to_vec();
        assert!(!store.remove(a));
        assert_eq!(store.regions(), after_once.as_slice());
        assert_eq!(store.selected(), None);
        assert_eq!(*emissions.borrow(), vec![1, 2, 1]);
        assert_eq!(store.revision(), 3);
    }

    #[test]
    fn test_single_selection() {
        let (mut store, emissions) = recording_store();
        let a = store.add(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        let b = store.add(rect(20.0, 0.0, 10.0, 10.0)).unwrap();

        store.select(Some(a)).unwrap();
        store.select(Some(b)).unwrap();
        assert_eq!(store.selected(), Some(b));

        let unknown = Uuid::new_v4();
        assert!(store.select(Some(unknown)).is_err());
        assert_eq!(store.selected(), Some(b));

        store.select(None).unwrap();
        assert_eq!(store.selected(), None);
        assert_eq!(emissions.borrow().len(), 2);
    }

    #[test]
    fn test_replace_all_drops_stale_selection() {
        let (mut store, emissions) = recording_store();
        let a = store.add(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        store.select(Some(a)).unwrap();

        store.replace_all(vec![rect(5.0, 5.0, 10.0, 10.0), rect(9.0, 9.0, 10.0, 10.0)]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.selected(), None);
        assert_eq!(*emissions.borrow(), vec![1, 2]);
    }
}
