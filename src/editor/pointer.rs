//! Pointer input and selection.

use crate::adapter::{CreateRequest, MediumAdapter};
use crate::editor::Editor;
use crate::geometry::{Point, Probe, hit_test, pixels_to_medium, to_medium_space};
use crate::input::PointerEvent;
use crate::model::{Geometry, Region, RegionId};
use crate::tool::{ToolContext, ToolOutcome};

impl<A: MediumAdapter> Editor<A> {
    /// Feed a pointer event in screen coordinates.
    ///
    /// Ignored unless the editor is ready and the medium takes raw pointer
    /// input (text, map and 3D media get selection and creation through
    /// their own calls).
    pub fn pointer(&mut self, event: PointerEvent) {
        if !self.is_ready() {
            log::trace!("Editor: pointer ignored ({:?})", self.status);
            return;
        }
        if !self.adapter.transform_space().takes_pointer_input() {
            log::trace!("Editor: {} takes no pointer input", self.adapter.kind());
            return;
        }

        let projection = self.viewport.projection();
        let screen = Point::new(event.x, event.y);
        let medium = to_medium_space(screen, &projection);

        // Handles of a read-only selection can't be grabbed
        let selected = if self.read_only {
            None
        } else {
            self.store
                .selected_region()
                .map(|region| (region.id, &region.geometry))
        };
        let ctx = ToolContext {
            selected,
            units_per_pixel: pixels_to_medium(1.0, &projection),
            thresholds: &self.config.thresholds,
        };
        let outcome = self.tool.pointer(event.kind, screen, medium, &ctx);
        self.apply_outcome(outcome);
    }

    pub(super) fn apply_outcome(&mut self, outcome: ToolOutcome) {
        match outcome {
            ToolOutcome::Nothing => {}
            ToolOutcome::Pan { dx, dy } => self.viewport.pan_by(dx, dy),
            ToolOutcome::SelectAt(p) => match self.adapter.pointer_probe(p) {
                Some(probe) => {
                    self.select_at(probe);
                }
                None => log::debug!("Editor: no probe for {:?}", p),
            },
            ToolOutcome::Create(request) => {
                self.create(request);
            }
            ToolOutcome::Commit { id, geometry } => {
                self.commit_edit(id, geometry);
            }
        }
    }

    /// Select the region under `probe`.
    ///
    /// Repeated clicks on overlapping regions cycle through them; the first
    /// click picks the top-most (last drawn). A miss clears the selection.
    pub fn select_at(&mut self, probe: Probe) -> Option<RegionId> {
        if !self.is_ready() {
            return None;
        }
        let tolerance = self.adapter.hit_tolerance();
        let hits: Vec<RegionId> = self
            .store
            .regions()
            .iter()
            .filter(|region| hit_test(probe, &region.geometry, tolerance))
            .map(|region| region.id)
            .collect();

        let Some(&top) = hits.last() else {
            log::debug!("No region at {:?}, deselected", probe);
            self.clear_selection();
            return None;
        };

        // Cycle if the current selection is among the hits
        let next = match self
            .store
            .selected()
            .and_then(|current| hits.iter().position(|id| *id == current))
        {
            Some(pos) => hits[(pos + 1) % hits.len()],
            None => top,
        };

        self.select(Some(next));
        log::info!(
            "Selected region {} (cycling: {} overlapping)",
            next,
            hits.len()
        );
        Some(next)
    }

    /// Create a region from a request, stamped with the active label.
    ///
    /// The new region is selected. Returns `None` if the request was
    /// rejected; rejections are logged and nothing is emitted.
    pub fn create(&mut self, request: CreateRequest) -> Option<RegionId> {
        if !self.is_ready() {
            log::debug!("Editor: {} ignored, editor not ready", request.name());
            return None;
        }
        let label = self.active_label();
        let name = request.name();
        let result = self
            .adapter
            .create_rule(&request, &self.config.thresholds)
            .and_then(|geometry| {
                self.adapter
                    .commit_rule(geometry, self.store.regions(), None)
            })
            .and_then(|geometry| {
                let region = Region::new(&label, geometry);
                self.mutate(&format!("create {name}"), |store| store.add(region))
            });

        match result {
            Ok(id) => {
                self.select(Some(id));
                Some(id)
            }
            Err(e) => {
                log::warn!("Editor: {} rejected: {}", name, e);
                None
            }
        }
    }

    /// Commit a new geometry for an existing region.
    pub fn commit_edit(&mut self, id: RegionId, geometry: Geometry) -> bool {
        if !self.is_ready() {
            return false;
        }
        let result = self
            .adapter
            .commit_rule(geometry, self.store.regions(), Some(id))
            .and_then(|geometry| {
                let name = geometry.kind_name();
                self.mutate(&format!("edit {name}"), |store| {
                    store.set_geometry(id, geometry)
                })
            });
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Editor: edit of region {} rejected: {}", id, e);
                false
            }
        }
    }
}
