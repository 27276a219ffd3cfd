//! One marker per role
//!
//! The registry is the only owner of marker handles. Reassigning a role
//! removes the old marker from the surface before the new one is added.

use crate::geo::GeoPoint;
use crate::selection::{Role, RoleAssignment};
use crate::surface::{MapSurface, MarkerHandle};
use tracing::debug;

/// The live marker of a role
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoleMarker {
    pub role: Role,
    pub point: GeoPoint,
    pub node_id: Option<u64>,
    pub handle: MarkerHandle,
}

/// Holds at most one marker for each role
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    source: Option<RoleMarker>,
    destination: Option<RoleMarker>,
    focus_zoom: u8,
}

impl MarkerRegistry {
    /// Create an empty registry that flies to new markers at `focus_zoom`
    pub fn new(focus_zoom: u8) -> Self {
        Self {
            source: None,
            destination: None,
            focus_zoom,
        }
    }

    /// Place the marker for `assignment.role`, replacing any previous one
    pub fn assign<S: MapSurface>(
        &mut self,
        surface: &mut S,
        assignment: RoleAssignment,
    ) -> &RoleMarker {
        let RoleAssignment {
            role,
            point,
            node_id,
        } = assignment;
        let focus_zoom = self.focus_zoom;
        let slot = self.slot_mut(role);

        if let Some(old) = slot.take() {
            surface.remove_marker(old.handle);
        }

        let label = format!("{}: {}", role.label(), point);
        let handle = surface.add_marker(point, &label);
        surface.center_on(point, focus_zoom);
        debug!("Placed {} marker at ({}), node {:?}", role, point, node_id);

        slot.insert(RoleMarker {
            role,
            point,
            node_id,
            handle,
        })
    }

    pub fn get(&self, role: Role) -> Option<&RoleMarker> {
        match role {
            Role::Source => self.source.as_ref(),
            Role::Destination => self.destination.as_ref(),
        }
    }

    /// Node id resolved for `role`, if any
    pub fn node_id(&self, role: Role) -> Option<u64> {
        self.get(role).and_then(|m| m.node_id)
    }

    pub fn len(&self) -> usize {
        usize::from(self.source.is_some()) + usize::from(self.destination.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove both markers from the surface
    pub fn clear<S: MapSurface>(&mut self, surface: &mut S) {
        for marker in [self.source.take(), self.destination.take()].into_iter().flatten() {
            surface.remove_marker(marker.handle);
        }
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<RoleMarker> {
        match role {
            Role::Source => &mut self.source,
            Role::Destination => &mut self.destination,
        }
    }
}
