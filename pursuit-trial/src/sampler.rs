use pursuit_core::{Geometry, Point, PointerCell};
use tracing::trace;

/// Translates raw pointer events from viewport coordinates into
/// surface-local coordinates and publishes them to the shared cell.
///
/// Movement events write the cell and nothing else; the renderer and the
/// recorder read whatever the latest published position is when their turn
/// on the event loop comes. Clicks additionally test the activation
/// affordance: only a click within the activation radius of the surface
/// center counts, everything else is silently ignored.
#[derive(Debug, Clone)]
pub struct PointerSampler {
    position: PointerCell,
    geometry: Geometry,
    surface_origin: Point,
}

impl PointerSampler {
    pub fn new(position: PointerCell, geometry: Geometry, surface_origin: Point) -> Self {
        Self {
            position,
            geometry,
            surface_origin,
        }
    }

    pub fn to_surface(&self, viewport: Point) -> Point {
        Point::new(
            viewport.x - self.surface_origin.x,
            viewport.y - self.surface_origin.y,
        )
    }

    /// Movement: publish the surface-local position.
    pub fn pointer_moved(&self, viewport: Point) {
        let local = self.to_surface(viewport);
        trace!(x = local.x, y = local.y, "pointer moved");
        self.position.set(local);
    }

    /// Whether a click at `viewport` lands within the activation radius.
    pub fn click_activates(&self, viewport: Point) -> bool {
        self.geometry.within_click_radius(self.to_surface(viewport))
    }
}
