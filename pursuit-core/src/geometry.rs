use serde::{Deserialize, Serialize};

/// A position in surface-local coordinates, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, widened to `f64` for recording.
    pub fn distance_to(self, other: Point) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Visual constants for the trial overlay.
///
/// Every field has a default so hosts only spell out what they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub fixation_cross: bool,
    pub cross_half_width: f32,
    pub cross_half_height: f32,
    pub cross_thickness: f32,
    pub cross_color: [u8; 4],
    pub click_radius: f32,
    pub arrow_line_width: f32,
    pub arrow_outline_color: [u8; 4],
    pub arrow_fill_color: [u8; 4],
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            fixation_cross: true,
            cross_half_width: 20.0,
            cross_half_height: 20.0,
            cross_thickness: 3.0,
            cross_color: [255, 255, 255, 255],
            click_radius: 10.0,
            arrow_line_width: 1.0,
            arrow_outline_color: [255, 255, 255, 255],
            arrow_fill_color: [255, 255, 255, 255],
        }
    }
}

/// Immutable per-trial overlay geometry.
///
/// Built once from the stimulus surface's realized dimensions when the trial
/// starts and never recomputed mid-trial, even if the surface is resized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    pub width: f32,
    pub height: f32,
    pub center: Point,
    pub cross_half_width: f32,
    pub cross_half_height: f32,
    pub cross_thickness: f32,
    pub click_radius: f32,
}

impl Geometry {
    /// Derive the trial geometry from the surface's realized dimensions.
    ///
    /// A zero-size surface degenerates to a zero-radius target at the
    /// origin rather than failing; callers may log the boundary case.
    pub fn from_surface(width: u32, height: u32, style: &OverlayStyle) -> Self {
        let degenerate = width == 0 || height == 0;
        Self {
            width: width as f32,
            height: height as f32,
            center: Point::new(width as f32 / 2.0, height as f32 / 2.0),
            cross_half_width: style.cross_half_width,
            cross_half_height: style.cross_half_height,
            cross_thickness: style.cross_thickness,
            click_radius: if degenerate { 0.0 } else { style.click_radius },
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Displacement magnitude: Euclidean distance from `p` to the surface
    /// center. The sampler, renderer and recorder all share this definition.
    pub fn magnitude_from_center(&self, p: Point) -> f64 {
        p.distance_to(self.center)
    }

    /// Whether a click at `p` lands within the activation radius.
    pub fn within_click_radius(&self, p: Point) -> bool {
        p.distance_to(self.center) <= self.click_radius as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geometry_centers_on_surface() {
        let g = Geometry::from_surface(640, 480, &OverlayStyle::default());
        assert_eq!(g.center, Point::new(320.0, 240.0));
        assert!(!g.is_degenerate());
        assert_eq!(g.click_radius, 10.0);
    }

    #[test]
    fn zero_size_surface_degenerates_to_zero_radius() {
        let g = Geometry::from_surface(0, 0, &OverlayStyle::default());
        assert!(g.is_degenerate());
        assert_eq!(g.click_radius, 0.0);
        assert_eq!(g.center, Point::new(0.0, 0.0));
    }

    #[test]
    fn click_radius_uses_euclidean_distance() {
        let g = Geometry::from_surface(200, 200, &OverlayStyle::default());
        // center (100, 100), radius 10
        assert!(g.within_click_radius(Point::new(105.0, 103.0)));
        assert!(!g.within_click_radius(Point::new(100.0, 130.0)));
        let d = g.magnitude_from_center(Point::new(105.0, 103.0));
        assert!((d - 34.0f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn magnitude_is_nonnegative_and_zero_at_center() {
        let g = Geometry::from_surface(100, 100, &OverlayStyle::default());
        assert_eq!(g.magnitude_from_center(g.center), 0.0);
        assert!(g.magnitude_from_center(Point::new(0.0, 0.0)) > 0.0);
    }
}
