use pursuit_core::{Geometry, OverlayStyle, Point};
use tiny_skia::{
    Color, FillRule, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform,
};

const ARROW_HEAD_LENGTH: f32 = 10.0;
const ARROW_HEAD_HALF_WIDTH: f32 = 5.0;
const ARROW_SHAFT_HALF_WIDTH: f32 = 1.0;
const PROMPT_BOTTOM_MARGIN: f32 = 30.0;

/// Draws the per-frame trial overlay: fixation cross, the directional
/// indicator from the surface center to the current pointer position, and
/// the optional prompt text.
///
/// Rendering is a pure function of the (immutable) geometry, the style and
/// the pointer position passed in; redrawing with an unchanged pointer is
/// idempotent.
pub struct OverlayRenderer {
    geometry: Geometry,
    style: OverlayStyle,
    prompt: Option<Pixmap>,
}

impl OverlayRenderer {
    pub fn new(geometry: Geometry, style: OverlayStyle) -> Self {
        Self {
            geometry,
            style,
            prompt: None,
        }
    }

    /// Install a pre-rendered prompt pixmap, blitted near the bottom edge
    /// on every frame.
    pub fn set_prompt(&mut self, prompt: Pixmap) {
        self.prompt = Some(prompt);
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// One running frame: clear, cross, arrow to the pointer, prompt.
    pub fn render(&self, canvas: &mut Pixmap, pointer: Point) {
        canvas.fill(Color::TRANSPARENT);
        if self.style.fixation_cross {
            self.draw_cross(canvas);
        }
        self.draw_arrow(canvas, pointer);
        self.blit_prompt(canvas);
    }

    /// Pre-activation frame: cross and prompt only, no directional
    /// indicator.
    pub fn render_idle(&self, canvas: &mut Pixmap) {
        canvas.fill(Color::TRANSPARENT);
        if self.style.fixation_cross {
            self.draw_cross(canvas);
        }
        self.blit_prompt(canvas);
    }

    fn draw_cross(&self, canvas: &mut Pixmap) {
        let center = self.geometry.center;
        let mut paint = Paint::default();
        paint.set_color(color_from(self.style.cross_color));
        paint.anti_alias = true;
        let stroke = Stroke {
            width: self.geometry.cross_thickness,
            ..Default::default()
        };

        let mut path = PathBuilder::new();
        path.move_to(center.x - self.geometry.cross_half_width, center.y);
        path.line_to(center.x + self.geometry.cross_half_width, center.y);
        if let Some(horizontal) = path.finish() {
            canvas.stroke_path(&horizontal, &paint, &stroke, Transform::identity(), None);
        }

        let mut path = PathBuilder::new();
        path.move_to(center.x, center.y - self.geometry.cross_half_height);
        path.line_to(center.x, center.y + self.geometry.cross_half_height);
        if let Some(vertical) = path.finish() {
            canvas.stroke_path(&vertical, &paint, &stroke, Transform::identity(), None);
        }
    }

    fn draw_arrow(&self, canvas: &mut Pixmap, pointer: Point) {
        let center = self.geometry.center;
        let dx = pointer.x - center.x;
        let dy = pointer.y - center.y;
        let length = (dx * dx + dy * dy).sqrt();
        // A pointer at the center has no direction to indicate.
        if length < 0.5 {
            return;
        }
        let (ux, uy) = (dx / length, dy / length);
        let (nx, ny) = (-uy, ux);

        // Head shrinks on arrows shorter than the head itself.
        let head = ARROW_HEAD_LENGTH.min(length);
        let neck = Point::new(pointer.x - ux * head, pointer.y - uy * head);

        let mut path = PathBuilder::new();
        path.move_to(
            center.x + nx * ARROW_SHAFT_HALF_WIDTH,
            center.y + ny * ARROW_SHAFT_HALF_WIDTH,
        );
        path.line_to(
            neck.x + nx * ARROW_SHAFT_HALF_WIDTH,
            neck.y + ny * ARROW_SHAFT_HALF_WIDTH,
        );
        path.line_to(
            neck.x + nx * ARROW_HEAD_HALF_WIDTH,
            neck.y + ny * ARROW_HEAD_HALF_WIDTH,
        );
        path.line_to(pointer.x, pointer.y);
        path.line_to(
            neck.x - nx * ARROW_HEAD_HALF_WIDTH,
            neck.y - ny * ARROW_HEAD_HALF_WIDTH,
        );
        path.line_to(
            neck.x - nx * ARROW_SHAFT_HALF_WIDTH,
            neck.y - ny * ARROW_SHAFT_HALF_WIDTH,
        );
        path.line_to(
            center.x - nx * ARROW_SHAFT_HALF_WIDTH,
            center.y - ny * ARROW_SHAFT_HALF_WIDTH,
        );
        path.close();
        let Some(arrow) = path.finish() else {
            return;
        };

        let mut fill = Paint::default();
        fill.set_color(color_from(self.style.arrow_fill_color));
        fill.anti_alias = true;
        canvas.fill_path(&arrow, &fill, FillRule::Winding, Transform::identity(), None);

        let mut outline = Paint::default();
        outline.set_color(color_from(self.style.arrow_outline_color));
        outline.anti_alias = true;
        let stroke = Stroke {
            width: self.style.arrow_line_width,
            ..Default::default()
        };
        canvas.stroke_path(&arrow, &outline, &stroke, Transform::identity(), None);
    }

    fn blit_prompt(&self, canvas: &mut Pixmap) {
        if let Some(prompt) = &self.prompt {
            let x = (self.geometry.center.x - prompt.width() as f32 / 2.0) as i32;
            let y = (self.geometry.height - prompt.height() as f32 - PROMPT_BOTTOM_MARGIN) as i32;
            canvas.draw_pixmap(
                x,
                y,
                prompt.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }
    }
}

fn color_from(rgba: [u8; 4]) -> Color {
    Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3])
}
