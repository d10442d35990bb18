pub mod overlay;
pub mod text;

pub use overlay::OverlayRenderer;
pub use text::render_text_pixmap;
