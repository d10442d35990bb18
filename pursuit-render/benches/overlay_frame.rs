use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pursuit_core::{Geometry, OverlayStyle, Point};
use pursuit_render::OverlayRenderer;
use tiny_skia::Pixmap;

fn harness() -> (OverlayRenderer, Pixmap) {
    let width = 1280u32;
    let height = 720u32;
    let style = OverlayStyle::default();
    let geometry = Geometry::from_surface(width, height, &style);
    let canvas = Pixmap::new(width, height).expect("pixmap");
    (OverlayRenderer::new(geometry, style), canvas)
}

pub fn bench_overlay_frame(c: &mut Criterion) {
    let mut g = c.benchmark_group("overlay_frame");
    g.sample_size(40);

    let (renderer, mut canvas) = harness();
    let mut step = 0u32;
    g.bench_function("cross_and_arrow", |b| {
        b.iter(|| {
            step = step.wrapping_add(7);
            let pointer = Point::new(
                640.0 + (step % 400) as f32,
                360.0 + (step % 200) as f32,
            );
            renderer.render(&mut canvas, pointer);
            black_box(canvas.data().first());
        })
    });

    g.finish();
}

criterion_group!(benches, bench_overlay_frame);
criterion_main!(benches);
