use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ab_glyph::FontVec;
use anyhow::{Context, Result, anyhow};
use pixels::{Pixels, SurfaceTexture};
use pursuit_core::{Geometry, Playback, Point};
use pursuit_render::{OverlayRenderer, render_text_pixmap};
use pursuit_timing::{Clock, FrameTimeStats, MonotonicClock};
use pursuit_trial::{
    ClickAction, FrameOutcome, FrameRequest, FrameScheduler, OverlaySink, StopReason, TrialEngine,
    TrialParams,
};
use serde::{Deserialize, Serialize};
use tiny_skia::Pixmap;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::host::{JsonResultHost, TrialHost};
use crate::media::ClockPlayback;

const PROMPT_SIZE_PX: f32 = 18.0;
const PROMPT_COLOR: [u8; 4] = [255, 255, 255, 255];

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Shell configuration: the trial parameters plus what the shell itself
/// needs (a duration for the stand-in media, a font for the prompt, where
/// to write the result).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub trial: TrialParams,
    #[serde(default = "default_media_duration")]
    pub media_duration_secs: f64,
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_media_duration() -> f64 {
    30.0
}

fn default_output_path() -> PathBuf {
    PathBuf::from("trial_result.json")
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("cannot open config file {}", path.display()))?;
        serde_json::from_reader(file)
            .with_context(|| format!("invalid config in {}", path.display()))
    }
}

/// `FrameScheduler` over winit's redraw request. winit exposes no
/// cancellation, so `cancel_frame` is a no-op; a callback arriving after
/// termination is skipped by the frame loop anyway.
struct RedrawScheduler {
    window: Option<Arc<Window>>,
    next_id: u64,
}

impl RedrawScheduler {
    fn new() -> Self {
        Self {
            window: None,
            next_id: 0,
        }
    }

    fn attach(&mut self, window: Arc<Window>) {
        self.window = Some(window);
    }
}

impl FrameScheduler for RedrawScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        self.next_id += 1;
        FrameRequest::new(self.next_id)
    }

    fn cancel_frame(&mut self, _request: FrameRequest) {}
}

/// Draws the running overlay onto the app's canvas.
struct CanvasSink<'a> {
    renderer: &'a OverlayRenderer,
    canvas: &'a mut Pixmap,
}

impl OverlaySink for CanvasSink<'_> {
    fn render_overlay(&mut self, _geometry: &Geometry, pointer: Point) {
        self.renderer.render(self.canvas, pointer);
    }
}

pub struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    canvas: Option<Pixmap>,
    renderer: Option<OverlayRenderer>,
    engine: Option<TrialEngine<MonotonicClock>>,
    scheduler: RedrawScheduler,
    media: ClockPlayback,
    host: JsonResultHost,
    clock: MonotonicClock,
    refresh: FrameTimeStats,
    last_frame_ns: Option<u64>,
    cursor: Point,
    scale_factor: f64,
    refresh_rate: Option<f64>,
    should_exit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let media = ClockPlayback::new(config.media_duration_secs);
        let host = JsonResultHost::new(config.output_path.clone());
        Ok(Self {
            config,
            window: None,
            pixels: None,
            canvas: None,
            renderer: None,
            engine: None,
            scheduler: RedrawScheduler::new(),
            media,
            host,
            clock: MonotonicClock::new(),
            refresh: FrameTimeStats::default(),
            last_frame_ns: None,
            cursor: Point::default(),
            scale_factor: 1.0,
            refresh_rate: None,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "pursuit trial starting; click the cross to begin, Enter toggles fullscreen, Escape aborts"
        );
        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_trial(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        self.refresh_rate = monitor
            .and_then(|m| m.refresh_rate_millihertz())
            .map(|rate| rate as f64 / 1000.0);

        let window_attributes = Window::default_attributes()
            .with_title("Pursuit")
            .with_inner_size(LogicalSize::new(
                self.config.trial.width as f64,
                self.config.trial.height as f64,
            ))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(window_attributes)?);

        let physical_size = window.inner_size();
        self.scale_factor = window.scale_factor();
        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale_factor = self.scale_factor,
            refresh_rate_hz = ?self.refresh_rate,
            "display configuration"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.canvas = Some(Pixmap::new(physical_size.width, physical_size.height).ok_or_else(
            || {
                anyhow!(
                    "cannot allocate a {}x{} canvas",
                    physical_size.width,
                    physical_size.height
                )
            },
        )?);

        let mut engine = TrialEngine::new(
            self.config.trial.clone(),
            physical_size.width,
            physical_size.height,
            MonotonicClock::new(),
        )?;

        let mut renderer = OverlayRenderer::new(*engine.geometry(), self.config.trial.overlay.clone());
        if let Some(text) = &self.config.trial.prompt {
            match load_prompt_font(self.config.font_path.as_deref()) {
                Some(font) => {
                    if let Some(prompt) = render_text_pixmap(text, &font, PROMPT_SIZE_PX, PROMPT_COLOR)
                    {
                        renderer.set_prompt(prompt);
                    }
                }
                None => warn!("no usable prompt font found; prompt text will not be drawn"),
            }
        }
        if self.config.trial.controls {
            debug!("controls requested; this surface has no control strip");
        }

        if let Some(start) = self.config.trial.start {
            self.media.seek(start);
        }
        if self.config.trial.autoplay {
            self.media.play();
            engine.playback_started();
            info!("stimulus playback started (autoplay)");
        }

        self.scheduler.attach(window.clone());
        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let now_ns = self.clock.now_ns();
        if let Some(previous) = self.last_frame_ns {
            self.refresh
                .record(Duration::from_nanos(now_ns.saturating_sub(previous)));
        }
        self.last_frame_ns = Some(now_ns);

        let (Some(engine), Some(renderer), Some(canvas), Some(pixels)) = (
            self.engine.as_mut(),
            self.renderer.as_ref(),
            self.canvas.as_mut(),
            self.pixels.as_mut(),
        ) else {
            return Ok(());
        };

        if self.media.has_ended() {
            engine.request_stop(StopReason::MediaEnded);
        }

        let mut sink = CanvasSink {
            renderer,
            canvas: &mut *canvas,
        };
        let outcome = engine.frame(&mut self.scheduler, &mut sink);

        match outcome {
            FrameOutcome::Idle => {
                renderer.render_idle(canvas);
                // the frame loop owns the cadence only while running
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            FrameOutcome::Rendered | FrameOutcome::Terminated(_) | FrameOutcome::Skip => {}
        }

        let frame = pixels.frame_mut();
        if frame.len() == canvas.data().len() {
            frame.copy_from_slice(canvas.data());
        }
        pixels.render().context("failed to present the frame")?;

        if let Some(result) = engine.take_result() {
            self.host.finish(&result)?;
            self.log_refresh_summary();
            self.should_exit = true;
            event_loop.exit();
        }
        Ok(())
    }

    fn handle_click(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        match engine.click(self.cursor, &mut self.scheduler) {
            ClickAction::Activated => {
                if !self.media.is_playing() {
                    self.media.play();
                }
                engine.playback_started();
                info!("activation click; recording started");
            }
            action => debug!(?action, "click without effect"),
        }
    }

    fn handle_key(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        if let PhysicalKey::Code(code) = key {
            match code {
                KeyCode::Enter => {
                    if let Some(window) = &self.window {
                        let fullscreen = if window.fullscreen().is_some() {
                            None
                        } else {
                            Some(Fullscreen::Borderless(None))
                        };
                        window.set_fullscreen(fullscreen);
                    }
                }
                KeyCode::Escape => self.abort(event_loop),
                _ => {}
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(err) = pixels.resize_surface(new_size.width, new_size.height) {
                error!(%err, "failed to resize the surface");
            }
            if let Err(err) = pixels.resize_buffer(new_size.width, new_size.height) {
                error!(%err, "failed to resize the framebuffer");
            }
        }
        self.canvas = Pixmap::new(new_size.width, new_size.height);
        debug!(
            width = new_size.width,
            height = new_size.height,
            "surface resized; trial geometry stays fixed at trial start"
        );
    }

    /// Abort without a result (the host gets nothing; the trial never
    /// terminated).
    fn abort(&mut self, event_loop: &ActiveEventLoop) {
        self.media.pause();
        self.log_refresh_summary();
        info!("trial aborted");
        self.should_exit = true;
        event_loop.exit();
    }

    fn log_refresh_summary(&self) {
        if self.refresh.is_empty() {
            return;
        }
        let summary = self.refresh.summary();
        info!(
            frames = self.refresh.len(),
            average_ms = summary.average_frame_time_ns / 1e6,
            jitter_ms = summary.jitter_ns / 1e6,
            effective_hz = summary.effective_fps,
            "observed refresh cadence"
        );
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.create_window_and_trial(event_loop) {
            error!(%err, "failed to set up the trial");
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.abort(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(event_loop) {
                    error!(%err, "render failed");
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Point::new(position.x as f32, position.y as f32);
                if let Some(engine) = self.engine.as_mut() {
                    engine.pointer_moved(self.cursor);
                }
            }
            WindowEvent::MouseInput { state, button, .. }
                if state.is_pressed() && button == MouseButton::Left =>
            {
                self.handle_click();
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_key(event.physical_key, event_loop);
            }
            WindowEvent::Resized(new_size) => self.handle_resize(new_size),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}

fn load_prompt_font(configured: Option<&Path>) -> Option<FontVec> {
    let candidates = configured
        .into_iter()
        .chain(FONT_CANDIDATES.iter().map(Path::new));
    for path in candidates {
        match std::fs::read(path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => {
                    debug!(path = %path.display(), "prompt font loaded");
                    return Some(font);
                }
                Err(err) => warn!(path = %path.display(), %err, "unreadable font file"),
            },
            Err(_) => continue,
        }
    }
    None
}
