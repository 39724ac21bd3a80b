//! # TrussView Component
//!
//! 3D view of the newest geometry in the store, drawn on a Braille canvas.
//!
//! ## Data flow
//!
//! ```text
//! ConversationStore ──revision changed──▶ TrussViewState::sync
//!                                            │ latest() has geometry?
//!                                            ▼
//!                                   core::plot::build_scene
//!                                            │ Ok → replace scene
//!                                            │ Err → warn, keep last scene
//!                                            ▼
//!                                  TrussView::render (projection)
//! ```
//!
//! ## Projection
//!
//! Orthographic, camera orbiting the centre of the padded axis box. `y` is
//! the vertical (height) axis. Azimuth turns around `y`, elevation tilts the
//! camera above the `x`/`z` plane. Braille dots are square, so the canvas
//! bounds are stretched to match the panel's physical aspect ratio
//! (one cell is about twice as tall as it is wide).
//!
//! ## Failures
//!
//! Drawing runs under [`catch_panic`]. A panic is logged, the panel goes
//! back to the last scene that drew cleanly (or the placeholder) and the
//! rest of the UI is unaffected.

use log::{debug, error, warn};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as Segment, Points};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};

use crate::api::Point3;
use crate::core::plot::{Scene, build_scene};
use crate::core::store::ConversationStore;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::error_boundary::catch_panic;
use crate::tui::event::TuiEvent;

pub const DEFAULT_AZIMUTH: f64 = 30.0;
pub const DEFAULT_ELEVATION: f64 = 20.0;
const ROTATE_STEP: f64 = 15.0;
const TILT_STEP: f64 = 10.0;
const MAX_ELEVATION: f64 = 89.0;
/// Terminal cell height divided by width.
const CELL_ASPECT: f64 = 2.0;

pub const PLACEHOLDER: &str = "No truss yet. Describe one in the chat to see it here.";
const TOO_LARGE: &str = "Geometry is too large to draw at this size.";

/// Camera orientation in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewAngles {
    pub azimuth: f64,
    pub elevation: f64,
}

impl Default for ViewAngles {
    fn default() -> Self {
        Self {
            azimuth: DEFAULT_AZIMUTH,
            elevation: DEFAULT_ELEVATION,
        }
    }
}

impl ViewAngles {
    fn rotate(&mut self, degrees: f64) {
        self.azimuth = (self.azimuth + degrees).rem_euclid(360.0);
    }

    fn tilt(&mut self, degrees: f64) {
        self.elevation = (self.elevation + degrees).clamp(-MAX_ELEVATION, MAX_ELEVATION);
    }
}

/// Screen-plane coordinates of `point` seen from `angles`, relative to `center`.
pub fn project(point: Point3, center: Point3, angles: ViewAngles) -> (f64, f64) {
    let (x, y, z) = (point.x - center.x, point.y - center.y, point.z - center.z);
    let (sin_az, cos_az) = angles.azimuth.to_radians().sin_cos();
    let (sin_el, cos_el) = angles.elevation.to_radians().sin_cos();

    let screen_x = x * cos_az + z * sin_az;
    // Positive depth points toward the camera
    let depth = z * cos_az - x * sin_az;
    let screen_y = y * cos_el - depth * sin_el;
    (screen_x, screen_y)
}

/// Canvas bounds holding every corner of the axis box, widened on one axis so
/// that one unit covers the same physical distance horizontally and vertically.
pub fn fit_bounds(scene: &Scene, angles: ViewAngles, area: Rect) -> ([f64; 2], [f64; 2]) {
    let layout = &scene.layout;
    let center = Point3::new(layout.x.center(), layout.y.center(), layout.z.center());

    let mut min = (f64::INFINITY, f64::INFINITY);
    let mut max = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for x in [layout.x.min, layout.x.max] {
        for y in [layout.y.min, layout.y.max] {
            for z in [layout.z.min, layout.z.max] {
                let (sx, sy) = project(Point3::new(x, y, z), center, angles);
                min = (min.0.min(sx), min.1.min(sy));
                max = (max.0.max(sx), max.1.max(sy));
            }
        }
    }

    let mut span_x = (max.0 - min.0).max(f64::EPSILON);
    let mut span_y = (max.1 - min.1).max(f64::EPSILON);
    let physical = f64::from(area.width.max(1)) / (f64::from(area.height.max(1)) * CELL_ASPECT);
    if span_x / span_y < physical {
        span_x = span_y * physical;
    } else {
        span_y = span_x / physical;
    }

    let mid = ((min.0 + max.0) / 2.0, (min.1 + max.1) / 2.0);
    (
        [mid.0 - span_x / 2.0, mid.0 + span_x / 2.0],
        [mid.1 - span_y / 2.0, mid.1 + span_y / 2.0],
    )
}

/// Persistent state: the scene being shown and the camera.
pub struct TrussViewState {
    seen_revision: Option<u64>,
    scene: Option<Scene>,
    /// Last scene that drew without panicking.
    last_drawn: Option<Scene>,
    /// `scene` has been drawn since it was replaced.
    scene_drawn: bool,
    pub angles: ViewAngles,
}

impl Default for TrussViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl TrussViewState {
    pub fn new() -> Self {
        Self {
            seen_revision: None,
            scene: None,
            last_drawn: None,
            scene_drawn: true,
            angles: ViewAngles::default(),
        }
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Rebuild the scene if the store changed and its newest entry carries
    /// geometry. Returns true when the scene was replaced.
    pub fn sync(&mut self, store: &ConversationStore) -> bool {
        let revision = store.revision();
        if self.seen_revision == Some(revision) {
            return false;
        }
        self.seen_revision = Some(revision);

        let Some(geometry) = store
            .latest()
            .and_then(|entry| entry.truss_data.as_ref())
            .filter(|g| !g.is_empty())
        else {
            return false;
        };

        match build_scene(geometry) {
            Ok(scene) => {
                if scene.skipped_elements > 0 {
                    warn!(
                        "Skipped {} element(s) with out-of-range node indices",
                        scene.skipped_elements
                    );
                }
                debug!(
                    "Scene rebuilt at revision {}: {} nodes, {} segments",
                    revision,
                    scene.points.len(),
                    scene.segment_count()
                );
                self.scene = Some(scene);
                self.scene_drawn = false;
                true
            }
            Err(e) => {
                warn!("Keeping previous scene: {}", e);
                false
            }
        }
    }

    fn mark_drawn(&mut self) {
        if !self.scene_drawn {
            self.last_drawn = self.scene.clone();
            self.scene_drawn = true;
        }
    }

    fn fall_back(&mut self) {
        self.scene = self.last_drawn.take();
        self.scene_drawn = false;
    }
}

impl EventHandler for TrussViewState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::RotateLeft => self.angles.rotate(-ROTATE_STEP),
            TuiEvent::RotateRight => self.angles.rotate(ROTATE_STEP),
            TuiEvent::TiltUp => self.angles.tilt(TILT_STEP),
            TuiEvent::TiltDown => self.angles.tilt(-TILT_STEP),
            TuiEvent::ResetView => self.angles = ViewAngles::default(),
            _ => return None,
        }
        Some(())
    }
}

fn legend(scene: &Scene, angles: ViewAngles) -> Vec<Line<'static>> {
    let mut counts = vec![
        Span::styled("● ", Style::default().fg(Color::Blue)),
        Span::raw(format!("{} nodes  ", scene.points.len())),
        Span::styled("─ ", Style::default().fg(Color::Red)),
        Span::raw(format!("{} elements", scene.segment_count())),
    ];
    if scene.skipped_elements > 0 {
        counts.push(Span::styled(
            format!("  ({} skipped)", scene.skipped_elements),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(ref material) = scene.material {
        counts.push(Span::raw(format!("  material: {material}")));
    }
    if scene.support_count > 0 || scene.load_count > 0 {
        counts.push(Span::raw(format!(
            "  supports: {}  loads: {}",
            scene.support_count, scene.load_count
        )));
    }

    let l = &scene.layout;
    let ranges = format!(
        "length x [{:.1}, {:.1}]  height y [{:.1}, {:.1}]  width z [{:.1}, {:.1}]  az {:.0}° el {:.0}°",
        l.x.min, l.x.max, l.y.min, l.y.max, l.z.min, l.z.max, angles.azimuth, angles.elevation
    );
    vec![
        Line::from(counts),
        Line::styled(ranges, Style::default().fg(Color::DarkGray)),
    ]
}

pub struct TrussView<'a> {
    pub state: &'a mut TrussViewState,
}

impl<'a> TrussView<'a> {
    pub fn new(state: &'a mut TrussViewState) -> Self {
        Self { state }
    }
}

impl Component for TrussView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        render_isolated(&mut *self.state, frame, area, draw_view);
    }
}

/// Draw with `draw`, recovering from a panic inside this panel.
pub(crate) fn render_isolated<F>(
    state: &mut TrussViewState,
    frame: &mut Frame,
    area: Rect,
    draw: F,
) where
    F: Fn(&TrussViewState, &mut Frame, Rect),
{
    loop {
        match catch_panic(|| draw(&*state, &mut *frame, area)) {
            Ok(()) => {
                state.mark_drawn();
                return;
            }
            Err(message) if state.scene.is_some() => {
                error!("3D view failed to draw, falling back: {}", message);
                frame.render_widget(Clear, area);
                state.fall_back();
            }
            Err(message) => {
                error!("3D view failed to draw its placeholder: {}", message);
                frame.render_widget(Clear, area);
                return;
            }
        }
    }
}

fn draw_placeholder(block: Block, frame: &mut Frame, area: Rect, text: &'static str) {
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let middle = Rect::new(
        inner.x,
        inner.y + inner.height / 2,
        inner.width,
        inner.height - inner.height / 2,
    );
    let placeholder = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC));
    frame.render_widget(placeholder, middle);
}

fn draw_view(state: &TrussViewState, frame: &mut Frame, area: Rect) {
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" 3D view (Alt+arrows rotate, Alt+Home reset) ");

    let Some(scene) = state.scene.as_ref() else {
        draw_placeholder(block, frame, area, PLACEHOLDER);
        return;
    };

    let block = block.title_bottom(
        Line::from(scene.layout.title.clone())
            .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
            .centered(),
    );

    let angles = state.angles;
    let [canvas_area, legend_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(2)]).areas(block.inner(area));
    let (x_bounds, y_bounds) = fit_bounds(scene, angles, canvas_area);
    if !x_bounds.iter().chain(&y_bounds).all(|v| v.is_finite()) {
        warn!("Canvas bounds overflow: {:?} {:?}", x_bounds, y_bounds);
        draw_placeholder(block, frame, area, TOO_LARGE);
        return;
    }
    frame.render_widget(block, area);

    let center = Point3::new(
        scene.layout.x.center(),
        scene.layout.y.center(),
        scene.layout.z.center(),
    );
    let label_lift = (y_bounds[1] - y_bounds[0]) / f64::from(canvas_area.height.max(1));

    let segments: Vec<((f64, f64), (f64, f64))> = scene
        .lines
        .segments()
        .into_iter()
        .map(|(a, b)| (project(a, center, angles), project(b, center, angles)))
        .collect();
    let markers: Vec<((f64, f64), String)> = scene
        .points
        .markers()
        .map(|(p, label)| (project(p, center, angles), label.to_string()))
        .collect();
    let coords: Vec<(f64, f64)> = markers.iter().map(|(xy, _)| *xy).collect();

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            for &((x1, y1), (x2, y2)) in &segments {
                ctx.draw(&Segment::new(x1, y1, x2, y2, Color::Red));
            }
            ctx.layer();
            ctx.draw(&Points {
                coords: &coords,
                color: Color::Blue,
            });
            for ((x, y), label) in &markers {
                ctx.print(
                    *x,
                    *y + label_lift,
                    Span::styled(label.clone(), Style::default().fg(Color::Cyan)),
                );
            }
        });
    frame.render_widget(canvas, canvas_area);
    frame.render_widget(Paragraph::new(legend(scene, angles)), legend_area);
}
