use crate::geometry::Point;
use crate::scene::{DrawingPlan, MarkerShape, Shape};
use crate::style::Style;

/// Square output canvas and the margins reserved around the plot area for
/// the title, tick labels and axis titles.
#[derive(Clone, Copy, Debug)]
pub struct CanvasOptions {
    pub size_px: u32,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl Default for CanvasOptions {
    // 3600 px is the reference deployment's 12 in figure at 300 dpi.
    fn default() -> Self {
        Self {
            size_px: 3600,
            margin_left: 340.0,
            margin_right: 100.0,
            margin_top: 200.0,
            margin_bottom: 280.0,
        }
    }
}

const GRID_COLOR: &str = "#dddddd";
const FRAME_COLOR: &str = "#333333";
const TEXT_COLOR: &str = "#333333";
const TICK_FONT_PX: f64 = 40.0;
const AXIS_FONT_PX: f64 = 46.0;
const TITLE_FONT_PX: f64 = 52.0;
const LEGEND_FONT_PX: f64 = 40.0;
const TICKS_PER_AXIS: usize = 8;

/// Builds the SVG document for a drawing plan: white background, equal-scale
/// viewport fitted around the plan's bounds, grid and tick labels, the
/// primitives in layer order, and a legend box in the top-right corner.
///
/// Pure string assembly; the same plan, style and options always produce an
/// identical document. Returns (svg, width_px, height_px).
pub fn build_scene_svg(plan: &DrawingPlan, style: &Style, opts: &CanvasOptions) -> (String, u32, u32) {
    let size = opts.size_px as f64;
    // An empty plan still renders; give it a unit viewport to scale around.
    let (mut min_x, mut min_y, mut max_x, mut max_y) =
        plan.bounds().unwrap_or((0.0, 0.0, 1.0, 1.0));
    if max_x - min_x <= 0.0 {
        min_x -= 0.5;
        max_x += 0.5;
    }
    if max_y - min_y <= 0.0 {
        min_y -= 0.5;
        max_y += 0.5;
    }
    let pad = 0.04 * (max_x - min_x).max(max_y - min_y);
    min_x -= pad;
    max_x += pad;
    min_y -= pad;
    max_y += pad;

    // Plot area in pixel space (y grows downward).
    let px0 = opts.margin_left;
    let px1 = size - opts.margin_right;
    let py0 = opts.margin_top;
    let py1 = size - opts.margin_bottom;

    // Equal scale on both axes: one data unit in X spans as many pixels as
    // one in Y, so the room and pipe angles keep their true shape.
    let scale = ((px1 - px0) / (max_x - min_x)).min((py1 - py0) / (max_y - min_y));
    let data_cx = (min_x + max_x) / 2.0;
    let data_cy = (min_y + max_y) / 2.0;
    let plot_cx = (px0 + px1) / 2.0;
    let plot_cy = (py0 + py1) / 2.0;
    let to_px = |p: Point| {
        (
            plot_cx + (p.x - data_cx) * scale,
            plot_cy - (p.y - data_cy) * scale,
        )
    };
    // Data range actually visible through the plot window, for grid ticks.
    let view_min_x = data_cx - (plot_cx - px0) / scale;
    let view_max_x = data_cx + (px1 - plot_cx) / scale;
    let view_min_y = data_cy - (py1 - plot_cy) / scale;
    let view_max_y = data_cy + (plot_cy - py0) / scale;

    let mut s = String::new();
    s.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    s.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" height=\"{0}\" viewBox=\"0 0 {0} {0}\" font-family=\"sans-serif\">\n",
        opts.size_px
    ));
    s.push_str("<rect x=\"0\" y=\"0\" width=\"100%\" height=\"100%\" fill=\"#ffffff\"/>\n");
    s.push_str(&format!(
        "<clipPath id=\"plot\"><rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"/></clipPath>\n",
        px0,
        py0,
        px1 - px0,
        py1 - py0
    ));

    // Grid and tick labels.
    let step_x = nice_step(view_max_x - view_min_x, TICKS_PER_AXIS);
    let step_y = nice_step(view_max_y - view_min_y, TICKS_PER_AXIS);
    let mut tick = (view_min_x / step_x).ceil() * step_x;
    while tick <= view_max_x {
        let (x, _) = to_px(Point::new(tick, 0.0));
        s.push_str(&format!(
            "<path d=\"M {x:.2} {py0:.2} L {x:.2} {py1:.2}\" stroke=\"{GRID_COLOR}\" stroke-width=\"2\"/>\n"
        ));
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" fill=\"{TEXT_COLOR}\" font-size=\"{TICK_FONT_PX}\">{}</text>\n",
            x,
            py1 + TICK_FONT_PX * 1.3,
            fmt_coord(tick)
        ));
        tick += step_x;
    }
    let mut tick = (view_min_y / step_y).ceil() * step_y;
    while tick <= view_max_y {
        let (_, y) = to_px(Point::new(0.0, tick));
        s.push_str(&format!(
            "<path d=\"M {px0:.2} {y:.2} L {px1:.2} {y:.2}\" stroke=\"{GRID_COLOR}\" stroke-width=\"2\"/>\n"
        ));
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"end\" fill=\"{TEXT_COLOR}\" font-size=\"{TICK_FONT_PX}\">{}</text>\n",
            px0 - 16.0,
            y + TICK_FONT_PX * 0.35,
            fmt_coord(tick)
        ));
        tick += step_y;
    }

    // Title and axis titles.
    s.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" fill=\"{TEXT_COLOR}\" font-size=\"{TITLE_FONT_PX}\">{}</text>\n",
        plot_cx,
        py0 - TITLE_FONT_PX,
        svg_escape(&style.title)
    ));
    s.push_str(&format!(
        "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" fill=\"{TEXT_COLOR}\" font-size=\"{AXIS_FONT_PX}\">{}</text>\n",
        plot_cx,
        py1 + TICK_FONT_PX * 1.3 + AXIS_FONT_PX * 1.6,
        svg_escape(&style.x_label)
    ));
    s.push_str(&format!(
        "<text x=\"{0:.2}\" y=\"{1:.2}\" text-anchor=\"middle\" fill=\"{TEXT_COLOR}\" font-size=\"{AXIS_FONT_PX}\" transform=\"rotate(-90 {0:.2} {1:.2})\">{2}</text>\n",
        px0 - TICK_FONT_PX * 4.2,
        plot_cy,
        svg_escape(&style.y_label)
    ));

    // Primitives, already in layer order, clipped to the plot area.
    s.push_str("<g clip-path=\"url(#plot)\">\n");
    for prim in plan.primitives() {
        draw_shape(&mut s, &prim.shape, style, &to_px);
    }
    s.push_str("</g>\n");

    // Plot frame above the primitives, matching the axes-on-top look.
    s.push_str(&format!(
        "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"none\" stroke=\"{FRAME_COLOR}\" stroke-width=\"3\"/>\n",
        px0,
        py0,
        px1 - px0,
        py1 - py0
    ));

    draw_legend(&mut s, plan, px1, py0);

    s.push_str("</svg>\n");
    (s, opts.size_px, opts.size_px)
}

fn draw_shape<F>(s: &mut String, shape: &Shape, style: &Style, to_px: &F)
where
    F: Fn(Point) -> (f64, f64),
{
    match shape {
        Shape::Fill {
            outline,
            color,
            opacity,
        } => {
            if let Some(d) = path_data(outline, to_px, true) {
                s.push_str(&format!(
                    "<path d=\"{d}\" fill=\"{color}\" fill-opacity=\"{opacity}\" stroke=\"none\"/>\n"
                ));
            }
        }
        Shape::PolyLine {
            points,
            color,
            width,
            opacity,
        } => {
            if let Some(d) = path_data(points, to_px, false) {
                s.push_str(&format!(
                    "<path d=\"{d}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"{width}\" stroke-opacity=\"{opacity}\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>\n"
                ));
            }
        }
        Shape::Marker { at, shape, color } => {
            let (x, y) = to_px(*at);
            let r = style.marker_radius;
            match shape {
                MarkerShape::Circle => {
                    s.push_str(&format!(
                        "<circle cx=\"{x:.2}\" cy=\"{y:.2}\" r=\"{r}\" fill=\"{color}\"/>\n"
                    ));
                }
                MarkerShape::Cross => {
                    let w = (r * 0.45).max(2.0);
                    s.push_str(&format!(
                        "<path d=\"M {:.2} {:.2} L {:.2} {:.2} M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"{color}\" stroke-width=\"{w}\" fill=\"none\"/>\n",
                        x - r,
                        y - r,
                        x + r,
                        y + r,
                        x - r,
                        y + r,
                        x + r,
                        y - r
                    ));
                }
            }
        }
        Shape::Text {
            at,
            content,
            color,
            offset_px,
        } => {
            let (x, y) = to_px(*at);
            s.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" fill=\"{color}\" font-size=\"{}\">{}</text>\n",
                x + offset_px[0],
                y - offset_px[1],
                style.annotation_size,
                svg_escape(content)
            ));
        }
    }
}

fn draw_legend(s: &mut String, plan: &DrawingPlan, plot_right: f64, plot_top: f64) {
    let entries = plan.legend_entries();
    if entries.is_empty() {
        return;
    }
    let row_h = LEGEND_FONT_PX * 1.7;
    let swatch_w = 70.0;
    let pad = 24.0;
    let max_chars = entries
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    // Char width heuristic for sans-serif at this size.
    let box_w = pad + swatch_w + 20.0 + max_chars as f64 * LEGEND_FONT_PX * 0.58 + pad;
    let box_h = pad * 2.0 + row_h * entries.len() as f64;
    let bx = plot_right - 30.0 - box_w;
    let by = plot_top + 30.0;
    s.push_str(&format!(
        "<rect x=\"{bx:.2}\" y=\"{by:.2}\" width=\"{box_w:.2}\" height=\"{box_h:.2}\" rx=\"10\" fill=\"#ffffff\" fill-opacity=\"0.9\" stroke=\"{FRAME_COLOR}\" stroke-width=\"2\"/>\n"
    ));
    for (i, (label, prim)) in entries.iter().enumerate() {
        let cy = by + pad + row_h * (i as f64 + 0.5);
        let sx = bx + pad;
        match &prim.shape {
            Shape::Fill { color, opacity, .. } => {
                s.push_str(&format!(
                    "<rect x=\"{sx:.2}\" y=\"{:.2}\" width=\"{swatch_w}\" height=\"{:.2}\" fill=\"{color}\" fill-opacity=\"{opacity}\" stroke=\"{FRAME_COLOR}\" stroke-width=\"1\"/>\n",
                    cy - LEGEND_FONT_PX * 0.5,
                    LEGEND_FONT_PX
                ));
            }
            Shape::PolyLine { color, width, .. } => {
                s.push_str(&format!(
                    "<path d=\"M {sx:.2} {cy:.2} L {:.2} {cy:.2}\" stroke=\"{color}\" stroke-width=\"{width}\"/>\n",
                    sx + swatch_w
                ));
            }
            Shape::Marker { shape, color, .. } => {
                let mx = sx + swatch_w / 2.0;
                let r = LEGEND_FONT_PX * 0.35;
                match shape {
                    MarkerShape::Circle => s.push_str(&format!(
                        "<circle cx=\"{mx:.2}\" cy=\"{cy:.2}\" r=\"{r:.2}\" fill=\"{color}\"/>\n"
                    )),
                    MarkerShape::Cross => s.push_str(&format!(
                        "<path d=\"M {:.2} {:.2} L {:.2} {:.2} M {:.2} {:.2} L {:.2} {:.2}\" stroke=\"{color}\" stroke-width=\"4\" fill=\"none\"/>\n",
                        mx - r,
                        cy - r,
                        mx + r,
                        cy + r,
                        mx - r,
                        cy + r,
                        mx + r,
                        cy - r
                    )),
                }
            }
            Shape::Text { color, .. } => {
                s.push_str(&format!(
                    "<circle cx=\"{:.2}\" cy=\"{cy:.2}\" r=\"6\" fill=\"{color}\"/>\n",
                    sx + swatch_w / 2.0
                ));
            }
        }
        s.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" fill=\"{TEXT_COLOR}\" font-size=\"{LEGEND_FONT_PX}\">{}</text>\n",
            sx + swatch_w + 20.0,
            cy + LEGEND_FONT_PX * 0.35,
            svg_escape(label)
        ));
    }
}

fn path_data<F>(pts: &[Point], to_px: &F, close: bool) -> Option<String>
where
    F: Fn(Point) -> (f64, f64),
{
    let first = pts.first()?;
    let (x0, y0) = to_px(*first);
    let mut d = format!("M {x0:.2} {y0:.2}");
    for p in &pts[1..] {
        let (x, y) = to_px(*p);
        d.push_str(&format!(" L {x:.2} {y:.2}"));
    }
    if close {
        d.push_str(" Z");
    }
    Some(d)
}

/// Largest 1/2/5 x 10^k step that yields at least `target` ticks over `range`.
fn nice_step(range: f64, target: usize) -> f64 {
    let raw = range / target.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let factor = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    factor * mag
}

// Near-integers print without decimals, everything else with up to two,
// trailing zeros trimmed.
fn fmt_coord(v: f64) -> String {
    if (v - v.round()).abs() < 1e-6 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

fn svg_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
