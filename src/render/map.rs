//! # Coverage Map
//!
//! Draws one placement into a square raster:
//! - a translucent coverage disk around every router
//! - router-to-router links from the connectivity graph
//! - client markers, then router markers on top
//! - the plotting frame for `[0, area_size]²` with tick labels
//! - a legend and the title
//!
//! ## Coordinate Mapping
//!
//! World coordinates are mapped linearly onto a square plot area inside the
//! image. The world y axis points up, so it is flipped against the raster's
//! downward y axis.
//!
//! The data layers are painted back to front, then everything outside the
//! plot area is cleared before the frame and labels go on. The output only
//! depends on the inputs.

use image::{GrayImage, Luma, Pixel, Rgba, RgbaImage};
use imageproc::drawing::{
    Blend, draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
    draw_polygon_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;

use super::text::Labeler;
use crate::common::{OptimizationResult, Point2D, RenderConfig};
use crate::topology::ConnectivityGraph;

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const FRAME_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
/// Pink at 40% opacity.
pub const COVERAGE_COLOR: Rgba<u8> = Rgba([255, 192, 203, 102]);
pub const LINK_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const ROUTER_COLOR: Rgba<u8> = Rgba([0, 0, 255, 255]);
pub const CLIENT_COLOR: Rgba<u8> = Rgba([0, 128, 0, 255]);
const LEGEND_FILL: Rgba<u8> = Rgba([255, 255, 255, 204]);
const LEGEND_BORDER: Rgba<u8> = Rgba([204, 204, 204, 255]);

pub const ROUTER_LABEL: &str = "Mesh Routers";
pub const CLIENT_LABEL: &str = "Mesh Clients";

const MASK_SET: Luma<u8> = Luma([255]);

/// Coverage disks with a center or radius beyond this many pixels are not drawn
/// unless they cover the whole plot area.
const MAX_PIXEL_EXTENT: f64 = 1.0e6;

/// Number of tick intervals along each axis.
const TICK_INTERVALS: u32 = 4;

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PixelRect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Distance from (`x`, `y`) to the nearest point of the rectangle.
    fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = (self.left - x).max(x - self.right).max(0.0);
        let dy = (self.top - y).max(y - self.bottom).max(0.0);
        dx.hypot(dy)
    }

    /// Distance from (`x`, `y`) to the farthest corner.
    fn farthest_corner(&self, x: f64, y: f64) -> f64 {
        let dx = (x - self.left).abs().max((x - self.right).abs());
        let dy = (y - self.top).abs().max((y - self.bottom).abs());
        dx.hypot(dy)
    }

    /// Snap to whole pixels; `None` when nothing is left.
    fn to_rect(self) -> Option<Rect> {
        let x = self.left.round() as i32;
        let y = self.top.round() as i32;
        let width = self.right.round() as i32 - x;
        let height = self.bottom.round() as i32 - y;
        (width > 0 && height > 0).then(|| Rect::at(x, y).of_size(width as u32, height as u32))
    }
}

/// Placement of the square plot area inside the image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotLayout {
    image_size: u32,
    area_size: f64,
    plot: PixelRect,
}

impl PlotLayout {
    pub fn new(image_size: u32, area_size: f64) -> Self {
        let size = image_size as f64;
        let left = (size * 0.12).round();
        let top = (size * 0.10).round();
        let side = (size * 0.80).round();
        Self {
            image_size,
            area_size,
            plot: PixelRect::new(left, top, left + side, top + side),
        }
    }

    pub fn plot_rect(&self) -> PixelRect {
        self.plot
    }

    /// Map a world point to pixel coordinates.
    pub fn to_pixel(&self, p: &Point2D) -> (f64, f64) {
        let x = self.plot.left + p.x / self.area_size * self.plot.width();
        let y = self.plot.bottom - p.y / self.area_size * self.plot.height();
        (x, y)
    }

    /// Convert a world length (e.g. a radius) to pixels.
    pub fn length_to_pixels(&self, length: f64) -> f64 {
        length / self.area_size * self.plot.width()
    }

    fn size(&self) -> f64 {
        self.image_size as f64
    }

    pub fn router_radius(&self) -> f64 {
        (self.size() / 200.0).max(2.0)
    }

    pub fn client_half_edge(&self) -> f64 {
        (self.size() / 240.0).max(2.0)
    }

    pub fn link_width(&self) -> f64 {
        (self.size() / 900.0).max(1.5)
    }

    fn frame_width(&self) -> i32 {
        (self.size() / 900.0).max(1.0).round() as i32
    }

    fn title_px(&self) -> f32 {
        (self.size() / 40.0).max(10.0) as f32
    }

    fn label_px(&self) -> f32 {
        (self.size() / 60.0).max(8.0) as f32
    }
}

fn whole(v: f64) -> i32 {
    v.round() as i32
}

/// Rasterize `result` into a new image.
///
/// Zero routers or zero clients are regular inputs; the corresponding
/// layers are simply empty.
pub fn draw(result: &OptimizationResult, graph: &ConnectivityGraph, config: &RenderConfig) -> RgbaImage {
    let layout = PlotLayout::new(config.image_size, config.area_size);
    let labeler = Labeler::new();
    let mut image = RgbaImage::from_pixel(config.image_size, config.image_size, BACKGROUND);

    draw_coverage(&mut image, &layout, &result.routers, config.coverage_radius);
    draw_links(&mut image, &layout, &result.routers, graph);
    draw_clients(&mut image, &layout, &result.clients);
    draw_routers(&mut image, &layout, &result.routers);
    clear_margins(&mut image, &layout);

    draw_frame(&mut image, &layout, &labeler, config.area_size);
    let mut image = draw_legend(image, &layout, &labeler);
    draw_title(&mut image, &layout, &labeler, &config.title);

    image
}

/// Paint everything outside the plot area with the background.
fn clear_margins(image: &mut RgbaImage, layout: &PlotLayout) {
    let plot = layout.plot_rect();
    let size = layout.size();
    let margins = [
        PixelRect::new(0.0, 0.0, size, plot.top),
        PixelRect::new(0.0, plot.bottom, size, size),
        PixelRect::new(0.0, plot.top, plot.left, plot.bottom),
        PixelRect::new(plot.right, plot.top, size, plot.bottom),
    ];
    for rect in margins.into_iter().filter_map(PixelRect::to_rect) {
        draw_filled_rect_mut(image, rect, BACKGROUND);
    }
}

/// Frame around the plot area with tick marks and labels on both axes.
fn draw_frame(image: &mut RgbaImage, layout: &PlotLayout, labeler: &Labeler, area_size: f64) {
    let plot = layout.plot_rect();
    let frame_width = layout.frame_width();
    let (left, top) = (whole(plot.left), whole(plot.top));
    let (right, bottom) = (whole(plot.right), whole(plot.bottom));
    for k in 1..=frame_width {
        let side = (right - left + 2 * k) as u32;
        draw_hollow_rect_mut(image, Rect::at(left - k, top - k).of_size(side, side), FRAME_COLOR);
    }

    let px = layout.label_px();
    let tick_len = whole(px as f64 / 2.0).max(1);
    let gap = whole(px as f64 / 3.0);

    for step in 0..=TICK_INTERVALS {
        let value = area_size * step as f64 / TICK_INTERVALS as f64;
        let label = format_tick(value);
        let (label_width, label_height) = labeler.size(&label, px);
        let (label_width, label_height) = (label_width as i32, label_height as i32);
        let (x, y) = layout.to_pixel(&Point2D::new(value, value));
        let (x, y) = (whole(x), whole(y));

        // X axis, below the frame
        let x_tick_top = bottom + frame_width;
        let tick = Rect::at(x - frame_width / 2, x_tick_top).of_size(frame_width as u32, tick_len as u32);
        draw_filled_rect_mut(image, tick, FRAME_COLOR);
        labeler.draw(image, x - label_width / 2, x_tick_top + tick_len + gap, px, &label, TEXT_COLOR);

        // Y axis, left of the frame
        let y_tick_right = left - frame_width;
        let tick = Rect::at(y_tick_right - tick_len, y - frame_width / 2).of_size(tick_len as u32, frame_width as u32);
        draw_filled_rect_mut(image, tick, FRAME_COLOR);
        let label_right = y_tick_right - tick_len - gap;
        labeler.draw(image, label_right - label_width, y - label_height / 2, px, &label, TEXT_COLOR);
    }
}

/// Tick values: integers without decimals, everything else with up to two.
pub fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        let text = format!("{:.2}", value);
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

fn draw_coverage(image: &mut RgbaImage, layout: &PlotLayout, routers: &[Point2D], coverage_radius: f64) {
    let plot = layout.plot_rect();
    let radius = layout.length_to_pixels(coverage_radius);
    for router in routers {
        let (x, y) = layout.to_pixel(router);
        if plot.distance_to(x, y) > radius {
            continue;
        }
        let covers_plot = plot.farthest_corner(x, y) <= radius;
        if !covers_plot && x.abs().max(y.abs()).max(radius) > MAX_PIXEL_EXTENT {
            log::debug!("Skipping coverage disk at ({:.1}, {:.1}) px, radius {:.1} px", x, y, radius);
            continue;
        }
        if let Some((origin, mask)) = disk_mask(&plot, (x, y), radius, covers_plot) {
            blend_mask(image, origin, &mask, COVERAGE_COLOR);
        }
    }
}

/// Mask of the disk's pixels inside the plot area, with the mask's top-left corner.
fn disk_mask(plot: &PixelRect, (x, y): (f64, f64), radius: f64, covers_plot: bool) -> Option<((u32, u32), GrayImage)> {
    let (left, top) = (whole(plot.left), whole(plot.top));
    let (right, bottom) = (whole(plot.right) - 1, whole(plot.bottom) - 1);
    if covers_plot {
        let mask = GrayImage::from_pixel((right - left + 1) as u32, (bottom - top + 1) as u32, MASK_SET);
        return Some(((left as u32, top as u32), mask));
    }

    let (cx, cy, r) = (whole(x), whole(y), whole(radius));
    let (x0, y0) = ((cx - r).max(left), (cy - r).max(top));
    let (x1, y1) = ((cx + r).min(right), (cy + r).min(bottom));
    if x1 < x0 || y1 < y0 {
        return None;
    }
    let mut mask = GrayImage::new((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32);
    draw_filled_circle_mut(&mut mask, (cx - x0, cy - y0), r, MASK_SET);
    Some(((x0 as u32, y0 as u32), mask))
}

/// Blend `color` once onto every pixel set in `mask`.
fn blend_mask(image: &mut RgbaImage, (ox, oy): (u32, u32), mask: &GrayImage, color: Rgba<u8>) {
    for (mx, my, m) in mask.enumerate_pixels() {
        if m[0] == 0 {
            continue;
        }
        if let Some(pixel) = image.get_pixel_mut_checked(ox + mx, oy + my) {
            pixel.blend(&color);
        }
    }
}

fn draw_links(image: &mut RgbaImage, layout: &PlotLayout, routers: &[Point2D], graph: &ConnectivityGraph) {
    let width = layout.link_width();
    for &(i, j) in graph.edges() {
        let (Some(a), Some(b)) = (routers.get(i), routers.get(j)) else {
            log::warn!("Skipping link ({}, {}) outside the router list", i, j);
            continue;
        };
        draw_link(image, layout.to_pixel(a), layout.to_pixel(b), width);
    }
}

/// Segment of `width` pixels with flat ends, filled as a quadrilateral.
fn draw_link(image: &mut RgbaImage, a: (f64, f64), b: (f64, f64), width: f64) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let length = dx.hypot(dy);
    if length >= width {
        let (nx, ny) = (-dy / length * width / 2.0, dx / length * width / 2.0);
        let corner = |(x, y): (f64, f64), side: f64| Point::new(whole(x + side * nx), whole(y + side * ny));
        let quad = [corner(a, 1.0), corner(b, 1.0), corner(b, -1.0), corner(a, -1.0)];
        // A closed ring is not a valid polygon
        if quad[0] != quad[3] {
            draw_polygon_mut(image, &quad, LINK_COLOR);
            return;
        }
    }
    draw_line_segment_mut(image, (a.0 as f32, a.1 as f32), (b.0 as f32, b.1 as f32), LINK_COLOR);
}

/// Skip markers that cannot reach the plot area.
fn marker_center(layout: &PlotLayout, p: &Point2D, extent: f64) -> Option<(i32, i32)> {
    let (x, y) = layout.to_pixel(p);
    (layout.plot_rect().distance_to(x, y) <= extent).then(|| (whole(x), whole(y)))
}

fn client_marker(image: &mut RgbaImage, (x, y): (i32, i32), half: f64) {
    let half = whole(half);
    let side = (2 * half).max(1) as u32;
    draw_filled_rect_mut(image, Rect::at(x - half, y - half).of_size(side, side), CLIENT_COLOR);
}

fn draw_clients(image: &mut RgbaImage, layout: &PlotLayout, clients: &[Point2D]) {
    let half = layout.client_half_edge();
    for center in clients.iter().filter_map(|c| marker_center(layout, c, 2.0 * half)) {
        client_marker(image, center, half);
    }
}

fn draw_routers(image: &mut RgbaImage, layout: &PlotLayout, routers: &[Point2D]) {
    let radius = layout.router_radius();
    for center in routers.iter().filter_map(|r| marker_center(layout, r, radius)) {
        draw_filled_circle_mut(image, center, whole(radius), ROUTER_COLOR);
    }
}

/// Legend box in the top-right corner of the plot area.
fn draw_legend(image: RgbaImage, layout: &PlotLayout, labeler: &Labeler) -> RgbaImage {
    let plot = layout.plot_rect();
    let px = layout.label_px();
    let (router_width, text_height) = labeler.size(ROUTER_LABEL, px);
    let (client_width, _) = labeler.size(CLIENT_LABEL, px);
    let text_height = text_height as f64;
    let padding = (px as f64 / 2.0).round();
    let marker_slot = (layout.router_radius() * 2.0).max(text_height);
    let row_height = marker_slot + padding;
    let label_width = router_width.max(client_width) as f64;

    let width = padding + marker_slot + padding + label_width + padding;
    let height = padding + 2.0 * row_height;
    let right = plot.right - padding;
    let top = plot.top + padding;
    let frame = PixelRect::new(right - width, top, right, top + height);
    let Some(rect) = frame.to_rect() else {
        return image;
    };

    let mut canvas = Blend(image);
    draw_filled_rect_mut(&mut canvas, rect, LEGEND_FILL);
    let mut image = canvas.0;
    draw_hollow_rect_mut(&mut image, rect, LEGEND_BORDER);

    let marker_x = whole(frame.left + padding + marker_slot / 2.0);
    let text_x = whole(frame.left + padding + marker_slot + padding);

    let router_y = frame.top + padding + marker_slot / 2.0;
    draw_filled_circle_mut(&mut image, (marker_x, whole(router_y)), whole(layout.router_radius()), ROUTER_COLOR);
    labeler.draw(&mut image, text_x, whole(router_y - text_height / 2.0), px, ROUTER_LABEL, TEXT_COLOR);

    let client_y = router_y + row_height;
    client_marker(&mut image, (marker_x, whole(client_y)), layout.client_half_edge());
    labeler.draw(&mut image, text_x, whole(client_y - text_height / 2.0), px, CLIENT_LABEL, TEXT_COLOR);

    image
}

/// Title centered above the plot area.
fn draw_title(image: &mut RgbaImage, layout: &PlotLayout, labeler: &Labeler, title: &str) {
    let plot = layout.plot_rect();
    let px = layout.title_px();
    let (width, height) = labeler.size(title, px);
    let x = plot.left + (plot.width() - width as f64) / 2.0;
    let y = (plot.top - height as f64) / 2.0;
    labeler.draw(image, whole(x), whole(y), px, title, TEXT_COLOR);
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: u32 = 200;

    fn config(coverage_radius: f64, comm_radius: f64) -> RenderConfig {
        RenderConfig {
            coverage_radius,
            comm_radius,
            image_size: SIZE,
            ..RenderConfig::default()
        }
    }

    fn placement(routers: &[(f64, f64)], clients: &[(f64, f64)]) -> OptimizationResult {
        OptimizationResult {
            routers: routers.iter().map(|&(x, y)| Point2D::new(x, y)).collect(),
            clients: clients.iter().map(|&(x, y)| Point2D::new(x, y)).collect(),
            best_fitness: 0.0,
            sgc: 0,
            ncmc: 0,
            ncmcpr: 0.0,
        }
    }

    fn render(result: &OptimizationResult, config: &RenderConfig) -> (RgbaImage, PlotLayout) {
        let graph = ConnectivityGraph::build(&result.routers, config.comm_radius);
        (draw(result, &graph, config), PlotLayout::new(config.image_size, config.area_size))
    }

    fn pixel_at(image: &RgbaImage, layout: &PlotLayout, x: f64, y: f64) -> Rgba<u8> {
        let (px, py) = layout.to_pixel(&Point2D::new(x, y));
        *image.get_pixel(px.floor() as u32, py.floor() as u32)
    }

    #[test]
    fn layout_maps_corners_and_flips_y() {
        let layout = PlotLayout::new(SIZE, 32.0);
        let plot = layout.plot_rect();
        assert_eq!(layout.to_pixel(&Point2D::new(0.0, 0.0)), (plot.left, plot.bottom));
        assert_eq!(layout.to_pixel(&Point2D::new(32.0, 32.0)), (plot.right, plot.top));
        assert_eq!(layout.length_to_pixels(32.0), plot.width());
    }

    #[test]
    fn empty_placement_draws_only_decorations() {
        let config = config(4.5, 4.5);
        let (image, layout) = render(&placement(&[], &[]), &config);
        assert_eq!(image.dimensions(), (SIZE, SIZE));
        // Plot center stays background
        assert_eq!(pixel_at(&image, &layout, 16.0, 16.0), BACKGROUND);
        // Frame is drawn just outside the plot area
        let plot = layout.plot_rect();
        assert_eq!(*image.get_pixel(plot.left as u32 - 1, (plot.top + plot.height() / 2.0) as u32), FRAME_COLOR);
        // Legend markers are present even without data
        assert!(image.pixels().any(|p| *p == ROUTER_COLOR));
        assert!(image.pixels().any(|p| *p == CLIENT_COLOR));
    }

    #[test]
    fn markers_disks_and_links_use_their_colors() {
        let config = config(4.5, 4.5);
        let (image, layout) = render(&placement(&[(16.0, 16.0)], &[(6.0, 6.0)]), &config);

        assert_eq!(pixel_at(&image, &layout, 16.0, 16.0), ROUTER_COLOR);
        assert_eq!(pixel_at(&image, &layout, 6.0, 6.0), CLIENT_COLOR);

        // Inside the coverage disk but away from the marker: pink over white
        let disk = pixel_at(&image, &layout, 18.0, 16.0);
        assert_eq!(disk[0], 255);
        assert!((229..=231).contains(&disk[1]), "{:?}", disk);
        assert!((233..=235).contains(&disk[2]), "{:?}", disk);
    }

    #[test]
    fn overlapping_disks_are_darker() {
        let config = config(4.5, 1.0);
        let (image, layout) = render(&placement(&[(14.0, 16.0), (18.0, 16.0)], &[]), &config);
        let single = pixel_at(&image, &layout, 11.0, 16.0);
        let overlap = pixel_at(&image, &layout, 16.0, 17.0);
        assert!(overlap[1] < single[1], "{:?} vs {:?}", overlap, single);
    }

    #[test]
    fn links_follow_the_graph() {
        let linked = config(1.0, 20.0);
        let (image, layout) = render(&placement(&[(8.0, 16.0), (24.0, 16.0)], &[]), &linked);
        assert_eq!(pixel_at(&image, &layout, 16.0, 16.0), LINK_COLOR);

        let unlinked = config(1.0, 4.5);
        let (image, layout) = render(&placement(&[(8.0, 16.0), (24.0, 16.0)], &[]), &unlinked);
        assert_eq!(pixel_at(&image, &layout, 16.0, 16.0), BACKGROUND);
    }

    #[test]
    fn routers_are_painted_above_clients() {
        let config = config(4.5, 4.5);
        let (image, layout) = render(&placement(&[(10.0, 10.0)], &[(10.0, 10.0)]), &config);
        assert_eq!(pixel_at(&image, &layout, 10.0, 10.0), ROUTER_COLOR);
    }

    #[test]
    fn disks_are_clipped_to_the_plot_area() {
        let config = config(10.0, 4.5);
        let (image, layout) = render(&placement(&[(0.0, 15.0)], &[]), &config);
        let plot = layout.plot_rect();
        let (_, y) = layout.to_pixel(&Point2D::new(0.0, 15.0));
        // Left of the frame stays background although the disk extends there
        assert_eq!(*image.get_pixel(plot.left as u32 - 4, y as u32), BACKGROUND);
    }

    #[test]
    fn disk_larger_than_the_plot_tints_every_corner_once() {
        let config = config(1000.0, 4.5);
        let (image, layout) = render(&placement(&[(16.0, 16.0)], &[]), &config);
        let near = pixel_at(&image, &layout, 0.5, 0.5);
        let far = pixel_at(&image, &layout, 31.5, 31.5);
        assert_eq!(near, far);
        assert!((229..=231).contains(&near[1]), "{:?}", near);
    }

    #[test]
    fn title_is_drawn_above_the_plot() {
        let config = config(4.5, 4.5);
        let (image, layout) = render(&placement(&[], &[]), &config);
        // Upper part of the top margin, clear of the highest y-axis label
        let rows = (layout.plot_rect().top * 0.6) as u32;
        assert!((0..rows).any(|y| (0..SIZE).any(|x| *image.get_pixel(x, y) != BACKGROUND)));

        let untitled = RenderConfig {
            title: String::new(),
            ..config.clone()
        };
        let (blank, _) = render(&placement(&[], &[]), &untitled);
        assert!((0..rows).all(|y| (0..SIZE).all(|x| *blank.get_pixel(x, y) == BACKGROUND)));
    }

    #[test]
    fn rendering_is_deterministic() {
        let config = config(4.5, 4.5);
        let result = placement(&[(3.0, 4.0), (6.0, 8.0), (20.0, 2.5)], &[(1.0, 1.0), (30.0, 31.0)]);
        let (a, _) = render(&result, &config);
        let (b, _) = render(&result, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn tick_labels_are_trimmed() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(8.0), "8");
        assert_eq!(format_tick(2.5), "2.5");
        assert_eq!(format_tick(1.25), "1.25");
    }
}
