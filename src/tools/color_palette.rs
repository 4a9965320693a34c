use std::f32::consts::TAU;

use egui::ecolor::{Hsva, hsv_from_rgb, rgb_from_hsv};
use egui::{
    Align2, Color32, ColorImage, FontId, Painter, PointerButton, Pos2, Rect, Stroke, TextureHandle, TextureOptions,
    pos2, vec2,
};

use crate::input::InputEvent;
use crate::state::{MenuId, SharedContext};
use crate::tools::{Tool, ToolDescriptor, popup_rect};
use crate::widgets::ToolButton;

pub const MAX_RECENT_COLORS: usize = 5;

const POPUP_SIZE: egui::Vec2 = vec2(450.0, 240.0);
const WHEEL_SIZE: f32 = 150.0;
const BAR_WIDTH: f32 = 30.0;
const SWATCH_SIZE: egui::Vec2 = vec2(180.0, 80.0);
const RECENT_RADIUS: f32 = 15.0;
const RECENT_GAP: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Wheel,
    Bar,
}

/// HSV colour picker popup. Never becomes the active canvas tool.
#[derive(Clone)]
pub struct ColorPaletteTool {
    descriptor: ToolDescriptor,
    button: ToolButton,
    recent: Vec<Color32>,
    drag: Option<Drag>,
    popup: Rect,
    wheel_texture: Option<TextureHandle>,
}

impl std::fmt::Debug for ColorPaletteTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorPaletteTool")
            .field("descriptor", &self.descriptor)
            .field("button", &self.button)
            .field("recent", &self.recent)
            .field("drag", &self.drag)
            .field("popup", &self.popup)
            .field("wheel_texture", &self.wheel_texture.as_ref().map(TextureHandle::id))
            .finish()
    }
}

pub fn new_color_palette_tool(descriptor: ToolDescriptor) -> super::ToolType {
    super::ToolType::ColorPalette(ColorPaletteTool::new(descriptor))
}

/// 8-bit RGB for an HSV triple with components in `0..=1`.
pub fn hsv_to_color(hsv: Hsva) -> Color32 {
    let [r, g, b] = rgb_from_hsv((hsv.h, hsv.s, hsv.v));
    Color32::from_rgb((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8)
}

pub fn color_to_hsv(color: Color32) -> Hsva {
    let (h, s, v) = hsv_from_rgb([
        color.r() as f32 / 255.0,
        color.g() as f32 / 255.0,
        color.b() as f32 / 255.0,
    ]);
    Hsva::new(h, s, v, 1.0)
}

/// Full-value HSV disc; pixels outside the circle are transparent.
fn color_wheel_image(size: usize) -> ColorImage {
    let radius = size as f32 / 2.0;
    let mut image = ColorImage::new([size, size], Color32::TRANSPARENT);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 - radius;
            let dy = y as f32 - radius;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance <= radius {
                let hue = (dy.atan2(dx) / TAU).rem_euclid(1.0);
                image.pixels[y * size + x] = hsv_to_color(Hsva::new(hue, distance / radius, 1.0, 1.0));
            }
        }
    }
    image
}

impl ColorPaletteTool {
    fn new(descriptor: ToolDescriptor) -> Self {
        Self {
            button: ToolButton::new(descriptor.name.clone(), descriptor.icon.clone()),
            descriptor,
            recent: vec![
                Color32::from_rgb(255, 0, 0),
                Color32::from_rgb(0, 255, 0),
                Color32::from_rgb(0, 0, 255),
                Color32::from_rgb(255, 255, 0),
                Color32::from_rgb(0, 0, 0),
            ],
            drag: None,
            popup: Rect::from_min_size(Pos2::ZERO, POPUP_SIZE),
            wheel_texture: None,
        }
    }

    pub fn recent_colors(&self) -> &[Color32] {
        &self.recent
    }

    /// Move `color` to the front, dropping the oldest beyond the limit.
    pub fn add_recent_color(&mut self, color: Color32) {
        self.recent.retain(|c| *c != color);
        self.recent.insert(0, color);
        self.recent.truncate(MAX_RECENT_COLORS);
    }

    fn wheel_rect(&self) -> Rect {
        Rect::from_min_size(self.popup.min + vec2(20.0, 20.0), egui::Vec2::splat(WHEEL_SIZE))
    }

    fn bar_rect(&self) -> Rect {
        let wheel = self.wheel_rect();
        Rect::from_min_size(pos2(wheel.max.x + 20.0, wheel.min.y), vec2(BAR_WIDTH, WHEEL_SIZE))
    }

    fn swatch_rect(&self) -> Rect {
        let bar = self.bar_rect();
        Rect::from_min_size(pos2(bar.max.x + 20.0, bar.min.y), SWATCH_SIZE)
    }

    fn recent_positions(&self) -> impl Iterator<Item = Pos2> + '_ {
        let y = self.wheel_rect().max.y + 35.0;
        (0..self.recent.len())
            .map(move |i| pos2(self.popup.min.x + 30.0 + i as f32 * (RECENT_RADIUS * 2.0 + RECENT_GAP), y))
    }

    fn layout_popup(&mut self, ctx: &SharedContext) {
        self.popup = popup_rect(POPUP_SIZE, self.button.rect(), ctx.toolbar_y, ctx.viewport);
    }

    fn pick(&self, drag: Drag, pos: Pos2, ctx: &mut SharedContext) {
        let mut hsv = ctx.current_hsv;
        match drag {
            Drag::Wheel => {
                let wheel = self.wheel_rect();
                let d = pos - wheel.center();
                hsv.s = (d.length() / (wheel.width() / 2.0)).min(1.0);
                hsv.h = (d.y.atan2(d.x) / TAU).rem_euclid(1.0);
            }
            Drag::Bar => {
                let bar = self.bar_rect();
                let y = pos.y.clamp(bar.min.y, bar.max.y - 1.0);
                let denominator = (bar.height() - 1.0).max(1.0);
                hsv.v = (1.0 - (y - bar.min.y) / denominator).clamp(0.0, 1.0);
            }
        }
        ctx.current_hsv = hsv;
        ctx.draw_color = hsv_to_color(hsv);
    }

    fn handle_popup(&mut self, event: &InputEvent, ctx: &mut SharedContext) -> bool {
        self.layout_popup(ctx);
        match event {
            InputEvent::PointerDown {
                pos,
                button: PointerButton::Primary,
            } => {
                if !self.popup.contains(*pos) {
                    ctx.menu_open = None;
                    self.drag = None;
                    return true;
                }
                if self.drag.is_none() {
                    if self.wheel_rect().contains(*pos) {
                        self.drag = Some(Drag::Wheel);
                    } else if self.bar_rect().expand2(vec2(20.0, 5.0)).contains(*pos) {
                        self.drag = Some(Drag::Bar);
                    }
                }
                match self.drag {
                    Some(drag) => self.pick(drag, *pos, ctx),
                    None => {
                        let hit = self
                            .recent_positions()
                            .position(|center| center.distance(*pos) <= RECENT_RADIUS);
                        if let Some(i) = hit {
                            let color = self.recent[i];
                            ctx.draw_color = color;
                            ctx.current_hsv = color_to_hsv(color);
                            self.add_recent_color(color);
                        }
                    }
                }
                true
            }
            InputEvent::PointerUp {
                pos,
                button: PointerButton::Primary,
            } => {
                if self.drag.take().is_some() {
                    self.add_recent_color(ctx.draw_color);
                    return true;
                }
                self.popup.contains(*pos)
            }
            InputEvent::PointerMove { pos } => match self.drag {
                Some(drag) => {
                    self.pick(drag, *pos, ctx);
                    true
                }
                None => self.popup.contains(*pos),
            },
            other => other.pos().is_some_and(|pos| self.popup.contains(pos)),
        }
    }

    fn paint_popup(&mut self, painter: &Painter, ctx: &SharedContext) {
        let hsv = ctx.current_hsv;
        painter.rect_filled(self.popup, 0.0, Color32::from_gray(220));
        painter.rect_stroke(self.popup, 0.0, Stroke::new(2.0, Color32::BLACK));

        let wheel = self.wheel_rect();
        let texture = self.wheel_texture.get_or_insert_with(|| {
            painter.ctx().load_texture(
                "color-wheel",
                color_wheel_image(WHEEL_SIZE as usize),
                TextureOptions::LINEAR,
            )
        });
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        painter.image(texture.id(), wheel, uv, Color32::WHITE);

        let bar = self.bar_rect();
        for i in 0..WHEEL_SIZE as usize {
            let v = 1.0 - i as f32 / WHEEL_SIZE;
            let y = bar.min.y + i as f32 + 0.5;
            painter.line_segment(
                [pos2(bar.min.x, y), pos2(bar.max.x, y)],
                Stroke::new(1.0, hsv_to_color(Hsva::new(hsv.h, hsv.s, v, 1.0))),
            );
        }

        let angle = hsv.h * TAU;
        let indicator = wheel.center() + vec2(angle.cos(), angle.sin()) * hsv.s * WHEEL_SIZE / 2.0;
        painter.circle_stroke(indicator, 7.0, Stroke::new(2.0, Color32::BLACK));
        painter.circle_stroke(indicator, 5.0, Stroke::new(2.0, Color32::WHITE));

        let bar_y = (bar.min.y + (1.0 - hsv.v) * WHEEL_SIZE).clamp(bar.min.y, bar.max.y - 1.0);
        let marker = [pos2(bar.min.x, bar_y), pos2(bar.max.x, bar_y)];
        painter.line_segment(marker, Stroke::new(4.0, Color32::BLACK));
        painter.line_segment(marker, Stroke::new(2.0, Color32::WHITE));

        let color = ctx.draw_color;
        let swatch = self.swatch_rect();
        painter.rect_filled(swatch, 0.0, color);
        painter.rect_stroke(swatch, 0.0, Stroke::new(1.0, Color32::BLACK));
        let font = FontId::proportional(18.0);
        painter.text(
            pos2(swatch.min.x + 10.0, swatch.max.y + 10.0),
            Align2::LEFT_TOP,
            format!("RGB: {}, {}, {}", color.r(), color.g(), color.b()),
            font.clone(),
            Color32::BLACK,
        );
        painter.text(
            pos2(swatch.min.x + 10.0, swatch.max.y + 40.0),
            Align2::LEFT_TOP,
            format!("HEX: #{:02x}{:02x}{:02x}", color.r(), color.g(), color.b()),
            font,
            Color32::BLACK,
        );

        for (center, color) in self.recent_positions().zip(self.recent.iter()) {
            painter.circle(center, RECENT_RADIUS, *color, Stroke::new(1.0, Color32::BLACK));
        }
    }
}

impl Tool for ColorPaletteTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn handle_event(&mut self, event: &InputEvent, ctx: &mut SharedContext) -> bool {
        if let Some(pos) = event.primary_down() {
            if self.button.contains(pos) {
                if ctx.toggle_menu(MenuId::Tool(self.descriptor.id.clone())) {
                    ctx.current_hsv = color_to_hsv(ctx.draw_color);
                }
                return true;
            }
        }

        if !ctx.is_tool_menu_open(self.id()) {
            self.drag = None;
            return false;
        }
        self.handle_popup(event, ctx)
    }

    fn draw(&mut self, painter: &Painter, ctx: &SharedContext) {
        self.button.paint(painter);

        // Current colour in the button's top-right corner.
        let corner = self.button.rect().right_top() + vec2(-5.0, 5.0);
        let swatch = Rect::from_min_max(corner - vec2(15.0, 0.0), corner + vec2(0.0, 15.0));
        painter.rect_filled(swatch, 0.0, ctx.draw_color);
        painter.rect_stroke(swatch, 0.0, Stroke::new(1.0, Color32::BLACK));

        if ctx.is_tool_menu_open(self.id()) {
            self.layout_popup(ctx);
            self.paint_popup(painter, ctx);
        }
    }

    fn update_button_position(&mut self, x: f32, y: f32) {
        self.button.set_position(x, y);
    }

    fn button_rect(&self) -> Option<Rect> {
        Some(self.button.rect())
    }
}
