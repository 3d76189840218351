//! Software-rendered window using `minifb`.
//!
//! Draw commands are rasterized into a `0xAARRGGBB` framebuffer; text uses a
//! built-in 3x5 bitmap font scaled per [`TextSize`].

use bci_rs::config::ScreenConfig;
use bci_rs::render::{DrawCommand, InputEvent, Key, RenderSurface, Rgb, TextSize};
use bci_rs::{BciError, Result};
use minifb::{KeyRepeat, Window, WindowOptions};

pub struct WindowSurface {
    window: Window,
    canvas: Canvas,
}

impl WindowSurface {
    pub fn open(screen: &ScreenConfig, title: &str) -> Result<Self> {
        let width = screen.width.round() as usize;
        let height = screen.height.round() as usize;
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| BciError::Render(format!("Cannot open window: {}", e)))?;

        // the session loop paces frames
        window.limit_update_rate(None);

        Ok(Self {
            window,
            canvas: Canvas::new(width, height),
        })
    }
}

impl RenderSurface for WindowSurface {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        if !self.window.is_open() {
            return vec![InputEvent::Quit];
        }
        self.window
            .get_keys_pressed(KeyRepeat::No)
            .into_iter()
            .map(|key| match key {
                minifb::Key::Escape => InputEvent::KeyPressed(Key::Escape),
                _ => InputEvent::KeyPressed(Key::Other),
            })
            .collect()
    }

    fn present(&mut self, scene: &[DrawCommand]) -> Result<()> {
        for cmd in scene {
            self.canvas.draw(cmd);
        }
        self.window
            .update_with_buffer(&self.canvas.pixels, self.canvas.width, self.canvas.height)
            .map_err(|e| BciError::Render(format!("Window update failed: {}", e)))
    }
}

/// Framebuffer with clipped primitive drawing
pub struct Canvas {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0xFF00_0000; width * height],
        }
    }

    pub fn draw(&mut self, cmd: &DrawCommand) {
        match cmd {
            DrawCommand::Clear(color) => self.pixels.fill(color.to_argb()),
            DrawCommand::Circle {
                x,
                y,
                radius,
                color,
            } => self.fill_circle(*x, *y, *radius, *color),
            DrawCommand::Rect {
                x,
                y,
                width,
                height,
                color,
            } => self.fill_rect(*x, *y, *width, *height, *color),
            DrawCommand::Line {
                from,
                to,
                width,
                color,
            } => self.draw_line(*from, *to, *width, *color),
            DrawCommand::Text {
                x,
                y,
                size,
                text,
                color,
            } => self.draw_text(*x, *y, *size, text, *color),
        }
    }

    fn fill_span(&mut self, x0: i64, x1: i64, y: i64, color: u32) {
        if y < 0 || y as usize >= self.height {
            return;
        }
        let start = x0.max(0);
        let end = x1.min(self.width as i64 - 1);
        for x in start..=end {
            self.pixels[y as usize * self.width + x as usize] = color;
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb) {
        let argb = color.to_argb();
        let (x0, x1) = (x.round() as i64, (x + width).round() as i64 - 1);
        let (y0, y1) = (y.round() as i64, (y + height).round() as i64 - 1);
        for row in y0..=y1 {
            self.fill_span(x0, x1, row, argb);
        }
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb) {
        let argb = color.to_argb();
        let r = radius.max(0.0);
        let (top, bottom) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        for row in top..=bottom {
            let dy = row as f64 + 0.5 - cy;
            if dy.abs() > r {
                continue;
            }
            let half = (r * r - dy * dy).sqrt();
            self.fill_span((cx - half).round() as i64, (cx + half).round() as i64 - 1, row, argb);
        }
    }

    fn draw_line(&mut self, from: (f64, f64), to: (f64, f64), width: f64, color: Rgb) {
        let argb = color.to_argb();
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i64;
        let brush = width.max(1.0).round() as i64;
        let offset = brush / 2;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let px = (from.0 + dx * t).round() as i64 - offset;
            let py = (from.1 + dy * t).round() as i64 - offset;
            for by in 0..brush {
                self.fill_span(px, px + brush - 1, py + by, argb);
            }
        }
    }

    fn draw_text(&mut self, x: f64, y: f64, size: TextSize, text: &str, color: Rgb) {
        let argb = color.to_argb();
        let scale = match size {
            TextSize::Small => 2,
            TextSize::Medium => 3,
            TextSize::Large => 5,
        };
        let mut cursor = x.round() as i64;
        let top = y.round() as i64;
        for ch in text.chars() {
            for (row, bits) in glyph(ch).iter().enumerate() {
                for col in 0..3i64 {
                    if bits & (0b100 >> col) == 0 {
                        continue;
                    }
                    let gx = cursor + col * scale;
                    let gy = top + row as i64 * scale;
                    for sy in 0..scale {
                        self.fill_span(gx, gx + scale - 1, gy + sy, argb);
                    }
                }
            }
            cursor += 4 * scale;
            if cursor >= self.width as i64 {
                break;
            }
        }
    }
}

/// 3x5 glyph, one row per byte, most significant of the low three bits leftmost.
fn glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b011, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b010, 0b010, 0b010],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b011, 0b100, 0b100, 0b100, 0b011],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b110, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b110, 0b100, 0b100],
        'G' => [0b011, 0b100, 0b101, 0b101, 0b011],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b110, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b010, 0b101, 0b101, 0b101, 0b010],
        'P' => [0b110, 0b101, 0b110, 0b100, 0b100],
        'Q' => [0b010, 0b101, 0b101, 0b110, 0b011],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b011, 0b100, 0b010, 0b001, 0b110],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '<' => [0b001, 0b010, 0b100, 0b010, 0b001],
        '>' => [0b100, 0b010, 0b001, 0b010, 0b100],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        ' ' => [0; 5],
        _ => [0b111, 0b101, 0b101, 0b101, 0b111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_is_clipped() {
        let mut canvas = Canvas::new(10, 10);
        canvas.draw(&DrawCommand::Rect {
            x: 8.0,
            y: 8.0,
            width: 5.0,
            height: 5.0,
            color: Rgb(255, 0, 0),
        });
        assert_eq!(canvas.pixels[9 * 10 + 9], 0xFFFF_0000);
        assert_eq!(canvas.pixels[7 * 10 + 7], 0xFF00_0000);
    }

    #[test]
    fn test_circle_covers_center_only() {
        let mut canvas = Canvas::new(20, 20);
        canvas.draw(&DrawCommand::Circle {
            x: 10.0,
            y: 10.0,
            radius: 3.0,
            color: Rgb(0, 255, 0),
        });
        assert_eq!(canvas.pixels[10 * 20 + 10], 0xFF00_FF00);
        assert_eq!(canvas.pixels[0], 0xFF00_0000);
    }
}
