use crate::graphics::{raster, GraphicsState, StateStack, Transform};
use crate::hal::canvas::{
    BitmapOption, Canvas, Capabilities, Color, Metrics, OutlineType, Point, Rect,
};
use crate::hal::font::{Font, GLYPH_HEIGHT, GLYPH_WIDTH};

use super::framebuffer::FrameBuffer;

/// Software canvas rasterizing into a borrowed frame buffer.
///
/// Every primitive is projected through the current CTM, then clipped against
/// the device space clip rectangle of the current graphics state.
pub struct PixelCanvas<'a, const W: usize, const H: usize> {
    buffer: &'a mut FrameBuffer<W, H>,
    font: &'a dyn Font,
    state: GraphicsState,
    stack: StateStack,
    cursor: (i32, i32),
}

impl<'a, const W: usize, const H: usize> PixelCanvas<'a, W, H> {
    pub fn new(buffer: &'a mut FrameBuffer<W, H>, font: &'a dyn Font) -> Self {
        Self {
            buffer,
            font,
            state: GraphicsState::new(W as u16, H as u16),
            stack: StateStack::new(),
            cursor: (0, 0),
        }
    }

    pub fn buffer(&self) -> &FrameBuffer<W, H> {
        &*self.buffer
    }

    pub fn ctm(&self) -> Transform {
        self.state.ctm
    }

    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    fn bounds() -> Rect {
        Rect::new(0, 0, W as i32, H as i32)
    }

    fn paint(&mut self, x: i32, y: i32, color: Color) {
        if !self.state.clip.contains(x, y) {
            return;
        }
        let color = if self.state.inverted { color.inverted() } else { color };
        self.buffer.set(x, y, color);
    }

    fn stroke_segment(&mut self, from: (i32, i32), to: (i32, i32)) {
        if let Some((dx, dy)) = self.state.outline_type.offset() {
            let color = self.state.outline_color;
            raster::line(from, to, |x, y| self.paint(x + dx, y + dy, color));
        }
        let color = self.state.stroke;
        raster::line(from, to, |x, y| self.paint(x, y, color));
    }

    fn fill_polygon_fan(&mut self, center: (i32, i32), vertices: &[(i32, i32)]) {
        let color = self.state.fill;
        for i in 0..vertices.len() {
            let (a, b) = (vertices[i], vertices[(i + 1) % vertices.len()]);
            raster::triangle([center, a, b], |y, x0, x1| {
                for x in x0..=x1 {
                    self.paint(x, y, color)
                }
            });
        }
    }

    fn project(&self, point: Point) -> (i32, i32) {
        self.state.ctm.project(point.x, point.y)
    }

    fn rect_corners(&self, rect: Rect) -> Option<[(i32, i32); 4]> {
        let rect = rect.normalized();
        if rect.is_empty() {
            return None;
        }
        let (x0, y0, x1, y1) = (rect.x, rect.y, rect.x + rect.w - 1, rect.y + rect.h - 1);
        let ctm = &self.state.ctm;
        Some([ctm.project(x0, y0), ctm.project(x1, y0), ctm.project(x1, y1), ctm.project(x0, y1)])
    }

    fn ellipse_vertices(&self, rect: Rect) -> Option<[(i32, i32); raster::ELLIPSE_SEGMENTS]> {
        let rect = rect.normalized();
        if rect.is_empty() {
            return None;
        }
        let (x, y) = (rect.x as f32, rect.y as f32);
        let points = raster::ellipse(x, y, (rect.w - 1) as f32, (rect.h - 1) as f32);
        let mut vertices = [(0, 0); raster::ELLIPSE_SEGMENTS];
        for (vertex, &(px, py)) in vertices.iter_mut().zip(points.iter()) {
            let (px, py) = self.state.ctm.apply(px, py);
            *vertex = ((px + 0.5) as i32, (py + 0.5) as i32);
        }
        Some(vertices)
    }

    fn stroke_closed(&mut self, vertices: &[(i32, i32)]) {
        for i in 0..vertices.len() {
            self.stroke_segment(vertices[i], vertices[(i + 1) % vertices.len()]);
        }
    }

    fn blit(&mut self, x: i32, y: i32, chars: &[u16], mask: Option<Color>, opts: BitmapOption) {
        let (mut px, py) = self.state.ctm.project(x, y);
        let font = self.font;
        for &chr in chars {
            let glyph = match font.glyph(chr) {
                Some(glyph) => glyph,
                None => {
                    px += GLYPH_WIDTH as i32;
                    continue;
                }
            };
            for gy in 0..glyph.height {
                for gx in 0..glyph.width {
                    let mut color = glyph.pixel(gx, gy);
                    if opts.contains(BitmapOption::INVERT_COLORS) {
                        color = color.inverted();
                    }
                    let color = match (color, mask) {
                        (Color::Transparent, _) => {
                            if opts.contains(BitmapOption::ERASE_TRANSPARENT) {
                                Color::Transparent
                            } else if opts.contains(BitmapOption::SOLID_BACKGROUND) {
                                Color::Black
                            } else {
                                continue;
                            }
                        }
                        (_, Some(mask)) => mask,
                        (color, None) => color,
                    };
                    self.paint(px + gx as i32, py + gy as i32, color);
                }
            }
            px += glyph.width as i32;
        }
    }
}

impl<'a, const W: usize, const H: usize> Canvas for PixelCanvas<'a, W, H> {
    fn metrics(&self) -> Metrics {
        Metrics {
            width: W as u16,
            height: H as u16,
            grid_element_width: GLYPH_WIDTH,
            grid_element_height: GLYPH_HEIGHT,
        }
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn set_stroke_color(&mut self, color: Color) {
        self.state.stroke = color;
    }

    fn set_fill_color(&mut self, color: Color) {
        self.state.fill = color;
    }

    fn set_color_inversion(&mut self, inverted: bool) {
        self.state.inverted = inverted;
    }

    fn set_line_outline_type(&mut self, outline: OutlineType) {
        self.state.outline_type = outline;
    }

    fn set_line_outline_color(&mut self, color: Color) {
        self.state.outline_color = color;
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        let (x, y) = self.state.ctm.project(x, y);
        self.paint(x, y, color);
    }

    fn set_pixel_to_stroke_color(&mut self, x: i32, y: i32) {
        self.set_pixel(x, y, self.state.stroke);
    }

    fn set_pixel_to_fill_color(&mut self, x: i32, y: i32) {
        self.set_pixel(x, y, self.state.fill);
    }

    fn clear_rect(&mut self, rect: Rect) {
        let area = rect.intersect(&self.state.clip);
        for y in area.y..area.y + area.h {
            for x in area.x..area.x + area.w {
                self.buffer.set(x, y, Color::Transparent);
            }
        }
    }

    fn clip_to_rect(&mut self, rect: Rect) {
        self.state.clip = rect.intersect(&Self::bounds());
    }

    fn reset_drawing_context(&mut self) {
        self.state = GraphicsState::new(W as u16, H as u16);
        self.cursor = (0, 0);
    }

    fn draw_characters(&mut self, x: i32, y: i32, chars: &[u16], opts: BitmapOption) {
        self.blit(x, y, chars, None, opts)
    }

    fn draw_characters_mask(
        &mut self,
        x: i32,
        y: i32,
        chars: &[u16],
        color: Color,
        opts: BitmapOption,
    ) {
        self.blit(x, y, chars, Some(color), opts)
    }

    fn move_to_point(&mut self, x: i32, y: i32) {
        self.cursor = self.state.ctm.project(x, y);
    }

    fn stroke_line_to_point(&mut self, x: i32, y: i32) {
        let to = self.state.ctm.project(x, y);
        self.stroke_segment(self.cursor, to);
        self.cursor = to;
    }

    fn stroke_triangle(&mut self, p1: Point, p2: Point, p3: Point) {
        let vertices = [self.project(p1), self.project(p2), self.project(p3)];
        self.stroke_closed(&vertices);
    }

    fn fill_triangle(&mut self, p1: Point, p2: Point, p3: Point) {
        let vertices = [self.project(p1), self.project(p2), self.project(p3)];
        let color = self.state.fill;
        raster::triangle(vertices, |y, x0, x1| {
            for x in x0..=x1 {
                self.paint(x, y, color)
            }
        });
    }

    fn stroke_rect(&mut self, rect: Rect) {
        if let Some(corners) = self.rect_corners(rect) {
            self.stroke_closed(&corners);
        }
    }

    fn fill_rect(&mut self, rect: Rect) {
        if let Some(corners) = self.rect_corners(rect) {
            self.fill_polygon_fan(corners[0], &corners[1..]);
        }
    }

    fn stroke_ellipse_in_rect(&mut self, rect: Rect) {
        if let Some(vertices) = self.ellipse_vertices(rect) {
            self.stroke_closed(&vertices);
        }
    }

    fn fill_ellipse_in_rect(&mut self, rect: Rect) {
        let rect = rect.normalized();
        if let Some(vertices) = self.ellipse_vertices(rect) {
            let center = self.state.ctm.apply(
                rect.x as f32 + (rect.w - 1) as f32 / 2.0,
                rect.y as f32 + (rect.h - 1) as f32 / 2.0,
            );
            self.fill_polygon_fan(((center.0 + 0.5) as i32, (center.1 + 0.5) as i32), &vertices);
        }
    }

    fn ctm_reset(&mut self) {
        self.state.ctm = Transform::IDENTITY;
    }

    fn ctm_set(&mut self, ctm: Transform) {
        self.state.ctm = ctm;
    }

    fn ctm_translate(&mut self, tx: f32, ty: f32) {
        self.state.ctm.translate(tx, ty);
    }

    fn ctm_scale(&mut self, sx: f32, sy: f32) {
        self.state.ctm.scale(sx, sy);
    }

    fn ctm_rotate(&mut self, radians: f32) {
        self.state.ctm.rotate(radians);
    }

    fn context_push(&mut self) {
        self.stack.push(&self.state);
    }

    fn context_pop(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use crate::hal::font::{Font, Glyph, GLYPH_DATA_SIZE};

    /// Top half white, bottom half transparent, black left column
    pub struct TestFont([u8; GLYPH_DATA_SIZE]);

    impl TestFont {
        pub fn new() -> Self {
            let mut data = [0x55u8; GLYPH_DATA_SIZE];
            for y in 0..9 {
                for x in 0..12 {
                    let index = y * 12 + x;
                    let bits: u8 = if x == 0 { 0b00 } else { 0b10 };
                    let shift = 6 - 2 * (index % 4);
                    data[index / 4] = (data[index / 4] & !(0b11 << shift)) | (bits << shift);
                }
            }
            Self(data)
        }
    }

    impl Font for TestFont {
        fn glyph(&self, chr: u16) -> Option<Glyph> {
            match chr {
                0 => None,
                _ => Some(Glyph::new(&self.0)),
            }
        }
    }

    #[test]
    fn test_stroke_line_with_outline() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{Canvas, Color, OutlineType};

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.set_stroke_color(Color::White);
        canvas.set_line_outline_type(OutlineType::Bottom);
        canvas.set_line_outline_color(Color::Black);
        canvas.move_to_point(2, 4);
        canvas.stroke_line_to_point(6, 4);
        canvas.stroke_line_to_point(6, 5);

        let buffer = canvas.buffer();
        assert_eq!(buffer.get(2, 4), Some(Color::White));
        assert_eq!(buffer.get(2, 5), Some(Color::Black));
        assert_eq!(buffer.get(6, 5), Some(Color::White));
        assert_eq!(buffer.get(6, 6), Some(Color::Black));
        assert_eq!(buffer.get(1, 4), Some(Color::Transparent));
    }

    #[test]
    fn test_fill_stroke_rect_keeps_outline() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{Canvas, Color, Rect};

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.set_fill_color(Color::White);
        canvas.set_stroke_color(Color::Black);
        canvas.fill_stroke_rect(Rect::new(2, 2, 5, 4));

        let buffer = canvas.buffer();
        assert_eq!(buffer.get(2, 2), Some(Color::Black));
        assert_eq!(buffer.get(6, 5), Some(Color::Black));
        assert_eq!(buffer.get(4, 3), Some(Color::White));
        assert_eq!(buffer.get(7, 3), Some(Color::Transparent));
        assert_eq!(buffer.count(Color::White), 3 * 2);
        assert_eq!(buffer.count(Color::Black), 5 * 2 + 2 * 2);
    }

    #[test]
    fn test_clip_and_transparent_fill() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{Canvas, Color, Rect};

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.set_fill_color(Color::White);
        canvas.fill_rect(Rect::new(0, 0, 16, 16));

        canvas.context_push();
        canvas.clip_to_rect(Rect::new(4, 4, 4, -2));
        canvas.set_fill_color(Color::Transparent);
        canvas.fill_rect(Rect::new(0, 0, 16, 16));
        canvas.context_pop();

        let buffer = canvas.buffer();
        assert_eq!(buffer.count(Color::Transparent), 8);
        assert_eq!(buffer.get(4, 2), Some(Color::Transparent));
        assert_eq!(buffer.get(7, 3), Some(Color::Transparent));
        assert_eq!(buffer.get(4, 4), Some(Color::White));
    }

    #[test]
    fn test_context_push_pop_restores_ctm() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::Canvas;

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.ctm_translate(3.0, 2.0);
        for &theta in [0.0f32, 0.3, 1.0, 3.14, -2.5].iter() {
            let before = canvas.ctm();
            canvas.context_push();
            canvas.ctm_rotate(theta);
            canvas.context_pop();
            assert_eq!(canvas.ctm(), before);
        }
        assert_eq!(canvas.depth(), 0);
    }

    #[test]
    fn test_rotated_line() {
        use core::f32::consts::FRAC_PI_2;

        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{Canvas, Color};

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.ctm_rotate(FRAC_PI_2);
        canvas.ctm_translate(8.0, 8.0);
        canvas.move_to_point(0, 0);
        canvas.stroke_line_to_point(4, 0);

        let buffer = canvas.buffer();
        assert_eq!(buffer.get(8, 8), Some(Color::White));
        assert_eq!(buffer.get(8, 4), Some(Color::White));
        assert_eq!(buffer.get(8, 12), Some(Color::Transparent));
        assert_eq!(buffer.get(12, 8), Some(Color::Transparent));
        assert_eq!(buffer.count(Color::White), 5);
    }

    #[test]
    fn test_draw_characters() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{BitmapOption, Canvas, Color};

        let mut buffer: FrameBuffer<32, 20> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.set_fill_color(Color::Gray);
        canvas.fill_rect(crate::hal::canvas::Rect::new(0, 0, 32, 20));
        canvas.draw_characters(1, 1, &[1, 1], BitmapOption::empty());

        let frame = canvas.buffer();
        assert_eq!(frame.get(1, 1), Some(Color::Black));
        assert_eq!(frame.get(2, 1), Some(Color::White));
        assert_eq!(frame.get(13, 1), Some(Color::Black));
        assert_eq!(frame.get(2, 12), Some(Color::Gray));

        drop(canvas);
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.draw_characters(1, 1, &[1], BitmapOption::ERASE_TRANSPARENT);
        assert_eq!(canvas.buffer().get(2, 12), Some(Color::Transparent));

        canvas.draw_characters_mask(1, 1, &[1], Color::Transparent, BitmapOption::empty());
        assert_eq!(canvas.buffer().get(1, 1), Some(Color::Transparent));
        assert_eq!(canvas.buffer().get(2, 1), Some(Color::Transparent));
        assert_eq!(canvas.buffer().get(13, 1), Some(Color::Black));
    }

    #[test]
    fn test_fill_ellipse() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{Canvas, Color, Rect};

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.set_fill_color(Color::White);
        canvas.fill_ellipse_in_rect(Rect::new(2, 2, 11, 11));

        let buffer = canvas.buffer();
        assert_eq!(buffer.get(7, 7), Some(Color::White));
        assert_eq!(buffer.get(2, 7), Some(Color::White));
        assert_eq!(buffer.get(2, 2), Some(Color::Transparent));
        assert_eq!(buffer.get(14, 7), Some(Color::Transparent));
    }

    #[test]
    fn test_pixels_through_loaded_ctm() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::graphics::Transform;
        use crate::hal::canvas::{Canvas, Color};

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.ctm_set(Transform::translation(2.0, 3.0));
        canvas.set_pixel(1, 1, Color::Gray);
        canvas.set_stroke_color(Color::Black);
        canvas.set_pixel_to_stroke_color(0, 0);
        canvas.set_fill_color(Color::White);
        canvas.set_pixel_to_fill_color(5, 5);
        canvas.ctm_set(Transform::new(2.0, 0.0, 0.0, 2.0, 1.0, 0.0));
        canvas.set_pixel(4, 6, Color::Gray);

        let buffer = canvas.buffer();
        assert_eq!(buffer.get(3, 4), Some(Color::Gray));
        assert_eq!(buffer.get(2, 3), Some(Color::Black));
        assert_eq!(buffer.get(7, 8), Some(Color::White));
        assert_eq!(buffer.get(9, 12), Some(Color::Gray));
        assert_eq!(buffer.count(Color::Transparent), 16 * 16 - 4);
    }

    #[test]
    fn test_inversion_and_reset() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{Canvas, Color, Rect};

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.set_color_inversion(true);
        canvas.set_pixel(1, 1, Color::White);
        canvas.set_pixel(2, 1, Color::Black);
        canvas.set_pixel(3, 1, Color::Gray);

        canvas.ctm_translate(5.0, 5.0);
        canvas.clip_to_rect(Rect::new(0, 0, 2, 2));
        canvas.set_stroke_color(Color::Gray);
        canvas.reset_drawing_context();
        canvas.set_pixel(6, 6, Color::White);
        canvas.set_pixel_to_stroke_color(8, 8);

        let buffer = canvas.buffer();
        assert_eq!(buffer.get(1, 1), Some(Color::Black));
        assert_eq!(buffer.get(2, 1), Some(Color::White));
        assert_eq!(buffer.get(3, 1), Some(Color::Gray));
        assert_eq!(buffer.get(6, 6), Some(Color::White));
        assert_eq!(buffer.get(11, 11), Some(Color::Transparent));
        assert_eq!(buffer.get(8, 8), Some(Color::White));
    }

    #[test]
    fn test_clear_rect_in_device_space() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{Canvas, Color, Rect};

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.set_fill_color(Color::White);
        canvas.fill_rect(Rect::new(0, 0, 16, 16));

        canvas.ctm_translate(100.0, 100.0);
        canvas.clip_to_rect(Rect::new(0, 0, 8, 16));
        canvas.clear_rect(Rect::new(4, 4, 8, 4));

        let buffer = canvas.buffer();
        assert_eq!(buffer.count(Color::Transparent), 4 * 4);
        assert_eq!(buffer.get(4, 4), Some(Color::Transparent));
        assert_eq!(buffer.get(7, 7), Some(Color::Transparent));
        assert_eq!(buffer.get(8, 5), Some(Color::White));
        assert_eq!(buffer.get(5, 8), Some(Color::White));
    }

    #[test]
    fn test_stroke_ellipse() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{Canvas, Color, Rect};

        let mut buffer: FrameBuffer<16, 16> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.set_stroke_color(Color::White);
        canvas.stroke_ellipse_in_rect(Rect::new(2, 2, 11, 11));

        let buffer = canvas.buffer();
        for &(x, y) in &[(12, 7), (2, 7), (7, 2), (7, 12)] {
            assert_eq!(buffer.get(x, y), Some(Color::White));
        }
        assert_eq!(buffer.get(7, 7), Some(Color::Transparent));
        assert_eq!(buffer.get(2, 2), Some(Color::Transparent));
        for y in 0..16 {
            for x in 0..16 {
                if !(2..=12).contains(&x) || !(2..=12).contains(&y) {
                    assert_eq!(buffer.get(x, y), Some(Color::Transparent));
                }
            }
        }
    }

    #[test]
    fn test_bitmap_options() {
        use super::PixelCanvas;
        use crate::drivers::FrameBuffer;
        use crate::hal::canvas::{BitmapOption, Canvas, Color, Rect};

        let mut buffer: FrameBuffer<16, 20> = FrameBuffer::new();
        let font = TestFont::new();
        let mut canvas = PixelCanvas::new(&mut buffer, &font);
        canvas.set_fill_color(Color::Gray);
        canvas.fill_rect(Rect::new(0, 0, 16, 20));
        canvas.draw_characters(0, 0, &[1], BitmapOption::INVERT_COLORS);
        assert_eq!(canvas.buffer().get(0, 0), Some(Color::White));
        assert_eq!(canvas.buffer().get(1, 0), Some(Color::Black));
        assert_eq!(canvas.buffer().get(1, 10), Some(Color::Gray));

        canvas.draw_characters(0, 0, &[1], BitmapOption::SOLID_BACKGROUND);
        assert_eq!(canvas.buffer().get(0, 0), Some(Color::Black));
        assert_eq!(canvas.buffer().get(1, 0), Some(Color::White));
        assert_eq!(canvas.buffer().get(1, 10), Some(Color::Black));
        assert_eq!(canvas.buffer().get(12, 10), Some(Color::Gray));

        let opts = BitmapOption::INVERT_COLORS | BitmapOption::SOLID_BACKGROUND;
        canvas.draw_characters(0, 0, &[1], opts);
        assert_eq!(canvas.buffer().get(1, 0), Some(Color::Black));
        assert_eq!(canvas.buffer().get(1, 17), Some(Color::Black));
    }
}
