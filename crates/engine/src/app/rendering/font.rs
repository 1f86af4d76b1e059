//! Built-in 3x5 bitmap font, scaled up to roughly the height of the menu font.
//! Lowercase letters render with the uppercase glyphs; unknown characters
//! render as blanks.

use super::Rgba;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const TEXT_SCALE: i32 = 4;

pub const GLYPH_ADVANCE_PX: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
pub const LINE_ADVANCE_PX: i32 = (GLYPH_HEIGHT + 2) * TEXT_SCALE;

type GlyphRows = [u8; GLYPH_HEIGHT as usize];

const GLYPHS: &[(char, GlyphRows)] = &[
    ('A', [0b010, 0b101, 0b111, 0b101, 0b101]),
    ('B', [0b110, 0b101, 0b110, 0b101, 0b110]),
    ('C', [0b011, 0b100, 0b100, 0b100, 0b011]),
    ('D', [0b110, 0b101, 0b101, 0b101, 0b110]),
    ('E', [0b111, 0b100, 0b110, 0b100, 0b111]),
    ('F', [0b111, 0b100, 0b110, 0b100, 0b100]),
    ('G', [0b011, 0b100, 0b101, 0b101, 0b011]),
    ('H', [0b101, 0b101, 0b111, 0b101, 0b101]),
    ('I', [0b111, 0b010, 0b010, 0b010, 0b111]),
    ('J', [0b001, 0b001, 0b001, 0b101, 0b010]),
    ('K', [0b101, 0b101, 0b110, 0b101, 0b101]),
    ('L', [0b100, 0b100, 0b100, 0b100, 0b111]),
    ('M', [0b101, 0b111, 0b111, 0b101, 0b101]),
    ('N', [0b110, 0b101, 0b101, 0b101, 0b101]),
    ('O', [0b010, 0b101, 0b101, 0b101, 0b010]),
    ('P', [0b110, 0b101, 0b110, 0b100, 0b100]),
    ('Q', [0b010, 0b101, 0b101, 0b110, 0b011]),
    ('R', [0b110, 0b101, 0b110, 0b101, 0b101]),
    ('S', [0b011, 0b100, 0b010, 0b001, 0b110]),
    ('T', [0b111, 0b010, 0b010, 0b010, 0b010]),
    ('U', [0b101, 0b101, 0b101, 0b101, 0b111]),
    ('V', [0b101, 0b101, 0b101, 0b101, 0b010]),
    ('W', [0b101, 0b101, 0b111, 0b111, 0b101]),
    ('X', [0b101, 0b101, 0b010, 0b101, 0b101]),
    ('Y', [0b101, 0b101, 0b010, 0b010, 0b010]),
    ('Z', [0b111, 0b001, 0b010, 0b100, 0b111]),
    ('0', [0b111, 0b101, 0b101, 0b101, 0b111]),
    ('1', [0b010, 0b110, 0b010, 0b010, 0b111]),
    ('2', [0b111, 0b001, 0b111, 0b100, 0b111]),
    ('3', [0b111, 0b001, 0b011, 0b001, 0b111]),
    ('4', [0b101, 0b101, 0b111, 0b001, 0b001]),
    ('5', [0b111, 0b100, 0b111, 0b001, 0b111]),
    ('6', [0b111, 0b100, 0b111, 0b101, 0b111]),
    ('7', [0b111, 0b001, 0b001, 0b010, 0b010]),
    ('8', [0b111, 0b101, 0b111, 0b101, 0b111]),
    ('9', [0b111, 0b101, 0b111, 0b001, 0b111]),
    ('!', [0b010, 0b010, 0b010, 0b000, 0b010]),
    ('?', [0b111, 0b001, 0b011, 0b000, 0b010]),
    ('.', [0b000, 0b000, 0b000, 0b000, 0b010]),
    (',', [0b000, 0b000, 0b000, 0b010, 0b100]),
    (':', [0b000, 0b010, 0b000, 0b010, 0b000]),
    ('\'', [0b010, 0b010, 0b000, 0b000, 0b000]),
    ('-', [0b000, 0b000, 0b111, 0b000, 0b000]),
    ('>', [0b100, 0b010, 0b001, 0b010, 0b100]),
    ('(', [0b001, 0b010, 0b010, 0b010, 0b001]),
    (')', [0b100, 0b010, 0b010, 0b010, 0b100]),
    ('/', [0b001, 0b001, 0b010, 0b100, 0b100]),
];

fn glyph_rows(ch: char) -> Option<GlyphRows> {
    let upper = ch.to_ascii_uppercase();
    GLYPHS
        .iter()
        .find(|(glyph_char, _)| *glyph_char == upper)
        .map(|(_, rows)| *rows)
}

pub fn text_width_px(text: &str) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE_PX
}

/// Greedy word wrap. Explicit newlines always break; a single word wider than
/// `max_width_px` gets a line of its own.
pub fn wrap_text(text: &str, max_width_px: f32) -> Vec<String> {
    let max_width = max_width_px.max(GLYPH_ADVANCE_PX as f32) as i32;
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if line.is_empty() {
                line.push_str(word);
                continue;
            }
            let candidate_width = text_width_px(&line) + GLYPH_ADVANCE_PX + text_width_px(word);
            if candidate_width > max_width {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
            } else {
                line.push(' ');
                line.push_str(word);
            }
        }
        lines.push(line);
    }
    lines
}

pub(super) fn draw_text_into(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    text: &str,
    color: Rgba,
) {
    let mut pen_x = x;
    let mut pen_y = y;
    for ch in text.chars() {
        if ch == '\n' {
            pen_x = x;
            pen_y += LINE_ADVANCE_PX;
            continue;
        }
        if let Some(rows) = glyph_rows(ch) {
            draw_glyph(frame, width, height, pen_x, pen_y, rows, color);
        }
        pen_x += GLYPH_ADVANCE_PX;
    }
}

fn draw_glyph(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rows: GlyphRows,
    color: Rgba,
) {
    for (row_index, row_bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if (row_bits & (1 << (GLYPH_WIDTH - 1 - col))) == 0 {
                continue;
            }
            let left = x + col * TEXT_SCALE;
            let top = y + row_index as i32 * TEXT_SCALE;
            super::renderer::fill_rect_px(
                frame, width, height, left, top, TEXT_SCALE, TEXT_SCALE, color,
            );
        }
    }
}
