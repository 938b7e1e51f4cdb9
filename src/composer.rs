//! Frame serialization: grid cells to an ANSI text stream
//!
//! Layout of one frame:
//!   ESC[H  row 0  CR LF  row 1  ...  row h-1  ESC[0m
//! Occupied cells are `ESC[38;2;R;G;Bm` followed by their glyph. Empty cells
//! are a space, or a dim star where the coordinate hash says so.

use crate::buffer_pool::FrameBuffers;
use crate::color::colorize;
use crate::config::ColorMode;
use crate::shading::glyph;
use std::fmt::{self, Write};

pub const CURSOR_HOME: &str = "\x1b[H";
pub const RESET: &str = "\x1b[0m";
pub const ROW_SEPARATOR: &str = "\r\n";

pub const STAR_GLYPH: char = '.';
pub const STAR_COLOR: (u8, u8, u8) = (16, 16, 22);

// Roughly 2 in 97 cells become stars
const STAR_X_PRIME: u64 = 7919;
const STAR_Y_PRIME: u64 = 104729;
const STAR_SEED: u64 = 12345;
const STAR_MODULUS: u64 = 97;
const STAR_THRESHOLD: u64 = 2;

/// Whether background cell (x, y) shows a star. Depends on nothing else,
/// so the field is identical from frame to frame.
#[inline]
pub fn is_star(x: usize, y: usize) -> bool {
    let h = (x as u64)
        .wrapping_mul(STAR_X_PRIME)
        .wrapping_add((y as u64).wrapping_mul(STAR_Y_PRIME))
        .wrapping_add(STAR_SEED);
    h % STAR_MODULUS < STAR_THRESHOLD
}

#[inline]
fn write_fg<W: Write>(out: &mut W, (r, g, b): (u8, u8, u8)) -> fmt::Result {
    write!(out, "\x1b[38;2;{};{};{}m", r, g, b)
}

/// Serialize `width` x `height` cells row-major into `out`.
///
/// `buffers` must hold exactly `width * height` cells.
pub fn compose<W: Write>(
    out: &mut W,
    buffers: &FrameBuffers<'_>,
    width: usize,
    height: usize,
    mode: ColorMode,
) -> fmt::Result {
    debug_assert_eq!(buffers.len(), width * height);

    out.write_str(CURSOR_HOME)?;

    for y in 0..height {
        if y > 0 {
            out.write_str(ROW_SEPARATOR)?;
        }
        let row = y * width;
        for x in 0..width {
            match buffers.cell(row + x) {
                Some(shade) => {
                    write_fg(out, colorize(mode, &shade))?;
                    out.write_char(glyph(shade.glyph))?;
                },
                None if is_star(x, y) => {
                    write_fg(out, STAR_COLOR)?;
                    out.write_char(STAR_GLYPH)?;
                },
                None => out.write_char(' ')?,
            }
        }
    }

    out.write_str(RESET)
}

/// Text with every CSI control sequence removed
pub fn visible_text(frame: &str) -> String {
    let mut visible = String::with_capacity(frame.len());
    let mut chars = frame.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // ESC [ params final-byte
            if chars.next() == Some('[') {
                for c in chars.by_ref() {
                    if ('@'..='~').contains(&c) {
                        break;
                    }
                }
            }
        } else {
            visible.push(c);
        }
    }
    visible
}
