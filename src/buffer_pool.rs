//! Per-frame scratch buffers sized to the character grid
//!
//! The pool keeps its allocations across frames and only reallocates when the
//! requested cell count changes. It is owned by one renderer and must not be
//! shared between concurrent callers.

/// Depth value of a cell nothing has been drawn into
pub const EMPTY_DEPTH: f64 = f64::NEG_INFINITY;

/// Glyph index of an empty cell (the ramp's leading space)
pub const BLANK_GLYPH: u8 = 0;

/// Everything the composer needs to draw one occupied cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellShade {
    pub glyph: u8,
    pub luminance: f64,
    pub param_u: f64,
    pub normalized_depth: f64,
}

/// Owner of the five per-cell arrays
#[derive(Debug, Default)]
pub struct BufferPool {
    depth: Vec<f64>,
    luminance: Vec<f64>,
    glyph: Vec<u8>,
    param_u: Vec<f64>,
    normalized_depth: Vec<f64>,
    size: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cell count of the most recent request
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Borrow buffers for a frame of `size` cells.
    ///
    /// Depth is reset to [`EMPTY_DEPTH`] and glyphs to [`BLANK_GLYPH`] on every
    /// call. Luminance, u and normalized depth keep stale values; they are only
    /// read for occupied cells, which are rewritten in the same frame.
    pub fn acquire(&mut self, size: usize) -> FrameBuffers<'_> {
        if size != self.size || self.depth.len() != size {
            log::debug!("Reallocating frame buffers: {} -> {} cells", self.size, size);
            self.depth = vec![EMPTY_DEPTH; size];
            self.luminance = vec![0.0; size];
            self.glyph = vec![BLANK_GLYPH; size];
            self.param_u = vec![0.0; size];
            self.normalized_depth = vec![0.0; size];
            self.size = size;
        }

        self.depth.fill(EMPTY_DEPTH);
        self.glyph.fill(BLANK_GLYPH);

        FrameBuffers {
            depth: &mut self.depth,
            luminance: &mut self.luminance,
            glyph: &mut self.glyph,
            param_u: &mut self.param_u,
            normalized_depth: &mut self.normalized_depth,
        }
    }
}

/// Mutable view of the pool for the duration of one frame
#[derive(Debug)]
pub struct FrameBuffers<'a> {
    pub depth: &'a mut [f64],
    pub luminance: &'a mut [f64],
    pub glyph: &'a mut [u8],
    pub param_u: &'a mut [f64],
    pub normalized_depth: &'a mut [f64],
}

impl FrameBuffers<'_> {
    #[inline]
    pub fn len(&self) -> usize {
        self.depth.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    #[inline]
    pub fn is_occupied(&self, idx: usize) -> bool {
        self.depth[idx] > EMPTY_DEPTH
    }

    /// Write all per-cell fields together
    #[inline]
    pub fn write(&mut self, idx: usize, inv_depth: f64, shade: &CellShade) {
        self.depth[idx] = inv_depth;
        self.glyph[idx] = shade.glyph;
        self.luminance[idx] = shade.luminance;
        self.param_u[idx] = shade.param_u;
        self.normalized_depth[idx] = shade.normalized_depth;
    }

    /// Shading of an occupied cell, `None` for background
    #[inline]
    pub fn cell(&self, idx: usize) -> Option<CellShade> {
        self.is_occupied(idx).then(|| CellShade {
            glyph: self.glyph[idx],
            luminance: self.luminance[idx],
            param_u: self.param_u[idx],
            normalized_depth: self.normalized_depth[idx],
        })
    }
}
