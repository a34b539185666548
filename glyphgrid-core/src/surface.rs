//! Cell surface - the grid of glyph cells
//!
//! A surface owns `width * height` cells in row-major order
//! (`index = y * width + x`), its default colors, and the binding table
//! that ties effects to cells. Every operation that detaches an effect from
//! a cell, whether through clear, fill, resize or a row shift, goes through
//! that table so the binding invariants always hold.

use crate::bindings::EffectBindings;
use crate::cell::{Appearance, Cell, Mirror};
use crate::color::Color;
use crate::colored_string::ColoredString;
use crate::effect::EffectHandle;
use crate::error::{Error, Result};
use crate::{Point, Rect};

/// A fixed-size grid of cells plus effect bookkeeping
#[derive(Debug)]
pub struct CellSurface {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    default_foreground: Color,
    default_background: Color,
    default_glyph: u32,
    bindings: EffectBindings,
    is_dirty: bool,
    times_shifted_up: usize,
}

impl CellSurface {
    /// Create a surface with white on transparent defaults
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::with_defaults(width, height, Color::WHITE, Color::TRANSPARENT)
    }

    /// Create a surface with the given default colors
    pub fn with_defaults(
        width: usize,
        height: usize,
        foreground: Color,
        background: Color,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidSize { width, height });
        }

        let blank = Cell::with_appearance(Appearance::new(foreground, background));
        Ok(Self {
            width,
            height,
            cells: vec![blank; width * height],
            default_foreground: foreground,
            default_background: background,
            default_glyph: 0,
            bindings: EffectBindings::new(),
            is_dirty: true,
            times_shifted_up: 0,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Area covered by the surface
    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn default_foreground(&self) -> Color {
        self.default_foreground
    }

    pub fn set_default_foreground(&mut self, color: Color) {
        self.default_foreground = color;
    }

    pub fn default_background(&self) -> Color {
        self.default_background
    }

    pub fn set_default_background(&mut self, color: Color) {
        self.default_background = color;
    }

    /// Glyph given to cleared cells
    pub fn default_glyph(&self) -> u32 {
        self.default_glyph
    }

    pub fn set_default_glyph(&mut self, glyph: u32) {
        self.default_glyph = glyph;
    }

    /// Appearance of a freshly cleared cell
    pub fn default_appearance(&self) -> Appearance {
        Appearance::new(self.default_foreground, self.default_background)
            .with_glyph(self.default_glyph)
    }

    /// True when something changed since the last [`CellSurface::mark_clean`]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Total number of rows shifted up over the surface's lifetime
    pub fn times_shifted_up(&self) -> usize {
        self.times_shifted_up
    }

    // ========================================================================
    // Coordinates
    // ========================================================================

    pub fn is_valid_cell(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn is_valid_index(&self, index: usize) -> bool {
        index < self.cells.len()
    }

    /// Flat index of (x, y)
    pub fn index_of(&self, x: usize, y: usize) -> Result<usize> {
        if self.is_valid_cell(x, y) {
            Ok(y * self.width + x)
        } else {
            Err(self.out_of_bounds(x, y))
        }
    }

    /// Coordinates of a flat index
    pub fn point_of(&self, index: usize) -> Result<Point> {
        if self.is_valid_index(index) {
            Ok(Point::from_index(index, self.width))
        } else {
            Err(Error::IndexOutOfRange {
                index,
                len: self.cells.len(),
            })
        }
    }

    fn out_of_bounds(&self, x: usize, y: usize) -> Error {
        Error::OutOfBounds {
            x,
            y,
            width: self.width,
            height: self.height,
        }
    }

    fn check_indices(&self, indices: &[usize]) -> Result<()> {
        match indices.iter().find(|&&index| index >= self.cells.len()) {
            Some(&index) => Err(Error::IndexOutOfRange {
                index,
                len: self.cells.len(),
            }),
            None => Ok(()),
        }
    }

    // ========================================================================
    // Single cells
    // ========================================================================

    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    pub fn cell_at(&self, x: usize, y: usize) -> Option<&Cell> {
        if self.is_valid_cell(x, y) {
            self.cells.get(y * self.width + x)
        } else {
            None
        }
    }

    /// Desired appearance of (x, y)
    pub fn appearance(&self, x: usize, y: usize) -> Result<&Appearance> {
        let index = self.index_of(x, y)?;
        Ok(self.cells[index].desired())
    }

    fn cell_mut_at(&mut self, x: usize, y: usize) -> Result<&mut Cell> {
        let index = self.index_of(x, y)?;
        self.is_dirty = true;
        Ok(&mut self.cells[index])
    }

    pub fn set_glyph(&mut self, x: usize, y: usize, glyph: u32) -> Result<()> {
        self.cell_mut_at(x, y)?.set_glyph(glyph);
        Ok(())
    }

    pub fn set_foreground(&mut self, x: usize, y: usize, color: Color) -> Result<()> {
        self.cell_mut_at(x, y)?.set_foreground(color);
        Ok(())
    }

    pub fn set_background(&mut self, x: usize, y: usize, color: Color) -> Result<()> {
        self.cell_mut_at(x, y)?.set_background(color);
        Ok(())
    }

    pub fn set_mirror(&mut self, x: usize, y: usize, mirror: Mirror) -> Result<()> {
        self.cell_mut_at(x, y)?.set_mirror(mirror);
        Ok(())
    }

    pub fn set_visible(&mut self, x: usize, y: usize, visible: bool) -> Result<()> {
        self.cell_mut_at(x, y)?.set_visible(visible);
        Ok(())
    }

    /// Replace the whole desired appearance of (x, y)
    pub fn set_appearance(&mut self, x: usize, y: usize, appearance: &Appearance) -> Result<()> {
        self.cell_mut_at(x, y)?.set_appearance(appearance);
        Ok(())
    }

    /// Set glyph, colors and effect of (x, y) in one call
    pub fn set_cell(
        &mut self,
        x: usize,
        y: usize,
        glyph: u32,
        foreground: Color,
        background: Color,
        effect: Option<&EffectHandle>,
    ) -> Result<()> {
        let index = self.index_of(x, y)?;
        let cell = &mut self.cells[index];
        cell.set_glyph(glyph);
        cell.set_foreground(foreground);
        cell.set_background(background);
        self.bind_indices(&[index], effect);
        Ok(())
    }

    // ========================================================================
    // Effects
    // ========================================================================

    /// Bind `effect` to (x, y), or detach the cell's effect when None
    pub fn set_effect(&mut self, x: usize, y: usize, effect: Option<&EffectHandle>) -> Result<()> {
        let index = self.index_of(x, y)?;
        self.bind_indices(&[index], effect);
        Ok(())
    }

    /// Bind `effect` to every listed cell in one batch, or detach when None.
    ///
    /// Fails without touching anything if an index is out of range.
    pub fn set_effect_cells(&mut self, indices: &[usize], effect: Option<&EffectHandle>) -> Result<()> {
        self.check_indices(indices)?;
        self.bind_indices(indices, effect);
        Ok(())
    }

    fn bind_indices(&mut self, indices: &[usize], effect: Option<&EffectHandle>) {
        match effect {
            Some(effect) => self.bindings.attach(&mut self.cells, indices, effect),
            None => {
                for &index in indices {
                    self.bindings.detach(&mut self.cells, index);
                }
            }
        }
        self.is_dirty = true;
    }

    /// Effect bound to (x, y)
    pub fn effect(&self, x: usize, y: usize) -> Result<Option<&EffectHandle>> {
        let index = self.index_of(x, y)?;
        Ok(self.bindings.effect_of(index))
    }

    /// Every live effect on the surface
    pub fn effects(&self) -> impl Iterator<Item = &EffectHandle> + '_ {
        self.bindings.handles()
    }

    /// Number of distinct live effects
    pub fn effect_count(&self) -> usize {
        self.bindings.len()
    }

    /// The binding table, read-only
    pub fn bindings(&self) -> &EffectBindings {
        &self.bindings
    }

    /// Detach `effect` from every cell it is bound to
    pub fn remove_effect(&mut self, effect: &EffectHandle) {
        self.bindings.remove(&mut self.cells, effect);
        self.is_dirty = true;
    }

    pub fn remove_all_effects(&mut self) {
        self.bindings.clear(&mut self.cells);
        self.is_dirty = true;
    }

    /// Advance every effect by `elapsed` seconds and re-apply it.
    ///
    /// Call once per frame. Returns true if any cell's actual appearance
    /// changed, which also marks the surface dirty.
    pub fn update_effects(&mut self, elapsed: f64) -> bool {
        let changed = self.bindings.update(&mut self.cells, elapsed);
        if changed {
            self.is_dirty = true;
        }
        changed
    }

    /// Check the binding invariants against the cell array
    pub fn is_consistent(&self) -> bool {
        self.bindings.is_consistent(&self.cells)
    }

    // ========================================================================
    // Print
    // ========================================================================

    /// Indices covered by printing `count` glyphs from (x, y), clipped at the
    /// end of the cell array
    fn print_span(&self, x: usize, y: usize, count: usize) -> Result<std::ops::Range<usize>> {
        let start = self.index_of(x, y)?;
        let end = (start + count).min(self.cells.len());
        Ok(start..end)
    }

    /// Write glyphs starting at (x, y). Text runs on into the following rows
    /// and is clipped at the end of the surface.
    pub fn print(&mut self, x: usize, y: usize, text: &str) -> Result<()> {
        let span = self.print_span(x, y, text.chars().count())?;
        for (cell, ch) in self.cells[span].iter_mut().zip(text.chars()) {
            cell.set_glyph(ch as u32);
        }
        self.is_dirty = true;
        Ok(())
    }

    /// Print with a full appearance and bind `effect` to exactly the printed
    /// cells (None detaches their effects)
    pub fn print_with(
        &mut self,
        x: usize,
        y: usize,
        text: &str,
        appearance: &Appearance,
        effect: Option<&EffectHandle>,
    ) -> Result<()> {
        let span = self.print_span(x, y, text.chars().count())?;
        for (cell, ch) in self.cells[span.clone()].iter_mut().zip(text.chars()) {
            cell.set_appearance(&appearance.with_glyph(ch as u32));
        }
        let indices: Vec<usize> = span.collect();
        self.bind_indices(&indices, effect);
        Ok(())
    }

    /// Print with a foreground color
    pub fn print_fg(&mut self, x: usize, y: usize, text: &str, foreground: Color) -> Result<()> {
        let span = self.print_span(x, y, text.chars().count())?;
        for (cell, ch) in self.cells[span].iter_mut().zip(text.chars()) {
            cell.set_glyph(ch as u32);
            cell.set_foreground(foreground);
        }
        self.is_dirty = true;
        Ok(())
    }

    /// Print with foreground and background colors
    pub fn print_colors(
        &mut self,
        x: usize,
        y: usize,
        text: &str,
        foreground: Color,
        background: Color,
    ) -> Result<()> {
        let span = self.print_span(x, y, text.chars().count())?;
        for (cell, ch) in self.cells[span].iter_mut().zip(text.chars()) {
            cell.set_glyph(ch as u32);
            cell.set_foreground(foreground);
            cell.set_background(background);
        }
        self.is_dirty = true;
        Ok(())
    }

    /// Print a colored string, honouring its ignore flags
    pub fn print_colored(&mut self, x: usize, y: usize, text: &ColoredString) -> Result<()> {
        let span = self.print_span(x, y, text.len())?;
        for (index, glyph) in span.zip(text.iter()) {
            let cell = &mut self.cells[index];
            if !text.ignore_glyph {
                cell.set_glyph(glyph.glyph);
            }
            if !text.ignore_foreground {
                cell.set_foreground(glyph.foreground);
            }
            if !text.ignore_background {
                cell.set_background(glyph.background);
            }
            if !text.ignore_mirror {
                cell.set_mirror(glyph.mirror);
            }
            if !text.ignore_effect {
                self.bind_indices(&[index], glyph.effect.as_ref());
            }
        }
        self.is_dirty = true;
        Ok(())
    }

    /// Read back `length` glyphs as text starting at a flat index, clipped
    /// at the end of the surface. An invalid index gives an empty string.
    pub fn get_string(&self, index: usize, length: usize) -> String {
        self.cells
            .get(index..)
            .unwrap_or_default()
            .iter()
            .take(length)
            .map(|cell| cell.desired().glyph_char())
            .collect()
    }

    /// [`CellSurface::get_string`] starting at (x, y)
    pub fn get_string_at(&self, x: usize, y: usize, length: usize) -> String {
        match self.index_of(x, y) {
            Ok(index) => self.get_string(index, length),
            Err(_) => String::new(),
        }
    }

    // ========================================================================
    // Copy
    // ========================================================================

    fn copy_cell_to(&self, index: usize, destination: &mut CellSurface, dest_index: usize) {
        self.cells[index].copy_appearance_to(&mut destination.cells[dest_index]);
        let effect = self.bindings.effect_of(index);
        destination.bind_indices(&[dest_index], effect);
    }

    /// Copy appearance and effects of the overlapping area into
    /// `destination` at the same coordinates
    pub fn copy_to(&self, destination: &mut CellSurface) {
        let width = self.width.min(destination.width);
        let height = self.height.min(destination.height);
        for y in 0..height {
            for x in 0..width {
                self.copy_cell_to(y * self.width + x, destination, y * destination.width + x);
            }
        }
    }

    /// Copy everything from (x, y) onwards into `destination` at (0, 0)
    pub fn copy_from_to(&self, x: usize, y: usize, destination: &mut CellSurface) -> Result<()> {
        self.index_of(x, y)?;
        let width = (self.width - x).min(destination.width);
        let height = (self.height - y).min(destination.height);
        for dy in 0..height {
            for dx in 0..width {
                let source = (y + dy) * self.width + x + dx;
                self.copy_cell_to(source, destination, dy * destination.width + dx);
            }
        }
        Ok(())
    }

    /// Copy `region` into `destination` at (0, 0), clipped to the
    /// destination. The region must lie inside this surface.
    pub fn copy_region_to(&self, region: Rect, destination: &mut CellSurface) -> Result<()> {
        self.check_region(&region)?;
        let width = region.width.min(destination.width);
        let height = region.height.min(destination.height);
        for dy in 0..height {
            for dx in 0..width {
                let source = (region.y + dy) * self.width + region.x + dx;
                self.copy_cell_to(source, destination, dy * destination.width + dx);
            }
        }
        Ok(())
    }

    /// Copy `region` into `destination` at (dest_x, dest_y). Cells that
    /// land outside the destination are skipped.
    pub fn copy_region_to_at(
        &self,
        region: Rect,
        destination: &mut CellSurface,
        dest_x: usize,
        dest_y: usize,
    ) -> Result<()> {
        self.check_region(&region)?;
        for point in region.points() {
            let (tx, ty) = (dest_x + point.x - region.x, dest_y + point.y - region.y);
            if let Ok(dest_index) = destination.index_of(tx, ty) {
                self.copy_cell_to(point.to_index(self.width), destination, dest_index);
            }
        }
        Ok(())
    }

    fn check_region(&self, region: &Rect) -> Result<()> {
        if self.area().contains_rect(region) {
            Ok(())
        } else {
            Err(Error::InvalidRegion {
                x: region.x,
                y: region.y,
                width: region.width,
                height: region.height,
            })
        }
    }

    // ========================================================================
    // Clear / fill
    // ========================================================================

    /// Reset every cell to the defaults and detach every effect
    pub fn clear(&mut self) {
        self.bindings.clear(&mut self.cells);
        let blank = self.default_appearance();
        for cell in &mut self.cells {
            cell.set_appearance(&blank);
        }
        self.is_dirty = true;
    }

    /// Reset (x, y) to the defaults and detach its effect
    pub fn clear_cell(&mut self, x: usize, y: usize) -> Result<()> {
        let index = self.index_of(x, y)?;
        self.bindings.detach(&mut self.cells, index);
        let blank = self.default_appearance();
        self.cells[index].set_appearance(&blank);
        self.is_dirty = true;
        Ok(())
    }

    /// Set colors and glyph of every cell and bind `effect` to all of them in
    /// one batch (None detaches every effect)
    pub fn fill(
        &mut self,
        foreground: Color,
        background: Color,
        glyph: u32,
        effect: Option<&EffectHandle>,
    ) {
        for cell in &mut self.cells {
            cell.set_foreground(foreground);
            cell.set_background(background);
            cell.set_glyph(glyph);
        }
        let indices: Vec<usize> = (0..self.cells.len()).collect();
        self.bind_indices(&indices, effect);
    }

    /// [`CellSurface::fill`] restricted to `area`, which must lie inside the
    /// surface
    pub fn fill_area(
        &mut self,
        area: Rect,
        foreground: Color,
        background: Color,
        glyph: u32,
        effect: Option<&EffectHandle>,
    ) -> Result<()> {
        self.check_region(&area)?;
        let indices: Vec<usize> = area.points().map(|p| p.to_index(self.width)).collect();
        for &index in &indices {
            let cell = &mut self.cells[index];
            cell.set_foreground(foreground);
            cell.set_background(background);
            cell.set_glyph(glyph);
        }
        self.bind_indices(&indices, effect);
        Ok(())
    }

    // ========================================================================
    // Shift / resize
    // ========================================================================

    /// Move every row up by `rows`; the rows vacated at the bottom are
    /// cleared. Effects travel with their cells.
    pub fn shift_rows_up(&mut self, rows: usize) {
        let rows = rows.min(self.height);
        if rows == 0 {
            return;
        }
        let shift = rows * self.width;
        for index in 0..shift {
            self.bindings.detach(&mut self.cells, index);
        }

        self.cells.rotate_left(shift);
        let blank = Cell::with_appearance(self.default_appearance());
        let len = self.cells.len();
        self.cells[len - shift..].fill(blank);
        self.bindings
            .remap(&mut self.cells, |old| old.checked_sub(shift));

        self.times_shifted_up += rows;
        self.is_dirty = true;
    }

    /// Move every row down by `rows`; the rows vacated at the top are
    /// cleared. Effects travel with their cells.
    pub fn shift_rows_down(&mut self, rows: usize) {
        let rows = rows.min(self.height);
        if rows == 0 {
            return;
        }
        let shift = rows * self.width;
        let len = self.cells.len();
        for index in len - shift..len {
            self.bindings.detach(&mut self.cells, index);
        }

        self.cells.rotate_right(shift);
        let blank = Cell::with_appearance(self.default_appearance());
        self.cells[..shift].fill(blank);
        self.bindings
            .remap(&mut self.cells, |old| Some(old + shift).filter(|&i| i < len));

        self.is_dirty = true;
    }

    /// Change the surface size. Cells keep their appearance and effect by
    /// position; cells that fall outside are detached first, new cells get
    /// the defaults.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidSize { width, height });
        }
        let (old_width, old_height) = (self.width, self.height);
        if (width, height) == (old_width, old_height) {
            return Ok(());
        }

        for index in 0..self.cells.len() {
            let point = Point::from_index(index, old_width);
            if point.x >= width || point.y >= height {
                self.bindings.detach(&mut self.cells, index);
            }
        }

        let blank = Cell::with_appearance(self.default_appearance());
        let mut cells = vec![blank; width * height];
        for y in 0..old_height.min(height) {
            for x in 0..old_width.min(width) {
                cells[y * width + x] = self.cells[y * old_width + x].clone();
            }
        }

        self.cells = cells;
        self.width = width;
        self.height = height;
        self.bindings.remap(&mut self.cells, |old| {
            let point = Point::from_index(old, old_width);
            (point.x < width && point.y < height).then(|| point.to_index(width))
        });

        log::debug!("resized surface {old_width}x{old_height} -> {width}x{height}");
        self.is_dirty = true;
        Ok(())
    }
}
