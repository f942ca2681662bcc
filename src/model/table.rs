//! Block and table types.

/// A block-level item of a part: a paragraph or a table.
///
/// Paragraphs are stored once in `Part::paragraphs`; blocks refer to them by
/// index so tables and the region list can share them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Index into the part's paragraph list
    Paragraph(usize),
    /// A table
    Table(Table),
}

/// A table structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Rows in the table
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns (based on first row).
    pub fn column_count(&self) -> usize {
        self.rows.first().map(|r| r.cells.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Paragraph indexes in row-major, cell-major order. Nested tables are
    /// visited where they appear inside a cell.
    pub fn paragraphs(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for cell in self.rows.iter().flat_map(|r| &r.cells) {
            collect_paragraphs(&cell.blocks, &mut out);
        }
        out
    }
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    /// Cells in the row
    pub cells: Vec<TableCell>,
}

impl TableRow {
    /// Create a new row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self { cells }
    }
}

/// A table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableCell {
    /// Cell content in document order
    pub blocks: Vec<Block>,
}

impl TableCell {
    /// Create a cell with the given content.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Check if the cell has no content.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Collect paragraph indexes of `blocks` in document order, descending
/// into tables.
pub fn collect_paragraphs(blocks: &[Block], out: &mut Vec<usize>) {
    for block in blocks {
        match block {
            Block::Paragraph(idx) => out.push(*idx),
            Block::Table(table) => out.extend(table.paragraphs()),
        }
    }
}
