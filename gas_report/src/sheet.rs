use crate::db::ExperimentGroup;
use crate::fmt::CellFmt;
use crate::layout::{self, Layout, Variant};
use crate::recap;
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use gas_exp::{gas, GasValue, RunRecord};
use serde_json::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Boolean(bool),
    Formula(String),
}

impl Cell {
    /// `null` has no cell; arrays and objects are kept as their JSON text.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(value) => Some(Cell::Boolean(*value)),
            Value::Number(number) => number.as_f64().map(Cell::Number),
            Value::String(text) => Some(Cell::Text(text.clone())),
            other => Some(Cell::Text(other.to_string())),
        }
    }
}

/// Content of a worksheet, fully laid out but not yet rendered.
#[derive(Debug, Clone)]
pub struct SheetData {
    group: String,
    cells: BTreeMap<(u32, u16), Cell>,
    // longest text shown in each column
    lengths: BTreeMap<u16, usize>,
    columns: u16,
    rows: u32,
    completed: Option<u16>,
}

impl SheetData {
    pub fn build(
        group: &ExperimentGroup,
        variant: Variant,
    ) -> Result<Self, Report> {
        let layout = Layout::new(group.schema(), variant)
            .wrap_err_with(|| format!("lay out group {}", group.name()))?;
        let mut sheet = Self {
            group: group.name().to_string(),
            cells: BTreeMap::new(),
            lengths: BTreeMap::new(),
            columns: layout.columns(),
            rows: 0,
            completed: layout.completed_column(),
        };

        sheet.write_headers(&layout);
        for run in group.runs() {
            let row = layout::FIRST_DATA_ROW + sheet.rows;
            let filled = sheet.write_run(&layout, row, &run.record);
            if variant == Variant::Recap {
                for (col, formula) in recap::formulas(&layout, row, &filled) {
                    sheet.put(row, col, Cell::Formula(formula));
                }
            }
            sheet.rows += 1;
        }

        tracing::debug!(
            "sheet {} laid out: {} rows, {} columns",
            sheet.group,
            sheet.rows,
            sheet.columns
        );
        Ok(sheet)
    }

    fn write_headers(&mut self, layout: &Layout) {
        self.put_text(layout::TITLE_ROW, 0, layout::PARAMS_TITLE, true);
        for param in layout.params() {
            self.put_text(layout::LABEL_ROW, param.col, &param.name, true);
        }

        if let Some(start) = layout.recap_start() {
            self.put_text(layout::TITLE_ROW, start, layout::RECAP_TITLE, true);
            for column in layout.recap() {
                let aggregate = column.aggregate;
                // names spanning several columns do not size the first one
                let tracked = column.slots.width == 1;
                self.put_text(
                    layout::KEY_ROW,
                    column.slots.first,
                    aggregate.name(),
                    tracked,
                );
                let labels = aggregate.labels();
                for (col, label) in column.slots.columns().zip(labels) {
                    self.put_text(layout::LABEL_ROW, col, label, true);
                }
            }
        }

        let start = layout.detail_start();
        self.put_text(layout::TITLE_ROW, start, layout::DETAIL_TITLE, true);
        for column in layout.gas() {
            let multi_value = gas::is_multi_value(&column.key);
            self.put_text(
                layout::KEY_ROW,
                column.slots.first,
                &column.key,
                !multi_value,
            );
            if multi_value {
                for (user, col) in column.slots.columns().enumerate() {
                    self.track(col, user.to_string().len());
                    self.put(layout::LABEL_ROW, col, Cell::Number(user as f64));
                }
            }
        }
    }

    /// Writes the parameters and gas values of a run against the template.
    /// Returns, for each gas column of the layout, the cells that were
    /// written.
    fn write_run(
        &mut self,
        layout: &Layout,
        row: u32,
        record: &RunRecord,
    ) -> Vec<Vec<u16>> {
        for param in layout.params() {
            if let Some(value) = record.params.get(&param.name) {
                self.put_value(row, param.col, value);
            }
        }

        let mut filled = Vec::with_capacity(layout.gas().len());
        for column in layout.gas() {
            let mut cols = Vec::new();
            match record.gas_value(&column.key) {
                Some(GasValue::Single(value)) => {
                    if self.put_value(row, column.slots.first, &value) {
                        cols.push(column.slots.first);
                    }
                }
                Some(GasValue::PerUser(values)) => {
                    // a run with fewer users leaves the trailing slots blank
                    for (col, value) in column.slots.columns().zip(&values) {
                        if self.put_value(row, col, value) {
                            cols.push(col);
                        }
                    }
                }
                None => {}
            }
            filled.push(cols);
        }
        filled
    }

    fn put_value(&mut self, row: u32, col: u16, value: &Value) -> bool {
        match Cell::from_json(value) {
            Some(cell) => {
                self.track(col, CellFmt::display_len(value));
                self.put(row, col, cell);
                true
            }
            None => false,
        }
    }

    fn put_text(&mut self, row: u32, col: u16, text: &str, tracked: bool) {
        if tracked {
            self.track(col, text.chars().count());
        }
        self.put(row, col, Cell::Text(text.to_string()));
    }

    fn put(&mut self, row: u32, col: u16, cell: Cell) {
        self.cells.insert((row, col), cell);
    }

    fn track(&mut self, col: u16, len: usize) {
        let current = self.lengths.entry(col).or_insert(0);
        *current = (*current).max(len);
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.cells.get(&(row, col))
    }

    pub fn cells(&self) -> impl Iterator<Item = (u32, u16, &Cell)> + '_ {
        self.cells.iter().map(|(&(row, col), cell)| (row, col, cell))
    }

    pub fn columns(&self) -> u16 {
        self.columns
    }

    /// Number of data rows, one per run.
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Width of a column: its longest text plus one character of padding.
    pub fn column_width(&self, col: u16) -> f64 {
        (self.lengths.get(&col).copied().unwrap_or(0) + 1) as f64
    }

    /// Cells to color by completion: first and last data row, and the
    /// column of the "Selection Completed" parameter.
    pub fn completed_range(&self) -> Option<(u32, u32, u16)> {
        if self.rows == 0 {
            return None;
        }
        let first = layout::FIRST_DATA_ROW;
        self.completed
            .map(|col| (first, first + self.rows - 1, col))
    }
}
