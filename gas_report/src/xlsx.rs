use crate::sheet::{Cell, SheetData};
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use rust_xlsxwriter::{
    Color, ConditionalFormatCell, ConditionalFormatCellRule, Format, Formula,
    Workbook,
};
use std::collections::HashSet;
use std::path::Path;

const COMPLETED_COLOR: u32 = 0x008000;
const NOT_COMPLETED_COLOR: u32 = 0xFF0000;

const MAX_SHEET_NAME_LEN: usize = 31;
const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];
const DEFAULT_SHEET_NAME: &str = "results";

/// The output workbook. Sheets are rendered as they are added; nothing is
/// written to disk until `save`.
pub struct XlsxReport {
    workbook: Workbook,
    // lowercase, as sheet names are case-insensitive
    sheet_names: HashSet<String>,
}

impl XlsxReport {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
            sheet_names: HashSet::new(),
        }
    }

    /// Renders a sheet and returns the worksheet name it was given.
    pub fn add_sheet(&mut self, sheet: &SheetData) -> Result<String, Report> {
        let name = sheet_name(sheet.group(), &self.sheet_names);
        self.sheet_names.insert(name.to_lowercase());

        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&name)
            .wrap_err_with(|| format!("set sheet name {:?}", name))?;

        for (row, col, cell) in sheet.cells() {
            match cell {
                Cell::Text(text) => worksheet.write_string(row, col, text),
                Cell::Number(number) => {
                    worksheet.write_number(row, col, *number)
                }
                Cell::Boolean(value) => {
                    worksheet.write_boolean(row, col, *value)
                }
                Cell::Formula(formula) => {
                    worksheet.write_formula(row, col, Formula::new(formula))
                }
            }
            .wrap_err_with(|| {
                format!("write cell ({}, {}) of sheet {}", row, col, name)
            })?;
        }

        for col in 0..sheet.columns() {
            worksheet
                .set_column_width(col, sheet.column_width(col))
                .wrap_err_with(|| format!("set width of column {}", col))?;
        }

        if let Some((first, last, col)) = sheet.completed_range() {
            for conditional_format in completion_formats().iter() {
                worksheet
                    .add_conditional_format(
                        first,
                        col,
                        last,
                        col,
                        conditional_format,
                    )
                    .wrap_err("add completion conditional format")?;
            }
        }

        tracing::info!(
            "sheet {} written: {} rows, {} columns",
            name,
            sheet.rows(),
            sheet.columns()
        );
        Ok(name)
    }

    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), Report> {
        let path = path.as_ref();
        self.workbook
            .save(path)
            .wrap_err_with(|| format!("save workbook {}", path.display()))?;
        tracing::info!("workbook saved to {}", path.display());
        Ok(())
    }
}

/// Green and red backgrounds for completed and not completed selections.
/// Cells hold booleans, so the rules compare against the `TRUE`/`FALSE`
/// literals and not against the strings.
fn completion_formats() -> [ConditionalFormatCell; 2] {
    let rule = |value: &str, color: u32| {
        ConditionalFormatCell::new()
            .set_rule(ConditionalFormatCellRule::EqualTo(Formula::new(value)))
            .set_format(Format::new().set_background_color(Color::RGB(color)))
    };
    [
        rule("TRUE", COMPLETED_COLOR),
        rule("FALSE", NOT_COMPLETED_COLOR),
    ]
}

impl Default for XlsxReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns a group folder name into a valid worksheet name, unique among
/// `taken` (lowercase names).
pub fn sheet_name(group: &str, taken: &HashSet<String>) -> String {
    let sanitized: String = group
        .chars()
        .map(|c| {
            if INVALID_SHEET_NAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();
    // names cannot start or end with an apostrophe
    let sanitized = sanitized.trim_matches('\'');
    let base = if sanitized.is_empty() {
        DEFAULT_SHEET_NAME
    } else {
        sanitized
    };

    let mut name = truncate(base, MAX_SHEET_NAME_LEN);
    let mut copy = 1;
    while taken.contains(&name.to_lowercase()) {
        copy += 1;
        let suffix = format!(" ({})", copy);
        let len = MAX_SHEET_NAME_LEN - suffix.chars().count();
        name = format!("{}{}", truncate(base, len), suffix);
    }
    name
}

fn truncate(name: &str, len: usize) -> String {
    name.chars().take(len).collect()
}
