//! Aggregate columns of the recap block.
//!
//! Aggregates are emitted as spreadsheet formulas over the detail cells of
//! the same row, so the workbook stays consistent if a measurement is edited
//! by hand.

use crate::fmt::CellFmt;
use crate::layout::Layout;
use gas_exp::{Bucket, UserPhase};

/// Labels of the three slots of a per-user aggregate.
pub const USER_LABELS: [&str; 3] = ["User #1", "User #n", "Average"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    TotalCost,
    Deployment,
    Partitioning,
    Algorithm,
    Selection,
    PerUser(UserPhase),
    TotalPerUser,
}

impl Aggregate {
    /// All aggregates, in column order.
    pub fn all() -> Vec<Self> {
        let mut all = vec![
            Aggregate::TotalCost,
            Aggregate::Deployment,
            Aggregate::Partitioning,
            Aggregate::Algorithm,
            Aggregate::Selection,
        ];
        all.extend(UserPhase::all().into_iter().map(Aggregate::PerUser));
        all.push(Aggregate::TotalPerUser);
        all
    }

    pub fn name(&self) -> &'static str {
        match self {
            Aggregate::TotalCost => "Total Cost",
            Aggregate::Deployment => "Deployment",
            Aggregate::Partitioning => "Partitioning/Assignment",
            Aggregate::Algorithm => "Algorithm",
            Aggregate::Selection => "Selection",
            Aggregate::PerUser(phase) => phase.name(),
            Aggregate::TotalPerUser => "Total per User",
        }
    }

    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            Aggregate::PerUser(_) | Aggregate::TotalPerUser => &USER_LABELS,
            _ => &[],
        }
    }

    pub fn width(&self) -> u16 {
        self.labels().len().max(1) as u16
    }

    fn bucket(&self) -> Option<Bucket> {
        match self {
            Aggregate::Deployment => Some(Bucket::Deployment),
            Aggregate::Partitioning => Some(Bucket::Partitioning),
            Aggregate::Algorithm => Some(Bucket::Algorithm),
            Aggregate::Selection => Some(Bucket::Selection),
            Aggregate::PerUser(phase) => Some(Bucket::PerUser(*phase)),
            Aggregate::TotalCost | Aggregate::TotalPerUser => None,
        }
    }
}

/// Computes the recap formulas of a data row.
///
/// `filled` holds, for each gas column of the layout (in the same order),
/// the detail columns that received a value in this row. Aggregates without
/// any filled cell are left out; the remaining formulas keep their fixed
/// columns.
pub fn formulas(
    layout: &Layout,
    row: u32,
    filled: &[Vec<u16>],
) -> Vec<(u16, String)> {
    let mut formulas = Vec::new();
    // first recap column of each per-user aggregate written in this row
    let mut per_user = Vec::new();

    for column in layout.recap() {
        let first = column.slots.first;
        match column.aggregate {
            Aggregate::TotalCost => {
                // the run's own total would be counted twice
                let measured = layout
                    .gas()
                    .iter()
                    .zip(filled)
                    .filter(|(gas, _)| gas.bucket != Bucket::Total);
                let populated =
                    measured.clone().any(|(_, cols)| !cols.is_empty());
                if !populated {
                    continue;
                }
                let cols: Vec<_> =
                    measured.flat_map(|(gas, _)| gas.slots.columns()).collect();
                formulas.push((first, sum(row, &cols)));
            }
            Aggregate::PerUser(_) => {
                let cols = bucket_cells(layout, filled, column.aggregate);
                let (min, max) = match (cols.iter().min(), cols.iter().max()) {
                    (Some(min), Some(max)) => (*min, *max),
                    _ => continue,
                };
                formulas.push((first, format!("={}", CellFmt::cell(row, min))));
                formulas
                    .push((first + 1, format!("={}", CellFmt::cell(row, max))));
                formulas.push((
                    first + 2,
                    format!("=AVERAGE({})", CellFmt::range(row, min, max)),
                ));
                per_user.push(first);
            }
            Aggregate::TotalPerUser => {
                if per_user.is_empty() {
                    continue;
                }
                for offset in column.slots.columns().map(|col| col - first) {
                    let cols: Vec<_> =
                        per_user.iter().map(|col| col + offset).collect();
                    formulas.push((first + offset, sum(row, &cols)));
                }
            }
            _ => {
                let cols = bucket_cells(layout, filled, column.aggregate);
                if !cols.is_empty() {
                    formulas.push((first, sum(row, &cols)));
                }
            }
        }
    }
    formulas
}

fn bucket_cells(
    layout: &Layout,
    filled: &[Vec<u16>],
    aggregate: Aggregate,
) -> Vec<u16> {
    layout
        .gas()
        .iter()
        .zip(filled)
        .filter(|(gas, _)| Some(gas.bucket) == aggregate.bucket())
        .flat_map(|(_, cols)| cols.iter().copied())
        .collect()
}

fn sum(row: u32, cols: &[u16]) -> String {
    format!("=SUM({})", CellFmt::ranges(row, cols).join(","))
}
