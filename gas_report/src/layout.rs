use crate::db::Schema;
use crate::recap::Aggregate;
use color_eyre::eyre;
use color_eyre::Report;
use gas_exp::Bucket;
use std::ops::Range;

pub const TITLE_ROW: u32 = 0;
pub const KEY_ROW: u32 = 1;
pub const LABEL_ROW: u32 = 2;
pub const FIRST_DATA_ROW: u32 = 4;

pub const PARAMS_TITLE: &str = "Parameters";
pub const RECAP_TITLE: &str = "Recap";
pub const DETAIL_TITLE: &str = "Gas Consumption";

// blank columns between two blocks
const GAP: u16 = 2;

// columns of a worksheet (A to XFD)
pub const MAX_COLUMNS: usize = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Parameters and raw gas measurements only.
    Plain,
    /// Same as `Plain`, with a block of aggregate formulas in between.
    Recap,
}

/// Contiguous columns owned by a single key or aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slots {
    pub first: u16,
    pub width: u16,
}

impl Slots {
    pub fn last(&self) -> u16 {
        self.first + self.width - 1
    }

    pub fn columns(&self) -> Range<u16> {
        self.first..self.first + self.width
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamColumn {
    pub name: String,
    pub col: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasColumn {
    pub key: String,
    pub bucket: Bucket,
    pub slots: Slots,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecapColumn {
    pub aggregate: Aggregate,
    pub slots: Slots,
}

/// Column assignment of a sheet, derived from its template.
#[derive(Debug, Clone)]
pub struct Layout {
    params: Vec<ParamColumn>,
    recap_start: Option<u16>,
    recap: Vec<RecapColumn>,
    detail_start: u16,
    gas: Vec<GasColumn>,
    completed: Option<u16>,
    columns: u16,
}

impl Layout {
    pub fn new(schema: &Schema, variant: Variant) -> Result<Self, Report> {
        let columns = Self::width(schema, variant);
        if columns > MAX_COLUMNS {
            eyre::bail!(
                "{} columns needed ({} proposals) but a worksheet has {}",
                columns,
                schema.proposals(),
                MAX_COLUMNS
            );
        }

        // from here on every column fits in a u16
        let mut cursor = 0;

        let params: Vec<_> = schema
            .params()
            .iter()
            .map(|name| {
                let col = cursor;
                cursor += 1;
                ParamColumn {
                    name: name.clone(),
                    col,
                }
            })
            .collect();
        let completed = schema
            .selection_completed()
            .map(|index| params[index].col);
        cursor += GAP;

        let mut recap = Vec::new();
        let recap_start = match variant {
            Variant::Plain => None,
            Variant::Recap => {
                let start = cursor;
                for aggregate in Aggregate::all() {
                    let slots = Slots {
                        first: cursor,
                        width: aggregate.width(),
                    };
                    cursor += slots.width;
                    recap.push(RecapColumn { aggregate, slots });
                }
                cursor += GAP;
                Some(start)
            }
        };

        let detail_start = cursor;
        let gas = schema
            .gas()
            .iter()
            .map(|key| {
                let slots = Slots {
                    first: cursor,
                    width: schema.slot_width(key) as u16,
                };
                cursor += slots.width;
                GasColumn {
                    key: key.clone(),
                    bucket: Bucket::classify(key),
                    slots,
                }
            })
            .collect();

        debug_assert_eq!(cursor as usize, columns);
        Ok(Self {
            params,
            recap_start,
            recap,
            detail_start,
            gas,
            completed,
            columns: cursor,
        })
    }

    /// Number of columns the layout of `schema` spans.
    fn width(schema: &Schema, variant: Variant) -> usize {
        let recap = match variant {
            Variant::Plain => 0,
            Variant::Recap => {
                Aggregate::all()
                    .iter()
                    .map(|aggregate| aggregate.width() as usize)
                    .sum::<usize>()
                    + GAP as usize
            }
        };
        schema
            .gas()
            .iter()
            .map(|key| schema.slot_width(key))
            .fold(schema.params().len() + GAP as usize + recap, |acc, width| {
                acc.saturating_add(width)
            })
    }

    pub fn params(&self) -> &[ParamColumn] {
        &self.params
    }

    pub fn recap_start(&self) -> Option<u16> {
        self.recap_start
    }

    pub fn recap(&self) -> &[RecapColumn] {
        &self.recap
    }

    pub fn detail_start(&self) -> u16 {
        self.detail_start
    }

    pub fn gas(&self) -> &[GasColumn] {
        &self.gas
    }

    /// Column of the "Selection Completed" parameter.
    pub fn completed_column(&self) -> Option<u16> {
        self.completed
    }

    /// Number of columns spanned by the sheet, gaps included.
    pub fn columns(&self) -> u16 {
        self.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gas_exp::{RunRecord, UserPhase};
    use quickcheck_macros::quickcheck;
    use serde_json::{json, Map, Value};

    fn schema(proposals: usize, gas: Value) -> Schema {
        let record = RunRecord::new(
            json!({
                "# of Clusters": 3,
                "# of Proposals": proposals,
                "Selection Completed": true,
            }),
            gas,
        )
        .unwrap();
        Schema::infer(vec![("run.json", &record)]).unwrap()
    }

    #[test]
    fn plain_test() {
        let schema = schema(
            3,
            json!({"deployment": 1, "submission": {"0": 1}, "total": 2}),
        );
        let layout = Layout::new(&schema, Variant::Plain).unwrap();

        let params: Vec<_> = layout.params().iter().map(|p| p.col).collect();
        assert_eq!(params, vec![0, 1, 2]);
        assert_eq!(layout.completed_column(), Some(2));
        assert_eq!(layout.recap_start(), None);
        assert!(layout.recap().is_empty());

        // two blank columns after the parameters
        assert_eq!(layout.detail_start(), 5);
        let gas: Vec<_> = layout
            .gas()
            .iter()
            .map(|column| (column.key.as_str(), column.slots))
            .collect();
        assert_eq!(
            gas,
            vec![
                ("deployment", Slots { first: 5, width: 1 }),
                ("submission", Slots { first: 6, width: 3 }),
                ("total", Slots { first: 9, width: 1 }),
            ]
        );
        assert_eq!(layout.columns(), 10);
    }

    #[test]
    fn recap_test() {
        let schema = schema(2, json!({"deployment": 1, "reveal": {"0": 1}}));
        let layout = Layout::new(&schema, Variant::Recap).unwrap();

        let recap_width: u16 =
            Aggregate::all().iter().map(|aggregate| aggregate.width()).sum();
        assert_eq!(layout.recap_start(), Some(5));
        assert_eq!(layout.recap()[0].slots, Slots { first: 5, width: 1 });
        assert_eq!(layout.detail_start(), 5 + recap_width + 2);

        let reveal = layout
            .recap()
            .iter()
            .find(|column| {
                column.aggregate == Aggregate::PerUser(UserPhase::Reveal)
            })
            .unwrap();
        assert_eq!(reveal.slots.width, 3);

        let last = layout.gas().last().unwrap();
        assert_eq!(last.bucket, Bucket::PerUser(UserPhase::Reveal));
        assert_eq!(last.slots.last() + 1, layout.columns());
    }

    #[test]
    fn too_many_columns_test() {
        let users = json!({"0": 1});
        let gas = json!({
            "submission": users,
            "tokenApproval": users,
            "commitment": users,
            "reveal": users,
        });
        let schema = schema(20_000, gas.clone());
        for variant in [Variant::Plain, Variant::Recap] {
            assert!(Layout::new(&schema, variant).is_err());
        }

        // the widest layout that still fits
        let proposals = (MAX_COLUMNS - 3 - 2) / 4;
        let layout = Layout::new(&self::schema(proposals, gas), Variant::Plain)
            .unwrap();
        assert_eq!(layout.columns() as usize, MAX_COLUMNS - 3);
        assert_eq!(layout.gas()[3].slots.width as usize, proposals);
    }

    #[quickcheck]
    fn multi_value_keys_span_proposals_check(
        proposals: u8,
        keys: Vec<(bool, u8)>,
    ) -> bool {
        let proposals = proposals as usize % 40;
        // build a gas map mixing single and multi-value keys
        let mut gas = Map::new();
        for (index, (multi, users)) in keys.into_iter().enumerate() {
            if multi {
                let key = gas_exp::gas::MULTI_VALUE_KEYS[index % 4];
                let users: Map<_, _> = (0..(users as usize % (proposals + 1)))
                    .map(|user| (user.to_string(), json!(user)))
                    .collect();
                gas.insert(key.to_string(), Value::Object(users));
            } else {
                gas.insert(format!("key{}", index), json!(index));
            }
        }
        let schema = schema(proposals, Value::Object(gas));

        [Variant::Plain, Variant::Recap].iter().all(|variant| {
            let layout = Layout::new(&schema, *variant).unwrap();
            let mut next = layout.detail_start();
            layout.gas().iter().all(|column| {
                let expected = if gas_exp::gas::is_multi_value(&column.key) {
                    proposals.max(1) as u16
                } else {
                    1
                };
                // columns are contiguous and never overlap
                let contiguous = column.slots.first == next;
                next = column.slots.first + column.slots.width;
                contiguous && column.slots.width == expected
            }) && next == layout.columns()
        })
    }
}
