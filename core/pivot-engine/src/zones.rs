//! FILENAME: core/pivot-engine/src/zones.rs
//! Field Zones - which fields sit in the Rows, Columns and Values areas.
//!
//! Every field is in exactly one place: the available list or one of the
//! three zones. Edits move fields between places and never duplicate them.
//! `definition()` snapshots the zones into a `PivotDefinition`.

use serde::{Deserialize, Serialize};

use crate::definition::{AggregationType, PivotDefinition, ValueField};
use crate::error::{PivotError, PivotResult};

/// A drop target in the field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Rows,
    Columns,
    Values,
}

/// What `clear_zone` empties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClearTarget {
    Zone(Zone),
    All,
}

impl From<Zone> for ClearTarget {
    fn from(zone: Zone) -> Self {
        ClearTarget::Zone(zone)
    }
}

/// Field assignment state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldZones {
    pub available: Vec<String>,
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<ValueField>,
}

impl FieldZones {
    /// Starts with every header available and every zone empty.
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut available: Vec<String> = Vec::new();
        for header in headers {
            let header = header.into();
            if !available.contains(&header) {
                available.push(header);
            }
        }
        FieldZones {
            available,
            ..FieldZones::default()
        }
    }

    fn is_known(&self, field: &str) -> bool {
        self.available.iter().any(|f| f == field)
            || self.rows.iter().any(|f| f == field)
            || self.columns.iter().any(|f| f == field)
            || self.values.iter().any(|v| v.field == field)
    }

    fn detach(&mut self, field: &str) {
        self.available.retain(|f| f != field);
        self.rows.retain(|f| f != field);
        self.columns.retain(|f| f != field);
        self.values.retain(|v| v.field != field);
    }

    fn make_available(&mut self, field: String) {
        if !self.available.contains(&field) {
            self.available.push(field);
        }
    }

    /// Moves `field` from wherever it is to the end of `zone`.
    /// Fields dropped on Values start out summed.
    pub fn drop_field(&mut self, zone: Zone, field: &str) -> PivotResult<()> {
        if !self.is_known(field) {
            return Err(PivotError::UnknownField(field.to_string()));
        }
        log::debug!("drop_field field={} target={:?}", field, zone);

        self.detach(field);
        match zone {
            Zone::Rows => self.rows.push(field.to_string()),
            Zone::Columns => self.columns.push(field.to_string()),
            Zone::Values => self
                .values
                .push(ValueField::new(field, AggregationType::Sum)),
        }
        Ok(())
    }

    /// Takes `field` out of `zone` and returns it to the available list.
    pub fn remove_field(&mut self, zone: Zone, field: &str) -> PivotResult<()> {
        let removed = match zone {
            Zone::Rows => remove_matching(&mut self.rows, |f| f == field),
            Zone::Columns => remove_matching(&mut self.columns, |f| f == field),
            Zone::Values => remove_matching(&mut self.values, |v| v.field == field),
        };
        if !removed {
            return Err(PivotError::UnknownField(field.to_string()));
        }
        log::debug!("remove_field field={} zone={:?}", field, zone);

        self.make_available(field.to_string());
        Ok(())
    }

    /// Empties one zone (or all of them), returning its fields to the
    /// available list in zone order.
    pub fn clear_zone(&mut self, target: impl Into<ClearTarget>) {
        let target = target.into();
        log::debug!("clear_zone target={:?}", target);

        let zones = match target {
            ClearTarget::Zone(zone) => vec![zone],
            ClearTarget::All => vec![Zone::Rows, Zone::Columns, Zone::Values],
        };
        for zone in zones {
            let fields: Vec<String> = match zone {
                Zone::Rows => std::mem::take(&mut self.rows),
                Zone::Columns => std::mem::take(&mut self.columns),
                Zone::Values => std::mem::take(&mut self.values)
                    .into_iter()
                    .map(|v| v.field)
                    .collect(),
            };
            for field in fields {
                self.make_available(field);
            }
        }
    }

    /// Changes the aggregation of a value field.
    pub fn set_aggregation(&mut self, field: &str, aggregation: AggregationType) -> PivotResult<()> {
        let mut found = false;
        for vf in self.values.iter_mut().filter(|v| v.field == field) {
            vf.aggregation = aggregation;
            found = true;
        }
        if !found {
            return Err(PivotError::NotAValueField(field.to_string()));
        }
        log::debug!("set_aggregation field={} aggregation={}", field, aggregation);
        Ok(())
    }

    /// Snapshot of the zones as a pivot definition.
    pub fn definition(&self) -> PivotDefinition {
        PivotDefinition {
            row_fields: self.rows.clone(),
            column_fields: self.columns.clone(),
            value_fields: self.values.clone(),
        }
    }
}

fn remove_matching<T>(items: &mut Vec<T>, pred: impl Fn(&T) -> bool) -> bool {
    let before = items.len();
    items.retain(|item| !pred(item));
    items.len() != before
}
