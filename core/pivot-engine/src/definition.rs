//! FILENAME: core/pivot-engine/src/definition.rs
//! Pivot Table Definition - The serializable configuration.
//!
//! This module contains all the types needed to DESCRIBE a pivot table.
//! These structures are designed to be:
//! - Serializable (for persisting the active configuration upstream)
//! - Immutable snapshots of user intent
//! - Cheap to compare, so a host can memoize on them

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{PivotError, PivotResult};

// ============================================================================
// AGGREGATION
// ============================================================================

/// Supported aggregation functions for value fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AggregationType {
    #[default]
    #[serde(rename = "sum")]
    Sum,
    #[serde(rename = "avg", alias = "average")]
    Average,
    #[serde(rename = "count")]
    Count,
    #[serde(rename = "max")]
    Max,
    #[serde(rename = "min")]
    Min,
}

impl AggregationType {
    /// Short name used in aggregate keys and column labels.
    pub fn name(&self) -> &'static str {
        match self {
            AggregationType::Sum => "sum",
            AggregationType::Average => "avg",
            AggregationType::Count => "count",
            AggregationType::Max => "max",
            AggregationType::Min => "min",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AggregationType {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sum" => Ok(AggregationType::Sum),
            "avg" | "average" => Ok(AggregationType::Average),
            "count" => Ok(AggregationType::Count),
            "max" => Ok(AggregationType::Max),
            "min" => Ok(AggregationType::Min),
            _ => Err(PivotError::UnknownAggregation(s.to_string())),
        }
    }
}

// ============================================================================
// FIELD DEFINITIONS
// ============================================================================

/// A value field with its aggregation function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueField {
    /// Source field name.
    pub field: String,

    /// The aggregation function to apply.
    #[serde(default)]
    pub aggregation: AggregationType,
}

impl ValueField {
    pub fn new(field: impl Into<String>, aggregation: AggregationType) -> Self {
        ValueField {
            field: field.into(),
            aggregation,
        }
    }

    /// Key of this field's entry in an aggregate map (e.g. "amount_sum").
    pub fn agg_key(&self) -> String {
        format!("{}_{}", self.field, self.aggregation.name())
    }

    /// Header label (e.g. "sum(amount)").
    pub fn label(&self) -> String {
        format!("{}({})", self.aggregation.name(), self.field)
    }
}

// ============================================================================
// MAIN DEFINITION STRUCT
// ============================================================================

/// The complete definition of a pivot table layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotDefinition {
    /// Fields placed in the Row area (ordered from outer to inner).
    pub row_fields: Vec<String>,

    /// Fields placed in the Column area (ordered from outer to inner).
    pub column_fields: Vec<String>,

    /// Fields placed in the Values area.
    pub value_fields: Vec<ValueField>,
}

impl PivotDefinition {
    pub fn new() -> Self {
        PivotDefinition::default()
    }

    pub fn with_rows<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.row_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_columns<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.column_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_value(mut self, field: impl Into<String>, aggregation: AggregationType) -> Self {
        self.value_fields.push(ValueField::new(field, aggregation));
        self
    }

    /// Resolves the degenerate-configuration dispatch once.
    pub fn shape(&self) -> PivotShape {
        PivotShape::resolve(self)
    }
}

// ============================================================================
// PIVOT SHAPE
// ============================================================================

/// Which body a configuration produces.
///
/// Resolved once per recompute; every later stage matches on this instead
/// of re-testing the three field lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PivotShape {
    /// No row fields and nothing that forces a synthetic total row.
    Empty,
    /// No row or column fields, at least one value field: one "total" row.
    ValuesOnly,
    /// Column fields and value fields but no row fields: one "total" row
    /// broken down by the column hierarchy.
    ColumnsOnly,
    /// At least one row field: the general grouped layout.
    Grouped,
}

impl PivotShape {
    pub fn resolve(definition: &PivotDefinition) -> Self {
        let has_rows = !definition.row_fields.is_empty();
        let has_columns = !definition.column_fields.is_empty();
        let has_values = !definition.value_fields.is_empty();

        match (has_rows, has_columns, has_values) {
            (true, _, _) => PivotShape::Grouped,
            (false, false, true) => PivotShape::ValuesOnly,
            (false, true, true) => PivotShape::ColumnsOnly,
            (false, _, false) => PivotShape::Empty,
        }
    }

    /// Whether the body is a single synthetic "total" row.
    pub fn is_single_total(&self) -> bool {
        matches!(self, PivotShape::ValuesOnly | PivotShape::ColumnsOnly)
    }
}

// ============================================================================
// PAGING
// ============================================================================

/// Which slice of the flattened rows to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PageRequest {
    /// Zero-based page index.
    pub page: usize,

    /// Leaf rows per page. Must be positive.
    pub page_size: usize,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: usize = 10;

    pub fn new(page: usize, page_size: usize) -> PivotResult<Self> {
        if page_size == 0 {
            return Err(PivotError::InvalidPageSize);
        }
        Ok(PageRequest { page, page_size })
    }

    pub fn first(page_size: usize) -> PivotResult<Self> {
        PageRequest::new(0, page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest {
            page: 0,
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }
}

// ============================================================================
// CONFIG
// ============================================================================

/// Definition plus page selection, as persisted by the UI-state layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    #[serde(flatten)]
    pub definition: PivotDefinition,

    #[serde(flatten)]
    pub page: PageRequest,
}

impl PivotConfig {
    /// Parses a configuration from JSON and checks the page size.
    pub fn from_json(json: &str) -> PivotResult<Self> {
        let config: PivotConfig = serde_json::from_str(json)?;
        if config.page.page_size == 0 {
            return Err(PivotError::InvalidPageSize);
        }
        Ok(config)
    }

    pub fn to_json(&self) -> PivotResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
