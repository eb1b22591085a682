//! Raw bar frame schema.
//!
//! Required columns: `code` (string), `date` (date or ISO string), and the
//! numeric columns `open`, `high`, `low`, `close`, `volume` (any float or
//! integer type). A missing column fails the whole frame, and so does a
//! null `code`, since that row belongs to no instrument. Nulls in the other
//! columns are left to `bars_from_frame`, which charges them to the row's
//! instrument.

use polars::prelude::*;

/// Expected schema for raw bar frames.
pub struct BarSchema;

impl BarSchema {
    pub const CODE: &'static str = "code";
    pub const DATE: &'static str = "date";
    pub const NUMERIC: [&'static str; 5] = ["open", "high", "low", "close", "volume"];

    /// Canonical schema, as written by `bars_to_frame`.
    pub fn schema() -> Schema {
        let mut fields = vec![
            Field::new(Self::CODE.into(), DataType::String),
            Field::new(Self::DATE.into(), DataType::Date),
        ];
        fields.extend(
            Self::NUMERIC
                .iter()
                .map(|name| Field::new((*name).into(), DataType::Float64)),
        );
        Schema::from_iter(fields)
    }

    /// Check presence and type of every required column, and that every row
    /// carries a code.
    pub fn validate(df: &DataFrame) -> Result<(), SchemaError> {
        let schema = df.schema();
        let required = std::iter::once(Self::CODE)
            .chain(std::iter::once(Self::DATE))
            .chain(Self::NUMERIC);

        for name in required {
            let dtype = schema
                .get(name)
                .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))?;
            if !Self::accepts(name, dtype) {
                return Err(SchemaError::TypeMismatch {
                    column: name.to_string(),
                    actual: dtype.clone(),
                });
            }
            if name != Self::CODE {
                continue;
            }
            if let Some(row) = first_null(df, name) {
                return Err(SchemaError::NullValue {
                    column: name.to_string(),
                    row,
                });
            }
        }

        Ok(())
    }

    fn accepts(name: &str, dtype: &DataType) -> bool {
        match name {
            Self::CODE => matches!(dtype, DataType::String),
            Self::DATE => matches!(dtype, DataType::Date | DataType::String),
            _ => matches!(
                dtype,
                DataType::Float64
                    | DataType::Float32
                    | DataType::Int64
                    | DataType::Int32
                    | DataType::UInt64
                    | DataType::UInt32
            ),
        }
    }
}

fn first_null(df: &DataFrame, name: &str) -> Option<usize> {
    let column = df.column(name).ok()?;
    if column.null_count() == 0 {
        return None;
    }
    column
        .as_materialized_series()
        .is_null()
        .into_iter()
        .position(|v| v == Some(true))
}

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column: {0}")]
    MissingColumn(String),

    #[error("column {column} has unsupported type {actual:?}")]
    TypeMismatch { column: String, actual: DataType },

    #[error("missing value in column {column} at row {row}")]
    NullValue { column: String, row: usize },
}
