// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.
pub mod literal;

use arrow::array::{Array, ArrayRef, new_null_array};
use arrow::compute::{cast, concat};
use arrow::datatypes::DataType;

use crate::common::error::{ErrorKind, ExprError, Result};
use crate::types::format_type_name;

/// Scalar literal carried by constant columns.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Null,
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Float32(f32),
    Float64(f64),
    Utf8(String),
    Binary(Vec<u8>),
    Date32(i32),
    Decimal128 {
        value: i128,
        precision: u8,
        scale: i8,
    },
}

/// A column value: either a materialized Arrow array or a constant
/// (one scalar plus a logical row count).
///
/// Constant columns are how planning-time values travel through the DAG;
/// the executor materializes them lazily.
#[derive(Clone, Debug)]
pub enum Column {
    Const {
        value: LiteralValue,
        data_type: DataType,
        len: usize,
    },
    Full(ArrayRef),
}

impl Column {
    pub fn constant(data_type: DataType, value: LiteralValue, len: usize) -> Self {
        Column::Const {
            value,
            data_type,
            len,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Const { len, .. } => *len,
            Column::Full(arr) => arr.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> &DataType {
        match self {
            Column::Const { data_type, .. } => data_type,
            Column::Full(arr) => arr.data_type(),
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Column::Const { .. })
    }

    pub fn as_const(&self) -> Option<&LiteralValue> {
        match self {
            Column::Const { value, .. } => Some(value),
            Column::Full(_) => None,
        }
    }

    /// Display name used by diagnostics, e.g. `Const(Int64)` or `Int64`.
    pub fn name(&self) -> String {
        match self {
            Column::Const { data_type, .. } => format!("Const({})", format_type_name(data_type)),
            Column::Full(arr) => format_type_name(arr.data_type()),
        }
    }

    /// Copy with a different logical row count. Full arrays are truncated or
    /// padded with nulls.
    pub fn clone_resized(&self, new_len: usize) -> Result<Column> {
        match self {
            Column::Const {
                value, data_type, ..
            } => Ok(Column::Const {
                value: value.clone(),
                data_type: data_type.clone(),
                len: new_len,
            }),
            Column::Full(arr) => {
                if new_len <= arr.len() {
                    Ok(Column::Full(arr.slice(0, new_len)))
                } else {
                    let pad = new_null_array(arr.data_type(), new_len - arr.len());
                    let out = concat(&[arr.as_ref(), pad.as_ref()])
                        .map_err(|e| ExprError::new(ErrorKind::LogicalError, e.to_string()))?;
                    Ok(Column::Full(out))
                }
            }
        }
    }

    /// Expand to a plain Arrow array of `self.len()` rows.
    pub fn materialized(&self) -> Result<ArrayRef> {
        match self {
            Column::Const {
                value,
                data_type,
                len,
            } => {
                if matches!(value, LiteralValue::Null) && *data_type != DataType::Null {
                    // Typed nulls keep the declared column type.
                    return Ok(new_null_array(data_type, *len));
                }
                let arr = literal::build_array(value, *len)?;
                if arr.data_type() != data_type {
                    return cast(&arr, data_type).map_err(|e| {
                        ExprError::new(
                            ErrorKind::LogicalError,
                            format!(
                                "constant of {:?} does not fit column type {:?}: {e}",
                                arr.data_type(),
                                data_type
                            ),
                        )
                    });
                }
                Ok(arr)
            }
            Column::Full(arr) => Ok(arr.clone()),
        }
    }
}

impl From<ArrayRef> for Column {
    fn from(arr: ArrayRef) -> Self {
        Column::Full(arr)
    }
}

/// A column slot as seen by functions and queries: optional value, type, name.
#[derive(Clone, Debug)]
pub struct ColumnWithTypeAndName {
    pub column: Option<Column>,
    pub data_type: DataType,
    pub name: String,
}

impl ColumnWithTypeAndName {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            column: None,
            data_type,
            name: name.into(),
        }
    }

    pub fn with_column(column: Column, name: impl Into<String>) -> Self {
        Self {
            data_type: column.data_type().clone(),
            column: Some(column),
            name: name.into(),
        }
    }

    pub fn is_const(&self) -> bool {
        self.column.as_ref().is_some_and(Column::is_const)
    }
}

#[cfg(test)]
mod tests {
    use super::{Column, ColumnWithTypeAndName, LiteralValue};
    use arrow::array::{Array, ArrayRef, Int64Array};
    use arrow::datatypes::DataType;
    use std::sync::Arc;

    #[test]
    fn const_column_resize_and_materialize() {
        let col = Column::constant(DataType::Int64, LiteralValue::Int64(3), 0);
        assert!(col.is_empty());

        let resized = col.clone_resized(4).unwrap();
        assert_eq!(resized.len(), 4);

        let arr = resized.materialized().unwrap();
        let typed = arr.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(typed.values(), &[3, 3, 3, 3]);
    }

    #[test]
    fn typed_null_constant_keeps_type() {
        let col = Column::constant(DataType::Utf8, LiteralValue::Null, 2);
        let arr = col.materialized().unwrap();
        assert_eq!(arr.data_type(), &DataType::Utf8);
        assert_eq!(arr.null_count(), 2);
    }

    #[test]
    fn full_column_resize_pads_with_nulls() {
        let arr: ArrayRef = Arc::new(Int64Array::from(vec![1, 2]));
        let col = Column::from(arr);
        let padded = col.clone_resized(4).unwrap();
        assert_eq!(padded.len(), 4);
        let materialized = padded.materialized().unwrap();
        assert_eq!(materialized.null_count(), 2);

        let truncated = col.clone_resized(1).unwrap();
        assert_eq!(truncated.len(), 1);
    }

    #[test]
    fn const_detection() {
        let constant = Column::constant(DataType::Int64, LiteralValue::Int64(1), 1);
        let full = Column::from(Arc::new(Int64Array::from(vec![1])) as ArrayRef);
        assert!(ColumnWithTypeAndName::with_column(constant, "c").is_const());
        assert!(!ColumnWithTypeAndName::with_column(full, "f").is_const());
        assert!(!ColumnWithTypeAndName::new("n", DataType::Int64).is_const());
    }
}
