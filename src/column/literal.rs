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
use super::LiteralValue;
use crate::common::error::{ErrorKind, ExprError, Result};
use arrow::array::{
    Array, ArrayRef, BinaryArray, BooleanArray, Date32Array, Decimal128Array, Float32Array,
    Float64Array, Int8Array, Int16Array, Int32Array, Int64Array, NullArray, StringArray,
    UInt8Array, UInt16Array, UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use std::sync::Arc;

/// Build an array repeating `value` `len` times.
pub fn build_array(value: &LiteralValue, len: usize) -> Result<ArrayRef> {
    match value {
        LiteralValue::Null => Ok(Arc::new(NullArray::new(len))),
        LiteralValue::Bool(v) => Ok(Arc::new(BooleanArray::from(vec![*v; len]))),
        LiteralValue::Int8(v) => Ok(Arc::new(Int8Array::from(vec![*v; len]))),
        LiteralValue::Int16(v) => Ok(Arc::new(Int16Array::from(vec![*v; len]))),
        LiteralValue::Int32(v) => Ok(Arc::new(Int32Array::from(vec![*v; len]))),
        LiteralValue::Int64(v) => Ok(Arc::new(Int64Array::from(vec![*v; len]))),
        LiteralValue::UInt8(v) => Ok(Arc::new(UInt8Array::from(vec![*v; len]))),
        LiteralValue::UInt16(v) => Ok(Arc::new(UInt16Array::from(vec![*v; len]))),
        LiteralValue::UInt32(v) => Ok(Arc::new(UInt32Array::from(vec![*v; len]))),
        LiteralValue::UInt64(v) => Ok(Arc::new(UInt64Array::from(vec![*v; len]))),
        LiteralValue::Float32(v) => Ok(Arc::new(Float32Array::from(vec![*v; len]))),
        LiteralValue::Float64(v) => Ok(Arc::new(Float64Array::from(vec![*v; len]))),
        LiteralValue::Utf8(v) => Ok(Arc::new(StringArray::from(vec![v.as_str(); len]))),
        LiteralValue::Binary(v) => {
            let values = std::iter::repeat(v.as_slice())
                .take(len)
                .collect::<Vec<&[u8]>>();
            Ok(Arc::new(BinaryArray::from_vec(values)))
        }
        LiteralValue::Date32(v) => Ok(Arc::new(Date32Array::from(vec![*v; len]))),
        LiteralValue::Decimal128 {
            value,
            precision,
            scale,
        } => {
            let arr = Decimal128Array::from(vec![*value; len])
                .with_precision_and_scale(*precision, *scale)
                .map_err(|e| ExprError::new(ErrorKind::LogicalError, e.to_string()))?;
            Ok(Arc::new(arr))
        }
    }
}

macro_rules! downcast_value {
    ($arr:expr, $row:expr, $array_ty:ty, $variant:ident) => {{
        let typed = $arr
            .as_any()
            .downcast_ref::<$array_ty>()
            .ok_or_else(|| {
                ExprError::new(
                    ErrorKind::LogicalError,
                    format!("failed to downcast {:?} array", $arr.data_type()),
                )
            })?;
        LiteralValue::$variant(typed.value($row))
    }};
}

/// Extract the value at `row` as a literal.
pub fn value_at(arr: &ArrayRef, row: usize) -> Result<LiteralValue> {
    if row >= arr.len() {
        return Err(ExprError::new(
            ErrorKind::LogicalError,
            format!("row {} out of bounds for array of {} rows", row, arr.len()),
        ));
    }
    if arr.is_null(row) {
        return Ok(LiteralValue::Null);
    }
    let value = match arr.data_type() {
        DataType::Null => LiteralValue::Null,
        DataType::Boolean => downcast_value!(arr, row, BooleanArray, Bool),
        DataType::Int8 => downcast_value!(arr, row, Int8Array, Int8),
        DataType::Int16 => downcast_value!(arr, row, Int16Array, Int16),
        DataType::Int32 => downcast_value!(arr, row, Int32Array, Int32),
        DataType::Int64 => downcast_value!(arr, row, Int64Array, Int64),
        DataType::UInt8 => downcast_value!(arr, row, UInt8Array, UInt8),
        DataType::UInt16 => downcast_value!(arr, row, UInt16Array, UInt16),
        DataType::UInt32 => downcast_value!(arr, row, UInt32Array, UInt32),
        DataType::UInt64 => downcast_value!(arr, row, UInt64Array, UInt64),
        DataType::Float32 => downcast_value!(arr, row, Float32Array, Float32),
        DataType::Float64 => downcast_value!(arr, row, Float64Array, Float64),
        DataType::Date32 => downcast_value!(arr, row, Date32Array, Date32),
        DataType::Utf8 => {
            let typed = arr.as_any().downcast_ref::<StringArray>().ok_or_else(|| {
                ExprError::new(ErrorKind::LogicalError, "failed to downcast Utf8 array")
            })?;
            LiteralValue::Utf8(typed.value(row).to_string())
        }
        DataType::Binary => {
            let typed = arr.as_any().downcast_ref::<BinaryArray>().ok_or_else(|| {
                ExprError::new(ErrorKind::LogicalError, "failed to downcast Binary array")
            })?;
            LiteralValue::Binary(typed.value(row).to_vec())
        }
        DataType::Decimal128(precision, scale) => {
            let typed = arr
                .as_any()
                .downcast_ref::<Decimal128Array>()
                .ok_or_else(|| {
                    ExprError::new(ErrorKind::LogicalError, "failed to downcast Decimal128 array")
                })?;
            LiteralValue::Decimal128 {
                value: typed.value(row),
                precision: *precision,
                scale: *scale,
            }
        }
        other => {
            return Err(ExprError::new(
                ErrorKind::LogicalError,
                format!("no literal representation for {other:?}"),
            ));
        }
    };
    Ok(value)
}
