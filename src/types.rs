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

//! Engine-facing type names.
//!
//! Types cross the DAG boundary as display names: the cast calling
//! convention carries the target type as a constant string column, and
//! diagnostics print types by name. Names round-trip through
//! [`format_type_name`] / [`parse_type_name`] for every type the expression
//! layer supports.

use arrow::datatypes::{DataType, Field};
use std::sync::Arc;

use crate::common::error::{ErrorKind, ExprError, Result};

/// Display name of a data type, e.g. `Int64`, `String`, `Array(Int32)`.
pub fn format_type_name(data_type: &DataType) -> String {
    match data_type {
        DataType::Null => "Null".to_string(),
        DataType::Boolean => "Bool".to_string(),
        DataType::Int8 => "Int8".to_string(),
        DataType::Int16 => "Int16".to_string(),
        DataType::Int32 => "Int32".to_string(),
        DataType::Int64 => "Int64".to_string(),
        DataType::UInt8 => "UInt8".to_string(),
        DataType::UInt16 => "UInt16".to_string(),
        DataType::UInt32 => "UInt32".to_string(),
        DataType::UInt64 => "UInt64".to_string(),
        DataType::Float32 => "Float32".to_string(),
        DataType::Float64 => "Float64".to_string(),
        DataType::Utf8 => "String".to_string(),
        DataType::Binary => "Binary".to_string(),
        DataType::Date32 => "Date".to_string(),
        DataType::Decimal128(precision, scale) => format!("Decimal({precision}, {scale})"),
        DataType::List(field) => format!("Array({})", format_type_name(field.data_type())),
        other => format!("{other:?}"),
    }
}

/// Parse a display name produced by [`format_type_name`].
pub fn parse_type_name(name: &str) -> Result<DataType> {
    let name = name.trim();
    let simple = match name {
        "Null" => Some(DataType::Null),
        "Bool" => Some(DataType::Boolean),
        "Int8" => Some(DataType::Int8),
        "Int16" => Some(DataType::Int16),
        "Int32" => Some(DataType::Int32),
        "Int64" => Some(DataType::Int64),
        "UInt8" => Some(DataType::UInt8),
        "UInt16" => Some(DataType::UInt16),
        "UInt32" => Some(DataType::UInt32),
        "UInt64" => Some(DataType::UInt64),
        "Float32" => Some(DataType::Float32),
        "Float64" => Some(DataType::Float64),
        "String" => Some(DataType::Utf8),
        "Binary" => Some(DataType::Binary),
        "Date" => Some(DataType::Date32),
        _ => None,
    };
    if let Some(data_type) = simple {
        return Ok(data_type);
    }

    if let Some(inner) = name
        .strip_prefix("Array(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let element = parse_type_name(inner)?;
        return Ok(DataType::List(Arc::new(list_element_field(element))));
    }

    if let Some(args) = name
        .strip_prefix("Decimal(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let mut parts = args.splitn(2, ',');
        let precision = parts.next().map(str::trim).and_then(|v| v.parse::<u8>().ok());
        let scale = parts.next().map(str::trim).and_then(|v| v.parse::<i8>().ok());
        if let (Some(precision), Some(scale)) = (precision, scale) {
            return Ok(DataType::Decimal128(precision, scale));
        }
    }

    Err(ExprError::new(
        ErrorKind::TypeMismatch,
        format!("unknown type name '{name}'"),
    ))
}

/// Element type of an array type, if `data_type` is one.
pub fn array_element_type(data_type: &DataType) -> Option<&DataType> {
    match data_type {
        DataType::List(field) | DataType::LargeList(field) => Some(field.data_type()),
        _ => None,
    }
}

/// Field used for list elements built by this crate.
pub fn list_element_field(element: DataType) -> Field {
    Field::new("item", element, true)
}
