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
use arrow::datatypes::DataType;
use std::sync::Arc;

use super::{
    FunctionBase, FunctionBaseRef, FunctionBuilder, PreparedFunction, PreparedFunctionRef,
};
use crate::column::{Column, ColumnWithTypeAndName, LiteralValue};
use crate::common::error::Result;

/// `ignore(...)`: evaluates to `0` no matter the arguments. Used by planners
/// to force evaluation of an expression whose value is discarded; its result
/// is a known constant even over non-constant arguments.
pub(super) struct IgnoreFunction;

impl FunctionBuilder for IgnoreFunction {
    fn name(&self) -> &str {
        "ignore"
    }

    fn build(&self, _arguments: &[ColumnWithTypeAndName]) -> Result<FunctionBaseRef> {
        Ok(Arc::new(IgnoreBase {
            result_type: DataType::UInt8,
        }))
    }
}

#[derive(Debug)]
struct IgnoreBase {
    result_type: DataType,
}

impl FunctionBase for IgnoreBase {
    fn name(&self) -> &str {
        "ignore"
    }

    fn result_type(&self) -> &DataType {
        &self.result_type
    }

    fn prepare(&self, _arguments: &[ColumnWithTypeAndName]) -> Result<PreparedFunctionRef> {
        Ok(Arc::new(IgnoreExecutable))
    }

    fn result_if_always_returns_constant_and_has_arguments(
        &self,
        arguments: &[ColumnWithTypeAndName],
    ) -> Option<Column> {
        if arguments.is_empty() {
            return None;
        }
        Some(Column::constant(DataType::UInt8, LiteralValue::UInt8(0), 1))
    }
}

struct IgnoreExecutable;

impl PreparedFunction for IgnoreExecutable {
    fn execute(
        &self,
        _arguments: &[ColumnWithTypeAndName],
        _result_type: &DataType,
        num_rows: usize,
        _dry_run: bool,
    ) -> Result<Column> {
        Ok(Column::constant(
            DataType::UInt8,
            LiteralValue::UInt8(0),
            num_rows,
        ))
    }
}
