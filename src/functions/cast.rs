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
use arrow::compute::{CastOptions, cast_with_options};
use arrow::datatypes::DataType;
use std::sync::Arc;

use super::{
    FunctionBase, FunctionBaseRef, FunctionBuilder, FunctionBuilderRef, PreparedFunction,
    PreparedFunctionRef, check_arity, wrap_kernel_result,
};
use crate::column::{Column, ColumnWithTypeAndName, LiteralValue};
use crate::common::error::{ErrorKind, ExprError, Result};
use crate::types::parse_type_name;

/// Strictness of a cast.
///
/// `NonAccurate` is the plain `cast(x, T)`: lossy conversions produce NULL.
/// `Accurate` fails instead of losing information.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastType {
    NonAccurate,
    Accurate,
}

/// Names reported when a cast inserted by a schema adapter fails.
#[derive(Clone, Debug, Default)]
pub struct CastDiagnostic {
    pub source_name: String,
    pub target_name: String,
}

/// Cast builder. The target type travels as the second argument: a constant
/// string column holding the type name.
pub fn create_cast(cast_type: CastType, diagnostic: Option<CastDiagnostic>) -> FunctionBuilderRef {
    Arc::new(CastFunction {
        cast_type,
        diagnostic,
    })
}

struct CastFunction {
    cast_type: CastType,
    diagnostic: Option<CastDiagnostic>,
}

impl FunctionBuilder for CastFunction {
    fn name(&self) -> &str {
        "cast"
    }

    fn build(&self, arguments: &[ColumnWithTypeAndName]) -> Result<FunctionBaseRef> {
        check_arity("cast", arguments, 2)?;
        let type_arg = &arguments[1];
        let target = match type_arg.column.as_ref().and_then(Column::as_const) {
            Some(LiteralValue::Utf8(name)) => parse_type_name(name)?,
            _ => {
                return Err(ExprError::new(
                    ErrorKind::IllegalColumn,
                    format!(
                        "second argument of cast must be a constant string with the type name, \
                         got column '{}'",
                        type_arg.name
                    ),
                ));
            }
        };
        Ok(Arc::new(CastBase {
            target,
            cast_type: self.cast_type,
            diagnostic: self.diagnostic.clone(),
        }))
    }
}

#[derive(Debug)]
struct CastBase {
    target: DataType,
    cast_type: CastType,
    diagnostic: Option<CastDiagnostic>,
}

impl FunctionBase for CastBase {
    fn name(&self) -> &str {
        "cast"
    }

    fn result_type(&self) -> &DataType {
        &self.target
    }

    fn prepare(&self, _arguments: &[ColumnWithTypeAndName]) -> Result<PreparedFunctionRef> {
        Ok(Arc::new(CastExecutable {
            target: self.target.clone(),
            cast_type: self.cast_type,
            diagnostic: self.diagnostic.clone(),
        }))
    }
}

struct CastExecutable {
    target: DataType,
    cast_type: CastType,
    diagnostic: Option<CastDiagnostic>,
}

impl PreparedFunction for CastExecutable {
    fn execute(
        &self,
        arguments: &[ColumnWithTypeAndName],
        _result_type: &DataType,
        num_rows: usize,
        _dry_run: bool,
    ) -> Result<Column> {
        let value_arg = arguments.first().ok_or_else(|| {
            ExprError::new(ErrorKind::LogicalError, "cast called without arguments")
        })?;
        let column = value_arg.column.as_ref().ok_or_else(|| {
            ExprError::new(
                ErrorKind::LogicalError,
                format!("cast argument '{}' has no column attached", value_arg.name),
            )
        })?;

        let all_const = column.is_const();
        let input = if all_const {
            column.clone_resized(1)?.materialized()?
        } else {
            column.materialized()?
        };

        let options = CastOptions {
            safe: self.cast_type == CastType::NonAccurate,
            ..CastOptions::default()
        };
        let out = cast_with_options(&input, &self.target, &options).map_err(|e| {
            let context = match &self.diagnostic {
                Some(d) => format!(
                    " while converting source column {} to destination column {}",
                    d.source_name, d.target_name
                ),
                None => String::new(),
            };
            ExprError::new(ErrorKind::TypeMismatch, format!("{e}{context}"))
        })?;
        wrap_kernel_result(out, all_const, num_rows)
    }
}
