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
use arrow::compute::kernels::numeric::{add, div, mul, sub};
use arrow::datatypes::DataType;
use std::sync::Arc;

use super::{
    FunctionBase, FunctionBaseRef, FunctionBuilder, PreparedFunction, PreparedFunctionRef,
    check_arity, materialize_arguments, wrap_kernel_result,
};
use crate::column::{Column, ColumnWithTypeAndName};
use crate::common::error::{ErrorKind, ExprError, Result};
use crate::types::format_type_name;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Multiply,
    Divide,
}

impl ArithmeticOp {
    pub fn name(self) -> &'static str {
        match self {
            ArithmeticOp::Plus => "plus",
            ArithmeticOp::Minus => "minus",
            ArithmeticOp::Multiply => "multiply",
            ArithmeticOp::Divide => "divide",
        }
    }
}

fn is_numeric(data_type: &DataType) -> bool {
    data_type.is_numeric()
}

pub(super) struct ArithmeticFunction {
    op: ArithmeticOp,
}

impl ArithmeticFunction {
    pub(super) fn new(op: ArithmeticOp) -> Self {
        Self { op }
    }
}

impl FunctionBuilder for ArithmeticFunction {
    fn name(&self) -> &str {
        self.op.name()
    }

    fn build(&self, arguments: &[ColumnWithTypeAndName]) -> Result<FunctionBaseRef> {
        check_arity(self.op.name(), arguments, 2)?;
        let lhs = &arguments[0].data_type;
        let rhs = &arguments[1].data_type;
        if lhs != rhs || !is_numeric(lhs) {
            return Err(ExprError::new(
                ErrorKind::TypeMismatch,
                format!(
                    "{} requires two numeric arguments of one type, got {} and {}",
                    self.op.name(),
                    format_type_name(lhs),
                    format_type_name(rhs)
                ),
            ));
        }
        Ok(Arc::new(ArithmeticBase {
            op: self.op,
            result_type: lhs.clone(),
        }))
    }
}

#[derive(Debug)]
struct ArithmeticBase {
    op: ArithmeticOp,
    result_type: DataType,
}

impl FunctionBase for ArithmeticBase {
    fn name(&self) -> &str {
        self.op.name()
    }

    fn result_type(&self) -> &DataType {
        &self.result_type
    }

    fn prepare(&self, _arguments: &[ColumnWithTypeAndName]) -> Result<PreparedFunctionRef> {
        Ok(Arc::new(ArithmeticExecutable { op: self.op }))
    }
}

struct ArithmeticExecutable {
    op: ArithmeticOp,
}

impl PreparedFunction for ArithmeticExecutable {
    fn execute(
        &self,
        arguments: &[ColumnWithTypeAndName],
        _result_type: &DataType,
        num_rows: usize,
        _dry_run: bool,
    ) -> Result<Column> {
        let (arrays, all_const) = materialize_arguments(arguments, num_rows)?;
        let kernel = match self.op {
            ArithmeticOp::Plus => add,
            ArithmeticOp::Minus => sub,
            ArithmeticOp::Multiply => mul,
            ArithmeticOp::Divide => div,
        };
        let out = kernel(&arrays[0], &arrays[1])
            .map_err(|e| ExprError::new(ErrorKind::IllegalColumn, e.to_string()))?;
        wrap_kernel_result(out, all_const, num_rows)
    }
}
