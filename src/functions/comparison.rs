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
use arrow::array::ArrayRef;
use arrow::compute::kernels::cmp::{eq, gt, gt_eq, lt, lt_eq, neq};
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
pub(super) enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    pub(super) fn name(self) -> &'static str {
        match self {
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Lt => "lt",
            ComparisonOp::Le => "le",
            ComparisonOp::Gt => "gt",
            ComparisonOp::Ge => "ge",
        }
    }

    pub(super) const ALL: [ComparisonOp; 6] = [
        ComparisonOp::Eq,
        ComparisonOp::Ne,
        ComparisonOp::Lt,
        ComparisonOp::Le,
        ComparisonOp::Gt,
        ComparisonOp::Ge,
    ];
}

pub(super) struct ComparisonFunction {
    op: ComparisonOp,
}

impl ComparisonFunction {
    pub(super) fn new(op: ComparisonOp) -> Self {
        Self { op }
    }
}

impl FunctionBuilder for ComparisonFunction {
    fn name(&self) -> &str {
        self.op.name()
    }

    fn build(&self, arguments: &[ColumnWithTypeAndName]) -> Result<FunctionBaseRef> {
        check_arity(self.op.name(), arguments, 2)?;
        let lhs = &arguments[0].data_type;
        let rhs = &arguments[1].data_type;
        if lhs != rhs {
            return Err(ExprError::new(
                ErrorKind::TypeMismatch,
                format!(
                    "{} requires two arguments of one type, got {} and {}",
                    self.op.name(),
                    format_type_name(lhs),
                    format_type_name(rhs)
                ),
            ));
        }
        Ok(Arc::new(ComparisonBase {
            op: self.op,
            result_type: DataType::Boolean,
        }))
    }
}

#[derive(Debug)]
struct ComparisonBase {
    op: ComparisonOp,
    result_type: DataType,
}

impl FunctionBase for ComparisonBase {
    fn name(&self) -> &str {
        self.op.name()
    }

    fn result_type(&self) -> &DataType {
        &self.result_type
    }

    fn prepare(&self, _arguments: &[ColumnWithTypeAndName]) -> Result<PreparedFunctionRef> {
        Ok(Arc::new(ComparisonExecutable { op: self.op }))
    }
}

struct ComparisonExecutable {
    op: ComparisonOp,
}

impl PreparedFunction for ComparisonExecutable {
    fn execute(
        &self,
        arguments: &[ColumnWithTypeAndName],
        _result_type: &DataType,
        num_rows: usize,
        _dry_run: bool,
    ) -> Result<Column> {
        let (arrays, all_const) = materialize_arguments(arguments, num_rows)?;
        let kernel = match self.op {
            ComparisonOp::Eq => eq,
            ComparisonOp::Ne => neq,
            ComparisonOp::Lt => lt,
            ComparisonOp::Le => lt_eq,
            ComparisonOp::Gt => gt,
            ComparisonOp::Ge => gt_eq,
        };
        let out = kernel(&arrays[0], &arrays[1])
            .map_err(|e| ExprError::new(ErrorKind::IllegalColumn, e.to_string()))?;
        let out: ArrayRef = Arc::new(out);
        wrap_kernel_result(out, all_const, num_rows)
    }
}
