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

//! Function interfaces consumed by the action DAG.
//!
//! The DAG never evaluates anything itself; it resolves a name against a
//! [`FunctionBuilder`], binds argument types through [`FunctionBase`] and
//! keeps a [`PreparedFunction`] on the node for the executor (and for
//! planning-time constant folding).

mod arithmetic;
mod cast;
mod comparison;
mod materialize;
mod misc;
pub mod registry;

pub use arithmetic::ArithmeticOp;
pub use cast::{CastDiagnostic, CastType, create_cast};
pub use materialize::create_materialize;

use arrow::array::{Array, ArrayRef};
use arrow::datatypes::DataType;
use std::sync::Arc;

use crate::column::{Column, ColumnWithTypeAndName, literal};
use crate::common::error::{ErrorKind, ExprError, Result};

pub type FunctionBuilderRef = Arc<dyn FunctionBuilder>;
pub type FunctionBaseRef = Arc<dyn FunctionBase>;
pub type PreparedFunctionRef = Arc<dyn PreparedFunction>;

/// Overload resolver: knows a function by name and can bind it to concrete
/// argument types.
pub trait FunctionBuilder: Send + Sync {
    fn name(&self) -> &str;
    fn build(&self, arguments: &[ColumnWithTypeAndName]) -> Result<FunctionBaseRef>;
}

/// A function bound to argument types.
pub trait FunctionBase: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;
    fn result_type(&self) -> &DataType;
    fn prepare(&self, arguments: &[ColumnWithTypeAndName]) -> Result<PreparedFunctionRef>;

    fn is_suitable_for_constant_folding(&self) -> bool {
        true
    }
    fn is_deterministic(&self) -> bool {
        true
    }
    fn is_stateful(&self) -> bool {
        false
    }

    /// For functions whose result is a constant regardless of argument
    /// values (e.g. `ignore`): report that constant so the planner can mark
    /// the output constant without folding the arguments away.
    fn result_if_always_returns_constant_and_has_arguments(
        &self,
        _arguments: &[ColumnWithTypeAndName],
    ) -> Option<Column> {
        None
    }
}

/// Executable form of a bound function.
pub trait PreparedFunction: Send + Sync {
    fn execute(
        &self,
        arguments: &[ColumnWithTypeAndName],
        result_type: &DataType,
        num_rows: usize,
        dry_run: bool,
    ) -> Result<Column>;
}

/// Process-wide cache of JIT-compiled expression fragments. The DAG only
/// carries the handle; compilation and lookup happen in the executor.
pub trait CompiledExpressionCache: Send + Sync {
    /// Number of compiled fragments currently cached.
    fn size(&self) -> usize;
}

pub type CompiledExpressionCacheRef = Arc<dyn CompiledExpressionCache>;

pub(crate) fn check_arity(name: &str, arguments: &[ColumnWithTypeAndName], n: usize) -> Result<()> {
    if arguments.len() != n {
        return Err(ExprError::new(
            ErrorKind::LogicalError,
            format!("{} expects {} arguments, got {}", name, n, arguments.len()),
        ));
    }
    Ok(())
}

/// Expand arguments into plain arrays for a kernel.
///
/// When every argument is constant the kernel runs on a single row and the
/// result is wrapped back into a constant by [`wrap_kernel_result`];
/// otherwise constants are expanded to `num_rows` to match full columns.
pub(crate) fn materialize_arguments(
    arguments: &[ColumnWithTypeAndName],
    num_rows: usize,
) -> Result<(Vec<ArrayRef>, bool)> {
    let all_const = !arguments.is_empty() && arguments.iter().all(ColumnWithTypeAndName::is_const);
    let rows = if all_const { 1 } else { num_rows };

    let mut arrays = Vec::with_capacity(arguments.len());
    for arg in arguments {
        let column = arg.column.as_ref().ok_or_else(|| {
            ExprError::new(
                ErrorKind::LogicalError,
                format!("argument '{}' has no column attached", arg.name),
            )
        })?;
        let arr = match column {
            Column::Const { .. } => column.clone_resized(rows)?.materialized()?,
            Column::Full(arr) => arr.clone(),
        };
        arrays.push(arr);
    }
    Ok((arrays, all_const))
}

pub(crate) fn wrap_kernel_result(arr: ArrayRef, all_const: bool, num_rows: usize) -> Result<Column> {
    if all_const {
        let value = literal::value_at(&arr, 0)?;
        Ok(Column::Const {
            data_type: arr.data_type().clone(),
            value,
            len: num_rows,
        })
    } else {
        Ok(Column::Full(arr))
    }
}
