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
    FunctionBase, FunctionBaseRef, FunctionBuilder, FunctionBuilderRef, PreparedFunction,
    PreparedFunctionRef, check_arity,
};
use crate::column::{Column, ColumnWithTypeAndName};
use crate::common::error::{ErrorKind, ExprError, Result};

/// `materialize(x)`: turn a constant column into a full one. The identity
/// on columns that are already full.
pub fn create_materialize() -> FunctionBuilderRef {
    Arc::new(MaterializeFunction)
}

struct MaterializeFunction;

impl FunctionBuilder for MaterializeFunction {
    fn name(&self) -> &str {
        "materialize"
    }

    fn build(&self, arguments: &[ColumnWithTypeAndName]) -> Result<FunctionBaseRef> {
        check_arity("materialize", arguments, 1)?;
        Ok(Arc::new(MaterializeBase {
            result_type: arguments[0].data_type.clone(),
        }))
    }
}

#[derive(Debug)]
struct MaterializeBase {
    result_type: DataType,
}

impl FunctionBase for MaterializeBase {
    fn name(&self) -> &str {
        "materialize"
    }

    fn result_type(&self) -> &DataType {
        &self.result_type
    }

    fn prepare(&self, _arguments: &[ColumnWithTypeAndName]) -> Result<PreparedFunctionRef> {
        Ok(Arc::new(MaterializeExecutable))
    }

    // Folding would immediately undo the materialization.
    fn is_suitable_for_constant_folding(&self) -> bool {
        false
    }
}

struct MaterializeExecutable;

impl PreparedFunction for MaterializeExecutable {
    fn execute(
        &self,
        arguments: &[ColumnWithTypeAndName],
        _result_type: &DataType,
        num_rows: usize,
        _dry_run: bool,
    ) -> Result<Column> {
        let arg = arguments.first().ok_or_else(|| {
            ExprError::new(ErrorKind::LogicalError, "materialize called without arguments")
        })?;
        let column = arg.column.as_ref().ok_or_else(|| {
            ExprError::new(
                ErrorKind::LogicalError,
                format!("materialize argument '{}' has no column attached", arg.name),
            )
        })?;
        let arr = column.clone_resized(num_rows)?.materialized()?;
        Ok(Column::Full(arr))
    }
}

#[cfg(test)]
mod tests {
    use super::create_materialize;
    use crate::column::{Column, ColumnWithTypeAndName, LiteralValue};
    use arrow::array::{Array, Int64Array};
    use arrow::datatypes::DataType;

    #[test]
    fn expands_constants() {
        let builder = create_materialize();
        let args = [ColumnWithTypeAndName::with_column(
            Column::constant(DataType::Int64, LiteralValue::Int64(9), 3),
            "c",
        )];
        let base = builder.build(&args).unwrap();
        assert_eq!(base.result_type(), &DataType::Int64);
        assert!(!base.is_suitable_for_constant_folding());

        let prepared = base.prepare(&args).unwrap();
        let out = prepared.execute(&args, &DataType::Int64, 3, false).unwrap();
        assert!(!out.is_const());
        let arr = out.materialized().unwrap();
        let typed = arr.as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(typed.values(), &[9, 9, 9]);
    }
}
