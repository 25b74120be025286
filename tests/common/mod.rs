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
//! Common utilities and helpers for integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};

use arrow::array::{Array, ArrayRef, Int64Array};
use arrow::datatypes::DataType;

use greywacke_expr::actions::{ActionOp, ActionsDag};
use greywacke_expr::common::error::{ErrorKind, ExprError};
use greywacke_expr::common::logging;
use greywacke_expr::{Column, ColumnWithTypeAndName, LiteralValue, Result};

/// Install the log subscriber for the integration suites, reading the
/// engine config when one is present. Idempotent; pruning, merge and
/// split emit debug events through it.
pub fn init_test_logging() {
    logging::init();
}

/// Minimal block executor: walks a finished DAG over one block of input
/// columns and returns the columns selected by the index, in index order.
///
/// Covers what the transformation tests need; ARRAY JOIN (the one action
/// that changes the row count) is out of its scope.
pub fn execute_dag(
    dag: &ActionsDag,
    inputs: &[ColumnWithTypeAndName],
) -> Result<Vec<ColumnWithTypeAndName>> {
    let num_rows = block_rows(inputs);

    let mut pending: HashMap<&str, VecDeque<&ColumnWithTypeAndName>> = HashMap::new();
    for input in inputs {
        pending.entry(input.name.as_str()).or_default().push_back(input);
    }

    let mut values: HashMap<greywacke_expr::ActionId, Column> = HashMap::new();

    for (id, node) in dag.nodes() {
        let value = match &node.op {
            ActionOp::Input => {
                let supplied = pending
                    .get_mut(node.result_name.as_str())
                    .and_then(VecDeque::pop_front);
                match supplied {
                    Some(col) => col.column.clone().ok_or_else(|| {
                        ExprError::new(
                            ErrorKind::LogicalError,
                            format!("input {} has no column in test block", node.result_name),
                        )
                    })?,
                    // Constant literal inputs carry their own value.
                    None => node.column.clone().ok_or_else(|| {
                        ExprError::new(
                            ErrorKind::LogicalError,
                            format!("missing input column {}", node.result_name),
                        )
                    })?,
                }
            }
            ActionOp::Column => node
                .column
                .clone()
                .expect("COLUMN node carries a value"),
            ActionOp::Alias { child } => values[child].clone(),
            ActionOp::ArrayJoin { .. } => {
                return Err(ExprError::new(
                    ErrorKind::LogicalError,
                    "test executor does not support ARRAY JOIN",
                ));
            }
            ActionOp::Function { prepared, children, .. } => {
                // Planning may have folded the node already.
                if let Some(column) = node.column.as_ref().filter(|c| c.is_const()) {
                    column.clone_resized(num_rows)?
                } else {
                    let mut arguments = Vec::with_capacity(children.len());
                    for child in children {
                        let child_node = dag.node(*child).expect("child is live");
                        arguments.push(ColumnWithTypeAndName {
                            column: Some(values[child].clone()),
                            data_type: child_node.result_type.clone(),
                            name: child_node.result_name.clone(),
                        });
                    }
                    prepared.execute(&arguments, &node.result_type, num_rows, false)?
                }
            }
        };
        values.insert(id, value);
    }

    let mut out = Vec::with_capacity(dag.index().len());
    for (name, id) in dag.index().iter() {
        let node = dag.node(id).expect("index node is live");
        // Constants in the output block take the block's row count.
        let mut column = values[&id].clone();
        if column.is_const() {
            column = column.clone_resized(num_rows)?;
        }
        out.push(ColumnWithTypeAndName {
            column: Some(column),
            data_type: node.result_type.clone(),
            name: name.to_string(),
        });
    }
    Ok(out)
}

fn block_rows(inputs: &[ColumnWithTypeAndName]) -> usize {
    let mut const_rows = 0;
    for input in inputs {
        if let Some(column) = &input.column {
            if !column.is_const() {
                return column.len();
            }
            const_rows = const_rows.max(column.len());
        }
    }
    const_rows
}

pub fn int64_column(name: &str, values: Vec<i64>) -> ColumnWithTypeAndName {
    let arr: ArrayRef = std::sync::Arc::new(Int64Array::from(values));
    ColumnWithTypeAndName::with_column(Column::from(arr), name)
}

pub fn int64_constant(name: &str, value: i64) -> ColumnWithTypeAndName {
    ColumnWithTypeAndName::with_column(
        Column::constant(DataType::Int64, LiteralValue::Int64(value), 1),
        name,
    )
}

/// Materialized i64 values of an executed column.
pub fn as_int64_values(column: &ColumnWithTypeAndName) -> Vec<i64> {
    let arr = column
        .column
        .as_ref()
        .expect("column present")
        .materialized()
        .expect("materializes");
    let typed = arr
        .as_any()
        .downcast_ref::<Int64Array>()
        .expect("Int64 column");
    typed.values().to_vec()
}
