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
use std::collections::HashMap;
use std::collections::VecDeque;

use arrow::datatypes::DataType;

use super::{ActionId, ActionsDag};
use crate::column::{Column, ColumnWithTypeAndName, LiteralValue};
use crate::common::error::{ErrorKind, ExprError, Result};
use crate::functions::{CastDiagnostic, CastType, create_cast, create_materialize};
use crate::types::format_type_name;

/// How `make_converting_actions` pairs source columns with target columns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchColumnsMode {
    /// i-th source feeds i-th target; sizes must match.
    Position,
    /// Targets consume same-named sources, left to right.
    Name,
}

impl ActionsDag {
    /// Build a DAG that converts a `source` block into the `target` layout:
    /// reordering, casting, un-constantizing and renaming as needed.
    ///
    /// Constant targets require constant sources with equal values, unless
    /// `ignore_constant_values` replaces the source constant outright.
    pub fn make_converting_actions(
        source: &[ColumnWithTypeAndName],
        target: &[ColumnWithTypeAndName],
        mode: MatchColumnsMode,
        ignore_constant_values: bool,
    ) -> Result<ActionsDag> {
        if mode == MatchColumnsMode::Position && source.len() != target.len() {
            return Err(ExprError::new(
                ErrorKind::NumberOfColumnsDoesntMatch,
                format!(
                    "number of columns doesn't match: {} in source, {} in result",
                    source.len(),
                    target.len()
                ),
            ));
        }

        let mut dag = ActionsDag::from_columns(source.iter().cloned());
        let mut projection: Vec<ActionId> = Vec::with_capacity(target.len());

        let materialize_builder = create_materialize();

        // Remaining same-named inputs, in input order.
        let mut inputs_by_name: HashMap<&str, VecDeque<ActionId>> = HashMap::new();
        if mode == MatchColumnsMode::Name {
            for (pos, &input) in dag.inputs().iter().enumerate() {
                let name = &source[pos].name;
                inputs_by_name.entry(name).or_default().push_back(input);
            }
        }

        for (result_col_num, res_elem) in target.iter().enumerate() {
            let mut src_id = match mode {
                MatchColumnsMode::Position => dag.inputs()[result_col_num],
                MatchColumnsMode::Name => {
                    let queue = inputs_by_name.get_mut(res_elem.name.as_str());
                    match queue.and_then(VecDeque::pop_front) {
                        Some(input) => input,
                        None => {
                            return Err(ExprError::new(
                                ErrorKind::ThereIsNoColumn,
                                format!(
                                    "cannot find column `{}` in source stream",
                                    res_elem.name
                                ),
                            ));
                        }
                    }
                }
            };

            // Constant compatibility.
            if let Some(res_const) = res_elem.column.as_ref().and_then(Column::as_const) {
                let src_const = dag
                    .node_at(src_id)
                    .column
                    .as_ref()
                    .and_then(Column::as_const)
                    .cloned();
                match src_const {
                    Some(src_const) => {
                        if ignore_constant_values {
                            src_id = dag.add_column_impl(res_elem.clone(), true)?;
                        } else if *res_const != src_const {
                            return Err(ExprError::new(
                                ErrorKind::IllegalColumn,
                                format!(
                                    "cannot convert column `{}` because it is constant but \
                                     values of constants are different in source and result",
                                    res_elem.name
                                ),
                            ));
                        }
                    }
                    None => {
                        return Err(ExprError::new(
                            ErrorKind::IllegalColumn,
                            format!(
                                "cannot convert column `{}` because it is non constant in \
                                 source stream but must be constant in result",
                                res_elem.name
                            ),
                        ));
                    }
                }
            }

            // Cast into the result type if needed. The target type travels
            // as a constant string column naming it.
            if res_elem.data_type != dag.node_at(src_id).result_type {
                let type_name = format_type_name(&res_elem.data_type);
                let type_column = ColumnWithTypeAndName {
                    column: Some(Column::constant(
                        DataType::Utf8,
                        LiteralValue::Utf8(type_name.clone()),
                        0,
                    )),
                    data_type: DataType::Utf8,
                    name: type_name,
                };
                let right_arg = dag.add_column_impl(type_column, true)?;

                let diagnostic = CastDiagnostic {
                    source_name: dag.node_at(src_id).result_name.clone(),
                    target_name: res_elem.name.clone(),
                };
                let cast_builder = create_cast(CastType::NonAccurate, Some(diagnostic));
                src_id = dag.add_function_impl(
                    cast_builder,
                    vec![src_id, right_arg],
                    String::new(),
                    true,
                )?;
            }

            // A constant source feeding a non-constant target must be
            // materialized.
            if dag.node_at(src_id).has_const_column() && !res_elem.is_const() {
                src_id = dag.add_function_impl(
                    materialize_builder.clone(),
                    vec![src_id],
                    String::new(),
                    true,
                )?;
            }

            if dag.node_at(src_id).result_name != res_elem.name {
                src_id = dag.add_alias_impl(src_id, res_elem.name.clone(), true)?;
            }

            projection.push(src_id);
        }

        dag.remove_unused_for_ids(projection);
        dag.settings_mut().project_input = true;

        Ok(dag)
    }
}
