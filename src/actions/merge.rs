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
use std::collections::{HashMap, VecDeque};

use super::{ActionId, ActionsDag};
use crate::common::error::{ErrorKind, ExprError, Result};

impl ActionsDag {
    /// Pipeline `first` into `second`: one DAG that computes `second`'s
    /// outputs over `first`'s inputs.
    ///
    /// Each input of `second` that matches a result of `first` is wired to
    /// the producing node (and leaves `first`'s index, being consumed);
    /// unmatched inputs of `second` become additional external inputs,
    /// unless `first.project_input` forbids widening. The merged index
    /// lists `second`'s outputs first.
    pub fn merge(first: ActionsDag, second: ActionsDag) -> Result<ActionsDag> {
        let mut first = first;
        let offset = first.nodes.len();

        // first's results by name, in index order. The index itself is
        // unique per name; the queue shape keeps consumption ordered if
        // that ever changes.
        let mut first_result: HashMap<String, VecDeque<ActionId>> = HashMap::new();
        for (name, id) in first.index.iter() {
            first_result.entry(name.to_string()).or_default().push_back(id);
        }

        // second input id -> first node id that feeds it.
        let mut inputs_map: HashMap<ActionId, ActionId> = HashMap::new();
        // first index entries consumed by second, with multiplicity.
        let mut removed_first_result: HashMap<ActionId, usize> = HashMap::new();
        // second inputs that stay external.
        let mut appended_inputs: Vec<ActionId> = Vec::new();

        for &input in &second.inputs {
            let name = &second.node_at(input).result_name;
            match first_result.get_mut(name).and_then(VecDeque::pop_front) {
                Some(producer) => {
                    inputs_map.insert(input, producer);
                    *removed_first_result.entry(producer).or_insert(0) += 1;
                }
                None => {
                    if first.settings.project_input {
                        return Err(ExprError::new(
                            ErrorKind::LogicalError,
                            format!("cannot find column {name} in DAG result"),
                        ));
                    }
                    appended_inputs.push(input);
                }
            }
        }

        // Splice second's arena after first's. Children of second's nodes
        // either follow their node into the merged arena (offset) or, for
        // consumed inputs, point at first's producer.
        let remap = |id: ActionId| -> ActionId {
            match inputs_map.get(&id) {
                Some(&producer) => producer,
                None => ActionId(id.0 + offset),
            }
        };

        let second_index: Vec<(String, ActionId)> = second
            .index
            .iter()
            .map(|(name, id)| (name.to_string(), remap(id)))
            .collect();
        let second_projects_input = second.settings.project_input;

        for slot in second.nodes.into_iter() {
            let slot = slot.map(|mut node| {
                for child in node.op.children_mut() {
                    *child = remap(*child);
                }
                node
            });
            first.nodes.push(slot);
        }

        for input in appended_inputs {
            first.inputs.push(remap(input));
        }

        if second_projects_input {
            first.index.clear();
            for (name, id) in &second_index {
                first.index.replace(name, *id);
            }
            first.settings.project_input = true;
        } else {
            // Consumed results leave first's index...
            let entries: Vec<(String, ActionId)> = first
                .index
                .iter()
                .map(|(name, id)| (name.to_string(), id))
                .collect();
            for (name, id) in entries {
                if let Some(count) = removed_first_result.get_mut(&id) {
                    if *count > 0 {
                        first.index.remove(&name);
                        *count -= 1;
                    }
                }
            }
            // ...and second's outputs go in front, keeping their order.
            for (name, id) in second_index.iter().rev() {
                first.index.prepend(name, *id);
            }
        }

        first.settings.max_temporary_columns = first
            .settings
            .max_temporary_columns
            .max(second.settings.max_temporary_columns);
        first.settings.max_temporary_non_const_columns = first
            .settings
            .max_temporary_non_const_columns
            .max(second.settings.max_temporary_non_const_columns);
        first.settings.min_count_to_compile_expression = first
            .settings
            .min_count_to_compile_expression
            .max(second.settings.min_count_to_compile_expression);
        first.settings.projected_output = second.settings.projected_output;

        if first.compilation_cache.is_none() {
            first.compilation_cache = second.compilation_cache;
        }

        tracing::debug!(
            nodes = first.nodes.len(),
            inputs = first.inputs.len(),
            "merged DAGs"
        );

        // Drop consumed inputs and anything else now unreachable.
        first.remove_unused();
        Ok(first)
    }
}
