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
use std::collections::HashSet;

use super::{ActionId, ActionKind, ActionOp, ActionsDag, Node};
use crate::common::error::{ErrorKind, ExprError, Result};

#[derive(Clone, Copy, Default)]
struct SplitData {
    needed_by_split_node: bool,
    visited: bool,
    used_in_result: bool,
    /// Copies of the node in each half. COLUMNs and INPUTs may have both.
    to_first: Option<ActionId>,
    to_second: Option<ActionId>,
}

struct Frame {
    id: ActionId,
    next_child: usize,
}

fn input_placeholder(node: &Node) -> Node {
    Node {
        op: ActionOp::Input,
        result_name: node.result_name.clone(),
        result_type: node.result_type.clone(),
        column: None,
        allow_constant_folding: true,
    }
}

impl ActionsDag {
    /// Partition into two pipelined halves: `first` computes everything the
    /// `split_nodes` need (and the split nodes themselves); `second`
    /// reproduces this DAG's index on top of `first`'s outputs. Values
    /// crossing the boundary become `first` index entries and fresh INPUT
    /// placeholders in `second`.
    pub fn split(&self, split_nodes: &HashSet<ActionId>) -> (ActionsDag, ActionsDag) {
        let mut first = self.clone_empty();
        let mut second = self.clone_empty();

        let mut data: Vec<SplitData> = vec![SplitData::default(); self.nodes.len()];
        // Nodes of this DAG that turn into inputs of `second`, in discovery
        // order.
        let mut new_inputs: Vec<ActionId> = Vec::new();

        for id in self.index.ids() {
            data[id.0].used_in_result = true;
        }

        // Everything a split node transitively needs goes to the first half.
        let mut stack: Vec<ActionId> = Vec::new();
        for (id, _) in self.nodes() {
            if !split_nodes.contains(&id) || data[id.0].needed_by_split_node {
                continue;
            }
            data[id.0].needed_by_split_node = true;
            stack.push(id);
            while let Some(top) = stack.pop() {
                for &child in self.node_at(top).children() {
                    if !data[child.0].needed_by_split_node {
                        data[child.0].needed_by_split_node = true;
                        stack.push(child);
                    }
                }
            }
        }

        // Post-order copy into the halves; children are always copied
        // before their parents, so child rewrites can rely on the copies.
        let mut frames: Vec<Frame> = Vec::new();
        for (root, _) in self.nodes() {
            if data[root.0].visited {
                continue;
            }
            frames.push(Frame {
                id: root,
                next_child: 0,
            });

            while !frames.is_empty() {
                let top = frames.len() - 1;
                let id = frames[top].id;
                let next_child = frames[top].next_child;
                let children = self.node_at(id).children();

                if let Some(&child) = children.get(next_child) {
                    frames[top].next_child += 1;
                    if !data[child.0].visited {
                        frames.push(Frame {
                            id: child,
                            next_child: 0,
                        });
                    }
                    continue;
                }

                data[id.0].visited = true;
                frames.pop();

                let node = self.node_at(id);
                if !data[id.0].needed_by_split_node {
                    let mut copy = node.clone();
                    for child in copy.op.children_mut() {
                        if data[child.0].to_second.is_none() {
                            // The child landed in the first half. COLUMN
                            // values are self-contained and are simply
                            // re-created; anything else crosses the
                            // boundary as a fresh input.
                            let child_node = self.node_at(*child);
                            let replacement = if child_node.kind() == ActionKind::Column {
                                second.push_node_for_transform(child_node.clone())
                            } else {
                                new_inputs.push(*child);
                                second.push_node_for_transform(input_placeholder(child_node))
                            };
                            data[child.0].to_second = Some(replacement);
                        }
                        *child = data[child.0].to_second.expect("second copy exists");
                    }
                    let copy_id = second.push_node_for_transform(copy);
                    data[id.0].to_second = Some(copy_id);

                    // Inputs consumed by the second half are inputs of the
                    // whole pipeline, so the first half forwards them.
                    if node.kind() == ActionKind::Input {
                        let input_copy = first.push_node_for_transform(node.clone());
                        data[id.0].to_first = Some(input_copy);
                        new_inputs.push(id);
                    }
                } else {
                    let mut copy = node.clone();
                    for child in copy.op.children_mut() {
                        *child = data[child.0].to_first.expect("first copy exists");
                    }
                    let copy_id = first.push_node_for_transform(copy);
                    data[id.0].to_first = Some(copy_id);

                    if data[id.0].used_in_result {
                        // Needed by the original index: expose it across
                        // the boundary.
                        let placeholder = second.push_node_for_transform(input_placeholder(node));
                        data[id.0].to_second = Some(placeholder);
                        new_inputs.push(id);
                    }
                }
            }
        }

        for (name, id) in self.index.iter() {
            let copy = data[id.0].to_second.expect("index node has a second copy");
            second.index.replace(name, copy);
        }

        for &input in &self.inputs {
            let copy = data[input.0].to_first.expect("input has a first copy");
            first.inputs.push(copy);
        }

        // The boundary signals: inputs of `second`, outputs of `first`.
        for &original in &new_inputs {
            let to_second = data[original.0].to_second.expect("new input has a second copy");
            second.inputs.push(to_second);

            let to_first = data[original.0].to_first.expect("new input has a first copy");
            let name = first.node_at(to_first).result_name.clone();
            first.index.replace(&name, to_first);
        }

        tracing::debug!(
            first_nodes = first.nodes.len(),
            second_nodes = second.nodes.len(),
            boundary = new_inputs.len(),
            "split DAG"
        );

        (first, second)
    }

    /// Split off everything that can run before an ARRAY JOIN over
    /// `array_joined_columns`: a node goes to the first half iff it is not
    /// one of those inputs, is not an ARRAY JOIN itself, and depends on
    /// nothing that stays behind.
    pub fn split_actions_before_array_join(
        &self,
        array_joined_columns: &HashSet<String>,
    ) -> (ActionsDag, ActionsDag) {
        let mut split_nodes: HashSet<ActionId> = HashSet::new();
        let mut visited: Vec<bool> = vec![false; self.nodes.len()];
        let mut frames: Vec<Frame> = Vec::new();

        for (root, _) in self.nodes() {
            if visited[root.0] {
                continue;
            }
            frames.push(Frame {
                id: root,
                next_child: 0,
            });

            while !frames.is_empty() {
                let top = frames.len() - 1;
                let id = frames[top].id;
                let next_child = frames[top].next_child;
                let node = self.node_at(id);
                let children = node.children();

                if let Some(&child) = children.get(next_child) {
                    frames[top].next_child += 1;
                    if !visited[child.0] {
                        frames.push(Frame {
                            id: child,
                            next_child: 0,
                        });
                    }
                    continue;
                }

                visited[id.0] = true;
                frames.pop();

                let depends_on_array_join = match node.kind() {
                    ActionKind::Input => array_joined_columns.contains(&node.result_name),
                    ActionKind::ArrayJoin => true,
                    _ => false,
                } || children.iter().any(|child| !split_nodes.contains(child));

                if !depends_on_array_join {
                    split_nodes.insert(id);
                }
            }
        }

        let (mut first, second) = self.split(&split_nodes);
        // Array-joined columns stay available even when nothing in the
        // first half consumes them.
        first.settings.project_input = false;
        (first, second)
    }

    /// Split out the computation of a filter column: `first` produces the
    /// filter (and forwards what the rest needs), `second` consumes it.
    pub fn split_actions_for_filter(&self, column_name: &str) -> Result<(ActionsDag, ActionsDag)> {
        let filter = self.index.get(column_name).ok_or_else(|| {
            ExprError::new(
                ErrorKind::LogicalError,
                format!(
                    "index for DAG does not contain filter column name {}, DAG:\n{}",
                    column_name,
                    self.dump_dag()
                ),
            )
        })?;
        let split_nodes = HashSet::from([filter]);
        Ok(self.split(&split_nodes))
    }
}
