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

//! The expression action DAG.
//!
//! A DAG is built bottom-up during planning: inputs, constants, aliases,
//! array joins and function applications, each producing one named typed
//! column. The index selects which nodes form the current output schema.
//! Transformations (pruning, projection, conversion, merge, split) rewrite
//! the DAG between planning steps; the executor walks the finished DAG.
//!
//! Nodes live in an arena with stable ids: insertion never moves a node and
//! pruning tombstones slots in place, so `ActionId`s held by children (or
//! by callers) stay valid for the lifetime of the DAG.

pub mod convert;
pub mod index;
mod merge;
mod split;

pub use convert::MatchColumnsMode;
pub use index::Index;

use arrow::datatypes::DataType;
use std::collections::HashSet;
use std::fmt;
use std::fmt::Write as _;

use crate::column::{Column, ColumnWithTypeAndName};
use crate::common::error::{ErrorKind, ExprError, Result};
use crate::functions::{
    CompiledExpressionCacheRef, FunctionBaseRef, FunctionBuilderRef, PreparedFunctionRef,
};
use crate::types::{array_element_type, format_type_name};

/// Stable handle of a node within one DAG.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Input,
    Column,
    Alias,
    ArrayJoin,
    Function,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Input => "INPUT",
            ActionKind::Column => "COLUMN",
            ActionKind::Alias => "ALIAS",
            ActionKind::ArrayJoin => "ARRAY JOIN",
            ActionKind::Function => "FUNCTION",
        }
    }
}

/// Kind-specific part of a node. Children are identified by [`ActionId`]
/// and always reference earlier nodes of the same DAG.
#[derive(Clone)]
pub enum ActionOp {
    Input,
    Column,
    Alias {
        child: ActionId,
    },
    ArrayJoin {
        child: ActionId,
    },
    Function {
        builder: FunctionBuilderRef,
        base: FunctionBaseRef,
        prepared: PreparedFunctionRef,
        children: Vec<ActionId>,
    },
}

impl ActionOp {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionOp::Input => ActionKind::Input,
            ActionOp::Column => ActionKind::Column,
            ActionOp::Alias { .. } => ActionKind::Alias,
            ActionOp::ArrayJoin { .. } => ActionKind::ArrayJoin,
            ActionOp::Function { .. } => ActionKind::Function,
        }
    }

    pub fn children(&self) -> &[ActionId] {
        match self {
            ActionOp::Input | ActionOp::Column => &[],
            ActionOp::Alias { child } | ActionOp::ArrayJoin { child } => {
                std::slice::from_ref(child)
            }
            ActionOp::Function { children, .. } => children,
        }
    }

    pub(crate) fn children_mut(&mut self) -> &mut [ActionId] {
        match self {
            ActionOp::Input | ActionOp::Column => &mut [],
            ActionOp::Alias { child } | ActionOp::ArrayJoin { child } => {
                std::slice::from_mut(child)
            }
            ActionOp::Function { children, .. } => children,
        }
    }
}

impl fmt::Debug for ActionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOp::Input => f.write_str("Input"),
            ActionOp::Column => f.write_str("Column"),
            ActionOp::Alias { child } => f.debug_struct("Alias").field("child", child).finish(),
            ActionOp::ArrayJoin { child } => {
                f.debug_struct("ArrayJoin").field("child", child).finish()
            }
            ActionOp::Function { base, children, .. } => f
                .debug_struct("Function")
                .field("name", &base.name())
                .field("children", children)
                .finish(),
        }
    }
}

/// One vertex: an action producing the column `result_name` of type
/// `result_type`. `column` is set for COLUMN nodes, for INPUTs created from
/// constant literals, for ALIASes of such nodes, and for constant-folded
/// FUNCTIONs.
#[derive(Clone, Debug)]
pub struct Node {
    pub op: ActionOp,
    pub result_name: String,
    pub result_type: DataType,
    pub column: Option<Column>,
    pub allow_constant_folding: bool,
}

impl Node {
    pub fn kind(&self) -> ActionKind {
        self.op.kind()
    }

    pub fn children(&self) -> &[ActionId] {
        self.op.children()
    }

    pub fn has_const_column(&self) -> bool {
        self.column.as_ref().is_some_and(Column::is_const)
    }

    pub fn function_base(&self) -> Option<&FunctionBaseRef> {
        match &self.op {
            ActionOp::Function { base, .. } => Some(base),
            _ => None,
        }
    }
}

/// Per-DAG settings. The caps and JIT thresholds are carried for the
/// executor; the DAG itself only reads `project_input` and
/// `compile_expressions`.
#[derive(Clone, Debug)]
pub struct ActionsSettings {
    pub max_temporary_columns: usize,
    pub max_temporary_non_const_columns: usize,
    pub compile_expressions: bool,
    pub min_count_to_compile_expression: u64,
    /// When set, transformations treat the inputs as exactly consumed by
    /// the current index: merge may not widen them.
    pub project_input: bool,
    pub projected_output: bool,
}

impl Default for ActionsSettings {
    fn default() -> Self {
        Self {
            max_temporary_columns: 0,
            max_temporary_non_const_columns: 0,
            compile_expressions: false,
            min_count_to_compile_expression: 3,
            project_input: false,
            projected_output: false,
        }
    }
}

#[derive(Clone)]
pub struct ActionsDag {
    nodes: Vec<Option<Node>>,
    inputs: Vec<ActionId>,
    index: Index,
    settings: ActionsSettings,
    compilation_cache: Option<CompiledExpressionCacheRef>,
}

impl ActionsDag {
    /// Empty DAG. Settings come from the engine config when one is loaded,
    /// compiled-in defaults otherwise.
    pub fn new() -> Self {
        Self::with_settings(crate::common::config::default_actions_settings())
    }

    pub fn with_settings(settings: ActionsSettings) -> Self {
        Self {
            nodes: Vec::new(),
            inputs: Vec::new(),
            index: Index::default(),
            settings,
            compilation_cache: None,
        }
    }

    /// New DAG whose inputs are the given name/type pairs.
    pub fn from_types(inputs: impl IntoIterator<Item = (String, DataType)>) -> Self {
        let mut dag = Self::new();
        for (name, data_type) in inputs {
            dag.push_input(name, data_type, None);
        }
        dag
    }

    /// New DAG whose inputs are the given columns. Constant columns stay
    /// attached to their INPUT nodes so downstream folding can see them.
    pub fn from_columns(inputs: impl IntoIterator<Item = ColumnWithTypeAndName>) -> Self {
        let mut dag = Self::new();
        for input in inputs {
            let constant = input.column.filter(Column::is_const);
            dag.push_input(input.name, input.data_type, constant);
        }
        dag
    }

    fn push_input(&mut self, name: String, data_type: DataType, column: Option<Column>) {
        let node = Node {
            op: ActionOp::Input,
            result_name: name,
            result_type: data_type,
            column,
            allow_constant_folding: true,
        };
        self.add_node_unchecked(node);
    }

    fn add_node_unchecked(&mut self, node: Node) -> ActionId {
        let id = ActionId(self.nodes.len());
        if matches!(node.op, ActionOp::Input) {
            self.inputs.push(id);
        }
        self.index.replace(&node.result_name, id);
        self.nodes.push(Some(node));
        id
    }

    fn add_node(&mut self, node: Node, can_replace: bool) -> Result<ActionId> {
        if !can_replace && self.index.contains(&node.result_name) {
            return Err(ExprError::new(
                ErrorKind::DuplicateColumn,
                format!("column '{}' already exists", node.result_name),
            ));
        }
        Ok(self.add_node_unchecked(node))
    }

    /// Append a node without touching the inputs list or the index. Used by
    /// transformations that assemble those explicitly.
    pub(crate) fn push_node_for_transform(&mut self, node: Node) -> ActionId {
        let id = ActionId(self.nodes.len());
        self.nodes.push(Some(node));
        id
    }

    /// Copy with the same settings and cache but no nodes.
    pub(crate) fn clone_empty(&self) -> Self {
        Self {
            nodes: Vec::new(),
            inputs: Vec::new(),
            index: Index::default(),
            settings: self.settings.clone(),
            compilation_cache: self.compilation_cache.clone(),
        }
    }

    pub fn add_input(&mut self, name: impl Into<String>, data_type: DataType) -> Result<ActionId> {
        let node = Node {
            op: ActionOp::Input,
            result_name: name.into(),
            result_type: data_type,
            column: None,
            allow_constant_folding: true,
        };
        self.add_node(node, false)
    }

    /// INPUT carrying a constant literal supplied by the caller.
    pub fn add_input_column(&mut self, column: ColumnWithTypeAndName) -> Result<ActionId> {
        let node = Node {
            op: ActionOp::Input,
            result_name: column.name,
            result_type: column.data_type,
            column: column.column,
            allow_constant_folding: true,
        };
        self.add_node(node, false)
    }

    pub fn add_column(&mut self, column: ColumnWithTypeAndName) -> Result<ActionId> {
        self.add_column_impl(column, false)
    }

    pub(crate) fn add_column_impl(
        &mut self,
        column: ColumnWithTypeAndName,
        can_replace: bool,
    ) -> Result<ActionId> {
        if column.column.is_none() {
            return Err(ExprError::new(
                ErrorKind::LogicalError,
                format!("cannot add column {} because it has no value", column.name),
            ));
        }
        let node = Node {
            op: ActionOp::Column,
            result_name: column.name,
            result_type: column.data_type,
            column: column.column,
            allow_constant_folding: true,
        };
        self.add_node(node, can_replace)
    }

    pub fn add_alias(&mut self, name: &str, alias: impl Into<String>) -> Result<ActionId> {
        let child = self.get_id(name)?;
        self.add_alias_impl(child, alias.into(), false)
    }

    pub(crate) fn add_alias_impl(
        &mut self,
        child: ActionId,
        alias: String,
        can_replace: bool,
    ) -> Result<ActionId> {
        let child_node = self.node_at(child);
        let node = Node {
            op: ActionOp::Alias { child },
            result_name: alias,
            result_type: child_node.result_type.clone(),
            column: child_node.column.clone(),
            allow_constant_folding: child_node.allow_constant_folding,
        };
        self.add_node(node, can_replace)
    }

    /// Unnest an array column. The result type is the element type; this is
    /// the only action that changes the row count.
    pub fn add_array_join(
        &mut self,
        source_name: &str,
        result_name: impl Into<String>,
    ) -> Result<ActionId> {
        let child = self.get_id(source_name)?;
        let child_node = self.node_at(child);
        let Some(element_type) = array_element_type(&child_node.result_type) else {
            return Err(ExprError::new(
                ErrorKind::TypeMismatch,
                format!(
                    "ARRAY JOIN requires array argument, {} is {}",
                    source_name,
                    format_type_name(&child_node.result_type)
                ),
            ));
        };
        let node = Node {
            op: ActionOp::ArrayJoin { child },
            result_name: result_name.into(),
            result_type: element_type.clone(),
            column: None,
            allow_constant_folding: true,
        };
        self.add_node(node, false)
    }

    /// Apply `builder` to the named arguments. An empty `result_name`
    /// synthesizes `fname(a, b, ...)` from the argument names.
    pub fn add_function(
        &mut self,
        builder: FunctionBuilderRef,
        argument_names: &[&str],
        result_name: &str,
    ) -> Result<ActionId> {
        let mut children = Vec::with_capacity(argument_names.len());
        for name in argument_names {
            children.push(self.get_id(name)?);
        }
        self.add_function_impl(builder, children, result_name.to_string(), false)
    }

    pub(crate) fn add_function_impl(
        &mut self,
        builder: FunctionBuilderRef,
        children: Vec<ActionId>,
        result_name: String,
        can_replace: bool,
    ) -> Result<ActionId> {
        let mut all_const = true;
        let mut allow_constant_folding = true;
        let mut arguments = Vec::with_capacity(children.len());

        for &child in &children {
            let child_node = self.node_at(child);
            allow_constant_folding = allow_constant_folding && child_node.allow_constant_folding;

            if !child_node.has_const_column() {
                all_const = false;
            }
            arguments.push(ColumnWithTypeAndName {
                column: child_node.column.clone(),
                data_type: child_node.result_type.clone(),
                name: child_node.result_name.clone(),
            });
        }

        let base = builder.build(&arguments)?;
        let result_type = base.result_type().clone();
        let prepared = base.prepare(&arguments)?;

        // Eager constant folding: run the function now when every argument
        // is a known constant. With JIT enabled a compiled version may land
        // in the shared cache, so non-deterministic functions are left
        // unfolded there.
        let mut column = None;
        if all_const
            && base.is_suitable_for_constant_folding()
            && (!self.settings.compile_expressions || base.is_deterministic())
        {
            let num_rows = arguments
                .first()
                .and_then(|arg| arg.column.as_ref())
                .map_or(0, Column::len);
            let folded = prepared.execute(&arguments, &result_type, num_rows, true)?;

            // A non-constant result means the fold is not usable.
            if folded.is_const() {
                // Literal columns travel with one row; a zero-argument call
                // produces zero rows, resize it.
                let folded = if folded.is_empty() {
                    folded.clone_resized(1)?
                } else {
                    folded
                };
                column = Some(folded);
            }
        }

        // Functions like ignore() return a constant even over non-constant
        // arguments. Attach the constant so the sample block knows it, but
        // forbid folding it further.
        if column.is_none() && base.is_suitable_for_constant_folding() {
            if let Some(col) = base.result_if_always_returns_constant_and_has_arguments(&arguments)
            {
                column = Some(col);
                allow_constant_folding = false;
            }
        }

        let result_name = if result_name.is_empty() {
            let mut synthesized = format!("{}(", builder.name());
            for (i, arg) in arguments.iter().enumerate() {
                if i > 0 {
                    synthesized.push_str(", ");
                }
                synthesized.push_str(&arg.name);
            }
            synthesized.push(')');
            synthesized
        } else {
            result_name
        };

        let node = Node {
            op: ActionOp::Function {
                builder,
                base,
                prepared,
                children,
            },
            result_name,
            result_type,
            column,
            allow_constant_folding,
        };
        self.add_node(node, can_replace)
    }

    /// Node currently indexed under `name`.
    pub fn find(&self, name: &str) -> Option<ActionId> {
        self.index.get(name)
    }

    pub(crate) fn get_id(&self, name: &str) -> Result<ActionId> {
        self.index.get(name).ok_or_else(|| {
            ExprError::new(
                ErrorKind::UnknownIdentifier,
                format!("unknown identifier: '{name}'"),
            )
        })
    }

    pub fn node(&self, id: ActionId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn node_at(&self, id: ActionId) -> &Node {
        self.nodes[id.0]
            .as_ref()
            .expect("referenced node is live")
    }

    /// Live nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (ActionId, &Node)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(pos, slot)| slot.as_ref().map(|node| (ActionId(pos), node)))
    }

    pub fn inputs(&self) -> &[ActionId] {
        &self.inputs
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn settings(&self) -> &ActionsSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut ActionsSettings {
        &mut self.settings
    }

    pub fn set_project_input(&mut self, project_input: bool) {
        self.settings.project_input = project_input;
    }

    pub fn compilation_cache(&self) -> Option<&CompiledExpressionCacheRef> {
        self.compilation_cache.as_ref()
    }

    pub fn set_compilation_cache(&mut self, cache: CompiledExpressionCacheRef) {
        self.compilation_cache = Some(cache);
    }

    /// Names and types of the INPUT nodes, in insertion order.
    pub fn required_columns(&self) -> Vec<(String, DataType)> {
        self.inputs
            .iter()
            .map(|&id| {
                let node = self.node_at(id);
                (node.result_name.clone(), node.result_type.clone())
            })
            .collect()
    }

    /// The current output schema: one column per index entry, in order.
    pub fn result_columns(&self) -> Vec<ColumnWithTypeAndName> {
        self.index
            .ids()
            .map(|id| {
                let node = self.node_at(id);
                ColumnWithTypeAndName {
                    column: node.column.clone(),
                    data_type: node.result_type.clone(),
                    name: node.result_name.clone(),
                }
            })
            .collect()
    }

    pub fn names_and_types(&self) -> Vec<(String, DataType)> {
        self.index
            .ids()
            .map(|id| {
                let node = self.node_at(id);
                (node.result_name.clone(), node.result_type.clone())
            })
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.index
            .ids()
            .map(|id| self.node_at(id).result_name.clone())
            .collect()
    }

    pub fn dump_names(&self) -> String {
        let mut out = String::new();
        for (i, (_, node)) in self.nodes().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&node.result_name);
        }
        out
    }

    /// Line-per-node diagnostic listing; stable across runs for a given DAG.
    pub fn dump_dag(&self) -> String {
        let mut position = std::collections::HashMap::new();
        for (id, _) in self.nodes() {
            let idx = position.len();
            position.insert(id, idx);
        }

        let mut out = String::new();
        for (id, node) in self.nodes() {
            let _ = write!(out, "{} : {} (", position[&id], node.kind().as_str());
            for (i, child) in node.children().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                let _ = write!(out, "{}", position[child]);
            }
            out.push(')');

            match &node.column {
                Some(column) => {
                    let _ = write!(out, " {}", column.name());
                }
                None => out.push_str(" (no column)"),
            }
            let _ = write!(out, " {}", format_type_name(&node.result_type));
            if node.result_name.is_empty() {
                out.push_str(" (no name)");
            } else {
                let _ = write!(out, " {}", node.result_name);
            }
            if let Some(base) = node.function_base() {
                let _ = write!(out, " [{}]", base.name());
            }
            out.push('\n');
        }

        out.push_str("Index:");
        for id in self.index.ids() {
            let _ = write!(out, " {}", position[&id]);
        }
        out.push('\n');
        out
    }

    pub fn has_array_join(&self) -> bool {
        self.nodes()
            .any(|(_, node)| node.kind() == ActionKind::ArrayJoin)
    }

    pub fn has_stateful_functions(&self) -> bool {
        self.nodes()
            .any(|(_, node)| node.function_base().is_some_and(|base| base.is_stateful()))
    }

    /// True when the DAG does nothing but forward its inputs.
    pub fn is_trivial(&self) -> bool {
        self.nodes()
            .all(|(_, node)| node.kind() == ActionKind::Input)
    }

    /// Restrict the index to exactly `required_names`, then drop everything
    /// unreachable from it.
    pub fn remove_unused_actions(&mut self, required_names: &[&str]) -> Result<()> {
        let mut seen = HashSet::new();
        let mut required = Vec::with_capacity(required_names.len());
        for &name in required_names {
            let id = self.index.get(name).ok_or_else(|| {
                ExprError::new(
                    ErrorKind::UnknownIdentifier,
                    format!(
                        "unknown column: {}, there are only columns {}",
                        name,
                        self.dump_names()
                    ),
                )
            })?;
            if seen.insert(id) {
                required.push(id);
            }
        }
        self.remove_unused_for_ids(required);
        Ok(())
    }

    pub(crate) fn remove_unused_for_ids(&mut self, required: Vec<ActionId>) {
        let mut new_index = Index::default();
        for id in required {
            new_index.replace(&self.node_at(id).result_name.clone(), id);
        }
        self.index.swap(&mut new_index);
        self.remove_unused();
    }

    /// Drop every node unreachable from the index. ARRAY JOIN nodes are
    /// kept unconditionally: they change the row count, so the executor
    /// must run them whether or not their output is in the index.
    ///
    /// Reached functions whose result is a foldable constant are rewritten
    /// in place to COLUMN nodes; their arguments become unreachable and are
    /// collected by the same pass.
    pub fn remove_unused(&mut self) {
        let mut visited: HashSet<ActionId> = HashSet::new();
        let mut stack: Vec<ActionId> = Vec::new();

        for id in self.index.ids() {
            if visited.insert(id) {
                stack.push(id);
            }
        }

        let array_joins: Vec<ActionId> = self
            .nodes()
            .filter(|(_, node)| node.kind() == ActionKind::ArrayJoin)
            .map(|(id, _)| id)
            .collect();
        for id in array_joins {
            if visited.insert(id) {
                stack.push(id);
            }
        }

        while let Some(id) = stack.pop() {
            let node = self.nodes[id.0].as_mut().expect("visited node is live");

            if !node.children().is_empty()
                && node.column.as_ref().is_some_and(Column::is_const)
                && node.allow_constant_folding
            {
                node.op = ActionOp::Column;
            }

            let children: Vec<ActionId> = node.children().to_vec();
            for child in children {
                if visited.insert(child) {
                    stack.push(child);
                }
            }
        }

        let mut removed = 0usize;
        for (pos, slot) in self.nodes.iter_mut().enumerate() {
            if slot.is_some() && !visited.contains(&ActionId(pos)) {
                *slot = None;
                removed += 1;
            }
        }
        self.inputs.retain(|id| visited.contains(id));
        if removed > 0 {
            tracing::debug!(removed, remaining = visited.len(), "pruned unused actions");
        }
    }

    /// For every `(name, alias)` with a differing non-empty alias, add an
    /// ALIAS node over `name` (replacing an existing `alias` entry).
    pub fn add_aliases(&mut self, aliases: &[(String, String)]) -> Result<()> {
        self.add_aliases_impl(aliases)?;
        Ok(())
    }

    fn add_aliases_impl(&mut self, aliases: &[(String, String)]) -> Result<Vec<ActionId>> {
        let mut children = Vec::with_capacity(aliases.len());
        for (name, _) in aliases {
            children.push(self.get_id(name)?);
        }

        let mut result = Vec::with_capacity(aliases.len());
        for ((name, alias), child) in aliases.iter().zip(children) {
            if !alias.is_empty() && name != alias {
                result.push(self.add_alias_impl(child, alias.clone(), true)?);
            } else {
                result.push(child);
            }
        }
        Ok(result)
    }

    /// Apply the projection aliases, restrict the index to them, prune, and
    /// mark the inputs as exactly consumed.
    pub fn project(&mut self, projection: &[(String, String)]) -> Result<()> {
        let result_nodes = self.add_aliases_impl(projection)?;
        self.remove_unused_for_ids(result_nodes);
        self.settings.project_input = true;
        self.settings.projected_output = true;
        Ok(())
    }

    /// Bring `name` back into the index, picking the most recently added
    /// node with that name. Returns false when no such node exists.
    pub fn try_restore_column(&mut self, name: &str) -> bool {
        if self.index.contains(name) {
            return true;
        }
        // Newest node wins when several share the name.
        let found = self
            .nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, slot)| {
                slot.as_ref()
                    .is_some_and(|node| node.result_name == name)
            })
            .map(|(pos, _)| ActionId(pos));
        if let Some(id) = found {
            self.index.replace(name, id);
            return true;
        }
        false
    }

    /// Remove one INPUT that nothing references. Callers are responsible
    /// for pruning dependents first; this does not cascade.
    pub fn remove_unused_input(&mut self, name: &str) -> Result<()> {
        let pos = self
            .inputs
            .iter()
            .position(|&id| self.node_at(id).result_name == name)
            .ok_or_else(|| {
                ExprError::new(
                    ErrorKind::LogicalError,
                    format!("input {} not found in DAG\n{}", name, self.dump_dag()),
                )
            })?;
        let input = self.inputs[pos];

        for (_, node) in self.nodes() {
            if node.children().contains(&input) {
                return Err(ExprError::new(
                    ErrorKind::LogicalError,
                    format!(
                        "cannot remove input {} because it has dependent nodes\n{}",
                        name,
                        self.dump_dag()
                    ),
                ));
            }
        }

        let input_name = self.node_at(input).result_name.clone();
        if self.index.get(&input_name) == Some(input) {
            self.index.remove(&input_name);
        }
        self.nodes[input.0] = None;
        self.inputs.remove(pos);
        Ok(())
    }
}

impl Default for ActionsDag {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ActionsDag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionsDag {{\n{}}}", self.dump_dag())
    }
}

#[cfg(test)]
mod tests {
    use super::{ActionKind, ActionsDag};
    use crate::column::{Column, ColumnWithTypeAndName, LiteralValue};
    use crate::common::error::ErrorKind;
    use crate::functions::registry::registry;
    use crate::types::list_element_field;
    use arrow::datatypes::DataType;
    use std::sync::Arc;

    fn const_column(name: &str, value: i64) -> ColumnWithTypeAndName {
        ColumnWithTypeAndName::with_column(
            Column::constant(DataType::Int64, LiteralValue::Int64(value), 1),
            name,
        )
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut dag = ActionsDag::new();
        dag.add_input("x", DataType::Int64).unwrap();
        let err = dag.add_input("x", DataType::Int32).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateColumn);
    }

    #[test]
    fn alias_copies_type_and_column() {
        let mut dag = ActionsDag::new();
        dag.add_column(const_column("a", 5)).unwrap();
        let alias = dag.add_alias("a", "b").unwrap();
        let node = dag.node(alias).unwrap();
        assert_eq!(node.kind(), ActionKind::Alias);
        assert_eq!(node.result_type, DataType::Int64);
        assert_eq!(
            node.column.as_ref().and_then(Column::as_const),
            Some(&LiteralValue::Int64(5))
        );

        let results = dag.result_columns();
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].name, "b");
    }

    #[test]
    fn array_join_takes_element_type() {
        let mut dag = ActionsDag::new();
        dag.add_input(
            "arr",
            DataType::List(Arc::new(list_element_field(DataType::Utf8))),
        )
        .unwrap();
        let id = dag.add_array_join("arr", "e").unwrap();
        let node = dag.node(id).unwrap();
        assert_eq!(node.result_type, DataType::Utf8);
        assert_eq!(node.children().len(), 1);

        dag.add_input("scalar", DataType::Int64).unwrap();
        let err = dag.add_array_join("scalar", "e2").unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeMismatch);
    }

    #[test]
    fn function_name_is_synthesized() {
        let mut dag = ActionsDag::new();
        dag.add_input("x", DataType::Int64).unwrap();
        dag.add_input("y", DataType::Int64).unwrap();
        let id = dag
            .add_function(registry().get("plus").unwrap(), &["x", "y"], "")
            .unwrap();
        assert_eq!(dag.node(id).unwrap().result_name, "plus(x, y)");
    }

    #[test]
    fn constant_folding_on_construction() {
        let mut dag = ActionsDag::new();
        dag.add_column(const_column("a", 1)).unwrap();
        dag.add_column(const_column("b", 2)).unwrap();
        let id = dag
            .add_function(registry().get("plus").unwrap(), &["a", "b"], "")
            .unwrap();

        let node = dag.node(id).unwrap();
        assert_eq!(node.result_type, DataType::Int64);
        assert_eq!(
            node.column.as_ref().and_then(Column::as_const),
            Some(&LiteralValue::Int64(3))
        );

        dag.remove_unused_actions(&["plus(a, b)"]).unwrap();
        let remaining: Vec<_> = dag.nodes().collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].1.kind(), ActionKind::Column);
        assert_eq!(remaining[0].1.result_name, "plus(a, b)");
    }

    #[test]
    fn always_constant_function_disables_further_folding() {
        let mut dag = ActionsDag::new();
        dag.add_input("x", DataType::Int64).unwrap();
        let id = dag
            .add_function(registry().get("ignore").unwrap(), &["x"], "")
            .unwrap();
        let node = dag.node(id).unwrap();
        assert!(node.has_const_column());
        assert!(!node.allow_constant_folding);

        // Not foldable: pruning must keep the function and its input.
        dag.remove_unused_actions(&["ignore(x)"]).unwrap();
        assert_eq!(dag.nodes().count(), 2);
        assert_eq!(dag.node(id).unwrap().kind(), ActionKind::Function);
    }

    #[test]
    fn prune_keeps_array_join_nodes() {
        let mut dag = ActionsDag::new();
        dag.add_input(
            "arr",
            DataType::List(Arc::new(list_element_field(DataType::Int64))),
        )
        .unwrap();
        dag.add_array_join("arr", "e").unwrap();
        dag.add_input("x", DataType::Int64).unwrap();

        // Keep only x; the array join must survive anyway.
        dag.remove_unused_actions(&["x"]).unwrap();
        assert!(dag.has_array_join());
        assert_eq!(dag.nodes().count(), 3);
    }

    #[test]
    fn prune_is_idempotent() {
        let mut dag = ActionsDag::new();
        dag.add_input("x", DataType::Int64).unwrap();
        dag.add_input("unused", DataType::Int64).unwrap();
        dag.add_alias("x", "y").unwrap();
        dag.remove_unused_actions(&["y"]).unwrap();
        let first = dag.dump_dag();
        dag.remove_unused();
        assert_eq!(dag.dump_dag(), first);
    }

    #[test]
    fn self_alias_is_a_no_op() {
        let mut dag = ActionsDag::new();
        dag.add_input("x", DataType::Int64).unwrap();
        dag.add_aliases(&[("x".to_string(), "x".to_string())])
            .unwrap();
        assert_eq!(dag.nodes().count(), 1);
        assert_eq!(dag.names(), vec!["x"]);
    }

    #[test]
    fn try_restore_column_rescans_nodes() {
        let mut dag = ActionsDag::new();
        dag.add_input("x", DataType::Int64).unwrap();
        dag.add_alias("x", "y").unwrap();
        // x stays live as the alias child, but leaves the index.
        dag.remove_unused_actions(&["y"]).unwrap();
        assert!(!dag.index().contains("x"));

        assert!(!dag.try_restore_column("z"));
        assert!(dag.try_restore_column("y"));
        assert!(dag.try_restore_column("x"));
        let restored = dag.find("x").unwrap();
        assert_eq!(dag.node(restored).unwrap().kind(), ActionKind::Input);
        assert_eq!(dag.names(), vec!["y", "x"]);
    }

    #[test]
    fn remove_unused_input_checks_dependents() {
        let mut dag = ActionsDag::new();
        dag.add_input("x", DataType::Int64).unwrap();
        dag.add_input("y", DataType::Int64).unwrap();
        dag.add_alias("x", "x1").unwrap();

        let err = dag.remove_unused_input("x").unwrap_err();
        assert_eq!(err.kind, ErrorKind::LogicalError);
        assert_eq!(dag.remove_unused_input("absent").unwrap_err().kind, ErrorKind::LogicalError);

        dag.remove_unused_input("y").unwrap();
        assert_eq!(dag.required_columns().len(), 1);
        assert!(!dag.index().contains("y"));
    }

    #[test]
    fn dump_dag_is_stable() {
        let mut dag = ActionsDag::new();
        dag.add_input("x", DataType::Int64).unwrap();
        dag.add_column(const_column("one", 1)).unwrap();
        dag.add_function(registry().get("plus").unwrap(), &["x", "one"], "sum")
            .unwrap();
        let dump = dag.dump_dag();
        assert_eq!(
            dump,
            "0 : INPUT () (no column) Int64 x\n\
             1 : COLUMN () Const(Int64) Int64 one\n\
             2 : FUNCTION (0, 1) (no column) Int64 sum [plus]\n\
             Index: 0 1 2\n"
        );
        assert_eq!(dag.dump_dag(), dump);
    }

    #[test]
    fn clone_is_isomorphic() {
        let mut dag = ActionsDag::new();
        dag.add_input("x", DataType::Int64).unwrap();
        dag.add_alias("x", "y").unwrap();
        let copy = dag.clone();
        assert_eq!(copy.dump_dag(), dag.dump_dag());
        assert_eq!(copy.names(), dag.names());
    }
}
