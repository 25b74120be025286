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
//! Merge and split transformations: structure and execution equivalence.

mod common;

use std::collections::HashSet;

use arrow::datatypes::DataType;
use std::sync::Arc;

use common::{as_int64_values, execute_dag, int64_column, int64_constant};
use greywacke_expr::actions::ActionKind;
use greywacke_expr::functions::registry::registry;
use greywacke_expr::types::list_element_field;
use greywacke_expr::{ActionsDag, ErrorKind};

/// first: z = plus(x, 1) with index {z}.
fn producer() -> ActionsDag {
    let mut dag = ActionsDag::new();
    dag.add_input("x", DataType::Int64).unwrap();
    dag.add_column(int64_constant("one", 1)).unwrap();
    dag.add_function(registry().get("plus").unwrap(), &["x", "one"], "z")
        .unwrap();
    dag.remove_unused_actions(&["z"]).unwrap();
    dag
}

/// second: t = multiply(z, 2) over an external input z, index {t}.
fn consumer() -> ActionsDag {
    let mut dag = ActionsDag::new();
    dag.add_input("z", DataType::Int64).unwrap();
    dag.add_column(int64_constant("two", 2)).unwrap();
    dag.add_function(registry().get("multiply").unwrap(), &["z", "two"], "t")
        .unwrap();
    dag.remove_unused_actions(&["t"]).unwrap();
    dag
}

#[test]
fn merge_consumes_matching_results() {
    common::init_test_logging();

    let merged = ActionsDag::merge(producer(), consumer()).unwrap();

    // z is produced internally now: the only external input is x.
    assert_eq!(
        merged.required_columns(),
        vec![("x".to_string(), DataType::Int64)]
    );
    // The consumer's output leads the merged index.
    assert_eq!(merged.names()[0], "t");

    // The multiply node references the producing plus node directly.
    let t = merged.find("t").unwrap();
    let multiply = merged.node(t).unwrap();
    let fed_by = merged.node(multiply.children()[0]).unwrap();
    assert_eq!(fed_by.result_name, "z");
    assert_eq!(fed_by.kind(), ActionKind::Function);

    // merge(first, second) executes like first-then-second.
    let block = [int64_column("x", vec![1, 2, 3])];
    let direct = execute_dag(&merged, &block).unwrap();
    let staged_first = execute_dag(&producer(), &block).unwrap();
    let staged_second = execute_dag(&consumer(), &staged_first).unwrap();
    assert_eq!(
        as_int64_values(&direct[0]),
        as_int64_values(&staged_second[0])
    );
    assert_eq!(as_int64_values(&direct[0]), vec![4, 6, 8]);
}

#[test]
fn merge_widens_inputs_unless_projected() {
    // The consumer wants a column the producer does not provide.
    let mut second = ActionsDag::new();
    second.add_input("y", DataType::Int64).unwrap();

    let merged = ActionsDag::merge(producer(), second).unwrap();
    let names: Vec<String> = merged
        .required_columns()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["x", "y"]);

    // With project_input set, widening is a logic error.
    let mut projected = producer();
    projected.set_project_input(true);
    let mut second = ActionsDag::new();
    second.add_input("y", DataType::Int64).unwrap();
    let err = ActionsDag::merge(projected, second).unwrap_err();
    assert_eq!(err.kind, ErrorKind::LogicalError);
}

#[test]
fn merge_takes_consumer_index_when_it_projects() {
    let mut second = consumer();
    second.set_project_input(true);
    let merged = ActionsDag::merge(producer(), second).unwrap();
    assert_eq!(merged.names(), vec!["t"]);
    assert!(merged.settings().project_input);
}

#[test]
fn split_for_filter_exposes_boundary() {
    let mut dag = ActionsDag::new();
    dag.add_input("x", DataType::Int64).unwrap();
    dag.add_column(int64_constant("zero", 0)).unwrap();
    dag.add_function(registry().get("gt").unwrap(), &["x", "zero"], "f")
        .unwrap();
    dag.add_column(int64_constant("one", 1)).unwrap();
    dag.add_function(registry().get("plus").unwrap(), &["x", "one"], "y")
        .unwrap();
    dag.remove_unused_actions(&["f", "y"]).unwrap();

    let (first, second) = dag.split_actions_for_filter("f").unwrap();

    // The first half computes the filter and forwards x.
    assert_eq!(first.names(), vec!["f", "x"]);
    // The second half takes both across the boundary and keeps the
    // original output schema.
    let second_inputs: Vec<String> = second
        .required_columns()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(second_inputs, vec!["f", "x"]);
    assert_eq!(second.names(), vec!["f", "y"]);

    // Running the halves in sequence equals running the original.
    let block = [int64_column("x", vec![-2, 5])];
    let original = execute_dag(&dag, &block).unwrap();
    let boundary = execute_dag(&first, &block).unwrap();
    let staged = execute_dag(&second, &boundary).unwrap();
    assert_eq!(as_int64_values(&original[1]), as_int64_values(&staged[1]));
    assert_eq!(as_int64_values(&staged[1]), vec![-1, 6]);

    let missing = dag.split_actions_for_filter("absent").unwrap_err();
    assert_eq!(missing.kind, ErrorKind::LogicalError);
}

#[test]
fn generic_split_copies_column_values() {
    let mut dag = ActionsDag::new();
    dag.add_input("x", DataType::Int64).unwrap();
    dag.add_column(int64_constant("ten", 10)).unwrap();
    dag.add_function(registry().get("plus").unwrap(), &["x", "ten"], "shifted")
        .unwrap();
    dag.add_function(registry().get("multiply").unwrap(), &["x", "ten"], "scaled")
        .unwrap();
    dag.remove_unused_actions(&["shifted", "scaled"]).unwrap();

    // Put only `shifted` into the first half; `scaled` stays behind and
    // needs its own copy of the constant.
    let shifted = dag.find("shifted").unwrap();
    let (first, second) = dag.split(&HashSet::from([shifted]));

    assert!(first.index().contains("shifted"));
    assert!(second.index().contains("scaled"));
    // Both halves own a COLUMN node for the constant.
    assert!(first
        .nodes()
        .any(|(_, node)| node.kind() == ActionKind::Column));
    assert!(second
        .nodes()
        .any(|(_, node)| node.kind() == ActionKind::Column));

    let block = [int64_column("x", vec![3])];
    let boundary = execute_dag(&first, &block).unwrap();
    let staged = execute_dag(&second, &boundary).unwrap();
    let original = execute_dag(&dag, &block).unwrap();
    assert_eq!(as_int64_values(&original[0]), as_int64_values(&staged[0]));
    assert_eq!(as_int64_values(&original[1]), as_int64_values(&staged[1]));
}

#[test]
fn split_before_array_join_keeps_array_joins_late() {
    let mut dag = ActionsDag::new();
    dag.add_input(
        "arr",
        DataType::List(Arc::new(list_element_field(DataType::Int64))),
    )
    .unwrap();
    dag.add_input("x", DataType::Int64).unwrap();
    dag.add_array_join("arr", "e").unwrap();
    dag.add_column(int64_constant("one", 1)).unwrap();
    dag.add_function(registry().get("plus").unwrap(), &["x", "one"], "early")
        .unwrap();
    dag.add_function(registry().get("plus").unwrap(), &["e", "one"], "late")
        .unwrap();
    dag.remove_unused_actions(&["early", "late"]).unwrap();

    let columns = HashSet::from(["arr".to_string()]);
    let (first, second) = dag.split_actions_before_array_join(&columns);

    // Nothing that changes the row count runs early.
    assert!(!first.has_array_join());
    assert!(second.has_array_join());
    // The pre-join computation moved into the first half.
    assert!(first.index().contains("early"));
    // Unused array-joined inputs must not be pruned away later.
    assert!(!first.settings().project_input);

    // The array column rides through the first half untouched.
    let first_inputs: Vec<String> = first
        .required_columns()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert!(first_inputs.contains(&"arr".to_string()));
}
