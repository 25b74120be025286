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
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

use super::arithmetic::{ArithmeticFunction, ArithmeticOp};
use super::cast::{CastType, create_cast};
use super::comparison::{ComparisonFunction, ComparisonOp};
use super::materialize::create_materialize;
use super::misc::IgnoreFunction;
use super::FunctionBuilderRef;

static REGISTRY: Lazy<FunctionRegistry> = Lazy::new(FunctionRegistry::with_builtins);

/// Name → overload-resolver table for the builtin function set.
pub fn registry() -> &'static FunctionRegistry {
    &REGISTRY
}

pub struct FunctionRegistry {
    builders: HashMap<&'static str, FunctionBuilderRef>,
}

impl FunctionRegistry {
    pub fn with_builtins() -> Self {
        let mut builders: HashMap<&'static str, FunctionBuilderRef> = HashMap::new();

        for op in [
            ArithmeticOp::Plus,
            ArithmeticOp::Minus,
            ArithmeticOp::Multiply,
            ArithmeticOp::Divide,
        ] {
            builders.insert(op.name(), Arc::new(ArithmeticFunction::new(op)));
        }
        for op in ComparisonOp::ALL {
            builders.insert(op.name(), Arc::new(ComparisonFunction::new(op)));
        }
        builders.insert("cast", create_cast(CastType::NonAccurate, None));
        builders.insert("materialize", create_materialize());
        builders.insert("ignore", Arc::new(IgnoreFunction));

        Self { builders }
    }

    pub fn get(&self, name: &str) -> Option<FunctionBuilderRef> {
        self.builders.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }
}
