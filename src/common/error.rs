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
use std::fmt;

/// Error kinds raised by DAG construction and transformation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    DuplicateColumn,
    UnknownIdentifier,
    TypeMismatch,
    NumberOfColumnsDoesntMatch,
    ThereIsNoColumn,
    IllegalColumn,
    LogicalError,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DuplicateColumn => "DUPLICATE_COLUMN",
            ErrorKind::UnknownIdentifier => "UNKNOWN_IDENTIFIER",
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::NumberOfColumnsDoesntMatch => "NUMBER_OF_COLUMNS_DOESNT_MATCH",
            ErrorKind::ThereIsNoColumn => "THERE_IS_NO_COLUMN",
            ErrorKind::IllegalColumn => "ILLEGAL_COLUMN",
            ErrorKind::LogicalError => "LOGICAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub struct ExprError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ExprError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ExprError {}

pub type Result<T> = std::result::Result<T, ExprError>;
