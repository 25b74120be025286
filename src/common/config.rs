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
use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::actions::ActionsSettings;

static CONFIG: OnceLock<ExprConfig> = OnceLock::new();
static SETTINGS: OnceLock<ActionsSettings> = OnceLock::new();

fn default_log_level() -> String {
    "info".to_string()
}

/// Per-DAG settings used by `ActionsDag::new`: taken from the loaded
/// config when one is present, compiled-in defaults otherwise. Resolved
/// once per process.
pub fn default_actions_settings() -> ActionsSettings {
    SETTINGS
        .get_or_init(|| match config() {
            Ok(cfg) => cfg.actions_settings(),
            Err(_) => ActionsSettings::default(),
        })
        .clone()
}

pub fn init_from_path(path: impl AsRef<Path>) -> Result<&'static ExprConfig> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }
    let cfg = ExprConfig::load_from_file(path.as_ref())?;
    let _ = CONFIG.set(cfg);
    Ok(CONFIG.get().expect("CONFIG set"))
}

pub fn init_from_env_or_default() -> Result<&'static ExprConfig> {
    if let Some(cfg) = CONFIG.get() {
        return Ok(cfg);
    }
    let path = config_path_from_env_or_default()?;
    let cfg = ExprConfig::load_from_file(&path)?;
    let _ = CONFIG.set(cfg);
    Ok(CONFIG.get().expect("CONFIG set"))
}

pub fn config() -> Result<&'static ExprConfig> {
    init_from_env_or_default()
}

fn config_path_from_env_or_default() -> Result<PathBuf> {
    if let Ok(p) = std::env::var("GREYWACKE_CONFIG") {
        if !p.trim().is_empty() {
            return Ok(PathBuf::from(p));
        }
    }

    let candidates = [PathBuf::from("greywacke.toml")];
    for p in candidates {
        if p.exists() {
            return Ok(p);
        }
    }

    Err(anyhow!(
        "missing config file: set $GREYWACKE_CONFIG or create ./greywacke.toml"
    ))
}

#[derive(Clone, Deserialize)]
pub struct ExprConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional full tracing EnvFilter expression.
    /// If set, this takes precedence over `log_level`.
    #[serde(default)]
    pub log_filter: Option<String>,

    #[serde(default)]
    pub actions: ActionsConfig,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ActionsConfig {
    /// Executor cap on temporary columns while evaluating a DAG; 0 = unlimited.
    pub max_temporary_columns: usize,
    /// Executor cap on non-constant temporary columns; 0 = unlimited.
    pub max_temporary_non_const_columns: usize,
    pub compile_expressions: bool,
    pub min_count_to_compile_expression: u64,
}

impl Default for ActionsConfig {
    fn default() -> Self {
        Self {
            max_temporary_columns: 0,
            max_temporary_non_const_columns: 0,
            compile_expressions: false,
            min_count_to_compile_expression: 3,
        }
    }
}

impl ExprConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read config file: {}", path.display()))?;
        let cfg: ExprConfig =
            toml::from_str(&s).with_context(|| format!("parse toml: {}", path.display()))?;
        Ok(cfg)
    }

    pub fn effective_log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(&self.log_level)
    }

    pub fn actions_settings(&self) -> ActionsSettings {
        ActionsSettings {
            max_temporary_columns: self.actions.max_temporary_columns,
            max_temporary_non_const_columns: self.actions.max_temporary_non_const_columns,
            compile_expressions: self.actions.compile_expressions,
            min_count_to_compile_expression: self.actions.min_count_to_compile_expression,
            ..ActionsSettings::default()
        }
    }
}
