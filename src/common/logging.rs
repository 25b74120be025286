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
use std::sync::OnceLock;

use chrono::Local;
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, fmt as tracing_fmt};

use crate::common::config;

static INIT: OnceLock<()> = OnceLock::new();

/// One event per line: `LEVEL date time file:line message`.
struct ExprLogFormat;

impl<S, N> FormatEvent<S, N> for ExprLogFormat
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &tracing_fmt::FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();

        write!(
            writer,
            "{:>5} {} ",
            metadata.level(),
            Local::now().format("%Y-%m-%d %H:%M:%S%.6f")
        )?;
        if let (Some(file), Some(line)) = (metadata.file(), metadata.line()) {
            write!(writer, "{file}:{line} ")?;
        }

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the subscriber with an explicit `EnvFilter` expression.
pub fn init_with_filter(filter: &str) {
    INIT.get_or_init(|| {
        // ANSI colors only when stderr is a terminal, otherwise log files
        // would contain escape sequences.
        let use_ansi = atty::is(atty::Stream::Stderr);
        let _ = tracing_fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(std::io::stderr)
            .with_ansi(use_ansi)
            .event_format(ExprLogFormat)
            .try_init();
    });
}

/// Install the subscriber, taking the filter from the engine config when
/// one is loaded.
pub fn init() {
    match config::config() {
        Ok(cfg) => init_with_filter(cfg.effective_log_filter()),
        Err(_) => init_with_filter("info"),
    }
}
