// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations.

pub mod lint;
