// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod highlight;
pub mod index_client;
pub mod logging;
pub mod query_builder;
pub mod renderer;
pub mod results;
pub mod search;
pub mod sentences;
