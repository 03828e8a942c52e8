// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! TKIP: RC4 with per-frame Phase1/Phase2 key mixing, a Michael MIC, and a
//! WEP-style ICV (spec §4.3/§4.4, components C5/C6).

pub mod engine;
pub mod keymix;

pub use engine::{decrypt_frame, encrypt_frame, TkipCache};
