// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! Named, overridable constants, in the style of the teacher's
//! `kernel/src/config.rs`: a small set of values a real implementation
//! would otherwise bury as magic numbers, collected so tests (and, down
//! the line, the embedding driver) can change them without touching the
//! state machines that use them.

use std::time::Duration;

/// CCMP/TKIP header length (spec §6).
pub const CIPHER_HEADER_LEN: usize = 8;
/// CCMP MIC length / TKIP Michael MIC length (spec §6).
pub const MIC_LEN: usize = 8;
/// TKIP WEP-style ICV length (spec §6).
pub const WEP_ICV_LEN: usize = 4;
/// TKIP overhead: header + MIC + ICV (spec §6).
pub const TKIP_OVERHEAD: usize = CIPHER_HEADER_LEN + MIC_LEN + WEP_ICV_LEN;

#[derive(Debug, Clone)]
pub struct Config {
    /// Window within which a second Michael MIC failure escalates to
    /// countermeasures (spec §4.5). 60 seconds per the standard.
    pub countermeasures_window: Duration,
    /// Token-bucket capacity per `CryptoError` reason for the per-frame
    /// drop logging in the encrypt/decrypt paths (spec §7).
    pub log_rate_limit_burst: u32,
    /// Tokens replenished per second for the same bucket.
    pub log_rate_limit_per_sec: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            countermeasures_window: Duration::from_secs(60),
            log_rate_limit_burst: 5,
            log_rate_limit_per_sec: 1,
        }
    }
}
