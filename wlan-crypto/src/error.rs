// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! Error taxonomy (spec §7). These never cross `encrypt`/`decrypt`'s public
//! boundary — a missing output chain is the only signal callers see — but
//! the internal state machines and their tests need to know which of the
//! conditions in the table below actually fired, and the rate limiter
//! keys its buckets on this type.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Segment allocator exhausted mid-operation.
    NoMem,
    /// Frame shorter than the required header/trailer overhead.
    Malformed,
    /// ExtIV bit clear in the cipher header.
    NoExtIv,
    /// `pn <= prsc` (or the management counter, for management frames).
    Replay,
    /// CCM MIC mismatch.
    AuthFailCcmp,
    /// WEP-style CRC mismatch in the TKIP trailer.
    IcvFailTkip,
    /// Michael MIC mismatch after the ICV checked out.
    MicFailTkip,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CryptoError::NoMem => "segment allocation failed",
            CryptoError::Malformed => "frame too short for cipher overhead",
            CryptoError::NoExtIv => "ExtIV bit not set",
            CryptoError::Replay => "packet number did not advance replay counter",
            CryptoError::AuthFailCcmp => "CCM MIC verification failed",
            CryptoError::IcvFailTkip => "TKIP ICV verification failed",
            CryptoError::MicFailTkip => "Michael MIC verification failed",
        };
        f.write_str(s)
    }
}

impl std::error::Error for CryptoError {}
