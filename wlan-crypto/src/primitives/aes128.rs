// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! AES-128 single-block encryption, used by CCMP for both CBC-MAC and
//! counter-mode keystream generation (spec §4.2). Backed by the `aes`
//! crate rather than a hand-rolled implementation: AES itself is out of
//! scope for this crate (spec §1) and the RustCrypto `aes` crate is the
//! ecosystem's standard, constant-time implementation.

use aes::cipher::{BlockEncrypt, KeyInit};
use aes::Aes128;

/// A precomputed AES-128 encryption-only key schedule (spec §3: "derived
/// exactly once at install time").
#[derive(Clone)]
pub struct AesKeySchedule {
    cipher: Aes128,
}

impl AesKeySchedule {
    pub fn new(key: &[u8; 16]) -> Self {
        AesKeySchedule {
            cipher: Aes128::new(key.into()),
        }
    }

    /// Encrypts a single 16-byte block in place.
    pub fn encrypt_block(&self, block: &mut [u8; 16]) {
        self.cipher.encrypt_block(block.into());
    }
}

impl std::fmt::Debug for AesKeySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AesKeySchedule(..)")
    }
}

// AES-128 key schedules hold no secret-dependent branching; equality on the
// derived schedule isn't meaningful, so `Key` compares on the raw key
// material instead (see key.rs) and this type need not implement PartialEq.
