// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! Per-frame link-layer encryption core for IEEE 802.11: CCMP (AES-CCM,
//! M=8/L=2) and TKIP (RC4 + Phase1/Phase2 key mixing + Michael MIC + WEP
//! CRC-32 ICV), per IEEE 802.11-2007 §8.3.2/§8.3.3.
//!
//! This crate owns the cipher transforms and their per-key replay/mixing
//! state; it does not own MAC framing, association state, or key exchange.
//! Those seams are named in `wlan-crypto-hil` and satisfied by the
//! embedding driver.

pub mod ccmp;
pub mod chain;
pub mod config;
pub mod countermeasures;
pub mod error;
pub mod header;
pub mod key;
pub mod primitives;
pub mod ratelimit;
pub mod tkip;

pub use chain::{DefaultAllocator, FailAfter, FrameChain, SegmentAllocator};
pub use config::Config;
pub use countermeasures::Countermeasures;
pub use error::CryptoError;
pub use key::{CipherContext, Key, KeyRole};
pub use ratelimit::RateLimiter;
pub use tkip::TkipCache;

/// Installs a CCMP key (spec §6: `set_key`), the one operation in this
/// crate's public surface allowed to report a typed error: allocation
/// failure at install time is the exception spec §7 carves out of "errors
/// never cross the public API". `alloc` stands in for whatever allocator
/// the embedding driver uses to size the key's installed state.
pub fn ccmp_set_key(
    index: u8,
    role: KeyRole,
    key_bytes: &[u8; 16],
    alloc: &mut dyn SegmentAllocator,
) -> Result<Key, CryptoError> {
    alloc
        .alloc(std::mem::size_of::<Key>())
        .ok_or(CryptoError::NoMem)?;
    Ok(Key::new_ccmp(index, role, key_bytes))
}

/// Installs a TKIP key (spec §6: `set_key`); see [`ccmp_set_key`].
pub fn tkip_set_key(
    index: u8,
    role: KeyRole,
    mic_tx_key: [u8; 8],
    mic_rx_key: [u8; 8],
    alloc: &mut dyn SegmentAllocator,
) -> Result<Key, CryptoError> {
    alloc
        .alloc(std::mem::size_of::<Key>())
        .ok_or(CryptoError::NoMem)?;
    Ok(Key::new_tkip(index, role, mic_tx_key, mic_rx_key))
}

/// Deinstalls a key (spec §6: `delete_key`). This crate never owns key
/// storage itself — the caller holds the `Key` returned from `set_key` —
/// so deletion is dropping it; named explicitly so the public surface
/// exposes all four per-cipher operations the spec requires rather than
/// leaving the fourth to an implicit `Drop`.
pub fn ccmp_delete_key(key: Key) {
    drop(key);
}

/// Deinstalls a TKIP key; see [`ccmp_delete_key`].
pub fn tkip_delete_key(key: Key) {
    drop(key);
}

/// Encrypts one MPDU under CCMP, drawing the next packet number from `key`
/// (spec §6: `ccmp_encrypt`). The returned buffer is the 8-octet CCMP
/// header, ciphertext, and MIC in wire order, ready to follow the MAC
/// header as-is. Per spec §7, failure never crosses this boundary as a
/// typed value — a missing return is the only signal.
pub fn ccmp_encrypt(header: &[u8], plaintext: &[u8], key: &mut Key) -> Option<Vec<u8>> {
    ccmp::encrypt_frame(header, plaintext, key).ok()
}

/// Decrypts one MPDU under CCMP (spec §6: `ccmp_decrypt`). `body` is the
/// CCMP header, ciphertext, and MIC exactly as `ccmp_encrypt` produced
/// them; the packet number is read out of the header, not taken as a
/// parameter. Drop reasons are logged through `limiter` at a rate bounded
/// by `Config::log_rate_limit_*`, then discarded — `None` is the only
/// thing that crosses back to the caller.
pub fn ccmp_decrypt(
    header: &[u8],
    body: &[u8],
    key: &mut Key,
    limiter: &mut RateLimiter,
) -> Option<Vec<u8>> {
    match ccmp::decrypt_frame(header, body, key) {
        Ok(plaintext) => Some(plaintext),
        Err(e) => {
            log_drop(limiter, e);
            None
        }
    }
}

/// Encrypts one MSDU under TKIP, drawing the next TSC from `key` (spec §6:
/// `tkip_encrypt`). `tk` is the 128-bit temporal key; `cache` holds the
/// Phase1 cache for this key's TX direction. The returned buffer is the
/// 8-octet TKIP header plus the Michael-MIC/ICV-protected, RC4-encrypted
/// body, in wire order.
pub fn tkip_encrypt(
    header: &[u8],
    plaintext: &[u8],
    tk: &[u8; 16],
    key: &mut Key,
    cache: &mut TkipCache,
) -> Option<Vec<u8>> {
    tkip::engine::encrypt_frame(header, plaintext, tk, key, cache).ok()
}

/// Decrypts one MSDU under TKIP (spec §6: `tkip_decrypt`), checking TSC
/// replay, then the WEP-style ICV, then the Michael MIC, in that order.
/// Per spec §7 the specific drop reason never crosses this boundary, only
/// whether the frame was accepted; deciding when a rejected frame warrants
/// [`Countermeasures::ap_mic_failure`]/[`Countermeasures::sta_mic_failure`]
/// is the embedding driver's call, made with whatever context it has
/// (e.g. a pairwise key whose ICV checks are otherwise never expected to
/// fail legitimately).
pub fn tkip_decrypt(
    header: &[u8],
    body: &[u8],
    tk: &[u8; 16],
    key: &mut Key,
    cache: &mut TkipCache,
    limiter: &mut RateLimiter,
) -> Option<Vec<u8>> {
    match tkip::engine::decrypt_frame(header, body, tk, key, cache) {
        Ok(plaintext) => Some(plaintext),
        Err(e) => {
            log_drop(limiter, e);
            None
        }
    }
}

/// Computes a standalone Michael MIC over an already-assembled pseudo-header
/// plus payload (spec §6: `tkip_mic`). Exposed directly for callers that
/// need to precompute or verify a MIC outside the full `tkip_encrypt`/
/// `tkip_decrypt` pipeline (e.g. the key-management self-test a
/// supplicant runs after installing a new pairwise key).
pub fn tkip_mic(key: &[u8; 8], pseudo_header_and_payload: &[u8]) -> [u8; 8] {
    primitives::michael::michael_mic(key, pseudo_header_and_payload)
}

fn log_drop(limiter: &mut RateLimiter, reason: CryptoError) {
    if !limiter.allow(reason) {
        return;
    }
    match reason {
        CryptoError::NoMem => log::error!("{reason}"),
        CryptoError::AuthFailCcmp | CryptoError::IcvFailTkip | CryptoError::MicFailTkip => {
            log::warn!("{reason}")
        }
        CryptoError::Replay | CryptoError::Malformed | CryptoError::NoExtIv => {
            log::debug!("{reason}")
        }
    }
}
