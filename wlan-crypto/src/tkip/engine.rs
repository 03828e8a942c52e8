// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! TKIP encrypt/decrypt pipeline (spec §4.4, component C6): Michael MIC,
//! then WEP-style ICV, then RC4 under the Phase2-mixed per-frame key.

use super::keymix::{phase1, phase2};
use crate::config::{CIPHER_HEADER_LEN, MIC_LEN, WEP_ICV_LEN};
use crate::error::CryptoError;
use crate::header;
use crate::key::Key;
use crate::primitives::crc;
use crate::primitives::michael::michael_mic;
use crate::primitives::rc4::Rc4;

/// Builds the 8-octet TKIP header carried on the wire ahead of the
/// ciphertext (spec §4.4): TSC1, the WEP weak-IV-avoidance byte, TSC0, the
/// KeyID octet with the ExtIV bit always set, then TSC2-5.
fn build_tkip_header(tsc: u64, key_id: u8) -> [u8; CIPHER_HEADER_LEN] {
    let b = tsc.to_le_bytes();
    let (tsc0, tsc1, tsc2, tsc3, tsc4, tsc5) = (b[0], b[1], b[2], b[3], b[4], b[5]);
    let mut hdr = [0u8; CIPHER_HEADER_LEN];
    hdr[0] = tsc1;
    hdr[1] = (tsc1 | 0x20) & 0x7f;
    hdr[2] = tsc0;
    hdr[3] = 0x80 | ((key_id & 0x03) << 5); // ExtIV set, Key ID in bits 5-6
    hdr[4] = tsc2;
    hdr[5] = tsc3;
    hdr[6] = tsc4;
    hdr[7] = tsc5;
    hdr
}

/// Parses a TKIP header, rejecting it outright if the ExtIV bit is clear
/// (spec §5: "ExtIV bit clear in the cipher header: drop").
fn parse_tkip_header(hdr: &[u8; CIPHER_HEADER_LEN]) -> Result<(u64, u8), CryptoError> {
    if hdr[3] & 0x80 == 0 {
        return Err(CryptoError::NoExtIv);
    }
    let key_id = (hdr[3] >> 5) & 0x03;
    let tsc = u64::from_le_bytes([hdr[2], hdr[0], hdr[4], hdr[5], hdr[6], hdr[7], 0, 0]);
    Ok((tsc, key_id))
}

/// Caches the last Phase1 (TTAK) output so consecutive frames sharing an
/// IV32 don't redo the 8-round mix (spec §4.3: "recomputed only when IV32
/// changes").
#[derive(Debug, Default, Clone)]
pub struct TkipCache {
    p1k: Option<([u16; 5], u32)>,
}

impl TkipCache {
    fn p1k_for(&mut self, tk: &[u8; 16], ta: &[u8; 6], iv32: u32) -> [u16; 5] {
        if let Some((p1k, cached_iv32)) = self.p1k {
            if cached_iv32 == iv32 {
                return p1k;
            }
        }
        let p1k = phase1(tk, ta, iv32);
        self.p1k = Some((p1k, iv32));
        p1k
    }
}

/// Builds the 16-byte Michael MIC pseudo-header: DA, SA, a priority octet
/// (the TID, or 0 for non-QoS frames), and three reserved zero octets
/// (spec §4.4).
fn michael_pseudo_header(frame: &[u8]) -> Vec<u8> {
    let (da, sa) = header::da_sa(frame);
    let priority = if header::has_qos(frame) {
        header::get_tid(frame)
    } else {
        0
    };
    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(&da);
    out.extend_from_slice(&sa);
    out.push(priority);
    out.extend_from_slice(&[0, 0, 0]);
    out
}

/// Encrypts one MSDU under TKIP, drawing the next TSC from `key` (spec §6:
/// `tkip_encrypt`). Returns the 8-octet TKIP header plus the
/// Michael-MIC||ICV-protected, RC4-encrypted body, concatenated in wire
/// order — this is exactly what goes out after the MAC header.
pub fn encrypt_frame(
    frame: &[u8],
    plaintext: &[u8],
    tk: &[u8; 16],
    key: &mut Key,
    cache: &mut TkipCache,
) -> Result<Vec<u8>, CryptoError> {
    header::validate(frame)?;
    let (mic_tx_key, _) = key.tkip_mic_keys().ok_or(CryptoError::Malformed)?;
    let tsc = key.next_tx_pn();
    let iv32 = (tsc >> 16) as u32;
    let iv16 = (tsc & 0xffff) as u16;

    let mut pseudo = michael_pseudo_header(frame);
    pseudo.extend_from_slice(plaintext);
    let mic = michael_mic(&mic_tx_key, &pseudo);

    let mut body = plaintext.to_vec();
    body.extend_from_slice(&mic);
    let icv = crc::icv(&body);
    body.extend_from_slice(&icv);

    let ta = header::addr2(frame);
    let p1k = cache.p1k_for(tk, &ta, iv32);
    let rc4key = phase2(tk, &p1k, iv16);
    Rc4::new(&rc4key).apply_keystream(&mut body);

    let mut out = build_tkip_header(tsc, key.index).to_vec();
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decrypts one MSDU, enforcing TSC replay protection, then ICV, then
/// Michael MIC, in that order (spec §6: `tkip_decrypt`; spec §5 on error
/// ordering — ICV failures are common and cheap, MIC failures drive
/// countermeasures and must only fire once the frame is known-undamaged).
pub fn decrypt_frame(
    frame: &[u8],
    body: &[u8],
    tk: &[u8; 16],
    key: &mut Key,
    cache: &mut TkipCache,
) -> Result<Vec<u8>, CryptoError> {
    header::validate(frame)?;
    if body.len() < CIPHER_HEADER_LEN + MIC_LEN + WEP_ICV_LEN {
        return Err(CryptoError::Malformed);
    }
    let (tkip_hdr_bytes, ciphertext) = body.split_at(CIPHER_HEADER_LEN);
    let tkip_hdr: [u8; CIPHER_HEADER_LEN] = tkip_hdr_bytes.try_into().unwrap();
    let (tsc, _key_id) = parse_tkip_header(&tkip_hdr)?;

    let (_, mic_rx_key) = key.tkip_mic_keys().ok_or(CryptoError::Malformed)?;

    let tid = if header::has_qos(frame) {
        header::get_tid(frame)
    } else {
        0
    };
    let accepted = if header::is_management(frame) {
        key.check_and_update_mgmt_rx_pn(tsc)
    } else {
        key.check_and_update_rx_pn(tid, tsc)
    };
    if !accepted {
        return Err(CryptoError::Replay);
    }

    let iv32 = (tsc >> 16) as u32;
    let iv16 = (tsc & 0xffff) as u16;
    let ta = header::addr2(frame);
    let p1k = cache.p1k_for(tk, &ta, iv32);
    let rc4key = phase2(tk, &p1k, iv16);

    let mut decrypted = ciphertext.to_vec();
    Rc4::new(&rc4key).apply_keystream(&mut decrypted);

    let icv_off = decrypted.len() - WEP_ICV_LEN;
    let (with_mic, icv_bytes) = decrypted.split_at(icv_off);
    if crc::icv(with_mic).as_slice() != icv_bytes {
        return Err(CryptoError::IcvFailTkip);
    }

    let mic_off = with_mic.len() - MIC_LEN;
    let (plaintext, mic_bytes) = with_mic.split_at(mic_off);

    let mut pseudo = michael_pseudo_header(frame);
    pseudo.extend_from_slice(plaintext);
    let expect_mic = michael_mic(&mic_rx_key, &pseudo);
    if expect_mic.as_slice() != mic_bytes {
        return Err(CryptoError::MicFailTkip);
    }

    Ok(plaintext.to_vec())
}
