// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! CCMP: AES-CCM (M=8, L=2) applied to 802.11 frames (spec §4.2,
//! component C4). The generic CCM construction (RFC 3610) lives at the
//! bottom of this module as free functions so it can be exercised against
//! the RFC's own test vectors independent of 802.11 framing; the
//! frame-aware nonce/AAD builders sit above it.

use crate::config::CIPHER_HEADER_LEN;
use crate::error::CryptoError;
use crate::header;
use crate::key::Key;
use crate::primitives::aes128::AesKeySchedule;

const M: usize = 8; // MIC length in octets
const L: usize = 2; // length-field width in octets; nonce is 15-L bytes

/// Builds the 8-octet CCMP header carried on the wire ahead of the
/// ciphertext (spec §4.2): PN0, PN1, Reserved, the KeyID octet with the
/// ExtIV bit always set, then PN2-5.
fn build_cipher_header(pn: u64, key_id: u8) -> [u8; CIPHER_HEADER_LEN] {
    let pn_bytes = pn.to_le_bytes();
    let mut hdr = [0u8; CIPHER_HEADER_LEN];
    hdr[0] = pn_bytes[0];
    hdr[1] = pn_bytes[1];
    hdr[2] = 0; // Reserved
    hdr[3] = 0x80 | ((key_id & 0x03) << 5); // ExtIV set, Key ID in bits 5-6
    hdr[4] = pn_bytes[2];
    hdr[5] = pn_bytes[3];
    hdr[6] = pn_bytes[4];
    hdr[7] = pn_bytes[5];
    hdr
}

/// Parses a CCMP header, rejecting it outright if the ExtIV bit is clear
/// (spec §5: "ExtIV bit clear in the cipher header: drop").
fn parse_cipher_header(hdr: &[u8; CIPHER_HEADER_LEN]) -> Result<(u64, u8), CryptoError> {
    if hdr[3] & 0x80 == 0 {
        return Err(CryptoError::NoExtIv);
    }
    let key_id = (hdr[3] >> 5) & 0x03;
    let pn = u64::from_le_bytes([hdr[0], hdr[1], hdr[4], hdr[5], hdr[6], hdr[7], 0, 0]);
    Ok((pn, key_id))
}

/// Builds the 13-byte CCM nonce for a frame (spec §4.2): a priority octet
/// carrying the TID and the management flag, the frame's source address,
/// and the 48-bit packet number, most-significant byte first.
pub fn build_nonce(frame: &[u8], pn: u64) -> [u8; 13] {
    let mut nonce = [0u8; 13];
    let tid = if header::has_qos(frame) {
        header::get_tid(frame)
    } else {
        0
    };
    let management_bit = if header::is_management(frame) { 0x10 } else { 0x00 };
    nonce[0] = (tid & 0x0f) | management_bit;
    nonce[1..7].copy_from_slice(&header::addr2(frame));
    let pn_bytes = pn.to_be_bytes(); // 8 bytes, we want the low 6
    nonce[7..13].copy_from_slice(&pn_bytes[2..8]);
    nonce
}

/// Builds the Additional Authenticated Data for a frame (spec §4.2): the
/// MAC header with the mutable fields (Retry/PwrMgt/MoreData, the sequence
/// number, and all but TID/A-MSDU-present of QoS Control) masked to zero.
pub fn build_aad(frame: &[u8]) -> Vec<u8> {
    let mut aad = Vec::with_capacity(header::hdrlen(frame));

    let mut fc0 = frame[0];
    if header::is_data(frame) {
        fc0 &= 0x0f; // clear the subtype nibble on Data frames
    }
    let mut fc1 = frame[1] & !(0x08 | 0x10 | 0x20); // clear Retry, PwrMgt, MoreData
    if header::has_htc(frame) {
        fc1 &= !0x80; // Order means "+HTC present" here; clear it too
    }
    aad.push(fc0);
    aad.push(fc1);

    aad.extend_from_slice(&header::addr1(frame));
    aad.extend_from_slice(&header::addr2(frame));
    aad.extend_from_slice(&header::addr3(frame));

    let sc = header::seq_ctrl(frame);
    aad.push(sc[0] & 0x0f); // keep Fragment Number, mask Sequence Number
    aad.push(0);

    if header::has_addr4(frame) {
        aad.extend_from_slice(&header::addr4(frame));
    }

    if header::has_qos(frame) {
        let qc = header::get_qos(frame);
        let masked = qc & 0x008f; // TID (bits 0-3) and A-MSDU Present (bit 7)
        aad.extend_from_slice(&masked.to_le_bytes());
    }

    if header::has_htc(frame) {
        let off = header::hdrlen(frame) - 4;
        aad.extend_from_slice(&frame[off..off + 4]);
    }

    aad
}

fn xor_block(a: &mut [u8; 16], b: &[u8; 16]) {
    for i in 0..16 {
        a[i] ^= b[i];
    }
}

fn cbc_mac(schedule: &AesKeySchedule, blocks: &[[u8; 16]]) -> [u8; 16] {
    let mut x = [0u8; 16];
    for block in blocks {
        xor_block(&mut x, block);
        schedule.encrypt_block(&mut x);
    }
    x
}

fn b0_block(nonce: &[u8; 13], aad_present: bool, payload_len: usize) -> [u8; 16] {
    let mprime = ((M - 2) / 2) as u8; // 3 for M=8
    let lprime = (L - 1) as u8; // 1 for L=2
    let adata_bit = if aad_present { 0x40 } else { 0x00 };
    let mut b0 = [0u8; 16];
    b0[0] = adata_bit | (mprime << 3) | lprime;
    b0[1..14].copy_from_slice(nonce);
    let len_bytes = (payload_len as u16).to_be_bytes();
    b0[14..16].copy_from_slice(&len_bytes);
    b0
}

fn counter_block(nonce: &[u8; 13], counter: u16) -> [u8; 16] {
    let lprime = (L - 1) as u8;
    let mut a = [0u8; 16];
    a[0] = lprime;
    a[1..14].copy_from_slice(nonce);
    a[14..16].copy_from_slice(&counter.to_be_bytes());
    a
}

fn aad_blocks(aad: &[u8]) -> Vec<[u8; 16]> {
    if aad.is_empty() {
        return Vec::new();
    }
    let mut encoded = Vec::with_capacity(2 + aad.len());
    encoded.extend_from_slice(&(aad.len() as u16).to_be_bytes());
    encoded.extend_from_slice(aad);
    while encoded.len() % 16 != 0 {
        encoded.push(0);
    }
    encoded
        .chunks_exact(16)
        .map(|c| c.try_into().unwrap())
        .collect()
}

fn payload_blocks(data: &[u8]) -> Vec<[u8; 16]> {
    let mut padded = data.to_vec();
    while padded.len() % 16 != 0 {
        padded.push(0);
    }
    if padded.is_empty() {
        return Vec::new();
    }
    padded.chunks_exact(16).map(|c| c.try_into().unwrap()).collect()
}

/// Generic AES-CCM (M=8, L=2) encryption. Returns ciphertext the same
/// length as `plaintext` plus the 8-byte MIC.
pub fn ccm_encrypt(
    schedule: &AesKeySchedule,
    nonce: &[u8; 13],
    aad: &[u8],
    plaintext: &[u8],
) -> (Vec<u8>, [u8; 8]) {
    let mut blocks = vec![b0_block(nonce, !aad.is_empty(), plaintext.len())];
    blocks.extend(aad_blocks(aad));
    blocks.extend(payload_blocks(plaintext));
    let t = cbc_mac(schedule, &blocks);

    let mut s0 = counter_block(nonce, 0);
    schedule.encrypt_block(&mut s0);
    let mut mic = [0u8; 8];
    for i in 0..M {
        mic[i] = t[i] ^ s0[i];
    }

    let mut ciphertext = Vec::with_capacity(plaintext.len());
    for (i, chunk) in plaintext.chunks(16).enumerate() {
        let mut s = counter_block(nonce, (i + 1) as u16);
        schedule.encrypt_block(&mut s);
        for (byte, k) in chunk.iter().zip(s.iter()) {
            ciphertext.push(byte ^ k);
        }
    }
    (ciphertext, mic)
}

/// Generic AES-CCM decryption: recovers the plaintext and checks `mic`
/// against the recomputed tag in constant time. Returns `AuthFailCcmp` on
/// mismatch, leaving no partial plaintext observable to the caller.
pub fn ccm_decrypt(
    schedule: &AesKeySchedule,
    nonce: &[u8; 13],
    aad: &[u8],
    ciphertext: &[u8],
    mic: &[u8; 8],
) -> Result<Vec<u8>, CryptoError> {
    let mut plaintext = Vec::with_capacity(ciphertext.len());
    for (i, chunk) in ciphertext.chunks(16).enumerate() {
        let mut s = counter_block(nonce, (i + 1) as u16);
        schedule.encrypt_block(&mut s);
        for (byte, k) in chunk.iter().zip(s.iter()) {
            plaintext.push(byte ^ k);
        }
    }

    let mut blocks = vec![b0_block(nonce, !aad.is_empty(), plaintext.len())];
    blocks.extend(aad_blocks(aad));
    blocks.extend(payload_blocks(&plaintext));
    let t = cbc_mac(schedule, &blocks);

    let mut s0 = counter_block(nonce, 0);
    schedule.encrypt_block(&mut s0);
    let mut expect = [0u8; 8];
    for i in 0..M {
        expect[i] = t[i] ^ s0[i];
    }

    if constant_time_eq(&expect, mic) {
        Ok(plaintext)
    } else {
        Err(CryptoError::AuthFailCcmp)
    }
}

fn constant_time_eq(a: &[u8; 8], b: &[u8; 8]) -> bool {
    let mut diff = 0u8;
    for i in 0..8 {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

/// Encrypts one MPDU's plaintext body against the frame's MAC header,
/// drawing the next PN from `key` (spec §6: `ccmp_encrypt`). Returns the
/// 8-octet CCMP header, ciphertext, and MIC concatenated in wire order —
/// this is exactly what goes out after the MAC header.
pub fn encrypt_frame(
    header: &[u8],
    plaintext: &[u8],
    key: &mut Key,
) -> Result<Vec<u8>, CryptoError> {
    header::validate(header)?;
    let schedule = key.ccmp_schedule().ok_or(CryptoError::Malformed)?.clone();
    let pn = key.next_tx_pn();
    let nonce = build_nonce(header, pn);
    let aad = build_aad(header);
    let (ciphertext, mic) = ccm_encrypt(&schedule, &nonce, &aad, plaintext);

    let mut out = build_cipher_header(pn, key.index).to_vec();
    out.extend_from_slice(&ciphertext);
    out.extend_from_slice(&mic);
    Ok(out)
}

/// Decrypts one MPDU against the frame's MAC header, enforcing replay
/// protection (spec §6: `ccmp_decrypt`). `body` is the CCMP header,
/// ciphertext, and MIC concatenated exactly as `encrypt_frame` produces it;
/// the PN is read out of the header rather than taken as a parameter.
pub fn decrypt_frame(header: &[u8], body: &[u8], key: &mut Key) -> Result<Vec<u8>, CryptoError> {
    header::validate(header)?;
    if body.len() < CIPHER_HEADER_LEN + M {
        return Err(CryptoError::Malformed);
    }
    let (cipher_hdr_bytes, rest) = body.split_at(CIPHER_HEADER_LEN);
    let cipher_hdr: [u8; CIPHER_HEADER_LEN] = cipher_hdr_bytes.try_into().unwrap();
    let (pn, _key_id) = parse_cipher_header(&cipher_hdr)?;

    let split = rest.len() - M;
    let (ciphertext, mic_bytes) = rest.split_at(split);
    let mic: [u8; 8] = mic_bytes.try_into().unwrap();

    let tid = if header::has_qos(header) {
        header::get_tid(header)
    } else {
        0
    };
    let accepted = if header::is_management(header) {
        key.check_and_update_mgmt_rx_pn(pn)
    } else {
        key.check_and_update_rx_pn(tid, pn)
    };
    if !accepted {
        return Err(CryptoError::Replay);
    }

    let schedule = key.ccmp_schedule().ok_or(CryptoError::Malformed)?.clone();
    let nonce = build_nonce(header, pn);
    let aad = build_aad(header);
    ccm_decrypt(&schedule, &nonce, &aad, ciphertext, &mic)
}
