// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! 802.11 header inspection (spec §4.1, component C3).
//!
//! Operates on the raw MAC header bytes of a frame (Frame Control through
//! the end of the address/sequence/QoS/HTC fields). Callers hand in
//! `FrameChain::to_contiguous()`'s prefix; this module never needs more
//! than the first 30 bytes.

use crate::error::CryptoError;

pub const FC_TYPE_MGMT: u8 = 0b00;
pub const FC_TYPE_CTRL: u8 = 0b01;
pub const FC_TYPE_DATA: u8 = 0b10;

const BASE_HDR_LEN: usize = 24; // FC(2) + Duration(2) + Addr1/2/3(6 each) + SeqCtrl(2)
const ADDR4_LEN: usize = 6;
const QOS_LEN: usize = 2;
const HTC_LEN: usize = 4;

/// Frame Control field's `Type` subfield (bits 2..3 of octet 0).
pub fn frame_type(frame: &[u8]) -> u8 {
    (frame[0] >> 2) & 0x3
}

/// Frame Control field's `Subtype` subfield (bits 4..7 of octet 0).
pub fn frame_subtype(frame: &[u8]) -> u8 {
    (frame[0] >> 4) & 0xF
}

pub fn is_management(frame: &[u8]) -> bool {
    frame_type(frame) == FC_TYPE_MGMT
}

pub fn is_data(frame: &[u8]) -> bool {
    frame_type(frame) == FC_TYPE_DATA
}

/// QoS Data subtypes have bit 3 of the subtype nibble set
/// (subtypes 0x8..0xF of the Data frame type).
pub fn has_qos(frame: &[u8]) -> bool {
    is_data(frame) && (frame_subtype(frame) & 0x8) != 0
}

/// `ToDS` and `FromDS` are bits 0 and 1 of octet 1; both set means a
/// four-address (WDS) frame.
pub fn has_addr4(frame: &[u8]) -> bool {
    (frame[1] & 0x03) == 0x03
}

/// The `Order` bit (bit 7 of octet 1) means "+HTC present" on QoS Data and
/// Management frames (802.11-2012 §8.2.4.1.10); on non-QoS Data frames the
/// same bit instead means "strictly ordered" and carries no HTC field.
pub fn has_htc(frame: &[u8]) -> bool {
    let order = (frame[1] & 0x80) != 0;
    order && (has_qos(frame) || is_management(frame))
}

/// Offset of the QoS Control field within the header, or `None` if absent.
fn qos_offset(frame: &[u8]) -> Option<usize> {
    if !has_qos(frame) {
        return None;
    }
    Some(BASE_HDR_LEN + if has_addr4(frame) { ADDR4_LEN } else { 0 })
}

/// Total MAC header length in bytes, per spec §4.1: base 24 bytes, plus a
/// fourth address, plus QoS Control, plus HT Control, as applicable.
pub fn hdrlen(frame: &[u8]) -> usize {
    let mut len = BASE_HDR_LEN;
    if has_addr4(frame) {
        len += ADDR4_LEN;
    }
    if has_qos(frame) {
        len += QOS_LEN;
    }
    if has_htc(frame) {
        len += HTC_LEN;
    }
    len
}

/// The raw 16-bit QoS Control field, or 0 if the frame carries none.
pub fn get_qos(frame: &[u8]) -> u16 {
    match qos_offset(frame) {
        Some(off) => u16::from_le_bytes([frame[off], frame[off + 1]]),
        None => 0,
    }
}

/// Traffic Identifier: the low 4 bits of QoS Control, or 0 absent QoS.
pub fn get_tid(frame: &[u8]) -> u8 {
    (get_qos(frame) & 0x0F) as u8
}

pub fn addr1(frame: &[u8]) -> [u8; 6] {
    frame[4..10].try_into().unwrap()
}

pub fn addr2(frame: &[u8]) -> [u8; 6] {
    frame[10..16].try_into().unwrap()
}

pub fn addr3(frame: &[u8]) -> [u8; 6] {
    frame[16..22].try_into().unwrap()
}

pub fn addr4(frame: &[u8]) -> [u8; 6] {
    frame[24..30].try_into().unwrap()
}

pub fn seq_ctrl(frame: &[u8]) -> [u8; 2] {
    frame[22..24].try_into().unwrap()
}

/// ToDS bit (octet 1, bit 0).
pub fn to_ds(frame: &[u8]) -> bool {
    (frame[1] & 0x01) != 0
}

/// FromDS bit (octet 1, bit 1).
pub fn from_ds(frame: &[u8]) -> bool {
    (frame[1] & 0x02) != 0
}

/// Confirms `frame` is long enough to hold the header its own Frame
/// Control/QoS/HTC bits claim, before any fixed-offset accessor below reads
/// into it. Callers must run this first; `addr1`/`addr4`/`seq_ctrl` and the
/// AAD/nonce/pseudo-header builders built on top of them panic on a frame
/// shorter than the offset they index.
pub fn validate(frame: &[u8]) -> Result<usize, CryptoError> {
    if frame.len() < 2 {
        return Err(CryptoError::Malformed);
    }
    let len = hdrlen(frame);
    if frame.len() < len {
        return Err(CryptoError::Malformed);
    }
    Ok(len)
}

/// Resolves the MSDU's destination and source addresses from the
/// ToDS/FromDS combination (802.11-2007 Table 8-19), used to build
/// TKIP's Michael MIC pseudo-header (spec §4.4).
pub fn da_sa(frame: &[u8]) -> ([u8; 6], [u8; 6]) {
    match (to_ds(frame), from_ds(frame)) {
        (false, false) => (addr1(frame), addr2(frame)), // NODS (IBSS)
        (false, true) => (addr1(frame), addr3(frame)),  // FROMDS (AP -> STA)
        (true, false) => (addr3(frame), addr2(frame)),  // TODS (STA -> AP)
        (true, true) => (addr3(frame), addr4(frame)),   // DSTODS (WDS)
    }
}
