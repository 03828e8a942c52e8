// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! Trait contracts consumed by `wlan-crypto`.
//!
//! This crate plays the role the teacher's `kernel` crate plays for its
//! capsules: it names the seams a concrete cipher engine is built against,
//! without pulling in any of the engine logic itself. Everything here is
//! "external" per the scope of the crypto core: MAC framing, association
//! state, node tables, and EAPOL key exchange all live on the other side of
//! these traits and are never implemented in this workspace.

#![forbid(unsafe_code)]

/// An 802.11 station, identified the way the embedding driver's node table
/// identifies it. Opaque to this crate; stations are only ever handed back
/// to the collaborator traits below.
pub type StationId = u64;

/// Reason code carried in a deauthentication frame. Only the value this
/// crate needs (`MIC_FAILURE`, IEEE 802.11-2007 Table 7-22, value 14) is
/// named; a real MAC stack has many more and is free to use its own type
/// at the call site by constructing one of these from its own table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReasonCode(pub u16);

impl ReasonCode {
    /// IEEE 802.11-2007 Table 7-22: "Michael MIC failure".
    pub const MIC_FAILURE: ReasonCode = ReasonCode(14);
}

/// Access-point-side collaborator invoked by the TKIP countermeasures state
/// machine (spec §4.5) when two Michael MIC failures land within the
/// countermeasures window. Implemented by the embedding MAC/association
/// layer; this crate never manages a node table itself.
pub trait Mac80211 {
    /// All currently associated stations using a TKIP pairwise or group
    /// cipher. Only those are subject to the countermeasures teardown.
    fn tkip_stations(&self) -> Vec<StationId>;

    /// Send a deauthentication management frame to `station` with the given
    /// reason code.
    fn send_deauth(&mut self, station: StationId, reason: ReasonCode);

    /// Remove `station` from the node table.
    fn drop_station(&mut self, station: StationId);
}

/// Station-side collaborator invoked by the TKIP countermeasures state
/// machine in STA mode.
pub trait StationControl {
    /// Send an EAPOL-Key request frame carrying the given TSC as the replay
    /// counter, so the supplicant/authenticator state machine on the other
    /// end can correlate it with the failure that triggered it.
    fn send_eapol_key_request(&mut self, tsc: u64);

    /// Send a deauthentication frame to the current BSS.
    fn send_deauth_to_bss(&mut self);

    /// Ask the station state machine to transition back to scanning.
    fn request_scan(&mut self);
}
