// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! End-to-end coverage of the testable properties in spec §8: CCMP and
//! TKIP round trips driven entirely through the crate's public API, plus
//! the cross-cutting replay, countermeasures, and segmented-buffer
//! behaviors that don't belong to any single module's unit tests.

use std::time::{Duration, Instant};

use wlan_crypto::{
    ccmp_decrypt, ccmp_encrypt, tkip_decrypt, tkip_encrypt, Countermeasures, DefaultAllocator,
    FailAfter, FrameChain, Key, KeyRole, RateLimiter, TkipCache,
};
use wlan_crypto_hil::{Mac80211, ReasonCode, StationControl};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn qos_data_frame(tid: u8, addr2: [u8; 6]) -> Vec<u8> {
    let mut h = vec![0u8; 24 + 2];
    h[0] = 0b1000_1000; // QoS Data
    h[10..16].copy_from_slice(&addr2);
    h[24..26].copy_from_slice(&(tid as u16).to_le_bytes());
    h
}

#[test]
fn ccmp_decrypts_exactly_what_was_encrypted() {
    init_logging();
    let mut tx = Key::new_ccmp(0, KeyRole::Pairwise, &[0x3c; 16]);
    let mut rx = Key::new_ccmp(0, KeyRole::Pairwise, &[0x3c; 16]);
    let mut limiter = RateLimiter::new(5, 1);
    let frame = qos_data_frame(4, [1, 2, 3, 4, 5, 6]);

    for msg in [&b"first"[..], &b"second, a little longer"[..], &[][..]] {
        let body = ccmp_encrypt(&frame, msg, &mut tx).unwrap();
        let pt = ccmp_decrypt(&frame, &body, &mut rx, &mut limiter).unwrap();
        assert_eq!(pt, msg);
    }
}

#[test]
fn ccmp_rejects_frames_replayed_or_delivered_out_of_order() {
    let mut tx = Key::new_ccmp(0, KeyRole::Pairwise, &[0x44; 16]);
    let mut rx = Key::new_ccmp(0, KeyRole::Pairwise, &[0x44; 16]);
    let mut limiter = RateLimiter::new(5, 1);
    let frame = qos_data_frame(0, [9, 9, 9, 9, 9, 9]);

    let body1 = ccmp_encrypt(&frame, b"one", &mut tx).unwrap();
    let body2 = ccmp_encrypt(&frame, b"two", &mut tx).unwrap();

    assert!(ccmp_decrypt(&frame, &body2, &mut rx, &mut limiter).is_some());
    // body1's PN is already superseded: must be rejected as a replay/reorder.
    assert!(ccmp_decrypt(&frame, &body1, &mut rx, &mut limiter).is_none());
}

#[test]
fn tkip_decrypts_exactly_what_was_encrypted_across_an_iv32_rollover() {
    let tk = [0x5c; 16];
    let mut tx = Key::new_tkip(0, KeyRole::Group, [0x11; 8], [0x22; 8]);
    let mut rx = Key::new_tkip(0, KeyRole::Group, [0x11; 8], [0x22; 8]);
    let mut tx_cache = TkipCache::default();
    let mut rx_cache = TkipCache::default();
    let mut limiter = RateLimiter::new(5, 1);
    let frame = qos_data_frame(2, [7, 7, 7, 7, 7, 7]);

    // Drive the TSC across an IV16 rollover into IV32+1 to exercise the
    // Phase1 cache invalidation path end to end.
    for i in 0u32..3 {
        let msg = format!("frame {i}");
        let body = tkip_encrypt(&frame, msg.as_bytes(), &tk, &mut tx, &mut tx_cache).unwrap();
        let pt = tkip_decrypt(&frame, &body, &tk, &mut rx, &mut rx_cache, &mut limiter).unwrap();
        assert_eq!(pt, msg.as_bytes());
    }
}

/// Recovers the TSC from the wire-format TKIP header prefixing `body`. The
/// header is not itself encrypted, so an embedding driver that wants the
/// TSC of a frame `tkip_decrypt` rejected (it returns `None`, not the TSC)
/// reads it straight off the wire the same way this test does.
fn tsc_from_tkip_body(body: &[u8]) -> u64 {
    u64::from_le_bytes([body[2], body[0], body[4], body[5], body[6], body[7], 0, 0])
}

#[test]
fn tkip_mic_failure_feeds_countermeasures_to_escalation() {
    let tk = [0x77; 16];
    let mut tx = Key::new_tkip(0, KeyRole::Pairwise, [1; 8], [2; 8]);
    // RX holds the wrong Michael key, so every frame fails the MIC check.
    let mut rx = Key::new_tkip(0, KeyRole::Pairwise, [1; 8], [0xff; 8]);
    let mut tx_cache = TkipCache::default();
    let mut rx_cache = TkipCache::default();
    let mut limiter = RateLimiter::new(5, 1);
    let frame = qos_data_frame(0, [3, 3, 3, 3, 3, 3]);

    struct Ap {
        stations: Vec<u64>,
        torn_down: Vec<u64>,
    }
    impl Mac80211 for Ap {
        fn tkip_stations(&self) -> Vec<u64> {
            self.stations.clone()
        }
        fn send_deauth(&mut self, _station: u64, _reason: ReasonCode) {}
        fn drop_station(&mut self, station: u64) {
            self.torn_down.push(station);
        }
    }

    let mut cm = Countermeasures::new(Duration::from_secs(60));
    let mut ap = Ap {
        stations: vec![42],
        torn_down: vec![],
    };
    let now = Instant::now();

    let body1 = tkip_encrypt(&frame, b"payload a", &tk, &mut tx, &mut tx_cache).unwrap();
    let tsc1 = tsc_from_tkip_body(&body1);
    assert!(tkip_decrypt(&frame, &body1, &tk, &mut rx, &mut rx_cache, &mut limiter).is_none());
    assert!(!cm.ap_mic_failure(tsc1, now, &mut ap));

    let body2 = tkip_encrypt(&frame, b"payload b", &tk, &mut tx, &mut tx_cache).unwrap();
    let tsc2 = tsc_from_tkip_body(&body2);
    assert!(tkip_decrypt(&frame, &body2, &tk, &mut rx, &mut rx_cache, &mut limiter).is_none());
    assert!(cm.ap_mic_failure(tsc2, now + Duration::from_secs(10), &mut ap));
    assert_eq!(ap.torn_down, vec![42]);
}

#[test]
fn sta_side_countermeasures_requests_a_key_and_then_rescans() {
    struct Sta {
        requests: Vec<u64>,
        rescanned: bool,
    }
    impl StationControl for Sta {
        fn send_eapol_key_request(&mut self, tsc: u64) {
            self.requests.push(tsc);
        }
        fn send_deauth_to_bss(&mut self) {}
        fn request_scan(&mut self) {
            self.rescanned = true;
        }
    }

    let mut cm = Countermeasures::new(Duration::from_secs(60));
    let mut sta = Sta {
        requests: vec![],
        rescanned: false,
    };
    let now = Instant::now();
    assert!(!cm.sta_mic_failure(10, now, &mut sta));
    assert!(!sta.rescanned);
    assert!(cm.sta_mic_failure(11, now + Duration::from_secs(5), &mut sta));
    assert!(sta.rescanned);
    assert_eq!(sta.requests, vec![10, 11]);
}

#[test]
fn segmented_buffer_round_trips_at_arbitrary_boundaries() {
    let data: Vec<u8> = (0u8..=255).cycle().take(300).collect();
    let chain = FrameChain::split_at_bytes(&data, &[7, 39, 128, 200]);
    assert_eq!(chain.to_contiguous(), data);

    let mut alloc = DefaultAllocator;
    let reshaped = FrameChain::reshape(&data, &chain.segment_shape(), &mut alloc).unwrap();
    assert_eq!(reshaped.to_contiguous(), data);
}

#[test]
fn segmented_buffer_reports_allocation_exhaustion() {
    let data = vec![0xAB; 64];
    let mut alloc = FailAfter { remaining: 1 };
    assert!(FrameChain::reshape(&data, &[16, 16, 16, 16], &mut alloc).is_none());
}
