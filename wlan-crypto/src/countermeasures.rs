// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! TKIP countermeasures (spec §4.5, component C7): a second Michael MIC
//! failure within the countermeasures window escalates to a full TKIP
//! teardown. Deliberately deviates from the strict Beck-Tews reading that
//! reports every single failure upward; only the escalation itself is
//! surfaced to the collaborator traits.

use std::time::{Duration, Instant};

use wlan_crypto_hil::{Mac80211, ReasonCode, StationControl};

/// Tracks the most recent Michael MIC failure for one key's RX direction,
/// plus whether countermeasures are latched active (spec §4.5's
/// `COUNTERMEASURES_ACTIVE`).
pub struct Countermeasures {
    last_mic_failure_tick: Option<Instant>,
    last_mic_failure_tsc: Option<u64>,
    window: Duration,
    active: bool,
}

impl Countermeasures {
    pub fn new(window: Duration) -> Self {
        Countermeasures {
            last_mic_failure_tick: None,
            last_mic_failure_tsc: None,
            window,
            active: false,
        }
    }

    /// Whether countermeasures are currently latched active.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Clears a latched active state. The standard leaves what triggers
    /// this to policy outside the MIC-failure path itself (typically: the
    /// countermeasures cooldown period elapsing); this crate only exposes
    /// the hook.
    pub fn clear(&mut self) {
        self.active = false;
        self.last_mic_failure_tick = None;
        self.last_mic_failure_tsc = None;
    }

    /// Records a failure at `now`, returning whether it escalates. Once
    /// latched active, every subsequent failure is suppressed until `clear`
    /// runs (spec §4.5: countermeasures stay up until cleared, not just
    /// until the next quiet window).
    fn record_failure(&mut self, now: Instant, tsc: u64) -> bool {
        if self.active {
            return false;
        }
        let escalate = match self.last_mic_failure_tick {
            Some(prev) => now.saturating_duration_since(prev) <= self.window,
            None => false,
        };
        if escalate {
            self.active = true;
        } else {
            self.last_mic_failure_tick = Some(now);
            self.last_mic_failure_tsc = Some(tsc);
        }
        escalate
    }

    /// AP-side handling (spec §4.5): on escalation, deauthenticate and drop
    /// every TKIP station in the BSS.
    pub fn ap_mic_failure(&mut self, tsc: u64, now: Instant, mac: &mut dyn Mac80211) -> bool {
        let escalate = self.record_failure(now, tsc);
        if escalate {
            for station in mac.tkip_stations() {
                mac.send_deauth(station, ReasonCode::MIC_FAILURE);
                mac.drop_station(station);
            }
        }
        escalate
    }

    /// STA-side handling (spec §4.5): no EAPOL-Key request is sent on a
    /// lone, non-escalating failure. On escalation, two EAPOL-Key request
    /// frames go out back-to-back — the first carrying the previously
    /// recorded failure's TSC, the second the current one — followed by a
    /// deauth from the BSS and a rescan request.
    pub fn sta_mic_failure(&mut self, tsc: u64, now: Instant, sta: &mut dyn StationControl) -> bool {
        let prev_tsc = self.last_mic_failure_tsc;
        let escalate = self.record_failure(now, tsc);
        if escalate {
            if let Some(prev) = prev_tsc {
                sta.send_eapol_key_request(prev);
            }
            sta.send_eapol_key_request(tsc);
            sta.send_deauth_to_bss();
            sta.request_scan();
        }
        escalate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockAp {
        stations: Vec<u64>,
        deauthed: Vec<(u64, ReasonCode)>,
        dropped: Vec<u64>,
    }

    impl Mac80211 for MockAp {
        fn tkip_stations(&self) -> Vec<u64> {
            self.stations.clone()
        }
        fn send_deauth(&mut self, station: u64, reason: ReasonCode) {
            self.deauthed.push((station, reason));
        }
        fn drop_station(&mut self, station: u64) {
            self.dropped.push(station);
        }
    }

    #[derive(Default)]
    struct MockSta {
        key_requests: Vec<u64>,
        deauth_to_bss: u32,
        scans_requested: u32,
    }

    impl StationControl for MockSta {
        fn send_eapol_key_request(&mut self, tsc: u64) {
            self.key_requests.push(tsc);
        }
        fn send_deauth_to_bss(&mut self) {
            self.deauth_to_bss += 1;
        }
        fn request_scan(&mut self) {
            self.scans_requested += 1;
        }
    }

    #[test]
    fn single_failure_does_not_escalate() {
        let mut cm = Countermeasures::new(Duration::from_secs(60));
        let mut ap = MockAp {
            stations: vec![1, 2],
            deauthed: vec![],
            dropped: vec![],
        };
        let escalated = cm.ap_mic_failure(1, Instant::now(), &mut ap);
        assert!(!escalated);
        assert!(ap.deauthed.is_empty());
        assert!(ap.dropped.is_empty());
    }

    #[test]
    fn second_failure_within_window_tears_down_ap() {
        let mut cm = Countermeasures::new(Duration::from_secs(60));
        let mut ap = MockAp {
            stations: vec![1, 2],
            deauthed: vec![],
            dropped: vec![],
        };
        let t0 = Instant::now();
        assert!(!cm.ap_mic_failure(1, t0, &mut ap));
        assert!(cm.ap_mic_failure(2, t0 + Duration::from_secs(30), &mut ap));
        assert_eq!(ap.dropped, vec![1, 2]);
        assert_eq!(ap.deauthed.len(), 2);
        assert!(ap.deauthed.iter().all(|(_, r)| *r == ReasonCode::MIC_FAILURE));
    }

    #[test]
    fn second_failure_outside_window_resets_instead_of_escalating() {
        let mut cm = Countermeasures::new(Duration::from_secs(60));
        let mut ap = MockAp {
            stations: vec![1],
            deauthed: vec![],
            dropped: vec![],
        };
        let t0 = Instant::now();
        assert!(!cm.ap_mic_failure(1, t0, &mut ap));
        assert!(!cm.ap_mic_failure(2, t0 + Duration::from_secs(90), &mut ap));
        assert!(ap.dropped.is_empty());
    }

    #[test]
    fn sta_sends_no_eapol_on_first_failure_and_two_back_to_back_on_escalation() {
        let mut cm = Countermeasures::new(Duration::from_secs(60));
        let mut sta = MockSta::default();
        let t0 = Instant::now();
        assert!(!cm.sta_mic_failure(100, t0, &mut sta));
        assert!(sta.key_requests.is_empty());
        assert_eq!(sta.deauth_to_bss, 0);

        assert!(cm.sta_mic_failure(101, t0 + Duration::from_secs(1), &mut sta));
        assert_eq!(sta.key_requests, vec![100, 101]);
        assert_eq!(sta.deauth_to_bss, 1);
        assert_eq!(sta.scans_requested, 1);
    }

    #[test]
    fn escalation_latches_permanently_until_cleared() {
        let mut cm = Countermeasures::new(Duration::from_secs(60));
        let mut sta = MockSta::default();
        let t0 = Instant::now();
        cm.sta_mic_failure(1, t0, &mut sta);
        assert!(cm.sta_mic_failure(2, t0 + Duration::from_secs(1), &mut sta));
        assert!(cm.is_active());

        // once latched, every further failure is suppressed regardless of timing
        assert!(!cm.sta_mic_failure(3, t0 + Duration::from_secs(2), &mut sta));
        assert!(!cm.sta_mic_failure(4, t0 + Duration::from_secs(200), &mut sta));
        assert_eq!(sta.key_requests, vec![1, 2]);

        cm.clear();
        assert!(!cm.is_active());
        assert!(!cm.sta_mic_failure(5, t0 + Duration::from_secs(300), &mut sta));
    }

    #[test]
    fn ap_escalation_latches_permanently_until_cleared() {
        let mut cm = Countermeasures::new(Duration::from_secs(60));
        let mut ap = MockAp {
            stations: vec![1],
            deauthed: vec![],
            dropped: vec![],
        };
        let t0 = Instant::now();
        cm.ap_mic_failure(1, t0, &mut ap);
        assert!(cm.ap_mic_failure(2, t0 + Duration::from_secs(1), &mut ap));
        assert!(cm.is_active());

        assert!(!cm.ap_mic_failure(3, t0 + Duration::from_secs(2), &mut ap));
        assert_eq!(ap.dropped, vec![1]); // no second teardown while latched

        cm.clear();
        assert!(!cm.ap_mic_failure(4, t0 + Duration::from_secs(3), &mut ap));
    }
}
