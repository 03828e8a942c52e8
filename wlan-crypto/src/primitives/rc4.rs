// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2026 the project contributors.

//! RC4 stream cipher, used by TKIP with the per-frame Phase1/Phase2 derived
//! key (spec §4.3/§4.4). No actively maintained RustCrypto crate covers the
//! plain RC4 KSA/PRGA TKIP needs, so it is implemented directly here; the
//! algorithm is fixed by the standard and this is treated as an oracle by
//! everything above it, exactly like the AES block cipher.

pub struct Rc4 {
    s: [u8; 256],
    i: u8,
    j: u8,
}

impl Rc4 {
    /// Key-scheduling algorithm.
    pub fn new(key: &[u8]) -> Self {
        let mut s = [0u8; 256];
        for (idx, b) in s.iter_mut().enumerate() {
            *b = idx as u8;
        }
        let mut j: u8 = 0;
        for i in 0..256usize {
            j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
            s.swap(i, j as usize);
        }
        Rc4 { s, i: 0, j: 0 }
    }

    /// Pseudo-random generation algorithm: XORs the keystream into `data`
    /// in place, continuing the running stream state across calls.
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        for byte in data.iter_mut() {
            self.i = self.i.wrapping_add(1);
            self.j = self.j.wrapping_add(self.s[self.i as usize]);
            self.s.swap(self.i as usize, self.j as usize);
            let k = self.s[(self.s[self.i as usize].wrapping_add(self.s[self.j as usize])) as usize];
            *byte ^= k;
        }
    }
}
