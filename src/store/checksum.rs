// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Cheap rolling hash used to tell payload versions apart.
//!
//! This is a 31-multiplier string hash over the UTF-16 code units of the
//! serialized payload, wrapped to 32 bits. It exists for change detection and
//! debugging output. It is NOT collision resistant and gives no integrity or
//! security guarantee; two different payloads can share a checksum.

/// Hash `serialized` and render it as 8 lowercase hex digits.
pub fn checksum(serialized: &str) -> String {
    let hash = serialized
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(unit as i32)
        });
    format!("{:08x}", hash as u32)
}
