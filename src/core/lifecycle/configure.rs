//! Configuration adjustment
//!
//! serd is a C library, so the C++ sub-settings of the compiler carry no
//! meaning for it. Dropping them keeps builds that differ only in those
//! fields under the same package id.

use crate::core::settings::Settings;

/// Remove `compiler.libcxx` and `compiler.cppstd`. Idempotent.
pub fn configure(settings: &mut Settings) {
    settings.compiler.libcxx = None;
    settings.compiler.cppstd = None;
}
