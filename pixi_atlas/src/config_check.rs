// SPDX-License-Identifier: Apache-2.0

//! Compile-time configuration validation
//!
//! This module contains compile-time checks to ensure that mutually exclusive
//! features are not enabled simultaneously.

// If none were selected that's an error
#[cfg(not(any(feature = "int-wrap", feature = "int-range-error")))]
compile_error!(
    "No integer behavior feature selected: choose one of 'int-wrap' or 'int-range-error'"
);

#[cfg(all(feature = "int-wrap", feature = "int-range-error"))]
compile_error!(
    "Cannot enable both 'int-wrap' and 'int-range-error' features simultaneously: choose one integer behavior"
);
