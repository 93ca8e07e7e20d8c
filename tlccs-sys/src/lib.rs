//! Raw FFI bindings for the Thorlabs TLCCS VISA instrument driver.
//!
//! Bindings are generated by `bindgen` from the installed vendor header when the
//! `tlccs-driver` feature is enabled. The driver library itself is proprietary and
//! must be installed separately; see `build.rs` for the lookup rules.
//!
//! All functions return a `ViStatus`; zero is success, anything else is a failure
//! code. Safe wrappers live in the `ccs100` crate.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(missing_docs)]

include!(concat!(env!("OUT_DIR"), "/bindings.rs"));
