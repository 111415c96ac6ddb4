//! Package metadata generated by the build script from `Cargo.toml`.

include!(concat!(env!("OUT_DIR"), "/pkg_info.rs"));
