// THEORY:
// This file is the main entry point for the `pursuit_replay` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API that will be exposed to external consumers (like the
// `replay_viewer` binary).
//
// The crate reconstructs and animates recorded pursuit-evasion studies: a
// decoded `StudyRecord` flows through geometry resolution, belief-surface
// interpolation and tip-region estimation into the frame builder, and an
// animation driver walks a frame index to feed finished frames to whichever
// output sink the caller selected. The `pipeline` module is the high-level
// interface; the internal derivation stages live in `core_modules`.

pub mod core_modules;
pub mod error;
pub mod pipeline;
