//! Domain logic with no OS dependencies.
//!
//! - **`dedup`** – The fixed 32-slot recency window deciding whether a
//!   message id is a first-seen transmission.
//! - **`buttons`** – The static bit-to-button table and the 9-event batch
//!   (eight button states plus a trailing sync marker) built from a mask.

pub mod buttons;
pub mod dedup;
