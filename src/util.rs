//! Shared utility modules used across atlas components.

pub mod simd;
