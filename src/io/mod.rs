//! Plain-text exports of trajectories and stored results.

pub mod csv;
pub mod json;
