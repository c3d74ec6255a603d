//! Progress reporting while a turn runs

pub mod reporter;
