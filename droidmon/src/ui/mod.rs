//! UI module root: exposes drawing functions for individual panels.

pub mod cards;
pub mod chart;
pub mod cpu;
pub mod footer;
pub mod gpu;
pub mod header;
pub mod notice;
pub mod theme;
pub mod util;
