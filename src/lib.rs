//! Local support-ticket desk.
//!
//! [`ops::store::TicketStore`] holds the tickets and persists them through a
//! [`io::slots::SlotStore`] after every change; [`ops::filter`] narrows and
//! orders them for display; the `td` binary in `cli` drives both.

pub mod cli;
pub mod io;
pub mod model;
pub mod ops;
