// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Sealtrack Maintainers
//
// Sealtrack Directory — the technician roster.  A separate concern from
// the seal registry: its own SQLite database, referenced from the seal
// side by technician code only.

pub mod credentials;
pub mod directory;

pub use directory::{ImportReport, NewTechnician, TechnicianDirectory};
