// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules over the shared database handle.

pub mod intent;
pub mod outbox;
