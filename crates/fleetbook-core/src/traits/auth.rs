// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam to the external authentication provider.

use async_trait::async_trait;

use crate::types::UserProfile;

/// Read-only view of the current authentication state.
///
/// The provider itself (sign-in flow, token refresh) is an external
/// collaborator; the pipeline only needs to know who, if anyone, is
/// signed in right now.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The currently signed-in user, or `None` when signed out.
    async fn current_user(&self) -> Option<UserProfile>;
}
