// SPDX-FileCopyrightText: 2026 Fleetbook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Controllable auth provider for unit tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use fleetbook_core::{AuthProvider, UserProfile};

/// Auth provider whose current user can be set and cleared by the test.
#[derive(Default)]
pub struct MockAuthProvider {
    user: Mutex<Option<UserProfile>>,
}

impl MockAuthProvider {
    /// Starts signed out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts signed in with a complete profile.
    pub fn signed_in(id: &str) -> Self {
        let provider = Self::default();
        let user = UserProfile {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            full_name: Some("Test User".to_string()),
        };
        *provider.user.try_lock().expect("fresh mutex") = Some(user);
        provider
    }

    pub async fn set_user(&self, user: Option<UserProfile>) {
        *self.user.lock().await = user;
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn current_user(&self) -> Option<UserProfile> {
        self.user.lock().await.clone()
    }
}
