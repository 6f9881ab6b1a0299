//! Push registration tokens handed over by the messaging host.

use std::sync::RwLock;

/// Latest registration token, as set by the last successful registration.
pub trait TokenStore: Send + Sync {
    fn current(&self) -> Option<String>;
    fn set(&self, token: String);
}

/// Process-local [`TokenStore`]. Nothing is persisted.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl TokenStore for InMemoryTokenStore {
    fn current(&self) -> Option<String> {
        match self.token.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn set(&self, token: String) {
        match self.token.write() {
            Ok(mut guard) => *guard = Some(token),
            Err(poisoned) => *poisoned.into_inner() = Some(token),
        }
    }
}

/// Records a registration token. Missing or blank tokens leave the store untouched.
pub fn record_registration_token(store: &dyn TokenStore, token: Option<String>) -> bool {
    match token.filter(|token| !token.trim().is_empty()) {
        Some(token) => {
            log::info!("Registration token refreshed");
            log::debug!("Registration token: {token}");
            store.set(token);
            true
        }
        None => {
            log::warn!("Registration delivered no token");
            false
        }
    }
}

/// Renders raw device token bytes as lowercase hex.
pub fn format_device_token(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tokens_keep_the_previous_value() {
        let store = InMemoryTokenStore::default();
        assert!(record_registration_token(&store, Some("fcm-1".into())));
        assert!(!record_registration_token(&store, Some("  ".into())));
        assert!(!record_registration_token(&store, None));
        assert_eq!(store.current().as_deref(), Some("fcm-1"));
    }

    #[test]
    fn device_token_is_lowercase_hex() {
        assert_eq!(format_device_token(&[0x00, 0xab, 0x0f, 0xff]), "00ab0fff");
        assert_eq!(format_device_token(&[]), "");
    }
}
