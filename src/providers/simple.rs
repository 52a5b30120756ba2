//! Fixed username/password table.
//!
//! `provider=simple,bob=secret,alice=other` declares two users. The `name`
//! key labels the backend and is not a user.

use std::collections::HashMap;

use subtle::ConstantTimeEq;

use crate::auth::UserInfo;
use crate::config::BackendOption;
use crate::providers::{Authenticator, ProviderError};

pub const PROVIDER_NAME: &str = "simple";

const LABEL_KEY: &str = "name";

#[derive(Clone)]
pub struct SimpleBackend {
    users: HashMap<String, String>,
}

impl SimpleBackend {
    pub fn new(users: HashMap<String, String>) -> Result<Self, ProviderError> {
        if users.is_empty() {
            return Err(ProviderError::InvalidOptions {
                provider: PROVIDER_NAME.to_string(),
                reason: "no users declared".to_string(),
            });
        }
        Ok(Self { users })
    }

    /// [`ProviderFactory`](crate::providers::ProviderFactory) for `simple`.
    pub fn from_options(option: &BackendOption) -> Result<Box<dyn Authenticator>, ProviderError> {
        let users = option
            .params()
            .filter(|(key, _)| *key != LABEL_KEY)
            .map(|(user, password)| (user.to_string(), password.to_string()))
            .collect();
        Ok(Box::new(Self::new(users)?))
    }
}

impl Authenticator for SimpleBackend {
    fn provider(&self) -> &str {
        PROVIDER_NAME
    }

    fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserInfo>, ProviderError> {
        let Some(expected) = self.users.get(username) else {
            return Ok(None);
        };
        if bool::from(expected.as_bytes().ct_eq(password.as_bytes())) {
            Ok(Some(UserInfo::new(username, 0).with_origin(PROVIDER_NAME)))
        } else {
            Ok(None)
        }
    }
}
