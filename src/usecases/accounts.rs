use std::sync::Arc;

use crate::auth::password::MAX_PASSWORD_BYTES;
use crate::auth::{PasswordHasher, TokenService};
use crate::error::AppError;
use crate::models::{Account, NewAccount, Role};
use crate::store::{AccountStore, StoreError};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account: Account,
}

/// Registration, login and promotion rules over the account store.
pub struct AccountUseCase {
    store: Arc<dyn AccountStore>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
}

impl AccountUseCase {
    pub fn new(
        store: Arc<dyn AccountStore>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            store,
            hasher,
            tokens,
        }
    }

    /// Creates an account for `username`.
    ///
    /// Uniqueness and the first-account-is-admin decision are settled before
    /// any hashing, so a taken username always fails with `UsernameTaken` and
    /// costs no bcrypt work.
    ///
    /// Two concurrent first registrations against an empty store can both
    /// observe a zero count and both become `Admin`. Duplicate usernames are
    /// still prevented by the store.
    ///
    /// # Errors
    /// * `Validation` - empty username, or a password longer than `MAX_PASSWORD_BYTES`
    /// * `UsernameTaken` - the username exists (or lost a race to a concurrent registration)
    /// * `HashingFailed` - the hasher failed
    /// * `Persistence` - the store failed
    pub async fn register(&self, username: &str, password: &str) -> Result<Account, AppError> {
        if username.is_empty() {
            return Err(AppError::Validation("username must not be empty".into()));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::Validation(format!(
                "password must be at most {MAX_PASSWORD_BYTES} bytes"
            )));
        }

        if self.store.count_by_username(username).await? > 0 {
            return Err(AppError::UsernameTaken);
        }

        let role = if self.store.count_all().await? == 0 {
            Role::Admin
        } else {
            Role::User
        };

        let password_hash = self.hasher.hash(password)?;

        let account = self
            .store
            .create(NewAccount {
                username: username.to_string(),
                password_hash,
                role,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict => AppError::UsernameTaken,
                other => other.into(),
            })?;

        log::info!(
            "registered account {} ({}) with role {}",
            account.id,
            account.username,
            account.role
        );
        Ok(account)
    }

    /// Checks credentials and issues a token for the account.
    ///
    /// An unknown username and a wrong password both fail with the same
    /// `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AppError> {
        let account = match self.store.find_by_username(username).await? {
            Some(account) => account,
            None => {
                // Spend the same hashing time as a real comparison.
                self.hasher.verify("", password);
                log::warn!("rejected login attempt");
                return Err(AppError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(&account.password_hash, password) {
            log::warn!("rejected login attempt");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.tokens.issue(&account.id.to_string(), account.role)?;
        log::info!("account {} logged in", account.id);

        Ok(Session { token, account })
    }

    /// Grants `Admin` to the account with identifier `user_id`.
    ///
    /// Existence and identifier validation are the store's business; an
    /// unknown or malformed id surfaces as the store's `NotFound`.
    pub async fn promote_user(&self, user_id: &str) -> Result<(), AppError> {
        self.store.set_role(user_id, Role::Admin).await?;
        log::info!("account {} promoted to {}", user_id, Role::Admin);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::MockPasswordHasher;
    use crate::auth::token::{MockTokenService, TokenError};
    use crate::store::MockAccountStore;
    use chrono::Utc;
    use mockall::Sequence;
    use uuid::Uuid;

    const HASHED: &str = "hashed123123123";

    fn account(username: &str, role: Role) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: HASHED.to_string(),
            role,
            created_at: Utc::now(),
        }
    }

    fn use_case(
        store: MockAccountStore,
        hasher: MockPasswordHasher,
        tokens: MockTokenService,
    ) -> AccountUseCase {
        AccountUseCase::new(Arc::new(store), Arc::new(hasher), Arc::new(tokens))
    }

    fn expect_create(store: &mut MockAccountStore, expected_role: Role) {
        store
            .expect_create()
            .withf(move |new| {
                new.username == "tsige" && new.password_hash == HASHED && new.role == expected_role
            })
            .times(1)
            .returning(|new| Ok(new.into_account(Uuid::new_v4())));
    }

    #[actix_rt::test]
    async fn test_first_registration_becomes_admin() {
        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();
        let mut seq = Sequence::new();

        store
            .expect_count_by_username()
            .withf(|name| name == "tsige")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(0));
        store
            .expect_count_all()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(0));
        hasher
            .expect_hash()
            .withf(|p| p == "123123123")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(HASHED.to_string()));
        expect_create(&mut store, Role::Admin);

        let created = use_case(store, hasher, MockTokenService::new())
            .register("tsige", "123123123")
            .await
            .unwrap();

        assert_eq!(created.username, "tsige");
        assert_eq!(created.password_hash, HASHED);
        assert_eq!(created.role, Role::Admin);
    }

    #[actix_rt::test]
    async fn test_later_registration_is_user() {
        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();

        store.expect_count_by_username().returning(|_| Ok(0));
        store.expect_count_all().returning(|| Ok(3));
        hasher.expect_hash().returning(|_| Ok(HASHED.to_string()));
        expect_create(&mut store, Role::User);

        let created = use_case(store, hasher, MockTokenService::new())
            .register("tsige", "123123123")
            .await
            .unwrap();
        assert_eq!(created.role, Role::User);
    }

    #[actix_rt::test]
    async fn test_taken_username_skips_hashing_and_write() {
        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();

        store.expect_count_by_username().returning(|_| Ok(1));
        store.expect_count_all().never();
        store.expect_create().never();
        hasher.expect_hash().never();

        let result = use_case(store, hasher, MockTokenService::new())
            .register("tsige", "123123123")
            .await;
        assert!(matches!(result, Err(AppError::UsernameTaken)));
    }

    #[actix_rt::test]
    async fn test_invalid_registration_never_reaches_store() {
        let too_long = "p".repeat(MAX_PASSWORD_BYTES + 1);
        for (username, password) in [("", "123123123"), ("tsige", too_long.as_str())] {
            let mut store = MockAccountStore::new();
            let mut hasher = MockPasswordHasher::new();
            store.expect_count_by_username().never();
            store.expect_count_all().never();
            store.expect_create().never();
            hasher.expect_hash().never();

            let result = use_case(store, hasher, MockTokenService::new())
                .register(username, password)
                .await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{username:?}");
        }
    }

    #[actix_rt::test]
    async fn test_hashing_failure_prevents_write() {
        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();

        store.expect_count_by_username().returning(|_| Ok(0));
        store.expect_count_all().returning(|| Ok(0));
        store.expect_create().never();
        hasher
            .expect_hash()
            .returning(|_| Err(AppError::HashingFailed));

        let result = use_case(store, hasher, MockTokenService::new())
            .register("tsige", "123123123")
            .await;
        assert!(matches!(result, Err(AppError::HashingFailed)));
    }

    #[actix_rt::test]
    async fn test_store_failures_surface() {
        let mut store = MockAccountStore::new();
        store
            .expect_count_by_username()
            .returning(|_| Err(StoreError::Backend("database error".into())));

        let result = use_case(store, MockPasswordHasher::new(), MockTokenService::new())
            .register("tsige", "123123123")
            .await;
        assert!(matches!(result, Err(AppError::Persistence(msg)) if msg == "database error"));

        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();
        store.expect_count_by_username().returning(|_| Ok(0));
        store.expect_count_all().returning(|| Ok(0));
        store
            .expect_create()
            .returning(|_| Err(StoreError::Backend("disk full".into())));
        hasher.expect_hash().returning(|_| Ok(HASHED.to_string()));

        let result = use_case(store, hasher, MockTokenService::new())
            .register("tsige", "123123123")
            .await;
        assert!(matches!(result, Err(AppError::Persistence(_))));
    }

    #[actix_rt::test]
    async fn test_create_conflict_reports_username_taken() {
        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();
        store.expect_count_by_username().returning(|_| Ok(0));
        store.expect_count_all().returning(|| Ok(1));
        store
            .expect_create()
            .returning(|_| Err(StoreError::Conflict));
        hasher.expect_hash().returning(|_| Ok(HASHED.to_string()));

        let result = use_case(store, hasher, MockTokenService::new())
            .register("tsige", "123123123")
            .await;
        assert!(matches!(result, Err(AppError::UsernameTaken)));
    }

    #[actix_rt::test]
    async fn test_login_issues_token_for_account() {
        let alice = account("alice", Role::Admin);
        let subject = alice.id.to_string();

        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();
        let mut tokens = MockTokenService::new();

        let found = alice.clone();
        store
            .expect_find_by_username()
            .withf(|name| name == "alice")
            .returning(move |_| Ok(Some(found.clone())));
        hasher
            .expect_verify()
            .withf(|hashed, plain| hashed == HASHED && plain == "pw1")
            .returning(|_, _| true);
        tokens
            .expect_issue()
            .withf(move |sub, role| sub == subject && *role == Role::Admin)
            .times(1)
            .returning(|_, _| Ok("signed.jwt.token".to_string()));

        let session = use_case(store, hasher, tokens)
            .login("alice", "pw1")
            .await
            .unwrap();
        assert_eq!(session.token, "signed.jwt.token");
        assert_eq!(session.account, alice);
    }

    #[actix_rt::test]
    async fn test_login_failures_are_indistinguishable() {
        // Wrong password.
        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();
        let mut tokens = MockTokenService::new();
        let bob = account("bob", Role::User);
        store
            .expect_find_by_username()
            .returning(move |_| Ok(Some(bob.clone())));
        hasher.expect_verify().returning(|_, _| false);
        tokens.expect_issue().never();

        let wrong_password = use_case(store, hasher, tokens)
            .login("bob", "wrong")
            .await
            .unwrap_err();

        // Unknown username; the hasher still runs once.
        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();
        let mut tokens = MockTokenService::new();
        store.expect_find_by_username().returning(|_| Ok(None));
        hasher.expect_verify().times(1).returning(|_, _| false);
        tokens.expect_issue().never();

        let unknown_user = use_case(store, hasher, tokens)
            .login("nobody", "wrong")
            .await
            .unwrap_err();

        assert!(matches!(wrong_password, AppError::InvalidCredentials));
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[actix_rt::test]
    async fn test_login_signing_failure_is_internal() {
        let mut store = MockAccountStore::new();
        let mut hasher = MockPasswordHasher::new();
        let mut tokens = MockTokenService::new();
        let alice = account("alice", Role::Admin);
        store
            .expect_find_by_username()
            .returning(move |_| Ok(Some(alice.clone())));
        hasher.expect_verify().returning(|_, _| true);
        tokens
            .expect_issue()
            .returning(|_, _| Err(TokenError::Signing("bad key".into())));

        let result = use_case(store, hasher, tokens).login("alice", "pw1").await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[actix_rt::test]
    async fn test_promote_delegates_to_store() {
        let mut store = MockAccountStore::new();
        store
            .expect_set_role()
            .withf(|id, role| id == "some-id" && *role == Role::Admin)
            .times(1)
            .returning(|_, _| Ok(()));
        use_case(store, MockPasswordHasher::new(), MockTokenService::new())
            .promote_user("some-id")
            .await
            .unwrap();

        let mut store = MockAccountStore::new();
        store
            .expect_set_role()
            .returning(|_, _| Err(StoreError::NotFound));
        let result = use_case(store, MockPasswordHasher::new(), MockTokenService::new())
            .promote_user("missing")
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
