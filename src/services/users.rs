//! Identity flows: password + one-time-code login, code-gated signup, and the
//! administrator approval gate.
//!
//! Login: credentials checked -> code issued -> code verified -> session.
//! Signup: draft held with a code -> code verified -> user created, approved
//! immediately for customers and left for admin review for owners.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use rand::Rng;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::{
    cache::Cache,
    config::AuthConfig,
    database::RecordStore,
    error::{Error, Result},
    models::users::{
        LoginResult, LoginUser, PendingSignup, PublicUser, RegisterUser, SignupResult, User,
        UserRole, UserSession, UserStatus, VerifyOtp,
    },
    queries::users,
    services::{
        mailer::{dispatch_code, OtpDelivery, OtpNotifier, OtpPurpose},
        sessions,
    },
    validation::{normalize_email, validate_email, validate_full_name, validate_password},
};

/// Hash a password with Argon2 and a random salt (PHC string format).
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?
        .to_string();
    Ok(hash)
}

/// Verifies a password against a password hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| Error::Internal(format!("Invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::Internal(format!("Password verification failed: {}", e))),
    }
}

/// Six-digit numeric code without a leading zero.
pub fn generate_otp() -> String {
    rand::rng().random_range(100_000..1_000_000u32).to_string()
}

fn codes_match(submitted: &str, expected: &str) -> bool {
    submitted.trim().as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Wrong guesses a login code survives before it is discarded.
pub const MAX_OTP_ATTEMPTS: u32 = 5;

fn clear_otp(user: &mut User) {
    user.otp = None;
    user.otp_expires_at = None;
    user.otp_attempts = 0;
}

fn ensure_may_sign_in(user: &User) -> Result<()> {
    if !user.is_approved {
        return Err(Error::NotApproved(
            "Your account is waiting for administrator approval".to_string(),
        ));
    }
    if user.status == UserStatus::Suspended {
        return Err(Error::Forbidden("Account suspended".to_string()));
    }
    Ok(())
}

fn signup_key(email: &str) -> String {
    format!("signup:{}", normalize_email(email))
}

async fn open_session(
    sessions_cache: &Cache<UserSession>,
    auth: &AuthConfig,
    user: User,
) -> Result<LoginResult> {
    let (session_token, session) =
        sessions::create_session(sessions_cache, &user, auth.session_ttl_seconds).await?;
    Ok(LoginResult {
        user: user.into(),
        session_token,
        expires_at: session.expires_at,
    })
}

/// Checks credentials and issues a login code.
///
/// No code is generated or dispatched unless the password matches and the
/// account is approved and active. The returned user has no session yet.
pub async fn login_user(
    store: &RecordStore,
    notifier: &dyn OtpNotifier,
    auth: &AuthConfig,
    login: LoginUser,
) -> Result<User> {
    if login.email.trim().is_empty() || login.password.is_empty() {
        return Err(Error::InvalidCredentials);
    }

    let user = users::get_user_by_email(store, &login.email)
        .await?
        .ok_or(Error::InvalidCredentials)?;

    if !verify_password(&login.password, &user.password_hash)? {
        tracing::info!(email = %user.email, "Login rejected: password mismatch");
        return Err(Error::InvalidCredentials);
    }

    // Approval and status are re-read inside the write: an admin may have
    // changed them while the password was being verified.
    let code = generate_otp();
    let issued = code.clone();
    let expires_at = Utc::now() + Duration::seconds(auth.otp_ttl_seconds);
    let (user, ()) = users::update_user(store, &user.id, move |user| {
        ensure_may_sign_in(user)?;
        user.otp = Some(issued);
        user.otp_expires_at = Some(expires_at);
        user.otp_attempts = 0;
        Ok(())
    })
    .await?
    .ok_or(Error::InvalidCredentials)?;

    dispatch_code(
        notifier,
        OtpDelivery {
            email: user.email.clone(),
            name: user.name.clone(),
            code,
            purpose: OtpPurpose::Login,
        },
    )
    .await;

    Ok(user)
}

/// Verifies the most recently issued login code and opens a session.
pub async fn verify_login_otp(
    store: &RecordStore,
    sessions_cache: &Cache<UserSession>,
    auth: &AuthConfig,
    request: VerifyOtp,
) -> Result<LoginResult> {
    let user_id = users::get_user_by_email(store, &request.email)
        .await?
        .ok_or(Error::InvalidCode)?
        .id;

    let code = request.code;
    let (user, verified) = users::update_user(store, &user_id, move |user| {
        let expected = user.otp.as_deref().ok_or(Error::InvalidCode)?;
        if !codes_match(&code, expected) {
            user.otp_attempts += 1;
            if user.otp_attempts >= MAX_OTP_ATTEMPTS {
                clear_otp(user);
            }
            return Ok(false);
        }

        if user.otp_expires_at.is_some_and(|exp| exp <= Utc::now()) {
            return Err(Error::InvalidCode);
        }
        ensure_may_sign_in(user)?;

        clear_otp(user);
        Ok(true)
    })
    .await?
    .ok_or(Error::InvalidCode)?;

    if !verified {
        tracing::info!(email = %user.email, attempts = user.otp_attempts, "Login code mismatch");
        return Err(Error::InvalidCode);
    }

    tracing::info!(user_id = %user.id, "Login verified");
    open_session(sessions_cache, auth, user).await
}

/// Validates a signup draft, holds it with a fresh code and dispatches the code.
/// Nothing is persisted until the code is verified.
pub async fn request_signup_otp(
    store: &RecordStore,
    pending: &Cache<PendingSignup>,
    notifier: &dyn OtpNotifier,
    auth: &AuthConfig,
    draft: RegisterUser,
) -> Result<()> {
    validate_full_name(&draft.name)?;
    validate_email(&draft.email)?;
    validate_password(&draft.password)?;

    if draft.role == UserRole::Admin {
        return Err(Error::validation("role", "Administrator accounts cannot be self-registered"));
    }

    let email = normalize_email(&draft.email);
    if users::get_user_by_email(store, &email).await?.is_some() {
        return Err(Error::DuplicateIdentity(format!("An account already exists for {}", email)));
    }

    let code = generate_otp();
    let entry = PendingSignup {
        name: draft.name.trim().to_string(),
        email: email.clone(),
        password_hash: hash_password(&draft.password)?,
        role: draft.role,
        phone: draft.phone,
        code: code.clone(),
    };
    pending
        .set_ex(&signup_key(&email), entry.clone(), auth.signup_ttl_seconds)
        .await?;

    dispatch_code(
        notifier,
        OtpDelivery {
            email,
            name: entry.name,
            code,
            purpose: OtpPurpose::Signup,
        },
    )
    .await;

    Ok(())
}

/// Verifies a signup code and materializes the user.
///
/// Customers are approved and signed in immediately; owners wait for an
/// administrator and get no session.
pub async fn verify_signup_otp(
    store: &RecordStore,
    pending: &Cache<PendingSignup>,
    sessions_cache: &Cache<UserSession>,
    auth: &AuthConfig,
    request: VerifyOtp,
) -> Result<SignupResult> {
    let key = signup_key(&request.email);

    let entry = pending.get(&key).await?.ok_or(Error::InvalidCode)?;
    if !codes_match(&request.code, &entry.code) {
        return Err(Error::InvalidCode);
    }
    // a concurrent verification may have consumed it first
    let entry = pending.take(&key).await?.ok_or(Error::InvalidCode)?;

    let user = User {
        id: Uuid::now_v7().to_string(),
        name: entry.name,
        email: entry.email,
        role: entry.role,
        password_hash: entry.password_hash,
        is_approved: entry.role == UserRole::Customer,
        otp: None,
        otp_expires_at: None,
        otp_attempts: 0,
        status: UserStatus::Active,
        phone: entry.phone,
        created_at: Utc::now(),
    };

    let email = user.email.clone();
    if store
        .put_unless(&user, |existing: &User| normalize_email(&existing.email) == email)
        .await?
        .is_some()
    {
        return Err(Error::DuplicateIdentity(format!("An account already exists for {}", email)));
    }

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        approved = user.is_approved,
        "User registered"
    );

    if user.is_approved {
        let session = open_session(sessions_cache, auth, user.clone()).await?;
        Ok(SignupResult {
            user: user.into(),
            session: Some(session),
        })
    } else {
        Ok(SignupResult {
            user: user.into(),
            session: None,
        })
    }
}

/// Ends the session behind `token`.
pub async fn logout_user(sessions_cache: &Cache<UserSession>, token: &str) -> Result<()> {
    sessions::revoke_session(sessions_cache, token).await
}

/// Resolves a session token to a user that may still sign in.
pub async fn current_user(
    store: &RecordStore,
    sessions_cache: &Cache<UserSession>,
    token: &str,
) -> Result<User> {
    let session = sessions::resolve_session(sessions_cache, token).await?;
    let user = users::get_user_by_id(store, &session.user_id)
        .await?
        .ok_or_else(|| Error::Authentication("User not found".to_string()))?;

    if !user.is_approved || user.status == UserStatus::Suspended {
        return Err(Error::Authentication("Account is not active".to_string()));
    }

    Ok(user)
}

fn user_not_found(user_id: &str) -> Error {
    Error::NotFound(format!("User with ID {} not found", user_id))
}

/// Toggles the approval gate. Revoking approval also ends the user's sessions.
pub async fn set_user_approval(
    store: &RecordStore,
    sessions_cache: &Cache<UserSession>,
    user_id: &str,
    is_approved: bool,
) -> Result<PublicUser> {
    let (user, ()) = users::update_user(store, user_id, |user| {
        user.is_approved = is_approved;
        if !is_approved {
            clear_otp(user);
        }
        Ok(())
    })
    .await?
    .ok_or_else(|| user_not_found(user_id))?;

    if !is_approved {
        sessions::revoke_all_user_sessions(sessions_cache, user_id).await?;
    }

    tracing::info!(user_id, is_approved, "User approval changed");
    Ok(user.into())
}

/// Suspends or reactivates an account. Suspension ends the user's sessions.
pub async fn set_user_status(
    store: &RecordStore,
    sessions_cache: &Cache<UserSession>,
    user_id: &str,
    status: UserStatus,
) -> Result<PublicUser> {
    let (user, ()) = users::update_user(store, user_id, |user| {
        user.status = status;
        if status == UserStatus::Suspended {
            clear_otp(user);
        }
        Ok(())
    })
    .await?
    .ok_or_else(|| user_not_found(user_id))?;

    if status == UserStatus::Suspended {
        sessions::revoke_all_user_sessions(sessions_cache, user_id).await?;
    }

    tracing::info!(user_id, status = %status, "User status changed");
    Ok(user.into())
}

pub async fn list_users(store: &RecordStore) -> Result<Vec<PublicUser>> {
    Ok(users::list_users(store).await?.into_iter().map(Into::into).collect())
}

pub async fn list_pending_owners(store: &RecordStore) -> Result<Vec<PublicUser>> {
    Ok(users::list_pending_owners(store)
        .await?
        .into_iter()
        .map(Into::into)
        .collect())
}
