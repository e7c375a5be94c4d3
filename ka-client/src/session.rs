//! Login session store
//!
//! Keeps the current [`UserSession`] in a JSON file so a retailer stays logged
//! in between runs, and drives the email / OTP login flow against an
//! [`AuthApi`].

use crate::ClientError;
use crate::rpc::AuthApi;
use chrono::Utc;
use regex::Regex;
use shared::{AppError, ErrorCode, UserSession};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

static OTP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("valid OTP pattern"));

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Please enter the 6-digit OTP")]
    InvalidOtp,

    /// The auth endpoint refused the request
    #[error("{0}")]
    Rejected(String),

    #[error("Auth request failed: {0}")]
    Remote(ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ClientError> for SessionError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Rejected(message) => SessionError::Rejected(message),
            other => SessionError::Remote(other),
        }
    }
}

impl SessionError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::InvalidEmail => ErrorCode::InvalidEmail,
            SessionError::InvalidOtp => ErrorCode::InvalidOtp,
            SessionError::Rejected(_) => ErrorCode::OtpRejected,
            SessionError::Remote(e) => e.code(),
            SessionError::Io(_) | SessionError::Json(_) => ErrorCode::SessionStorageFailed,
        }
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::with_message(err.code(), err.to_string())
    }
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_otp(otp: &str) -> bool {
    OTP_RE.is_match(otp)
}

/// Outcome of [`SessionStore::validate_session`]
#[derive(Debug, Clone, PartialEq)]
pub enum SessionStatus {
    Valid(UserSession),
    /// No session was stored
    LoggedOut,
    /// Expired by the local clock; cleared
    Expired,
    /// Server no longer accepts the token (account deactivated or session
    /// revoked); cleared
    Revoked,
}

impl SessionStatus {
    /// Why the user has to log in again, `None` for a valid session
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            SessionStatus::Valid(_) => None,
            SessionStatus::LoggedOut => Some(ErrorCode::NotAuthenticated),
            SessionStatus::Expired => Some(ErrorCode::SessionExpired),
            SessionStatus::Revoked => Some(ErrorCode::AccountDisabled),
        }
    }
}

/// File-backed session store
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored session, `None` when nobody is logged in
    pub fn load(&self) -> Result<Option<UserSession>, SessionError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, session: &UserSession) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(email = %session.email, "Session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Ask the server to email an OTP
    pub async fn request_otp<A: AuthApi + ?Sized>(
        &self,
        api: &A,
        email: &str,
    ) -> Result<String, SessionError> {
        let email = email.trim();
        if !validate_email(email) {
            return Err(SessionError::InvalidEmail);
        }
        let message = api.generate_otp(email).await?;
        tracing::info!(email = %email, "OTP requested");
        Ok(message)
    }

    /// Verify the OTP and persist the returned session
    pub async fn login_with_otp<A: AuthApi + ?Sized>(
        &self,
        api: &A,
        email: &str,
        otp: &str,
    ) -> Result<UserSession, SessionError> {
        let email = email.trim();
        let otp = otp.trim();
        if !validate_email(email) {
            return Err(SessionError::InvalidEmail);
        }
        if !validate_otp(otp) {
            return Err(SessionError::InvalidOtp);
        }

        let mut session = api.verify_otp(email, otp).await?;
        session.login_time = shared::util::now_iso();
        self.save(&session)?;

        crate::audit_log!(session.email.as_str(), "login", "session");
        Ok(session)
    }

    /// Check the stored session
    ///
    /// An expired session (by the local clock) or one the server rejects is
    /// cleared. When the server cannot be reached the local expiry decides.
    pub async fn validate_session<A: AuthApi + ?Sized>(
        &self,
        api: &A,
    ) -> Result<SessionStatus, SessionError> {
        let Some(session) = self.load()? else {
            return Ok(SessionStatus::LoggedOut);
        };

        if session.is_expired_at(Utc::now()) {
            tracing::info!(email = %session.email, "Session expired");
            self.clear()?;
            return Ok(SessionStatus::Expired);
        }

        match api
            .check_session(&session.email, &session.session_token)
            .await
        {
            Ok(true) => Ok(SessionStatus::Valid(session)),
            Ok(false) => {
                tracing::info!(email = %session.email, "Session rejected by server");
                self.clear()?;
                Ok(SessionStatus::Revoked)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session check failed, using local expiry");
                Ok(SessionStatus::Valid(session))
            }
        }
    }
}
