use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};
use rand::Rng;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Role, User, VerificationSession};
use crate::state::AppState;

/// Generates a new code for the phone, overwriting any prior session, and
/// dispatches it via SMS. A failed dispatch is surfaced to the caller; the
/// stored session stays usable should the code arrive late.
pub async fn request_code(state: &Arc<AppState>, phone: &str) -> Result<(), AppError> {
    let phone = normalize_phone(phone)?;
    let code = generate_code();

    let session = VerificationSession {
        phone: phone.clone(),
        code: code.clone(),
        expires_at: Utc::now().naive_utc() + Duration::minutes(state.config.otp_ttl_minutes),
        attempts_remaining: state.config.otp_max_attempts,
    };

    {
        let db = state.db.lock().unwrap();
        queries::upsert_session(&db, &session)?;
    }

    let body = format!(
        "Your verification code is {code}. It expires in {} minutes.",
        state.config.otp_ttl_minutes
    );
    if let Err(e) = state.sms.send_sms(&phone, &body).await {
        tracing::error!(error = %e, phone = %phone, "failed to deliver verification code");
        return Err(AppError::Messaging(
            "failed to deliver verification code".to_string(),
        ));
    }

    tracing::info!(phone = %phone, "verification code issued");
    Ok(())
}

pub fn verify_code(state: &Arc<AppState>, phone: &str, code: &str) -> Result<User, AppError> {
    let phone = normalize_phone(phone)?;
    let db = state.db.lock().unwrap();
    verify_code_at(&db, &phone, code, Utc::now().naive_utc())
}

/// Core verification rules, separated from the clock for testing.
///
/// A session is consumed on success (a code verifies exactly once). Expired
/// sessions are deleted lazily here; there is no background sweeper. Once
/// attempts are exhausted the session is dead even for the correct code, and
/// the caller must request a fresh one.
pub fn verify_code_at(
    conn: &Connection,
    phone: &str,
    code: &str,
    now: NaiveDateTime,
) -> Result<User, AppError> {
    let session = match queries::get_session(conn, phone)? {
        Some(s) => s,
        None => return Err(AppError::ExpiredSession),
    };

    if session.is_expired(now) {
        queries::delete_session(conn, phone)?;
        return Err(AppError::ExpiredSession);
    }

    if session.attempts_remaining <= 0 {
        return Err(AppError::TooManyAttempts);
    }

    if session.code != code {
        let remaining = queries::decrement_session_attempts(conn, phone)?;
        if remaining <= 0 {
            return Err(AppError::TooManyAttempts);
        }
        return Err(AppError::CodeMismatch);
    }

    queries::delete_session(conn, phone)?;

    if let Some(user) = queries::get_user_by_phone(conn, phone)? {
        return Ok(user);
    }

    // First verification for this phone creates the user; name and role are
    // filled in by the onboarding steps that follow.
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        phone: phone.to_string(),
        name: String::new(),
        role: Role::Unset,
        push_token: None,
        created_at: now,
    };
    queries::create_user(conn, &user)?;
    tracing::info!(user_id = %user.id, "created user on first verification");
    Ok(user)
}

fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

pub fn normalize_phone(phone: &str) -> Result<String, AppError> {
    let phone = phone.trim();
    let valid = phone.strip_prefix('+').is_some_and(|rest| {
        (7..=15).contains(&rest.len()) && rest.chars().all(|c| c.is_ascii_digit())
    });
    if !valid {
        return Err(AppError::Validation(
            "phone must be in E.164 format, e.g. +911234567890".to_string(),
        ));
    }
    Ok(phone.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn session(conn: &Connection, phone: &str, code: &str, expires_at: NaiveDateTime) {
        queries::upsert_session(
            conn,
            &VerificationSession {
                phone: phone.to_string(),
                code: code.to_string(),
                expires_at,
                attempts_remaining: 3,
            },
        )
        .unwrap();
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn phone_normalization_rejects_garbage() {
        assert!(normalize_phone("+911234567890").is_ok());
        assert!(normalize_phone("  +911234567890  ").is_ok());
        assert!(normalize_phone("911234567890").is_err());
        assert!(normalize_phone("+91abc").is_err());
        assert!(normalize_phone("").is_err());
        assert!(normalize_phone("+1").is_err());
    }

    #[test]
    fn correct_code_verifies_exactly_once() {
        let conn = db::init_db(":memory:").unwrap();
        session(&conn, "+911234567890", "482913", now() + Duration::minutes(10));

        let user = verify_code_at(&conn, "+911234567890", "482913", now()).unwrap();
        assert_eq!(user.phone, "+911234567890");
        assert_eq!(user.role, Role::Unset);

        // Session was consumed; the same code is now dead.
        let err = verify_code_at(&conn, "+911234567890", "482913", now()).unwrap_err();
        assert!(matches!(err, AppError::ExpiredSession));
    }

    #[test]
    fn expired_session_fails_and_is_deleted() {
        let conn = db::init_db(":memory:").unwrap();
        session(&conn, "+911234567890", "482913", now() - Duration::minutes(1));

        let err = verify_code_at(&conn, "+911234567890", "482913", now()).unwrap_err();
        assert!(matches!(err, AppError::ExpiredSession));
        assert!(queries::get_session(&conn, "+911234567890")
            .unwrap()
            .is_none());
    }

    #[test]
    fn wrong_code_decrements_then_locks_out() {
        let conn = db::init_db(":memory:").unwrap();
        session(&conn, "+911234567890", "482913", now() + Duration::minutes(10));

        let err = verify_code_at(&conn, "+911234567890", "482910", now()).unwrap_err();
        assert!(matches!(err, AppError::CodeMismatch));
        let err = verify_code_at(&conn, "+911234567890", "482910", now()).unwrap_err();
        assert!(matches!(err, AppError::CodeMismatch));
        let err = verify_code_at(&conn, "+911234567890", "482910", now()).unwrap_err();
        assert!(matches!(err, AppError::TooManyAttempts));

        // Even the correct code fails once attempts are exhausted.
        let err = verify_code_at(&conn, "+911234567890", "482913", now()).unwrap_err();
        assert!(matches!(err, AppError::TooManyAttempts));
    }

    #[test]
    fn new_request_invalidates_old_code() {
        let conn = db::init_db(":memory:").unwrap();
        session(&conn, "+911234567890", "111111", now() + Duration::minutes(10));
        session(&conn, "+911234567890", "222222", now() + Duration::minutes(10));

        let err = verify_code_at(&conn, "+911234567890", "111111", now()).unwrap_err();
        assert!(matches!(err, AppError::CodeMismatch));
        verify_code_at(&conn, "+911234567890", "222222", now()).unwrap();
    }

    #[test]
    fn reverification_returns_existing_user() {
        let conn = db::init_db(":memory:").unwrap();
        session(&conn, "+911234567890", "482913", now() + Duration::minutes(10));
        let first = verify_code_at(&conn, "+911234567890", "482913", now()).unwrap();

        session(&conn, "+911234567890", "555555", now() + Duration::minutes(10));
        let second = verify_code_at(&conn, "+911234567890", "555555", now()).unwrap();
        assert_eq!(first.id, second.id);
    }
}
