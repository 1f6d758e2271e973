use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{
    Booking, BookingStatus, ChatMessage, FaqEntry, Role, Service, Settings, User,
    VerificationSession,
};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

// ── Verification Sessions ──

pub fn upsert_session(conn: &Connection, session: &VerificationSession) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO verification_sessions (phone, code, expires_at, attempts_remaining)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(phone) DO UPDATE SET
           code = excluded.code,
           expires_at = excluded.expires_at,
           attempts_remaining = excluded.attempts_remaining",
        params![
            session.phone,
            session.code,
            fmt_ts(&session.expires_at),
            session.attempts_remaining,
        ],
    )?;
    Ok(())
}

pub fn get_session(conn: &Connection, phone: &str) -> anyhow::Result<Option<VerificationSession>> {
    let result = conn.query_row(
        "SELECT phone, code, expires_at, attempts_remaining
         FROM verification_sessions WHERE phone = ?1",
        params![phone],
        |row| {
            let expires_at_str: String = row.get(2)?;
            Ok(VerificationSession {
                phone: row.get(0)?,
                code: row.get(1)?,
                expires_at: parse_ts(&expires_at_str),
                attempts_remaining: row.get(3)?,
            })
        },
    );

    match result {
        Ok(session) => Ok(Some(session)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn delete_session(conn: &Connection, phone: &str) -> anyhow::Result<()> {
    conn.execute(
        "DELETE FROM verification_sessions WHERE phone = ?1",
        params![phone],
    )?;
    Ok(())
}

pub fn decrement_session_attempts(conn: &Connection, phone: &str) -> anyhow::Result<i32> {
    conn.execute(
        "UPDATE verification_sessions
         SET attempts_remaining = attempts_remaining - 1
         WHERE phone = ?1 AND attempts_remaining > 0",
        params![phone],
    )?;
    let remaining: i32 = conn.query_row(
        "SELECT attempts_remaining FROM verification_sessions WHERE phone = ?1",
        params![phone],
        |row| row.get(0),
    )?;
    Ok(remaining)
}

// ── Users ──

fn parse_user_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let role_str: String = row.get(3)?;
    let created_at_str: String = row.get(5)?;
    Ok(User {
        id: row.get(0)?,
        phone: row.get(1)?,
        name: row.get(2)?,
        role: Role::parse(&role_str),
        push_token: row.get(4)?,
        created_at: parse_ts(&created_at_str),
    })
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, phone, name, role, push_token, created_at FROM users WHERE id = ?1",
        params![id],
        parse_user_row,
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_user_by_phone(conn: &Connection, phone: &str) -> anyhow::Result<Option<User>> {
    let result = conn.query_row(
        "SELECT id, phone, name, role, push_token, created_at FROM users WHERE phone = ?1",
        params![phone],
        parse_user_row,
    );

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn create_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, phone, name, role, push_token, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user.id,
            user.phone,
            user.name,
            user.role.as_str(),
            user.push_token,
            fmt_ts(&user.created_at),
        ],
    )?;
    Ok(())
}

pub fn update_user_name(conn: &Connection, id: &str, name: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET name = ?1 WHERE id = ?2",
        params![name, id],
    )?;
    Ok(count > 0)
}

pub fn update_user_role(conn: &Connection, id: &str, role: Role) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET role = ?1 WHERE id = ?2",
        params![role.as_str(), id],
    )?;
    Ok(count > 0)
}

pub fn update_user_push_token(conn: &Connection, id: &str, token: &str) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET push_token = ?1 WHERE id = ?2",
        params![token, id],
    )?;
    Ok(count > 0)
}

// ── Services ──

fn parse_service_row(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    let created_at_str: String = row.get(5)?;
    Ok(Service {
        id: row.get(0)?,
        worker_id: row.get(1)?,
        name: row.get(2)?,
        category: row.get(3)?,
        price: row.get(4)?,
        created_at: parse_ts(&created_at_str),
    })
}

pub fn create_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, worker_id, name, category, price, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            service.id,
            service.worker_id,
            service.name,
            service.category,
            service.price,
            fmt_ts(&service.created_at),
        ],
    )?;
    Ok(())
}

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    let result = conn.query_row(
        "SELECT id, worker_id, name, category, price, created_at FROM services WHERE id = ?1",
        params![id],
        parse_service_row,
    );

    match result {
        Ok(service) => Ok(Some(service)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_services(conn: &Connection) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, worker_id, name, category, price, created_at
         FROM services ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map([], parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

pub fn list_services_for_worker(conn: &Connection, worker_id: &str) -> anyhow::Result<Vec<Service>> {
    let mut stmt = conn.prepare(
        "SELECT id, worker_id, name, category, price, created_at
         FROM services WHERE worker_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![worker_id], parse_service_row)?;

    let mut services = vec![];
    for row in rows {
        services.push(row?);
    }
    Ok(services)
}

// ── Bookings ──

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let status_str: String = row.get(4)?;
    let scheduled_at_str: String = row.get(5)?;
    let created_at_str: String = row.get(6)?;
    let updated_at_str: String = row.get(7)?;
    Ok(Booking {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        worker_id: row.get(2)?,
        service_id: row.get(3)?,
        status: BookingStatus::parse(&status_str),
        scheduled_at: parse_ts(&scheduled_at_str),
        created_at: parse_ts(&created_at_str),
        updated_at: parse_ts(&updated_at_str),
    })
}

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, customer_id, worker_id, service_id, status, scheduled_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            booking.id,
            booking.customer_id,
            booking.worker_id,
            booking.service_id,
            booking.status.as_str(),
            fmt_ts(&booking.scheduled_at),
            fmt_ts(&booking.created_at),
            fmt_ts(&booking.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        "SELECT id, customer_id, worker_id, service_id, status, scheduled_at, created_at, updated_at
         FROM bookings WHERE id = ?1",
        params![id],
        parse_booking_row,
    );

    match result {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let now = fmt_ts(&Utc::now().naive_utc());
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;
    Ok(count > 0)
}

pub fn list_bookings_for_customer(conn: &Connection, customer_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_id, worker_id, service_id, status, scheduled_at, created_at, updated_at
         FROM bookings WHERE customer_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![customer_id], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn list_bookings_for_worker(conn: &Connection, worker_id: &str) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(
        "SELECT id, customer_id, worker_id, service_id, status, scheduled_at, created_at, updated_at
         FROM bookings WHERE worker_id = ?1 ORDER BY created_at DESC",
    )?;
    let rows = stmt.query_map(params![worker_id], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

// ── Chat Messages ──

pub fn insert_chat_message(
    conn: &Connection,
    booking_id: &str,
    sender_id: &str,
    text: &str,
    sent_at: &NaiveDateTime,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO chat_messages (booking_id, sender_id, text, sent_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![booking_id, sender_id, text, fmt_ts(sent_at)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_chat_messages(conn: &Connection, booking_id: &str) -> anyhow::Result<Vec<ChatMessage>> {
    // Ordered by rowid, which is insertion order.
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, sender_id, text, sent_at
         FROM chat_messages WHERE booking_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![booking_id], |row| {
        let sent_at_str: String = row.get(4)?;
        Ok(ChatMessage {
            id: row.get(0)?,
            booking_id: row.get(1)?,
            sender_id: row.get(2)?,
            text: row.get(3)?,
            sent_at: parse_ts(&sent_at_str),
        })
    })?;

    let mut messages = vec![];
    for row in rows {
        messages.push(row?);
    }
    Ok(messages)
}

// ── Settings ──

pub fn get_settings(conn: &Connection) -> anyhow::Result<Option<Settings>> {
    let result = conn.query_row(
        "SELECT terms_and_conditions, privacy_policy, faqs, contact_info FROM settings WHERE id = 1",
        [],
        |row| {
            let faqs_json: String = row.get(2)?;
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                faqs_json,
                row.get::<_, String>(3)?,
            ))
        },
    );

    match result {
        Ok((terms_and_conditions, privacy_policy, faqs_json, contact_info)) => {
            let faqs: Vec<FaqEntry> = serde_json::from_str(&faqs_json).unwrap_or_default();
            Ok(Some(Settings {
                terms_and_conditions,
                privacy_policy,
                faqs,
                contact_info,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_settings(conn: &Connection, settings: &Settings) -> anyhow::Result<()> {
    let faqs_json = serde_json::to_string(&settings.faqs)?;
    conn.execute(
        "INSERT INTO settings (id, terms_and_conditions, privacy_policy, faqs, contact_info)
         VALUES (1, ?1, ?2, ?3, ?4)
         ON CONFLICT(id) DO UPDATE SET
           terms_and_conditions = excluded.terms_and_conditions,
           privacy_policy = excluded.privacy_policy,
           faqs = excluded.faqs,
           contact_info = excluded.contact_info",
        params![
            settings.terms_and_conditions,
            settings.privacy_policy,
            faqs_json,
            settings.contact_info,
        ],
    )?;
    Ok(())
}
