use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::config::AppConfig;
use crate::services::push::PushProvider;
use crate::services::sms::SmsProvider;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub sms: Box<dyn SmsProvider>,
    pub push: Box<dyn PushProvider>,
}
