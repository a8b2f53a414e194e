//! Inbound message handling: authorization, intent, reply text.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, NaiveDateTime};
use tracing::{debug, info};

use parabot_schedule::{Catalog, format_day, format_week};
use parabot_types::{InboundMessage, OutboundMessage};

use crate::intent::{self, Intent};

/// Days shown by the week view.
pub const WEEK_SPAN: usize = 7;

const DATE_PROMPT: &str = "Введи дату, например: 23.02, 23.02.2026 или 23 февраля";

const DATE_RETRY: &str =
    "Не понял дату 🤔 Попробуй так: 23.02, 23-02-2026, 23/02/26 или 23 февраля 2026";

const HELP_HINT: &str = "Попробуй: 'сколько сегодня пар', 'какая сейчас пара', 'завтра пары', \
                         'неделя' или дату вроде 23.02";

/// Turns authorized messages into schedule answers.
pub struct Dispatcher {
    catalog: Arc<Catalog>,
    allowed_user_id: i64,
    zone_name: String,
    /// Set after "enter a date" until the next recognised request.
    awaiting_date: AtomicBool,
}

impl Dispatcher {
    pub fn new(catalog: Arc<Catalog>, allowed_user_id: i64, zone_name: impl Into<String>) -> Self {
        Self {
            catalog,
            allowed_user_id,
            zone_name: zone_name.into(),
            awaiting_date: AtomicBool::new(false),
        }
    }

    pub fn is_allowed(&self, user_id: i64) -> bool {
        user_id == self.allowed_user_id
    }

    pub fn is_awaiting_date(&self) -> bool {
        self.awaiting_date.load(Ordering::SeqCst)
    }

    /// Reply to a bot command, or `None` for strangers.
    pub fn handle_command(&self, name: &str, user_id: i64, now: NaiveDateTime) -> Option<String> {
        if !self.is_allowed(user_id) {
            debug!(user_id, command = name, "Ignoring command from unauthorized user");
            return None;
        }
        Some(self.answer(intent::command_intent(name), now))
    }

    /// Reply to free text, or `None` for strangers.
    pub fn handle_text(&self, text: &str, user_id: i64, now: NaiveDateTime) -> Option<String> {
        if !self.is_allowed(user_id) {
            debug!(user_id, "Ignoring text from unauthorized user");
            return None;
        }
        let (intent, rule) = intent::classify_text(text, now.date());
        debug!(?intent, rule = rule.unwrap_or("none"), "Classified text");
        Some(self.answer(intent, now))
    }

    /// Route a channel message and build the outbound reply with the keyboard.
    pub fn handle_inbound(
        &self,
        message: &InboundMessage,
        now: NaiveDateTime,
    ) -> Option<OutboundMessage> {
        let text = match &message.command {
            Some(command) => self.handle_command(command, message.sender_id, now),
            None => self.handle_text(&message.text, message.sender_id, now),
        }?;
        info!(
            channel_id = %message.channel_id,
            chat_id = message.chat_id,
            "Answering message"
        );
        Some(OutboundMessage::text(message.chat_id, text).with_keyboard(intent::keyboard()))
    }

    fn answer(&self, intent: Intent, now: NaiveDateTime) -> String {
        let today = now.date();
        let reply = match intent {
            Intent::AskDate => {
                self.awaiting_date.store(true, Ordering::SeqCst);
                return DATE_PROMPT.to_string();
            }
            Intent::Unknown if self.is_awaiting_date() => return DATE_RETRY.to_string(),
            Intent::Unknown => return HELP_HINT.to_string(),
            Intent::Start | Intent::Help => self.greeting(),
            Intent::Today => format_day(&self.catalog, now, today),
            Intent::Tomorrow => format_day(&self.catalog, now, today + Duration::days(1)),
            Intent::Week => format_week(&self.catalog, now, today, WEEK_SPAN),
            Intent::Date(date) => format_day(&self.catalog, now, date),
        };
        self.awaiting_date.store(false, Ordering::SeqCst);
        reply
    }

    fn greeting(&self) -> String {
        format!(
            "Привет! Жми кнопки внизу или пиши:\n\
             • 'сколько сегодня пар'\n\
             • 'какая сейчас пара'\n\
             • 'завтра пары'\n\
             • 'неделя'\n\
             • дату: 23.02 или 23 февраля\n\
             Время считаю по зоне {}.\n\
             Ещё я напишу, когда начнётся предпоследняя и последняя пара.",
            self.zone_name
        )
    }
}
