//! Bot command dispatch
//!
//! Parses incoming text and clicks, drives the selection machine and the trip
//! search, and emits replies through the chat transport. Technical failure
//! detail is logged; users only ever see the fixed texts below.

use std::sync::Arc;
use std::time::Duration;

use prefstore::UserId;
use tracing::{debug, info, warn};

use crate::chat::{CallbackQuery, ChatId, ChatTransport, Message, MessageId, TransportError, Update};
use crate::config::DefaultsConfig;
use crate::domain::Role;
use crate::itinerary::ItineraryFormatter;
use crate::planner::{PlannerError, TripSearch};
use crate::selection::{QueryOutcome, SelectionMachine, SelectionState, priority_prompt};

pub const HELP: &str = "Available commands:
• to work - Next trips from home to work
• to home - Next trips from work to home
• /sethome <location> - Set your home location
• /setwork <location> - Set your work location
• /setpriority - Set route preference (fastest (default) / least transfers / least walking)
• /prefs - Show saved locations and preferences
• /help - Show this message

Location examples:
• Address: \"Drottninggatan 1, Stockholm\"
• Stop name: \"Odenplan\"
• Coordinates: \"18.013809:59.335104:WGS84[dd.ddddd]\"";

pub const UNKNOWN_COMMAND: &str = "❓ Unknown command. Type /help for available commands.";
pub const SET_LOCATIONS_FIRST: &str = "❓ Set your locations first: /sethome <location> and /setwork <location>.";
pub const TRIPS_FAILED: &str = "❌ Error fetching trips. Try again later.";

/// Default deadline for one trip search
pub const TRIP_DEADLINE: Duration = Duration::from_secs(10);

/// A parsed text message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Trips towards the given saved location
    Trip(Role),
    Help,
    Prefs,
    SetLocation(Role, String),
    SetPriority,
    Unknown,
}

impl Command {
    /// Commands match case-insensitively; a location query keeps its case
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (word, rest) = match text.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (text, ""),
        };

        match text.to_lowercase().as_str() {
            "to work" => return Command::Trip(Role::Work),
            "to home" => return Command::Trip(Role::Home),
            _ => {}
        }

        match (word.to_lowercase().as_str(), rest.is_empty()) {
            ("/help" | "/start", true) => Command::Help,
            ("/prefs", true) => Command::Prefs,
            ("/setpriority", true) => Command::SetPriority,
            ("/sethome", _) => Command::SetLocation(Role::Home, rest.to_string()),
            ("/setwork", _) => Command::SetLocation(Role::Work, rest.to_string()),
            _ => Command::Unknown,
        }
    }
}

/// Handles one update at a time; cheap to share across tasks
pub struct Handler {
    machine: SelectionMachine,
    trips: Arc<dyn TripSearch>,
    transport: Arc<dyn ChatTransport>,
    formatter: ItineraryFormatter,
    defaults: DefaultsConfig,
    journey_count: usize,
    trip_deadline: Duration,
}

impl Handler {
    pub fn new(
        machine: SelectionMachine,
        trips: Arc<dyn TripSearch>,
        transport: Arc<dyn ChatTransport>,
        formatter: ItineraryFormatter,
        defaults: DefaultsConfig,
        journey_count: usize,
    ) -> Self {
        Self {
            machine,
            trips,
            transport,
            formatter,
            defaults,
            journey_count,
            trip_deadline: TRIP_DEADLINE,
        }
    }

    /// Trip searches slower than `deadline` are reported as failed
    pub fn with_trip_deadline(mut self, deadline: Duration) -> Self {
        self.trip_deadline = deadline;
        self
    }

    pub async fn handle_update(&self, update: Update) -> Result<(), TransportError> {
        debug!(update_id = update.update_id, "handle_update: called");
        if let Some(callback) = update.callback_query {
            return self.handle_callback(callback).await;
        }
        if let Some(message) = update.message {
            return self.handle_message(message).await;
        }
        debug!(update_id = update.update_id, "handle_update: nothing to handle");
        Ok(())
    }

    async fn handle_message(&self, message: Message) -> Result<(), TransportError> {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let chat = message.chat.id;
        let user = message.from.as_ref().map(|u| u.id).unwrap_or(chat);
        self.handle_text(chat, user, text).await
    }

    /// Dispatch a text message from `user` in `chat`
    pub async fn handle_text(&self, chat: ChatId, user: UserId, text: &str) -> Result<(), TransportError> {
        let command = Command::parse(text);
        info!(user, ?command, "handle_text: command received");

        match command {
            Command::Trip(towards) => {
                let reply = self.itinerary(user, towards).await;
                self.reply(chat, &reply).await
            }
            Command::Help => self.reply(chat, HELP).await,
            Command::Prefs => {
                let reply = self.preferences_text(user).await;
                self.reply(chat, &reply).await
            }
            Command::SetLocation(role, query) => match self.machine.start(user, role, &query).await {
                QueryOutcome::Prompt(prompt) => {
                    self.transport.send_prompt(chat, &prompt.text, &prompt.options).await?;
                    Ok(())
                }
                outcome => self.reply(chat, &outcome.message()).await,
            },
            Command::SetPriority => {
                let prompt = priority_prompt(user);
                self.transport.send_prompt(chat, &prompt.text, &prompt.options).await?;
                Ok(())
            }
            Command::Unknown => self.reply(chat, UNKNOWN_COMMAND).await,
        }
    }

    async fn handle_callback(&self, callback: CallbackQuery) -> Result<(), TransportError> {
        let data = callback.data.as_deref().unwrap_or_default();
        let prompt = callback.message.as_ref().map(|m| (m.chat.id, m.message_id));
        let result = self.handle_click(callback.from.id, prompt, data).await;

        // Acknowledge even when the reply failed so the client stops spinning
        if let Err(e) = self.transport.answer_callback(&callback.id).await {
            warn!(callback_id = %callback.id, error = %e, "handle_callback: failed to answer");
        }
        result
    }

    /// Resolve a click on `prompt` (chat, message) by `user`
    pub async fn handle_click(
        &self,
        user: UserId,
        prompt: Option<(ChatId, MessageId)>,
        data: &str,
    ) -> Result<(), TransportError> {
        let outcome = self.machine.resolve(user, data).await;
        debug!(user, ?outcome, "handle_click: resolved");

        let Some((chat, message)) = prompt else {
            warn!(user, "handle_click: prompt message unavailable, cannot reply");
            return Ok(());
        };
        if outcome.edits_prompt() {
            self.transport.edit_text(chat, message, &outcome.message()).await
        } else {
            self.reply(chat, &outcome.message()).await
        }
    }

    /// Formatted trips towards `towards`, starting from the other saved location
    pub async fn itinerary(&self, user: UserId, towards: Role) -> String {
        let prefs = self.machine.prefs().preferences(user);
        let home = non_empty(&prefs.home_location).or_else(|| self.defaults.home.as_deref().and_then(non_empty));
        let work = non_empty(&prefs.work_location).or_else(|| self.defaults.work.as_deref().and_then(non_empty));
        let (origin, destination) = match towards {
            Role::Work => (home, work),
            Role::Home => (work, home),
        };

        let (Some(origin), Some(destination)) = (origin, destination) else {
            return SET_LOCATIONS_FIRST.to_string();
        };

        let search = self
            .trips
            .trips(origin, destination, self.journey_count, prefs.route_priority);
        let result = tokio::time::timeout(self.trip_deadline, search)
            .await
            .unwrap_or_else(|_| Err(PlannerError::Timeout(self.trip_deadline)));
        match result {
            Ok(journeys) => self.formatter.format_journeys(&journeys, self.journey_count),
            Err(e) => {
                warn!(user, %origin, %destination, error = %e, "itinerary: trip search failed");
                TRIPS_FAILED.to_string()
            }
        }
    }

    /// The `/prefs` reply
    pub async fn preferences_text(&self, user: UserId) -> String {
        let prefs = self.machine.prefs().preferences(user);

        let home = self.location_line(&prefs.home_location, self.defaults.home.as_deref()).await;
        let work = self.location_line(&prefs.work_location, self.defaults.work.as_deref()).await;
        let priority = match prefs.route_priority {
            Some(p) => format!("{} (saved)", p.label()),
            None => "Not set (using default)".to_string(),
        };

        let mut text = format!(
            "Your preferences:\nHome: {}\nWork: {}\nRoute priority: {}",
            home, work, priority
        );
        for role in [Role::Home, Role::Work] {
            if let SelectionState::PromptIssued(_) = self.machine.state(user, role).await {
                text.push_str(&format!("\n⏳ {} selection waiting for your choice", role.title()));
            }
        }
        text.push_str("\n\nChange with /sethome, /setwork, and /setpriority");
        text
    }

    async fn location_line(&self, saved: &str, default: Option<&str>) -> String {
        let (reference, note) = match (non_empty(saved), default.and_then(non_empty)) {
            (Some(saved), _) => (saved, "(saved)"),
            (None, Some(default)) => (default, "(default)"),
            (None, None) => return "Not set".to_string(),
        };
        format!("{} {}", self.machine.resolver().label(reference).await, note)
    }

    async fn reply(&self, chat: ChatId, text: &str) -> Result<(), TransportError> {
        self.transport.send_text(chat, text).await?;
        Ok(())
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.is_empty() { None } else { Some(s) }
}
