//! TransitBot - transit itineraries for saved home and work locations
//!
//! Users save a home and a work location by free-text query. A query with
//! one match is saved at once; several matches produce a prompt whose click is
//! resolved later against the pending-selection store. "to work" and
//! "to home" fetch trips between the saved (or default) locations and render
//! them with realtime delays in a fixed display timezone.
//!
//! # Architecture
//!
//! - [`resolver`]: query to zero, one or many candidates
//! - [`state`]: pending candidate lists, one actor owning the map
//! - [`selection`]: query/click state machine and addressing tokens
//! - [`itinerary`]: journey rendering
//! - [`planner`]: location and trip search, site list and departures
//! - [`chat`], [`handler`], [`runner`]: the Telegram side

pub mod chat;
pub mod cli;
pub mod config;
pub mod domain;
pub mod handler;
pub mod itinerary;
pub mod planner;
pub mod prefs;
pub mod resolver;
pub mod runner;
pub mod selection;
pub mod state;

pub use chat::{ChatTransport, PromptOption, TelegramClient, TransportError};
pub use config::Config;
pub use domain::{Role, TransportMode};
pub use handler::{Command, Handler};
pub use itinerary::ItineraryFormatter;
pub use planner::{
    Candidate, Departure, Journey, JourneyPlannerClient, Leg, LocationSearch, PlannerError, Site, SiteIndex, SiteList,
    TransportApiClient, TripSearch,
};
pub use prefs::PreferenceStore;
pub use resolver::{CandidateResolver, LookupFailed, Resolution};
pub use runner::{Runner, UpdateSource};
pub use selection::{CallbackToken, ClickOutcome, QueryOutcome, SelectionMachine, SelectionState, TokenError};
pub use state::{PendingError, PendingSelections};
