//! Social network API clients.
//!
//! Only X is implemented: app-only bearer tokens, v2 trends by WOEID and the
//! v1.1 locations/place-trends pair.
pub mod x;
