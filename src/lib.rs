//! Deep-work session tracking: a REST API over a session store, plus the
//! timer, session tracker and views used by the `focus` client.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod routes;
pub mod state;
pub mod tracker;

pub mod models {
    pub mod session;
}

pub mod repositories {
    pub mod http;
    pub mod memory;
    pub mod session;
}

pub mod services {
    pub mod sessions;
}

pub mod handlers {
    pub mod sessions;
}

pub mod validation {
    pub mod session;
}

pub mod timer;
pub mod views;
