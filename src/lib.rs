pub mod answer;
pub mod config;
pub mod controller;
pub mod event;
pub mod gateway;
pub mod io;
pub mod request;
pub mod selector;
pub mod status;
pub mod timeserver;
pub mod timestamp;
pub mod traits;
