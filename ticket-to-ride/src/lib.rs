//! Rules engine for Ticket to Ride, built to be driven by programs rather than people.
//!
//! A [`game::Game`] owns the whole state of one game and asks a [`decision::DecisionSource`]
//! per player for every choice. Every state change is reported to an
//! [`observation::ObservationSink`].

pub mod board;
pub mod card;
pub mod city;
pub mod decision;
pub mod error;
pub mod game;
pub mod map;
pub mod network;
pub mod observation;
pub mod player;
pub mod rules;
pub mod scoring;
pub mod ticket;
pub mod turn;
