//! Quartermaster purchase engine library.
//!
//! Plans the purchase phase of a computer-controlled player in a
//! territorial conquest game: how to split one turn's budget between
//! defense, land expansion, new factories, naval power, and long-range
//! attackers, and where every bought unit is placed.
//!
//! The pipeline in [`purchase`] runs against the collaborator traits in
//! [`board`] and [`eval`]; the rest of the crate provides reference
//! implementations, the JSON scenario format, and the order submission.

pub mod board;
pub mod config;
pub mod engine;
pub mod eval;
pub mod protocol;
pub mod purchase;
pub mod submit;
