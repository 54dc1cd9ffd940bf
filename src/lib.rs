//! Colony Sim - runtime core of a colony-survival simulation
//!
//! A fixed-rate tick engine that schedules work among colonists, ages and
//! resets harvestable hotspots, directs raids, and replaces the dead
//! through an insurance reserve.

pub mod city;
pub mod core;
pub mod entity;
pub mod persistence;
pub mod simulation;
pub mod world;
