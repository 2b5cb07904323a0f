//! Algoviz Engine - Stepwise Algorithm Runs with Cooperative Pacing
//!
//! This crate drives the algorithm visualizers: it runs classic algorithms
//! over the structures of [`algoviz_model`] one observable micro-step at a
//! time, so a renderer can animate each comparison, swap, visit or placement.
//!
//! # Overview
//!
//! ## Step Emitter
//!
//! The [`StepEmitter`] is the only place an algorithm suspends. After every
//! micro-step it publishes a [`Step`] with a snapshot of the structure, then
//! waits out the configured delay:
//!
//! - **Pause / resume**: a paused run does not advance
//! - **Cancel**: `emit` returns [`Error::Aborted`], propagated with `?`
//! - **Delay**: re-read before every suspension; speed 1..=100 maps to 1000..=10 ms
//!
//! ## Algorithm Library
//!
//! [`Algorithm`] covers sorting (bubble, quick, merge), BST insert, search and
//! in-order traversal, graph BFS/DFS, grid Dijkstra, heap insert/extract,
//! N-Queens and fixed-step physics. Each run returns an [`Outcome`].
//!
//! ## Interaction Controller
//!
//! A [`Visualizer`] owns one structure, accepts edits while idle, refuses
//! them with [`Error::Busy`] while a run is active and streams the run's
//! steps to its observer.
//!
//! # Example
//!
//! ```rust,ignore
//! use algoviz_engine::{Algorithm, EngineConfig, RunEvent, Visualizer};
//! use algoviz_model::StructureKind;
//!
//! let mut vis = Visualizer::with_kind(StructureKind::Sequence, EngineConfig::from_env())?;
//! let mut run = vis.run(Algorithm::QuickSort)?;
//! while let Some(event) = run.next_event().await {
//!     match event {
//!         RunEvent::Step(step) => render(&step.snapshot, &step.highlight),
//!         RunEvent::Finished(report) => println!("{}", report.message),
//!     }
//! }
//! ```

pub mod algorithms;
pub mod config;
pub mod controller;
pub mod emitter;
pub mod error;

pub use algorithms::{Algorithm, Outcome, Path, StopReason};
pub use config::EngineConfig;
pub use controller::{EditMode, Phase, RunEvent, RunReport, RunResult, RunStream, Visualizer};
pub use emitter::{delay_for_speed, ElementRef, RunControl, RunStats, Step, StepEmitter, StepKind, StepSink};
pub use error::{Error, Precondition, Result};
