//! Bass-reactive pulse for radio players.
//!
//! Audio is low-passed and turned into byte frequency snapshots by the
//! [audio::SpectrumAnalyzer]. Once per frame a [session::VisualizerSession]
//! takes the lowest bins of the latest snapshot, lets the
//! [detector::BassHitDetector] decide whether they form a hit and drives a
//! [pulse::PulseAnimator] with it.
//!
//! ```
//! use std::time::Instant;
//! use radiopulse::{audio::ScriptedSource, config::AppConfig, controller::Player};
//!
//! let config = AppConfig::default();
//! let bins = config.audio.bin_count();
//!
//! let mut player = Player::new(config);
//! player
//!     .start(Box::new(ScriptedSource::from_levels([20, 200], bins)))
//!     .unwrap();
//!
//! let quiet = player.tick(Instant::now()).unwrap().unwrap();
//! let loud = player.tick(Instant::now()).unwrap().unwrap();
//!
//! assert!(quiet.hit.is_none());
//! assert_eq!(loud.hit.map(|hit| hit.power), Some(200.0));
//! ```
pub mod audio;
pub mod config;
pub mod consts;
pub mod controller;
pub mod detector;
pub mod error;
pub mod pulse;
pub mod session;
pub mod ticker;

pub use error::Error;
