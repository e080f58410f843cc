//! Seat assignment for shared exam sessions.
//!
//! [`engine::place`] seats occupants across rooms so that no two neighbors
//! share a gender code or cohort level, relaxing the cohort rule when a run
//! cannot otherwise seat everyone. Around it sit desk numbering, a vacancy
//! advisor for whoever stays unplaced, an identity index for lookups and a
//! learning loop fed by manual corrections.

pub mod action;
pub mod cache;
pub mod config;
pub mod constraint;
pub mod engine;
pub mod error;
pub mod index;
pub mod learning;
pub mod model;
pub mod numbering;
pub mod persist;
pub mod rebalance;
pub mod worker;

pub use action::{apply_action, ActionError, SeatAction, SeatPosition};
pub use config::{Adjacency, LearningConfig, NeighborScope, Settings};
pub use constraint::{check_constraints, level_for_attempt, ConstraintCheck, ConstraintLevel, LevelName};
pub use engine::{place, place_with_progress, Progress};
pub use error::{InputError, PlacementError};
pub use index::{PlacementIndex, Resolution};
pub use learning::{LearningLoop, MoveRecord, WeightVector};
pub use model::entity::Occupant;
pub use model::result::PlacementResult;
pub use model::room::{Room, Seat, SeatKind};
pub use numbering::{desk_number, resolve_desk_number, DeskNumber};
pub use rebalance::{rank_rooms, RoomVacancy};
pub use worker::{spawn_placement, PlacementRequest, WorkerMessage};
