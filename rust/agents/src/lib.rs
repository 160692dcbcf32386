extern crate gridworld;
extern crate rand;
extern crate serde;
extern crate serde_json;
extern crate thiserror;
extern crate tracing;

pub mod algos;
pub mod config;
pub mod environments;
pub mod mdps;
pub mod tracking;

pub use algos::model_based::mdp::{vi::ValueIteration, Mdp, MdpError, MdpSolver, MdpSolverPolicy};
pub use algos::pursuit::{Belief, DistanceOracle, GreedyPursuit, PursuitTick};
