//! Scenario tests spanning several scene subsystems

mod hierarchy_scenarios;
mod instancing_scenarios;
