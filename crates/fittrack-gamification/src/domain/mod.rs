//! Reward rules: reward table, streak calculator, badge evaluator.

pub mod badges;
pub mod commands;
pub mod progression;
pub mod reward_table;
pub mod streak;
