pub mod ai;
pub mod analytics;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod nutrition;
pub mod planner;
pub mod plans;
pub mod preferences;
pub mod recipes;
pub mod recognition;
pub mod reports;
pub mod skills;
pub mod social;
pub mod state;
pub mod storage;
pub mod supplements;
