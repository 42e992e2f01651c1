pub(crate) mod agent;
pub(crate) mod bootstrap;
pub(crate) mod config;
pub(crate) mod demo;
pub(crate) mod loop_runner;
