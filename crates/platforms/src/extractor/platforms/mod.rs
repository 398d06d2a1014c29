pub mod pandalive;
