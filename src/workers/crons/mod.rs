pub mod cleanup_cron;
pub mod tasks;
