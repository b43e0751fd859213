pub mod app_config;
pub mod db;
pub mod entries;
pub mod orm;
pub mod storage;
pub mod web;
