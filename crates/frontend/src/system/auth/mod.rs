pub mod api;
pub mod context;
pub mod controller;
pub mod forms;
pub mod guard;
pub mod storage;
