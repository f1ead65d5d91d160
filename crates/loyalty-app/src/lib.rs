// Application and presentation layers, shared by the server binary and tests

pub mod application;
pub mod presentation;
