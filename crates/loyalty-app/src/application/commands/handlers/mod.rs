mod execute_check_in_handler;

#[cfg(test)]
mod tests;

pub use execute_check_in_handler::{Clock, ExecuteCheckInCommandHandler};
