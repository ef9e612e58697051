pub mod assignments;

pub mod submissions;

pub use assignments::configure_assignments_routes;
pub use submissions::configure_submissions_routes;

#[cfg(test)]
mod tests;
