pub mod constants;
#[cfg(test)]
pub mod test_helpers;
pub mod timezone;
pub mod types;
pub mod validation;
