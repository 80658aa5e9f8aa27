pub mod materializer;
pub mod resolver;
pub mod service;
pub mod sign_in;

#[cfg(test)]
mod test_support;
