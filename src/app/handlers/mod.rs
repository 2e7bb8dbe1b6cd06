pub mod binding;
pub mod pane;
pub mod session;

#[cfg(test)]
mod test_support;
