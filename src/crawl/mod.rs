pub mod clean;
pub mod crawler;
pub mod fetch;
pub mod html;
pub mod links;

#[cfg(test)]
pub(crate) mod testing;
