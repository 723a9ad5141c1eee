pub mod interaction_repository;

#[cfg(test)]
pub mod memory_repository;
