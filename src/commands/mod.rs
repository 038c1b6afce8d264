pub mod check;
pub mod organize;
