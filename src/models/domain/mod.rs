pub mod course;
pub mod homework;
pub mod solution;
pub mod user;
pub use course::Course;
pub use homework::Homework;
pub use solution::Solution;
pub use user::{User, UserRole};
