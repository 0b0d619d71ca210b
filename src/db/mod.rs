pub mod cvs;
pub mod users;
