mod cv;
mod user;

pub use cv::{Cv, CvFields};
pub use user::User;
