pub mod account;
pub mod mailer;
pub mod password;

pub use account::AccountService;
pub use mailer::Mailer;
