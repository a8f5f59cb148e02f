pub mod mail;
pub mod meeting;

pub use mail::{MailService, SmtpMailService};
pub use meeting::{MeetingService, ZoomMeetingService};
