//! Service negotiation facilities for [`Session`](crate::Session),
//! per <https://datatracker.ietf.org/doc/html/rfc4253#section-10>.

mod handler;
pub use handler::Handler;

mod request;
pub use request::Request;
