//! Face state push.
//!
//! The renderer listens on a local TCP port. Each state change is one short
//! connection carrying `{"talking": bool, "listening": bool}`, after which
//! the sender closes. Nothing is ever read back.

pub mod notifier;
pub mod receiver;

pub use notifier::TcpFaceNotifier;
pub use receiver::FaceReceiver;
