//! Screens
//!
//! Each screen draws into compositor layer buffers; key handling lives in
//! [`App`](crate::App).

pub mod chat;
pub mod disclaimer;
pub mod landing;
