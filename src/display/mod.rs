//! The display side: a sink boundary for rendered frames and the
//! cooperative poll loop that feeds it while streaming is enabled.
pub mod console_sink;
pub mod display_loop;
pub mod display_sink;
pub mod stream_flag;
